/*
 * transforms/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * AST transforms run by the filter.
 */

//! AST transforms run by the filter.
//!
//! - [`TableAttrTransform`] - Moves attribute literals from table captions
//!   onto the tables
//!
//! These transforms implement [`AstTransform`](crate::transform::AstTransform) and
//! can be added to a [`TransformPipeline`](crate::transform::TransformPipeline).

mod table_attr;

pub use table_attr::{TableAttrTransform, extract_caption_attributes};
