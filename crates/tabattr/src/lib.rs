/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! A Pandoc JSON filter that moves attribute literals from table captions
//! onto the tables.
//!
//! Pandoc's pipe, grid and simple tables cannot carry attributes, so authors
//! put them at the end of the caption instead:
//!
//! ```markdown
//! : Table caption. {#tbl-id .striped width="50%"}
//! ```
//!
//! The filter reads the document as Pandoc JSON, strips the literal from the
//! caption, merges it into the table's `Attr`, and writes the document back.
//!
//! # Example
//!
//! ```ignore
//! use tabattr::options::OptionOverrides;
//!
//! let mut input = std::io::stdin().lock();
//! let mut output = std::io::stdout().lock();
//! let ctx = tabattr::run_filter(&mut input, &mut output, OptionOverrides::default())?;
//! ctx.emit();
//! ```

pub mod attr_literal;
pub mod errors;
pub mod filter_context;
pub mod filters;
pub mod options;
pub mod readers;
pub mod transform;
pub mod transforms;
pub mod utils;
pub mod writers;

use std::io::{Read, Write};

pub use attr_literal::AttributeRecord;
pub use errors::{Result, TabattrError};
pub use filter_context::{Diagnostic, FilterContext};
pub use options::{DuplicateIdPolicy, OptionOverrides, TableAttrOptions};
pub use transform::{AstTransform, TransformPipeline};
pub use transforms::TableAttrTransform;

/// Build the pipeline the filter runs over every document.
pub fn build_pipeline(overrides: OptionOverrides) -> TransformPipeline {
    let mut pipeline = TransformPipeline::new();
    pipeline.push(Box::new(TableAttrTransform::with_overrides(overrides)));
    pipeline
}

/// Read a Pandoc JSON document, run the pipeline over it, and write the
/// result.
///
/// Diagnostics are returned in document order for the caller to report.
pub fn run_filter<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    overrides: OptionOverrides,
) -> Result<FilterContext> {
    let mut doc = readers::json::read(input)?;
    tracing::debug!(
        api_version = ?doc.api_version,
        blocks = doc.blocks.len(),
        "Read Pandoc document"
    );

    let mut ctx = FilterContext::new();
    build_pipeline(overrides).execute(&mut doc, &mut ctx)?;

    writers::json::write(&doc, output)?;
    output.flush()?;
    Ok(ctx)
}
