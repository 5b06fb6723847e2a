/*
 * pandoc.rs
 * Copyright (c) 2025 Posit, PBC
 */

pub use crate::block::Blocks;
pub use crate::meta::Meta;

/// The `pandoc-api-version` a document was serialized with.
pub type ApiVersion = Vec<u64>;

/// Version written when a document carries none of its own.
pub const DEFAULT_API_VERSION: [u64; 3] = [1, 23, 1];

/*
 * A data structure that mimics Pandoc's `data Pandoc` type.
 */

#[derive(Debug, Clone, PartialEq)]
pub struct Pandoc {
    pub api_version: ApiVersion,
    pub meta: Meta,
    pub blocks: Blocks,
}

impl Default for Pandoc {
    fn default() -> Self {
        Pandoc {
            api_version: DEFAULT_API_VERSION.to_vec(),
            meta: Meta::new(),
            blocks: vec![],
        }
    }
}
