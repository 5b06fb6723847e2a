/*
 * caption.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::block::Blocks;
use crate::inline::Inlines;

/// Caption of a table or figure: an optional short caption and the long
/// caption blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Caption {
    pub short: Option<Inlines>,
    pub long: Blocks,
}

impl Caption {
    pub fn is_empty(&self) -> bool {
        self.short.is_none() && self.long.is_empty()
    }
}
