/*
 * attr.rs
 * Copyright (c) 2025 Posit, PBC
 */

/// Pandoc's `Attr`: identifier, classes, and key-value pairs.
///
/// Key-values are kept as a list rather than a map: Pandoc allows repeated
/// keys and a filter must hand them back exactly as it received them.
pub type Attr = (String, Vec<String>, Vec<(String, String)>);

pub fn empty_attr() -> Attr {
    (String::new(), vec![], vec![])
}
