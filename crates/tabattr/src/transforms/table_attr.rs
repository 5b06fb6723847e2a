/*
 * table_attr.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Transform that moves caption attribute literals onto tables.
 */

//! Table caption attribute transform.
//!
//! Pandoc has no syntax for attributes on pipe and grid tables, so authors
//! write them at the end of the caption:
//!
//! ```markdown
//! | a | b |
//! |---|---|
//! | 1 | 2 |
//!
//! : Results per run. {#tbl-results .striped width="50%"}
//! ```
//!
//! The reader leaves `{#tbl-results .striped width="50%"}` in the caption as
//! ordinary text. This transform finds such a literal at the end of the
//! caption, removes it, and merges the parsed attributes into the table's
//! own `Attr`. Tables are processed wherever they occur, including inside
//! table cells, notes, and metadata.

use tabattr_pandoc_types::{Caption, Pandoc, Table};

use crate::Result;
use crate::attr_literal::{AttributeRecord, find_trailing_literal, parse_literal};
use crate::filter_context::FilterContext;
use crate::filters::{Filter, topdown_traverse};
use crate::options::{DuplicateIdPolicy, OptionOverrides, TableAttrOptions};
use crate::transform::AstTransform;
use crate::utils::inline_text::TextTail;

/// Transform that moves trailing caption attribute literals onto tables.
///
/// Options come from the document's `table-attr` metadata, with the
/// overrides given at construction taking precedence.
pub struct TableAttrTransform {
    overrides: OptionOverrides,
}

impl TableAttrTransform {
    pub fn new() -> Self {
        Self::with_overrides(OptionOverrides::default())
    }

    pub fn with_overrides(overrides: OptionOverrides) -> Self {
        Self { overrides }
    }
}

impl Default for TableAttrTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl AstTransform for TableAttrTransform {
    fn name(&self) -> &str {
        "table-attr"
    }

    fn transform(&self, ast: &mut Pandoc, ctx: &mut FilterContext) -> Result<()> {
        let options = TableAttrOptions::resolve(&ast.meta, &self.overrides, ctx);
        if !options.enabled {
            tracing::debug!("Table attribute extraction disabled");
            return Ok(());
        }
        tracing::debug!(
            duplicate_ids = options.duplicate_ids.as_str(),
            "Extracting table caption attributes"
        );

        let mut extracted = 0usize;
        let mut filter = Filter::new().with_table(|mut table: Table, ctx| {
            if let Some(record) =
                extract_caption_attributes(&mut table.caption, options.duplicate_ids, ctx)
            {
                tracing::debug!(literal = %record.to_literal(), "Moving caption attributes to table");
                record.apply_to(&mut table.attr);
                extracted += 1;
            }
            table
        });
        *ast = topdown_traverse(std::mem::take(ast), &mut filter, ctx);
        drop(filter);

        tracing::debug!(tables = extracted, "Table attribute extraction finished");
        Ok(())
    }
}

/// Remove a trailing attribute literal from `caption` and return it.
///
/// Only the last long-caption block is examined, and only when it is a
/// `Plain` or `Para`. The caption is left untouched when no literal is
/// found, when the literal yields no attributes, or when it does not line up
/// with the caption's inline boundaries. A block that is left empty is
/// removed from the caption.
pub fn extract_caption_attributes(
    caption: &mut Caption,
    policy: DuplicateIdPolicy,
    ctx: &mut FilterContext,
) -> Option<AttributeRecord> {
    let inlines = caption.long.last_mut()?.text_inlines_mut()?;
    let tail = TextTail::new(inlines);
    if tail.is_empty() {
        return None;
    }

    let span = find_trailing_literal(&tail.text)?;
    let cut = span.cut_offset(&tail.text);
    if !tail.can_cut_at(inlines, cut) {
        return None;
    }
    let record = parse_literal(span.interior(&tail.text), policy, ctx)?;

    tail.cut_at(inlines, cut);
    if inlines.is_empty() {
        caption.long.pop();
    }
    Some(record)
}
