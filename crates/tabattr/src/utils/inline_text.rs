/*
 * inline_text.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Plain-text views over inline content.
//!
//! A caption's inline content is a sequence of fragments, but attribute
//! literals are matched against text. [`TextTail`] renders the trailing run
//! of purely textual fragments to a string and remembers which byte range of
//! that string each fragment produced, so a match in the string can be
//! mapped back to a cut in the fragment sequence.

use std::ops::Range;
use tabattr_pandoc_types::{Block, Inline, Inlines, MetaValue};

/// Text produced by a single text-run fragment, or `None` if the fragment
/// is not purely textual.
fn fragment_text(inline: &Inline) -> Option<String> {
    match inline {
        Inline::Str(s) => Some(s.text.clone()),
        Inline::Space(_) | Inline::SoftBreak(_) => Some(" ".to_string()),
        Inline::Quoted(q) => {
            let delimiter = q.quote_type.delimiter();
            let mut text = String::new();
            text.push(delimiter);
            for inner in &q.content {
                text.push_str(&fragment_text(inner)?);
            }
            text.push(delimiter);
            Some(text)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Position of the fragment in the inline sequence.
    pub index: usize,
    /// Bytes of [`TextTail::text`] the fragment rendered to.
    pub range: Range<usize>,
}

/// The maximal suffix of an inline sequence made only of text-run fragments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextTail {
    pub text: String,
    pub fragments: Vec<TextFragment>,
}

impl TextTail {
    pub fn new(inlines: &[Inline]) -> Self {
        let start = inlines
            .iter()
            .rposition(|inline| fragment_text(inline).is_none())
            .map_or(0, |i| i + 1);

        let mut tail = TextTail::default();
        for (index, inline) in inlines.iter().enumerate().skip(start) {
            // Every fragment past `start` is textual.
            let Some(text) = fragment_text(inline) else {
                continue;
            };
            let begin = tail.text.len();
            tail.text.push_str(&text);
            tail.fragments.push(TextFragment {
                index,
                range: begin..tail.text.len(),
            });
        }
        tail
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Check whether the inline sequence can be cut at byte `offset` of the
    /// tail text. A cut is possible on a fragment boundary or inside a `Str`.
    pub fn can_cut_at(&self, inlines: &[Inline], offset: usize) -> bool {
        match self.fragment_at(offset) {
            None => offset == self.text.len(),
            Some(fragment) => {
                offset == fragment.range.start
                    || matches!(inlines.get(fragment.index), Some(Inline::Str(_)))
            }
        }
    }

    /// Remove everything from byte `offset` of the tail text onwards, then
    /// drop trailing spaces and line breaks. Returns `false` and leaves the
    /// inlines untouched when the cut is not aligned with the fragments.
    pub fn cut_at(&self, inlines: &mut Inlines, offset: usize) -> bool {
        if !self.can_cut_at(inlines, offset) {
            return false;
        }
        if let Some(fragment) = self.fragment_at(offset) {
            if offset == fragment.range.start {
                inlines.truncate(fragment.index);
            } else {
                let keep = offset - fragment.range.start;
                if let Some(Inline::Str(s)) = inlines.get_mut(fragment.index) {
                    s.text.truncate(keep);
                }
                inlines.truncate(fragment.index + 1);
            }
        }
        while matches!(
            inlines.last(),
            Some(Inline::Space(_) | Inline::SoftBreak(_) | Inline::LineBreak(_))
        ) {
            inlines.pop();
        }
        true
    }

    fn fragment_at(&self, offset: usize) -> Option<&TextFragment> {
        self.fragments
            .iter()
            .find(|fragment| fragment.range.contains(&offset))
    }
}

/// Render inline content to plain text, dropping formatting.
pub fn stringify_inlines(inlines: &[Inline]) -> String {
    let mut result = String::new();
    for inline in inlines {
        match inline {
            Inline::Str(s) => result.push_str(&s.text),
            Inline::Space(_) | Inline::SoftBreak(_) | Inline::LineBreak(_) => result.push(' '),
            Inline::Code(c) => result.push_str(&c.text),
            Inline::Math(m) => result.push_str(&m.text),
            Inline::Quoted(q) => {
                let delimiter = q.quote_type.delimiter();
                result.push(delimiter);
                result.push_str(&stringify_inlines(&q.content));
                result.push(delimiter);
            }
            Inline::Emph(e) => result.push_str(&stringify_inlines(&e.content)),
            Inline::Underline(u) => result.push_str(&stringify_inlines(&u.content)),
            Inline::Strong(s) => result.push_str(&stringify_inlines(&s.content)),
            Inline::Strikeout(s) => result.push_str(&stringify_inlines(&s.content)),
            Inline::Superscript(s) => result.push_str(&stringify_inlines(&s.content)),
            Inline::Subscript(s) => result.push_str(&stringify_inlines(&s.content)),
            Inline::SmallCaps(s) => result.push_str(&stringify_inlines(&s.content)),
            Inline::Span(s) => result.push_str(&stringify_inlines(&s.content)),
            Inline::Link(l) => result.push_str(&stringify_inlines(&l.content)),
            Inline::Image(i) => result.push_str(&stringify_inlines(&i.content)),
            Inline::Cite(c) => result.push_str(&stringify_inlines(&c.content)),
            Inline::RawInline(_) | Inline::Note(_) => {}
        }
    }
    result
}

pub fn stringify_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(|block| block.text_inlines())
        .map(|inlines| stringify_inlines(inlines))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Convert a metadata value to plain JSON, stringifying inline and block
/// content the way Pandoc's YAML reader would have produced it.
pub fn meta_to_json(value: &MetaValue) -> serde_json::Value {
    match value {
        MetaValue::MetaString(s) => serde_json::Value::String(s.clone()),
        MetaValue::MetaBool(b) => serde_json::Value::Bool(*b),
        MetaValue::MetaInlines(inlines) => serde_json::Value::String(stringify_inlines(inlines)),
        MetaValue::MetaBlocks(blocks) => serde_json::Value::String(stringify_blocks(blocks)),
        MetaValue::MetaList(items) => {
            serde_json::Value::Array(items.iter().map(meta_to_json).collect())
        }
        MetaValue::MetaMap(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), meta_to_json(value)))
                .collect(),
        ),
    }
}
