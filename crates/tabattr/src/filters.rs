/*
 * filters.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::filter_context::FilterContext;
use tabattr_pandoc_types::{
    Block, BlockQuote, Blocks, BulletList, Caption, Cell, Cite, DefinitionList, Div, Emph, Figure,
    Image, Inline, Inlines, Link, Meta, MetaValue, Note, OrderedList, Pandoc, Quoted, Row,
    SmallCaps, Span, Strikeout, Strong, Subscript, Superscript, Table, TableBody, TableFoot,
    TableHead, Underline,
};

// filters are destructive and take ownership of the input

type TableFilterFn<'a> = Box<dyn FnMut(Table, &mut FilterContext) -> Table + 'a>;

/// A table callback applied during a top-down traversal.
///
/// The callback sees each table before its caption and cells, so an outer
/// table is handled before the tables nested inside it.
pub struct Filter<'a> {
    pub table: Option<TableFilterFn<'a>>,
}

impl Default for Filter<'static> {
    fn default() -> Filter<'static> {
        Filter { table: None }
    }
}

impl Filter<'static> {
    pub fn new() -> Filter<'static> {
        Self::default()
    }
}

impl<'a> Filter<'a> {
    pub fn with_table<F>(mut self, f: F) -> Filter<'a>
    where
        F: FnMut(Table, &mut FilterContext) -> Table + 'a,
    {
        self.table = Some(Box::new(f));
        self
    }
}

fn traverse_inlines(inlines: Inlines, filter: &mut Filter, ctx: &mut FilterContext) -> Inlines {
    inlines
        .into_iter()
        .map(|inline| traverse_inline(inline, filter, ctx))
        .collect()
}

// Only notes hold blocks, but they can sit inside any inline container.
fn traverse_inline(inline: Inline, filter: &mut Filter, ctx: &mut FilterContext) -> Inline {
    match inline {
        Inline::Emph(e) => Inline::Emph(Emph {
            content: traverse_inlines(e.content, filter, ctx),
        }),
        Inline::Underline(u) => Inline::Underline(Underline {
            content: traverse_inlines(u.content, filter, ctx),
        }),
        Inline::Strong(sg) => Inline::Strong(Strong {
            content: traverse_inlines(sg.content, filter, ctx),
        }),
        Inline::Strikeout(st) => Inline::Strikeout(Strikeout {
            content: traverse_inlines(st.content, filter, ctx),
        }),
        Inline::Superscript(sp) => Inline::Superscript(Superscript {
            content: traverse_inlines(sp.content, filter, ctx),
        }),
        Inline::Subscript(sb) => Inline::Subscript(Subscript {
            content: traverse_inlines(sb.content, filter, ctx),
        }),
        Inline::SmallCaps(sc) => Inline::SmallCaps(SmallCaps {
            content: traverse_inlines(sc.content, filter, ctx),
        }),
        Inline::Quoted(q) => Inline::Quoted(Quoted {
            content: traverse_inlines(q.content, filter, ctx),
            ..q
        }),
        Inline::Cite(c) => Inline::Cite(Cite {
            content: traverse_inlines(c.content, filter, ctx),
            ..c
        }),
        Inline::Link(l) => Inline::Link(Link {
            content: traverse_inlines(l.content, filter, ctx),
            ..l
        }),
        Inline::Image(i) => Inline::Image(Image {
            content: traverse_inlines(i.content, filter, ctx),
            ..i
        }),
        Inline::Span(span) => Inline::Span(Span {
            content: traverse_inlines(span.content, filter, ctx),
            ..span
        }),
        Inline::Note(note) => Inline::Note(Note {
            content: traverse_blocks(note.content, filter, ctx),
        }),
        terminal => terminal,
    }
}

fn traverse_caption(caption: Caption, filter: &mut Filter, ctx: &mut FilterContext) -> Caption {
    Caption {
        short: caption
            .short
            .map(|short| traverse_inlines(short, filter, ctx)),
        long: traverse_blocks(caption.long, filter, ctx),
    }
}

fn traverse_rows(rows: Vec<Row>, filter: &mut Filter, ctx: &mut FilterContext) -> Vec<Row> {
    rows.into_iter()
        .map(|row| Row {
            cells: row
                .cells
                .into_iter()
                .map(|cell| Cell {
                    content: traverse_blocks(cell.content, filter, ctx),
                    ..cell
                })
                .collect(),
            ..row
        })
        .collect()
}

/// Apply the table callback, then descend into the caption and every cell.
fn traverse_table(table: Table, filter: &mut Filter, ctx: &mut FilterContext) -> Table {
    let table = match &mut filter.table {
        Some(f) => f(table, ctx),
        None => table,
    };
    Table {
        caption: traverse_caption(table.caption, filter, ctx),
        head: TableHead {
            rows: traverse_rows(table.head.rows, filter, ctx),
            ..table.head
        },
        bodies: table
            .bodies
            .into_iter()
            .map(|body| TableBody {
                head: traverse_rows(body.head, filter, ctx),
                body: traverse_rows(body.body, filter, ctx),
                ..body
            })
            .collect(),
        foot: TableFoot {
            rows: traverse_rows(table.foot.rows, filter, ctx),
            ..table.foot
        },
        ..table
    }
}

fn traverse_block_lists(lists: Vec<Blocks>, filter: &mut Filter, ctx: &mut FilterContext) -> Vec<Blocks> {
    lists
        .into_iter()
        .map(|blocks| traverse_blocks(blocks, filter, ctx))
        .collect()
}

fn traverse_block(block: Block, filter: &mut Filter, ctx: &mut FilterContext) -> Block {
    match block {
        Block::Table(table) => Block::Table(traverse_table(table, filter, ctx)),
        Block::Plain(mut plain) => {
            plain.content = traverse_inlines(plain.content, filter, ctx);
            Block::Plain(plain)
        }
        Block::Paragraph(mut para) => {
            para.content = traverse_inlines(para.content, filter, ctx);
            Block::Paragraph(para)
        }
        Block::LineBlock(mut line_block) => {
            line_block.content = line_block
                .content
                .into_iter()
                .map(|line| traverse_inlines(line, filter, ctx))
                .collect();
            Block::LineBlock(line_block)
        }
        Block::Header(mut header) => {
            header.content = traverse_inlines(header.content, filter, ctx);
            Block::Header(header)
        }
        Block::BlockQuote(quote) => Block::BlockQuote(BlockQuote {
            content: traverse_blocks(quote.content, filter, ctx),
        }),
        Block::OrderedList(list) => Block::OrderedList(OrderedList {
            content: traverse_block_lists(list.content, filter, ctx),
            ..list
        }),
        Block::BulletList(list) => Block::BulletList(BulletList {
            content: traverse_block_lists(list.content, filter, ctx),
        }),
        Block::DefinitionList(list) => Block::DefinitionList(DefinitionList {
            content: list
                .content
                .into_iter()
                .map(|(term, defs)| {
                    (
                        traverse_inlines(term, filter, ctx),
                        traverse_block_lists(defs, filter, ctx),
                    )
                })
                .collect(),
        }),
        Block::Figure(figure) => Block::Figure(Figure {
            caption: traverse_caption(figure.caption, filter, ctx),
            content: traverse_blocks(figure.content, filter, ctx),
            ..figure
        }),
        Block::Div(div) => Block::Div(Div {
            content: traverse_blocks(div.content, filter, ctx),
            ..div
        }),
        terminal => terminal,
    }
}

fn traverse_blocks(blocks: Blocks, filter: &mut Filter, ctx: &mut FilterContext) -> Blocks {
    blocks
        .into_iter()
        .map(|block| traverse_block(block, filter, ctx))
        .collect()
}

fn traverse_meta_value(value: MetaValue, filter: &mut Filter, ctx: &mut FilterContext) -> MetaValue {
    match value {
        MetaValue::MetaMap(map) => MetaValue::MetaMap(traverse_meta(map, filter, ctx)),
        MetaValue::MetaList(items) => MetaValue::MetaList(
            items
                .into_iter()
                .map(|item| traverse_meta_value(item, filter, ctx))
                .collect(),
        ),
        MetaValue::MetaBlocks(content) => MetaValue::MetaBlocks(traverse_blocks(content, filter, ctx)),
        MetaValue::MetaInlines(content) => {
            MetaValue::MetaInlines(traverse_inlines(content, filter, ctx))
        }
        value => value,
    }
}

fn traverse_meta(meta: Meta, filter: &mut Filter, ctx: &mut FilterContext) -> Meta {
    meta.into_iter()
        .map(|(key, value)| (key, traverse_meta_value(value, filter, ctx)))
        .collect()
}

/// Traverse a whole document: metadata first, then the body.
pub fn topdown_traverse(doc: Pandoc, filter: &mut Filter, ctx: &mut FilterContext) -> Pandoc {
    Pandoc {
        meta: traverse_meta(doc.meta, filter, ctx),
        blocks: traverse_blocks(doc.blocks, filter, ctx),
        ..doc
    }
}
