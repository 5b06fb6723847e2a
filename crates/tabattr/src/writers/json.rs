/*
 * json.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde_json::{Map, Value, json};
use tabattr_pandoc_types::{
    Alignment, Attr, Block, Caption, Cell, Citation, CitationMode, ColSpec, ColWidth, Inline,
    Inlines, ListAttributes, ListNumberDelim, ListNumberStyle, MathType, Meta, MetaValue, Pandoc,
    QuoteType, Row, Table, TableBody, TableFoot, TableHead,
};

fn write_attr(attr: &Attr) -> Value {
    json!([
        attr.0, // id
        attr.1, // classes
        attr.2
            .iter()
            .map(|(k, v)| json!([k, v]))
            .collect::<Vec<_>>()  // key-value pairs
    ])
}

fn write_citation_mode(mode: &CitationMode) -> Value {
    match mode {
        CitationMode::NormalCitation => json!({"t": "NormalCitation"}),
        CitationMode::AuthorInText => json!({"t": "AuthorInText"}),
        CitationMode::SuppressAuthor => json!({"t": "SuppressAuthor"}),
    }
}

fn write_citation(citation: &Citation) -> Value {
    json!({
        "citationId": citation.id,
        "citationPrefix": write_inlines(&citation.prefix),
        "citationSuffix": write_inlines(&citation.suffix),
        "citationMode": write_citation_mode(&citation.mode),
        "citationNoteNum": citation.note_num,
        "citationHash": citation.hash
    })
}

fn write_inline(inline: &Inline) -> Value {
    match inline {
        Inline::Str(s) => json!({"t": "Str", "c": s.text}),
        Inline::Space(_) => json!({"t": "Space"}),
        Inline::SoftBreak(_) => json!({"t": "SoftBreak"}),
        Inline::LineBreak(_) => json!({"t": "LineBreak"}),
        Inline::Emph(e) => json!({"t": "Emph", "c": write_inlines(&e.content)}),
        Inline::Underline(u) => json!({"t": "Underline", "c": write_inlines(&u.content)}),
        Inline::Strong(s) => json!({"t": "Strong", "c": write_inlines(&s.content)}),
        Inline::Strikeout(s) => json!({"t": "Strikeout", "c": write_inlines(&s.content)}),
        Inline::Superscript(s) => json!({"t": "Superscript", "c": write_inlines(&s.content)}),
        Inline::Subscript(s) => json!({"t": "Subscript", "c": write_inlines(&s.content)}),
        Inline::SmallCaps(s) => json!({"t": "SmallCaps", "c": write_inlines(&s.content)}),
        Inline::Quoted(q) => {
            let quote_type = match q.quote_type {
                QuoteType::SingleQuote => json!({"t": "SingleQuote"}),
                QuoteType::DoubleQuote => json!({"t": "DoubleQuote"}),
            };
            json!({"t": "Quoted", "c": [quote_type, write_inlines(&q.content)]})
        }
        Inline::Cite(c) => json!({
            "t": "Cite",
            "c": [
                c.citations.iter().map(write_citation).collect::<Vec<_>>(),
                write_inlines(&c.content)
            ]
        }),
        Inline::Code(c) => json!({"t": "Code", "c": [write_attr(&c.attr), c.text]}),
        Inline::Math(m) => {
            let math_type = match m.math_type {
                MathType::InlineMath => json!({"t": "InlineMath"}),
                MathType::DisplayMath => json!({"t": "DisplayMath"}),
            };
            json!({"t": "Math", "c": [math_type, m.text]})
        }
        Inline::RawInline(raw) => json!({"t": "RawInline", "c": [raw.format, raw.text]}),
        Inline::Link(link) => json!({
            "t": "Link",
            "c": [
                write_attr(&link.attr),
                write_inlines(&link.content),
                [link.target.0, link.target.1]
            ]
        }),
        Inline::Image(image) => json!({
            "t": "Image",
            "c": [
                write_attr(&image.attr),
                write_inlines(&image.content),
                [image.target.0, image.target.1]
            ]
        }),
        Inline::Note(note) => json!({"t": "Note", "c": write_blocks(&note.content)}),
        Inline::Span(span) => json!({
            "t": "Span",
            "c": [write_attr(&span.attr), write_inlines(&span.content)]
        }),
    }
}

fn write_inlines(inlines: &Inlines) -> Value {
    json!(inlines.iter().map(write_inline).collect::<Vec<_>>())
}

fn write_list_attributes(attr: &ListAttributes) -> Value {
    let number_style = match attr.1 {
        ListNumberStyle::Decimal => json!({"t": "Decimal"}),
        ListNumberStyle::LowerAlpha => json!({"t": "LowerAlpha"}),
        ListNumberStyle::UpperAlpha => json!({"t": "UpperAlpha"}),
        ListNumberStyle::LowerRoman => json!({"t": "LowerRoman"}),
        ListNumberStyle::UpperRoman => json!({"t": "UpperRoman"}),
        ListNumberStyle::Example => json!({"t": "Example"}),
        ListNumberStyle::Default => json!({"t": "DefaultStyle"}),
    };
    let number_delimiter = match attr.2 {
        ListNumberDelim::Period => json!({"t": "Period"}),
        ListNumberDelim::OneParen => json!({"t": "OneParen"}),
        ListNumberDelim::TwoParens => json!({"t": "TwoParens"}),
        ListNumberDelim::Default => json!({"t": "DefaultDelim"}),
    };
    json!([attr.0, number_style, number_delimiter])
}

fn write_blockss(blockss: &[Vec<Block>]) -> Value {
    json!(
        blockss
            .iter()
            .map(|blocks| write_blocks(blocks))
            .collect::<Vec<_>>()
    )
}

fn write_caption(caption: &Caption) -> Value {
    json!([
        caption.short.as_ref().map(write_inlines),
        write_blocks(&caption.long)
    ])
}

fn write_alignment(alignment: &Alignment) -> Value {
    match alignment {
        Alignment::Left => json!({"t": "AlignLeft"}),
        Alignment::Center => json!({"t": "AlignCenter"}),
        Alignment::Right => json!({"t": "AlignRight"}),
        Alignment::Default => json!({"t": "AlignDefault"}),
    }
}

fn write_colwidth(colwidth: &ColWidth) -> Value {
    match colwidth {
        ColWidth::Default => json!({"t": "ColWidthDefault"}),
        ColWidth::Percentage(p) => json!({"t": "ColWidth", "c": p}),
    }
}

fn write_colspec(colspec: &ColSpec) -> Value {
    json!([write_alignment(&colspec.0), write_colwidth(&colspec.1)])
}

fn write_cell(cell: &Cell) -> Value {
    json!([
        write_attr(&cell.attr),
        write_alignment(&cell.alignment),
        cell.row_span,
        cell.col_span,
        write_blocks(&cell.content)
    ])
}

fn write_row(row: &Row) -> Value {
    json!([
        write_attr(&row.attr),
        row.cells.iter().map(write_cell).collect::<Vec<_>>()
    ])
}

fn write_rows(rows: &[Row]) -> Value {
    json!(rows.iter().map(write_row).collect::<Vec<_>>())
}

fn write_table_head(head: &TableHead) -> Value {
    json!([write_attr(&head.attr), write_rows(&head.rows)])
}

fn write_table_body(body: &TableBody) -> Value {
    json!([
        write_attr(&body.attr),
        body.rowhead_columns,
        write_rows(&body.head),
        write_rows(&body.body)
    ])
}

fn write_table_foot(foot: &TableFoot) -> Value {
    json!([write_attr(&foot.attr), write_rows(&foot.rows)])
}

fn write_table(table: &Table) -> Value {
    json!({
        "t": "Table",
        "c": [
            write_attr(&table.attr),
            write_caption(&table.caption),
            table.colspec.iter().map(write_colspec).collect::<Vec<_>>(),
            write_table_head(&table.head),
            table.bodies.iter().map(write_table_body).collect::<Vec<_>>(),
            write_table_foot(&table.foot)
        ]
    })
}

fn write_block(block: &Block) -> Value {
    match block {
        Block::Plain(plain) => json!({"t": "Plain", "c": write_inlines(&plain.content)}),
        Block::Paragraph(para) => json!({"t": "Para", "c": write_inlines(&para.content)}),
        Block::LineBlock(lineblock) => json!({
            "t": "LineBlock",
            "c": lineblock.content.iter().map(write_inlines).collect::<Vec<_>>()
        }),
        Block::CodeBlock(codeblock) => json!({
            "t": "CodeBlock",
            "c": [write_attr(&codeblock.attr), codeblock.text]
        }),
        Block::RawBlock(raw) => json!({"t": "RawBlock", "c": [raw.format, raw.text]}),
        Block::BlockQuote(quote) => json!({"t": "BlockQuote", "c": write_blocks(&quote.content)}),
        Block::OrderedList(list) => json!({
            "t": "OrderedList",
            "c": [write_list_attributes(&list.attr), write_blockss(&list.content)]
        }),
        Block::BulletList(list) => json!({"t": "BulletList", "c": write_blockss(&list.content)}),
        Block::DefinitionList(deflist) => json!({
            "t": "DefinitionList",
            "c": deflist
                .content
                .iter()
                .map(|(term, definition)| json!([write_inlines(term), write_blockss(definition)]))
                .collect::<Vec<_>>()
        }),
        Block::Header(header) => json!({
            "t": "Header",
            "c": [header.level, write_attr(&header.attr), write_inlines(&header.content)]
        }),
        Block::HorizontalRule(_) => json!({"t": "HorizontalRule"}),
        Block::Table(table) => write_table(table),
        Block::Figure(figure) => json!({
            "t": "Figure",
            "c": [
                write_attr(&figure.attr),
                write_caption(&figure.caption),
                write_blocks(&figure.content)
            ]
        }),
        Block::Div(div) => json!({
            "t": "Div",
            "c": [write_attr(&div.attr), write_blocks(&div.content)]
        }),
    }
}

fn write_blocks(blocks: &[Block]) -> Value {
    json!(blocks.iter().map(write_block).collect::<Vec<_>>())
}

fn write_meta_value(value: &MetaValue) -> Value {
    match value {
        MetaValue::MetaString(s) => json!({"t": "MetaString", "c": s}),
        MetaValue::MetaBool(b) => json!({"t": "MetaBool", "c": b}),
        MetaValue::MetaInlines(inlines) => json!({"t": "MetaInlines", "c": write_inlines(inlines)}),
        MetaValue::MetaBlocks(blocks) => json!({"t": "MetaBlocks", "c": write_blocks(blocks)}),
        MetaValue::MetaList(list) => json!({
            "t": "MetaList",
            "c": list.iter().map(write_meta_value).collect::<Vec<_>>()
        }),
        MetaValue::MetaMap(map) => json!({"t": "MetaMap", "c": write_meta(map)}),
    }
}

fn write_meta(meta: &Meta) -> Value {
    let mut obj = Map::new();
    for (key, value) in meta {
        obj.insert(key.clone(), write_meta_value(value));
    }
    Value::Object(obj)
}

pub fn write_pandoc(pandoc: &Pandoc) -> Value {
    json!({
        "pandoc-api-version": pandoc.api_version,
        "meta": write_meta(&pandoc.meta),
        "blocks": write_blocks(&pandoc.blocks)
    })
}

pub fn write<W: std::io::Write>(pandoc: &Pandoc, writer: &mut W) -> serde_json::Result<()> {
    let json = write_pandoc(pandoc);
    serde_json::to_writer(writer, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers;
    use tabattr_pandoc_types::{Paragraph, text_to_inlines};

    fn roundtrip(value: Value) -> Value {
        let pandoc = readers::json::read_pandoc(&value).unwrap();
        write_pandoc(&pandoc)
    }

    #[test]
    fn test_write_keeps_api_version() {
        let pandoc = Pandoc {
            api_version: vec![1, 22, 2, 1],
            ..Default::default()
        };
        assert_eq!(
            write_pandoc(&pandoc),
            json!({"pandoc-api-version": [1, 22, 2, 1], "meta": {}, "blocks": []})
        );
    }

    #[test]
    fn test_write_paragraph() {
        let pandoc = Pandoc {
            blocks: vec![Block::Paragraph(Paragraph {
                content: text_to_inlines("Hello world"),
            })],
            ..Default::default()
        };
        assert_eq!(
            write_pandoc(&pandoc)["blocks"],
            json!([{"t": "Para", "c": [
                {"t": "Str", "c": "Hello"},
                {"t": "Space"},
                {"t": "Str", "c": "world"}
            ]}])
        );
    }

    #[test]
    fn test_roundtrip_mixed_document() {
        let input = json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {
                "title": {"t": "MetaInlines", "c": [{"t": "Str", "c": "Doc"}]},
                "table-attr": {"t": "MetaMap", "c": {
                    "duplicate-ids": {"t": "MetaString", "c": "last-wins"}
                }}
            },
            "blocks": [
                {"t": "Header", "c": [1, ["intro", [], []], [{"t": "Str", "c": "Intro"}]]},
                {"t": "OrderedList", "c": [
                    [1, {"t": "Decimal"}, {"t": "Period"}],
                    [[{"t": "Plain", "c": [{"t": "Quoted", "c": [
                        {"t": "DoubleQuote"}, [{"t": "Str", "c": "q"}]
                    ]}]}]]
                ]},
                {"t": "Para", "c": [
                    {"t": "Cite", "c": [
                        [{
                            "citationId": "doe",
                            "citationPrefix": [],
                            "citationSuffix": [],
                            "citationMode": {"t": "NormalCitation"},
                            "citationNoteNum": 1,
                            "citationHash": 0
                        }],
                        [{"t": "Str", "c": "[@doe]"}]
                    ]},
                    {"t": "Note", "c": [{"t": "Para", "c": [{"t": "Str", "c": "n"}]}]},
                    {"t": "Link", "c": [["", [], []], [{"t": "Str", "c": "l"}], ["u", "t"]]},
                    {"t": "Math", "c": [{"t": "InlineMath"}, "x"]}
                ]},
                {"t": "Table", "c": [
                    ["tbl", ["wide"], [["width", "50%"]]],
                    [[{"t": "Str", "c": "short"}], [{"t": "Para", "c": [{"t": "Str", "c": "long"}]}]],
                    [[{"t": "AlignRight"}, {"t": "ColWidth", "c": 0.25}]],
                    [["", [], []], []],
                    [],
                    [["", [], []], []]
                ]},
                {"t": "HorizontalRule"}
            ]
        });
        assert_eq!(roundtrip(input.clone()), input);
    }
}
