/*
 * json.rs
 * Copyright (c) 2025 Posit, PBC
 */

use hashlink::LinkedHashMap;
use serde_json::{Map, Value};
use tabattr_pandoc_types::{
    Alignment, ApiVersion, Attr, Block, BlockQuote, BulletList, Caption, Cell, Citation,
    CitationMode, Cite, Code, CodeBlock, ColSpec, ColWidth, DefinitionList, Div, Emph, Figure,
    Header, HorizontalRule, Image, Inline, Inlines, LineBlock, LineBreak, Link, ListAttributes,
    ListNumberDelim, ListNumberStyle, Math, MathType, Meta, MetaValue, Note, OrderedList, Pandoc,
    Paragraph, Plain, QuoteType, Quoted, RawBlock, RawInline, Row, SmallCaps, SoftBreak, Space,
    Span, Str, Strikeout, Strong, Subscript, Superscript, Table, TableBody, TableFoot, TableHead,
    Underline,
};
use thiserror::Error;

/// Oldest API minor version whose table shape we understand (pandoc-types 1.21).
pub const MIN_API_MINOR: u64 = 21;

#[derive(Error, Debug)]
pub enum JsonReadError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid type: {0}")]
    InvalidType(String),
    #[error("Unsupported variant: {0}")]
    UnsupportedVariant(String),
    #[error("Unsupported pandoc-api-version {0:?}: expected 1.21 or newer")]
    UnsupportedApiVersion(Vec<u64>),
}

type Result<T> = std::result::Result<T, JsonReadError>;

pub fn read<R: std::io::Read>(reader: &mut R) -> Result<Pandoc> {
    let mut buffer = String::new();
    reader
        .read_to_string(&mut buffer)
        .map_err(|e| JsonReadError::InvalidJson(serde_json::Error::io(e)))?;
    let json: Value = serde_json::from_str(&buffer)?;
    read_pandoc(&json)
}

pub fn read_pandoc(value: &Value) -> Result<Pandoc> {
    let obj = value
        .as_object()
        .ok_or_else(|| JsonReadError::InvalidType("Expected object for Pandoc".to_string()))?;

    let api_version = read_api_version(
        obj.get("pandoc-api-version")
            .ok_or_else(|| JsonReadError::MissingField("pandoc-api-version".to_string()))?,
    )?;
    let meta = read_meta(
        obj.get("meta")
            .ok_or_else(|| JsonReadError::MissingField("meta".to_string()))?,
    )?;
    let blocks = read_blocks(
        obj.get("blocks")
            .ok_or_else(|| JsonReadError::MissingField("blocks".to_string()))?,
    )?;

    Ok(Pandoc {
        api_version,
        meta,
        blocks,
    })
}

fn read_api_version(value: &Value) -> Result<ApiVersion> {
    let version = value
        .as_array()
        .ok_or_else(|| {
            JsonReadError::InvalidType("pandoc-api-version must be array".to_string())
        })?
        .iter()
        .map(|v| {
            v.as_u64().ok_or_else(|| {
                JsonReadError::InvalidType(
                    "pandoc-api-version components must be integers".to_string(),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let supported = matches!(version.as_slice(), [1, minor, ..] if *minor >= MIN_API_MINOR);
    if supported {
        Ok(version)
    } else {
        Err(JsonReadError::UnsupportedApiVersion(version))
    }
}

// Node helpers. Every Pandoc node is `{"t": tag, "c": content}`.

fn node_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| JsonReadError::InvalidType(format!("Expected object for {}", what)))
}

fn node_tag<'a>(obj: &'a Map<String, Value>) -> Result<&'a str> {
    obj.get("t")
        .and_then(|v| v.as_str())
        .ok_or_else(|| JsonReadError::MissingField("t".to_string()))
}

fn node_content(obj: &Map<String, Value>) -> Result<&Value> {
    field(obj, "c")
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    obj.get(name)
        .ok_or_else(|| JsonReadError::MissingField(name.to_string()))
}

/// Content of a node as an array of exactly `len` elements.
fn content_array<'a>(obj: &'a Map<String, Value>, len: usize, what: &str) -> Result<&'a [Value]> {
    fixed_array(node_content(obj)?, len, what)
}

fn fixed_array<'a>(value: &'a Value, len: usize, what: &str) -> Result<&'a [Value]> {
    let arr = value
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType(format!("{} must be array", what)))?;
    if arr.len() != len {
        return Err(JsonReadError::InvalidType(format!(
            "{} array must have {} elements",
            what, len
        )));
    }
    Ok(arr.as_slice())
}

fn read_string(value: &Value, what: &str) -> Result<String> {
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| JsonReadError::InvalidType(format!("{} must be string", what)))
}

fn read_usize(value: &Value, what: &str) -> Result<usize> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| JsonReadError::InvalidType(format!("{} must be number", what)))
}

fn read_i64(value: &Value, what: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| JsonReadError::InvalidType(format!("{} must be integer", what)))
}

/// Tag of a nullary constructor such as `{"t": "AlignLeft"}`.
fn read_enum_tag<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    let obj = value
        .as_object()
        .ok_or_else(|| JsonReadError::InvalidType(format!("{} must be object", what)))?;
    obj.get("t")
        .and_then(|v| v.as_str())
        .ok_or_else(|| JsonReadError::MissingField(format!("t in {}", what)))
}

fn read_attr(value: &Value) -> Result<Attr> {
    let arr = fixed_array(value, 3, "Attr")?;

    let id = read_string(&arr[0], "Attr id")?;

    let classes = arr[1]
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Attr classes must be array".to_string()))?
        .iter()
        .map(|v| read_string(v, "Class"))
        .collect::<Result<Vec<_>>>()?;

    let kvs = arr[2]
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Attr key-values must be array".to_string()))?
        .iter()
        .map(|v| {
            let kv_arr = fixed_array(v, 2, "Key-value pair")?;
            let key = read_string(&kv_arr[0], "Key")?;
            let value = read_string(&kv_arr[1], "Value")?;
            Ok((key, value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((id, classes, kvs))
}

fn read_citation_mode(value: &Value) -> Result<CitationMode> {
    let t = read_enum_tag(value, "CitationMode")?;
    match t {
        "NormalCitation" => Ok(CitationMode::NormalCitation),
        "AuthorInText" => Ok(CitationMode::AuthorInText),
        "SuppressAuthor" => Ok(CitationMode::SuppressAuthor),
        _ => Err(JsonReadError::UnsupportedVariant(format!(
            "CitationMode: {}",
            t
        ))),
    }
}

fn read_citation(value: &Value) -> Result<Citation> {
    let obj = node_object(value, "Citation")?;
    Ok(Citation {
        id: read_string(field(obj, "citationId")?, "citationId")?,
        prefix: read_inlines(field(obj, "citationPrefix")?)?,
        suffix: read_inlines(field(obj, "citationSuffix")?)?,
        mode: read_citation_mode(field(obj, "citationMode")?)?,
        note_num: read_i64(field(obj, "citationNoteNum")?, "citationNoteNum")?,
        hash: read_i64(field(obj, "citationHash")?, "citationHash")?,
    })
}

fn read_target(value: &Value, what: &str) -> Result<(String, String)> {
    let arr = fixed_array(value, 2, what)?;
    Ok((
        read_string(&arr[0], &format!("{} URL", what))?,
        read_string(&arr[1], &format!("{} title", what))?,
    ))
}

fn read_inline(value: &Value) -> Result<Inline> {
    let obj = node_object(value, "Inline")?;
    let t = node_tag(obj)?;

    match t {
        "Str" => Ok(Inline::Str(Str {
            text: read_string(node_content(obj)?, "Str content")?,
        })),
        "Space" => Ok(Inline::Space(Space)),
        "SoftBreak" => Ok(Inline::SoftBreak(SoftBreak)),
        "LineBreak" => Ok(Inline::LineBreak(LineBreak)),
        "Emph" => Ok(Inline::Emph(Emph {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Underline" => Ok(Inline::Underline(Underline {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Strong" => Ok(Inline::Strong(Strong {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Strikeout" => Ok(Inline::Strikeout(Strikeout {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Superscript" => Ok(Inline::Superscript(Superscript {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Subscript" => Ok(Inline::Subscript(Subscript {
            content: read_inlines(node_content(obj)?)?,
        })),
        "SmallCaps" => Ok(Inline::SmallCaps(SmallCaps {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Quoted" => {
            let arr = content_array(obj, 2, "Quoted")?;
            let quote_type_t = read_enum_tag(&arr[0], "quote type")?;
            let quote_type = match quote_type_t {
                "SingleQuote" => QuoteType::SingleQuote,
                "DoubleQuote" => QuoteType::DoubleQuote,
                _ => {
                    return Err(JsonReadError::UnsupportedVariant(format!(
                        "QuoteType: {}",
                        quote_type_t
                    )));
                }
            };
            Ok(Inline::Quoted(Quoted {
                quote_type,
                content: read_inlines(&arr[1])?,
            }))
        }
        "Cite" => {
            let arr = content_array(obj, 2, "Cite")?;
            let citations = arr[0]
                .as_array()
                .ok_or_else(|| JsonReadError::InvalidType("Citations must be array".to_string()))?
                .iter()
                .map(read_citation)
                .collect::<Result<Vec<_>>>()?;
            Ok(Inline::Cite(Cite {
                citations,
                content: read_inlines(&arr[1])?,
            }))
        }
        "Code" => {
            let arr = content_array(obj, 2, "Code")?;
            Ok(Inline::Code(Code {
                attr: read_attr(&arr[0])?,
                text: read_string(&arr[1], "Code text")?,
            }))
        }
        "Math" => {
            let arr = content_array(obj, 2, "Math")?;
            let math_type_t = read_enum_tag(&arr[0], "math type")?;
            let math_type = match math_type_t {
                "InlineMath" => MathType::InlineMath,
                "DisplayMath" => MathType::DisplayMath,
                _ => {
                    return Err(JsonReadError::UnsupportedVariant(format!(
                        "MathType: {}",
                        math_type_t
                    )));
                }
            };
            Ok(Inline::Math(Math {
                math_type,
                text: read_string(&arr[1], "Math text")?,
            }))
        }
        "RawInline" => {
            let arr = content_array(obj, 2, "RawInline")?;
            Ok(Inline::RawInline(RawInline {
                format: read_string(&arr[0], "RawInline format")?,
                text: read_string(&arr[1], "RawInline text")?,
            }))
        }
        "Link" => {
            let arr = content_array(obj, 3, "Link")?;
            Ok(Inline::Link(Link {
                attr: read_attr(&arr[0])?,
                content: read_inlines(&arr[1])?,
                target: read_target(&arr[2], "Link target")?,
            }))
        }
        "Image" => {
            let arr = content_array(obj, 3, "Image")?;
            Ok(Inline::Image(Image {
                attr: read_attr(&arr[0])?,
                content: read_inlines(&arr[1])?,
                target: read_target(&arr[2], "Image target")?,
            }))
        }
        "Note" => Ok(Inline::Note(Note {
            content: read_blocks(node_content(obj)?)?,
        })),
        "Span" => {
            let arr = content_array(obj, 2, "Span")?;
            Ok(Inline::Span(Span {
                attr: read_attr(&arr[0])?,
                content: read_inlines(&arr[1])?,
            }))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!("Inline: {}", t))),
    }
}

fn read_inlines(value: &Value) -> Result<Inlines> {
    value
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Expected array for Inlines".to_string()))?
        .iter()
        .map(read_inline)
        .collect()
}

fn read_blocks(value: &Value) -> Result<Vec<Block>> {
    value
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Expected array for blocks".to_string()))?
        .iter()
        .map(read_block)
        .collect()
}

fn read_blockss(value: &Value) -> Result<Vec<Vec<Block>>> {
    value
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Expected array for blockss".to_string()))?
        .iter()
        .map(read_blocks)
        .collect()
}

fn read_list_attributes(value: &Value) -> Result<ListAttributes> {
    let arr = fixed_array(value, 3, "ListAttributes")?;
    let start = read_i64(&arr[0], "ListAttributes start number")?;

    let style_t = read_enum_tag(&arr[1], "number style")?;
    let style = match style_t {
        "DefaultStyle" => ListNumberStyle::Default,
        "Example" => ListNumberStyle::Example,
        "Decimal" => ListNumberStyle::Decimal,
        "LowerRoman" => ListNumberStyle::LowerRoman,
        "UpperRoman" => ListNumberStyle::UpperRoman,
        "LowerAlpha" => ListNumberStyle::LowerAlpha,
        "UpperAlpha" => ListNumberStyle::UpperAlpha,
        _ => {
            return Err(JsonReadError::UnsupportedVariant(format!(
                "ListNumberStyle: {}",
                style_t
            )));
        }
    };

    let delim_t = read_enum_tag(&arr[2], "number delimiter")?;
    let delim = match delim_t {
        "DefaultDelim" => ListNumberDelim::Default,
        "Period" => ListNumberDelim::Period,
        "OneParen" => ListNumberDelim::OneParen,
        "TwoParens" => ListNumberDelim::TwoParens,
        _ => {
            return Err(JsonReadError::UnsupportedVariant(format!(
                "ListNumberDelim: {}",
                delim_t
            )));
        }
    };

    Ok((start, style, delim))
}

fn read_caption(value: &Value) -> Result<Caption> {
    let arr = fixed_array(value, 2, "Caption")?;
    let short = if arr[0].is_null() {
        None
    } else {
        Some(read_inlines(&arr[0])?)
    };
    let long = read_blocks(&arr[1])?;
    Ok(Caption { short, long })
}

fn read_alignment(value: &Value) -> Result<Alignment> {
    let t = read_enum_tag(value, "Alignment")?;
    match t {
        "AlignLeft" => Ok(Alignment::Left),
        "AlignCenter" => Ok(Alignment::Center),
        "AlignRight" => Ok(Alignment::Right),
        "AlignDefault" => Ok(Alignment::Default),
        _ => Err(JsonReadError::UnsupportedVariant(format!(
            "Alignment: {}",
            t
        ))),
    }
}

fn read_colwidth(value: &Value) -> Result<ColWidth> {
    let obj = node_object(value, "ColWidth")?;
    let t = node_tag(obj)?;
    match t {
        "ColWidthDefault" => Ok(ColWidth::Default),
        "ColWidth" => {
            let width = node_content(obj)?.as_f64().ok_or_else(|| {
                JsonReadError::InvalidType("ColWidth percentage must be number".to_string())
            })?;
            Ok(ColWidth::Percentage(width))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!(
            "ColWidth: {}",
            t
        ))),
    }
}

fn read_colspec(value: &Value) -> Result<ColSpec> {
    let arr = fixed_array(value, 2, "ColSpec")?;
    Ok((read_alignment(&arr[0])?, read_colwidth(&arr[1])?))
}

fn read_cell(value: &Value) -> Result<Cell> {
    let arr = fixed_array(value, 5, "Cell")?;
    Ok(Cell {
        attr: read_attr(&arr[0])?,
        alignment: read_alignment(&arr[1])?,
        row_span: read_usize(&arr[2], "Cell row_span")?,
        col_span: read_usize(&arr[3], "Cell col_span")?,
        content: read_blocks(&arr[4])?,
    })
}

fn read_row(value: &Value) -> Result<Row> {
    let arr = fixed_array(value, 2, "Row")?;
    let cells = arr[1]
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Row cells must be array".to_string()))?
        .iter()
        .map(read_cell)
        .collect::<Result<Vec<_>>>()?;
    Ok(Row {
        attr: read_attr(&arr[0])?,
        cells,
    })
}

fn read_rows(value: &Value, what: &str) -> Result<Vec<Row>> {
    value
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType(format!("{} must be array", what)))?
        .iter()
        .map(read_row)
        .collect()
}

fn read_table_head(value: &Value) -> Result<TableHead> {
    let arr = fixed_array(value, 2, "TableHead")?;
    Ok(TableHead {
        attr: read_attr(&arr[0])?,
        rows: read_rows(&arr[1], "TableHead rows")?,
    })
}

fn read_table_body(value: &Value) -> Result<TableBody> {
    let arr = fixed_array(value, 4, "TableBody")?;
    Ok(TableBody {
        attr: read_attr(&arr[0])?,
        rowhead_columns: read_usize(&arr[1], "TableBody rowhead_columns")?,
        head: read_rows(&arr[2], "TableBody head")?,
        body: read_rows(&arr[3], "TableBody body")?,
    })
}

fn read_table_foot(value: &Value) -> Result<TableFoot> {
    let arr = fixed_array(value, 2, "TableFoot")?;
    Ok(TableFoot {
        attr: read_attr(&arr[0])?,
        rows: read_rows(&arr[1], "TableFoot rows")?,
    })
}

fn read_table(obj: &Map<String, Value>) -> Result<Table> {
    let arr = content_array(obj, 6, "Table")?;
    let colspec = arr[2]
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Table colspec must be array".to_string()))?
        .iter()
        .map(read_colspec)
        .collect::<Result<Vec<_>>>()?;
    let bodies = arr[4]
        .as_array()
        .ok_or_else(|| JsonReadError::InvalidType("Table bodies must be array".to_string()))?
        .iter()
        .map(read_table_body)
        .collect::<Result<Vec<_>>>()?;
    Ok(Table {
        attr: read_attr(&arr[0])?,
        caption: read_caption(&arr[1])?,
        colspec,
        head: read_table_head(&arr[3])?,
        bodies,
        foot: read_table_foot(&arr[5])?,
    })
}

fn read_block(value: &Value) -> Result<Block> {
    let obj = node_object(value, "Block")?;
    let t = node_tag(obj)?;

    match t {
        "Plain" => Ok(Block::Plain(Plain {
            content: read_inlines(node_content(obj)?)?,
        })),
        "Para" => Ok(Block::Paragraph(Paragraph {
            content: read_inlines(node_content(obj)?)?,
        })),
        "LineBlock" => {
            let content = node_content(obj)?
                .as_array()
                .ok_or_else(|| {
                    JsonReadError::InvalidType("LineBlock content must be array".to_string())
                })?
                .iter()
                .map(read_inlines)
                .collect::<Result<Vec<_>>>()?;
            Ok(Block::LineBlock(LineBlock { content }))
        }
        "CodeBlock" => {
            let arr = content_array(obj, 2, "CodeBlock")?;
            Ok(Block::CodeBlock(CodeBlock {
                attr: read_attr(&arr[0])?,
                text: read_string(&arr[1], "CodeBlock text")?,
            }))
        }
        "RawBlock" => {
            let arr = content_array(obj, 2, "RawBlock")?;
            Ok(Block::RawBlock(RawBlock {
                format: read_string(&arr[0], "RawBlock format")?,
                text: read_string(&arr[1], "RawBlock text")?,
            }))
        }
        "BlockQuote" => Ok(Block::BlockQuote(BlockQuote {
            content: read_blocks(node_content(obj)?)?,
        })),
        "OrderedList" => {
            let arr = content_array(obj, 2, "OrderedList")?;
            Ok(Block::OrderedList(OrderedList {
                attr: read_list_attributes(&arr[0])?,
                content: read_blockss(&arr[1])?,
            }))
        }
        "BulletList" => Ok(Block::BulletList(BulletList {
            content: read_blockss(node_content(obj)?)?,
        })),
        "DefinitionList" => {
            let content = node_content(obj)?
                .as_array()
                .ok_or_else(|| {
                    JsonReadError::InvalidType("DefinitionList content must be array".to_string())
                })?
                .iter()
                .map(|item| {
                    let item_arr = fixed_array(item, 2, "DefinitionList item")?;
                    let term = read_inlines(&item_arr[0])?;
                    let definition = read_blockss(&item_arr[1])?;
                    Ok((term, definition))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Block::DefinitionList(DefinitionList { content }))
        }
        "Header" => {
            let arr = content_array(obj, 3, "Header")?;
            Ok(Block::Header(Header {
                level: read_usize(&arr[0], "Header level")?,
                attr: read_attr(&arr[1])?,
                content: read_inlines(&arr[2])?,
            }))
        }
        "HorizontalRule" => Ok(Block::HorizontalRule(HorizontalRule)),
        "Table" => Ok(Block::Table(read_table(obj)?)),
        "Figure" => {
            let arr = content_array(obj, 3, "Figure")?;
            Ok(Block::Figure(Figure {
                attr: read_attr(&arr[0])?,
                caption: read_caption(&arr[1])?,
                content: read_blocks(&arr[2])?,
            }))
        }
        "Div" => {
            let arr = content_array(obj, 2, "Div")?;
            Ok(Block::Div(Div {
                attr: read_attr(&arr[0])?,
                content: read_blocks(&arr[1])?,
            }))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!("Block: {}", t))),
    }
}

fn read_meta(value: &Value) -> Result<Meta> {
    let obj = value
        .as_object()
        .ok_or_else(|| JsonReadError::InvalidType("Expected object for Meta".to_string()))?;
    read_meta_map(obj)
}

fn read_meta_map(obj: &Map<String, Value>) -> Result<LinkedHashMap<String, MetaValue>> {
    let mut meta = LinkedHashMap::new();
    for (key, val) in obj {
        meta.insert(key.clone(), read_meta_value(val)?);
    }
    Ok(meta)
}

fn read_meta_value(value: &Value) -> Result<MetaValue> {
    let obj = node_object(value, "MetaValue")?;
    let t = node_tag(obj)?;

    match t {
        "MetaString" => Ok(MetaValue::MetaString(read_string(
            node_content(obj)?,
            "MetaString content",
        )?)),
        "MetaInlines" => Ok(MetaValue::MetaInlines(read_inlines(node_content(obj)?)?)),
        "MetaBlocks" => Ok(MetaValue::MetaBlocks(read_blocks(node_content(obj)?)?)),
        "MetaBool" => {
            let c = node_content(obj)?.as_bool().ok_or_else(|| {
                JsonReadError::InvalidType("MetaBool content must be boolean".to_string())
            })?;
            Ok(MetaValue::MetaBool(c))
        }
        "MetaList" => {
            let list = node_content(obj)?
                .as_array()
                .ok_or_else(|| {
                    JsonReadError::InvalidType("MetaList content must be array".to_string())
                })?
                .iter()
                .map(read_meta_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(MetaValue::MetaList(list))
        }
        "MetaMap" => {
            let map = node_content(obj)?.as_object().ok_or_else(|| {
                JsonReadError::InvalidType("MetaMap content must be object".to_string())
            })?;
            Ok(MetaValue::MetaMap(read_meta_map(map)?))
        }
        _ => Err(JsonReadError::UnsupportedVariant(format!(
            "MetaValue: {}",
            t
        ))),
    }
}
