/*
 * table_attr_filter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests running Pandoc JSON documents through the filter.
 */

use serde_json::{Value, json};
use tabattr::options::{DuplicateIdPolicy, OptionOverrides};
use tabattr::{FilterContext, run_filter};

/// Pandoc JSON inlines for plain prose: words separated by `Space`.
fn inlines(text: &str) -> Vec<Value> {
    let mut result = Vec::new();
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            result.push(json!({"t": "Space"}));
        }
        if !word.is_empty() {
            result.push(json!({"t": "Str", "c": word}));
        }
    }
    result
}

fn plain(text: &str) -> Value {
    json!({"t": "Plain", "c": inlines(text)})
}

fn cell(blocks: Vec<Value>) -> Value {
    json!([["", [], []], {"t": "AlignDefault"}, 1, 1, blocks])
}

fn table(caption_blocks: Vec<Value>, cell_blocks: Vec<Value>) -> Value {
    json!({
        "t": "Table",
        "c": [
            ["", [], []],
            [null, caption_blocks],
            [[{"t": "AlignDefault"}, {"t": "ColWidthDefault"}]],
            [["", [], []], []],
            [[["", [], []], 0, [], [[["", [], []], [cell(cell_blocks)]]]]],
            [["", [], []], []]
        ]
    })
}

fn document(blocks: Vec<Value>) -> Value {
    json!({
        "pandoc-api-version": [1, 23, 1],
        "meta": {},
        "blocks": blocks
    })
}

fn run_with(input: &Value, overrides: OptionOverrides) -> (Value, FilterContext) {
    let text = serde_json::to_string(input).unwrap();
    let mut output = Vec::new();
    let ctx = run_filter(&mut text.as_bytes(), &mut output, overrides).unwrap();
    (serde_json::from_slice(&output).unwrap(), ctx)
}

fn run(input: &Value) -> Value {
    run_with(input, OptionOverrides::default()).0
}

fn warnings(ctx: &FilterContext) -> Vec<String> {
    ctx.diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn test_caption_literal_moves_to_table() {
    let input = document(vec![table(
        vec![plain("Table caption. {#id .class key=val}")],
        vec![plain("1")],
    )]);
    let output = run(&input);

    let expected = document(vec![{
        let mut t = table(vec![plain("Table caption.")], vec![plain("1")]);
        t["c"][0] = json!(["id", ["class"], [["key", "val"]]]);
        t
    }]);
    assert_eq!(output, expected);
}

#[test]
fn test_document_without_literals_is_unchanged() {
    let input = document(vec![
        json!({"t": "Para", "c": inlines("Some {braces} in prose {#not-a-table}")}),
        table(vec![plain("A caption without attributes")], vec![plain("x")]),
        json!({"t": "HorizontalRule"}),
    ]);
    assert_eq!(run(&input), input);
}

#[test]
fn test_api_version_and_metadata_preserved() {
    let mut input = document(vec![table(vec![plain("Caption {.c}")], vec![])]);
    input["pandoc-api-version"] = json!([1, 22, 2, 1]);
    input["meta"] = json!({
        "title": {"t": "MetaInlines", "c": inlines("A title")},
        "draft": {"t": "MetaBool", "c": false}
    });

    let output = run(&input);
    assert_eq!(output["pandoc-api-version"], json!([1, 22, 2, 1]));
    assert_eq!(output["meta"], input["meta"]);
    assert_eq!(output["blocks"][0]["c"][0], json!(["", ["c"], []]));
}

#[test]
fn test_trailing_space_and_quoted_values() {
    let mut caption = inlines(r#"Results {#tbl-results width="50%" title="a {b} c"}"#);
    caption.push(json!({"t": "Space"}));
    let input = document(vec![table(vec![json!({"t": "Plain", "c": caption})], vec![])]);

    let output = run(&input);
    let t = &output["blocks"][0]["c"];
    assert_eq!(
        t[0],
        json!(["tbl-results", [], [["width", "50%"], ["title", "a {b} c"]]])
    );
    assert_eq!(t[1], json!([null, [plain("Results")]]));
}

#[test]
fn test_smart_quoted_value() {
    let mut caption = inlines("Sales {title=");
    caption.push(json!({"t": "Quoted", "c": [{"t": "DoubleQuote"}, inlines("Q3 figures")]}));
    caption.push(json!({"t": "Str", "c": "}"}));
    let input = document(vec![table(vec![json!({"t": "Para", "c": caption})], vec![])]);

    let output = run(&input);
    let t = &output["blocks"][0]["c"];
    assert_eq!(t[0], json!(["", [], [["title", "Q3 figures"]]]));
    assert_eq!(t[1], json!([null, [{"t": "Para", "c": inlines("Sales")}]]));
}

#[test]
fn test_literal_only_caption_is_removed() {
    let input = document(vec![table(vec![plain("{#tbl-bare .compact}")], vec![])]);
    let output = run(&input);
    let t = &output["blocks"][0]["c"];
    assert_eq!(t[0], json!(["tbl-bare", ["compact"], []]));
    assert_eq!(t[1], json!([null, []]));
}

#[test]
fn test_nested_tables_are_processed() {
    let inner = table(vec![plain("Inner {#inner}")], vec![plain("deep")]);
    let outer = table(vec![plain("Outer {#outer}")], vec![inner]);
    let input = document(vec![json!({
        "t": "Div",
        "c": [["wrapper", [], []], [outer]]
    })]);

    let output = run(&input);
    let outer = &output["blocks"][0]["c"][1][0]["c"];
    assert_eq!(outer[0][0], "outer");
    assert_eq!(outer[1], json!([null, [plain("Outer")]]));

    let inner = &outer[4][0][3][0][1][0][4][0]["c"];
    assert_eq!(inner[0][0], "inner");
    assert_eq!(inner[1], json!([null, [plain("Inner")]]));
}

#[test]
fn test_tables_in_metadata_are_processed() {
    let mut input = document(vec![]);
    input["meta"] = json!({
        "appendix": {"t": "MetaBlocks", "c": [table(vec![plain("Appendix {.small}")], vec![])]}
    });

    let output = run(&input);
    let t = &output["meta"]["appendix"]["c"][0]["c"];
    assert_eq!(t[0], json!(["", ["small"], []]));
}

#[test]
fn test_filter_is_idempotent() {
    let input = document(vec![
        table(vec![plain("First. {#a .x k=v}")], vec![]),
        table(vec![plain("Second {.y}")], vec![]),
    ]);
    let once = run(&input);
    assert_eq!(run(&once), once);
}

#[test]
fn test_duplicate_ids_follow_policy() {
    let input = document(vec![table(vec![plain("Caption {#one #two .c}")], vec![])]);

    let (output, ctx) = run_with(&input, OptionOverrides::default());
    assert_eq!(output, input);
    assert_eq!(warnings(&ctx).len(), 1);

    let overrides = OptionOverrides {
        duplicate_ids: Some(DuplicateIdPolicy::LastWins),
        ..Default::default()
    };
    let (output, ctx) = run_with(&input, overrides);
    assert_eq!(output["blocks"][0]["c"][0], json!(["two", ["c"], []]));
    assert_eq!(warnings(&ctx).len(), 1);
}

#[test]
fn test_metadata_options() {
    let mut input = document(vec![table(vec![plain("Caption {#one #two}")], vec![])]);
    input["meta"] = json!({
        "table-attr": {"t": "MetaMap", "c": {
            "duplicate-ids": {"t": "MetaInlines", "c": [{"t": "Str", "c": "first-wins"}]}
        }}
    });

    let output = run(&input);
    assert_eq!(output["blocks"][0]["c"][0], json!(["one", [], []]));
}

#[test]
fn test_disabled_by_metadata_and_cli() {
    let mut input = document(vec![table(vec![plain("Caption {.c}")], vec![])]);
    input["meta"] = json!({"table-attr": {"t": "MetaBool", "c": false}});
    assert_eq!(run(&input), input);

    let input = document(vec![table(vec![plain("Caption {.c}")], vec![])]);
    let overrides = OptionOverrides {
        enabled: Some(false),
        ..Default::default()
    };
    assert_eq!(run_with(&input, overrides).0, input);
}

#[test]
fn test_warnings_in_document_order() {
    let input = document(vec![
        table(vec![plain("First {.a bad!}")], vec![]),
        table(vec![plain("Second {.b 9lives}")], vec![]),
    ]);
    let (_, ctx) = run_with(&input, OptionOverrides::default());
    let messages = warnings(&ctx);
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("bad!"));
    assert!(messages[1].contains("9lives"));
}

#[test]
fn test_invalid_input_is_an_error() {
    let mut output = Vec::new();
    let result = run_filter(&mut "not json".as_bytes(), &mut output, OptionOverrides::default());
    assert!(result.is_err());

    let old = json!({"pandoc-api-version": [1, 20], "meta": {}, "blocks": []}).to_string();
    let result = run_filter(&mut old.as_bytes(), &mut output, OptionOverrides::default());
    assert!(result.is_err());
    assert!(output.is_empty());
}
