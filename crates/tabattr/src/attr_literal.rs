/*
 * attr_literal.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Attribute literals: `{#id .class key="value"}`.
//!
//! Matching happens in two steps. [`find_trailing_literal`] locates a
//! balanced brace group at the very end of a piece of text, scanning
//! backwards so that prose before the group (apostrophes, stray braces) never
//! affects the result. [`parse_literal`] then tokenizes the interior and
//! builds an [`AttributeRecord`].

use crate::filter_context::FilterContext;
use crate::options::DuplicateIdPolicy;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tabattr_pandoc_types::Attr;

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_:.\-]*$").expect("valid identifier regex"));
static CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_A-Za-z][_A-Za-z0-9\-]*$").expect("valid class regex"));
static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_A-Za-z][_A-Za-z0-9.\-]*$").expect("valid key regex"));
static UNQUOTED_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^\s"'={}]+$"#).expect("valid value regex"));

/// Identifier, classes and key-value pairs parsed from an attribute literal.
///
/// Key-values keep insertion order; a repeated key keeps its first position
/// and takes the last value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeRecord {
    pub identifier: Option<String>,
    pub classes: Vec<String>,
    pub key_values: IndexMap<String, String>,
}

impl AttributeRecord {
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none() && self.classes.is_empty() && self.key_values.is_empty()
    }

    /// Render the record as `{#id .c1 .c2 key="value"}`. Values are always
    /// double-quoted.
    pub fn to_literal(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = &self.identifier {
            parts.push(format!("#{}", id));
        }
        for class in &self.classes {
            parts.push(format!(".{}", class));
        }
        for (key, value) in &self.key_values {
            parts.push(format!("{}=\"{}\"", key, escape_value(value)));
        }
        format!("{{{}}}", parts.join(" "))
    }

    /// Parse text consisting of exactly one attribute literal, optionally
    /// surrounded by whitespace.
    pub fn from_literal(text: &str) -> Option<Self> {
        let text = text.trim();
        let span = find_trailing_literal(text)?;
        if span.open != 0 {
            return None;
        }
        let mut ctx = FilterContext::new();
        parse_literal(span.interior(text), DuplicateIdPolicy::default(), &mut ctx)
    }

    /// Merge the record into an existing `Attr`.
    ///
    /// The identifier replaces the existing one only when present, classes
    /// already on the element are not repeated, and a key that already
    /// exists has its value replaced in place.
    pub fn apply_to(self, attr: &mut Attr) {
        if let Some(id) = self.identifier {
            attr.0 = id;
        }
        for class in self.classes {
            if !attr.1.contains(&class) {
                attr.1.push(class);
            }
        }
        for (key, value) in self.key_values {
            match attr.2.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => attr.2.push((key, value)),
            }
        }
    }
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Byte offsets of the braces of a literal found in some text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralSpan {
    pub open: usize,
    pub close: usize,
}

impl LiteralSpan {
    /// The text between the braces.
    pub fn interior<'a>(&self, text: &'a str) -> &'a str {
        &text[self.open + 1..self.close]
    }

    /// Where text has to be cut to remove the literal together with the
    /// whitespace run in front of it.
    pub fn cut_offset(&self, text: &str) -> usize {
        text[..self.open].trim_end().len()
    }
}

/// A character is escaped when an odd number of backslashes precede it.
fn is_escaped(chars: &[(usize, char)], i: usize) -> bool {
    chars[..i]
        .iter()
        .rev()
        .take_while(|(_, c)| *c == '\\')
        .count()
        % 2
        == 1
}

/// Locate a brace group ending at the last non-whitespace character of
/// `text`.
///
/// Nested braces must balance and quoted runs are skipped as a unit, so
/// braces inside `"..."` or `'...'` do not count. Backslash-escaped braces
/// and quotes are ordinary characters. Returns `None` when the text does not
/// end in `}` or the group is unbalanced or has an unterminated quote.
pub fn find_trailing_literal(text: &str) -> Option<LiteralSpan> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut end = chars.len();
    while end > 0 && chars[end - 1].1.is_whitespace() {
        end -= 1;
    }
    let close = end.checked_sub(1)?;
    if chars[close].1 != '}' || is_escaped(&chars, close) {
        return None;
    }

    let mut depth = 0usize;
    let mut i = close + 1;
    while i > 0 {
        i -= 1;
        let c = chars[i].1;
        if is_escaped(&chars, i) {
            continue;
        }
        match c {
            '}' => depth += 1,
            '{' => {
                depth -= 1;
                if depth == 0 {
                    return Some(LiteralSpan {
                        open: chars[i].0,
                        close: chars[close].0,
                    });
                }
            }
            '"' | '\'' => loop {
                if i == 0 {
                    return None;
                }
                i -= 1;
                if chars[i].1 == c && !is_escaped(&chars, i) {
                    break;
                }
            },
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Equals,
    Unterminated(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "{}", word),
            Token::Quoted(value) => write!(f, "\"{}\"", escape_value(value)),
            Token::Equals => write!(f, "="),
            Token::Unterminated(text) => write!(f, "{}", text),
        }
    }
}

fn tokenize(interior: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = interior.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '=' {
            chars.next();
            tokens.push(Token::Equals);
            continue;
        }
        if c == '"' || c == '\'' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                if ch == '\\' {
                    match chars.peek() {
                        Some(&next) if next == '"' || next == '\'' || next == '\\' => {
                            value.push(next);
                            chars.next();
                        }
                        _ => value.push('\\'),
                    }
                } else if ch == c {
                    closed = true;
                    break;
                } else {
                    value.push(ch);
                }
            }
            if closed {
                tokens.push(Token::Quoted(value));
            } else {
                tokens.push(Token::Unterminated(format!("{}{}", c, value)));
            }
            continue;
        }

        let mut word = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() || ch == '=' || ch == '"' || ch == '\'' {
                break;
            }
            chars.next();
            word.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
        }
        tokens.push(Token::Word(word));
    }

    tokens
}

/// Parse the interior of an attribute literal.
///
/// Malformed tokens are skipped with a warning on `ctx`. Returns `None` when
/// nothing valid remains, or when several identifiers are present and
/// `policy` rejects them; the text is then not an attribute literal.
pub fn parse_literal(
    interior: &str,
    policy: DuplicateIdPolicy,
    ctx: &mut FilterContext,
) -> Option<AttributeRecord> {
    let mut identifiers = Vec::new();
    let mut record = AttributeRecord::default();
    let mut skipped = Vec::new();

    let mut tokens = tokenize(interior).into_iter().peekable();
    while let Some(token) = tokens.next() {
        let word = match token {
            Token::Word(word) => word,
            other => {
                skipped.push(other.to_string());
                continue;
            }
        };

        if tokens.peek() == Some(&Token::Equals) {
            tokens.next();
            let value = match tokens.next() {
                Some(Token::Word(value)) if UNQUOTED_VALUE_RE.is_match(&value) => Ok(value),
                Some(Token::Quoted(value)) => Ok(value),
                Some(other) => Err(other.to_string()),
                None => Err(String::new()),
            };
            match value {
                Ok(value) if KEY_RE.is_match(&word) => {
                    record.key_values.insert(word, value);
                }
                Ok(value) => skipped.push(format!("{}=\"{}\"", word, escape_value(&value))),
                Err(value) => skipped.push(format!("{}={}", word, value)),
            }
        } else if let Some(id) = word.strip_prefix('#').filter(|id| ID_RE.is_match(id)) {
            identifiers.push(id.to_string());
        } else if let Some(class) = word.strip_prefix('.').filter(|c| CLASS_RE.is_match(c)) {
            record.classes.push(class.to_string());
        } else {
            skipped.push(word);
        }
    }

    if identifiers.len() > 1 {
        let listed = identifiers
            .iter()
            .map(|id| format!("#{}", id))
            .collect::<Vec<_>>()
            .join(", ");
        match policy {
            DuplicateIdPolicy::Reject => {
                ctx.warn(format!(
                    "Table caption attributes name several identifiers ({}); leaving the caption unchanged",
                    listed
                ));
                return None;
            }
            DuplicateIdPolicy::FirstWins => {
                ctx.warn(format!(
                    "Table caption attributes name several identifiers ({}); using the first",
                    listed
                ));
                record.identifier = identifiers.into_iter().next();
            }
            DuplicateIdPolicy::LastWins => {
                ctx.warn(format!(
                    "Table caption attributes name several identifiers ({}); using the last",
                    listed
                ));
                record.identifier = identifiers.pop();
            }
        }
    } else {
        record.identifier = identifiers.pop();
    }

    if record.is_empty() {
        return None;
    }
    for token in skipped {
        ctx.warn(format!(
            "Skipping malformed token `{}` in table caption attributes",
            token
        ));
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(interior: &str) -> (Option<AttributeRecord>, Vec<String>) {
        parse_with(interior, DuplicateIdPolicy::Reject)
    }

    fn parse_with(interior: &str, policy: DuplicateIdPolicy) -> (Option<AttributeRecord>, Vec<String>) {
        let mut ctx = FilterContext::new();
        let record = parse_literal(interior, policy, &mut ctx);
        let messages = ctx
            .into_diagnostics()
            .into_iter()
            .map(|d| d.message)
            .collect();
        (record, messages)
    }

    fn kv(record: &AttributeRecord) -> Vec<(&str, &str)> {
        record
            .key_values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_find_simple_literal() {
        let text = "Table caption. {#id .class key=val}";
        let span = find_trailing_literal(text).unwrap();
        assert_eq!(span.interior(text), "#id .class key=val");
        assert_eq!(span.cut_offset(text), "Table caption.".len());
    }

    #[test]
    fn test_find_allows_trailing_whitespace() {
        let text = "Caption {.c}  \n";
        let span = find_trailing_literal(text).unwrap();
        assert_eq!(span.interior(text), ".c");
    }

    #[test]
    fn test_find_requires_literal_at_end() {
        assert_eq!(find_trailing_literal("{#id} trailing words"), None);
        assert_eq!(find_trailing_literal("no braces"), None);
        assert_eq!(find_trailing_literal(""), None);
    }

    #[test]
    fn test_find_unbalanced_is_no_match() {
        assert_eq!(find_trailing_literal("Caption #id}"), None);
        assert_eq!(find_trailing_literal("Caption {#id key=\"open}"), None);
    }

    #[test]
    fn test_find_handles_nested_braces() {
        let text = "x {a {b} c}";
        let span = find_trailing_literal(text).unwrap();
        assert_eq!(span.interior(text), "a {b} c");
    }

    #[test]
    fn test_find_skips_braces_inside_quotes() {
        let text = r#"Caption {title="a } b" .c}"#;
        let span = find_trailing_literal(text).unwrap();
        assert_eq!(span.interior(text), r#"title="a } b" .c"#);
    }

    #[test]
    fn test_find_ignores_apostrophes_before_literal() {
        let text = "Bob's table {#bob}";
        let span = find_trailing_literal(text).unwrap();
        assert_eq!(span.interior(text), "#bob");
    }

    #[test]
    fn test_escaped_braces_do_not_match() {
        assert_eq!(find_trailing_literal(r"Caption \{#id\}"), None);
        assert_eq!(find_trailing_literal(r"Caption \{#id}"), None);
    }

    #[test]
    fn test_parse_id_classes_and_key_values() {
        let (record, warnings) = parse(r#"#tbl:results .wide .striped width="50%" data-x=1"#);
        let record = record.unwrap();
        assert_eq!(record.identifier.as_deref(), Some("tbl:results"));
        assert_eq!(record.classes, vec!["wide", "striped"]);
        assert_eq!(kv(&record), vec![("width", "50%"), ("data-x", "1")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_spaced_equals() {
        let (record, _) = parse("key = val other= 'x y'");
        assert_eq!(kv(&record.unwrap()), vec![("key", "val"), ("other", "x y")]);
    }

    #[test]
    fn test_parse_quoted_value_escapes() {
        let (record, _) = parse(r#"title="say \"hi\" \{ok\} \\ \n""#);
        assert_eq!(
            kv(&record.unwrap()),
            vec![("title", r#"say "hi" \{ok\} \ \n"#)]
        );
    }

    #[test]
    fn test_repeated_key_keeps_position_takes_last_value() {
        let (record, _) = parse("a=1 b=2 a=3");
        assert_eq!(kv(&record.unwrap()), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_malformed_tokens_are_skipped_with_warning() {
        let (record, warnings) = parse("#id 9lives .ok =x key=");
        let record = record.unwrap();
        assert_eq!(record.identifier.as_deref(), Some("id"));
        assert_eq!(record.classes, vec!["ok"]);
        assert!(record.key_values.is_empty());
        // `=x` splits into a stray `=` and a bare word
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("`9lives`"));
        assert!(warnings[1].contains("`=`"));
        assert!(warnings[2].contains("`x`"));
        assert!(warnings[3].contains("`key=`"));
    }

    #[test]
    fn test_literal_without_attributes_is_not_a_match() {
        assert_eq!(parse(""), (None, vec![]));
        assert_eq!(parse("a, b"), (None, vec![]));
    }

    #[test]
    fn test_duplicate_ids_rejected_by_default() {
        let (record, warnings) = parse("#one #two .c");
        assert_eq!(record, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("#one, #two"));
    }

    #[test]
    fn test_duplicate_id_policies() {
        let (first, _) = parse_with("#one #two", DuplicateIdPolicy::FirstWins);
        assert_eq!(first.unwrap().identifier.as_deref(), Some("one"));

        let (last, warnings) = parse_with("#one #two", DuplicateIdPolicy::LastWins);
        assert_eq!(last.unwrap().identifier.as_deref(), Some("two"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_to_literal_snapshot() {
        let mut record = AttributeRecord {
            identifier: Some("tbl-results".to_string()),
            classes: vec!["wide".to_string(), "striped".to_string()],
            key_values: IndexMap::new(),
        };
        record
            .key_values
            .insert("width".to_string(), "50%".to_string());
        record
            .key_values
            .insert("title".to_string(), r#"a "b" \c"#.to_string());
        insta::assert_snapshot!(
            record.to_literal(),
            @r#"{#tbl-results .wide .striped width="50%" title="a \"b\" \\c"}"#
        );
    }

    #[test]
    fn test_from_literal_roundtrip() {
        let literal = r#"{#id .a .b key="v a l" other="}"}"#;
        let record = AttributeRecord::from_literal(literal).unwrap();
        assert_eq!(record.to_literal(), literal);
        assert_eq!(AttributeRecord::from_literal("prefix {#id}"), None);
    }

    #[test]
    fn test_apply_merges_into_existing_attr() {
        let mut attr: Attr = (
            "old".to_string(),
            vec!["keep".to_string()],
            vec![("width".to_string(), "10%".to_string())],
        );
        let record = AttributeRecord::from_literal(r#"{.keep .new width="50%" height=2}"#).unwrap();
        record.apply_to(&mut attr);
        assert_eq!(attr.0, "old");
        assert_eq!(attr.1, vec!["keep", "new"]);
        assert_eq!(
            attr.2,
            vec![
                ("width".to_string(), "50%".to_string()),
                ("height".to_string(), "2".to_string())
            ]
        );
    }
}
