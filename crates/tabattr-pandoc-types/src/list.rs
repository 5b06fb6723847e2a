/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListNumberStyle {
    Default,
    Example,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListNumberDelim {
    Default,
    Period,
    OneParen,
    TwoParens,
}

/// Start number, number style, and delimiter of an ordered list.
pub type ListAttributes = (i64, ListNumberStyle, ListNumberDelim);
