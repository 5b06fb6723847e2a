/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

pub mod inline_text;
