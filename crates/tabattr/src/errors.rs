/*
 * errors.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for tabattr

use crate::readers::json::JsonReadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabattrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Read(#[from] JsonReadError),

    #[error("Failed to write JSON: {0}")]
    Write(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TabattrError>;
