/*
 * filter_context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Context for filter execution, collecting warnings in document order.

use std::fmt;

/// A problem that did not stop the filter, such as a skipped token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}", self.message)
    }
}

/// Context for filter execution.
///
/// This context is threaded through filter traversal functions so that
/// filters can report problems without aborting the run. Diagnostics are
/// kept in the order they were raised, which is document order for a
/// single top-down traversal.
#[derive(Debug, Default)]
pub struct FilterContext {
    diagnostics: Vec<Diagnostic>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Add a warning
    pub fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            message: message.into(),
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume context and return diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Emit every collected diagnostic through `tracing`.
    pub fn emit(&self) {
        for diagnostic in &self.diagnostics {
            tracing::warn!("{}", diagnostic.message);
        }
    }
}
