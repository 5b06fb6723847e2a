/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Configuration for the table attribute filter.
 */

//! Filter options.
//!
//! Options come from three places, highest precedence first: command-line
//! flags, the `table-attr` map in the document metadata, and defaults.
//!
//! ```yaml
//! table-attr:
//!   enabled: true
//!   duplicate-ids: last-wins
//! ```
//!
//! `table-attr: false` turns the filter off.

use crate::filter_context::FilterContext;
use crate::utils::inline_text::meta_to_json;
use serde::Deserialize;
use tabattr_pandoc_types::{Meta, MetaValue};

/// Metadata key holding the filter options.
pub const META_KEY: &str = "table-attr";

/// What to do when an attribute literal names more than one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateIdPolicy {
    /// Do not treat the text as an attribute literal (default)
    #[default]
    Reject,
    /// Keep the first identifier
    FirstWins,
    /// Keep the last identifier
    LastWins,
}

impl DuplicateIdPolicy {
    /// Convert to string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::FirstWins => "first-wins",
            Self::LastWins => "last-wins",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableAttrOptions {
    pub enabled: bool,
    pub duplicate_ids: DuplicateIdPolicy,
}

impl Default for TableAttrOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            duplicate_ids: DuplicateIdPolicy::default(),
        }
    }
}

/// Values set explicitly on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub enabled: Option<bool>,
    pub duplicate_ids: Option<DuplicateIdPolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct MetaOptions {
    enabled: Option<bool>,
    duplicate_ids: Option<DuplicateIdPolicy>,
}

impl TableAttrOptions {
    /// Read options from document metadata. Invalid values are reported on
    /// `ctx` and the defaults are used instead.
    pub fn from_meta(meta: &Meta, ctx: &mut FilterContext) -> Self {
        let defaults = Self::default();
        let value = match meta.get(META_KEY) {
            None => return defaults,
            // `table-attr: false` is shorthand for `enabled: false`
            Some(MetaValue::MetaBool(enabled)) => {
                return Self {
                    enabled: *enabled,
                    ..defaults
                };
            }
            Some(value) => value,
        };

        match serde_json::from_value::<MetaOptions>(meta_to_json(value)) {
            Ok(parsed) => Self {
                enabled: parsed.enabled.unwrap_or(defaults.enabled),
                duplicate_ids: parsed.duplicate_ids.unwrap_or(defaults.duplicate_ids),
            },
            Err(err) => {
                ctx.warn(format!(
                    "Ignoring invalid `{}` metadata ({}); using defaults",
                    META_KEY, err
                ));
                defaults
            }
        }
    }

    /// Apply command-line overrides on top of these options.
    pub fn with_overrides(self, overrides: &OptionOverrides) -> Self {
        Self {
            enabled: overrides.enabled.unwrap_or(self.enabled),
            duplicate_ids: overrides.duplicate_ids.unwrap_or(self.duplicate_ids),
        }
    }

    /// Resolve the effective options for a document.
    pub fn resolve(meta: &Meta, overrides: &OptionOverrides, ctx: &mut FilterContext) -> Self {
        Self::from_meta(meta, ctx).with_overrides(overrides)
    }
}
