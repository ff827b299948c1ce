//! Naming helpers shared by every backend
//!
//! The class identifier transform lives here and nowhere else: the schema
//! builder, stub synthesis and the typed-class generator all go through
//! [`class_identifier`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MetadataError, Result};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Valid whitespace regex pattern"));

static NON_SLUG_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]").expect("Valid slug regex pattern"));

/// A `prefix:local` name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixedName<'a> {
    /// Short prefix, e.g. `hri`
    pub prefix: &'a str,
    /// Local part, e.g. `Dataset`
    pub local: &'a str,
}

impl<'a> PrefixedName<'a> {
    /// Parse a value containing exactly one `:` separator
    ///
    /// # Errors
    ///
    /// Returns an error when the separator is missing or repeated, or either side is empty.
    pub fn parse(value: &'a str) -> Result<Self> {
        let trimmed = value.trim();
        let Some((prefix, local)) = trimmed.split_once(':') else {
            return Err(MetadataError::malformed(value, "missing ':' separator"));
        };
        if local.contains(':') {
            return Err(MetadataError::malformed(value, "more than one ':' separator"));
        }
        if prefix.is_empty() || local.is_empty() {
            return Err(MetadataError::malformed(value, "empty prefix or local name"));
        }
        Ok(Self { prefix, local })
    }

    /// The generated class identifier for this name
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}{}", self.prefix.to_uppercase(), capitalize(self.local))
    }

    /// The same local name under another prefix
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}:{}", self.local)
    }
}

impl std::fmt::Display for PrefixedName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// Upper-case the first character, lower-case the rest
#[must_use]
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Class identifier for a prefixed name: `hri:Dataset` becomes `HRIDataset`
///
/// # Errors
///
/// Returns an error if `value` is not a prefixed name.
pub fn class_identifier(value: &str) -> Result<String> {
    PrefixedName::parse(value).map(|name| name.identifier())
}

/// Slot identifier for a property label
#[must_use]
pub fn slot_name(label: &str) -> String {
    label.replace(' ', "_")
}

/// URL-friendly slug of a property label
#[must_use]
pub fn slugify(label: &str) -> String {
    let lowered = label.to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(lowered.trim(), "-");
    NON_SLUG_CHAR.replace_all(&hyphenated, "").into_owned()
}

/// Split a comma-separated list into trimmed, non-empty tokens
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}
