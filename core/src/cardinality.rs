//! Cardinality vocabulary
//!
//! Two independent readings of the same column. The schema builder only
//! recognizes the fixed vocabulary `1`, `1..n`, `0..n`; the SHACL converter
//! parses min/max counts out of any `N` or `A..B` form.

use crate::error::{MetadataError, Result};

/// `required` / `multivalued` flags for a slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cardinality {
    /// Cardinality is `1` or `1..n`
    pub required: bool,
    /// Cardinality is `0..n` or `1..n`
    pub multivalued: bool,
}

impl Cardinality {
    /// Derive the flags; unrecognized strings yield both false
    #[must_use]
    pub fn from_vocabulary(value: Option<&str>) -> Self {
        let value = value.unwrap_or_default();
        Self {
            required: matches!(value, "1" | "1..n"),
            multivalued: matches!(value, "0..n" | "1..n"),
        }
    }
}

/// Minimum and maximum counts of a property shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountRange {
    /// `sh:minCount`; a zero minimum is never emitted
    pub min: Option<u32>,
    /// `sh:maxCount`; `None` when unbounded
    pub max: Option<u32>,
}

impl CountRange {
    /// Parse `N` or `A..B` cardinality notation
    ///
    /// A literal `0` lower bound collapses to no minimum.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is neither an integer nor `n` (upper bound only).
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(Self::default());
        };

        if let Some((lower, upper)) = value.split_once("..") {
            let lower = lower.trim();
            let upper = upper.trim();
            let min = if lower == "0" {
                None
            } else {
                Some(parse_bound(lower, value)?)
            };
            let max = if upper == "n" {
                None
            } else {
                Some(parse_bound(upper, value)?)
            };
            Ok(Self { min, max })
        } else {
            let count = parse_bound(value, value)?;
            Ok(Self {
                min: Some(count),
                max: Some(count),
            })
        }
    }
}

fn parse_bound(bound: &str, whole: &str) -> Result<u32> {
    bound
        .parse()
        .map_err(|_| MetadataError::parse("cardinality", format!("invalid bound '{bound}' in '{whole}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counts(value: &str) -> (Option<u32>, Option<u32>) {
        let range = CountRange::parse(Some(value)).unwrap();
        (range.min, range.max)
    }

    #[test]
    fn test_vocabulary_truth_table() {
        let table = [
            ("1", true, false),
            ("1..n", true, true),
            ("0..n", false, true),
            ("0..1", false, false),
            ("", false, false),
            ("2", false, false),
        ];
        for (value, required, multivalued) in table {
            let flags = Cardinality::from_vocabulary(Some(value));
            assert_eq!(flags.required, required, "required for {value:?}");
            assert_eq!(flags.multivalued, multivalued, "multivalued for {value:?}");
        }
        assert_eq!(Cardinality::from_vocabulary(None), Cardinality::default());
    }

    #[test]
    fn test_parse_counts() {
        assert_eq!(counts("1"), (Some(1), Some(1)));
        assert_eq!(counts("0..n"), (None, None));
        assert_eq!(counts("1..n"), (Some(1), None));
        assert_eq!(counts("0..1"), (None, Some(1)));
        assert_eq!(counts(""), (None, None));
        assert_eq!(counts(" 2..5 "), (Some(2), Some(5)));
        assert_eq!(CountRange::parse(None).unwrap(), CountRange::default());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CountRange::parse(Some("many")).is_err());
        assert!(CountRange::parse(Some("1..m")).is_err());
    }

    proptest! {
        #[test]
        fn prop_unknown_strings_have_no_flags(value in "[a-z2-9 .]{0,6}") {
            prop_assume!(!["1", "1..n", "0..n"].contains(&value.as_str()));
            prop_assert_eq!(Cardinality::from_vocabulary(Some(&value)), Cardinality::default());
        }
    }
}
