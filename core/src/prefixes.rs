//! Prefix map loaded once per run from the `prefixes` sheet

use indexmap::IndexMap;

use crate::error::{MetadataError, Result};
use crate::utils::PrefixedName;

/// Mapping from short prefix to namespace URI, in sheet order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    entries: IndexMap<String, String>,
}

impl PrefixMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, trimming whitespace on both sides
    pub fn insert(&mut self, prefix: &str, namespace: &str) {
        self.entries
            .insert(prefix.trim().to_string(), namespace.trim().to_string());
    }

    /// Namespace for a prefix
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    /// Namespace for a prefix, failing when it is not declared
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::UnknownPrefix`] when the prefix is absent.
    pub fn namespace(&self, prefix: &str, context: &str) -> Result<&str> {
        self.get(prefix).ok_or_else(|| MetadataError::UnknownPrefix {
            prefix: prefix.to_string(),
            value: context.to_string(),
        })
    }

    /// Expand `prefix:local` to a full URI
    ///
    /// # Errors
    ///
    /// Returns an error for malformed names or undeclared prefixes.
    pub fn expand(&self, value: &str) -> Result<String> {
        let name = PrefixedName::parse(value)?;
        Ok(format!("{}{}", self.namespace(name.prefix, value)?, name.local))
    }

    /// Number of declared prefixes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no prefix is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(prefix, namespace)` pairs in sheet order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of the entries for embedding in a schema document
    #[must_use]
    pub fn to_index_map(&self) -> IndexMap<String, String> {
        self.entries.clone()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PrefixMap {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (prefix, namespace) in iter {
            map.insert(prefix, namespace);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_trims_and_expands() {
        let map: PrefixMap = [(" hri ", " http://example.com/ ")].into_iter().collect();
        assert_eq!(map.get("hri"), Some("http://example.com/"));
        assert_eq!(map.expand("hri:Dataset").unwrap(), "http://example.com/Dataset");
    }

    #[test]
    fn test_unknown_prefix_is_an_error() {
        let map = PrefixMap::new();
        let err = map.expand("dcat:Dataset").unwrap_err();
        assert!(matches!(err, MetadataError::UnknownPrefix { ref prefix, .. } if prefix == "dcat"));
        assert!(err.is_configuration());
    }
}
