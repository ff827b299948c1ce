//! Controlled vocabularies with a fixed `sh:in` rendering

/// How a known vocabulary is written into a property shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabMapping {
    /// Vocabulary URL, without a trailing `/`
    pub url: &'static str,
    /// `sh:in` list in SHACLPlay list syntax
    pub sh_in: &'static str,
    /// `dash:editor` replacing any editor from the property sheet
    pub editor: &'static str,
}

const MAPPINGS: &[VocabMapping] = &[VocabMapping {
    url: "http://publications.europa.eu/resource/authority/access-right",
    sh_in: "( eu:PUBLIC eu:RESTRICTED eu:NON_PUBLIC )",
    editor: "dash:EnumSelectEditor",
}];

/// Mapping for a vocabulary URL
///
/// Surrounding whitespace and a trailing `/` are ignored.
#[must_use]
pub fn lookup_vocabulary(url: &str) -> Option<&'static VocabMapping> {
    let url = url.trim().trim_end_matches('/');
    MAPPINGS.iter().find(|mapping| mapping.url == url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_normalizes_url() {
        let mapping =
            lookup_vocabulary(" http://publications.europa.eu/resource/authority/access-right/ ")
                .unwrap();
        assert_eq!(mapping.editor, "dash:EnumSelectEditor");
        assert!(mapping.sh_in.contains("eu:RESTRICTED"));
    }

    #[test]
    fn test_unknown_vocabulary() {
        assert!(lookup_vocabulary("http://example.com/vocab").is_none());
        assert!(lookup_vocabulary("").is_none());
    }
}
