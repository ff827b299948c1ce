//! Turtle reading and writing
//!
//! Shapes graphs are held as an in-memory [`Graph`] together with the
//! prefixes they were declared with, so a parse / edit / serialize cycle
//! keeps the compact names of the original file.

use std::io::Cursor;
use std::path::Path;

use metadata_core::PrefixMap;
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{Graph, NamedNode, NamedOrBlankNode, Term, TermRef, Triple};

use crate::error::{PipelineError, Result};

/// SHACL vocabulary
pub mod sh {
    use oxigraph::model::NamedNodeRef;

    /// Namespace IRI
    pub const NAMESPACE: &str = "http://www.w3.org/ns/shacl#";

    pub const NODE_SHAPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#NodeShape");
    pub const PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#property");
    pub const PATH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#path");
    pub const NAME: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#name");
    pub const DESCRIPTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#description");
    pub const ORDER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#order");
    pub const TARGET_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#targetClass");
    pub const CLOSED: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#closed");
    pub const IGNORED_PROPERTIES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#ignoredProperties");
    pub const MIN_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#minCount");
    pub const MAX_COUNT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#maxCount");
    pub const CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#class");
    pub const DATATYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#datatype");
    pub const NODE_KIND: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#nodeKind");
    pub const NODE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#node");
    pub const IN: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#in");
    pub const OR: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#or");
    pub const PATTERN: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#pattern");
    pub const DEFAULT_VALUE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#defaultValue");
    pub const IRI: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#IRI");
    pub const LITERAL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#Literal");
    pub const BLANK_NODE_OR_IRI: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/shacl#BlankNodeOrIRI");
}

/// Prefixes every shapes file may use, added after the document's own
pub const STANDARD_PREFIXES: [(&str, &str); 6] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("sh", sh::NAMESPACE),
    ("dash", "http://datashapes.org/dash#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
];

/// A graph and the prefixes to write it with
#[derive(Debug, Clone, Default)]
pub struct TurtleDocument {
    /// The triples
    pub graph: Graph,
    /// `(prefix, namespace)` pairs in declaration order
    pub prefixes: Vec<(String, String)>,
}

impl TurtleDocument {
    /// Parse Turtle text; `origin` only labels errors
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Rdf`] when the text is not valid Turtle.
    pub fn parse(data: &[u8], origin: &Path) -> Result<Self> {
        let mut parser = RdfParser::from_format(RdfFormat::Turtle).for_reader(Cursor::new(data));
        let mut graph = Graph::new();
        for quad in parser.by_ref() {
            let quad =
                quad.map_err(|e| PipelineError::rdf(origin, format!("Failed to parse Turtle: {e}")))?;
            graph.insert(&Triple::from(quad));
        }
        let prefixes = parser
            .prefixes()
            .map(|(prefix, namespace)| (prefix.to_string(), namespace.to_string()))
            .collect();
        Ok(Self { graph, prefixes })
    }

    /// Read and parse a Turtle file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        Self::parse(&data, path)
    }

    /// Serialize as Turtle, triples grouped by subject
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Rdf`] when a prefix is not a valid IRI or
    /// serialization fails.
    pub fn to_turtle(&self, origin: &Path) -> Result<String> {
        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        for (prefix, namespace) in &self.prefixes {
            serializer = serializer
                .with_prefix(prefix.as_str(), namespace.as_str())
                .map_err(|e| PipelineError::rdf(origin, format!("Invalid prefix {prefix}: {e}")))?;
        }

        let mut triples: Vec<Triple> = self.graph.iter().map(|t| t.into_owned()).collect();
        triples.sort_by_cached_key(|t| (subject_sort_key(&t.subject), t.predicate.to_string(), t.object.to_string()));

        let mut writer = serializer.for_writer(Vec::new());
        for triple in &triples {
            writer
                .serialize_triple(triple)
                .map_err(|e| PipelineError::rdf(origin, format!("Failed to serialize triple: {e}")))?;
        }
        let buffer = writer
            .finish()
            .map_err(|e| PipelineError::rdf(origin, format!("Failed to finish Turtle: {e}")))?;
        String::from_utf8(buffer).map_err(|e| PipelineError::rdf(origin, format!("Invalid UTF-8: {e}")))
    }

    /// Serialize and write to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = self.to_turtle(path)?;
        std::fs::write(path, text).map_err(|e| PipelineError::io(path, e))
    }
}

// Named subjects before blank nodes so shapes precede their property nodes.
fn subject_sort_key(subject: &NamedOrBlankNode) -> (u8, String) {
    match subject {
        NamedOrBlankNode::NamedNode(node) => (0, node.as_str().to_string()),
        NamedOrBlankNode::BlankNode(node) => (1, node.as_str().to_string()),
    }
}

/// Resolve a compact or absolute name to an IRI
///
/// Absolute IRIs pass through; `prefix:local` names are expanded against
/// `prefixes` and then [`STANDARD_PREFIXES`]. Returns `None` for anything
/// that cannot be resolved.
#[must_use]
pub fn resolve_name(value: &str, prefixes: &PrefixMap) -> Option<NamedNode> {
    let value = value.trim();
    if value.contains("://") {
        return NamedNode::new(value).ok();
    }
    let (prefix, local) = value.split_once(':')?;
    let namespace = prefixes.get(prefix).or_else(|| {
        STANDARD_PREFIXES
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, ns)| *ns)
    })?;
    NamedNode::new(format!("{namespace}{local}")).ok()
}

/// The subject a term refers to, if it can be one
#[must_use]
pub fn as_subject(term: TermRef<'_>) -> Option<NamedOrBlankNode> {
    match term {
        TermRef::NamedNode(node) => Some(node.into_owned().into()),
        TermRef::BlankNode(node) => Some(node.into_owned().into()),
        _ => None,
    }
}

/// Whether a term is the given named node
#[must_use]
pub fn is_node(term: TermRef<'_>, node: oxigraph::model::NamedNodeRef<'_>) -> bool {
    matches!(term, TermRef::NamedNode(n) if n == node)
}

/// Owned term for a named node constant
#[must_use]
pub fn term(node: oxigraph::model::NamedNodeRef<'_>) -> Term {
    node.into_owned().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::vocab::rdf;

    const SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix hri: <http://example.com/> .

hri:TestClassShape a sh:NodeShape ;
    sh:property [ sh:path hri:title ; sh:minCount 1 ] .
"#;

    #[test]
    fn test_parse_keeps_prefixes() {
        let doc = TurtleDocument::parse(SHAPES.as_bytes(), Path::new("shapes.ttl")).unwrap();
        assert_eq!(doc.graph.len(), 4);
        assert!(doc.prefixes.iter().any(|(p, ns)| p == "hri" && ns == "http://example.com/"));
        assert!(
            doc.graph
                .iter()
                .any(|t| t.predicate == rdf::TYPE && is_node(t.object, sh::NODE_SHAPE))
        );
    }

    #[test]
    fn test_serialize_round_trips() {
        let doc = TurtleDocument::parse(SHAPES.as_bytes(), Path::new("shapes.ttl")).unwrap();
        let text = doc.to_turtle(Path::new("shapes.ttl")).unwrap();
        assert!(text.contains("@prefix hri: <http://example.com/>"));
        let again = TurtleDocument::parse(text.as_bytes(), Path::new("again.ttl")).unwrap();
        assert_eq!(again.graph.len(), doc.graph.len());
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = TurtleDocument::parse(b"hri:x a", Path::new("broken.ttl")).unwrap_err();
        assert!(err.to_string().contains("broken.ttl"));
    }

    #[test]
    fn test_resolve_name() {
        let prefixes: PrefixMap = [("hri", "http://example.com/")].into_iter().collect();
        assert_eq!(
            resolve_name("hri:Dataset", &prefixes).unwrap().as_str(),
            "http://example.com/Dataset"
        );
        assert_eq!(
            resolve_name("xsd:anyURI", &prefixes).unwrap().as_str(),
            "http://www.w3.org/2001/XMLSchema#anyURI"
        );
        assert_eq!(
            resolve_name("https://w3id.org/x", &prefixes).unwrap().as_str(),
            "https://w3id.org/x"
        );
        assert!(resolve_name("nope:thing", &prefixes).is_none());
        assert!(resolve_name("plain", &prefixes).is_none());
    }
}
