//! Annotation support for schema documents
//!
//! Annotations are free-form key/value pairs attached to classes and slots.
//! The typed-class backend uses them for ontology provenance and RDF term
//! mappings, the SHACL backend for `sh:targetClass`, `sh:node` and UI hints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value types for annotations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// String value
    String(String),
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(serde_json::Number),
    /// Array of values
    Array(Vec<AnnotationValue>),
    /// Object/map of values
    Object(IndexMap<String, AnnotationValue>),
}

/// A collection of annotations, insertion ordered
pub type Annotations = IndexMap<String, AnnotationValue>;

/// Keys written by the typed-class backend
pub mod keys {
    /// Ontology the class is drawn from
    pub const ONTOLOGY: &str = "ontology";
    /// IRI of the class in its ontology
    pub const IRI: &str = "IRI";
    /// Upper-cased namespace constant
    pub const NAMESPACE: &str = "namespace";
    /// Short prefix
    pub const PREFIX: &str = "prefix";
    /// RDF predicate a slot serializes to
    pub const RDF_TERM: &str = "rdf_term";
    /// RDF serialization kind of a slot
    pub const RDF_TYPE: &str = "rdf_type";
    /// Target class of a node shape
    pub const TARGET_CLASS: &str = "sh:targetClass";
    /// Nested shape reference
    pub const NODE: &str = "sh:node";
    /// DASH viewer hint
    pub const VIEWER: &str = "dash:viewer";
    /// DASH editor hint
    pub const EDITOR: &str = "dash:editor";

    /// Class annotations only meaningful to the typed-class backend
    pub const TYPED_CLASS_KEYS: [&str; 4] = [ONTOLOGY, NAMESPACE, IRI, PREFIX];
    /// Slot annotations only meaningful to the typed-class backend
    pub const TYPED_SLOT_KEYS: [&str; 2] = [RDF_TERM, RDF_TYPE];
}

/// Trait for elements that can have annotations
pub trait Annotatable {
    /// Get the annotations for this element
    fn annotations(&self) -> Option<&Annotations>;

    /// Get a mutable reference to annotations, creating the map if needed
    fn annotations_mut(&mut self) -> &mut Annotations;

    /// Drop the annotation map entirely
    fn clear_annotations(&mut self);

    /// Get a specific annotation value
    fn get_annotation(&self, key: &str) -> Option<&AnnotationValue> {
        self.annotations()?.get(key)
    }

    /// Set an annotation
    fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) {
        self.annotations_mut().insert(key.into(), value.into());
    }

    /// Remove the given keys, dropping the map when nothing is left
    fn remove_annotations(&mut self, keys: &[&str]) {
        if self.annotations().is_none() {
            return;
        }
        let now_empty = {
            let annotations = self.annotations_mut();
            for key in keys {
                annotations.shift_remove(*key);
            }
            annotations.is_empty()
        };
        if now_empty {
            self.clear_annotations();
        }
    }
}

impl AnnotationValue {
    /// String view of the value, if it is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Array(values) => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Self::Object(map) => {
                let rendered: Vec<String> =
                    map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
        }
    }
}

impl From<String> for AnnotationValue {
    fn from(s: String) -> Self {
        AnnotationValue::String(s)
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        AnnotationValue::String(s.to_string())
    }
}

impl From<&String> for AnnotationValue {
    fn from(s: &String) -> Self {
        AnnotationValue::String(s.clone())
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        AnnotationValue::Bool(b)
    }
}

impl From<i64> for AnnotationValue {
    fn from(n: i64) -> Self {
        AnnotationValue::Number(n.into())
    }
}
