//! Edits applied to built or previously written schema documents

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotations::{Annotatable, Annotations, keys};
use crate::error::{MetadataError, Result};
use crate::types::{RDF_MODEL_CLASS, RDF_MODEL_IMPORT, SchemaDocument};

/// Class annotation overrides keyed by class identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationLogic {
    /// Per-class overrides
    pub classes: IndexMap<String, ValidationClass>,
}

/// Overrides for one class
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationClass {
    /// Annotations copied onto the class
    pub annotations: Annotations,
}

impl ValidationLogic {
    /// Read an overrides file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MetadataError::io(path, e))?;
        serde_yaml::from_str(&text)
            .map_err(|e| MetadataError::parse(format!("validation logic {}", path.display()), e.to_string()))
    }

    /// Read the overrides file when it exists, empty overrides otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "no validation logic file");
            Ok(Self::default())
        }
    }
}

/// Merge override annotations into classes the document defines
///
/// Classes named in the overrides but absent from the document are ignored.
/// Returns the number of classes touched.
pub fn apply_validation_logic(doc: &mut SchemaDocument, logic: &ValidationLogic) -> usize {
    let mut touched = 0;
    for (name, overrides) in &logic.classes {
        let Some(class) = doc.classes.get_mut(name) else {
            continue;
        };
        if overrides.annotations.is_empty() {
            continue;
        }
        for (key, value) in &overrides.annotations {
            class.set_annotation(key.clone(), value.clone());
        }
        touched += 1;
    }
    touched
}

/// Remove annotations only the typed-class backend understands
///
/// Clears `ontology`, `namespace`, `IRI` and `prefix` from every class and
/// `rdf_term` / `rdf_type` from every slot. Annotation maps left empty are
/// removed.
pub fn strip_typed_class_annotations(doc: &mut SchemaDocument) {
    for class in doc.classes.values_mut() {
        class.remove_annotations(&keys::TYPED_CLASS_KEYS);
    }
    for slot in doc.slots.values_mut() {
        slot.remove_annotations(&keys::TYPED_SLOT_KEYS);
    }
}

/// Make the listed classes derive from `RDFModel`
///
/// Adds the mixin import when anything changed. Classes that already have a
/// parent keep it. Returns the names not found in the document.
pub fn add_rdf_model(doc: &mut SchemaDocument, class_names: &[&str]) -> Vec<String> {
    let mut missing = Vec::new();
    let mut changed = false;
    for name in class_names {
        match doc.classes.get_mut(*name) {
            Some(class) if class.is_a.is_none() => {
                class.is_a = Some(RDF_MODEL_CLASS.to_string());
                changed = true;
            }
            Some(_) => {}
            None => {
                warn!(class = %name, "class not found, cannot add {RDF_MODEL_CLASS}");
                missing.push((*name).to_string());
            }
        }
    }
    if changed {
        doc.add_import(RDF_MODEL_IMPORT);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassDefinition, SlotDefinition};
    use pretty_assertions::assert_eq;

    fn typed_doc() -> SchemaDocument {
        let mut doc = SchemaDocument {
            id: "http://example.com/Dataset".to_string(),
            ..SchemaDocument::default()
        };
        let mut class = ClassDefinition::stub("hri:Dataset");
        class.set_annotation(keys::ONTOLOGY, "http://example.com/ontology");
        class.set_annotation(keys::NAMESPACE, "HRI");
        class.set_annotation(keys::IRI, "http://example.com/Dataset");
        class.set_annotation(keys::PREFIX, "hri");
        class.slots.push("title".to_string());
        doc.classes.insert("HRIDataset".to_string(), class);

        let mut slot = SlotDefinition::default();
        slot.set_annotation(keys::RDF_TERM, "DCTERMS.title");
        slot.set_annotation(keys::RDF_TYPE, "rdfs_literal");
        slot.set_annotation(keys::VIEWER, "dash:LiteralViewer");
        doc.slots.insert("title".to_string(), slot);
        doc
    }

    #[test]
    fn test_strip_typed_class_annotations() {
        let mut doc = typed_doc();
        strip_typed_class_annotations(&mut doc);

        assert!(doc.classes["HRIDataset"].annotations.is_none());
        let slot = &doc.slots["title"];
        assert!(slot.get_annotation(keys::RDF_TERM).is_none());
        assert!(slot.get_annotation(keys::VIEWER).is_some());

        let yaml = doc.to_yaml().unwrap();
        assert!(!yaml.contains("rdf_type"));
        assert!(!yaml.contains("ontology"));
    }

    #[test]
    fn test_apply_validation_logic_only_touches_existing_classes() {
        let mut doc = typed_doc();
        let logic: ValidationLogic = serde_yaml::from_str(
            "classes:\n  HRIDataset:\n    annotations:\n      validation: strict\n  HRIMissing:\n    annotations:\n      validation: lax\n",
        )
        .unwrap();

        assert_eq!(apply_validation_logic(&mut doc, &logic), 1);
        let class = &doc.classes["HRIDataset"];
        assert_eq!(
            class.get_annotation("validation").and_then(|v| v.as_str()),
            Some("strict")
        );
        assert!(class.get_annotation(keys::PREFIX).is_some());
        assert!(!doc.classes.contains_key("HRIMissing"));
    }

    #[test]
    fn test_add_rdf_model() {
        let mut doc = typed_doc();
        let missing = add_rdf_model(&mut doc, &["HRIDataset", "HRIAgent"]);

        assert_eq!(missing, vec!["HRIAgent"]);
        assert_eq!(doc.classes["HRIDataset"].is_a.as_deref(), Some(RDF_MODEL_CLASS));
        assert_eq!(doc.imports, vec![RDF_MODEL_IMPORT]);
    }

    #[test]
    fn test_add_rdf_model_keeps_existing_parent() {
        let mut doc = typed_doc();
        if let Some(class) = doc.classes.get_mut("HRIDataset") {
            class.is_a = Some("DCATResource".to_string());
        }
        assert!(add_rdf_model(&mut doc, &["HRIDataset"]).is_empty());
        assert_eq!(doc.classes["HRIDataset"].is_a.as_deref(), Some("DCATResource"));
        assert!(doc.imports.is_empty());
    }
}
