//! Schema document files

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use metadata_core::types::{
    BASE_TYPES_IMPORT, ClassDefinition, RDF_MODEL_CLASS, SlotDefinition, TypeDefinition,
};
use metadata_core::{MetadataError, SchemaDocument};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// File name of the mixin module, resolved by `../rdf_model`
pub const RDF_MODEL_FILE: &str = "rdf_model.yaml";

/// File name of the typed-class scalar module, resolved by `../sempyro_types`
pub const TYPED_CLASS_TYPES_FILE: &str = "sempyro_types.yaml";

const SUPPORT_MODULE_BASE: &str = "https://w3id.org/health-ri/metadata-automation/";

/// Write a document, creating parent directories
///
/// # Errors
///
/// Returns an error if the directories or the file cannot be written.
pub fn write_document(doc: &SchemaDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let yaml = doc.to_yaml()?;
    std::fs::write(path, yaml).map_err(|e| PipelineError::io(path, e))?;
    debug!(path = %path.display(), "wrote schema document");
    Ok(())
}

/// Read a document back
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a schema document.
pub fn read_document(path: &Path) -> Result<SchemaDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    SchemaDocument::from_yaml(&text).map_err(|e| {
        MetadataError::parse(format!("schema document {}", path.display()), e.to_string()).into()
    })
}

/// Write `rdf_model.yaml` and `sempyro_types.yaml` into `root`
///
/// The types module declares every slot range used by `docs` that is not a
/// class of its own document.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub fn write_support_modules(root: &Path, docs: &[SchemaDocument]) -> Result<Vec<PathBuf>> {
    let rdf_model_path = root.join(RDF_MODEL_FILE);
    write_document(&rdf_model_document(), &rdf_model_path)?;

    let types_path = root.join(TYPED_CLASS_TYPES_FILE);
    write_document(&typed_class_types_document(docs), &types_path)?;

    Ok(vec![rdf_model_path, types_path])
}

fn support_document(name: &str, description: &str) -> SchemaDocument {
    let mut doc = SchemaDocument {
        id: format!("{SUPPORT_MODULE_BASE}{name}"),
        name: Some(name.to_string()),
        description: Some(description.to_string()),
        imports: vec![BASE_TYPES_IMPORT.to_string()],
        ..SchemaDocument::default()
    };
    doc.prefixes
        .insert("linkml".to_string(), "https://w3id.org/linkml/".to_string());
    doc
}

fn rdf_model_document() -> SchemaDocument {
    let mut doc = support_document("rdf_model", "Mixin module for RDF-serializable models");
    doc.classes.insert(
        RDF_MODEL_CLASS.to_string(),
        ClassDefinition {
            description: Some("Base class of every RDF-serializable model".to_string()),
            ..ClassDefinition::default()
        },
    );
    doc
}

fn typed_class_types_document(docs: &[SchemaDocument]) -> SchemaDocument {
    let mut doc = support_document("sempyro_types", "Scalar names used by the typed-class models");
    let names: BTreeSet<&str> = docs
        .iter()
        .flat_map(|d| {
            d.slots
                .values()
                .flat_map(SlotDefinition::ranges)
                .filter(move |range| !d.classes.contains_key(*range))
        })
        .collect();
    for name in names {
        doc.types.insert(
            name.to_string(),
            TypeDefinition {
                uri: Some("xsd:string".to_string()),
                base: Some(name.to_string()),
                ..TypeDefinition::default()
            },
        );
    }
    doc
}
