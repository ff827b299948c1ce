//! Local import resolution
//!
//! Generators see one merged document: definitions from every local import
//! (transitively, depth first) followed by the document's own. Imports with
//! a `linkml:` prefix name built-in modules and are skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use metadata_core::SchemaDocument;
use tracing::debug;

use crate::generator::{GeneratorError, GeneratorResult};

/// Load a document and merge in its local imports
///
/// Later definitions replace earlier ones with the same name, so the
/// document's own definitions win over imported ones. The merged document
/// keeps the identity and imports of the document at `path`.
///
/// # Errors
///
/// Returns an error if the document or any local import cannot be read or parsed.
pub fn resolve_imports(path: &Path) -> GeneratorResult<SchemaDocument> {
    let root = load(path)?;
    let mut merged = SchemaDocument {
        id: root.id.clone(),
        name: root.name.clone(),
        title: root.title.clone(),
        description: root.description.clone(),
        prefixes: root.prefixes.clone(),
        imports: root.imports.clone(),
        ..SchemaDocument::default()
    };

    let mut visited = HashSet::new();
    visited.insert(canonical(path));
    merge_imports(&root, path, &mut merged, &mut visited)?;
    merge_definitions(&mut merged, root);
    Ok(merged)
}

fn merge_imports(
    doc: &SchemaDocument,
    path: &Path,
    merged: &mut SchemaDocument,
    visited: &mut HashSet<PathBuf>,
) -> GeneratorResult<()> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for import in &doc.imports {
        if import.starts_with("linkml:") {
            continue;
        }
        let import_path = base.join(format!("{import}.yaml"));
        if !visited.insert(canonical(&import_path)) {
            continue;
        }
        if !import_path.exists() {
            return Err(GeneratorError::resolution(
                path.display(),
                format!("import '{import}' not found at {}", import_path.display()),
            ));
        }
        debug!(import = %import, path = %import_path.display(), "resolving import");
        let imported = load(&import_path)?;
        merge_imports(&imported, &import_path, merged, visited)?;
        for (prefix, namespace) in &imported.prefixes {
            merged
                .prefixes
                .entry(prefix.clone())
                .or_insert_with(|| namespace.clone());
        }
        merge_definitions(merged, imported);
    }
    Ok(())
}

fn merge_definitions(merged: &mut SchemaDocument, doc: SchemaDocument) {
    merged.types.extend(doc.types);
    merged.enums.extend(doc.enums);
    merged.classes.extend(doc.classes);
    merged.slots.extend(doc.slots);
}

fn load(path: &Path) -> GeneratorResult<SchemaDocument> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| GeneratorError::resolution(path.display(), e))?;
    SchemaDocument::from_yaml(&text).map_err(|e| GeneratorError::resolution(path.display(), e))
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkml::{write_document, write_support_modules};
    use metadata_core::types::{ClassDefinition, RDF_MODEL_CLASS, RDF_MODEL_IMPORT};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn class_doc() -> SchemaDocument {
        let mut doc = SchemaDocument {
            id: "http://example.com/TestClass".to_string(),
            imports: vec!["linkml:types".to_string(), RDF_MODEL_IMPORT.to_string()],
            ..SchemaDocument::default()
        };
        doc.classes.insert(
            "HRITestclass".to_string(),
            ClassDefinition {
                is_a: Some(RDF_MODEL_CLASS.to_string()),
                ..ClassDefinition::stub("hri:TestClass")
            },
        );
        doc
    }

    #[test]
    fn test_imported_definitions_come_first() {
        let dir = TempDir::new().unwrap();
        write_support_modules(dir.path(), &[]).unwrap();
        let path = dir.path().join("hri").join("hri-TestClass.yaml");
        write_document(&class_doc(), &path).unwrap();

        let merged = resolve_imports(&path).unwrap();
        let names: Vec<&String> = merged.classes.keys().collect();
        assert_eq!(names, vec![RDF_MODEL_CLASS, "HRITestclass"]);
        assert_eq!(merged.id, "http://example.com/TestClass");
    }

    #[test]
    fn test_missing_import_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hri").join("hri-TestClass.yaml");
        write_document(&class_doc(), &path).unwrap();
        let err = resolve_imports(&path).unwrap_err();
        assert!(matches!(err, GeneratorError::Resolution { .. }));
    }
}
