//! Workbook to schema documents

use std::path::{Path, PathBuf};

use metadata_core::builder::document_key;
use metadata_core::rows::{normalize_classes, normalize_prefixes, normalize_properties};
use metadata_core::utils::PrefixedName;
use metadata_core::{
    ClassRow, Flavour, MetadataError, PrefixMap, PropertyRow, SchemaBuilder, SchemaDocument,
    document_path,
};
use tracing::{debug, info};

use super::writer::write_document;
use crate::error::Result;
use crate::sheets::Workbook;

/// Sheet holding prefix declarations
pub const PREFIXES_SHEET: &str = "prefixes";

/// Sheet holding one row per class
pub const CLASSES_SHEET: &str = "classes";

/// The two fixed sheets of a metadata workbook, normalized
#[derive(Debug, Clone, Default)]
pub struct MetadataSheets {
    /// Declared prefixes
    pub prefixes: PrefixMap,
    /// Class rows, blank rows removed
    pub classes: Vec<ClassRow>,
}

/// Read and normalize the `prefixes` and `classes` sheets
///
/// # Errors
///
/// Returns an error if either sheet or a required column is missing, or a
/// class row has no `class_URI`.
pub fn load_metadata<W: Workbook>(workbook: &mut W) -> Result<MetadataSheets> {
    workbook.require_sheet(PREFIXES_SHEET)?;
    workbook.require_sheet(CLASSES_SHEET)?;
    let prefixes = normalize_prefixes(&workbook.table(PREFIXES_SHEET)?)?;
    let classes = normalize_classes(&workbook.table(CLASSES_SHEET)?)?;
    debug!(prefixes = prefixes.len(), classes = classes.len(), "loaded metadata sheets");
    Ok(MetadataSheets { prefixes, classes })
}

/// A schema document built for one class row
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    /// Row the document was built from
    pub class: ClassRow,
    /// `{prefix}-{Class}`
    pub key: String,
    /// Path relative to the LinkML output root
    pub relative_path: PathBuf,
    /// The document
    pub document: SchemaDocument,
}

/// Builds and writes schema documents for every class of a workbook
#[derive(Debug, Clone, Default)]
pub struct LinkmlCreator {
    excluded_sheets: Vec<String>,
}

impl LinkmlCreator {
    /// Create a creator that never reads the given sheets as property sheets
    #[must_use]
    pub fn new(excluded_sheets: Vec<String>) -> Self {
        Self { excluded_sheets }
    }

    /// Build one document per class row
    ///
    /// Failures are per class: each entry pairs the row's `class_URI` with
    /// its outcome.
    pub fn build_all<W: Workbook>(
        &self,
        workbook: &mut W,
        sheets: &MetadataSheets,
        flavour: Flavour,
    ) -> Vec<(String, Result<BuiltDocument>)> {
        sheets
            .classes
            .iter()
            .map(|class| {
                (
                    class.class_uri.clone(),
                    self.build_class(workbook, &sheets.prefixes, class, flavour),
                )
            })
            .collect()
    }

    /// Build the document for one class row
    ///
    /// # Errors
    ///
    /// Returns an error when the property sheet is missing or excluded, or the
    /// builder rejects the row.
    pub fn build_class<W: Workbook>(
        &self,
        workbook: &mut W,
        prefixes: &PrefixMap,
        class: &ClassRow,
        flavour: Flavour,
    ) -> Result<BuiltDocument> {
        let properties = match flavour {
            Flavour::Base => Vec::new(),
            Flavour::Shacl | Flavour::TypedClasses => self.load_properties(workbook, class)?,
        };
        let document = SchemaBuilder::new(prefixes).build(flavour, class, &properties)?;
        let name = PrefixedName::parse(&class.class_uri)?;
        Ok(BuiltDocument {
            class: class.clone(),
            key: document_key(&name),
            relative_path: document_path(&class.class_uri)?,
            document,
        })
    }

    /// Read a class's property sheet
    ///
    /// # Errors
    ///
    /// Returns an error when the row has no sheet name or the sheet is absent or excluded.
    pub fn load_properties<W: Workbook>(
        &self,
        workbook: &mut W,
        class: &ClassRow,
    ) -> Result<Vec<PropertyRow>> {
        let sheet = class.property_sheet()?;
        if self.excluded_sheets.iter().any(|s| s == sheet) {
            return Err(MetadataError::MissingSheet {
                sheet: sheet.to_string(),
            }
            .into());
        }
        Ok(normalize_properties(&workbook.table(sheet)?))
    }

    /// Write a built document under `root`, returning the full path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, root: &Path, built: &BuiltDocument) -> Result<PathBuf> {
        let path = root.join(&built.relative_path);
        write_document(&built.document, &path)?;
        info!(class = %built.class.class_uri, path = %path.display(), "wrote LinkML schema");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemoryWorkbook;
    use pretty_assertions::assert_eq;

    fn workbook() -> MemoryWorkbook {
        MemoryWorkbook::new()
            .with_sheet(
                PREFIXES_SHEET,
                &[
                    &["prefix", "namespace"],
                    &["hri", "http://example.com/"],
                    &["dcat", "http://www.w3.org/ns/dcat#"],
                ],
            )
            .with_sheet(
                CLASSES_SHEET,
                &[
                    &["sheet_name", "class_URI", "SHACL_target_ontology_name"],
                    &["TestClass", "hri:TestClass", "dcat:TestClass"],
                    &["Info", "hri:Info", "dcat:Info"],
                    &["Missing", "eucaim:Missing", "dcat:Missing"],
                ],
            )
            .with_sheet(
                "TestClass",
                &[
                    &["Property label", "Cardinality", "Range"],
                    &["title", "1..n", "rdfs:Literal"],
                    &["description", "1..n", "rdfs:Literal"],
                ],
            )
            .with_sheet("Info", &[&["Property label"], &["about"]])
    }

    #[test]
    fn test_load_metadata() {
        let sheets = load_metadata(&mut workbook()).unwrap();
        assert_eq!(sheets.prefixes.len(), 2);
        assert_eq!(sheets.classes.len(), 3);
    }

    #[test]
    fn test_load_metadata_requires_prefixes() {
        let mut workbook = MemoryWorkbook::new().with_sheet(CLASSES_SHEET, &[&["class_URI"]]);
        let err = load_metadata(&mut workbook).unwrap_err();
        assert!(err.to_string().contains("prefixes"));
    }

    #[test]
    fn test_build_all_isolates_failures() {
        let mut workbook = workbook();
        let sheets = load_metadata(&mut workbook).unwrap();
        let creator = LinkmlCreator::new(vec!["Info".to_string()]);
        let results = creator.build_all(&mut workbook, &sheets, Flavour::Shacl);

        assert_eq!(results.len(), 3);
        let built = results[0].1.as_ref().unwrap();
        assert_eq!(built.key, "hri-TestClass");
        assert_eq!(built.relative_path, PathBuf::from("hri").join("hri-TestClass.yaml"));
        assert_eq!(built.document.slots.len(), 2);
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_err());
    }

    #[test]
    fn test_base_flavour_reads_no_property_sheet() {
        let mut workbook = workbook();
        let sheets = load_metadata(&mut workbook).unwrap();
        let creator = LinkmlCreator::new(vec!["Info".to_string()]);
        let built = creator
            .build_class(&mut workbook, &sheets.prefixes, &sheets.classes[1], Flavour::Base)
            .unwrap();
        assert!(built.document.classes.is_empty());
    }
}
