//! SHACLPlay template workbook

use std::path::Path;

use tracing::debug;

use super::{NODE_SHAPE_ROW, NODE_SHAPES_SHEET, PROPERTY_SHAPES_SHEET};
use crate::error::{PipelineError, Result};
use crate::sheets::{ExcelWorkbook, Grid, Workbook};

/// Rows 0..=6 of both sheets are shape metadata
pub(crate) const METADATA_ROWS: usize = 7;

/// Row of the property-shapes sheet carrying the section header
pub(crate) const SECTION_HEADER_ROW: usize = 7;

/// The two template sheets, read without headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// `NodeShapes (classes)`, exactly [`NODE_SHAPE_ROW`] rows
    pub node_shapes: Grid,
    /// `PropertyShapes (properties)`, at least the section header row
    pub property_shapes: Grid,
}

impl Template {
    /// Open the template workbook at `path`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingInput`] when the file does not exist,
    /// and the errors of [`Template::load`] otherwise.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PipelineError::missing_input("Template", path));
        }
        let mut workbook = ExcelWorkbook::open(path)?;
        Self::load(&mut workbook, path)
    }

    /// Read both template sheets from a workbook
    ///
    /// The node-shapes sheet is padded to [`NODE_SHAPE_ROW`] rows so the
    /// appended shape row always lands on the same row.
    ///
    /// # Errors
    ///
    /// Returns an error when a sheet is missing, the node-shapes sheet has
    /// content below its metadata block, or the property-shapes sheet has no
    /// section header row.
    pub fn load<W: Workbook>(workbook: &mut W, origin: &Path) -> Result<Self> {
        let mut node_shapes = workbook.grid(NODE_SHAPES_SHEET)?;
        let property_shapes = workbook.grid(PROPERTY_SHAPES_SHEET)?;

        while node_shapes.len() > NODE_SHAPE_ROW
            && node_shapes
                .last()
                .is_some_and(|row| row.iter().all(|cell| cell.trim().is_empty()))
        {
            node_shapes.pop();
        }
        if node_shapes.len() > NODE_SHAPE_ROW {
            return Err(PipelineError::spreadsheet(
                origin,
                format!(
                    "'{NODE_SHAPES_SHEET}' has {} rows, expected at most {NODE_SHAPE_ROW}",
                    node_shapes.len()
                ),
            ));
        }
        node_shapes.resize_with(NODE_SHAPE_ROW, Vec::new);

        if property_shapes.len() <= SECTION_HEADER_ROW {
            return Err(PipelineError::spreadsheet(
                origin,
                format!("'{PROPERTY_SHAPES_SHEET}' has no section header on row {SECTION_HEADER_ROW}"),
            ));
        }

        debug!(
            node_rows = node_shapes.len(),
            property_rows = property_shapes.len(),
            "loaded SHACLPlay template"
        );
        Ok(Self {
            node_shapes,
            property_shapes,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::sheets::MemoryWorkbook;

    use super::super::{NODE_SHAPES_SHEET, PROPERTY_SHAPES_SHEET};

    /// A template with the real sheet layout and placeholder values
    pub(crate) fn template_workbook() -> MemoryWorkbook {
        MemoryWorkbook::new()
            .with_sheet(
                NODE_SHAPES_SHEET,
                &[
                    &["Shapes URI", "https://example.com/shapes"],
                    &["", ""],
                    &["rdfs:label@en", "label"],
                    &["rdfs:comment@en", "comment"],
                    &["dcterms:description@en", "description"],
                    &["owl:versionInfo", "0.0"],
                    &["dcterms:modified", "2000-01-01"],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &["URI", "rdfs:label@en", "rdfs:comment@en", "rdf:type", "sh:targetClass"],
                ],
            )
            .with_sheet(
                PROPERTY_SHAPES_SHEET,
                &[
                    &["Shapes URI", "https://example.com/shapes"],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &["URI", "^sh:property", "sh:path", "sh:name@en"],
                    &["Section", "", "", ""],
                    &["example:row", "to be dropped"],
                ],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::template_workbook;
    use super::*;
    use crate::sheets::MemoryWorkbook;

    #[test]
    fn test_load_pads_node_shapes() {
        let mut workbook = template_workbook();
        let template = Template::load(&mut workbook, Path::new("template.xlsx")).unwrap();
        assert_eq!(template.node_shapes.len(), NODE_SHAPE_ROW);
        assert_eq!(template.property_shapes.len(), 9);
    }

    #[test]
    fn test_missing_sheet() {
        let mut workbook = MemoryWorkbook::new().with_sheet(NODE_SHAPES_SHEET, &[&["x"]]);
        let err = Template::load(&mut workbook, Path::new("template.xlsx")).unwrap_err();
        assert!(err.to_string().contains(PROPERTY_SHAPES_SHEET));
    }

    #[test]
    fn test_short_property_sheet_is_rejected() {
        let mut workbook = MemoryWorkbook::new()
            .with_sheet(NODE_SHAPES_SHEET, &[&["x"]])
            .with_sheet(PROPERTY_SHAPES_SHEET, &[&["x"], &["y"]]);
        let err = Template::load(&mut workbook, Path::new("template.xlsx")).unwrap_err();
        assert!(err.to_string().contains("section header"));
    }

    #[test]
    fn test_missing_template_file() {
        let err = Template::from_file(Path::new("does/not/exist.xlsx")).unwrap_err();
        assert!(err.is_configuration());
    }
}
