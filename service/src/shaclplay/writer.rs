//! SHACLPlay workbook output

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::info;

use super::{Cell, NODE_SHAPES_SHEET, PREFIXES_SHEET, PROPERTY_SHAPES_SHEET, ShaclPlayTables, Table};
use crate::error::{PipelineError, Result};

/// `SHACL-{sheet}.xlsx`, sheet name lower-cased
#[must_use]
pub fn output_file_name(sheet_name: &str) -> String {
    format!("SHACL-{}.xlsx", sheet_name.to_lowercase())
}

/// Write the three tables to `path`, creating parent directories
///
/// # Errors
///
/// Returns an error if the workbook cannot be built or the file cannot be written.
pub fn write_tables(tables: &ShaclPlayTables, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, table) in [
        (PREFIXES_SHEET, &tables.prefixes),
        (NODE_SHAPES_SHEET, &tables.node_shapes),
        (PROPERTY_SHAPES_SHEET, &tables.property_shapes),
    ] {
        let worksheet = workbook
            .add_worksheet()
            .set_name(name)
            .map_err(|e| PipelineError::spreadsheet(path, format!("Failed to add sheet '{name}': {e}")))?;
        write_table(worksheet, table).map_err(|e| {
            PipelineError::spreadsheet(path, format!("Failed to write sheet '{name}': {e}"))
        })?;
    }

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| PipelineError::spreadsheet(path, format!("Failed to save workbook: {e}")))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    std::fs::write(path, buffer).map_err(|e| PipelineError::io(path, e))?;
    info!(path = %path.display(), "wrote SHACLPlay workbook");
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> std::result::Result<(), XlsxError> {
    for (row_index, row) in table.iter().enumerate() {
        let row_number = u32::try_from(row_index).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col_index, cell) in row.iter().enumerate() {
            let col_number = u16::try_from(col_index).map_err(|_| XlsxError::RowColumnLimitError)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(value) => {
                    worksheet.write_string(row_number, col_number, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_number, col_number, *value)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{ExcelWorkbook, Workbook as _, cell};
    use pretty_assertions::assert_eq;

    fn tables() -> ShaclPlayTables {
        ShaclPlayTables {
            prefixes: vec![
                vec![Cell::Empty; 3],
                vec![Cell::text("PREFIX"), Cell::text("hri"), Cell::text("http://example.com/")],
            ],
            node_shapes: vec![vec![Cell::text("Shapes URI"), Cell::text("http://example.com/XShape")]],
            property_shapes: vec![vec![
                Cell::text("hri:XShape#title"),
                Cell::Empty,
                Cell::Number(1.0),
            ]],
        }
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("DataService"), "SHACL-dataservice.xlsx");
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("SHACL-x.xlsx");
        write_tables(&tables(), &path).unwrap();

        let mut workbook = ExcelWorkbook::open(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec![PREFIXES_SHEET, NODE_SHAPES_SHEET, PROPERTY_SHAPES_SHEET]
        );

        let prefixes = workbook.grid(PREFIXES_SHEET).unwrap();
        assert_eq!(cell(&prefixes, 0, 0), "");
        assert_eq!(cell(&prefixes, 1, 1), "hri");

        let properties = workbook.grid(PROPERTY_SHAPES_SHEET).unwrap();
        assert_eq!(cell(&properties, 0, 0), "hri:XShape#title");
        assert_eq!(cell(&properties, 0, 2), "1");
    }
}
