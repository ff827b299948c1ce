//! Workbook access
//!
//! Every stage reads spreadsheets through the [`Workbook`] trait. Grids are
//! addressed by absolute cell position: row 0 / column 0 is cell `A1` even
//! when the sheet's used range starts further down, because the SHACLPlay
//! template is read and written by fixed coordinates.

mod excel;
mod memory;

pub use excel::{ExcelWorkbook, data_to_string};
pub use memory::MemoryWorkbook;

use metadata_core::{MetadataError, RawTable};

use crate::error::Result;

/// A headerless sheet: rows of string cells, `""` for empty
pub type Grid = Vec<Vec<String>>;

/// Read access to a workbook with named sheets
pub trait Workbook {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Whether a sheet exists
    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|s| s == name)
    }

    /// Read a sheet without treating any row as a header
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingSheet`] when the sheet is absent, or a
    /// spreadsheet error when it cannot be decoded.
    fn grid(&mut self, name: &str) -> Result<Grid>;

    /// Read a sheet with its first row as the header
    ///
    /// Trailing fully empty rows are dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Workbook::grid`].
    fn table(&mut self, name: &str) -> Result<RawTable> {
        let mut rows = self.grid(name)?.into_iter();
        let headers = rows.next().unwrap_or_default();
        let mut rows: Vec<Vec<String>> = rows.collect();
        while rows
            .last()
            .is_some_and(|row| row.iter().all(|cell| cell.trim().is_empty()))
        {
            rows.pop();
        }
        Ok(RawTable {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    /// Fail unless the sheet exists
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingSheet`].
    fn require_sheet(&self, name: &str) -> Result<()> {
        if self.has_sheet(name) {
            Ok(())
        } else {
            Err(MetadataError::MissingSheet {
                sheet: name.to_string(),
            }
            .into())
        }
    }
}

/// Cell at an absolute position, `""` when outside the grid
#[must_use]
pub fn cell(grid: &Grid, row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|r| r.get(col))
        .map_or("", String::as_str)
}
