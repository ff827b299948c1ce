//! calamine-backed workbook reader

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use metadata_core::MetadataError;
use tracing::debug;

use super::{Grid, Workbook};
use crate::error::{PipelineError, Result};

/// An `.xlsx` file opened for reading
pub struct ExcelWorkbook {
    path: PathBuf,
    workbook: Xlsx<BufReader<File>>,
}

impl std::fmt::Debug for ExcelWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcelWorkbook")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ExcelWorkbook {
    /// Open a workbook
    ///
    /// # Errors
    ///
    /// Returns a missing input error when the file does not exist, or a
    /// spreadsheet error when it is not a readable workbook.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::missing_input("Workbook", path));
        }
        let workbook: Xlsx<_> =
            open_workbook(path).map_err(|e| PipelineError::spreadsheet(path, e))?;
        debug!(path = %path.display(), "opened workbook");
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    /// Path the workbook was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Workbook for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().clone()
    }

    fn grid(&mut self, name: &str) -> Result<Grid> {
        if !self.has_sheet(name) {
            return Err(MetadataError::MissingSheet {
                sheet: name.to_string(),
            }
            .into());
        }
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| PipelineError::spreadsheet(&self.path, e))?;
        Ok(range_to_grid(&range))
    }
}

/// Convert a used range to an absolutely positioned grid
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::new();
    };
    let start_row = start_row as usize;
    let start_col = start_col as usize;

    let mut grid: Grid = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().map(data_to_string));
        grid.push(cells);
    }
    grid
}

/// Render a cell as text
///
/// Whole floats render without a fractional part, so a count typed as `1`
/// reads back as `"1"`. Strings are trimmed.
#[must_use]
pub fn data_to_string(data: &Data) -> String {
    match data {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Bool(b) => b.to_string().to_uppercase(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| dt.as_f64().to_string(), |d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(dt) => dt.clone(),
        Data::DurationIso(d) => d.clone(),
        Data::Error(e) => format!("ERROR: {e:?}"),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_data_to_string() {
        assert_eq!(data_to_string(&Data::Float(1.0)), "1");
        assert_eq!(data_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(data_to_string(&Data::Int(3)), "3");
        assert_eq!(data_to_string(&Data::String("  hri:Dataset ".to_string())), "hri:Dataset");
        assert_eq!(data_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(data_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_open_missing_file() {
        let err = ExcelWorkbook::open("does/not/exist.xlsx").unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }
}
