//! In-memory workbook, used by the converters' unit tests

use indexmap::IndexMap;
use metadata_core::MetadataError;

use super::{Grid, Workbook};
use crate::error::Result;

/// Named grids held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: IndexMap<String, Grid>,
}

impl MemoryWorkbook {
    /// Create an empty workbook
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet from string rows
    #[must_use]
    pub fn with_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        self.insert(
            name,
            rows.iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        );
        self
    }

    /// Add or replace a sheet
    pub fn insert(&mut self, name: &str, grid: Grid) {
        self.sheets.insert(name.to_string(), grid);
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn grid(&mut self, name: &str) -> Result<Grid> {
        self.sheets.get(name).cloned().ok_or_else(|| {
            MetadataError::MissingSheet {
                sheet: name.to_string(),
            }
            .into()
        })
    }
}
