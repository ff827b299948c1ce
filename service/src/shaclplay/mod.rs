//! SHACLPlay tables
//!
//! Converts each class of a metadata workbook into the three sheets the
//! xls2rdf converter reads: `prefixes`, `NodeShapes (classes)` and
//! `PropertyShapes (properties)`. The node-shape and property-shape sheets
//! start from a fixed template whose cell positions are load-bearing.

mod converter;
mod template;
mod vocab;
mod writer;

pub use converter::{ClassShapes, ShaclPlayConverter, prefixes_table, validate_classes};
pub use template::Template;
pub use vocab::{VocabMapping, lookup_vocabulary};
pub use writer::{output_file_name, write_tables};

/// Sheet holding the prefix declarations
pub const PREFIXES_SHEET: &str = "prefixes";

/// Template and output sheet for the node shape
pub const NODE_SHAPES_SHEET: &str = "NodeShapes (classes)";

/// Template and output sheet for the property shapes
pub const PROPERTY_SHAPES_SHEET: &str = "PropertyShapes (properties)";

/// Row of the node-shapes sheet holding the appended shape declaration
pub const NODE_SHAPE_ROW: usize = 13;

/// A cell of an output table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value
    Empty,
    /// Text, written as a string
    Text(String),
    /// Count, written as a number
    Number(f64),
}

impl Cell {
    /// Text cell, or empty when `value` is empty
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() { Self::Empty } else { Self::Text(value) }
    }

    /// Text content, `None` for empty and numeric cells
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// Rows of cells, written without a header
pub type Table = Vec<Vec<Cell>>;

/// The three sheets of one class's SHACLPlay workbook
#[derive(Debug, Clone, PartialEq)]
pub struct ShaclPlayTables {
    /// `prefixes` sheet
    pub prefixes: Table,
    /// `NodeShapes (classes)` sheet
    pub node_shapes: Table,
    /// `PropertyShapes (properties)` sheet
    pub property_shapes: Table,
}

/// Lift a string grid into a table, empty strings becoming empty cells
#[must_use]
pub fn table_from_grid(grid: &[Vec<String>]) -> Table {
    grid.iter()
        .map(|row| row.iter().map(|value| Cell::text(value.as_str())).collect())
        .collect()
}
