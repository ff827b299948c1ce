//! Class rows to SHACLPlay tables

use metadata_core::MetadataError;
use metadata_core::cardinality::CountRange;
use metadata_core::config::ShaclPlayConfig;
use metadata_core::rows::Column;
use metadata_core::utils::{PrefixedName, slugify};
use metadata_core::{ClassRow, PrefixMap, PropertyRow, RawTable};

use super::template::{METADATA_ROWS, SECTION_HEADER_ROW, Template};
use super::vocab::lookup_vocabulary;
use super::{Cell, ShaclPlayTables, Table, table_from_grid};
use crate::error::Result;

/// Timestamp format of the `dcterms:modified` cell
const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Width of a property-shape row
const PROPERTY_COLUMNS: usize = 24;

/// Suffix marking a range as "any IRI"
const IRI_RANGE_SUFFIX: &str = "(IRI)";

mod col {
    pub(super) const URI: usize = 0;
    pub(super) const PARENT: usize = 1;
    pub(super) const PATH: usize = 2;
    pub(super) const NAME: usize = 3;
    pub(super) const DESCRIPTION: usize = 4;
    pub(super) const MIN_COUNT: usize = 6;
    pub(super) const MAX_COUNT: usize = 7;
    pub(super) const NODE_KIND: usize = 8;
    pub(super) const DATATYPE: usize = 9;
    pub(super) const NODE: usize = 10;
    pub(super) const PATTERN: usize = 15;
    pub(super) const UNIQUE_LANG: usize = 16;
    pub(super) const IN: usize = 17;
    pub(super) const DEFAULT_VALUE: usize = 20;
    pub(super) const VIEWER: usize = 22;
    pub(super) const EDITOR: usize = 23;
}

/// The class a pair of shape tables is generated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassShapes {
    /// Local class name, e.g. `Dataset`
    pub class_name: String,
    /// Prefix shapes are minted under
    pub prefix: String,
    /// `sh:targetClass` value
    pub target: String,
    /// Class description
    pub description: Option<String>,
}

impl ClassShapes {
    /// Describe a class row, optionally minting shapes under another prefix
    ///
    /// # Errors
    ///
    /// Returns an error when the row has no target class or its `class_URI`
    /// is not a prefixed name.
    pub fn from_row(class: &ClassRow, namespace: Option<&str>) -> Result<Self> {
        let name = PrefixedName::parse(&class.class_uri)?;
        let target = class.target_class_uri.clone().ok_or_else(|| {
            MetadataError::missing_value("classes", class.row, Column::TargetClass.canonical())
        })?;
        Ok(Self {
            class_name: name.local.to_string(),
            prefix: namespace.unwrap_or(name.prefix).to_string(),
            target,
            description: class.description.clone(),
        })
    }

    /// Compact node-shape name, `{prefix}:{Class}Shape`
    #[must_use]
    pub fn shape_name(&self) -> String {
        format!("{}:{}Shape", self.prefix, self.class_name)
    }
}

/// Builds SHACLPlay tables from a template and class rows
#[derive(Debug, Clone)]
pub struct ShaclPlayConverter {
    template: Template,
    settings: ShaclPlayConfig,
    modified: String,
}

impl ShaclPlayConverter {
    /// Create a converter stamping tables with the current local time
    #[must_use]
    pub fn new(template: Template, settings: ShaclPlayConfig) -> Self {
        Self {
            template,
            settings,
            modified: chrono::Local::now().format(MODIFIED_FORMAT).to_string(),
        }
    }

    /// Use a fixed `dcterms:modified` value
    #[must_use]
    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = modified.into();
        self
    }

    /// Full node-shape URI under the configured base
    #[must_use]
    pub fn shape_uri(&self, class: &ClassShapes) -> String {
        format!("{}{}Shape", self.settings.shape_base_uri, class.class_name)
    }

    /// Build all three tables for a class
    ///
    /// # Errors
    ///
    /// Returns an error when a property's cardinality cannot be parsed.
    pub fn convert(
        &self,
        prefixes: &PrefixMap,
        class: &ClassShapes,
        properties: &[PropertyRow],
    ) -> Result<ShaclPlayTables> {
        Ok(ShaclPlayTables {
            prefixes: prefixes_table(prefixes),
            node_shapes: self.node_shapes(class),
            property_shapes: self.property_shapes(class, properties)?,
        })
    }

    /// Template metadata block plus the node-shape declaration row
    #[must_use]
    pub fn node_shapes(&self, class: &ClassShapes) -> Table {
        let mut table = table_from_grid(&self.template.node_shapes);
        let label = format!("Excel template for {} class", class.class_name);
        let description = class.description.clone().unwrap_or_else(|| {
            format!(
                "This is an excel template for {} class in {}.",
                class.class_name, self.settings.profile_name
            )
        });

        set(&mut table, 0, 1, Cell::text(self.shape_uri(class)));
        set(&mut table, 2, 1, Cell::text(label.clone()));
        set(&mut table, 3, 1, Cell::text(label));
        set(&mut table, 4, 1, Cell::text(description));
        set(&mut table, 5, 1, Cell::text(self.settings.version.as_str()));
        set(&mut table, 6, 1, Cell::text(self.modified.as_str()));

        table.push(vec![
            Cell::text(class.shape_name()),
            Cell::text(class.class_name.as_str()),
            Cell::Empty,
            Cell::text("sh:NodeShape"),
            Cell::text(class.target.as_str()),
        ]);
        table
    }

    /// Template metadata rows, the section header, then one row per property
    ///
    /// # Errors
    ///
    /// Returns an error when a cardinality cannot be parsed.
    pub fn property_shapes(&self, class: &ClassShapes, properties: &[PropertyRow]) -> Result<Table> {
        let grid = &self.template.property_shapes;
        let mut table = table_from_grid(&grid[..METADATA_ROWS.min(grid.len())]);
        set(&mut table, 0, 1, Cell::text(self.shape_uri(class)));
        table.extend(table_from_grid(&grid[SECTION_HEADER_ROW..=SECTION_HEADER_ROW]));

        for property in properties {
            table.push(self.property_row(class, property)?);
        }
        Ok(table)
    }

    /// One property-shape row
    ///
    /// # Errors
    ///
    /// Returns an error when the cardinality cannot be parsed.
    pub fn property_row(&self, class: &ClassShapes, property: &PropertyRow) -> Result<Vec<Cell>> {
        let mut row = vec![Cell::Empty; PROPERTY_COLUMNS];
        let shape = class.shape_name();

        row[col::URI] = Cell::text(format!("{shape}#{}", slugify(&property.label)));
        row[col::PARENT] = Cell::text(shape);
        row[col::PATH] = optional(property.property_uri.as_deref());
        row[col::NAME] = Cell::text(property.label.as_str());
        row[col::DESCRIPTION] =
            optional(property.definition.as_deref().or(property.usage_note.as_deref()));

        let counts = CountRange::parse(property.cardinality.as_deref())?;
        if let Some(min) = counts.min {
            row[col::MIN_COUNT] = Cell::Number(f64::from(min));
        }
        if let Some(max) = counts.max {
            row[col::MAX_COUNT] = Cell::Number(f64::from(max));
        }

        self.dispatch_range(class, property, &mut row);

        row[col::PATTERN] = optional(property.pattern.as_deref());
        row[col::UNIQUE_LANG] = optional(property.unique_lang.as_deref());
        row[col::DEFAULT_VALUE] = optional(property.default_value.as_deref());
        row[col::VIEWER] = optional(property.viewer.as_deref());

        let vocabulary = property
            .controlled_vocabulary_url
            .as_deref()
            .and_then(lookup_vocabulary);
        if let Some(mapping) = vocabulary {
            row[col::IN] = Cell::text(mapping.sh_in);
        }
        if let Some(editor) = property.editor.as_deref() {
            row[col::EDITOR] = Cell::text(vocabulary.map_or(editor, |m| m.editor));
        }
        Ok(row)
    }

    fn dispatch_range(&self, class: &ClassShapes, property: &PropertyRow, row: &mut [Cell]) {
        let Some(range) = property.range.as_deref().map(str::trim) else {
            return;
        };

        if range.ends_with(IRI_RANGE_SUFFIX) {
            row[col::NODE_KIND] = Cell::text("sh:IRI");
        } else if range == "rdfs:Literal" {
            row[col::NODE_KIND] = Cell::text("sh:Literal");
        } else if let Some(node) = property.node_shape.as_deref().filter(|_| range.contains(':')) {
            row[col::NODE] = Cell::text(self.nested_shape(class, node));
        } else if range.starts_with("xsd:") {
            row[col::NODE_KIND] = Cell::text("sh:Literal");
            row[col::DATATYPE] = Cell::text(range);
        }
    }

    /// Resolve a nested shape reference against the shapes base URI
    ///
    /// `{prefix}:XShape` and a bare `XShape` both land under the base URI;
    /// any other prefixed or absolute value is kept as written.
    fn nested_shape(&self, class: &ClassShapes, node: &str) -> String {
        let base = &self.settings.shape_base_uri;
        match node.split_once(':') {
            Some((prefix, local)) if prefix == class.prefix => format!("{base}{local}"),
            Some(_) => node.to_string(),
            None => format!("{base}{node}"),
        }
    }
}

/// `prefixes` sheet: an empty row, then `PREFIX | prefix | namespace` rows
#[must_use]
pub fn prefixes_table(prefixes: &PrefixMap) -> Table {
    std::iter::once(vec![Cell::Empty; 3])
        .chain(prefixes.iter().map(|(prefix, namespace)| {
            vec![Cell::text("PREFIX"), Cell::text(prefix), Cell::text(namespace)]
        }))
        .collect()
}

/// Check the `classes` sheet before any class is converted
///
/// # Errors
///
/// Returns an error when the sheet has no rows, or a row lacks a sheet name,
/// class URI or target class.
pub fn validate_classes(table: &RawTable) -> Result<()> {
    let required = [Column::SheetName, Column::ClassUri, Column::TargetClass];
    let mapping = table.mapping();
    let mut rows = table.rows_with(&mapping).filter(|row| !row.is_blank()).peekable();
    if rows.peek().is_none() {
        return Err(MetadataError::Config(format!("'{}' sheet is empty", table.name)).into());
    }
    table.require_columns(&required)?;
    for row in rows {
        if let Some(missing) = required.iter().find(|column| row.get(**column).is_none()) {
            return Err(MetadataError::missing_value(&table.name, row.index, missing.canonical()).into());
        }
    }
    Ok(())
}

fn optional(value: Option<&str>) -> Cell {
    value.map_or(Cell::Empty, Cell::text)
}

fn set(table: &mut Table, row: usize, col: usize, value: Cell) {
    if table.len() <= row {
        table.resize_with(row + 1, Vec::new);
    }
    let cells = &mut table[row];
    if cells.len() <= col {
        cells.resize(col + 1, Cell::Empty);
    }
    cells[col] = value;
}
