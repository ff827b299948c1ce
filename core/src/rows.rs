//! Row normalization
//!
//! Turns raw sheet tables (header row plus string cells) into typed
//! [`ClassRow`] and [`PropertyRow`] values. The literal text `nan` and empty
//! cells both become `None` here and never travel further.

use crate::error::{MetadataError, Result};
use crate::prefixes::PrefixMap;
use crate::utils::{slot_name, split_list};

/// A sheet read with its first row as header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Sheet name
    pub name: String,
    /// Header cells
    pub headers: Vec<String>,
    /// Data rows, in sheet order
    pub rows: Vec<Vec<String>>,
}

/// Columns the pipeline understands, with the header spellings accepted for each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// `prefix`
    Prefix,
    /// `namespace`
    Namespace,
    /// `sheet_name`
    SheetName,
    /// `class_URI`
    ClassUri,
    /// `SHACL_target_ontology_name`
    TargetClass,
    /// `description`
    Description,
    /// `SeMPyRO_inherits_from`
    InheritsFrom,
    /// `SeMPyRO_import_classes`
    ImportClasses,
    /// `SeMPyRO_add_rdf_model`
    AddRdfModel,
    /// `SeMPyRO_annotations_ontology`
    AnnotationsOntology,
    /// `SeMPyRO_annotations_IRI`
    AnnotationsIri,
    /// `Property label`
    PropertyLabel,
    /// `Definition`
    Definition,
    /// `Usage note`
    UsageNote,
    /// `Property URI`
    PropertyUri,
    /// `Cardinality`
    Cardinality,
    /// `Range`
    ShaclRange,
    /// `SeMPyRO_range`
    SempyroRange,
    /// `SeMPyRO_rdf_term`
    RdfTerm,
    /// `SeMPyRO_rdf_type`
    RdfType,
    /// `SHACL_pattern`
    Pattern,
    /// `SHACL_default_value`
    DefaultValue,
    /// `Controlled vocabluary (if applicable)`
    ControlledVocabulary,
    /// `SHACL_dash:viewer`
    Viewer,
    /// `SHACL_dash:editor`
    Editor,
    /// `SHACL_sh:node`
    NodeShape,
    /// `SHACL_sh:uniqueLang`
    UniqueLang,
}

impl Column {
    /// Header spellings, canonical first
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Prefix => &["prefix"],
            Self::Namespace => &["namespace"],
            Self::SheetName => &["sheet_name"],
            Self::ClassUri => &["class_URI", "ontology_name"],
            Self::TargetClass => &["SHACL_target_ontology_name", "target_ontology_name"],
            Self::Description => &["description"],
            Self::InheritsFrom => &["SeMPyRO_inherits_from", "inherits_from"],
            Self::ImportClasses => &["SeMPyRO_import_classes", "import_classes"],
            Self::AddRdfModel => &["SeMPyRO_add_rdf_model", "add_rdf_model"],
            Self::AnnotationsOntology => &["SeMPyRO_annotations_ontology", "annotations_ontology"],
            Self::AnnotationsIri => &["SeMPyRO_annotations_IRI", "annotations_IRI"],
            Self::PropertyLabel => &["Property label"],
            Self::Definition => &["Definition"],
            Self::UsageNote => &["Usage note"],
            Self::PropertyUri => &["Property URI"],
            Self::Cardinality => &["Cardinality"],
            Self::ShaclRange => &["Range", "SHACL range", "SHACL_range"],
            Self::SempyroRange => &["SeMPyRO_range", "Sempyro range"],
            Self::RdfTerm => &["SeMPyRO_rdf_term", "rdf_term"],
            Self::RdfType => &["SeMPyRO_rdf_type", "rdf_type"],
            Self::Pattern => &["SHACL_pattern", "Pattern"],
            Self::DefaultValue => &["SHACL_default_value", "Default value"],
            Self::ControlledVocabulary => &[
                "Controlled vocabluary (if applicable)",
                "Controlled vocabulary (if applicable)",
            ],
            Self::Viewer => &["SHACL_dash:viewer", "dash.viewer", "dash:viewer"],
            Self::Editor => &["SHACL_dash:editor", "dash.editor", "dash:editor"],
            Self::NodeShape => &["SHACL_sh:node", "sh:node"],
            Self::UniqueLang => &["SHACL_sh:uniqueLang", "sh:uniqueLang"],
        }
    }

    /// Canonical header spelling
    #[must_use]
    pub fn canonical(self) -> &'static str {
        self.aliases()[0]
    }
}

/// Header lookup for one table
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    headers: Vec<String>,
}

impl ColumnMapping {
    /// Build a mapping from a header row
    #[must_use]
    pub fn from_headers(headers: &[String]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    /// Index of the first header matching any accepted spelling
    #[must_use]
    pub fn index(&self, column: Column) -> Option<usize> {
        column.aliases().iter().find_map(|alias| {
            let alias = alias.to_lowercase();
            self.headers.iter().position(|h| *h == alias)
        })
    }

    /// Whether the column is present
    #[must_use]
    pub fn has(&self, column: Column) -> bool {
        self.index(column).is_some()
    }
}

/// One data row of a [`RawTable`] viewed through its header mapping
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    cells: &'a [String],
    mapping: &'a ColumnMapping,
    /// Zero-based data row index
    pub index: usize,
}

impl<'a> RawRow<'a> {
    /// Normalized cell value: `None` for empty or `nan`
    #[must_use]
    pub fn get(&self, column: Column) -> Option<&'a str> {
        self.mapping
            .index(column)
            .and_then(|idx| self.cells.get(idx))
            .and_then(|cell| normalize_cell(cell))
    }

    /// Owned normalized cell value
    #[must_use]
    pub fn get_owned(&self, column: Column) -> Option<String> {
        self.get(column).map(ToString::to_string)
    }

    /// Whether every cell in the row is absent
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| normalize_cell(cell).is_none())
    }
}

impl RawTable {
    /// Column mapping for this table's header
    #[must_use]
    pub fn mapping(&self) -> ColumnMapping {
        ColumnMapping::from_headers(&self.headers)
    }

    /// Fail unless every listed column is present in the header
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingColumn`] for the first missing column.
    pub fn require_columns(&self, columns: &[Column]) -> Result<()> {
        let mapping = self.mapping();
        match columns.iter().find(|c| !mapping.has(**c)) {
            Some(missing) => Err(MetadataError::missing_column(&self.name, missing.canonical())),
            None => Ok(()),
        }
    }

    /// Iterate over rows through a mapping
    pub fn rows_with<'a>(&'a self, mapping: &'a ColumnMapping) -> impl Iterator<Item = RawRow<'a>> {
        self.rows.iter().enumerate().map(move |(index, cells)| RawRow {
            cells,
            mapping,
            index,
        })
    }
}

/// `None` for empty cells and the literal `nan`
#[must_use]
pub fn normalize_cell(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "nan" {
        None
    } else {
        Some(trimmed)
    }
}

/// Interpret a yes/no style flag cell
#[must_use]
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "x"
        )
    })
}

/// One row from the `classes` sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassRow {
    /// Zero-based data row index in the `classes` sheet
    pub row: usize,
    /// Name of the per-class property sheet
    pub sheet_name: Option<String>,
    /// Prefixed class name, e.g. `hri:Dataset`
    pub class_uri: String,
    /// Prefixed name the SHACL shape targets
    pub target_class_uri: Option<String>,
    /// Class description
    pub description: Option<String>,
    /// Prefixed name of the parent class
    pub inherits_from: Option<String>,
    /// Referenced but externally defined classes
    pub import_classes: Vec<String>,
    /// Ontology provenance string
    pub annotations_ontology: Option<String>,
    /// IRI provenance string
    pub annotations_iri: Option<String>,
    /// Whether the `RDFModel` mixin is requested
    pub add_rdf_model: bool,
}

/// One row from a class's property sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyRow {
    /// Human label
    pub label: String,
    /// Definition
    pub definition: Option<String>,
    /// Usage note, used when there is no definition
    pub usage_note: Option<String>,
    /// Prefixed property URI
    pub property_uri: Option<String>,
    /// Cardinality notation
    pub cardinality: Option<String>,
    /// SHACL-style range
    pub range: Option<String>,
    /// Typed-class range names; more than one means a union
    pub sempyro_range: Vec<String>,
    /// RDF predicate for the typed-class backend
    pub rdf_term: Option<String>,
    /// RDF serialization kind for the typed-class backend
    pub rdf_type: Option<String>,
    /// Nested shape reference
    pub node_shape: Option<String>,
    /// Regular expression
    pub pattern: Option<String>,
    /// Default value
    pub default_value: Option<String>,
    /// Controlled vocabulary URL
    pub controlled_vocabulary_url: Option<String>,
    /// `sh:uniqueLang` value
    pub unique_lang: Option<String>,
    /// DASH viewer hint
    pub viewer: Option<String>,
    /// DASH editor hint
    pub editor: Option<String>,
}

impl ClassRow {
    /// Normalize a class row
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingValue`] when `class_URI` is empty.
    pub fn from_row(row: &RawRow<'_>, sheet: &str) -> Result<Self> {
        let class_uri = row
            .get_owned(Column::ClassUri)
            .ok_or_else(|| MetadataError::missing_value(sheet, row.index, Column::ClassUri.canonical()))?;

        Ok(Self {
            row: row.index,
            sheet_name: row.get_owned(Column::SheetName),
            class_uri,
            target_class_uri: row.get_owned(Column::TargetClass),
            description: row.get_owned(Column::Description),
            inherits_from: row.get_owned(Column::InheritsFrom),
            import_classes: row.get(Column::ImportClasses).map(split_list).unwrap_or_default(),
            annotations_ontology: row.get_owned(Column::AnnotationsOntology),
            annotations_iri: row.get_owned(Column::AnnotationsIri),
            add_rdf_model: parse_flag(row.get(Column::AddRdfModel)),
        })
    }

    /// Sheet holding this class's properties
    ///
    /// # Errors
    ///
    /// Returns an error when the row has no `sheet_name`.
    pub fn property_sheet(&self) -> Result<&str> {
        self.sheet_name.as_deref().ok_or_else(|| {
            MetadataError::missing_value("classes", self.row, Column::SheetName.canonical())
        })
    }
}

impl PropertyRow {
    /// Normalize a property row; `None` when the label is absent
    #[must_use]
    pub fn from_row(row: &RawRow<'_>) -> Option<Self> {
        let label = row.get_owned(Column::PropertyLabel)?;
        Some(Self {
            label,
            definition: row.get_owned(Column::Definition),
            usage_note: row.get_owned(Column::UsageNote),
            property_uri: row.get_owned(Column::PropertyUri),
            cardinality: row.get_owned(Column::Cardinality),
            range: row.get_owned(Column::ShaclRange),
            sempyro_range: row.get(Column::SempyroRange).map(split_list).unwrap_or_default(),
            rdf_term: row.get_owned(Column::RdfTerm),
            rdf_type: row.get_owned(Column::RdfType),
            node_shape: row.get_owned(Column::NodeShape),
            pattern: row.get_owned(Column::Pattern),
            default_value: row.get_owned(Column::DefaultValue),
            controlled_vocabulary_url: row.get_owned(Column::ControlledVocabulary),
            unique_lang: row.get_owned(Column::UniqueLang),
            viewer: row.get_owned(Column::Viewer),
            editor: row.get_owned(Column::Editor),
        })
    }

    /// Slot identifier derived from the label
    #[must_use]
    pub fn slot_name(&self) -> String {
        slot_name(&self.label)
    }
}

/// Read the `prefixes` sheet
///
/// # Errors
///
/// Returns an error if the `prefix` or `namespace` column is missing.
pub fn normalize_prefixes(table: &RawTable) -> Result<PrefixMap> {
    table.require_columns(&[Column::Prefix, Column::Namespace])?;
    let mapping = table.mapping();
    let mut prefixes = PrefixMap::new();
    for row in table.rows_with(&mapping) {
        if let (Some(prefix), Some(namespace)) = (row.get(Column::Prefix), row.get(Column::Namespace)) {
            prefixes.insert(prefix, namespace);
        }
    }
    Ok(prefixes)
}

/// Read the `classes` sheet, skipping fully blank rows
///
/// # Errors
///
/// Returns an error if the `class_URI` column is missing or a row lacks a value for it.
pub fn normalize_classes(table: &RawTable) -> Result<Vec<ClassRow>> {
    table.require_columns(&[Column::ClassUri])?;
    let mapping = table.mapping();
    table
        .rows_with(&mapping)
        .filter(|row| !row.is_blank())
        .map(|row| ClassRow::from_row(&row, &table.name))
        .collect()
}

/// Read a property sheet, dropping rows without a label
#[must_use]
pub fn normalize_properties(table: &RawTable) -> Vec<PropertyRow> {
    let mapping = table.mapping();
    table
        .rows_with(&mapping)
        .filter_map(|row| PropertyRow::from_row(&row))
        .collect()
}
