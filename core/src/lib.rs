//! # Metadata Automation Core
//!
//! Schema model for the metadata pipeline: spreadsheet rows are normalized
//! into typed class and property rows, then built into LinkML schema
//! documents for either the SHACL or the typed-class backend.
//!
//! Nothing in this crate touches a workbook or an external tool. Readers
//! hand in [`rows::RawTable`] values; writers take [`types::SchemaDocument`]
//! values back out.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Annotation values and the keys the backends use
pub mod annotations;

/// Schema document construction per backend
pub mod builder;

/// Cardinality vocabulary and count parsing
pub mod cardinality;

/// Pipeline configuration
pub mod config;

/// Error types
pub mod error;

/// Document edit passes
pub mod passes;

/// Prefix map
pub mod prefixes;

/// Sheet row normalization
pub mod rows;

/// Schema document types
pub mod types;

/// Naming helpers
pub mod utils;

pub use builder::{Flavour, SchemaBuilder, document_path};
pub use config::PipelineConfig;
pub use error::{MetadataError, Result};
pub use prefixes::PrefixMap;
pub use rows::{ClassRow, PropertyRow, RawTable};
pub use types::SchemaDocument;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::annotations::{Annotatable, AnnotationValue, Annotations, keys};
    pub use crate::builder::{Flavour, SchemaBuilder, document_key, document_path};
    pub use crate::cardinality::{Cardinality, CountRange};
    pub use crate::config::PipelineConfig;
    pub use crate::error::{MetadataError, Result};
    pub use crate::prefixes::PrefixMap;
    pub use crate::rows::{ClassRow, Column, PropertyRow, RawTable};
    pub use crate::types::{ClassDefinition, SchemaDocument, SlotDefinition};
    pub use crate::utils::{PrefixedName, class_identifier, slugify};
}
