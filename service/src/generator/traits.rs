//! Core generator traits and types
//!
//! This module defines the error type and the trait shared by the native
//! generators.

use metadata_core::{MetadataError, SchemaDocument};
use thiserror::Error;

/// Result type for generator operations
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur during code generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Code generation error
    #[error("Code generation failed: {0}")]
    Generation(String),

    /// A schema document or its imports could not be resolved
    #[error("Schema resolution failed for {path}: {message}")]
    Resolution {
        /// Document or import being resolved
        path: String,
        /// What went wrong
        message: String,
    },

    /// Imports configuration error
    #[error("Imports configuration error: {0}")]
    Imports(String),

    /// Generated source could not be split into definition blocks
    #[error("Failed to parse generated source at line {line}: {message}")]
    SourceParse {
        /// One-based line number
        line: usize,
        /// What is wrong
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema model error
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl GeneratorError {
    /// Create a resolution error
    #[must_use]
    pub fn resolution(path: impl std::fmt::Display, message: impl ToString) -> Self {
        Self::Resolution {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a source parse error
    #[must_use]
    pub fn source_parse(line: usize, message: impl Into<String>) -> Self {
        Self::SourceParse {
            line,
            message: message.into(),
        }
    }
}

/// Core trait for synchronous generators
pub trait Generator {
    /// Get generator name
    fn name(&self) -> &str;

    /// Get generator description
    fn description(&self) -> &str;

    /// Generate output from a resolved schema document
    ///
    /// # Errors
    /// Returns an error if the document cannot be rendered
    fn generate(&self, schema: &SchemaDocument) -> GeneratorResult<String>;

    /// Get the file extension for generated files
    fn get_file_extension(&self) -> &str;
}

/// Convert `fmt::Error` to `GeneratorError`
pub(crate) fn fmt_error(e: std::fmt::Error) -> GeneratorError {
    GeneratorError::Io(std::io::Error::other(e))
}
