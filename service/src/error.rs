//! Pipeline error type
//!
//! Wraps schema-model and generator errors and adds the failures that only
//! happen when touching workbooks, Turtle files and external processes.

use std::path::{Path, PathBuf};

use metadata_core::MetadataError;
use thiserror::Error;

use crate::generator::GeneratorError;

/// Errors raised by the pipeline stages
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Row normalization or schema building failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A generator failed
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// A required input file does not exist
    #[error("{what} not found at {}", path.display())]
    MissingInput {
        /// What the file is
        what: String,
        /// Where it was expected
        path: PathBuf,
    },

    /// A workbook could not be opened, read or written
    #[error("Spreadsheet error in {path}: {message}")]
    Spreadsheet {
        /// Workbook path
        path: String,
        /// Error message
        message: String,
    },

    /// A Turtle document could not be parsed or serialized
    #[error("RDF error in {path}: {message}")]
    Rdf {
        /// Turtle file path
        path: String,
        /// Error message
        message: String,
    },

    /// An external tool exited unsuccessfully
    #[error("{tool} failed ({status})\nstdout: {stdout}\nstderr: {stderr}")]
    ExternalTool {
        /// Tool name
        tool: String,
        /// Exit status description
        status: String,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// IO errors
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pipeline operations
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

impl PipelineError {
    /// Create a missing input error
    #[must_use]
    pub fn missing_input(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingInput {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Create a spreadsheet error
    #[must_use]
    pub fn spreadsheet(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Spreadsheet {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create an RDF error
    #[must_use]
    pub fn rdf(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Rdf {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Wrap an IO error with the path it happened on
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Whether the error stems from workbook layout or input configuration
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Metadata(err) => err.is_configuration(),
            Self::MissingInput { .. } => true,
            _ => false,
        }
    }

    /// Whether an external process caused the failure
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalTool { .. })
    }
}
