//! Error types for schema model construction

use thiserror::Error;

/// Main error type for row normalization and schema building
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A sheet required by the pipeline is absent from the workbook
    #[error("Sheet '{sheet}' not found")]
    MissingSheet {
        /// Sheet name
        sheet: String,
    },

    /// A column required by the pipeline is absent from a sheet header
    #[error("Column '{column}' not found in sheet '{sheet}'")]
    MissingColumn {
        /// Sheet name
        sheet: String,
        /// Canonical column name
        column: String,
    },

    /// A required cell is empty on a specific row
    #[error("Row {row} of sheet '{sheet}' is missing '{column}'")]
    MissingValue {
        /// Sheet name
        sheet: String,
        /// Zero-based data row index
        row: usize,
        /// Canonical column name
        column: String,
    },

    /// A prefix is not declared in the prefix map
    #[error("Unknown prefix '{prefix}' in '{value}'")]
    UnknownPrefix {
        /// Prefix that failed to resolve
        prefix: String,
        /// Full value the prefix came from
        value: String,
    },

    /// A value that should be `prefix:local` is not
    #[error("Malformed prefixed name '{value}': {reason}")]
    MalformedName {
        /// Offending value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// Document or configuration parsing errors
    #[error("Failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed
        what: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for schema model operations
pub type Result<T> = std::result::Result<T, MetadataError>;

impl MetadataError {
    /// Create a missing column error
    #[must_use]
    pub fn missing_column(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            sheet: sheet.into(),
            column: column.into(),
        }
    }

    /// Create a missing value error
    #[must_use]
    pub fn missing_value(sheet: impl Into<String>, row: usize, column: impl Into<String>) -> Self {
        Self::MissingValue {
            sheet: sheet.into(),
            row,
            column: column.into(),
        }
    }

    /// Create a malformed name error
    #[must_use]
    pub fn malformed(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedName {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    #[must_use]
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Wrap an IO error with the path it happened on
    #[must_use]
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Whether this error comes from the workbook layout rather than the data itself
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSheet { .. }
                | Self::MissingColumn { .. }
                | Self::MissingValue { .. }
                | Self::UnknownPrefix { .. }
                | Self::MalformedName { .. }
                | Self::Config(_)
        )
    }
}
