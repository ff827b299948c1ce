//! Pipeline configuration
//!
//! Every path and constant the pipeline reads lives here so the CLI can
//! override individual fields on top of an optional YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, Result};

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input locations
    pub inputs: InputConfig,

    /// Output locations
    pub outputs: OutputConfig,

    /// SHACLPlay table settings
    pub shaclplay: ShaclPlayConfig,

    /// External tools
    pub tools: ToolConfig,

    /// Sheets never treated as class sheets
    pub excluded_sheets: Vec<String>,
}

/// Input locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// SHACLPlay template workbook
    pub template_path: PathBuf,

    /// Per-class Python import statements
    pub imports_path: PathBuf,

    /// Optional class annotation overrides for the typed-class backend
    pub validation_logic_path: PathBuf,
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// LinkML schema documents
    pub linkml: PathBuf,

    /// Generated typed-class sources
    pub sempyro: PathBuf,

    /// SHACLPlay workbooks
    pub shaclplay: PathBuf,

    /// SHACL Turtle files
    pub shacl: PathBuf,
}

/// SHACLPlay table settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShaclPlayConfig {
    /// Base URI node shapes and nested shapes are minted under
    pub shape_base_uri: String,

    /// Value written to `owl:versionInfo`
    pub version: String,

    /// Profile name used in the default description
    pub profile_name: String,
}

/// External tools
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Java launcher
    pub java_command: String,

    /// xls2rdf one-jar
    pub xls2rdf_jar: PathBuf,

    /// Python formatter binary
    pub ruff_command: String,

    /// Whether to run the formatter over generated sources
    pub format_generated: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: InputConfig::default(),
            outputs: OutputConfig::default(),
            shaclplay: ShaclPlayConfig::default(),
            tools: ToolConfig::default(),
            excluded_sheets: vec!["Info".to_string(), "User Guide".to_string()],
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("inputs/shacls/shaclplay-template.xlsx"),
            imports_path: PathBuf::from("inputs/sempyro/imports.yaml"),
            validation_logic_path: PathBuf::from("inputs/sempyro/validation_logic.yaml"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            linkml: PathBuf::from("outputs/linkml"),
            sempyro: PathBuf::from("outputs/sempyro_classes"),
            shaclplay: PathBuf::from("outputs/shaclplay"),
            shacl: PathBuf::from("outputs/shacl_shapes"),
        }
    }
}

impl Default for ShaclPlayConfig {
    fn default() -> Self {
        Self {
            shape_base_uri: String::from("http://data.health-ri.nl/core/p2/"),
            version: String::from("0.1"),
            profile_name: String::from("Health RI Core plateau 2"),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            java_command: String::from("java"),
            xls2rdf_jar: PathBuf::from("inputs/shacls/xls2rdf-app-3.2.1-onejar.jar"),
            ruff_command: String::from("ruff"),
            format_generated: true,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MetadataError::io(path, e))?;
        serde_yaml::from_str(&text)
            .map_err(|e| MetadataError::parse(format!("configuration {}", path.display()), e.to_string()))
    }

    /// Load from `path` when given, defaults otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if a given file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Whether a sheet is excluded from class processing
    #[must_use]
    pub fn is_excluded(&self, sheet: &str) -> bool {
        self.excluded_sheets.iter().any(|s| s == sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: PipelineConfig =
            serde_yaml::from_str("shaclplay:\n  version: '0.2'\ntools:\n  format_generated: false\n").unwrap();
        assert_eq!(config.shaclplay.version, "0.2");
        assert_eq!(config.shaclplay.shape_base_uri, "http://data.health-ri.nl/core/p2/");
        assert!(!config.tools.format_generated);
        assert!(config.is_excluded("User Guide"));
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(PipelineConfig::load(None).unwrap(), PipelineConfig::default());
    }
}
