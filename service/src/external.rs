//! External tool adapters
//!
//! Two processes sit outside the crate: the xls2rdf converter, which turns
//! SHACLPlay workbooks into Turtle, and a source formatter run over the
//! generated typed-class modules. Both are invoked synchronously with their
//! output captured.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use metadata_core::config::ToolConfig;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Captured output of a successful tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Standard output, trimmed
    pub stdout: String,
    /// Standard error, trimmed
    pub stderr: String,
}

impl ToolOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Converts a SHACLPlay workbook into a Turtle shapes file
pub trait TurtleConverter {
    /// Tool name used in messages
    fn name(&self) -> &str;

    /// Check that the tool can be run at all
    ///
    /// # Errors
    ///
    /// Returns an error describing what is missing.
    fn ensure_available(&self) -> Result<()>;

    /// Convert `input` into `output`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalTool`] with both output streams when
    /// the tool exits unsuccessfully.
    fn convert(&self, input: &Path, output: &Path) -> Result<ToolOutput>;
}

/// The xls2rdf one-jar, run through a Java launcher
#[derive(Debug, Clone)]
pub struct Xls2RdfConverter {
    java: String,
    jar: PathBuf,
}

impl Xls2RdfConverter {
    /// Create a converter for the given launcher and jar
    #[must_use]
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            jar: jar.into(),
        }
    }

    /// Create a converter from the tool configuration
    #[must_use]
    pub fn from_config(tools: &ToolConfig) -> Self {
        Self::new(tools.java_command.clone(), tools.xls2rdf_jar.clone())
    }

    /// Path of the jar
    #[must_use]
    pub fn jar(&self) -> &Path {
        &self.jar
    }

    /// `java -jar {jar} convert -i {input} -o {output} -sh -np`
    #[must_use]
    pub fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.java);
        command
            .arg("-jar")
            .arg(&self.jar)
            .arg("convert")
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .args(["-sh", "-np"]);
        command
    }
}

impl TurtleConverter for Xls2RdfConverter {
    fn name(&self) -> &str {
        "xls2rdf"
    }

    fn ensure_available(&self) -> Result<()> {
        if self.jar.is_file() {
            Ok(())
        } else {
            Err(PipelineError::missing_input("xls2rdf JAR", &self.jar))
        }
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<ToolOutput> {
        let mut command = self.command(input, output);
        debug!(?command, "running xls2rdf");
        let result = command.output().map_err(|e| PipelineError::ExternalTool {
            tool: self.name().to_string(),
            status: format!("could not start {}: {e}", self.java),
            stdout: String::new(),
            stderr: String::new(),
        })?;

        let captured = ToolOutput::from_output(&result);
        if result.status.success() {
            Ok(captured)
        } else {
            Err(PipelineError::ExternalTool {
                tool: self.name().to_string(),
                status: result.status.to_string(),
                stdout: captured.stdout,
                stderr: captured.stderr,
            })
        }
    }
}

/// What happened when formatting a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Files were formatted
    Formatted,
    /// The formatter ran and failed
    Failed(String),
    /// The formatter binary could not be found
    NotInstalled,
}

/// Formats generated source files in place
pub trait SourceFormatter {
    /// Format every file under `dir`; never fails the run
    fn format_dir(&self, dir: &Path) -> FormatOutcome;
}

/// `ruff format {dir}`
#[derive(Debug, Clone)]
pub struct RuffFormatter {
    command: String,
}

impl RuffFormatter {
    /// Create a formatter running the given binary
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for RuffFormatter {
    fn default() -> Self {
        Self::new("ruff")
    }
}

impl SourceFormatter for RuffFormatter {
    fn format_dir(&self, dir: &Path) -> FormatOutcome {
        match Command::new(&self.command).arg("format").arg(dir).output() {
            Ok(output) if output.status.success() => FormatOutcome::Formatted,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                warn!(dir = %dir.display(), %stderr, "ruff format failed");
                FormatOutcome::Failed(stderr)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => FormatOutcome::NotInstalled,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "could not run ruff");
                FormatOutcome::Failed(e.to_string())
            }
        }
    }
}
