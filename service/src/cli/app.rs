//! Command-line application

use std::path::{Path, PathBuf};

use clap::Parser;
use metadata_core::PipelineConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use super::types::{MetadataCli, MetadataCommand, selected_passes};
use crate::error::Result;
use crate::external::{RuffFormatter, Xls2RdfConverter};
use crate::filter::filter_generated_file;
use crate::pipeline::{
    Console, LinkmlOptions, RunSummary, SempyroOptions, ShaclFromShaclPlayOptions, ShaclOptions,
    ShaclPlayOptions, run_linkml, run_postprocess, run_sempyro, run_shacl, run_shacl_from_shaclplay,
    run_shaclplay,
};

/// Main application
pub struct MetadataApp {
    cli: MetadataCli,
}

impl MetadataApp {
    /// Create the application from process arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self::new(MetadataCli::parse())
    }

    /// Create the application from parsed arguments
    #[must_use]
    pub fn new(cli: MetadataCli) -> Self {
        Self { cli }
    }

    /// Run the selected command
    ///
    /// Per-class failures are part of the returned summary; the caller
    /// decides the exit status from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the
    /// command fails as a whole.
    pub fn run(self) -> Result<RunSummary> {
        self.init_logging();
        info!("Starting metadata-automation");

        let console = Console::new(self.cli.quiet);
        match self.execute_command(&console) {
            Ok(summary) => {
                summary.print(&console);
                Ok(summary)
            }
            Err(err) => {
                error!("Command failed: {err}");
                Err(err)
            }
        }
    }

    /// Configure the tracing subscriber; `RUST_LOG` wins over the flags
    fn init_logging(&self) {
        let default = if self.cli.quiet {
            "error"
        } else if self.cli.verbose {
            "debug"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        // A subscriber set by an embedding process stays in place.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    fn execute_command(&self, console: &Console) -> Result<RunSummary> {
        let config = PipelineConfig::load(self.cli.config.as_deref())?;
        let excluded_sheets = config.excluded_sheets.clone();

        match &self.cli.command {
            MetadataCommand::Linkml {
                input,
                output,
                flavour,
            } => {
                let options = LinkmlOptions {
                    input: input.clone(),
                    output: or_default(output.as_ref(), &config.outputs.linkml),
                    flavour: (*flavour).into(),
                    excluded_sheets,
                };
                Ok(run_linkml(&options, console)?.summary)
            }
            MetadataCommand::Shaclplay {
                input,
                output,
                namespace,
                template,
            } => {
                let options = ShaclPlayOptions {
                    input: input.clone(),
                    output: or_default(output.as_ref(), &config.outputs.shaclplay),
                    template: or_default(template.as_ref(), &config.inputs.template_path),
                    namespace: namespace.clone(),
                    settings: config.shaclplay.clone(),
                    excluded_sheets,
                };
                run_shaclplay(&options, console)
            }
            MetadataCommand::ShaclFromShaclplay {
                input,
                output,
                jar,
                no_postprocess,
            } => {
                let converter = match jar {
                    Some(jar) => Xls2RdfConverter::new(config.tools.java_command.clone(), jar.clone()),
                    None => Xls2RdfConverter::from_config(&config.tools),
                };
                let options = ShaclFromShaclPlayOptions {
                    input: input.clone(),
                    output: or_default(output.as_ref(), &config.outputs.shacl),
                    passes: if *no_postprocess {
                        Vec::new()
                    } else {
                        selected_passes(&[])
                    },
                };
                run_shacl_from_shaclplay(&options, &converter, console)
            }
            MetadataCommand::Sempyro {
                input,
                namespace,
                linkml_output_path,
                sempyro_output_path,
                imports_path,
                validation_logic_path,
                no_format,
            } => {
                let options = SempyroOptions {
                    input: input.clone(),
                    namespace: namespace.clone(),
                    linkml_output: or_default(linkml_output_path.as_ref(), &config.outputs.linkml),
                    sempyro_output: or_default(sempyro_output_path.as_ref(), &config.outputs.sempyro),
                    imports_path: or_default(imports_path.as_ref(), &config.inputs.imports_path),
                    validation_logic_path: or_default(
                        validation_logic_path.as_ref(),
                        &config.inputs.validation_logic_path,
                    ),
                    excluded_sheets,
                    format: config.tools.format_generated && !*no_format,
                };
                let formatter = RuffFormatter::new(config.tools.ruff_command.clone());
                Ok(run_sempyro(&options, &formatter, console)?.summary)
            }
            MetadataCommand::Shacl {
                input,
                output,
                linkml_output_path,
            } => {
                let options = ShaclOptions {
                    input: input.clone(),
                    output: or_default(output.as_ref(), &config.outputs.shacl),
                    linkml_output: or_default(linkml_output_path.as_ref(), &config.outputs.linkml),
                    excluded_sheets,
                };
                run_shacl(&options, console)
            }
            MetadataCommand::Postprocess { files, passes } => {
                Ok(run_postprocess(files, &selected_passes(passes), console))
            }
            MetadataCommand::Filter {
                source,
                schema,
                output,
            } => {
                let removed = filter_generated_file(source, schema, output.as_deref())?;
                console.line(format!(
                    "Removed {} classes from {}",
                    removed.len(),
                    output.as_ref().unwrap_or(source).display()
                ));
                for name in &removed {
                    console.line(format!("  - {name}"));
                }
                let mut summary = RunSummary::default();
                summary.success(source.display().to_string());
                Ok(summary)
            }
        }
    }
}

fn or_default(value: Option<&PathBuf>, default: &Path) -> PathBuf {
    value.cloned().unwrap_or_else(|| default.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_fails_the_command() {
        let cli = MetadataCli::parse_from([
            "metadata-automation",
            "--quiet",
            "linkml",
            "-i",
            "does/not/exist.xlsx",
        ]);
        let err = MetadataApp::new(cli).run().unwrap_err();
        assert!(err.to_string().contains("does/not/exist.xlsx"));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = MetadataCli::parse_from([
            "metadata-automation",
            "--quiet",
            "--config",
            "missing-config.yaml",
            "postprocess",
            "shapes.ttl",
        ]);
        assert!(MetadataApp::new(cli).run().is_err());
    }
}
