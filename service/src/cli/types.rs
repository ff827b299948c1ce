//! CLI type definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use metadata_core::Flavour;

use crate::postprocess::Pass;

/// Spreadsheet-driven metadata schema generation
#[derive(Parser, Debug)]
#[command(name = "metadata-automation", version, about = "Generate LinkML, SHACL and typed RDF classes from metadata workbooks")]
#[command(propagate_version = true)]
pub struct MetadataCli {
    /// Configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - only errors are printed
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: MetadataCommand,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    /// Write one LinkML schema document per class
    Linkml {
        /// Metadata workbook
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Backend the documents are built for
        #[arg(long, value_enum, default_value = "shacl")]
        flavour: FlavourArg,
    },

    /// Convert each class into a SHACLPlay workbook
    Shaclplay {
        /// Metadata workbook
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Prefix to mint shapes under instead of each class's own
        #[arg(short, long)]
        namespace: Option<String>,
        /// SHACLPlay template workbook
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Convert SHACLPlay workbooks to Turtle with xls2rdf
    ShaclFromShaclplay {
        /// Directory holding SHACL-*.xlsx files
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// xls2rdf one-jar
        #[arg(long)]
        jar: Option<PathBuf>,
        /// Keep the converter output as is
        #[arg(long)]
        no_postprocess: bool,
    },

    /// Generate SeMPyRO Pydantic classes
    Sempyro {
        /// Metadata workbook
        #[arg(short, long)]
        input: PathBuf,
        /// Namespace; detected from the first class when omitted
        #[arg(short, long)]
        namespace: Option<String>,
        /// Output directory for LinkML schemas
        #[arg(long)]
        linkml_output_path: Option<PathBuf>,
        /// Output directory for generated classes
        #[arg(long)]
        sempyro_output_path: Option<PathBuf>,
        /// Imports configuration
        #[arg(long)]
        imports_path: Option<PathBuf>,
        /// Validation logic merged into each schema before generation
        #[arg(long)]
        validation_logic_path: Option<PathBuf>,
        /// Skip formatting the generated files
        #[arg(long)]
        no_format: bool,
    },

    /// Generate SHACL Turtle through LinkML schemas
    Shacl {
        /// Metadata workbook
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output directory for the intermediate LinkML schemas
        #[arg(long)]
        linkml_output_path: Option<PathBuf>,
    },

    /// Run post-processing passes over Turtle files in place
    Postprocess {
        /// Turtle files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Passes to run; all when omitted
        #[arg(short, long = "pass", value_enum)]
        passes: Vec<PassArg>,
    },

    /// Remove classes a schema does not define from a generated module
    Filter {
        /// Generated module
        source: PathBuf,
        /// Schema document the module was generated from
        #[arg(short, long)]
        schema: PathBuf,
        /// Output file; the source is rewritten when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Schema document flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlavourArg {
    /// SHACL shape generation
    Shacl,
    /// Typed-class generation
    Sempyro,
    /// Identity and imports only
    Base,
}

impl From<FlavourArg> for Flavour {
    fn from(value: FlavourArg) -> Self {
        match value {
            FlavourArg::Shacl => Flavour::Shacl,
            FlavourArg::Sempyro => Flavour::TypedClasses,
            FlavourArg::Base => Flavour::Base,
        }
    }
}

/// Post-processing passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PassArg {
    /// Remove node shapes without properties
    RemoveEmptyNodeShapes,
    /// Drop class and node-kind constraints next to `sh:node`
    RemoveRedundantConstraints,
    /// Use `sh:IRI` for `xsd:anyURI` properties
    FixUriNodeKinds,
    /// Drop `xsd:anyURI` datatypes
    RemoveAnyuriDatatype,
    /// Drop `sh:ignoredProperties`
    RemoveIgnoredProperties,
    /// Drop `sh:closed`
    RemoveClosedProperties,
}

impl From<PassArg> for Pass {
    fn from(value: PassArg) -> Self {
        match value {
            PassArg::RemoveEmptyNodeShapes => Pass::RemoveEmptyNodeShapes,
            PassArg::RemoveRedundantConstraints => Pass::RemoveRedundantConstraints,
            PassArg::FixUriNodeKinds => Pass::FixUriNodeKinds,
            PassArg::RemoveAnyuriDatatype => Pass::RemoveAnyUriDatatype,
            PassArg::RemoveIgnoredProperties => Pass::RemoveIgnoredProperties,
            PassArg::RemoveClosedProperties => Pass::RemoveClosedProperties,
        }
    }
}

/// Selected passes in pipeline order; every pass when none is selected
#[must_use]
pub fn selected_passes(selected: &[PassArg]) -> Vec<Pass> {
    if selected.is_empty() {
        return Pass::ALL.to_vec();
    }
    let chosen: Vec<Pass> = selected.iter().map(|p| Pass::from(*p)).collect();
    Pass::ALL.into_iter().filter(|p| chosen.contains(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        MetadataCli::command().debug_assert();
    }

    #[test]
    fn test_parse_sempyro() {
        let cli = MetadataCli::parse_from([
            "metadata-automation",
            "sempyro",
            "-i",
            "meta.xlsx",
            "--imports-path",
            "imports.yaml",
            "--quiet",
        ]);
        assert!(cli.quiet);
        let MetadataCommand::Sempyro {
            input,
            namespace,
            imports_path,
            ..
        } = cli.command
        else {
            panic!("expected sempyro");
        };
        assert_eq!(input, PathBuf::from("meta.xlsx"));
        assert_eq!(namespace, None);
        assert_eq!(imports_path, Some(PathBuf::from("imports.yaml")));
    }

    #[test]
    fn test_parse_subcommand_names() {
        let cli = MetadataCli::parse_from(["metadata-automation", "shacl-from-shaclplay", "-i", "out"]);
        assert!(matches!(cli.command, MetadataCommand::ShaclFromShaclplay { .. }));

        let cli = MetadataCli::parse_from(["metadata-automation", "linkml", "-i", "x.xlsx", "--flavour", "sempyro"]);
        let MetadataCommand::Linkml { flavour, .. } = cli.command else {
            panic!("expected linkml");
        };
        assert_eq!(Flavour::from(flavour), Flavour::TypedClasses);
    }

    #[test]
    fn test_selected_passes_keep_pipeline_order() {
        assert_eq!(selected_passes(&[]), Pass::ALL.to_vec());
        assert_eq!(
            selected_passes(&[PassArg::RemoveAnyuriDatatype, PassArg::FixUriNodeKinds]),
            vec![Pass::FixUriNodeKinds, Pass::RemoveAnyUriDatatype]
        );
    }

    #[test]
    fn test_postprocess_requires_files() {
        assert!(MetadataCli::try_parse_from(["metadata-automation", "postprocess"]).is_err());
    }
}
