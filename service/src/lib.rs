//! # Metadata Automation
//!
//! Turns a metadata workbook into the artifacts downstream tooling needs:
//!
//! - LinkML schema documents, one per class ([`linkml`])
//! - SHACLPlay workbooks filled from a template ([`shaclplay`]), converted
//!   to Turtle by the external xls2rdf tool ([`external`])
//! - SHACL Turtle rendered natively from the schema documents
//!   ([`generator::ShaclGenerator`])
//! - Typed Pydantic classes, reduced to the classes each schema defines
//!   ([`generator::SempyroGenerator`], [`filter`])
//!
//! Generated shapes graphs are cleaned up by the passes in [`postprocess`].
//! Each CLI subcommand is a run in [`pipeline`]; failures of a single class
//! are collected in a [`pipeline::RunSummary`] instead of ending the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use metadata_automation::pipeline::{Console, LinkmlOptions, run_linkml};
//! use metadata_core::Flavour;
//!
//! let options = LinkmlOptions {
//!     input: "metadata.xlsx".into(),
//!     output: "outputs/linkml".into(),
//!     flavour: Flavour::Shacl,
//!     excluded_sheets: Vec::new(),
//! };
//! let run = run_linkml(&options, &Console::new(false))?;
//! assert!(run.summary.is_success());
//! # Ok::<(), metadata_automation::PipelineError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)] // LinkML, SHACL, SeMPyRO, etc. are proper nouns
#![allow(clippy::cast_possible_truncation)] // cell positions are bounded by sheet limits
#![allow(clippy::missing_errors_doc)]

/// Error types
pub mod error;

/// Workbook access
pub mod sheets;

/// Schema documents per class
pub mod linkml;

/// Native generators
pub mod generator;

/// Turtle handling
pub mod rdf;

/// Generated-artifact filter
pub mod filter;

/// Shapes graph post-processing
pub mod postprocess;

/// SHACLPlay workbook generation
pub mod shaclplay;

/// External converters and formatters
pub mod external;

/// Scratch directories
pub mod workspace;

/// Pipeline runs
pub mod pipeline;

/// Command-line interface
pub mod cli;

pub use error::{PipelineError, Result};
pub use external::{RuffFormatter, SourceFormatter, TurtleConverter, Xls2RdfConverter};
pub use pipeline::{Console, RunSummary};
pub use postprocess::Pass;
pub use rdf::TurtleDocument;
pub use sheets::{ExcelWorkbook, MemoryWorkbook, Workbook};

/// Re-export of the schema model
pub use metadata_core;
