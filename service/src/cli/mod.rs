//! Command-line interface
//!
//! Subcommands map one to one onto the pipeline runs in [`crate::pipeline`].
//! Paths not given on the command line come from the configuration file.

mod app;
mod types;

pub use app::MetadataApp;
pub use types::{FlavourArg, MetadataCli, MetadataCommand, PassArg, selected_passes};

use crate::pipeline::RunSummary;

/// Parse process arguments and run the selected command
///
/// # Errors
///
/// Returns an error if the command fails as a whole.
pub fn run() -> crate::error::Result<RunSummary> {
    MetadataApp::from_args().run()
}
