//! Pipeline runs
//!
//! One entry point per CLI subcommand. Every run reads its inputs, prints
//! progress through a [`Console`], and tallies per-class outcomes in a
//! [`RunSummary`]. A returned error means the run could not start or lost
//! an input every class depends on; everything else is per class.

mod console;
mod linkml;
mod sempyro;
mod shacl;
mod shaclplay;
mod summary;

pub use console::Console;
pub use linkml::{LinkmlOptions, LinkmlRun, WrittenDocument, run_linkml, write_documents};
pub use sempyro::{SempyroOptions, SempyroRun, detect_namespace, run_sempyro};
pub use shacl::{
    ShaclFromShaclPlayOptions, ShaclOptions, run_postprocess, run_shacl, run_shacl_from_shaclplay,
    shaclplay_class, shaclplay_namespace,
};
pub use shaclplay::{ShaclPlayOptions, run_shaclplay};
pub use summary::{Outcome, RunSummary};
