//! `linkml`: workbook to schema documents

use std::path::{Path, PathBuf};

use metadata_core::{Flavour, SchemaDocument};
use tracing::info;

use super::{Console, RunSummary};
use crate::error::Result;
use crate::linkml::{LinkmlCreator, MetadataSheets, load_metadata, write_support_modules};
use crate::sheets::{ExcelWorkbook, Workbook};

/// Inputs of a LinkML run
#[derive(Debug, Clone)]
pub struct LinkmlOptions {
    /// Metadata workbook
    pub input: PathBuf,
    /// Output root; documents land under `{prefix}/`
    pub output: PathBuf,
    /// Which backend the documents are built for
    pub flavour: Flavour,
    /// Sheets never read as property sheets
    pub excluded_sheets: Vec<String>,
}

/// A document written during a run
#[derive(Debug, Clone)]
pub struct WrittenDocument {
    /// `{prefix}-{Class}`
    pub key: String,
    /// Where it was written
    pub path: PathBuf,
    /// Path relative to the output root
    pub relative_path: PathBuf,
    /// The document as written
    pub document: SchemaDocument,
}

/// Outcome of a LinkML run
#[derive(Debug, Clone, Default)]
pub struct LinkmlRun {
    /// Per-class outcomes
    pub summary: RunSummary,
    /// Documents written, in class order
    pub written: Vec<WrittenDocument>,
}

/// Build and write one document per class of the workbook
///
/// # Errors
///
/// Returns an error when the workbook cannot be opened or its `prefixes` or
/// `classes` sheet is unusable. Per-class failures are recorded in the
/// summary instead.
pub fn run_linkml(options: &LinkmlOptions, console: &Console) -> Result<LinkmlRun> {
    let mut workbook = ExcelWorkbook::open(&options.input)?;
    let sheets = load_metadata(&mut workbook)?;
    Ok(write_documents(
        &mut workbook,
        &sheets,
        options.flavour,
        &options.output,
        &options.excluded_sheets,
        console,
    ))
}

/// Build, write and tally documents for already loaded metadata sheets
///
/// Typed-class batches also get the support modules their imports point at.
pub fn write_documents<W: Workbook>(
    workbook: &mut W,
    sheets: &MetadataSheets,
    flavour: Flavour,
    output: &Path,
    excluded_sheets: &[String],
    console: &Console,
) -> LinkmlRun {
    let creator = LinkmlCreator::new(excluded_sheets.to_vec());
    let mut run = LinkmlRun::default();

    for (class_uri, built) in creator.build_all(workbook, sheets, flavour) {
        let written = built.and_then(|built| {
            let path = creator.write(output, &built)?;
            Ok(WrittenDocument {
                key: built.key,
                path,
                relative_path: built.relative_path,
                document: built.document,
            })
        });
        match written {
            Ok(written) => {
                console.check(1, format!("Wrote {}", written.path.display()));
                run.summary.success(written.key.clone());
                run.written.push(written);
            }
            Err(err) => {
                console.error(format!("Failed to build {class_uri}: {err}"));
                run.summary.fail(class_uri, &err);
            }
        }
    }

    if flavour == Flavour::TypedClasses && !run.written.is_empty() {
        let documents: Vec<SchemaDocument> =
            run.written.iter().map(|w| w.document.clone()).collect();
        match write_support_modules(output, &documents) {
            Ok(paths) => {
                for path in paths {
                    console.check(1, format!("Wrote {}", path.display()));
                }
            }
            Err(err) => {
                console.error(format!("Failed to write support modules: {err}"));
                run.summary.fail("support modules", &err);
            }
        }
    }

    info!(
        written = run.written.len(),
        failed = run.summary.failed.len(),
        "LinkML documents written"
    );
    run
}
