//! Turtle shape runs: `shacl-from-shaclplay`, `shacl` and `postprocess`

use std::path::{Path, PathBuf};

use metadata_core::Flavour;
use metadata_core::passes::strip_typed_class_annotations;
use tracing::{debug, info};

use super::linkml::{WrittenDocument, write_documents};
use super::{Console, RunSummary};
use crate::error::{PipelineError, Result};
use crate::external::TurtleConverter;
use crate::generator::ShaclGenerator;
use crate::linkml::{load_metadata, resolve_imports};
use crate::postprocess::{Pass, postprocess_file, run_passes};
use crate::shaclplay::{NODE_SHAPE_ROW, NODE_SHAPES_SHEET};
use crate::sheets::{ExcelWorkbook, Grid, Workbook, cell};
use crate::workspace::ScratchDir;

/// Inputs of a `shacl-from-shaclplay` run
#[derive(Debug, Clone)]
pub struct ShaclFromShaclPlayOptions {
    /// Directory holding `SHACL-*.xlsx`
    pub input: PathBuf,
    /// Output root; files land under `{namespace}/`
    pub output: PathBuf,
    /// Post-processing passes applied to each converted file
    pub passes: Vec<Pass>,
}

/// Namespace of a SHACLPlay workbook
///
/// Read from the prefix of the node-shape declaration; falls back to the
/// name of the directory holding the workbook.
#[must_use]
pub fn shaclplay_namespace(node_shapes: &Grid, input_dir: &Path) -> String {
    match cell(node_shapes, NODE_SHAPE_ROW, 0).split_once(':') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => input_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Class part of a `SHACL-{class}.xlsx` file name
#[must_use]
pub fn shaclplay_class(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    stem.replacen("SHACL-", "", 1)
}

/// Convert every SHACLPlay workbook in a directory to Turtle
///
/// # Errors
///
/// Returns an error when the converter is unavailable or the directory has
/// no SHACLPlay workbooks. Per-file failures are recorded in the summary.
pub fn run_shacl_from_shaclplay(
    options: &ShaclFromShaclPlayOptions,
    converter: &dyn TurtleConverter,
    console: &Console,
) -> Result<RunSummary> {
    console.banner("SHACL Turtle Generator from SHACLPlay Excel");
    converter.ensure_available()?;

    let pattern = options.input.join("SHACL-*.xlsx");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| PipelineError::spreadsheet(&options.input, format!("Invalid pattern: {e}")))?
        .filter_map(std::result::Result::ok)
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(PipelineError::missing_input("SHACLPlay Excel files", &options.input));
    }
    console.line(format!("Found {} SHACLPlay Excel files to convert", files.len()));
    console.blank();

    let mut summary = RunSummary::default();
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match convert_file(file, options, converter, console) {
            Ok(path) => {
                console.check(1, format!("Successfully generated {}", path.display()));
                summary.success(name);
            }
            Err(err) => {
                report_conversion_error(&name, &err, console);
                summary.fail(name, &err);
            }
        }
        console.blank();
    }

    console.rule();
    console.line("Conversion complete!");
    console.line(format!("SHACL Turtle files written to {}", options.output.display()));
    console.rule();
    Ok(summary)
}

fn convert_file(
    file: &Path,
    options: &ShaclFromShaclPlayOptions,
    converter: &dyn TurtleConverter,
    console: &Console,
) -> Result<PathBuf> {
    let mut workbook = ExcelWorkbook::open(file)?;
    let node_shapes = workbook.grid(NODE_SHAPES_SHEET)?;
    let namespace = shaclplay_namespace(&node_shapes, &options.input);
    let class = shaclplay_class(file);
    let dir = options.output.join(&namespace);
    let output = dir.join(format!("{namespace}-{class}.ttl"));

    console.line(format!("Processing {}...", file.display()));
    console.line(format!("  Namespace: {namespace}"));
    console.line(format!("  Output: {}", output.display()));

    std::fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;
    let captured = converter.convert(file, &output)?;
    if !captured.stdout.is_empty() {
        console.line(format!("  Output: {}", captured.stdout));
    }
    if !captured.stderr.is_empty() {
        console.line(format!("  Warnings: {}", captured.stderr));
    }

    if !options.passes.is_empty() {
        let report = postprocess_file(&output, &options.passes)?;
        console.check(1, format!("Post-processed ({} edits)", report.total()));
    }
    Ok(output)
}

fn report_conversion_error(name: &str, err: &PipelineError, console: &Console) {
    console.error(format!("Failed to convert {name}"));
    if let PipelineError::ExternalTool {
        status,
        stdout,
        stderr,
        ..
    } = err
    {
        console.error_detail(format!("Return code: {status}"));
        if !stdout.is_empty() {
            console.error_detail(format!("stdout: {stdout}"));
        }
        if !stderr.is_empty() {
            console.error_detail(format!("stderr: {stderr}"));
        }
    } else {
        console.error_detail(err);
    }
}

/// Inputs of a native `shacl` run
#[derive(Debug, Clone)]
pub struct ShaclOptions {
    /// Metadata workbook
    pub input: PathBuf,
    /// Output root for Turtle files
    pub output: PathBuf,
    /// Output root for the intermediate schema documents
    pub linkml_output: PathBuf,
    /// Sheets never read as property sheets
    pub excluded_sheets: Vec<String>,
}

/// Workbook to SHACL Turtle through schema documents and the native generator
///
/// Each class's document is written, staged with typed-class annotations
/// stripped, resolved, rendered as shapes and post-processed.
///
/// # Errors
///
/// Returns an error when the workbook or its metadata sheets are unusable,
/// or the scratch directory cannot be set up.
pub fn run_shacl(options: &ShaclOptions, console: &Console) -> Result<RunSummary> {
    console.banner("SHACL Shape Generator");
    let mut workbook = ExcelWorkbook::open(&options.input)?;
    let sheets = load_metadata(&mut workbook)?;

    console.line("[1/2] Generating LinkML schemas...");
    let linkml = write_documents(
        &mut workbook,
        &sheets,
        Flavour::Shacl,
        &options.linkml_output,
        &options.excluded_sheets,
        console,
    );
    let mut summary = RunSummary::default();
    summary.failed.extend(linkml.summary.failed.iter().cloned());
    console.blank();

    console.line("[2/2] Generating SHACL shapes...");
    let scratch = ScratchDir::new()?;
    scratch.mirror(&options.linkml_output)?;
    let generator = ShaclGenerator::new();
    for written in &linkml.written {
        let output = options
            .output
            .join(written.relative_path.with_extension("ttl"));
        let result = render_shapes(&generator, &scratch, written, &output);
        match result {
            Ok(edits) => {
                debug!(key = %written.key, edits, "post-processed shapes");
                console.check(1, format!("Generated {}", output.display()));
                summary.success(written.key.clone());
            }
            Err(err) => {
                console.error(format!("Failed to generate shapes for {}: {err}", written.key));
                summary.fail(written.key.clone(), &err);
            }
        }
    }
    info!(generated = summary.succeeded.len(), "SHACL run finished");
    Ok(summary)
}

fn render_shapes(
    generator: &ShaclGenerator,
    scratch: &ScratchDir,
    written: &WrittenDocument,
    output: &Path,
) -> Result<usize> {
    let mut document = written.document.clone();
    strip_typed_class_annotations(&mut document);
    let staged = scratch.stage(&written.relative_path, &document)?;
    let resolved = resolve_imports(&staged)?;
    let mut shapes = generator.build(&resolved)?;
    let report = run_passes(&mut shapes, &Pass::ALL);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    shapes.write(output)?;
    Ok(report.total())
}

/// Apply post-processing passes to existing Turtle files
///
/// Each file is rewritten in place; failures are per file.
pub fn run_postprocess(files: &[PathBuf], passes: &[Pass], console: &Console) -> RunSummary {
    let mut summary = RunSummary::default();
    for file in files {
        let name = file.display().to_string();
        match postprocess_file(file, passes) {
            Ok(report) => {
                for (pass, count) in report.edits.iter().filter(|(_, count)| *count > 0) {
                    console.line(format!("  {pass}: {count}"));
                }
                console.check(1, format!("{name}: {} edits", report.total()));
                summary.success(name);
            }
            Err(err) => {
                console.error(format!("Failed to post-process {name}: {err}"));
                summary.fail(name, &err);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid_with_declaration(value: &str) -> Grid {
        let mut grid = vec![Vec::new(); NODE_SHAPE_ROW];
        grid.push(vec![value.to_string()]);
        grid
    }

    #[test]
    fn test_namespace_from_declaration() {
        let grid = grid_with_declaration("eucaim:DatasetShape");
        assert_eq!(shaclplay_namespace(&grid, Path::new("out/shaclplay")), "eucaim");
    }

    #[test]
    fn test_namespace_falls_back_to_directory() {
        let grid = grid_with_declaration("DatasetShape");
        assert_eq!(shaclplay_namespace(&grid, Path::new("out/hri")), "hri");
        assert_eq!(shaclplay_namespace(&Grid::new(), Path::new("out/hri")), "hri");
    }

    #[test]
    fn test_class_from_file_name() {
        assert_eq!(shaclplay_class(Path::new("dir/SHACL-dataset.xlsx")), "dataset");
    }

    #[test]
    fn test_postprocess_missing_file_is_recorded() {
        let summary = run_postprocess(
            &[PathBuf::from("does/not/exist.ttl")],
            &Pass::ALL,
            &Console::quiet(),
        );
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.succeeded.is_empty());
    }
}
