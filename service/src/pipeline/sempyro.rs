//! `sempyro`: workbook to filtered typed-class modules

use std::path::{Path, PathBuf};

use metadata_core::passes::{ValidationLogic, apply_validation_logic};
use metadata_core::rows::{Column, normalize_cell};
use metadata_core::utils::PrefixedName;
use metadata_core::{Flavour, MetadataError, RawTable};
use tracing::info;

use super::linkml::write_documents;
use super::{Console, RunSummary};
use crate::error::{PipelineError, Result};
use crate::external::{FormatOutcome, SourceFormatter};
use crate::filter::remove_unwanted_classes;
use crate::generator::{Generator, ImportStatement, ImportsConfig, SempyroGenerator};
use crate::linkml::{CLASSES_SHEET, load_metadata, read_document, resolve_imports};
use crate::sheets::{ExcelWorkbook, Workbook};
use crate::workspace::ScratchDir;

/// Inputs of a typed-class run
#[derive(Debug, Clone)]
pub struct SempyroOptions {
    /// Metadata workbook
    pub input: PathBuf,
    /// Namespace; detected from the first class when absent
    pub namespace: Option<String>,
    /// Output root for schema documents
    pub linkml_output: PathBuf,
    /// Output root for generated modules
    pub sempyro_output: PathBuf,
    /// Imports configuration
    pub imports_path: PathBuf,
    /// Validation logic merged into staged documents; optional on disk
    pub validation_logic_path: PathBuf,
    /// Sheets never read as property sheets
    pub excluded_sheets: Vec<String>,
    /// Whether to run the formatter over the generated modules
    pub format: bool,
}

/// Outcome of a typed-class run
#[derive(Debug, Clone, Default)]
pub struct SempyroRun {
    /// Namespace the run used
    pub namespace: String,
    /// Per-class outcomes; skips are classes without an imports entry
    pub summary: RunSummary,
}

/// Prefix of the first `class_URI` in the `classes` sheet
///
/// # Errors
///
/// Returns an error when the column is absent, the sheet has no class, or
/// the first value has no prefix.
pub fn detect_namespace(classes: &RawTable) -> Result<String> {
    classes.require_columns(&[Column::ClassUri])?;
    let mapping = classes.mapping();
    let index = mapping.index(Column::ClassUri).unwrap_or_default();
    let first = classes
        .rows
        .first()
        .and_then(|row| row.get(index))
        .and_then(|value| normalize_cell(value))
        .ok_or_else(|| MetadataError::missing_value(&classes.name, 0, Column::ClassUri.canonical()))?;
    match first.split_once(':') {
        Some((prefix, _)) if !prefix.is_empty() => Ok(prefix.to_string()),
        _ => Err(MetadataError::Config(format!(
            "Could not parse namespace from class_URI '{first}'; provide one with --namespace"
        ))
        .into()),
    }
}

/// Generate, filter and optionally format one module per class
///
/// # Errors
///
/// Returns an error when the workbook, its metadata sheets or the imports
/// configuration are unusable, or the namespace cannot be determined.
/// Failures of single classes are recorded in the summary.
pub fn run_sempyro(
    options: &SempyroOptions,
    formatter: &dyn SourceFormatter,
    console: &Console,
) -> Result<SempyroRun> {
    console.banner("SeMPyRO Pydantic Class Generator");
    let mut workbook = ExcelWorkbook::open(&options.input)?;
    let classes_table = workbook.table(CLASSES_SHEET)?;

    let namespace = if let Some(namespace) = &options.namespace {
        console.line(format!("Using provided namespace: {namespace}"));
        namespace.clone()
    } else {
        console.line("Auto-detecting namespace from Excel file...");
        let namespace = detect_namespace(&classes_table)?;
        console.line(format!("  Detected namespace: {namespace}"));
        namespace
    };
    classes_table.require_columns(&[Column::AnnotationsOntology])?;
    console.blank();

    console.line("[1/4] Generating LinkML schemas...");
    let sheets = load_metadata(&mut workbook)?;
    let linkml = write_documents(
        &mut workbook,
        &sheets,
        Flavour::TypedClasses,
        &options.linkml_output,
        &options.excluded_sheets,
        console,
    );
    console.check(1, "LinkML schemas generated");
    console.blank();

    console.line("[2/4] Loading imports configuration...");
    if !options.imports_path.is_file() {
        return Err(PipelineError::missing_input("Imports file", &options.imports_path));
    }
    let imports = ImportsConfig::from_file(&options.imports_path)?;
    console.check(1, format!("Loaded imports for {} classes", imports.len()));
    console.check(1, format!("Found {} classes in Excel file", sheets.classes.len()));
    console.blank();

    console.line("[3/4] Generating SeMPyRO Pydantic classes...");
    let logic = ValidationLogic::load_optional(&options.validation_logic_path)?;
    let scratch = ScratchDir::new()?;
    scratch.mirror(&options.linkml_output)?;
    let output_dir = options.sempyro_output.join(&namespace);

    let mut summary = RunSummary::default();
    summary.failed.extend(linkml.summary.failed.iter().cloned());
    for class in &sheets.classes {
        let class_name = match PrefixedName::parse(&class.class_uri) {
            Ok(name) => name.local.to_string(),
            Err(err) => {
                summary.fail(class.class_uri.clone(), &PipelineError::from(err));
                continue;
            }
        };
        let key = format!("{namespace}-{class_name}");
        console.line(format!("  Processing {class_name}..."));

        let Some(statements) = imports.get(&key) else {
            console.warning(format!("No imports configuration found for {key}"));
            summary.skip(key, "no imports configuration");
            continue;
        };

        let relative = Path::new(&namespace).join(format!("{key}.yaml"));
        let target = ClassTarget {
            schema: options.linkml_output.join(&relative),
            relative,
            output: output_dir.join(format!("{key}.py")),
        };
        match generate_class(&target, statements, &logic, &scratch) {
            Ok(removed) => {
                let file = target.output.file_name().map(|n| n.to_string_lossy().into_owned());
                console.check(2, format!("Generated {}", file.unwrap_or_default()));
                info!(class = %key, removed = removed.len(), "generated typed classes");
                summary.success(key);
            }
            Err(err) => {
                console.error(format!("Failed to generate {class_name}: {err}"));
                summary.fail(key, &err);
            }
        }
    }
    console.blank();

    if options.format && !summary.succeeded.is_empty() {
        console.line("[4/4] Formatting generated Python files with ruff...");
        match formatter.format_dir(&output_dir) {
            FormatOutcome::Formatted => {
                console.check(1, format!("Formatted files in {}", output_dir.display()));
            }
            FormatOutcome::Failed(stderr) => {
                console.soft_warning(1, "ruff format failed");
                if !stderr.is_empty() {
                    console.error_detail(stderr);
                }
            }
            FormatOutcome::NotInstalled => {
                console.soft_warning(1, "ruff not found. Install with: pip install ruff");
            }
        }
        console.blank();
    }

    console.rule();
    console.line("Generation complete!");
    console.line(format!("  Successfully generated: {} classes", summary.succeeded.len()));
    console.line(format!("  LinkML schemas: {}", options.linkml_output.display()));
    console.line(format!("  SeMPyRO classes: {}", options.sempyro_output.display()));
    if !summary.skipped.is_empty() {
        console.line("  Classes skipped due to missing imports configuration:");
        for skipped in &summary.skipped {
            console.line(format!("    - {}", skipped.name));
        }
    }
    console.rule();

    Ok(SempyroRun { namespace, summary })
}

struct ClassTarget {
    schema: PathBuf,
    relative: PathBuf,
    output: PathBuf,
}

/// Stage, resolve, render and filter one class; returns the removed class names
///
/// Nothing is written unless every step succeeds.
fn generate_class(
    target: &ClassTarget,
    statements: &[ImportStatement],
    logic: &ValidationLogic,
    scratch: &ScratchDir,
) -> Result<Vec<String>> {
    if !target.schema.is_file() {
        return Err(PipelineError::missing_input("Schema file", &target.schema));
    }
    let mut document = read_document(&target.schema)?;
    apply_validation_logic(&mut document, logic);
    let staged = scratch.stage(&target.relative, &document)?;
    let resolved = resolve_imports(&staged)?;

    let source = SempyroGenerator::with_imports(statements).generate(&resolved)?;
    let filtered = remove_unwanted_classes(&source, &document.local_definitions())?;
    if let Some(parent) = target.output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    std::fs::write(&target.output, filtered.source)
        .map_err(|e| PipelineError::io(&target.output, e))?;
    Ok(filtered.removed)
}
