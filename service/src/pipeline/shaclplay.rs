//! `shaclplay`: workbook to SHACLPlay tables

use std::path::PathBuf;

use metadata_core::config::ShaclPlayConfig;
use metadata_core::rows::{normalize_classes, normalize_prefixes};
use metadata_core::{ClassRow, PrefixMap};
use tracing::info;

use super::{Console, RunSummary};
use crate::error::{PipelineError, Result};
use crate::linkml::{CLASSES_SHEET, LinkmlCreator, PREFIXES_SHEET};
use crate::shaclplay::{
    ClassShapes, ShaclPlayConverter, Template, output_file_name, validate_classes, write_tables,
};
use crate::sheets::{ExcelWorkbook, Workbook};

/// Inputs of a SHACLPlay run
#[derive(Debug, Clone)]
pub struct ShaclPlayOptions {
    /// Metadata workbook
    pub input: PathBuf,
    /// Directory receiving `SHACL-*.xlsx`
    pub output: PathBuf,
    /// SHACLPlay template workbook
    pub template: PathBuf,
    /// Prefix replacing each class's own prefix in shape names
    pub namespace: Option<String>,
    /// Template metadata values
    pub settings: ShaclPlayConfig,
    /// Sheets never read as property sheets
    pub excluded_sheets: Vec<String>,
}

/// Convert every class of the workbook into a SHACLPlay workbook
///
/// # Errors
///
/// Returns an error when the template or input is missing, the `prefixes`
/// or `classes` sheet is unusable, or a class row lacks a required value.
/// Failures while converting a single class are recorded in the summary.
pub fn run_shaclplay(options: &ShaclPlayOptions, console: &Console) -> Result<RunSummary> {
    console.banner("SHACLPlay Excel Generator");
    console.line("Validating prerequisites...");
    if !options.template.is_file() {
        return Err(PipelineError::missing_input("Template", &options.template));
    }
    console.check(1, format!("Template found: {}", options.template.display()));
    if !options.input.is_file() {
        return Err(PipelineError::missing_input("Input Excel file", &options.input));
    }
    console.check(1, format!("Input Excel found: {}", options.input.display()));

    let mut workbook = ExcelWorkbook::open(&options.input)?;
    workbook.require_sheet(PREFIXES_SHEET)?;
    let prefixes = normalize_prefixes(&workbook.table(PREFIXES_SHEET)?)?;
    console.check(1, format!("Prefixes sheet found with {} entries", prefixes.len()));

    workbook.require_sheet(CLASSES_SHEET)?;
    let classes_table = workbook.table(CLASSES_SHEET)?;
    validate_classes(&classes_table)?;
    let classes = normalize_classes(&classes_table)?;
    console.check(1, format!("Classes sheet found with {} entries", classes.len()));
    console.blank();

    console.line(format!("Loading template from {}...", options.template.display()));
    let template = Template::from_file(&options.template)?;
    let converter = ShaclPlayConverter::new(template, options.settings.clone());
    console.line(format!("Found {} classes to process", classes.len()));
    console.blank();

    let creator = LinkmlCreator::new(options.excluded_sheets.clone());
    let mut summary = RunSummary::default();
    for class in &classes {
        let label = class.sheet_name.clone().unwrap_or_else(|| class.class_uri.clone());
        match convert_class(&mut workbook, &creator, &converter, &prefixes, class, options, console) {
            Ok(path) => {
                console.check(1, format!("Generated {}", path.display()));
                summary.success(label);
            }
            Err(err) => {
                console.error(format!("Failed to convert {label}: {err}"));
                summary.fail(label, &err);
            }
        }
        console.blank();
    }

    console.rule();
    console.line("Conversion complete!");
    console.line(format!("Output files written to {}", options.output.display()));
    console.rule();
    info!(converted = summary.succeeded.len(), failed = summary.failed.len(), "SHACLPlay run finished");
    Ok(summary)
}

fn convert_class<W: Workbook>(
    workbook: &mut W,
    creator: &LinkmlCreator,
    converter: &ShaclPlayConverter,
    prefixes: &PrefixMap,
    class: &ClassRow,
    options: &ShaclPlayOptions,
    console: &Console,
) -> Result<PathBuf> {
    let sheet = class.property_sheet()?;
    let shapes = ClassShapes::from_row(class, options.namespace.as_deref())?;
    console.line(format!("Processing {sheet} class..."));
    console.line(format!("  Ontology: {}:{}", shapes.prefix, shapes.class_name));
    console.line(format!("  Target: {}", shapes.target));

    let properties = creator.load_properties(workbook, class)?;
    console.line(format!("  Loaded {} properties", properties.len()));

    let tables = converter.convert(prefixes, &shapes, &properties)?;
    let path = options.output.join(output_file_name(sheet));
    write_tables(&tables, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_is_fatal() {
        let options = ShaclPlayOptions {
            input: PathBuf::from("in.xlsx"),
            output: PathBuf::from("out"),
            template: PathBuf::from("does/not/exist.xlsx"),
            namespace: None,
            settings: ShaclPlayConfig::default(),
            excluded_sheets: Vec::new(),
        };
        let err = run_shaclplay(&options, &Console::quiet()).unwrap_err();
        assert_eq!(err.to_string(), "Template not found at does/not/exist.xlsx");
    }
}
