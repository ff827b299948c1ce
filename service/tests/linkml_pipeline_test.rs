//! Integration tests for the `linkml` run

mod helpers;

use helpers::{CLASSES, DATASET, PREFIXES, quiet, workspace, write_workbook};
use metadata_automation::linkml::{RDF_MODEL_FILE, read_document};
use metadata_automation::pipeline::{LinkmlOptions, run_linkml};
use metadata_core::Flavour;
use pretty_assertions::assert_eq;

#[test]
fn test_shacl_documents_are_written_per_class() {
    let (dir, input) = workspace();
    let output = dir.path().join("linkml");
    let options = LinkmlOptions {
        input,
        output: output.clone(),
        flavour: Flavour::Shacl,
        excluded_sheets: Vec::new(),
    };

    let run = run_linkml(&options, &quiet()).unwrap();
    assert!(run.summary.is_success());
    assert_eq!(run.written.len(), 1);

    let path = output.join("hri").join("hri-Dataset.yaml");
    assert_eq!(run.written[0].path, path);
    let document = read_document(&path).unwrap();
    assert!(document.classes.contains_key("HRIDataset"));
    assert!(document.slots.contains_key("title"));
    assert!(document.slots.contains_key("landing_page"));
    assert!(document.slots["title"].required);
    assert!(!output.join(RDF_MODEL_FILE).exists());
}

#[test]
fn test_typed_class_documents_bring_support_modules() {
    let (dir, input) = workspace();
    let output = dir.path().join("linkml");
    let options = LinkmlOptions {
        input,
        output: output.clone(),
        flavour: Flavour::TypedClasses,
        excluded_sheets: Vec::new(),
    };

    let run = run_linkml(&options, &quiet()).unwrap();
    assert!(run.summary.is_success());
    assert!(output.join(RDF_MODEL_FILE).is_file());

    let document = read_document(&output.join("hri").join("hri-Dataset.yaml")).unwrap();
    let class = &document.classes["HRIDataset"];
    assert_eq!(class.slots, vec!["title".to_string(), "landing_page".to_string()]);
}

#[test]
fn test_missing_property_sheet_fails_only_that_class() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("metadata.xlsx");
    let classes: Vec<&[&str]> = CLASSES
        .iter()
        .copied()
        .chain(std::iter::once(
            &["Distribution", "hri:Distribution", "dcat:Distribution", "", "dcat", "FALSE"][..],
        ))
        .collect();
    write_workbook(
        &input,
        &[("prefixes", PREFIXES), ("classes", &classes), ("Dataset", DATASET)],
    );

    let options = LinkmlOptions {
        input,
        output: dir.path().join("linkml"),
        flavour: Flavour::Shacl,
        excluded_sheets: Vec::new(),
    };
    let run = run_linkml(&options, &quiet()).unwrap();

    assert_eq!(run.summary.succeeded, vec!["hri-Dataset"]);
    assert_eq!(run.summary.failed.len(), 1);
    assert!(!run.summary.is_success());
}

#[test]
fn test_excluded_sheet_counts_as_missing() {
    let (dir, input) = workspace();
    let options = LinkmlOptions {
        input,
        output: dir.path().join("linkml"),
        flavour: Flavour::Shacl,
        excluded_sheets: vec!["Dataset".to_string()],
    };
    let run = run_linkml(&options, &quiet()).unwrap();
    assert!(run.written.is_empty());
    assert_eq!(run.summary.failed.len(), 1);
}
