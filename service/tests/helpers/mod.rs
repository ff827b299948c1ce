//! Shared fixtures for the integration tests
//!
//! Workbooks are written with `rust_xlsxwriter` into a temporary directory
//! so every test reads real `.xlsx` files through the same code path as the
//! command-line tool.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use metadata_automation::pipeline::Console;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// One sheet: its name and rows of cell text
pub type Sheet<'a> = (&'a str, &'a [&'a [&'a str]]);

/// Write a workbook of string cells; empty strings leave the cell blank
pub fn write_workbook(path: &Path, sheets: &[Sheet<'_>]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

pub const PREFIXES: &[&[&str]] = &[
    &["prefix", "namespace"],
    &["hri", "http://example.com/hri/"],
    &["dcat", "http://www.w3.org/ns/dcat#"],
    &["dcterms", "http://purl.org/dc/terms/"],
];

pub const CLASSES: &[&[&str]] = &[
    &[
        "sheet_name",
        "class_URI",
        "SHACL_target_ontology_name",
        "description",
        "SeMPyRO_annotations_ontology",
        "SeMPyRO_add_rdf_model",
    ],
    &["Dataset", "hri:Dataset", "dcat:Dataset", "A collection of data", "dcat", "FALSE"],
];

pub const DATASET: &[&[&str]] = &[
    &[
        "Property label",
        "Definition",
        "Property URI",
        "Cardinality",
        "Range",
        "SeMPyRO_range",
        "SeMPyRO_rdf_term",
        "SeMPyRO_rdf_type",
    ],
    &[
        "title",
        "A name given to the dataset.",
        "dcterms:title",
        "1..n",
        "xsd:string",
        "string",
        "DCTERMS.title",
        "rdfs_literal",
    ],
    &[
        "landing page",
        "A web page for the dataset.",
        "dcat:landingPage",
        "0..n",
        "xsd:anyURI",
        "string",
        "DCAT.landingPage",
        "uri",
    ],
];

/// The metadata workbook used across the tests
pub fn metadata_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("metadata.xlsx");
    write_workbook(
        &path,
        &[("prefixes", PREFIXES), ("classes", CLASSES), ("Dataset", DATASET)],
    );
    path
}

/// A SHACLPlay template with the real sheet layout
pub fn template_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("template.xlsx");
    write_workbook(
        &path,
        &[
            (
                "NodeShapes (classes)",
                &[
                    &["Shapes URI", "https://example.com/shapes"],
                    &[""],
                    &["rdfs:label@en", "label"],
                    &["rdfs:comment@en", "comment"],
                    &["dcterms:description@en", "description"],
                    &["owl:versionInfo", "0.0"],
                    &["dcterms:modified", "2000-01-01"],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &["URI", "rdfs:label@en", "rdfs:comment@en", "rdf:type", "sh:targetClass"],
                ],
            ),
            (
                "PropertyShapes (properties)",
                &[
                    &["Shapes URI", "https://example.com/shapes"],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &[""],
                    &["URI", "^sh:property", "sh:path", "sh:name@en"],
                    &["Section", "", "", ""],
                ],
            ),
        ],
    );
    path
}

/// A temporary directory holding the metadata workbook
pub fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let input = metadata_workbook(dir.path());
    (dir, input)
}

pub fn quiet() -> Console {
    Console::quiet()
}
