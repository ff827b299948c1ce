//! Integration tests for the native `shacl` and `postprocess` runs

mod helpers;

use helpers::{quiet, workspace};
use metadata_automation::pipeline::{ShaclOptions, run_postprocess, run_shacl};
use metadata_automation::rdf::{is_node, sh};
use metadata_automation::{Pass, TurtleDocument};
use oxigraph::model::{NamedNodeRef, TermRef};
use pretty_assertions::assert_eq;

const DATASET_SHAPE: &str = "http://example.com/hri/DatasetShape";

#[test]
fn test_shapes_are_written_next_to_documents() {
    let (dir, input) = workspace();
    let options = ShaclOptions {
        input,
        output: dir.path().join("shacl"),
        linkml_output: dir.path().join("linkml"),
        excluded_sheets: Vec::new(),
    };

    let summary = run_shacl(&options, &quiet()).unwrap();
    assert_eq!(summary.succeeded, vec!["hri-Dataset"]);

    let path = options.output.join("hri").join("hri-Dataset.ttl");
    let shapes = TurtleDocument::from_file(&path).unwrap();
    let subject = NamedNodeRef::new_unchecked(DATASET_SHAPE);

    let targets: Vec<TermRef<'_>> = shapes
        .graph
        .objects_for_subject_predicate(subject, sh::TARGET_CLASS)
        .collect();
    assert_eq!(targets.len(), 1);
    assert!(is_node(
        targets[0],
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/dcat#Dataset")
    ));
    assert_eq!(
        shapes
            .graph
            .objects_for_subject_predicate(subject, sh::PROPERTY)
            .count(),
        2
    );
    assert!(
        shapes
            .graph
            .triples_for_predicate(sh::CLOSED)
            .next()
            .is_none()
    );
    assert!(options.linkml_output.join("hri").join("hri-Dataset.yaml").is_file());
}

#[test]
fn test_postprocess_rewrites_files_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shapes.ttl");
    std::fs::write(
        &path,
        r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.com/> .

ex:AShape a sh:NodeShape ;
    sh:closed true ;
    sh:ignoredProperties ( ex:other ) ;
    sh:property [ sh:path ex:p ; sh:node ex:BShape ; sh:class ex:B ] .
"#,
    )
    .unwrap();

    let summary = run_postprocess(
        std::slice::from_ref(&path),
        &[Pass::RemoveRedundantConstraints, Pass::RemoveClosedProperties],
        &quiet(),
    );
    assert!(summary.is_success());

    let shapes = TurtleDocument::from_file(&path).unwrap();
    assert!(shapes.graph.triples_for_predicate(sh::CLOSED).next().is_none());
    assert!(shapes.graph.triples_for_predicate(sh::CLASS).next().is_none());
    assert!(shapes.graph.triples_for_predicate(sh::IGNORED_PROPERTIES).next().is_some());
    assert!(shapes.prefixes.iter().any(|(p, _)| p == "ex"));
}

#[test]
fn test_postprocess_failure_is_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.ttl");
    std::fs::write(&broken, "ex:a ex:b").unwrap();
    let missing = dir.path().join("missing.ttl");

    let summary = run_postprocess(&[broken, missing], &Pass::ALL, &quiet());
    assert_eq!(summary.failed.len(), 2);
}
