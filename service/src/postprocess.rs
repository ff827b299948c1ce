//! Turtle post-processing
//!
//! Mechanical edits applied to generated shapes files. Every pass only
//! removes triples or rewrites one triple keyed off another that is already
//! present, so a second run of any pass is a no-op. [`Pass::FixUriNodeKinds`]
//! keys off the datatype that [`Pass::RemoveAnyUriDatatype`] deletes and has
//! to run first.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{Graph, NamedNodeRef, NamedOrBlankNode, Triple};
use tracing::{debug, info};

use crate::error::Result;
use crate::rdf::{TurtleDocument, as_subject, is_node, sh, term};

/// One post-processing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Drop node shapes without `sh:property`, then unreferenced blank nodes
    RemoveEmptyNodeShapes,
    /// Drop `sh:class` and `sh:nodeKind` from properties that declare `sh:node`
    RemoveRedundantConstraints,
    /// Set `sh:nodeKind sh:IRI` on properties with datatype `xsd:anyURI`
    FixUriNodeKinds,
    /// Drop `sh:datatype xsd:anyURI`
    RemoveAnyUriDatatype,
    /// Drop `sh:ignoredProperties` from node shapes
    RemoveIgnoredProperties,
    /// Drop `sh:closed` from node shapes
    RemoveClosedProperties,
}

impl Pass {
    /// Every pass, in the order the pipeline applies them
    pub const ALL: [Pass; 6] = [
        Pass::RemoveEmptyNodeShapes,
        Pass::RemoveRedundantConstraints,
        Pass::FixUriNodeKinds,
        Pass::RemoveAnyUriDatatype,
        Pass::RemoveIgnoredProperties,
        Pass::RemoveClosedProperties,
    ];

    /// Apply the pass, returning the number of edits made
    pub fn apply(self, graph: &mut Graph) -> usize {
        match self {
            Pass::RemoveEmptyNodeShapes => remove_empty_node_shapes(graph),
            Pass::RemoveRedundantConstraints => remove_redundant_constraints(graph),
            Pass::FixUriNodeKinds => fix_uri_node_kinds(graph),
            Pass::RemoveAnyUriDatatype => remove_anyuri_datatype(graph),
            Pass::RemoveIgnoredProperties => remove_ignored_properties(graph),
            Pass::RemoveClosedProperties => remove_closed_properties(graph),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::RemoveEmptyNodeShapes => "remove_empty_node_shapes",
            Pass::RemoveRedundantConstraints => "remove_redundant_constraints",
            Pass::FixUriNodeKinds => "fix_uri_node_kinds",
            Pass::RemoveAnyUriDatatype => "remove_anyuri_datatype",
            Pass::RemoveIgnoredProperties => "remove_ignored_properties",
            Pass::RemoveClosedProperties => "remove_closed_properties",
        };
        f.write_str(name)
    }
}

/// Edits made to one file, per pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessReport {
    /// `(pass, edits)` in application order
    pub edits: Vec<(Pass, usize)>,
}

impl PostProcessReport {
    /// Total number of edits
    #[must_use]
    pub fn total(&self) -> usize {
        self.edits.iter().map(|(_, n)| n).sum()
    }
}

/// Run passes over a parsed document
pub fn run_passes(document: &mut TurtleDocument, passes: &[Pass]) -> PostProcessReport {
    let mut report = PostProcessReport::default();
    for pass in passes {
        let edits = pass.apply(&mut document.graph);
        debug!(pass = %pass, edits, "applied post-processing pass");
        report.edits.push((*pass, edits));
    }
    report
}

/// Rewrite a Turtle file in place with the given passes
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written.
pub fn postprocess_file(path: &Path, passes: &[Pass]) -> Result<PostProcessReport> {
    let mut document = TurtleDocument::from_file(path)?;
    let report = run_passes(&mut document, passes);
    document.write(path)?;
    info!(path = %path.display(), edits = report.total(), "post-processed shapes");
    Ok(report)
}

fn node_shapes(graph: &Graph) -> Vec<NamedOrBlankNode> {
    graph
        .iter()
        .filter(|t| t.predicate == rdf::TYPE && is_node(t.object, sh::NODE_SHAPE))
        .map(|t| t.subject.into_owned())
        .collect()
}

/// Subjects of `sh:property` objects
fn property_shapes(graph: &Graph) -> Vec<NamedOrBlankNode> {
    let mut seen = HashSet::new();
    graph
        .iter()
        .filter(|t| t.predicate == sh::PROPERTY)
        .filter_map(|t| as_subject(t.object))
        .filter(|node| seen.insert(node.clone()))
        .collect()
}

fn matching(
    graph: &Graph,
    subject: &NamedOrBlankNode,
    predicate: Option<NamedNodeRef<'_>>,
) -> Vec<Triple> {
    graph
        .iter()
        .filter(|t| t.subject == subject.as_ref() && predicate.is_none_or(|p| t.predicate == p))
        .map(|t| t.into_owned())
        .collect()
}

fn has(graph: &Graph, subject: &NamedOrBlankNode, predicate: NamedNodeRef<'_>) -> bool {
    graph
        .iter()
        .any(|t| t.subject == subject.as_ref() && t.predicate == predicate)
}

fn remove_all(graph: &mut Graph, triples: &[Triple]) -> usize {
    triples.iter().filter(|t| graph.remove(*t)).count()
}

/// Remove node shapes with no `sh:property`, then every blank node that is
/// no longer the object of any triple
pub fn remove_empty_node_shapes(graph: &mut Graph) -> usize {
    let mut removed = 0;
    for shape in node_shapes(graph) {
        if has(graph, &shape, sh::PROPERTY) {
            continue;
        }
        let triples = matching(graph, &shape, None);
        removed += remove_all(graph, &triples);
        debug!(shape = %shape, "removed empty node shape");
    }
    removed + remove_orphaned_blank_nodes(graph)
}

/// Remove triples of blank nodes that nothing refers to, until none are left
fn remove_orphaned_blank_nodes(graph: &mut Graph) -> usize {
    let mut removed = 0;
    loop {
        let referenced: HashSet<NamedOrBlankNode> =
            graph.iter().filter_map(|t| as_subject(t.object)).collect();
        let orphans: Vec<Triple> = graph
            .iter()
            .filter(|t| matches!(t.subject, oxigraph::model::NamedOrBlankNodeRef::BlankNode(_)))
            .filter(|t| !referenced.contains(&t.subject.into_owned()))
            .map(|t| t.into_owned())
            .collect();
        if orphans.is_empty() {
            return removed;
        }
        removed += remove_all(graph, &orphans);
    }
}

/// Drop `sh:class` and `sh:nodeKind` from properties that declare `sh:node`
pub fn remove_redundant_constraints(graph: &mut Graph) -> usize {
    let mut removed = 0;
    for property in property_shapes(graph) {
        if !has(graph, &property, sh::NODE) {
            continue;
        }
        let mut triples = matching(graph, &property, Some(sh::CLASS));
        triples.extend(matching(graph, &property, Some(sh::NODE_KIND)));
        removed += remove_all(graph, &triples);
    }
    removed
}

fn has_anyuri_datatype(graph: &Graph, property: &NamedOrBlankNode) -> bool {
    graph.iter().any(|t| {
        t.subject == property.as_ref() && t.predicate == sh::DATATYPE && is_node(t.object, xsd::ANY_URI)
    })
}

/// Replace the node kind of `xsd:anyURI` properties with `sh:IRI`
///
/// Counts only properties whose node kind actually changed.
pub fn fix_uri_node_kinds(graph: &mut Graph) -> usize {
    let mut changed = 0;
    for property in property_shapes(graph) {
        if !has_anyuri_datatype(graph, &property) {
            continue;
        }
        let existing = matching(graph, &property, Some(sh::NODE_KIND));
        let already_iri = existing.len() == 1 && is_node(existing[0].object.as_ref(), sh::IRI);
        if already_iri {
            continue;
        }
        remove_all(graph, &existing);
        graph.insert(&Triple::new(property.clone(), sh::NODE_KIND, term(sh::IRI)));
        changed += 1;
    }
    changed
}

/// Drop `sh:datatype xsd:anyURI` from every property
pub fn remove_anyuri_datatype(graph: &mut Graph) -> usize {
    let triples: Vec<Triple> = property_shapes(graph)
        .iter()
        .filter(|property| has_anyuri_datatype(graph, property))
        .map(|property| Triple::new(property.clone(), sh::DATATYPE, term(xsd::ANY_URI)))
        .collect();
    remove_all(graph, &triples)
}

fn remove_from_node_shapes(graph: &mut Graph, predicate: NamedNodeRef<'_>) -> usize {
    let mut removed = 0;
    for shape in node_shapes(graph) {
        let triples = matching(graph, &shape, Some(predicate));
        removed += remove_all(graph, &triples);
    }
    removed + remove_orphaned_blank_nodes(graph)
}

/// Drop `sh:ignoredProperties` from node shapes, along with the lists
pub fn remove_ignored_properties(graph: &mut Graph) -> usize {
    remove_from_node_shapes(graph, sh::IGNORED_PROPERTIES)
}

/// Drop `sh:closed` from node shapes
pub fn remove_closed_properties(graph: &mut Graph) -> usize {
    remove_from_node_shapes(graph, sh::CLOSED)
}
