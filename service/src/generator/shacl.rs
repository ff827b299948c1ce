//! Native SHACL generator
//!
//! Turns a SHACL-flavour schema document into Turtle: one open
//! `sh:NodeShape` per class (`{class_uri}Shape`), one blank-node property
//! shape per slot. Annotations whose key is a resolvable compact name
//! (`sh:node`, `dash:viewer`, `sh:targetClass`, ...) become triples on the
//! shape they are attached to.

use std::collections::HashSet;
use std::path::Path;

use metadata_core::annotations::{AnnotationValue, Annotations};
use metadata_core::types::{ClassDefinition, SlotDefinition};
use metadata_core::{PrefixMap, SchemaDocument};
use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use tracing::{debug, warn};

use super::traits::{Generator, GeneratorError, GeneratorResult};
use crate::rdf::{STANDARD_PREFIXES, TurtleDocument, resolve_name, sh, term};

/// Suffix appended to a class URI to name its node shape
pub const SHAPE_SUFFIX: &str = "Shape";

/// Generator for SHACL shapes in Turtle
#[derive(Debug, Clone)]
pub struct ShaclGenerator {
    name: String,
    description: String,
    closed: bool,
}

impl Default for ShaclGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaclGenerator {
    /// Create a generator producing open shapes
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "shacl".to_string(),
            description: "Generate SHACL node and property shapes as Turtle".to_string(),
            closed: false,
        }
    }

    /// Build the shapes graph for a document
    ///
    /// # Errors
    ///
    /// Returns an error when a class URI or slot URI cannot be resolved to an IRI.
    pub fn build(&self, schema: &SchemaDocument) -> GeneratorResult<TurtleDocument> {
        let prefixes: PrefixMap = schema
            .prefixes
            .iter()
            .map(|(p, ns)| (p.as_str(), ns.as_str()))
            .collect();
        let mut shapes = ShapesBuilder {
            graph: Graph::new(),
            prefixes: &prefixes,
            schema,
        };

        for (name, class) in &schema.classes {
            let Some(class_uri) = &class.class_uri else {
                debug!(class = %name, "class has no class_uri, no shape generated");
                continue;
            };
            shapes.add_node_shape(name, class_uri, class, self.closed)?;
        }

        let mut document_prefixes: Vec<(String, String)> = schema
            .prefixes
            .iter()
            .map(|(p, ns)| (p.clone(), ns.clone()))
            .collect();
        for (prefix, namespace) in STANDARD_PREFIXES {
            if !schema.prefixes.contains_key(prefix) {
                document_prefixes.push((prefix.to_string(), namespace.to_string()));
            }
        }

        Ok(TurtleDocument {
            graph: shapes.graph,
            prefixes: document_prefixes,
        })
    }
}

impl Generator for ShaclGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn generate(&self, schema: &SchemaDocument) -> GeneratorResult<String> {
        let document = self.build(schema)?;
        document
            .to_turtle(Path::new(&schema.id))
            .map_err(|e| GeneratorError::Generation(e.to_string()))
    }

    fn get_file_extension(&self) -> &str {
        "ttl"
    }
}

struct ShapesBuilder<'a> {
    graph: Graph,
    prefixes: &'a PrefixMap,
    schema: &'a SchemaDocument,
}

impl ShapesBuilder<'_> {
    fn add(&mut self, subject: impl Into<NamedOrBlankNode>, predicate: impl Into<NamedNode>, object: impl Into<Term>) {
        self.graph.insert(&Triple::new(subject, predicate, object));
    }

    fn iri(&self, value: &str, what: &str) -> GeneratorResult<NamedNode> {
        resolve_name(value, self.prefixes).ok_or_else(|| {
            GeneratorError::Generation(format!("cannot resolve {what} '{value}' to an IRI"))
        })
    }

    fn add_node_shape(
        &mut self,
        name: &str,
        class_uri: &str,
        class: &ClassDefinition,
        closed: bool,
    ) -> GeneratorResult<()> {
        let target = self.iri(class_uri, "class URI")?;
        let shape = NamedNode::new(format!("{}{SHAPE_SUFFIX}", target.as_str()))
            .map_err(|e| GeneratorError::Generation(format!("invalid shape IRI for {name}: {e}")))?;

        self.add(shape.clone(), rdf::TYPE, term(sh::NODE_SHAPE));
        self.add(shape.clone(), sh::CLOSED, Literal::from(closed));
        let ignored = self.add_list(vec![term(rdf::TYPE)]);
        self.add(shape.clone(), sh::IGNORED_PROPERTIES, ignored);
        if let Some(description) = &class.description {
            self.add(shape.clone(), sh::DESCRIPTION, Literal::new_simple_literal(description));
        }

        let has_target = self.add_annotations(&shape.clone().into(), class.annotations.as_ref());
        if !has_target {
            self.add(shape.clone(), sh::TARGET_CLASS, target);
        }

        let schema = self.schema;
        for (order, slot_name) in self.induced_slots(name).into_iter().enumerate() {
            let Some(slot) = schema.slots.get(&slot_name) else {
                warn!(class = %name, slot = %slot_name, "slot is not defined, skipped");
                continue;
            };
            let property = self.add_property_shape(&slot_name, slot, order, class_uri)?;
            self.add(shape.clone(), sh::PROPERTY, property);
        }
        Ok(())
    }

    /// Slots of a class and its ancestors, ancestors first
    fn induced_slots(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name);
        while let Some(class_name) = current {
            if !seen.insert(class_name) {
                break;
            }
            let Some(class) = self.schema.classes.get(class_name) else {
                break;
            };
            chain.push(class);
            current = class.is_a.as_deref();
        }

        let mut slots: Vec<String> = Vec::new();
        for class in chain.into_iter().rev() {
            for slot in &class.slots {
                if !slots.contains(slot) {
                    slots.push(slot.clone());
                }
            }
        }
        slots
    }

    fn add_property_shape(
        &mut self,
        slot_name: &str,
        slot: &SlotDefinition,
        order: usize,
        class_uri: &str,
    ) -> GeneratorResult<BlankNode> {
        let node = BlankNode::default();
        let path = match &slot.slot_uri {
            Some(uri) => self.iri(uri, "slot URI")?,
            None => {
                let prefix = class_uri.split_once(':').map_or("", |(p, _)| p);
                self.iri(&format!("{prefix}:{slot_name}"), "slot name")?
            }
        };

        self.add(node.clone(), sh::PATH, path);
        self.add(
            node.clone(),
            sh::NAME,
            Literal::new_simple_literal(slot.title.as_deref().unwrap_or(slot_name)),
        );
        if let Some(description) = &slot.description {
            self.add(node.clone(), sh::DESCRIPTION, Literal::new_simple_literal(description));
        }
        self.add(node.clone(), sh::ORDER, Literal::from(i64::try_from(order).unwrap_or(i64::MAX)));
        if slot.required {
            self.add(node.clone(), sh::MIN_COUNT, Literal::from(1_i64));
        }
        if !slot.multivalued {
            self.add(node.clone(), sh::MAX_COUNT, Literal::from(1_i64));
        }

        let ranges = slot.ranges();
        match ranges.as_slice() {
            [] => {}
            [range] => self.add_range(&node.clone().into(), range)?,
            members => {
                let mut alternatives = Vec::new();
                for range in members {
                    let alternative = BlankNode::default();
                    self.add_range(&alternative.clone().into(), range)?;
                    alternatives.push(Term::from(alternative));
                }
                let list = self.add_list(alternatives);
                self.add(node.clone(), sh::OR, list);
            }
        }

        if let Some(pattern) = &slot.pattern {
            self.add(node.clone(), sh::PATTERN, Literal::new_simple_literal(pattern));
        }
        if let Some(default) = &slot.ifabsent {
            self.add(node.clone(), sh::DEFAULT_VALUE, Literal::new_simple_literal(default));
        }
        self.add_annotations(&node.clone().into(), slot.annotations.as_ref());
        Ok(node)
    }

    fn add_range(&mut self, subject: &NamedOrBlankNode, range: &str) -> GeneratorResult<()> {
        let schema = self.schema;
        if let Some(class) = schema.classes.get(range) {
            if let Some(uri) = &class.class_uri {
                let class_iri = self.iri(uri, "range class URI")?;
                self.add(subject.clone(), sh::CLASS, class_iri);
            }
            self.add(subject.clone(), sh::NODE_KIND, term(sh::BLANK_NODE_OR_IRI));
            return Ok(());
        }
        if let Some(definition) = schema.enums.get(range) {
            let values: Vec<Term> = definition
                .permissible_values
                .keys()
                .map(|v| Literal::new_simple_literal(v).into())
                .collect();
            let list = self.add_list(values);
            self.add(subject.clone(), sh::IN, list);
            return Ok(());
        }
        match self.datatype(range) {
            Some(datatype) => {
                self.add(subject.clone(), sh::DATATYPE, datatype);
                self.add(subject.clone(), sh::NODE_KIND, term(sh::LITERAL));
            }
            None => warn!(range = %range, "range has no known datatype, no constraint generated"),
        }
        Ok(())
    }

    fn datatype(&self, range: &str) -> Option<NamedNode> {
        if let Some(definition) = self.schema.types.get(range) {
            return definition
                .uri
                .as_deref()
                .and_then(|uri| resolve_name(uri, self.prefixes));
        }
        let builtin = match range {
            "string" | "ncname" => xsd::STRING,
            "integer" => xsd::INTEGER,
            "boolean" => xsd::BOOLEAN,
            "float" => xsd::FLOAT,
            "double" => xsd::DOUBLE,
            "decimal" => xsd::DECIMAL,
            "time" => xsd::TIME,
            "date" => xsd::DATE,
            "datetime" => xsd::DATE_TIME,
            "uri" | "uriorcurie" => xsd::ANY_URI,
            _ => return None,
        };
        Some(builtin.into_owned())
    }

    /// Turn annotations with compact-name keys into triples; returns whether
    /// a `sh:targetClass` was among them
    fn add_annotations(&mut self, subject: &NamedOrBlankNode, annotations: Option<&Annotations>) -> bool {
        let mut has_target = false;
        for (key, value) in annotations.into_iter().flatten() {
            let Some(predicate) = resolve_name(key, self.prefixes) else {
                continue;
            };
            let object = self.annotation_object(value);
            has_target |= predicate.as_ref() == sh::TARGET_CLASS;
            self.add(subject.clone(), predicate, object);
        }
        has_target
    }

    fn annotation_object(&self, value: &AnnotationValue) -> Term {
        match value {
            AnnotationValue::Bool(b) => Literal::from(*b).into(),
            AnnotationValue::String(s) => resolve_name(s, self.prefixes).map_or_else(
                || Literal::new_simple_literal(s).into(),
                Term::from,
            ),
            other => Literal::new_simple_literal(other.to_string()).into(),
        }
    }

    /// Write an RDF collection and return its head
    fn add_list(&mut self, items: Vec<Term>) -> Term {
        let mut head = term(rdf::NIL);
        for item in items.into_iter().rev() {
            let cell = BlankNode::default();
            self.add(cell.clone(), rdf::FIRST, item);
            self.add(cell.clone(), rdf::REST, head);
            head = cell.into();
        }
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{as_subject, is_node};
    use metadata_core::annotations::{Annotatable, keys};
    use oxigraph::model::TermRef;

    fn schema() -> SchemaDocument {
        let mut doc = SchemaDocument {
            id: "http://example.com/TestClass".to_string(),
            ..SchemaDocument::default()
        };
        doc.prefixes.insert("hri".to_string(), "http://example.com/".to_string());
        doc.prefixes.insert("dcat".to_string(), "http://www.w3.org/ns/dcat#".to_string());
        doc.prefixes.insert("dcterms".to_string(), "http://purl.org/dc/terms/".to_string());

        let mut main = ClassDefinition {
            class_uri: Some("hri:TestClass".to_string()),
            slots: vec!["title".to_string(), "publisher".to_string(), "landing_page".to_string()],
            ..ClassDefinition::default()
        };
        main.set_annotation(keys::TARGET_CLASS, "dcat:TestClass");
        doc.classes.insert("HRITestclass".to_string(), main);
        doc.classes
            .insert("HRIAgent".to_string(), ClassDefinition::stub("hri:Agent"));

        doc.slots.insert(
            "title".to_string(),
            SlotDefinition {
                title: Some("title".to_string()),
                slot_uri: Some("dcterms:title".to_string()),
                range: Some("string".to_string()),
                required: true,
                multivalued: true,
                ..SlotDefinition::default()
            },
        );
        let mut publisher = SlotDefinition {
            slot_uri: Some("dcterms:publisher".to_string()),
            range: Some("HRIAgent".to_string()),
            ..SlotDefinition::default()
        };
        publisher.set_annotation(keys::NODE, "hri:AgentShape");
        doc.slots.insert("publisher".to_string(), publisher);
        doc.slots.insert(
            "landing_page".to_string(),
            SlotDefinition {
                slot_uri: Some("dcat:landingPage".to_string()),
                range: Some("uri".to_string()),
                ..SlotDefinition::default()
            },
        );
        doc
    }

    fn property_for(graph: &Graph, path: &str) -> NamedOrBlankNode {
        graph
            .iter()
            .find(|t| t.predicate == sh::PATH && matches!(t.object, TermRef::NamedNode(n) if n.as_str() == path))
            .map(|t| t.subject.into_owned())
            .unwrap()
    }

    fn objects(graph: &Graph, subject: &NamedOrBlankNode, predicate: oxigraph::model::NamedNodeRef<'_>) -> Vec<Term> {
        graph
            .iter()
            .filter(|t| t.subject == subject.as_ref() && t.predicate == predicate)
            .map(|t| t.object.into_owned())
            .collect()
    }

    #[test]
    fn test_node_shapes_per_class() {
        let doc = ShaclGenerator::new().build(&schema()).unwrap();
        let shapes: Vec<NamedOrBlankNode> = doc
            .graph
            .iter()
            .filter(|t| t.predicate == rdf::TYPE && is_node(t.object, sh::NODE_SHAPE))
            .map(|t| t.subject.into_owned())
            .collect();
        assert_eq!(shapes.len(), 2);

        let main = NamedOrBlankNode::from(NamedNode::new_unchecked("http://example.com/TestClassShape"));
        assert_eq!(
            objects(&doc.graph, &main, sh::TARGET_CLASS),
            vec![Term::from(NamedNode::new_unchecked("http://www.w3.org/ns/dcat#TestClass"))]
        );
        assert_eq!(objects(&doc.graph, &main, sh::CLOSED), vec![Term::from(Literal::from(false))]);
        assert_eq!(objects(&doc.graph, &main, sh::PROPERTY).len(), 3);

        let agent = NamedOrBlankNode::from(NamedNode::new_unchecked("http://example.com/AgentShape"));
        assert_eq!(
            objects(&doc.graph, &agent, sh::TARGET_CLASS),
            vec![Term::from(NamedNode::new_unchecked("http://example.com/Agent"))]
        );
        assert!(objects(&doc.graph, &agent, sh::PROPERTY).is_empty());
    }

    #[test]
    fn test_property_constraints() {
        let doc = ShaclGenerator::new().build(&schema()).unwrap();
        let graph = &doc.graph;

        let title = property_for(graph, "http://purl.org/dc/terms/title");
        assert_eq!(objects(graph, &title, sh::MIN_COUNT), vec![Term::from(Literal::from(1_i64))]);
        assert!(objects(graph, &title, sh::MAX_COUNT).is_empty());
        assert_eq!(objects(graph, &title, sh::DATATYPE), vec![term(xsd::STRING)]);
        assert_eq!(objects(graph, &title, sh::NODE_KIND), vec![term(sh::LITERAL)]);

        let publisher = property_for(graph, "http://purl.org/dc/terms/publisher");
        assert_eq!(objects(graph, &publisher, sh::MAX_COUNT), vec![Term::from(Literal::from(1_i64))]);
        assert_eq!(
            objects(graph, &publisher, sh::NODE),
            vec![Term::from(NamedNode::new_unchecked("http://example.com/AgentShape"))]
        );
        assert_eq!(objects(graph, &publisher, sh::NODE_KIND), vec![term(sh::BLANK_NODE_OR_IRI)]);

        let landing = property_for(graph, "http://www.w3.org/ns/dcat#landingPage");
        assert_eq!(objects(graph, &landing, sh::DATATYPE), vec![term(xsd::ANY_URI)]);
    }

    #[test]
    fn test_ignored_properties_is_a_list() {
        let doc = ShaclGenerator::new().build(&schema()).unwrap();
        let main = NamedOrBlankNode::from(NamedNode::new_unchecked("http://example.com/TestClassShape"));
        let head = objects(&doc.graph, &main, sh::IGNORED_PROPERTIES).remove(0);
        let cell = as_subject(head.as_ref()).unwrap();
        assert_eq!(objects(&doc.graph, &cell, rdf::FIRST), vec![term(rdf::TYPE)]);
        assert_eq!(objects(&doc.graph, &cell, rdf::REST), vec![term(rdf::NIL)]);
    }

    #[test]
    fn test_generate_turtle_uses_prefixes() {
        let turtle = ShaclGenerator::new().generate(&schema()).unwrap();
        assert!(turtle.contains("@prefix sh: <http://www.w3.org/ns/shacl#>"));
        assert!(turtle.contains("hri:TestClassShape"));
    }

    #[test]
    fn test_unresolvable_class_uri_is_an_error() {
        let mut doc = schema();
        doc.classes
            .insert("XThing".to_string(), ClassDefinition::stub("x:Thing"));
        assert!(ShaclGenerator::new().build(&doc).is_err());
    }
}
