//! Schema model builder
//!
//! Builds one [`SchemaDocument`] per class row. [`SchemaBuilder::build_base`]
//! sets identity, prefixes and the base types import; the two backend passes
//! then populate classes and slots for SHACL or typed-class generation.

use std::path::PathBuf;

use tracing::debug;

use crate::annotations::{Annotatable, AnnotationValue, keys};
use crate::cardinality::Cardinality;
use crate::error::{MetadataError, Result};
use crate::prefixes::PrefixMap;
use crate::rows::{ClassRow, Column, PropertyRow};
use crate::types::{
    AnonymousSlotExpression, BASE_TYPES_IMPORT, ClassDefinition, RDF_MODEL_CLASS, RDF_MODEL_IMPORT,
    SchemaDocument, SlotDefinition, TYPED_CLASS_TYPES_IMPORT, TypeDefinition,
};
use crate::utils::{PrefixedName, class_identifier};

/// Suffix marking an IRI-only range
pub const IRI_RANGE_SUFFIX: &str = "(IRI)";

/// The plain literal range
pub const LITERAL_RANGE: &str = "rdfs:Literal";

/// Which backend a document is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavour {
    /// Identity and imports only
    Base,
    /// SHACL shape generation
    Shacl,
    /// Typed-class generation
    TypedClasses,
}

/// Builds schema documents against a prefix map
#[derive(Debug, Clone, Copy)]
pub struct SchemaBuilder<'a> {
    prefixes: &'a PrefixMap,
}

impl<'a> SchemaBuilder<'a> {
    /// Create a builder over a loaded prefix map
    #[must_use]
    pub fn new(prefixes: &'a PrefixMap) -> Self {
        Self { prefixes }
    }

    /// Build for the requested flavour
    ///
    /// # Errors
    ///
    /// Propagates errors from the flavour's build operation.
    pub fn build(&self, flavour: Flavour, class: &ClassRow, properties: &[PropertyRow]) -> Result<SchemaDocument> {
        match flavour {
            Flavour::Base => self.build_base(class),
            Flavour::Shacl => self.build_for_shacl(class, properties),
            Flavour::TypedClasses => self.build_for_typed_classes(class, properties),
        }
    }

    /// Identity, prefixes and base types import
    ///
    /// # Errors
    ///
    /// Fails when `class_uri` is malformed or its prefix is not declared.
    pub fn build_base(&self, class: &ClassRow) -> Result<SchemaDocument> {
        let name = PrefixedName::parse(&class.class_uri)?;
        let namespace = self.prefixes.namespace(name.prefix, &class.class_uri)?;
        let title = format!("{}-{}", name.prefix, name.local);

        Ok(SchemaDocument {
            id: format!("{namespace}{}", name.local),
            description: Some(class.description.clone().unwrap_or_else(|| title.clone())),
            title: Some(title),
            prefixes: self.prefixes.to_index_map(),
            imports: vec![BASE_TYPES_IMPORT.to_string()],
            ..SchemaDocument::default()
        })
    }

    /// Fail unless `value` is a prefixed name with a declared prefix
    fn require_declared(&self, value: &str) -> Result<()> {
        let name = PrefixedName::parse(value)?;
        self.prefixes.namespace(name.prefix, value).map(|_| ())
    }

    /// SHACL-oriented document
    ///
    /// # Errors
    ///
    /// Fails on identity errors, a missing target class, malformed class
    /// references, or a referenced prefix the prefix map does not declare.
    pub fn build_for_shacl(&self, class: &ClassRow, properties: &[PropertyRow]) -> Result<SchemaDocument> {
        let mut doc = self.build_base(class)?;
        let target = class.target_class_uri.as_deref().ok_or_else(|| {
            MetadataError::missing_value("classes", class.row, Column::TargetClass.canonical())
        })?;

        doc.types.insert(
            "nonNegativeInteger".to_string(),
            TypeDefinition {
                uri: Some("xsd:nonNegativeInteger".to_string()),
                base: Some("int".to_string()),
                ..TypeDefinition::default()
            },
        );
        doc.types.insert(
            "duration".to_string(),
            TypeDefinition {
                uri: Some("xsd:duration".to_string()),
                base: Some("str".to_string()),
                ..TypeDefinition::default()
            },
        );

        let mut main = ClassDefinition {
            class_uri: Some(class.class_uri.clone()),
            description: class.description.clone(),
            ..ClassDefinition::default()
        };
        main.set_annotation(keys::TARGET_CLASS, target);

        let mut referenced = Vec::new();
        for property in properties {
            let name = property.slot_name();
            let flags = Cardinality::from_vocabulary(property.cardinality.as_deref());
            let mut slot = SlotDefinition {
                title: Some(property.label.clone()),
                description: property.definition.clone(),
                slot_uri: property.property_uri.clone(),
                required: flags.required,
                multivalued: flags.multivalued,
                pattern: property.pattern.clone(),
                ifabsent: property.default_value.clone(),
                ..SlotDefinition::default()
            };

            if let Some(viewer) = &property.viewer {
                slot.set_annotation(keys::VIEWER, viewer);
                if let Some(editor) = &property.editor {
                    slot.set_annotation(keys::EDITOR, editor);
                }
            }

            if let Some(range) = &property.range {
                if let Some(target) = iri_range_target(range) {
                    self.require_declared(target)?;
                }
                match shacl_range(range)? {
                    ShaclRange::Type(type_name) => slot.range = Some(type_name),
                    ShaclRange::Class { identifier, uri } => {
                        self.require_declared(&uri)?;
                        slot.set_annotation(keys::NODE, format!("{uri}Shape"));
                        slot.range = Some(identifier.clone());
                        referenced.push((identifier, uri));
                    }
                }
            }

            main.slots.push(name.clone());
            doc.slots.insert(name, slot);
        }

        let primary = class_identifier(&class.class_uri)?;
        doc.classes.insert(primary, main);
        for import in &class.import_classes {
            self.require_declared(import)?;
            insert_stub(&mut doc, class_identifier(import)?, import);
        }
        for (identifier, uri) in referenced {
            insert_stub(&mut doc, identifier, &uri);
        }

        debug!(id = %doc.id, slots = doc.slots.len(), "built SHACL schema document");
        Ok(doc)
    }

    /// Typed-class-oriented document
    ///
    /// # Errors
    ///
    /// Fails on identity errors, malformed parent / import names, or a
    /// parent / import prefix the prefix map does not declare.
    pub fn build_for_typed_classes(&self, class: &ClassRow, properties: &[PropertyRow]) -> Result<SchemaDocument> {
        let mut doc = self.build_base(class)?;
        let name = PrefixedName::parse(&class.class_uri)?;

        if class.add_rdf_model {
            doc.add_import(RDF_MODEL_IMPORT);
        }

        let mut main = ClassDefinition {
            class_uri: Some(class.class_uri.clone()),
            description: class.description.clone(),
            ..ClassDefinition::default()
        };
        if let Some(ontology) = &class.annotations_ontology {
            main.set_annotation(keys::ONTOLOGY, ontology);
        }
        if let Some(iri) = &class.annotations_iri {
            main.set_annotation(keys::IRI, iri);
        }
        main.set_annotation(keys::NAMESPACE, name.prefix.to_uppercase());
        main.set_annotation(keys::PREFIX, name.prefix);

        let parent = class
            .inherits_from
            .as_deref()
            .map(|p| {
                self.require_declared(p)?;
                class_identifier(p).map(|id| (id, p))
            })
            .transpose()?;
        for import in &class.import_classes {
            self.require_declared(import)?;
        }
        main.is_a = match (&parent, class.add_rdf_model) {
            (Some((identifier, _)), _) => Some(identifier.clone()),
            (None, true) => Some(RDF_MODEL_CLASS.to_string()),
            (None, false) => None,
        };

        for property in properties {
            let slot_name = property.slot_name();
            let flags = Cardinality::from_vocabulary(property.cardinality.as_deref());
            let mut slot = SlotDefinition {
                description: property.definition.clone(),
                slot_uri: property.property_uri.clone(),
                required: flags.required,
                multivalued: flags.multivalued,
                ..SlotDefinition::default()
            };
            match property.sempyro_range.as_slice() {
                [] => {}
                [single] => slot.range = Some(single.clone()),
                members => {
                    slot.any_of = Some(
                        members
                            .iter()
                            .map(|range| AnonymousSlotExpression { range: range.clone() })
                            .collect(),
                    );
                }
            }
            if let Some(term) = &property.rdf_term {
                slot.set_annotation(keys::RDF_TERM, term);
            }
            if let Some(kind) = &property.rdf_type {
                slot.set_annotation(keys::RDF_TYPE, kind);
            }

            main.slots.push(slot_name.clone());
            doc.slots.insert(slot_name, slot);
        }

        doc.classes.insert(name.identifier(), main);
        for import in &class.import_classes {
            insert_stub(&mut doc, class_identifier(import)?, import);
        }
        if let Some((identifier, uri)) = parent {
            insert_stub(&mut doc, identifier, uri);
        }

        let needs_types = doc
            .slots
            .values()
            .flat_map(SlotDefinition::ranges)
            .any(|range| !doc.classes.contains_key(range));
        if needs_types {
            doc.add_import(TYPED_CLASS_TYPES_IMPORT);
        }

        debug!(id = %doc.id, slots = doc.slots.len(), "built typed-class schema document");
        Ok(doc)
    }
}

/// Output path of a class's document relative to the LinkML root
///
/// # Errors
///
/// Fails when `class_uri` is not a prefixed name.
pub fn document_path(class_uri: &str) -> Result<PathBuf> {
    let name = PrefixedName::parse(class_uri)?;
    Ok(PathBuf::from(name.prefix).join(format!("{}.yaml", document_key(&name))))
}

/// `{prefix}-{Class}`, the key used for file names and the imports configuration
#[must_use]
pub fn document_key(name: &PrefixedName<'_>) -> String {
    format!("{}-{}", name.prefix, name.local)
}

/// A SHACL-style range translated for a LinkML slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaclRange {
    /// A LinkML type name
    Type(String),
    /// A class reference with its generated identifier
    Class {
        /// Generated class identifier
        identifier: String,
        /// Prefixed class URI
        uri: String,
    },
}

/// Translate a SHACL-style range to a LinkML range
///
/// IRI-only ranges become `uri`, `rdfs:Literal` becomes `string`, XSD
/// datatypes map to the matching LinkML type, other prefixed names are
/// class references, and anything else is taken as a type name verbatim.
///
/// # Errors
///
/// Fails when a class reference is not a well-formed prefixed name.
pub fn shacl_range(range: &str) -> Result<ShaclRange> {
    let range = range.trim();
    if range.ends_with(IRI_RANGE_SUFFIX) {
        return Ok(ShaclRange::Type("uri".to_string()));
    }
    if range == LITERAL_RANGE {
        return Ok(ShaclRange::Type("string".to_string()));
    }
    if let Some(datatype) = range.strip_prefix("xsd:") {
        return Ok(ShaclRange::Type(xsd_type(datatype).to_string()));
    }
    if range.contains(':') {
        let name = PrefixedName::parse(range)?;
        return Ok(ShaclRange::Class {
            identifier: name.identifier(),
            uri: name.to_string(),
        });
    }
    Ok(ShaclRange::Type(range.to_string()))
}

/// The prefixed name in front of an IRI-only range, if there is one
fn iri_range_target(range: &str) -> Option<&str> {
    let target = range.trim().strip_suffix(IRI_RANGE_SUFFIX)?.trim();
    target.contains(':').then_some(target)
}

fn xsd_type(datatype: &str) -> &str {
    match datatype {
        "string" | "normalizedString" | "token" => "string",
        "anyURI" => "uri",
        "dateTime" | "dateTimeStamp" => "datetime",
        "date" => "date",
        "time" => "time",
        "boolean" => "boolean",
        "integer" | "int" | "long" => "integer",
        "decimal" => "decimal",
        "float" => "float",
        "double" => "double",
        other => other,
    }
}

fn insert_stub(doc: &mut SchemaDocument, identifier: String, uri: &str) {
    doc.classes
        .entry(identifier)
        .or_insert_with(|| ClassDefinition::stub(uri.trim()));
}

/// Annotation value as a string, if it is one
#[must_use]
pub fn annotation_str<'d>(value: Option<&'d AnnotationValue>) -> Option<&'d str> {
    value.and_then(AnnotationValue::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefixes() -> PrefixMap {
        [
            ("hri", "http://example.com/"),
            ("dcat", "http://www.w3.org/ns/dcat#"),
            ("dcterms", "http://purl.org/dc/terms/"),
            ("foaf", "http://xmlns.com/foaf/0.1/"),
        ]
        .into_iter()
        .collect()
    }

    fn class_row() -> ClassRow {
        ClassRow {
            sheet_name: Some("TestClass".to_string()),
            class_uri: "hri:TestClass".to_string(),
            target_class_uri: Some("dcat:TestClass".to_string()),
            description: Some("A test class".to_string()),
            annotations_ontology: Some("http://example.com/ontology".to_string()),
            annotations_iri: Some("http://example.com/TestClass".to_string()),
            ..ClassRow::default()
        }
    }

    fn property(label: &str, cardinality: &str, range: &str) -> PropertyRow {
        PropertyRow {
            label: label.to_string(),
            definition: Some(format!("The {label}")),
            property_uri: Some(format!("dcterms:{label}")),
            cardinality: Some(cardinality.to_string()),
            range: Some(range.to_string()),
            sempyro_range: vec!["LiteralField".to_string(), "str".to_string()],
            rdf_term: Some(format!("DCTERMS.{label}")),
            rdf_type: Some("rdfs_literal".to_string()),
            ..PropertyRow::default()
        }
    }

    #[test]
    fn test_build_base_identity() {
        let prefixes = prefixes();
        let doc = SchemaBuilder::new(&prefixes).build_base(&class_row()).unwrap();
        assert_eq!(doc.id, "http://example.com/TestClass");
        assert_eq!(doc.title.as_deref(), Some("hri-TestClass"));
        assert_eq!(doc.description.as_deref(), Some("A test class"));
        assert_eq!(doc.imports, vec![BASE_TYPES_IMPORT]);
        assert_eq!(doc.prefixes.len(), 4);
    }

    #[test]
    fn test_build_base_description_falls_back_to_title() {
        let prefixes = prefixes();
        let mut row = class_row();
        row.description = None;
        let doc = SchemaBuilder::new(&prefixes).build_base(&row).unwrap();
        assert_eq!(doc.description.as_deref(), Some("hri-TestClass"));
    }

    #[test]
    fn test_unknown_prefix_is_fatal() {
        let prefixes = prefixes();
        let mut row = class_row();
        row.class_uri = "eucaim:Dataset".to_string();
        let err = SchemaBuilder::new(&prefixes).build_base(&row).unwrap_err();
        assert!(matches!(err, MetadataError::UnknownPrefix { .. }));
    }

    #[test]
    fn test_build_for_shacl() {
        let prefixes = prefixes();
        let mut row = class_row();
        row.import_classes = vec!["hri:Agent".to_string()];
        let mut kind = property("kind", "0..1", "hri:Kind");
        kind.viewer = Some("dash:DetailsViewer".to_string());
        kind.editor = Some("dash:DetailsEditor".to_string());
        let properties = vec![
            property("title", "1..n", "rdfs:Literal"),
            property("modified", "1", "xsd:dateTime"),
            property("landing page", "0..n", "foaf:Document (IRI)"),
            kind,
        ];

        let doc = SchemaBuilder::new(&prefixes).build_for_shacl(&row, &properties).unwrap();

        assert!(doc.types.contains_key("nonNegativeInteger"));
        assert!(doc.types.contains_key("duration"));
        let names: Vec<&String> = doc.classes.keys().collect();
        assert_eq!(names, vec!["HRITestclass", "HRIAgent", "HRIKind"]);

        let main = &doc.classes["HRITestclass"];
        assert_eq!(
            annotation_str(main.get_annotation(keys::TARGET_CLASS)),
            Some("dcat:TestClass")
        );
        assert_eq!(main.slots, vec!["title", "modified", "landing_page", "kind"]);

        let title = &doc.slots["title"];
        assert!(title.required && title.multivalued);
        assert_eq!(title.range.as_deref(), Some("string"));
        assert_eq!(title.title.as_deref(), Some("title"));
        assert_eq!(doc.slots["modified"].range.as_deref(), Some("datetime"));
        assert_eq!(doc.slots["landing_page"].range.as_deref(), Some("uri"));

        let kind = &doc.slots["kind"];
        assert_eq!(kind.range.as_deref(), Some("HRIKind"));
        assert_eq!(annotation_str(kind.get_annotation(keys::NODE)), Some("hri:KindShape"));
        assert_eq!(
            annotation_str(kind.get_annotation(keys::EDITOR)),
            Some("dash:DetailsEditor")
        );
        assert!(doc.classes["HRIKind"].is_stub());
    }

    fn assert_unknown_prefix(result: Result<SchemaDocument>, expected: &str) {
        match result {
            Err(MetadataError::UnknownPrefix { prefix, .. }) => assert_eq!(prefix, expected),
            other => panic!("expected unknown prefix '{expected}', got {other:?}"),
        }
    }

    #[test]
    fn test_build_for_shacl_rejects_undeclared_references() {
        let prefixes = prefixes();
        let builder = SchemaBuilder::new(&prefixes);

        let range = vec![property("kind", "0..1", "unk:Thing")];
        assert_unknown_prefix(builder.build_for_shacl(&class_row(), &range), "unk");

        let iri = vec![property("page", "0..1", "unk:Page (IRI)")];
        assert_unknown_prefix(builder.build_for_shacl(&class_row(), &iri), "unk");

        let mut row = class_row();
        row.import_classes = vec!["zzz:Other".to_string()];
        assert_unknown_prefix(builder.build_for_shacl(&row, &[]), "zzz");
    }

    #[test]
    fn test_build_for_typed_classes_rejects_undeclared_references() {
        let prefixes = prefixes();
        let builder = SchemaBuilder::new(&prefixes);

        let mut row = class_row();
        row.inherits_from = Some("unk:Parent".to_string());
        assert_unknown_prefix(builder.build_for_typed_classes(&row, &[]), "unk");

        let mut row = class_row();
        row.import_classes = vec!["zzz:Other".to_string()];
        assert_unknown_prefix(builder.build_for_typed_classes(&row, &[]), "zzz");
    }

    #[test]
    fn test_build_for_shacl_requires_target() {
        let prefixes = prefixes();
        let mut row = class_row();
        row.target_class_uri = None;
        assert!(SchemaBuilder::new(&prefixes).build_for_shacl(&row, &[]).is_err());
    }

    #[test]
    fn test_build_for_typed_classes() {
        let prefixes = prefixes();
        let mut row = class_row();
        row.add_rdf_model = true;
        row.import_classes = vec!["hri:Other".to_string()];
        let mut identifier = property("identifier", "1", "rdfs:Literal");
        identifier.sempyro_range = vec!["HRIOther".to_string()];
        let properties = vec![property("title", "1..n", "rdfs:Literal"), identifier];

        let doc = SchemaBuilder::new(&prefixes)
            .build_for_typed_classes(&row, &properties)
            .unwrap();

        assert_eq!(
            doc.imports,
            vec![BASE_TYPES_IMPORT, RDF_MODEL_IMPORT, TYPED_CLASS_TYPES_IMPORT]
        );
        let main = &doc.classes["HRITestclass"];
        assert_eq!(main.is_a.as_deref(), Some(RDF_MODEL_CLASS));
        assert_eq!(annotation_str(main.get_annotation(keys::NAMESPACE)), Some("HRI"));
        assert_eq!(annotation_str(main.get_annotation(keys::PREFIX)), Some("hri"));
        assert_eq!(
            annotation_str(main.get_annotation(keys::ONTOLOGY)),
            Some("http://example.com/ontology")
        );

        let title = &doc.slots["title"];
        assert!(title.range.is_none());
        assert_eq!(title.ranges(), vec!["LiteralField", "str"]);
        assert_eq!(doc.slots["identifier"].range.as_deref(), Some("HRIOther"));
        assert!(doc.classes["HRIOther"].is_stub());
    }

    #[test]
    fn test_parent_overrides_rdf_model_and_gets_a_stub() {
        let prefixes = prefixes();
        let mut row = class_row();
        row.add_rdf_model = true;
        row.inherits_from = Some("dcat:Dataset".to_string());
        let doc = SchemaBuilder::new(&prefixes).build_for_typed_classes(&row, &[]).unwrap();
        assert_eq!(doc.classes["HRITestclass"].is_a.as_deref(), Some("DCATDataset"));
        assert_eq!(
            doc.classes["DCATDataset"].class_uri.as_deref(),
            Some("dcat:Dataset")
        );
        assert!(doc.imports.contains(&RDF_MODEL_IMPORT.to_string()));
        assert!(!doc.imports.contains(&TYPED_CLASS_TYPES_IMPORT.to_string()));
    }

    #[test]
    fn test_document_path() {
        assert_eq!(
            document_path("hri:Dataset").unwrap(),
            PathBuf::from("hri").join("hri-Dataset.yaml")
        );
    }

    #[test]
    fn test_shacl_range_translation() {
        assert_eq!(shacl_range("xsd:nonNegativeInteger").unwrap(), ShaclRange::Type("nonNegativeInteger".into()));
        assert_eq!(shacl_range("xsd:duration").unwrap(), ShaclRange::Type("duration".into()));
        assert_eq!(shacl_range("string").unwrap(), ShaclRange::Type("string".into()));
        assert!(shacl_range("a:b:c").is_err());
    }
}
