//! Typed-class (SeMPyRO-style Pydantic) generator
//!
//! Renders a resolved schema document as a Python module of Pydantic models
//! carrying RDF term mappings. The caller supplies the import statements
//! the module needs; any class or enum those statements bind is taken as
//! provided and not rendered.

use std::collections::HashSet;
use std::fmt::Write;

use convert_case::{Case, Casing};
use metadata_core::annotations::{Annotatable, AnnotationValue, keys};
use metadata_core::types::{ClassDefinition, EnumDefinition, SlotDefinition};
use metadata_core::SchemaDocument;

use super::imports::{ImportSet, ImportStatement};
use super::traits::{Generator, GeneratorError, GeneratorResult, fmt_error};

/// Class annotation holding Python validator source for the class body
pub const VALIDATORS_ANNOTATION: &str = "validators";

/// Lines longer than this put `Field` arguments on their own line
const LINE_LENGTH: usize = 120;

const INDENT: &str = "    ";

/// Generator for SeMPyRO-style typed classes
#[derive(Debug, Clone)]
pub struct SempyroGenerator {
    name: String,
    description: String,
    imports: Vec<ImportStatement>,
}

impl Default for SempyroGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SempyroGenerator {
    /// Create a generator without configured imports
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "sempyro".to_string(),
            description: "Generate SeMPyRO Pydantic models with RDF term mappings".to_string(),
            imports: Vec::new(),
        }
    }

    /// Create a generator with the imports configured for one class
    #[must_use]
    pub fn with_imports(imports: &[ImportStatement]) -> Self {
        Self {
            imports: imports.to_vec(),
            ..Self::new()
        }
    }

    fn provided_names(&self) -> HashSet<String> {
        self.imports
            .iter()
            .flat_map(ImportStatement::bound_names)
            .collect()
    }

    /// Definition names in render order: enums, then classes after their
    /// parents and the classes their slots refer to
    fn render_order<'s>(
        schema: &'s SchemaDocument,
        provided: &HashSet<String>,
    ) -> Vec<&'s str> {
        fn visit<'s>(
            name: &'s str,
            schema: &'s SchemaDocument,
            provided: &HashSet<String>,
            seen: &mut HashSet<&'s str>,
            order: &mut Vec<&'s str>,
        ) {
            if provided.contains(name) || !seen.insert(name) {
                return;
            }
            let Some((key, class)) = schema.classes.get_key_value(name) else {
                return;
            };
            if let Some(parent) = &class.is_a {
                visit(parent, schema, provided, seen, order);
            }
            for slot in class.slots.iter().filter_map(|s| schema.slots.get(s)) {
                for range in slot.ranges() {
                    visit(range, schema, provided, seen, order);
                }
            }
            order.push(key.as_str());
        }

        let mut order: Vec<&str> = schema
            .enums
            .keys()
            .map(String::as_str)
            .filter(|name| !provided.contains(*name))
            .collect();
        let mut seen = HashSet::new();
        for name in schema.classes.keys() {
            visit(name, schema, provided, &mut seen, &mut order);
        }
        order
    }

    fn generate_enum(
        name: &str,
        definition: &EnumDefinition,
        imports: &mut ImportSet,
    ) -> GeneratorResult<String> {
        imports.add_from("enum", "Enum");
        let mut output = String::new();
        writeln!(&mut output, "class {name}(str, Enum):").map_err(fmt_error)?;
        if let Some(description) = &definition.description {
            Self::write_docstring(&mut output, description)?;
        }
        if definition.permissible_values.is_empty() {
            writeln!(&mut output, "{INDENT}pass").map_err(fmt_error)?;
        }
        for value in definition.permissible_values.keys() {
            writeln!(
                &mut output,
                "{INDENT}{} = {}",
                enum_member_name(value),
                python_string(value)
            )
            .map_err(fmt_error)?;
        }
        Ok(output)
    }

    fn generate_class(
        name: &str,
        class: &ClassDefinition,
        schema: &SchemaDocument,
        provided: &HashSet<String>,
        imports: &mut ImportSet,
    ) -> GeneratorResult<String> {
        let base = match &class.is_a {
            Some(parent) => parent.clone(),
            None => {
                if !provided.contains("BaseModel") {
                    imports.add_from("pydantic", "BaseModel");
                }
                "BaseModel".to_string()
            }
        };

        let mut output = String::new();
        writeln!(&mut output, "class {name}({base}):").map_err(fmt_error)?;
        if let Some(description) = &class.description {
            Self::write_docstring(&mut output, description)?;
        }

        writeln!(&mut output, "{INDENT}model_config = ConfigDict(").map_err(fmt_error)?;
        writeln!(&mut output, "{INDENT}{INDENT}arbitrary_types_allowed=True,").map_err(fmt_error)?;
        writeln!(&mut output, "{INDENT}{INDENT}use_enum_values=True,").map_err(fmt_error)?;
        let extra = schema_extra(class);
        if !extra.is_empty() {
            writeln!(&mut output, "{INDENT}{INDENT}json_schema_extra={{").map_err(fmt_error)?;
            for (key, value) in extra {
                writeln!(&mut output, "{INDENT}{INDENT}{INDENT}\"${key}\": {value},")
                    .map_err(fmt_error)?;
            }
            writeln!(&mut output, "{INDENT}{INDENT}}},").map_err(fmt_error)?;
        }
        writeln!(&mut output, "{INDENT})").map_err(fmt_error)?;

        for slot_name in &class.slots {
            let slot = schema.slots.get(slot_name).ok_or_else(|| {
                GeneratorError::Generation(format!(
                    "class {name} uses undefined slot '{slot_name}'"
                ))
            })?;
            output.push_str(&Self::generate_field(slot_name, slot, schema, imports));
        }

        if let Some(validators) = class.get_annotation(VALIDATORS_ANNOTATION) {
            for source in validator_sources(validators) {
                writeln!(&mut output).map_err(fmt_error)?;
                for line in source.trim_end().lines() {
                    if line.trim().is_empty() {
                        writeln!(&mut output).map_err(fmt_error)?;
                    } else {
                        writeln!(&mut output, "{INDENT}{line}").map_err(fmt_error)?;
                    }
                }
            }
        }

        Ok(output)
    }

    fn generate_field(
        name: &str,
        slot: &SlotDefinition,
        schema: &SchemaDocument,
        imports: &mut ImportSet,
    ) -> String {
        let mut members: Vec<String> = Vec::new();
        for range in slot.ranges() {
            let python = python_type(range, schema, imports);
            if !members.contains(&python) {
                members.push(python);
            }
        }
        let mut type_expr = match members.len() {
            0 => "str".to_string(),
            1 => members.remove(0),
            _ => {
                imports.add_from("typing", "Union");
                format!("Union[{}]", members.join(", "))
            }
        };
        if slot.multivalued {
            type_expr = format!("list[{type_expr}]");
        }

        let mut args = Vec::new();
        if !slot.required {
            imports.add_from("typing", "Optional");
            type_expr = format!("Optional[{type_expr}]");
            args.push("default=None".to_string());
        }
        if let Some(description) = &slot.description {
            args.push(format!("description=\"\"\"{}\"\"\"", escape_docstring(description)));
        }
        let mut extra = Vec::new();
        if let Some(term) = slot.get_annotation(keys::RDF_TERM) {
            extra.push(format!("\"rdf_term\": {term}"));
        }
        if let Some(kind) = slot.get_annotation(keys::RDF_TYPE) {
            extra.push(format!("\"rdf_type\": {}", python_string(&kind.to_string())));
        }
        if !extra.is_empty() {
            args.push(format!("json_schema_extra={{{}}}", extra.join(", ")));
        }

        let args = args.join(", ");
        let field_name = python_identifier(name);
        let single = format!("{INDENT}{field_name}: {type_expr} = Field({args})");
        if single.len() <= LINE_LENGTH {
            format!("{single}\n")
        } else {
            format!("{INDENT}{field_name}: {type_expr} = Field(\n{INDENT}{INDENT}{args}\n{INDENT})\n")
        }
    }

    fn write_docstring(output: &mut String, text: &str) -> GeneratorResult<()> {
        writeln!(output, "{INDENT}\"\"\"").map_err(fmt_error)?;
        for line in text.lines() {
            writeln!(output, "{INDENT}{}", escape_docstring(line)).map_err(fmt_error)?;
        }
        writeln!(output, "{INDENT}\"\"\"").map_err(fmt_error)?;
        writeln!(output).map_err(fmt_error)?;
        Ok(())
    }
}

impl Generator for SempyroGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn generate(&self, schema: &SchemaDocument) -> GeneratorResult<String> {
        let provided = self.provided_names();
        let mut imports = ImportSet::new();
        for statement in &self.imports {
            imports.add(statement);
        }
        imports.add(&ImportStatement::Module {
            module: "logging".to_string(),
            alias: None,
        });
        imports.add_from("pydantic", "ConfigDict");
        imports.add_from("pydantic", "Field");

        let mut blocks = Vec::new();
        for name in Self::render_order(schema, &provided) {
            let block = if let Some(definition) = schema.enums.get(name) {
                Self::generate_enum(name, definition, &mut imports)?
            } else if let Some(class) = schema.classes.get(name) {
                Self::generate_class(name, class, schema, &provided, &mut imports)?
            } else {
                continue;
            };
            blocks.push(block);
        }

        let mut output = String::new();
        writeln!(&mut output, "{}", imports.render()).map_err(fmt_error)?;
        writeln!(&mut output).map_err(fmt_error)?;
        writeln!(&mut output, "metamodel_version = \"None\"").map_err(fmt_error)?;
        writeln!(&mut output, "version = \"None\"").map_err(fmt_error)?;
        writeln!(&mut output).map_err(fmt_error)?;
        writeln!(&mut output, "logger = logging.getLogger(__name__)").map_err(fmt_error)?;
        for block in blocks {
            writeln!(&mut output).map_err(fmt_error)?;
            writeln!(&mut output).map_err(fmt_error)?;
            output.push_str(&block);
        }
        Ok(output)
    }

    fn get_file_extension(&self) -> &str {
        "py"
    }
}

/// `json_schema_extra` entries of a class, keys without the `$`
fn schema_extra(class: &ClassDefinition) -> Vec<(String, String)> {
    let Some(annotations) = class.annotations.as_ref() else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for key in [keys::ONTOLOGY, keys::NAMESPACE, keys::IRI, keys::PREFIX] {
        if let Some(value) = annotations.get(key) {
            let rendered = if key == keys::NAMESPACE {
                format!("str({value})")
            } else {
                python_literal(value)
            };
            entries.push((key.to_string(), rendered));
        }
    }
    for (key, value) in annotations {
        if keys::TYPED_CLASS_KEYS.contains(&key.as_str()) || key == VALIDATORS_ANNOTATION {
            continue;
        }
        entries.push((key.clone(), python_literal(value)));
    }
    entries
}

fn validator_sources(value: &AnnotationValue) -> Vec<String> {
    match value {
        AnnotationValue::Array(items) => items.iter().map(ToString::to_string).collect(),
        other => vec![other.to_string()],
    }
}

/// Python type for a LinkML range name
fn python_type(range: &str, schema: &SchemaDocument, imports: &mut ImportSet) -> String {
    if schema.classes.contains_key(range) || schema.enums.contains_key(range) {
        return range.to_string();
    }
    if let Some(base) = schema.types.get(range).and_then(|t| t.base.as_deref()) {
        return base.to_string();
    }
    match range {
        "string" | "uri" | "uriorcurie" | "curie" | "ncname" => "str".to_string(),
        "integer" | "nonNegativeInteger" => "int".to_string(),
        "boolean" => "bool".to_string(),
        "float" | "double" => "float".to_string(),
        "decimal" => {
            imports.add_from("decimal", "Decimal");
            "Decimal".to_string()
        }
        "datetime" | "date" | "time" => {
            imports.add_from("datetime", range);
            range.to_string()
        }
        other => other.to_string(),
    }
}

/// Python source literal for an annotation value
fn python_literal(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::String(s) => python_string(s),
        AnnotationValue::Bool(true) => "True".to_string(),
        AnnotationValue::Bool(false) => "False".to_string(),
        AnnotationValue::Number(n) => n.to_string(),
        AnnotationValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        AnnotationValue::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", python_string(k), python_literal(v)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

fn python_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

fn escape_docstring(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

fn python_identifier(name: &str) -> String {
    let mut identifier: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    identifier
}

fn enum_member_name(value: &str) -> String {
    python_identifier(&value.to_case(Case::UpperSnake))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::imports::parse_import_statements;
    use metadata_core::types::{AnonymousSlotExpression, TypeDefinition};
    use pretty_assertions::assert_eq;

    const TEST_CLASS_IMPORTS: &str = "import logging
from typing import Union

from pydantic import ConfigDict, Field
from rdflib.namespace import DCTERMS
from sempyro import LiteralField, RDFModel
";

    fn slot(description: &str, term: &str, required: bool, multivalued: bool) -> SlotDefinition {
        let mut slot = SlotDefinition {
            description: Some(description.to_string()),
            any_of: Some(vec![
                AnonymousSlotExpression { range: "LiteralField".to_string() },
                AnonymousSlotExpression { range: "str".to_string() },
            ]),
            required,
            multivalued,
            ..SlotDefinition::default()
        };
        slot.set_annotation(keys::RDF_TERM, term);
        slot.set_annotation(keys::RDF_TYPE, "rdfs_literal");
        slot
    }

    fn test_class_schema() -> SchemaDocument {
        let mut doc = SchemaDocument {
            id: "http://example.com/TestClass".to_string(),
            ..SchemaDocument::default()
        };
        for name in ["LiteralField", "str"] {
            doc.types.insert(
                name.to_string(),
                TypeDefinition {
                    base: Some(name.to_string()),
                    ..TypeDefinition::default()
                },
            );
        }
        doc.classes.insert(
            "RDFModel".to_string(),
            ClassDefinition {
                description: Some("Base".to_string()),
                ..ClassDefinition::default()
            },
        );
        let mut class = ClassDefinition {
            class_uri: Some("hri:TestClass".to_string()),
            description: Some("A test class".to_string()),
            is_a: Some("RDFModel".to_string()),
            slots: vec!["title".to_string(), "description".to_string()],
            ..ClassDefinition::default()
        };
        class.set_annotation(keys::ONTOLOGY, "http://example.com/ontology");
        class.set_annotation(keys::IRI, "http://example.com/TestClass");
        class.set_annotation(keys::NAMESPACE, "HRI");
        class.set_annotation(keys::PREFIX, "hri");
        doc.classes.insert("HRITestclass".to_string(), class);
        doc.slots
            .insert("title".to_string(), slot("The title", "DCTERMS.title", true, true));
        doc.slots.insert(
            "description".to_string(),
            slot("The description", "DCTERMS.description", true, true),
        );
        doc
    }

    #[test]
    fn test_generate_test_class_module() {
        let imports = parse_import_statements(TEST_CLASS_IMPORTS).unwrap();
        let output = SempyroGenerator::with_imports(&imports)
            .generate(&test_class_schema())
            .unwrap();

        let expected = r#"import logging
from typing import Union

from pydantic import ConfigDict, Field
from rdflib.namespace import DCTERMS
from sempyro import LiteralField, RDFModel

metamodel_version = "None"
version = "None"

logger = logging.getLogger(__name__)


class HRITestclass(RDFModel):
    """
    A test class
    """

    model_config = ConfigDict(
        arbitrary_types_allowed=True,
        use_enum_values=True,
        json_schema_extra={
            "$ontology": "http://example.com/ontology",
            "$namespace": str(HRI),
            "$IRI": "http://example.com/TestClass",
            "$prefix": "hri",
        },
    )
"#;
        assert!(output.starts_with(expected), "{output}");
        assert!(output.contains(
            "    title: list[Union[LiteralField, str]] = Field(\n        description=\"\"\"The title\"\"\", json_schema_extra={\"rdf_term\": DCTERMS.title, \"rdf_type\": \"rdfs_literal\"}\n    )\n"
        ));
        assert!(!output.contains("class RDFModel"));
    }

    #[test]
    fn test_optional_field_and_base_model() {
        let mut schema = test_class_schema();
        if let Some(class) = schema.classes.get_mut("HRITestclass") {
            class.is_a = None;
            class.annotations = None;
        }
        if let Some(slot) = schema.slots.get_mut("title") {
            slot.required = false;
            slot.multivalued = false;
            slot.any_of = None;
            slot.range = Some("datetime".to_string());
            slot.description = None;
            slot.annotations = None;
        }
        let output = SempyroGenerator::new().generate(&schema).unwrap();

        assert!(output.contains("class HRITestclass(BaseModel):"));
        assert!(output.contains("    title: Optional[datetime] = Field(default=None)\n"));
        assert!(output.contains("from datetime import datetime"));
        assert!(output.contains("from pydantic import BaseModel, ConfigDict, Field"));
        assert!(output.contains("from typing import Optional, Union"));
        assert!(!output.contains("json_schema_extra={\n"));
    }

    #[test]
    fn test_parents_and_ranges_render_first() {
        let mut schema = test_class_schema();
        schema
            .classes
            .insert("HRIAgent".to_string(), ClassDefinition::stub("hri:Agent"));
        if let Some(slot) = schema.slots.get_mut("title") {
            slot.any_of = None;
            slot.range = Some("HRIAgent".to_string());
        }
        let output = SempyroGenerator::new().generate(&schema).unwrap();

        let rdf_model = output.find("class RDFModel(BaseModel):").unwrap();
        let agent = output.find("class HRIAgent(BaseModel):").unwrap();
        let main = output.find("class HRITestclass(RDFModel):").unwrap();
        assert!(rdf_model < main && agent < main);
        assert!(output.contains("    title: list[HRIAgent] = Field("));
    }

    #[test]
    fn test_validators_and_extra_annotations() {
        let mut schema = test_class_schema();
        if let Some(class) = schema.classes.get_mut("HRITestclass") {
            class.set_annotation("validation", "strict");
            class.set_annotation(
                VALIDATORS_ANNOTATION,
                "@field_validator(\"title\", mode=\"before\")\n@classmethod\ndef _check(cls, value):\n    return value\n",
            );
        }
        let output = SempyroGenerator::new().generate(&schema).unwrap();

        assert!(output.contains("            \"$validation\": \"strict\",\n"));
        assert!(output.contains(
            "\n    @field_validator(\"title\", mode=\"before\")\n    @classmethod\n    def _check(cls, value):\n        return value\n"
        ));
        assert!(!output.contains("$validators"));
    }

    #[test]
    fn test_undefined_slot_is_an_error() {
        let mut schema = test_class_schema();
        schema.slots.shift_remove("title");
        assert!(SempyroGenerator::new().generate(&schema).is_err());
    }

    #[test]
    fn test_enum_rendering() {
        let mut schema = SchemaDocument::default();
        let mut definition = EnumDefinition::default();
        definition.permissible_values.insert("non public".to_string(), None);
        schema.enums.insert("AccessRights".to_string(), definition);
        let output = SempyroGenerator::new().generate(&schema).unwrap();
        assert!(output.contains("class AccessRights(str, Enum):\n    NON_PUBLIC = \"non public\"\n"));
        assert!(output.contains("from enum import Enum"));
    }
}
