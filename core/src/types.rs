//! Schema document types
//!
//! One [`SchemaDocument`] is built per class row. Field declaration order is
//! the YAML key order: `id`, `title`, `description`, `prefixes`, `imports`,
//! then `types`, `enums`, `classes`, `slots`.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::annotations::{Annotatable, Annotations};
use crate::error::Result;

/// The base types module every document imports
pub const BASE_TYPES_IMPORT: &str = "linkml:types";

/// Mixin module providing `RDFModel`
pub const RDF_MODEL_IMPORT: &str = "../rdf_model";

/// Module declaring the typed-class scalar names
pub const TYPED_CLASS_TYPES_IMPORT: &str = "../sempyro_types";

/// Class every typed class ultimately derives from
pub const RDF_MODEL_CLASS: &str = "RDFModel";

/// A LinkML schema document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaDocument {
    /// Namespace plus local name
    pub id: String,

    /// Module name, only set on support modules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Human-readable title (`prefix-Class`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description of the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Prefix declarations
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prefixes: IndexMap<String, String>,

    /// Import statements, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Type definitions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub types: IndexMap<String, TypeDefinition>,

    /// Enum definitions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub enums: IndexMap<String, EnumDefinition>,

    /// Class definitions, primary class first, stubs after
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub classes: IndexMap<String, ClassDefinition>,

    /// Slot definitions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub slots: IndexMap<String, SlotDefinition>,
}

/// Class definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassDefinition {
    /// Prefixed URI of the class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_uri: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parent class identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,

    /// Backend-specific annotations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,

    /// Slot names in sheet row order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,
}

/// Slot definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotDefinition {
    /// Original property label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Prefixed URI of the property
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_uri: Option<String>,

    /// Single range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// Union of ranges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<AnonymousSlotExpression>>,

    /// Annotations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,

    /// Cardinality is `1` or `1..n`
    #[serde(default)]
    pub required: bool,

    /// Cardinality is `0..n` or `1..n`
    #[serde(default)]
    pub multivalued: bool,

    /// Regular expression values must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifabsent: Option<String>,
}

/// One member of an `any_of` union
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnonymousSlotExpression {
    /// Range of this member
    pub range: String,
}

/// Type definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeDefinition {
    /// URI of the type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Python base type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Parent type
    #[serde(rename = "typeof", skip_serializing_if = "Option::is_none")]
    pub typeof_: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Enum definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnumDefinition {
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Permissible values, in order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub permissible_values: IndexMap<String, Option<PermissibleValue>>,
}

/// Permissible value details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissibleValue {
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Meaning URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

impl SchemaDocument {
    /// Parse a document from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid schema document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Render the document as YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Names of locally defined classes and enums
    #[must_use]
    pub fn local_definitions(&self) -> BTreeSet<String> {
        self.classes
            .keys()
            .chain(self.enums.keys())
            .cloned()
            .collect()
    }

    /// Add an import unless it is already present
    pub fn add_import(&mut self, import: impl Into<String>) {
        let import = import.into();
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    /// The first class, which is the one the document was built for
    #[must_use]
    pub fn primary_class(&self) -> Option<(&String, &ClassDefinition)> {
        self.classes.first()
    }
}

impl ClassDefinition {
    /// A stub carrying only a URI
    #[must_use]
    pub fn stub(class_uri: impl Into<String>) -> Self {
        Self {
            class_uri: Some(class_uri.into()),
            ..Self::default()
        }
    }

    /// Whether this is a URI-only stub
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.description.is_none()
            && self.is_a.is_none()
            && self.annotations.is_none()
            && self.slots.is_empty()
    }
}

impl SlotDefinition {
    /// All range names this slot can take
    #[must_use]
    pub fn ranges(&self) -> Vec<&str> {
        match (&self.any_of, &self.range) {
            (Some(members), _) => members.iter().map(|m| m.range.as_str()).collect(),
            (None, Some(range)) => vec![range.as_str()],
            (None, None) => Vec::new(),
        }
    }
}

impl Annotatable for ClassDefinition {
    fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }

    fn annotations_mut(&mut self) -> &mut Annotations {
        self.annotations.get_or_insert_with(Annotations::new)
    }

    fn clear_annotations(&mut self) {
        self.annotations = None;
    }
}

impl Annotatable for SlotDefinition {
    fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }

    fn annotations_mut(&mut self) -> &mut Annotations {
        self.annotations.get_or_insert_with(Annotations::new)
    }

    fn clear_annotations(&mut self) {
        self.annotations = None;
    }
}
