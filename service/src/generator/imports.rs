//! Python import statements for generated typed-class modules
//!
//! The imports configuration maps a `{prefix}-{Class}` key to the import
//! statements its module needs. Entries are either a block of Python
//! source or a list of `{module, alias, objects}` mappings.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use super::traits::{GeneratorError, GeneratorResult};

/// Standard library modules, rendered in the first import group
const STDLIB_MODULES: &[&str] = &[
    "abc",
    "collections",
    "dataclasses",
    "datetime",
    "decimal",
    "enum",
    "functools",
    "logging",
    "os",
    "pathlib",
    "re",
    "sys",
    "typing",
    "uuid",
];

/// One imported object, optionally aliased
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportedObject {
    /// Name in the source module
    pub name: String,
    /// Local alias
    pub alias: Option<String>,
}

/// A single Python import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatement {
    /// `import module` or `import module as alias`
    Module {
        /// Dotted module path
        module: String,
        /// Local alias
        alias: Option<String>,
    },
    /// `from module import A, B as C`
    From {
        /// Dotted module path
        module: String,
        /// Imported objects
        objects: Vec<ImportedObject>,
    },
}

impl ImportedObject {
    /// Name the object is bound to in the importing module
    #[must_use]
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl ImportStatement {
    /// Names this statement binds in the importing module
    #[must_use]
    pub fn bound_names(&self) -> Vec<String> {
        match self {
            Self::Module { module, alias } => vec![alias.clone().unwrap_or_else(|| {
                module.split('.').next().unwrap_or(module).to_string()
            })],
            Self::From { objects, .. } => {
                objects.iter().map(|o| o.bound_name().to_string()).collect()
            }
        }
    }
}

/// Parse Python import statements
///
/// Accepts `import m`, `import m as a`, `import a, b`, `from m import A`,
/// `from m import A as B, C` and parenthesized multi-line `from` imports.
/// Blank lines and comments are ignored.
///
/// # Errors
///
/// Returns an error for any other statement or an unclosed parenthesis.
pub fn parse_import_statements(text: &str) -> GeneratorResult<Vec<ImportStatement>> {
    let mut statements = Vec::new();
    let mut lines = text.lines().map(strip_comment);

    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("from ") {
            let (module, names) = rest.split_once(" import ").ok_or_else(|| {
                GeneratorError::Imports(format!("malformed from-import: {line}"))
            })?;
            let mut names = names.trim().to_string();
            if let Some(open) = names.strip_prefix('(') {
                let mut collected = open.to_string();
                while !collected.contains(')') {
                    let next = lines.next().ok_or_else(|| {
                        GeneratorError::Imports(format!("unclosed parenthesis in: {line}"))
                    })?;
                    collected.push(',');
                    collected.push_str(next.trim());
                }
                names = collected.replace(')', "");
            }
            let objects = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(parse_object)
                .collect::<GeneratorResult<Vec<_>>>()?;
            if objects.is_empty() {
                return Err(GeneratorError::Imports(format!("nothing imported in: {line}")));
            }
            statements.push(ImportStatement::From {
                module: module.trim().to_string(),
                objects,
            });
        } else if let Some(rest) = line.strip_prefix("import ") {
            for part in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let object = parse_object(part)?;
                statements.push(ImportStatement::Module {
                    module: object.name,
                    alias: object.alias,
                });
            }
        } else {
            return Err(GeneratorError::Imports(format!("not an import statement: {line}")));
        }
    }

    Ok(statements)
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

fn parse_object(part: &str) -> GeneratorResult<ImportedObject> {
    let mut words = part.split_whitespace();
    match (words.next(), words.next(), words.next(), words.next()) {
        (Some(name), None, None, None) => Ok(ImportedObject {
            name: name.to_string(),
            alias: None,
        }),
        (Some(name), Some("as"), Some(alias), None) => Ok(ImportedObject {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }),
        _ => Err(GeneratorError::Imports(format!("malformed import name: {part}"))),
    }
}

/// Collects imports and renders them sorted and grouped
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    modules: BTreeSet<(String, Option<String>)>,
    from: BTreeMap<String, BTreeSet<ImportedObject>>,
}

impl ImportSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `from module import name`
    pub fn add_from(&mut self, module: &str, name: &str) {
        self.from.entry(module.to_string()).or_default().insert(ImportedObject {
            name: name.to_string(),
            alias: None,
        });
    }

    /// Add a parsed statement
    pub fn add(&mut self, statement: &ImportStatement) {
        match statement {
            ImportStatement::Module { module, alias } => {
                self.modules.insert((module.clone(), alias.clone()));
            }
            ImportStatement::From { module, objects } => {
                self.from
                    .entry(module.clone())
                    .or_default()
                    .extend(objects.iter().cloned());
            }
        }
    }

    /// Whether any statement binds `name`
    #[must_use]
    pub fn binds(&self, name: &str) -> bool {
        self.modules.iter().any(|(module, alias)| {
            alias.as_deref().unwrap_or_else(|| module.split('.').next().unwrap_or(module)) == name
        }) || self
            .from
            .values()
            .flatten()
            .any(|object| object.bound_name() == name)
    }

    /// Render the import block: standard library group, blank line, others
    #[must_use]
    pub fn render(&self) -> String {
        let stdlib = self.render_group(true);
        let others = self.render_group(false);
        match (stdlib.is_empty(), others.is_empty()) {
            (false, false) => format!("{}\n\n{}", stdlib.join("\n"), others.join("\n")),
            (false, true) => stdlib.join("\n"),
            (true, _) => others.join("\n"),
        }
    }

    fn render_group(&self, stdlib: bool) -> Vec<String> {
        let in_group = |module: &str| {
            let root = module.split('.').next().unwrap_or(module);
            STDLIB_MODULES.contains(&root) == stdlib
        };

        let mut lines: Vec<String> = self
            .modules
            .iter()
            .filter(|(module, _)| in_group(module))
            .map(|(module, alias)| match alias {
                Some(alias) => format!("import {module} as {alias}"),
                None => format!("import {module}"),
            })
            .collect();

        for (module, objects) in self.from.iter().filter(|(m, _)| in_group(m)) {
            let mut objects: Vec<&ImportedObject> = objects.iter().collect();
            objects.sort_by_key(|o| (object_kind(&o.name), o.name.as_str(), o.alias.as_deref()));
            let rendered: Vec<String> = objects
                .iter()
                .map(|o| match &o.alias {
                    Some(alias) => format!("{} as {alias}", o.name),
                    None => o.name.clone(),
                })
                .collect();
            lines.push(format!("from {module} import {}", rendered.join(", ")));
        }
        lines
    }
}

/// Constants sort before classes, classes before everything else
fn object_kind(name: &str) -> u8 {
    if name.len() > 1 && name.chars().all(|c| !c.is_lowercase()) {
        0
    } else if name.starts_with(char::is_uppercase) {
        1
    } else {
        2
    }
}

/// Per-class import statements keyed by `{prefix}-{Class}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportsConfig {
    entries: IndexMap<String, Vec<ImportStatement>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Source(String),
    Items(Vec<RawItem>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItem {
    Source(String),
    Import(RawImport),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawImport {
    module: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    objects: Vec<RawObject>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawObject {
    Name(String),
    Aliased {
        name: String,
        #[serde(default)]
        alias: Option<String>,
    },
}

impl ImportsConfig {
    /// Parse the configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error for invalid YAML or unparseable statements.
    pub fn from_yaml(text: &str) -> GeneratorResult<Self> {
        let raw: IndexMap<String, RawEntry> =
            serde_yaml::from_str(text).map_err(|e| GeneratorError::Imports(e.to_string()))?;
        let mut entries = IndexMap::new();
        for (key, entry) in raw {
            let statements = match entry {
                RawEntry::Source(source) => parse_import_statements(&source)?,
                RawEntry::Items(items) => {
                    let mut statements = Vec::new();
                    for item in items {
                        match item {
                            RawItem::Source(source) => {
                                statements.extend(parse_import_statements(&source)?);
                            }
                            RawItem::Import(import) => statements.push(import.into_statement()),
                        }
                    }
                    statements
                }
            };
            entries.insert(key, statements);
        }
        Ok(Self { entries })
    }

    /// Load the configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> GeneratorResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Statements for a class key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[ImportStatement]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of configured classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no class is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RawImport {
    fn into_statement(self) -> ImportStatement {
        if self.objects.is_empty() {
            ImportStatement::Module {
                module: self.module,
                alias: self.alias,
            }
        } else {
            ImportStatement::From {
                module: self.module,
                objects: self
                    .objects
                    .into_iter()
                    .map(|object| match object {
                        RawObject::Name(name) => ImportedObject { name, alias: None },
                        RawObject::Aliased { name, alias } => ImportedObject { name, alias },
                    })
                    .collect(),
            }
        }
    }
}
