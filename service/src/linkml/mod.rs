//! LinkML backend
//!
//! Builds schema documents from a metadata workbook and writes them as YAML
//! under `{prefix}/{prefix}-{Class}.yaml`.

mod creator;
mod resolve;
mod writer;

pub use creator::{
    BuiltDocument, CLASSES_SHEET, LinkmlCreator, MetadataSheets, PREFIXES_SHEET, load_metadata,
};
pub use resolve::resolve_imports;
pub use writer::{
    RDF_MODEL_FILE, TYPED_CLASS_TYPES_FILE, read_document, write_document, write_support_modules,
};
