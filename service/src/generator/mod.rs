//! Native generators
//!
//! Both generators read a schema document and return the generated text:
//! [`SempyroGenerator`] renders typed Pydantic classes, [`ShaclGenerator`]
//! renders SHACL shapes as Turtle.

pub mod imports;
pub mod sempyro;
pub mod shacl;
pub mod traits;

pub use imports::{ImportSet, ImportStatement, ImportsConfig, parse_import_statements};
pub use sempyro::SempyroGenerator;
pub use shacl::ShaclGenerator;
pub use traits::{Generator, GeneratorError, GeneratorResult};
