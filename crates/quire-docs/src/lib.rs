#![deny(clippy::all)]
// quire-docs reads source files and import exports straight from disk
#![allow(clippy::disallowed_methods)]

//! Documentation extraction for class-based JavaScript code bases.
//!
//! Doc comments of a set of source files are parsed into declaration
//! records, aggregated into classes and refined by a series of passes into a
//! [`RelationsGraph`]: one record per class with its members, resolved
//! inheritance and mixins, and stubs for classes documented elsewhere.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use quire_config::DocsConfig;
//! use quire_docs::BatchParser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocsConfig::load(Some(Path::new("quire.toml")))?;
//! let output = BatchParser::new(config).run()?;
//! for class in output.relations.iter() {
//!     println!("{} ({} members)", class.name, class.members.len());
//! }
//! for diagnostic in output.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! # Ok(()) }
//! ```

pub mod aggregator;
pub mod batch;
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod filter;
pub mod graph;
pub mod jsdoc;
pub mod model;
pub mod passes;
pub mod relations;
pub mod source;

#[cfg(feature = "logging")]
pub mod logging;

pub use aggregator::{Aggregator, ClassEntry, ClassRegistry, aggregate};
pub use batch::{BatchOutput, BatchParser, Pipeline};
pub use diagnostics::{Category, Diagnostic, Diagnostics, Level};
pub use error::{DocsError, Result};
pub use eval::{
    EvalError, ExpressionNode, TypeClass, TypedValue, Value, classify_type, evaluate_value,
};
pub use filter::filter_classes;
pub use graph::{ExportedVersion, ImportedVersion, export, load_import, load_imports};
pub use model::{
    ClassMeta, DeclarationRecord, FileParseResult, GLOBAL_CLASS, Metadata, Param, ReturnDoc,
    SourceLocation, TagName, Visibility,
};
pub use relations::{ClassRecord, ClassRef, RelationsGraph};
pub use source::{DocCommentParser, SourceParser, parse_expression};

#[cfg(feature = "logging")]
pub use logging::{LogLevel, init_logging, init_logging_from_env};
