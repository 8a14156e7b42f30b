//! Turning source files into declaration records.

mod code;
mod lower;
mod parser;

use std::path::Path;

use crate::error::Result;
use crate::model::FileParseResult;

pub use code::{CodeCollector, CodeInfo, ExtDefineInfo, FunctionInfo, ValueInfo};
pub use lower::{lower_expression, member_path, parse_expression};
pub use parser::DocCommentParser;

/// Produces the declaration records of one file.
///
/// Implementations are called from several threads at once and must not
/// share mutable state between calls.
pub trait SourceParser: Send + Sync {
    fn parse(&self, path: &Path, source: &str) -> Result<FileParseResult>;
}
