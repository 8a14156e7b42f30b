use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for documentation processing.
pub type Result<T> = std::result::Result<T, DocsError>;

/// Fatal errors of the documentation pipeline.
///
/// Expression evaluation failures are not part of this type: they never stop a
/// run (see [`crate::eval::EvalError`]).
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to read or access a source file.
    #[error("failed to read source '{path}': {error}")]
    Io {
        /// Path to the file that caused the error.
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// A source file could not be turned into declaration records.
    #[error("failed to parse source '{path}': {message}")]
    Parse {
        path: PathBuf,
        /// Aggregated parser error message.
        message: String,
    },

    /// A class inherits from itself through `extends` or mixin edges.
    #[error("class {class} has a circular dependency: {}", chain.join(" -> "))]
    CircularDependency {
        class: String,
        /// Full cycle path, starting and ending with `class`.
        chain: Vec<String>,
    },

    /// An export of an earlier version could not be loaded.
    #[error("failed to import '{path}': {message}")]
    Import { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] quire_config::ConfigError),

    #[error("{message}")]
    Other { message: String },
}

impl DocsError {
    /// Helper to create a parse error from multiple diagnostic strings.
    pub fn parse_error(path: PathBuf, diagnostics: &[String]) -> Self {
        let message = diagnostics.join("; ");
        Self::Parse { path, message }
    }
}
