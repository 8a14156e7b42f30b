#![deny(clippy::all)]
// Discovery reads config files straight from disk.
#![allow(clippy::disallowed_methods)]

//! Configuration for the quire documentation pipeline.
//!
//! Options are read from `quire.toml`, `quire.json` or the `quire` field of a
//! `package.json`, layered over defaults and `QUIRE_*` environment variables.

pub mod config;
pub mod discovery;
pub mod error;
pub mod validation;

pub use config::{DocsConfig, EventCompatibility, ImportSpec, WarningSettings, matches_external};
pub use discovery::ConfigDiscovery;
pub use error::{ConfigError, Result};
pub use validation::{validate_fs, validate_schema};
