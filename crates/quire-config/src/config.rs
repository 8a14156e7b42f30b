//! Top-level configuration consumed by the documentation pipeline.
//!
//! `DocsConfig` carries the switches the semantic passes read
//! (`drop_global_class`, `event_compatibility`, `external_classes`) together
//! with the batch settings around them. Loading layers defaults, an optional
//! config file and `QUIRE_*` environment variables through figment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Source files to parse, in the order their results are aggregated.
    #[serde(default)]
    pub input_files: Vec<PathBuf>,

    /// Exclude the synthetic `global` class from the output.
    #[serde(default)]
    pub drop_global_class: bool,

    #[serde(default)]
    pub event_compatibility: EventCompatibility,

    /// Class names documented elsewhere. A trailing `*` matches by prefix.
    #[serde(default)]
    pub external_classes: IndexSet<String>,

    /// Follow mixin edges as well as `extends` when looking for cycles.
    #[serde(default = "default_true")]
    pub check_mixin_cycles: bool,

    /// Exports of earlier releases merged in by the importer.
    #[serde(default)]
    pub imports: Vec<ImportSpec>,

    #[serde(default)]
    pub warnings: WarningSettings,

    /// Worker threads used for parsing. Defaults to one per CPU.
    #[serde(default)]
    pub parallel_jobs: Option<usize>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            drop_global_class: false,
            event_compatibility: EventCompatibility::default(),
            external_classes: IndexSet::new(),
            check_mixin_cycles: true,
            imports: Vec::new(),
            warnings: WarningSettings::default(),
            parallel_jobs: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl DocsConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// Priority: environment variables > config file > defaults. The file
    /// format is picked from the extension (`.toml` or `.json`).
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_path {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
            };
        }

        // QUIRE_DROP_GLOBAL_CLASS, QUIRE_WARNINGS__DISABLED, ...
        figment = figment.merge(Env::prefixed("QUIRE_").split("__"));

        let config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: Some(e.to_string()),
        })?;
        tracing::debug!(
            inputs = config.input_files.len(),
            imports = config.imports.len(),
            "loaded docs configuration"
        );
        Ok(config)
    }

    /// Create from a `serde_json::Value`, e.g. the `quire` field of a package.json.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }
}

/// Whether an `external_classes` entry covers `name`. A trailing `*` matches
/// any name with the preceding prefix.
pub fn matches_external(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

/// How event declarations are normalised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCompatibility {
    /// Ext4 conventions when any class is declared through `Ext.define`.
    #[default]
    Auto,
    /// Always apply Ext4 event conventions.
    Ext4,
    /// Leave event declarations untouched.
    Legacy,
}

impl FromStr for EventCompatibility {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ext4" => Ok(Self::Ext4),
            "legacy" | "ext3" => Ok(Self::Legacy),
            other => Err(ConfigError::InvalidValue {
                field: "event_compatibility".to_string(),
                hint: Some(format!("unknown mode '{other}', expected auto, ext4 or legacy")),
            }),
        }
    }
}

impl fmt::Display for EventCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Ext4 => "ext4",
            Self::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

/// A previously exported documentation model tagged with its release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub version: String,
    pub path: PathBuf,
}

impl FromStr for ImportSpec {
    type Err = ConfigError;

    /// Parses the `version:path` shorthand.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((version, path)) if !version.is_empty() && !path.is_empty() => Ok(Self {
                version: version.to_string(),
                path: PathBuf::from(path),
            }),
            _ => Err(ConfigError::InvalidValue {
                field: "imports".to_string(),
                hint: Some(format!("expected 'version:path', got '{s}'")),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSettings {
    /// Diagnostic categories that are neither recorded nor logged.
    #[serde(default)]
    pub disabled: Vec<String>,
}
