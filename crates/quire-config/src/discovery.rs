//! File-based config discovery.
//!
//! Handles finding and loading quire configuration files from a project root.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::DocsConfig;
use crate::error::{ConfigError, Result};

/// Searches conventional locations for a quire configuration file.
///
/// # Example
///
/// ```no_run
/// use quire_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory.
    ///
    /// Searches in this order:
    /// 1. quire.toml
    /// 2. quire.json
    /// 3. package.json (quire field)
    pub fn find(&self) -> Option<PathBuf> {
        for name in ["quire.toml", "quire.json"] {
            let path = self.root.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("quire").is_some_and(|field| !field.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from the discovered file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<DocsConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        tracing::debug!("loading config from {}", path.display());
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.load_from_package_json(&path);
        }
        DocsConfig::load(Some(&path))
    }

    fn load_from_package_json(&self, path: &Path) -> Result<DocsConfig> {
        let content = fs::read_to_string(path)?;
        let parsed: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "package.json".to_string(),
                hint: Some(format!("Invalid JSON syntax: {}", e)),
            })?;
        let section = parsed.get("quire").cloned().ok_or(ConfigError::NotFound)?;
        DocsConfig::from_value(section)
    }
}
