//! Validation of loaded configuration.
//!
//! `validate_schema` checks values only; `validate_fs` additionally checks that
//! referenced files exist.

use crate::config::DocsConfig;
use crate::error::{ConfigError, Result};

/// Checks values without touching the filesystem.
pub fn validate_schema(config: &DocsConfig) -> Result<()> {
    if let Some(0) = config.parallel_jobs {
        return Err(ConfigError::Validation(
            "parallel_jobs must be at least 1".to_string(),
        ));
    }

    for spec in &config.imports {
        if spec.version.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "import '{}' has an empty version",
                spec.path.display()
            )));
        }
    }

    if let Some(name) = config
        .external_classes
        .iter()
        .find(|name| name.trim().is_empty() || name.as_str() == "*")
    {
        return Err(ConfigError::Validation(format!(
            "invalid external class pattern '{name}'"
        )));
    }

    Ok(())
}

/// Runs `validate_schema` and verifies that inputs and imports exist.
pub fn validate_fs(config: &DocsConfig) -> Result<()> {
    validate_schema(config)?;

    if let Some(missing) = config.input_files.iter().find(|path| !path.exists()) {
        return Err(ConfigError::InputNotFound(missing.clone()));
    }
    if let Some(missing) = config.imports.iter().find(|spec| !spec.path.exists()) {
        return Err(ConfigError::ImportNotFound(missing.path.clone()));
    }
    Ok(())
}
