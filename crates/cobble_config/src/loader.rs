//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "cobble.toml";

/// Loads and validates the configuration for a project directory.
///
/// Reads `<project_dir>/cobble.toml` if it exists. A project without a
/// configuration file gets [`ProjectConfig::default`].
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    match std::fs::read_to_string(&config_path) {
        Ok(content) => load_config_from_str(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProjectConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Parses and validates a `cobble.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.toolchain.compiler.trim().is_empty() {
        return Err(ConfigError::MissingField("toolchain.compiler".to_string()));
    }

    let paths = &config.paths;
    for (field, value) in [
        ("paths.src", &paths.src),
        ("paths.obj", &paths.obj),
        ("paths.deps", &paths.deps),
        ("paths.bin", &paths.bin),
    ] {
        if value.is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }

    let units = &config.units;
    if units.headers.is_empty() {
        return Err(ConfigError::MissingField("units.headers".to_string()));
    }
    if units.sources.is_empty() {
        return Err(ConfigError::MissingField("units.sources".to_string()));
    }
    if units.package_marker.is_empty() {
        return Err(ConfigError::MissingField("units.package_marker".to_string()));
    }
    for ext in units.headers.iter().chain(&units.sources) {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::ValidationError(format!(
                "unit extension '{ext}' must be non-empty and given without a leading dot"
            )));
        }
    }
    if let Some(ext) = units.headers.iter().find(|h| units.sources.contains(h)) {
        return Err(ConfigError::ValidationError(format!(
            "'{ext}' is listed as both a header and a source extension"
        )));
    }
    Ok(())
}
