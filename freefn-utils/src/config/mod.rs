//! Configuration file loading
//!
//! TOML, JSON and YAML are accepted; the format follows the file extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when looking for a config file by name
pub const CONFIG_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

/// Load configuration from file
pub fn load_config<T>(path: &Path) -> crate::Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let content = std::fs::read_to_string(path)?;

    match extension.as_str() {
        "toml" => toml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("TOML parse error in {}: {e}", path.display()))),
        "json" => serde_json::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("JSON parse error in {}: {e}", path.display()))),
        "yml" | "yaml" => serde_yaml::from_str(&content)
            .map_err(|e| crate::UtilError::Config(format!("YAML parse error in {}: {e}", path.display()))),
        _ => Err(crate::UtilError::Config(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}

/// First `<dir>/<stem>.<ext>` that exists, trying [`CONFIG_EXTENSIONS`] in order
pub fn discover_config(dir: &Path, stem: &str) -> Option<PathBuf> {
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Load `explicit` if given, else a discovered `<stem>` file in `dir`, else defaults.
///
/// An explicit path that does not exist is an error.
pub fn load_or_default<T>(explicit: Option<&Path>, dir: &Path, stem: &str) -> crate::Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if let Some(path) = explicit {
        tracing::debug!(path = %path.display(), "loading configuration");
        return load_config(path);
    }
    match discover_config(dir, stem) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading discovered configuration");
            load_config(&path)
        }
        None => {
            tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
            Ok(T::default())
        }
    }
}

/// Render a configuration as TOML
pub fn to_toml_string<T: Serialize>(config: &T) -> crate::Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| crate::UtilError::Serialization(format!("TOML serialization error: {e}")))
}
