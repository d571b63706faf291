//! freefn utilities - shared infrastructure for the freefn tools
//!
//! File system helpers, configuration loading and logging setup used by the
//! transform engine and the command-line tool.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod file;
pub mod logging;

/// Re-export commonly used utilities
pub use config::{load_config, load_or_default};
pub use file::{create_backup, create_orig_backup, decode_utf8, normalize_path, write_file};
pub use logging::{init_logging, LogLevel, LoggerConfig};

use std::collections::HashSet;
use std::path::Path;

/// Result type used throughout the freefn utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path operation error
    #[error("Path operation error: {0}")]
    PathOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Directory names never descended into when walking a source tree
pub fn default_exclusion_patterns() -> HashSet<String> {
    [
        // Version control
        ".git",
        ".svn",
        ".hg",
        // Build output
        "target",
        "build",
        "node_modules",
        // Our own backups
        file::BACKUP_DIR,
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// Whether any component of `path` is one of `patterns`
pub fn should_exclude_path(path: &Path, patterns: &HashSet<String>) -> bool {
    path.components()
        .any(|component| patterns.contains(component.as_os_str().to_string_lossy().as_ref()))
}
