//! freefn transform - source rewriting for C++ headers
//!
//! Generates namespace-scope free functions for member functions marked with
//! a sentinel macro, and expands tabs in source trees.
//!
//! Key pieces:
//! - A small C++ tokenizer and declaration parser ([`cpp`])
//! - Header scanning, rewriting and block splicing ([`header`], [`rewrite`], [`splice`])
//! - File-level transformers run by a [`TransformationEngine`]

#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod cpp;
pub mod discovery;
pub mod engine;
pub mod header;
pub mod rewrite;
pub mod splice;
pub mod transformers;
pub mod types;

// Re-export main types for convenience
pub use config::{FreeFnConfig, FreeFnSettings, TabConfig};
pub use discovery::find_files;
pub use engine::{EngineConfig, TransformationEngine};
pub use transformers::{expand_tabs, transform_header, FreeFunctionTransformer, TabExpander, Transformer};
pub use types::{
    BackupPolicy, FreedFunction, SourceTransform, TransformationResult, TransformationStatistics,
    TransformationStatus, TransformationType,
};

use std::path::PathBuf;

/// Result type for transformation operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Error types for transformation operations
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed C++ in or around a marked declaration
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No `;` or body found after a marker
    #[error("Declaration marked at line {line} is not terminated within {lookahead} lines")]
    UnterminatedDeclaration { line: usize, lookahead: usize },

    /// Generated block sentinels out of order or unpaired
    #[error("Unbalanced generated block at line {line}: {message}")]
    UnbalancedBlock { line: usize, message: String },

    /// Nowhere to insert a new generated block
    #[error("No line starting with `{anchor}` to insert the generated block before")]
    MissingAnchor { anchor: String },

    /// Marker seen before any class
    #[error("Marked function at line {line} is not inside a class")]
    NoEnclosingClass { line: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while processing a particular file
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<TransformError>,
    },

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] freefn_utils::UtilError),

    /// Invalid header glob
    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),
}
