//! Transformer implementations
//!
//! A transformer turns one file's contents into new contents. The engine
//! takes care of reading, backups and writing.

use crate::{
    types::{BackupPolicy, FileTransform, SourceTransform, TransformationType},
    Result,
};
use freefn_utils::file::decode_utf8;
use std::path::Path;

pub mod free_functions;
pub mod tabs;

pub use free_functions::{transform_header, FreeFunctionTransformer};
pub use tabs::{expand_tabs, expand_tabs_bytes, TabExpander};

/// A source-to-source rewrite applied file by file
pub trait Transformer: Send + Sync {
    fn transformation_type(&self) -> TransformationType;

    /// Transform the contents of the file at `path`.
    ///
    /// `path` is only used for diagnostics.
    fn transform_source(&self, source: &str, path: &Path) -> Result<SourceTransform>;

    /// Transform a file's raw contents.
    ///
    /// The contents must be UTF-8 unless a transformer overrides this.
    fn transform_bytes(&self, source: &[u8], path: &Path) -> Result<FileTransform> {
        let text = decode_utf8(source, path)?;
        Ok(self.transform_source(text, path)?.into())
    }

    /// How the engine preserves a file before overwriting it
    fn backup_policy(&self) -> BackupPolicy {
        BackupPolicy::None
    }
}
