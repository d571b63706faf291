//! Transformation engine
//!
//! Runs one transformer over a list of files: reads each file, applies the
//! transformer, and writes (or, on a dry run, diffs) whatever changed. The
//! first failure aborts the run.
//!
//! Files are handled as bytes. Whether they must be UTF-8 is up to the
//! transformer; diffs and line counts show invalid sequences replaced.

use crate::{
    transformers::Transformer,
    types::{
        BackupPolicy, FileChange, TransformationResult, TransformationStatistics,
        TransformationStatus,
    },
    Result, TransformError,
};
use chrono::Utc;
use freefn_utils::file::{create_backup, create_orig_backup, write_file};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

/// Configuration for the transformation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Compute changes without writing anything
    pub dry_run: bool,
    /// Context lines around each hunk of a dry-run diff
    pub diff_context: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            diff_context: 3,
        }
    }
}

/// Applies transformers to files on disk
#[derive(Debug, Clone, Default)]
pub struct TransformationEngine {
    config: EngineConfig,
}

impl TransformationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run `transformer` over `files` in order.
    pub fn run(&self, transformer: &dyn Transformer, files: &[PathBuf]) -> Result<TransformationResult> {
        let started_at = Utc::now();
        let transformation_type = transformer.transformation_type();
        tracing::info!(
            transformation = transformation_type.display_name(),
            files = files.len(),
            dry_run = self.config.dry_run,
            "starting run"
        );

        let mut statistics = TransformationStatistics::default();
        let mut changes = Vec::new();
        for path in files {
            statistics.files_scanned += 1;
            let change = self
                .apply(transformer, path)
                .map_err(|source| TransformError::File {
                    path: path.clone(),
                    source: Box::new(source),
                })?;
            if let Some(change) = change {
                statistics.files_modified += 1;
                statistics.functions_freed += change.functions_freed.len();
                statistics.lines_added += change.lines_added;
                statistics.lines_removed += change.lines_removed;
                changes.push(change);
            }
        }

        tracing::info!(
            transformation = transformation_type.display_name(),
            files_scanned = statistics.files_scanned,
            files_modified = statistics.files_modified,
            functions_freed = statistics.functions_freed,
            "run finished"
        );

        Ok(TransformationResult {
            transformation_type,
            status: if self.config.dry_run {
                TransformationStatus::DryRun
            } else {
                TransformationStatus::Completed
            },
            files_modified: changes.iter().map(|c| c.path.clone()).collect(),
            changes,
            statistics,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Transform a single file, returning its change record if it changed
    fn apply(&self, transformer: &dyn Transformer, path: &Path) -> Result<Option<FileChange>> {
        let source = std::fs::read(path)?;
        let transform = transformer.transform_bytes(&source, path)?;
        if !transform.changed {
            tracing::debug!(path = %path.display(), "unchanged");
            return Ok(None);
        }

        let old_text = String::from_utf8_lossy(&source);
        let new_text = String::from_utf8_lossy(&transform.output);
        let diff = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref());
        let (mut lines_added, mut lines_removed) = (0, 0);
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => lines_added += 1,
                ChangeTag::Delete => lines_removed += 1,
                ChangeTag::Equal => {}
            }
        }

        let mut record = FileChange {
            path: path.to_path_buf(),
            functions_freed: transform.freed,
            lines_added,
            lines_removed,
            backup: None,
            diff: None,
        };

        if self.config.dry_run {
            let name = path.display().to_string();
            record.diff = Some(
                diff.unified_diff()
                    .context_radius(self.config.diff_context)
                    .header(&name, &name)
                    .to_string(),
            );
            return Ok(Some(record));
        }

        record.backup = match transformer.backup_policy() {
            BackupPolicy::None => None,
            BackupPolicy::OrigSuffix => Some(create_orig_backup(path)?),
            BackupPolicy::Timestamped => Some(create_backup(path)?),
        };
        write_file(path, &transform.output)?;
        tracing::info!(
            path = %path.display(),
            added = lines_added,
            removed = lines_removed,
            "rewrote file"
        );
        Ok(Some(record))
    }
}
