//! Transformation types and result structures
//!
//! Everything in here is serialisable so a run can be reported as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The transformations this crate can apply to a source tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationType {
    /// Generate free-function wrappers for marked member functions
    FreeFunctions,
    /// Replace tabs with spaces
    ExpandTabs,
}

impl TransformationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationType::FreeFunctions => "free_functions",
            TransformationType::ExpandTabs => "expand_tabs",
        }
    }

    /// Get display name for log output
    pub fn display_name(&self) -> &'static str {
        match self {
            TransformationType::FreeFunctions => "Free Function Generation",
            TransformationType::ExpandTabs => "Tab Expansion",
        }
    }
}

impl std::fmt::Display for TransformationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransformationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free_functions" => Ok(TransformationType::FreeFunctions),
            "expand_tabs" => Ok(TransformationType::ExpandTabs),
            _ => Err(format!("Unknown transformation type: {s}")),
        }
    }
}

/// How a file is preserved before it is overwritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Rewrite in place
    #[default]
    None,
    /// Keep the previous contents as `<file>.orig`, replacing an older one
    OrigSuffix,
    /// Copy into a timestamped backup directory next to the file
    Timestamped,
}

/// Outcome of an engine run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationStatus {
    /// Every changed file was written
    Completed,
    /// Nothing was written; changes were only computed
    DryRun,
}

impl TransformationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationStatus::Completed => "completed",
            TransformationStatus::DryRun => "dry_run",
        }
    }
}

/// A member function for which a free wrapper was generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreedFunction {
    /// Class the member belongs to
    pub class_name: String,
    /// Function name
    pub name: String,
    /// Whether the member was static
    pub is_static: bool,
    /// 1-based line of the marker in the source header
    pub line: usize,
}

/// Result of transforming one file's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTransform {
    /// The new text
    pub output: String,
    /// Whether `output` differs from the input
    pub changed: bool,
    /// Functions freed in this file
    pub freed: Vec<FreedFunction>,
}

impl SourceTransform {
    /// A transform that leaves `source` as it is
    pub fn unchanged(source: &str) -> Self {
        Self {
            output: source.to_string(),
            changed: false,
            freed: Vec::new(),
        }
    }
}

/// Result of transforming one file's raw contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransform {
    /// The new contents
    pub output: Vec<u8>,
    /// Whether `output` differs from the input
    pub changed: bool,
    /// Functions freed in this file
    pub freed: Vec<FreedFunction>,
}

impl From<SourceTransform> for FileTransform {
    fn from(transform: SourceTransform) -> Self {
        Self {
            output: transform.output.into_bytes(),
            changed: transform.changed,
            freed: transform.freed,
        }
    }
}

/// Per-file record of a change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub functions_freed: Vec<FreedFunction>,
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Where the previous contents were saved
    pub backup: Option<PathBuf>,
    /// Unified diff, recorded on dry runs
    pub diff: Option<String>,
}

/// Statistics about transformation execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationStatistics {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub functions_freed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

/// Result of running one transformer over a set of files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationResult {
    /// Type of transformation that was applied
    pub transformation_type: TransformationType,
    pub status: TransformationStatus,
    /// Files that changed (or would change on a dry run)
    pub files_modified: Vec<PathBuf>,
    pub changes: Vec<FileChange>,
    pub statistics: TransformationStatistics,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TransformationResult {
    /// Whether any file changed or would change
    pub fn has_changes(&self) -> bool {
        !self.files_modified.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transformation_type_conversion() {
        for transform_type in [TransformationType::FreeFunctions, TransformationType::ExpandTabs] {
            let as_string = transform_type.as_str();
            let parsed: TransformationType = as_string.parse().unwrap();
            assert_eq!(transform_type, parsed);
            assert_eq!(transform_type.to_string(), as_string);
        }
        assert!("magic_numbers".parse::<TransformationType>().is_err());
    }

    #[test]
    fn test_serialised_names_match_as_str() {
        let json = serde_json::to_string(&TransformationType::ExpandTabs).unwrap();
        assert_eq!(json, "\"expand_tabs\"");
        let json = serde_json::to_string(&TransformationStatus::DryRun).unwrap();
        assert_eq!(json, format!("\"{}\"", TransformationStatus::DryRun.as_str()));
    }

    #[test]
    fn test_unchanged_transform() {
        let transform = SourceTransform::unchanged("int x;\n");
        assert!(!transform.changed);
        assert_eq!(transform.output, "int x;\n");
        assert!(transform.freed.is_empty());
    }
}
