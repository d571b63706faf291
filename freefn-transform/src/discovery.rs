//! Locating the files a transformer runs over

use crate::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Compile glob patterns, relative to a root directory, into one matcher.
///
/// `*` stops at path separators; only `**` crosses directories.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}

/// Files under `root` matching any of `patterns`, sorted.
///
/// Version control, build output and backup directories are skipped.
pub fn find_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let globs = build_globset(patterns)?;
    let files = freefn_utils::file::find_files(root, &globs, &freefn_utils::default_exclusion_patterns())?;
    tracing::debug!(root = %root.display(), matched = files.len(), "discovered files");
    Ok(files)
}

/// Glob patterns matching every file with one of `extensions` at any depth
pub fn extension_patterns(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| format!("**/*.{}", ext.trim_start_matches('.')))
        .collect()
}
