//! File system utilities
//!
//! Reading and writing source files, backups, and directory walks.

use chrono::Utc;
use globset::GlobSet;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory, next to the backed-up file, that timestamped backups go into
pub const BACKUP_DIR: &str = ".freefn_backups";

/// Normalize a path lexically, resolving `.` and `..` without touching the disk
pub fn normalize_path(path: &Path) -> PathBuf {
    path_clean::clean(path)
}

/// Create a timestamped backup of a file in [`BACKUP_DIR`] beside it
pub fn create_backup(file_path: &Path) -> crate::Result<PathBuf> {
    if !file_path.is_file() {
        return Err(crate::UtilError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File does not exist: {}", file_path.display()),
        )));
    }

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
    let backup_name = format!(
        "{}.backup.{}",
        file_path
            .file_name()
            .ok_or_else(|| crate::UtilError::PathOperation("Invalid file name".to_string()))?
            .to_string_lossy(),
        timestamp
    );

    let backup_dir = file_path
        .parent()
        .ok_or_else(|| crate::UtilError::PathOperation("Cannot determine parent directory".to_string()))?
        .join(BACKUP_DIR);

    ensure_dir(&backup_dir)?;

    let backup_path = backup_dir.join(backup_name);
    fs::copy(file_path, &backup_path)?;
    tracing::debug!(path = %file_path.display(), backup = %backup_path.display(), "created backup");

    Ok(backup_path)
}

/// `<file>.orig`, the sibling path an original is kept under
pub fn orig_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.as_os_str().to_os_string();
    name.push(".orig");
    PathBuf::from(name)
}

/// Move `file_path` to `<file>.orig`, deleting any previous `.orig` first.
///
/// The file itself no longer exists afterwards; the caller writes the new
/// contents.
pub fn create_orig_backup(file_path: &Path) -> crate::Result<PathBuf> {
    let orig = orig_path(file_path);
    if orig.exists() {
        fs::remove_file(&orig)?;
    }
    fs::rename(file_path, &orig)?;
    tracing::debug!(path = %file_path.display(), backup = %orig.display(), "kept original");
    Ok(orig)
}

/// View `bytes`, read from `path`, as UTF-8.
///
/// Invalid input is an error, never decoded lossily.
pub fn decode_utf8<'b>(bytes: &'b [u8], path: &Path) -> crate::Result<&'b str> {
    std::str::from_utf8(bytes).map_err(|e| {
        crate::UtilError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is not valid UTF-8: {e}", path.display()),
        ))
    })
}

/// Write `contents` to `path`, creating parent directories as needed
pub fn write_file(path: &Path, contents: &[u8]) -> crate::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Recursively find files under `root` whose root-relative path matches `globs`.
///
/// Directories named in `exclude` are not descended into. The result is
/// sorted.
pub fn find_files(root: &Path, globs: &GlobSet, exclude: &HashSet<String>) -> crate::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(crate::UtilError::PathOperation(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !(entry.file_type().is_dir() && crate::should_exclude_path(Path::new(entry.file_name()), exclude))
    });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| crate::UtilError::PathOperation(format!("Walk error: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if globs.is_match(relative) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Ensure directory exists, creating parents as needed
pub fn ensure_dir(path: &Path) -> crate::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(crate::UtilError::PathOperation(format!(
            "Path exists but is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
