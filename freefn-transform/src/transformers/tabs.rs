//! Tab to space expansion

use super::Transformer;
use crate::types::{BackupPolicy, FileTransform, SourceTransform, TransformationType};
use crate::Result;
use std::path::Path;

/// Replace every tab with spaces up to the next multiple of `width`.
///
/// Columns count bytes and restart after `\n` or `\r`. A width of zero
/// deletes tabs. Any encoding works.
pub fn expand_tabs_bytes(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut column = 0usize;
    for &b in bytes {
        match b {
            b'\t' => {
                if width > 0 {
                    let pad = width - column % width;
                    out.resize(out.len() + pad, b' ');
                    column += pad;
                }
            }
            b'\n' | b'\r' => {
                out.push(b);
                column = 0;
            }
            _ => {
                out.push(b);
                column += 1;
            }
        }
    }
    out
}

/// [`expand_tabs_bytes`] over text
pub fn expand_tabs(text: &str, width: usize) -> String {
    // Only tab bytes are replaced, so valid UTF-8 stays valid
    String::from_utf8_lossy(&expand_tabs_bytes(text.as_bytes(), width)).into_owned()
}

/// Expands tabs, keeping the previous contents as `<file>.orig`
#[derive(Debug, Clone)]
pub struct TabExpander {
    tab_width: usize,
}

impl TabExpander {
    pub fn new(tab_width: usize) -> Self {
        Self { tab_width }
    }
}

impl Default for TabExpander {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Transformer for TabExpander {
    fn transformation_type(&self) -> TransformationType {
        TransformationType::ExpandTabs
    }

    fn transform_source(&self, source: &str, path: &Path) -> Result<SourceTransform> {
        let transform = self.transform_bytes(source.as_bytes(), path)?;
        Ok(SourceTransform {
            output: String::from_utf8_lossy(&transform.output).into_owned(),
            changed: transform.changed,
            freed: transform.freed,
        })
    }

    fn transform_bytes(&self, source: &[u8], path: &Path) -> Result<FileTransform> {
        if !source.contains(&b'\t') {
            tracing::debug!(path = %path.display(), "no tabs");
            return Ok(FileTransform {
                output: source.to_vec(),
                changed: false,
                freed: Vec::new(),
            });
        }
        tracing::info!("Expanding tabs in {}", path.display());
        Ok(FileTransform {
            output: expand_tabs_bytes(source, self.tab_width),
            changed: true,
            freed: Vec::new(),
        })
    }

    fn backup_policy(&self) -> BackupPolicy {
        BackupPolicy::OrigSuffix
    }
}
