//! Free-function generation for marked member functions

use super::Transformer;
use crate::config::FreeFnConfig;
use crate::header::scan_header;
use crate::rewrite::{rewrite_declaration, GeneratedFunction};
use crate::splice::{splice_block, LineEnding};
use crate::types::{BackupPolicy, SourceTransform, TransformationType};
use crate::Result;
use std::path::Path;

/// Scan, rewrite and splice one header.
///
/// A header without marked functions comes back unchanged, even when it still
/// holds a generated block.
pub fn transform_header(text: &str, config: &FreeFnConfig) -> Result<SourceTransform> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let scan = scan_header(&lines, config)?;

    if scan.functions.is_empty() {
        if let Some(block) = scan.block {
            tracing::warn!(
                line = block.begin + 1,
                "generated block present but no marked functions; leaving it alone"
            );
        }
        return Ok(SourceTransform::unchanged(text));
    }

    let ending = LineEnding::detect(text);
    let generated = scan
        .functions
        .iter()
        .map(|marked| rewrite_declaration(marked, config, ending))
        .collect::<Result<Vec<GeneratedFunction>>>()?;

    let output = splice_block(&lines, scan.block, &generated, config, ending)?;
    let changed = output != text;
    Ok(SourceTransform {
        output,
        changed,
        freed: generated.into_iter().map(|g| g.summary).collect(),
    })
}

/// Generates free functions in place, without backups
#[derive(Debug, Clone, Default)]
pub struct FreeFunctionTransformer {
    config: FreeFnConfig,
    backup_policy: BackupPolicy,
}

impl FreeFunctionTransformer {
    pub fn new(config: FreeFnConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backup_policy: BackupPolicy::None,
        })
    }

    /// Keep backups of rewritten headers
    pub fn with_backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.backup_policy = policy;
        self
    }
}

impl Transformer for FreeFunctionTransformer {
    fn transformation_type(&self) -> TransformationType {
        TransformationType::FreeFunctions
    }

    fn transform_source(&self, source: &str, path: &Path) -> Result<SourceTransform> {
        let transform = transform_header(source, &self.config)?;
        for freed in &transform.freed {
            tracing::info!(
                path = %path.display(),
                class = %freed.class_name,
                function = %freed.name,
                line = freed.line,
                "freeing member function"
            );
        }
        Ok(transform)
    }

    fn backup_policy(&self) -> BackupPolicy {
        self.backup_policy
    }
}
