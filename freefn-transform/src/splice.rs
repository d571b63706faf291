//! Placement of the generated block inside a header

use crate::config::FreeFnConfig;
use crate::header::GeneratedBlock;
use crate::rewrite::GeneratedFunction;
use crate::{Result, TransformError};

/// Line terminator used by a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Line ending of the first line of `text`, `Lf` when it has none
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(at) if text[..at].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Rebuild the header text with `functions` as the contents of the generated block.
///
/// An existing block keeps its sentinel lines and has everything between them
/// replaced. Without one, a fresh block followed by a blank line goes in front
/// of the last line starting with the namespace-end anchor.
pub fn splice_block(
    lines: &[&str],
    block: Option<GeneratedBlock>,
    functions: &[GeneratedFunction],
    config: &FreeFnConfig,
    ending: LineEnding,
) -> Result<String> {
    let nl = ending.as_str();
    let mut generated = String::new();
    for function in functions {
        if let Some(docs) = &function.docs {
            generated.push_str(docs);
        }
        generated.push_str(&function.definition);
    }

    let mut out = String::with_capacity(lines.iter().map(|l| l.len()).sum::<usize>() + generated.len());
    match block {
        Some(GeneratedBlock { begin, end }) => {
            tracing::debug!(begin = begin + 1, end = end + 1, "replacing generated block");
            lines[..=begin].iter().for_each(|l| out.push_str(l));
            out.push_str(&generated);
            lines[end..].iter().for_each(|l| out.push_str(l));
        }
        None => {
            let anchor = lines
                .iter()
                .rposition(|l| l.starts_with(config.namespace_end.as_str()))
                .ok_or_else(|| TransformError::MissingAnchor {
                    anchor: config.namespace_end.clone(),
                })?;
            tracing::debug!(line = anchor + 1, "inserting generated block");
            lines[..anchor].iter().for_each(|l| out.push_str(l));
            out.push_str(&config.block_begin);
            out.push_str(nl);
            out.push_str(&generated);
            out.push_str(&config.block_end);
            out.push_str(nl);
            out.push_str(nl);
            lines[anchor..].iter().for_each(|l| out.push_str(l));
        }
    }
    Ok(out)
}
