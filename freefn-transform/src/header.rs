//! Line scanner for C++ headers
//!
//! Walks a header once, tracking the enclosing class, collecting every
//! declaration behind the marker macro together with its documentation
//! comment, and locating any previously generated block.

use crate::config::FreeFnConfig;
use crate::cpp::{group_end, matching_angle, Lexer, Token};
use crate::{Result, TransformError};

/// A declaration flagged with the marker macro
#[derive(Debug, Clone)]
pub struct MarkedFunction {
    /// Class the declaration appeared in
    pub class_name: String,
    /// Declaration tokens, without the terminating `;` or body
    pub tokens: Vec<Token>,
    /// Documentation comment in front of the marker, dedented
    pub docs: Option<String>,
    /// 1-based line of the marker
    pub line: usize,
}

/// Line indices (0-based) of an existing generated block's sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedBlock {
    pub begin: usize,
    pub end: usize,
}

/// Everything found in one pass over a header
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub functions: Vec<MarkedFunction>,
    pub block: Option<GeneratedBlock>,
}

/// Scan header lines (each including its line terminator).
pub fn scan_header(lines: &[&str], config: &FreeFnConfig) -> Result<ScanResult> {
    let mut result = ScanResult::default();
    let mut current_class: Option<String> = None;
    let mut begin: Option<usize> = None;
    let mut end: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.contains(config.block_begin.as_str()) {
            if begin.is_some() {
                return Err(TransformError::UnbalancedBlock {
                    line: idx + 1,
                    message: "second begin sentinel".to_string(),
                });
            }
            begin = Some(idx);
            continue;
        }
        if line.contains(config.block_end.as_str()) {
            if begin.is_none() || end.is_some() {
                return Err(TransformError::UnbalancedBlock {
                    line: idx + 1,
                    message: "end sentinel without a matching begin".to_string(),
                });
            }
            end = Some(idx);
            continue;
        }
        if begin.is_some() && end.is_none() {
            // Generated code is owned by us and never rescanned
            continue;
        }

        if let Some(name) = class_name(line, config) {
            tracing::trace!(line = idx + 1, class = %name, "entering class");
            current_class = Some(name);
            continue;
        }

        let Some(rest) = after_marker(line, &config.marker) else {
            continue;
        };
        let class_name = current_class
            .clone()
            .ok_or(TransformError::NoEnclosingClass { line: idx + 1 })?;
        let tokens = collect_declaration(lines, idx, rest, config.max_lookahead)?;
        let indent = &line[..line.len() - line.trim_start().len()];
        let docs = doc_comment(lines, idx, indent, config.max_lookahead);

        tracing::debug!(
            line = idx + 1,
            class = %class_name,
            documented = docs.is_some(),
            "found marked declaration"
        );
        result.functions.push(MarkedFunction {
            class_name,
            tokens,
            docs,
            line: idx + 1,
        });
    }

    match (begin, end) {
        (Some(begin), Some(end)) => result.block = Some(GeneratedBlock { begin, end }),
        (Some(begin), None) => {
            return Err(TransformError::UnbalancedBlock {
                line: begin + 1,
                message: "begin sentinel is never closed".to_string(),
            })
        }
        _ => {}
    }

    Ok(result)
}

/// The text after the marker if `line` starts with it.
fn after_marker<'l>(line: &'l str, marker: &str) -> Option<&'l str> {
    let rest = line.trim_start().strip_prefix(marker)?;
    match rest.chars().next() {
        Some(c) if c == '_' || c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

/// Name of the class introduced on `line`, if any.
///
/// Only definitions starting in column 0 count. Forward declarations do not
/// change the enclosing class.
fn class_name(line: &str, config: &FreeFnConfig) -> Option<String> {
    if !(line.starts_with("class") || line.starts_with("struct") || line.starts_with("template")) {
        return None;
    }
    let tokens: Vec<Token> = Lexer::new(line, 1).collect::<Result<_>>().ok()?;

    let mut i = 0;
    if tokens.first()?.is_ident("template") {
        i = matching_angle(&tokens, 1)? + 1;
    }
    if !(tokens.get(i)?.is_ident("class") || tokens.get(i)?.is_ident("struct")) {
        return None;
    }
    i += 1;

    loop {
        let token = tokens.get(i)?;
        if config.class_decl_macros.iter().any(|m| token.is_ident(m)) {
            i += 1;
        } else if token.is_punct("[") {
            i = group_end(&tokens, i)? + 1;
        } else if (token.is_ident("alignas") || token.is_ident("__declspec"))
            && tokens.get(i + 1).is_some_and(|t| t.is_punct("("))
        {
            i = group_end(&tokens, i + 1)? + 1;
        } else {
            break;
        }
    }

    let name = tokens.get(i)?;
    if !name.is_identifier() {
        return None;
    }
    let forward_declaration = tokens.get(i + 1).is_some_and(|t| t.is_punct(";"));
    if forward_declaration {
        return None;
    }
    Some(name.text.clone())
}

/// Collect the tokens of the declaration following the marker on line `idx`.
///
/// Stops at the first top-level `;` or body `{`. Fails when neither shows up
/// within `max_lookahead` lines.
fn collect_declaration(
    lines: &[&str],
    idx: usize,
    rest_of_marker_line: &str,
    max_lookahead: usize,
) -> Result<Vec<Token>> {
    let window_end = (idx + 1 + max_lookahead).min(lines.len());
    let mut text = String::from(rest_of_marker_line);
    for line in &lines[idx + 1..window_end] {
        text.push_str(line);
    }

    let mut depth = 0usize;
    let mut tokens = Vec::new();
    let mut lexer = Lexer::new(&text, idx + 1);
    while let Some(token) = lexer.next_token()? {
        if token.is_punct("(") || token.is_punct("[") {
            depth += 1;
        } else if token.is_punct(")") || token.is_punct("]") || token.is_punct("}") {
            depth = depth.saturating_sub(1);
        } else if token.is_punct("{") {
            if depth == 0 {
                return Ok(tokens);
            }
            depth += 1;
        } else if token.is_punct(";") && depth == 0 {
            return Ok(tokens);
        }
        tokens.push(token);
    }

    Err(TransformError::UnterminatedDeclaration {
        line: idx + 1,
        lookahead: max_lookahead,
    })
}

/// Documentation comment directly in front of line `idx`, with `indent` removed.
///
/// Recognises `/*! ... */`, `/** ... */` and runs of `//!` or `///` lines.
fn doc_comment(lines: &[&str], idx: usize, indent: &str, max_lookahead: usize) -> Option<String> {
    let previous = lines.get(idx.checked_sub(1)?)?.trim();

    let start = if previous.ends_with("*/") {
        let floor = idx.saturating_sub(max_lookahead);
        let start = (floor..idx).rev().find(|&k| lines[k].contains("/*"))?;
        let opening = lines[start].trim_start();
        if !(opening.starts_with("/*!") || opening.starts_with("/**")) {
            return None;
        }
        start
    } else if is_line_doc(previous) {
        let mut start = idx - 1;
        while start > 0 && is_line_doc(lines[start - 1].trim()) {
            start -= 1;
        }
        start
    } else {
        return None;
    };

    Some(
        lines[start..idx]
            .iter()
            .map(|line| dedent(line, indent))
            .collect(),
    )
}

fn is_line_doc(line: &str) -> bool {
    line.starts_with("//!") || line.starts_with("///")
}

/// Remove up to `indent.len()` leading whitespace characters
fn dedent<'l>(line: &'l str, indent: &str) -> &'l str {
    let mut rest = line;
    for _ in 0..indent.chars().count() {
        match rest.chars().next() {
            Some(c) if c == ' ' || c == '\t' => rest = &rest[1..],
            _ => break,
        }
    }
    rest
}
