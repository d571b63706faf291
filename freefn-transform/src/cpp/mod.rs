//! Minimal C++ front end used by the free-function generator
//!
//! Nothing here is a general C++ parser. It understands declarations well
//! enough to rewrite them: balanced brackets, template argument lists and
//! top-level separators.

pub mod declaration;
pub mod lexer;

pub use declaration::{Declaration, Parameter, RefQualifier};
pub use lexer::{tokenize, Lexer, Token, TokenKind};

/// Index of the token closing the group opened at `open`.
///
/// Handles `(`, `[` and `{` by bracket matching and `<` by template
/// disambiguation (see [`matching_angle`]). Returns `None` when the token does
/// not open a group or the group is unbalanced.
pub fn group_end(tokens: &[Token], open: usize) -> Option<usize> {
    let token = tokens.get(open)?;
    if token.kind != TokenKind::Punct {
        return None;
    }
    match token.text.as_str() {
        "(" | "[" | "{" => matching_bracket(tokens, open),
        "<" => matching_angle(tokens, open),
        _ => None,
    }
}

/// Match `(`, `[` or `{` against its closer, ignoring angle brackets.
pub fn matching_bracket(tokens: &[Token], open: usize) -> Option<usize> {
    let mut stack: Vec<&str> = Vec::new();
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text.as_str() {
            "(" => stack.push(")"),
            "[" => stack.push("]"),
            "{" => stack.push("}"),
            closer @ (")" | "]" | "}") => {
                if stack.pop() != Some(closer) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
        if i == open && stack.is_empty() {
            return None;
        }
    }
    None
}

/// Match a `<` against the `>` closing its template argument list.
///
/// A `<` only opens a template argument list when it directly follows an
/// identifier and a closing `>` exists before the enclosing bracket closes or
/// a `;` appears. Anything else is a comparison and yields `None`, so a
/// default argument such as `x = a < b` cannot swallow the rest of the
/// parameter list. Each call scans forward once, so runs of comparisons cost
/// linear time per `<`.
pub fn matching_angle(tokens: &[Token], open: usize) -> Option<usize> {
    if !tokens.get(open)?.is_punct("<") {
        return None;
    }
    if open == 0 || !tokens[open - 1].is_identifier() {
        return None;
    }

    let mut i = open + 1;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                ">" => return Some(i),
                "(" | "[" | "{" => {
                    i = matching_bracket(tokens, i)?;
                }
                ")" | "]" | "}" | ";" => return None,
                // A nested list that fails to close ends at the same
                // terminator this one would, so neither can match.
                "<" if tokens[i - 1].is_identifier() => {
                    i = matching_angle(tokens, i)?;
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Indices of the tokens at nesting depth zero.
///
/// Group openers are included; their contents and closers are skipped.
pub fn top_level(tokens: &[Token]) -> Vec<usize> {
    let mut indices = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        indices.push(i);
        if let Some(close) = group_end(tokens, i) {
            i = close;
        }
        i += 1;
    }
    indices
}

/// Split `tokens` at top-level occurrences of the punctuator `separator`.
///
/// An empty input yields no pieces.
pub fn split_top_level<'t>(tokens: &'t [Token], separator: &str) -> Vec<&'t [Token]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for i in top_level(tokens) {
        if tokens[i].is_punct(separator) {
            pieces.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    pieces.push(&tokens[start..]);
    pieces
}

/// Render tokens back to source text.
///
/// Any run of whitespace collapses to a single space and whitespace in front
/// of the first token is dropped, so multi-line declarations render on one
/// line.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && !token.leading.is_empty() {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

/// Like [`render`] but keeps a single space for the first token's leading whitespace
pub fn render_spaced(tokens: &[Token]) -> String {
    match tokens.first() {
        Some(first) if !first.leading.is_empty() => format!(" {}", render(tokens)),
        _ => render(tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source, 1).unwrap()
    }

    #[test]
    fn test_template_angles_match() {
        let tokens = lex("result<std::vector<std::pair<a, b>>> f()");
        let close = matching_angle(&tokens, 1).unwrap();
        assert_eq!(close, 15);
        assert_eq!(tokens[close + 1].text, "f");
    }

    #[test]
    fn test_comparison_is_not_a_template() {
        let tokens = lex("(int x = a < b, int y)");
        let lt = tokens.iter().position(|t| t.is_punct("<")).unwrap();
        assert_eq!(matching_angle(&tokens, lt), None);

        let inner = &tokens[1..tokens.len() - 1];
        let params = split_top_level(inner, ",");
        assert_eq!(params.len(), 2);
        assert_eq!(render(params[1]), "int y");
    }

    #[test]
    fn test_long_comparison_chains_stay_linear() {
        let terms: Vec<String> = (0..64).map(|i| format!("a{i} < b{i}")).collect();
        let source = format!("(bool x = {}, int y)", terms.join(" || "));
        let tokens = lex(&source);

        let first = tokens.iter().position(|t| t.is_punct("<")).unwrap();
        assert_eq!(matching_angle(&tokens, first), None);

        let inner = &tokens[1..tokens.len() - 1];
        let params = split_top_level(inner, ",");
        assert_eq!(params.len(), 2);
        assert_eq!(render(params[1]), "int y");
    }

    #[test]
    fn test_nested_comparison_inside_template_arguments() {
        let tokens = lex("f<a<b, (1 < 2)> x");
        // `a<b, ...>` closes at the only `>`, leaving `f<` unmatched
        assert_eq!(matching_angle(&tokens, 3), Some(11));
        assert_eq!(matching_angle(&tokens, 1), None);
    }

    #[test]
    fn test_number_before_angle_is_comparison() {
        let tokens = lex("1 < 2 > 0");
        assert_eq!(matching_angle(&tokens, 1), None);
    }

    #[test]
    fn test_split_respects_groups() {
        let tokens = lex("std::pair<int, int> p, std::function<void(int, int)> f, int a[2] = {1, 2}");
        let pieces = split_top_level(&tokens, ",");
        assert_eq!(pieces.len(), 3);
        assert_eq!(render(pieces[0]), "std::pair<int, int> p");
        assert_eq!(render(pieces[2]), "int a[2] = {1, 2}");
    }

    #[test]
    fn test_unbalanced_brackets() {
        let tokens = lex("( ]");
        assert_eq!(matching_bracket(&tokens, 0), None);
        let tokens = lex("(a");
        assert_eq!(group_end(&tokens, 0), None);
    }

    #[test]
    fn test_render_collapses_whitespace() {
        let tokens = lex("  const   file_handle\n      &o");
        assert_eq!(render(&tokens), "const file_handle &o");
        assert_eq!(render_spaced(&tokens), " const file_handle &o");
    }
}
