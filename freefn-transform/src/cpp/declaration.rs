//! Parsed form of a member function declaration
//!
//! A declaration is split into template head, return type, name, parameter
//! list and trailing qualifiers. Member-only specifiers are removed during
//! parsing and remembered as flags.

use super::{group_end, matching_angle, matching_bracket, render, split_top_level, top_level, Token, TokenKind};
use crate::{Result, TransformError};

/// Keywords that make up a type on their own and so can never be a parameter name
const TYPE_KEYWORDS: &[&str] = &[
    "void", "bool", "char", "wchar_t", "char8_t", "char16_t", "char32_t", "short", "int", "long",
    "signed", "unsigned", "float", "double", "auto", "const", "volatile", "struct", "class",
    "enum", "typename",
];

/// Identifiers that take a parenthesised operand and so never name the function
const NON_NAME_CALLEES: &[&str] = &[
    "decltype", "noexcept", "alignas", "alignof", "sizeof", "requires", "__attribute__",
    "__declspec", "throw",
];

/// Specifiers that are meaningless or invalid on a namespace-scope function
const MEMBER_SPECIFIERS: &[&str] = &["virtual", "static", "inline", "explicit", "friend"];

/// Reference qualifier on an instance method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefQualifier {
    /// `&`
    Lvalue,
    /// `&&`
    Rvalue,
}

/// One function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// All tokens, including any default argument
    pub tokens: Vec<Token>,
    /// Index into `tokens` of the declarator name
    pub name_at: Option<usize>,
    /// Whether the parameter is a pack (`Args &&...args`)
    pub is_pack: bool,
}

impl Parameter {
    /// Parse a parameter from its tokens
    pub fn parse(tokens: &[Token]) -> Self {
        let default_at = top_level(tokens).into_iter().find(|&i| tokens[i].is_punct("="));
        let declarator = &tokens[..default_at.unwrap_or(tokens.len())];
        let is_pack = top_level(declarator)
            .into_iter()
            .any(|i| declarator[i].is_punct("..."));

        Self {
            tokens: tokens.to_vec(),
            name_at: declarator_name(declarator),
            is_pack,
        }
    }

    /// The declarator name, if the parameter has one
    pub fn name(&self) -> Option<&str> {
        self.name_at.map(|i| self.tokens[i].text.as_str())
    }

    /// The parameter as written, default argument included
    pub fn render(&self) -> String {
        render(&self.tokens)
    }
}

/// Find the name introduced by a parameter declarator.
fn declarator_name(declarator: &[Token]) -> Option<usize> {
    let top = top_level(declarator);

    // Function pointer or reference: `void (*cb)(int)`
    for &i in &top {
        if declarator[i].is_punct("(") {
            let close = matching_bracket(declarator, i)?;
            let inner = &declarator[i + 1..close];
            let pointer_like = inner
                .first()
                .is_some_and(|t| t.is_punct("*") || t.is_punct("&") || t.is_punct("&&"));
            if pointer_like && inner.last().is_some_and(Token::is_identifier) && close - 1 > i + 1 {
                return Some(close - 1);
            }
        }
    }

    // Drop trailing array extents: `int a[4]`
    let mut end = top.len();
    while end > 0 && declarator[top[end - 1]].is_punct("[") {
        end -= 1;
    }
    let last = *top[..end].last()?;
    let token = &declarator[last];
    if !token.is_identifier() || TYPE_KEYWORDS.contains(&token.text.as_str()) {
        return None;
    }
    if last == 0 {
        // A lone identifier is a type
        return None;
    }
    if declarator[last - 1].is_punct("::") {
        return None;
    }
    Some(last)
}

/// A member function declaration stripped of member-only syntax
#[derive(Debug, Clone)]
pub struct Declaration {
    /// `template <...>` heads, in order
    pub template_head: Vec<Token>,
    /// Return type and remaining decl-specifiers
    pub head: Vec<Token>,
    /// Function name
    pub name: Token,
    /// Parameters in order
    pub params: Vec<Parameter>,
    /// Everything after the parameter list that survives (`noexcept`, trailing return type)
    pub trailing: Vec<Token>,
    pub is_static: bool,
    pub is_const: bool,
    pub is_volatile: bool,
    pub ref_qualifier: Option<RefQualifier>,
}

impl Declaration {
    /// Parse a declaration from its tokens, without the terminating `;` or body.
    ///
    /// Identifiers listed in `strip_macros` are removed from the declaration head.
    pub fn parse(tokens: &[Token], strip_macros: &[String]) -> Result<Self> {
        let line = tokens.first().map_or(0, |t| t.line);
        let parse_error = |message: String| TransformError::Parse { line, message };

        // Template heads
        let mut rest = tokens;
        let mut template_head = Vec::new();
        while rest.first().is_some_and(|t| t.is_ident("template")) {
            let close = matching_angle(rest, 1)
                .ok_or_else(|| parse_error("unbalanced template parameter list".to_string()))?;
            template_head.extend_from_slice(&rest[..=close]);
            rest = &rest[close + 1..];
        }

        // The parameter list is the first top-level group preceded by a plain identifier
        let mut open = None;
        for i in top_level(rest) {
            let token = &rest[i];
            if token.is_ident("operator") {
                return Err(parse_error("operator functions cannot be made free".to_string()));
            }
            if token.is_punct("(") && i > 0 {
                let previous = &rest[i - 1];
                if previous.is_identifier() && !NON_NAME_CALLEES.contains(&previous.text.as_str()) {
                    open = Some(i);
                    break;
                }
            }
        }
        let open = open.ok_or_else(|| parse_error("declaration has no parameter list".to_string()))?;
        let close = group_end(rest, open)
            .ok_or_else(|| parse_error("unbalanced parameter list".to_string()))?;

        let name = rest[open - 1].clone();
        let mut is_static = false;
        let mut head = Vec::with_capacity(open);
        for token in &rest[..open - 1] {
            if token.kind == TokenKind::Identifier {
                match token.text.as_str() {
                    "static" => {
                        is_static = true;
                        continue;
                    }
                    text if MEMBER_SPECIFIERS.contains(&text) => continue,
                    text if strip_macros.iter().any(|m| m == text) => continue,
                    _ => {}
                }
            }
            head.push(token.clone());
        }
        if head.is_empty() {
            return Err(parse_error(format!("`{}` has no return type", name.text)));
        }

        let params = parse_parameters(&rest[open + 1..close]);
        for (index, param) in params.iter().enumerate() {
            if param.name_at.is_none() {
                return Err(parse_error(format!(
                    "parameter {} of `{}` (`{}`) has no name and cannot be forwarded",
                    index + 1,
                    name.text,
                    param.render()
                )));
            }
        }

        let qualifiers = parse_trailing(&rest[close + 1..])
            .map_err(|message| parse_error(format!("`{}`: {message}", name.text)))?;

        Ok(Self {
            template_head,
            head,
            name,
            params,
            trailing: qualifiers.kept,
            is_static,
            is_const: qualifiers.is_const,
            is_volatile: qualifiers.is_volatile,
            ref_qualifier: qualifiers.ref_qualifier,
        })
    }
}

fn parse_parameters(tokens: &[Token]) -> Vec<Parameter> {
    if tokens.len() == 1 && tokens[0].is_ident("void") {
        return Vec::new();
    }
    split_top_level(tokens, ",")
        .into_iter()
        .map(Parameter::parse)
        .collect()
}

/// What follows the parameter list, split into object qualifiers and the rest
#[derive(Debug, Default)]
struct TrailingQualifiers {
    kept: Vec<Token>,
    is_const: bool,
    is_volatile: bool,
    ref_qualifier: Option<RefQualifier>,
}

/// Separate the qualifiers after the parameter list.
///
/// cv- and ref-qualifiers move onto the object parameter; `override`, `final`
/// and `= 0` are dropped. Requires-clauses are rejected.
fn parse_trailing(tokens: &[Token]) -> std::result::Result<TrailingQualifiers, String> {
    let mut qualifiers = TrailingQualifiers::default();
    let mut in_trailing_return = false;

    let top = top_level(tokens);
    let mut cursor = 0;
    while cursor < top.len() {
        let i = top[cursor];
        let token = &tokens[i];
        let group_close = group_end(tokens, i);

        if token.is_ident("requires") {
            return Err("requires-clauses cannot be carried onto a free function".to_string());
        }
        if !in_trailing_return {
            if token.is_ident("const") && !qualifiers.is_const {
                qualifiers.is_const = true;
                cursor += 1;
                continue;
            }
            if token.is_ident("volatile") && !qualifiers.is_volatile {
                qualifiers.is_volatile = true;
                cursor += 1;
                continue;
            }
            if token.is_punct("&") || token.is_punct("&&") {
                qualifiers.ref_qualifier = Some(if token.is_punct("&") {
                    RefQualifier::Lvalue
                } else {
                    RefQualifier::Rvalue
                });
                cursor += 1;
                continue;
            }
            if token.is_ident("override") || token.is_ident("final") {
                cursor += 1;
                continue;
            }
            if token.is_punct("=") {
                let value = top.get(cursor + 1).map(|&j| tokens[j].text.as_str());
                return match value {
                    Some("0") if cursor + 2 == top.len() => Ok(qualifiers),
                    Some("default") | Some("delete") => {
                        Err("defaulted or deleted functions cannot be made free".to_string())
                    }
                    _ => Err("unexpected initialiser after parameter list".to_string()),
                };
            }
            if token.is_punct("->") {
                in_trailing_return = true;
            }
        }

        let end = group_close.unwrap_or(i);
        qualifiers.kept.extend_from_slice(&tokens[i..=end]);
        cursor += 1;
    }

    Ok(qualifiers)
}
