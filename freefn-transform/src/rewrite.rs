//! Rewriting of marked member functions into free functions
//!
//! Each marked declaration becomes an `inline` namespace-scope function that
//! forwards its arguments to the member. Instance methods gain an explicit
//! `self` parameter.

use crate::config::FreeFnConfig;
use crate::cpp::{render, render_spaced, Declaration, RefQualifier, Token, TokenKind};
use crate::header::MarkedFunction;
use crate::splice::LineEnding;
use crate::types::FreedFunction;
use crate::Result;

/// Documentation line inserted for the synthesized object parameter
pub const SELF_PARAM_DOC: &str = "\\param self The object whose member function to call.";

/// Text generated for one marked function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFunction {
    /// Relocated documentation comment
    pub docs: Option<String>,
    /// Free function definition, ending in a line terminator
    pub definition: String,
    pub summary: FreedFunction,
}

/// Rewrite one marked member function.
pub fn rewrite_declaration(
    marked: &MarkedFunction,
    config: &FreeFnConfig,
    ending: LineEnding,
) -> Result<GeneratedFunction> {
    let mut decl = Declaration::parse(&marked.tokens, &config.strip_macros)?;
    let class = marked.class_name.as_str();

    qualify_nested_types(&mut decl.head, class, &config.nested_types, None);
    qualify_nested_types(&mut decl.trailing, class, &config.nested_types, None);
    for param in &mut decl.params {
        let name_at = param.name_at;
        qualify_nested_types(&mut param.tokens, class, &config.nested_types, name_at);
    }

    let nl = ending.as_str();
    let mut definition = String::new();
    if !decl.template_head.is_empty() {
        definition.push_str(&render(&decl.template_head));
        definition.push(' ');
    }
    definition.push_str("inline ");
    definition.push_str(&render(&decl.head));
    definition.push_str(&render_spaced(std::slice::from_ref(&decl.name)));

    let mut params: Vec<String> = Vec::with_capacity(decl.params.len() + 1);
    if !decl.is_static {
        params.push(self_parameter(class, &decl));
    }
    params.extend(decl.params.iter().map(|p| p.render()));
    definition.push('(');
    definition.push_str(&params.join(", "));
    definition.push(')');
    definition.push_str(&render_spaced(&decl.trailing));

    let callee = if decl.is_static {
        format!("{class}::{}", decl.name.text)
    } else if decl.ref_qualifier == Some(RefQualifier::Rvalue) {
        format!("std::move(self).{}", decl.name.text)
    } else {
        format!("self.{}", decl.name.text)
    };
    let arguments: Vec<String> = decl
        .params
        .iter()
        .filter_map(|p| {
            p.name().map(|name| {
                let pack = if p.is_pack { "..." } else { "" };
                format!("std::forward<decltype({name})>({name}){pack}")
            })
        })
        .collect();

    definition.push_str(nl);
    definition.push('{');
    definition.push_str(nl);
    definition.push_str(&format!("  return {callee}({});", arguments.join(", ")));
    definition.push_str(nl);
    definition.push('}');
    definition.push_str(nl);

    let docs = marked.docs.as_ref().map(|docs| {
        if decl.is_static {
            docs.clone()
        } else {
            document_self(docs, nl)
        }
    });

    tracing::debug!(
        class = %class,
        function = %decl.name.text,
        is_static = decl.is_static,
        is_const = decl.is_const,
        "generated free function"
    );

    Ok(GeneratedFunction {
        docs,
        definition,
        summary: FreedFunction {
            class_name: class.to_string(),
            name: decl.name.text.clone(),
            is_static: decl.is_static,
            line: marked.line,
        },
    })
}

/// The explicit object parameter for an instance method
fn self_parameter(class: &str, decl: &Declaration) -> String {
    let reference = if decl.ref_qualifier == Some(RefQualifier::Rvalue) {
        "&&"
    } else {
        "&"
    };
    let cv = match (decl.is_const, decl.is_volatile) {
        (true, true) => "const volatile ",
        (true, false) => "const ",
        (false, true) => "volatile ",
        (false, false) => "",
    };
    format!("{cv}{class} {reference}self")
}

/// Prefix unqualified nested type names with `class::`.
///
/// The token at `skip` (a parameter's own name) is left alone, as is anything
/// already qualified or accessed as a member.
pub fn qualify_nested_types(tokens: &mut [Token], class: &str, nested: &[String], skip: Option<usize>) {
    for i in 0..tokens.len() {
        if Some(i) == skip || tokens[i].kind != TokenKind::Identifier {
            continue;
        }
        if !nested.iter().any(|n| *n == tokens[i].text) {
            continue;
        }
        let qualified = i > 0
            && (tokens[i - 1].is_punct("::") || tokens[i - 1].is_punct(".") || tokens[i - 1].is_punct("->"));
        if qualified {
            continue;
        }
        tokens[i].text = format!("{class}::{}", tokens[i].text);
    }
}

/// Insert the `self` parameter documentation in front of the first `\param`
fn document_self(docs: &str, nl: &str) -> String {
    match docs.find("\\param") {
        Some(at) => format!("{}{SELF_PARAM_DOC}{nl}{}", &docs[..at], &docs[at..]),
        None => docs.to_string(),
    }
}
