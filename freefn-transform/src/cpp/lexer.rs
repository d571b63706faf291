//! Lexer for C++ declaration text
//!
//! Produces just enough structure for rewriting member function declarations:
//! identifiers, literals and punctuators, each carrying the whitespace that
//! preceded it so that the original spacing can be reproduced. Comments are
//! folded into that whitespace.

use crate::{Result, TransformError};

/// Kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Identifier,
    /// Numeric literal
    Number,
    /// String literal, including any encoding prefix
    StringLiteral,
    /// Character literal, including any encoding prefix
    CharLiteral,
    /// Operator or punctuator
    Punct,
}

/// A single lexeme with its leading whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Whitespace in front of the token; comments collapse to a single space
    pub leading: String,
    /// 1-based line the token starts on
    pub line: usize,
}

impl Token {
    /// Whether this is the identifier `name`
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }

    /// Whether this is the punctuator `punct`
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// Multi-character punctuators, longest first. `>>` is not one of them:
/// nested template argument lists close one `>` at a time.
const PUNCTUATORS: &[&str] = &[
    "<<=", "->*", "...", "::", "->", ".*", "&&", "||", "==", "!=", "<=", ">=", "<<", "++", "--",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "##",
];

/// Encoding prefixes that may precede a string or character literal
const LITERAL_PREFIXES: &[&str] = &["L", "u", "U", "u8"];

/// Raw string prefixes
const RAW_PREFIXES: &[&str] = &["R", "LR", "uR", "UR", "u8R"];

/// Streaming lexer over a piece of C++ source
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    /// Create a lexer; `first_line` is the 1-based line number of the first character
    pub fn new(source: &str, first_line: usize) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: first_line,
        }
    }

    /// Lex the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let leading = self.skip_trivia()?;
        let Some(c) = self.peek(0) else {
            return Ok(None);
        };
        let line = self.line;

        let (kind, text) = if is_ident_start(c) {
            self.lex_identifier_or_prefixed_literal()?
        } else if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) {
            (TokenKind::Number, self.lex_number())
        } else if c == '"' {
            (TokenKind::StringLiteral, self.lex_quoted('"', String::new())?)
        } else if c == '\'' {
            (TokenKind::CharLiteral, self.lex_quoted('\'', String::new())?)
        } else {
            (TokenKind::Punct, self.lex_punct())
        };

        Ok(Some(Token {
            kind,
            text,
            leading,
            line,
        }))
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, message: impl Into<String>) -> TransformError {
        TransformError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Consume whitespace and comments, returning the whitespace seen
    fn skip_trivia(&mut self) -> Result<String> {
        let mut leading = String::new();
        loop {
            match self.peek(0) {
                Some(c) if c.is_whitespace() => {
                    leading.push(c);
                    self.bump();
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while let Some(c) = self.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    leading.push(' ');
                }
                Some('/') if self.peek(1) == Some('*') => {
                    let start = self.line;
                    self.pos += 2;
                    loop {
                        if self.starts_with("*/") {
                            self.pos += 2;
                            break;
                        }
                        if self.bump().is_none() {
                            return Err(self.error(start, "unterminated block comment"));
                        }
                    }
                    leading.push(' ');
                }
                _ => return Ok(leading),
            }
        }
    }

    fn lex_identifier_or_prefixed_literal(&mut self) -> Result<(TokenKind, String)> {
        let mut ident = String::new();
        while let Some(c) = self.peek(0) {
            if !is_ident_continue(c) {
                break;
            }
            ident.push(c);
            self.bump();
        }

        match self.peek(0) {
            Some('"') if RAW_PREFIXES.contains(&ident.as_str()) => {
                Ok((TokenKind::StringLiteral, self.lex_raw_string(ident)?))
            }
            Some('"') if LITERAL_PREFIXES.contains(&ident.as_str()) => {
                Ok((TokenKind::StringLiteral, self.lex_quoted('"', ident)?))
            }
            Some('\'') if LITERAL_PREFIXES.contains(&ident.as_str()) => {
                Ok((TokenKind::CharLiteral, self.lex_quoted('\'', ident)?))
            }
            _ => Ok((TokenKind::Identifier, ident)),
        }
    }

    fn lex_number(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek(0) {
            let exponent_sign = (c == '+' || c == '-')
                && text
                    .chars()
                    .last()
                    .is_some_and(|p| matches!(p, 'e' | 'E' | 'p' | 'P'))
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            let separator = c == '\'' && self.peek(1).is_some_and(|n| n.is_ascii_alphanumeric());
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign || separator {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    /// Lex a `"..."` or `'...'` literal; `prefix` has already been consumed
    fn lex_quoted(&mut self, quote: char, prefix: String) -> Result<String> {
        let start = self.line;
        let mut text = prefix;
        text.push(quote);
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    text.push('\\');
                    match self.bump() {
                        Some(escaped) => text.push(escaped),
                        None => break,
                    }
                }
                Some('\n') | None => break,
                Some(c) if c == quote => {
                    text.push(c);
                    return Ok(text);
                }
                Some(c) => text.push(c),
            }
        }
        let what = if quote == '"' { "string" } else { "character" };
        Err(self.error(start, format!("unterminated {what} literal")))
    }

    fn lex_raw_string(&mut self, prefix: String) -> Result<String> {
        let start = self.line;
        let mut text = prefix;
        text.push('"');
        self.bump();

        let mut delimiter = String::new();
        loop {
            match self.bump() {
                Some('(') => break,
                Some(c) if c != '\n' && c != ')' && c != '\\' && !c.is_whitespace() => {
                    delimiter.push(c);
                }
                _ => return Err(self.error(start, "malformed raw string delimiter")),
            }
        }
        text.push_str(&delimiter);
        text.push('(');

        let terminator = format!("){delimiter}\"");
        loop {
            if self.starts_with(&terminator) {
                for _ in 0..terminator.chars().count() {
                    self.bump();
                }
                text.push_str(&terminator);
                return Ok(text);
            }
            match self.bump() {
                Some(c) => text.push(c),
                None => return Err(self.error(start, "unterminated raw string literal")),
            }
        }
    }

    fn lex_punct(&mut self) -> String {
        for punct in PUNCTUATORS {
            if self.starts_with(punct) {
                self.pos += punct.len();
                return (*punct).to_string();
            }
        }
        self.bump().map(String::from).unwrap_or_default()
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Lex the whole of `source`
pub fn tokenize(source: &str, first_line: usize) -> Result<Vec<Token>> {
    Lexer::new(source, first_line).collect()
}
