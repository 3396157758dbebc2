//! Token types for C-family header text.
//!
//! Tokens are the output of the lexer and the input to the declaration
//! parsers. Every token keeps its raw lexeme and the comment that preceded
//! it, so that documentation can be attached to the declaration it leads.

use std::fmt;

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// The raw source text of the token.
    pub text: String,
    /// Source location of this token.
    pub span: Span,
    /// Comment text that directly preceded this token, markers included.
    pub comment: Option<String>,
}

impl Token {
    /// Creates a new token with no leading comment.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            comment: None,
        }
    }

    /// Creates an end-of-file token.
    #[must_use]
    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    /// Attaches a leading comment.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Line the token starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.line
    }

    /// Returns true at end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this is an identifier.
    #[must_use]
    pub const fn is_ident(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier)
    }

    /// Returns the identifier text, if this is an identifier.
    #[must_use]
    pub fn ident(&self) -> Option<&str> {
        self.is_ident().then_some(self.text.as_str())
    }

    /// Returns true if this is the identifier `name` (case-sensitive).
    #[must_use]
    pub fn is_identifier(&self, name: &str) -> bool {
        self.is_ident() && self.text == name
    }

    /// Returns true if this is the identifier `name`, ignoring ASCII case.
    #[must_use]
    pub fn is_identifier_ci(&self, name: &str) -> bool {
        self.is_ident() && self.text.eq_ignore_ascii_case(name)
    }

    /// Returns true if this is the punctuation `symbol`.
    #[must_use]
    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.kind, TokenKind::Symbol) && self.text == symbol
    }

    /// Returns true for integer, float, string and character literals.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Str(_) | TokenKind::Char(_)
        )
    }

    /// Returns the integer value of an integer literal.
    #[must_use]
    pub const fn int_value(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Text used when a token is folded into a metadata value: string
    /// literals lose their quotes, everything else is the raw lexeme.
    #[must_use]
    pub fn value_text(&self) -> &str {
        match &self.kind {
            TokenKind::Str(s) => s,
            _ => &self.text,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// Token classes.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword, e.g. `UPROPERTY`, `int32`, `class`.
    Identifier,
    /// Integer literal, decimal or hex.
    Int(i64),
    /// Floating point literal, e.g. `1.5f`.
    Float(f64),
    /// String literal; the payload is the text between the quotes.
    Str(String),
    /// Character literal.
    Char(char),
    /// Punctuation, e.g. `(`, `::`, `<`.
    Symbol,
    /// End of input.
    Eof,
    /// Lexer error.
    Error(String),
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Char(_) => "character",
            Self::Symbol => "symbol",
            Self::Eof => "end of file",
            Self::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> Token {
        Token::new(TokenKind::Identifier, text, Span::default())
    }

    #[test]
    fn identifier_matching() {
        let tok = ident("meta");
        assert!(tok.is_identifier("meta"));
        assert!(!tok.is_identifier("Meta"));
        assert!(tok.is_identifier_ci("META"));
        assert_eq!(tok.ident(), Some("meta"));
    }

    #[test]
    fn symbol_is_not_identifier() {
        let tok = Token::new(TokenKind::Symbol, "::", Span::default());
        assert!(tok.is_symbol("::"));
        assert!(!tok.is_ident());
        assert_eq!(tok.ident(), None);
    }

    #[test]
    fn value_text_strips_string_quotes() {
        let tok = Token::new(
            TokenKind::Str("Hit points".into()),
            "\"Hit points\"",
            Span::default(),
        );
        assert_eq!(tok.value_text(), "Hit points");
        assert_eq!(ident("Combat").value_text(), "Combat");
    }

    #[test]
    fn display_eof() {
        assert_eq!(Token::eof(Span::default()).to_string(), "end of file");
    }
}
