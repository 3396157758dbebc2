//! One-slot lookahead over a token source.
//!
//! The declaration parsers never rewind further than a single token. Every
//! construct that needs more context peeks, consumes, or hands one token
//! back with [`TokenStream::unget_token`]. The ungot token is restored
//! exactly, leading comment included.

use reflector_foundation::{Error, ErrorContext, Result};

use crate::token::Token;

/// Anything that can hand out tokens on demand.
pub trait TokenSource {
    /// Produces the next token. Returns EOF tokens forever once exhausted.
    fn next_token(&mut self) -> Token;

    /// Consumes the raw text up to the end of the current line.
    fn rest_of_line(&mut self) -> String;

    /// Current line in the underlying text.
    fn line(&self) -> u32;

    /// Source text between two byte offsets, or `""` when out of range.
    fn slice(&self, start: usize, end: usize) -> &str;
}

/// Builds a syntax error positioned at `token`.
#[must_use]
pub fn error_at(token: &Token, message: impl Into<String>) -> Error {
    Error::syntax(message)
        .with_context(ErrorContext::new().with_position(token.span.line, token.span.column))
}

/// Token stream with a single lookahead/unget slot.
pub struct TokenStream<S> {
    source: S,
    lookahead: Option<Token>,
    last_line: u32,
}

impl<S: TokenSource> TokenStream<S> {
    /// Wraps a token source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookahead: None,
            last_line: 1,
        }
    }

    /// Consumes and returns the next token.
    pub fn get_token(&mut self) -> Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.source.next_token(),
        };
        if !token.is_eof() {
            self.last_line = token.line();
        }
        token
    }

    /// Puts a token back. Only one token may be held at a time.
    pub fn unget_token(&mut self, token: Token) {
        debug_assert!(
            self.lookahead.is_none(),
            "token stream holds a single ungot token"
        );
        self.lookahead = Some(token);
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        let source = &mut self.source;
        self.lookahead.get_or_insert_with(|| source.next_token())
    }

    /// Returns true if the next token is the identifier `name`.
    pub fn peek_identifier(&mut self, name: &str, case_sensitive: bool) -> bool {
        let token = self.peek();
        if case_sensitive {
            token.is_identifier(name)
        } else {
            token.is_identifier_ci(name)
        }
    }

    /// Returns true if the next token is the punctuation `symbol`.
    pub fn peek_symbol(&mut self, symbol: &str) -> bool {
        self.peek().is_symbol(symbol)
    }

    /// Consumes the next token if it is `symbol`.
    pub fn match_symbol(&mut self, symbol: &str) -> bool {
        if self.peek_symbol(symbol) {
            self.get_token();
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is the identifier `name` (case-sensitive).
    pub fn match_identifier(&mut self, name: &str) -> bool {
        if self.peek_identifier(name, true) {
            self.get_token();
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is the identifier `name`, ignoring case.
    pub fn match_identifier_ci(&mut self, name: &str) -> bool {
        if self.peek_identifier(name, false) {
            self.get_token();
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is any identifier.
    pub fn get_identifier(&mut self) -> Option<Token> {
        if self.peek().is_ident() {
            Some(self.get_token())
        } else {
            None
        }
    }

    /// Requires the punctuation `symbol`.
    ///
    /// # Errors
    /// Returns "Missing '<symbol>' in <context>" positioned at the offending token.
    pub fn require_symbol(&mut self, symbol: &str, context: &str) -> Result<Token> {
        let token = self.get_token();
        if token.is_symbol(symbol) {
            Ok(token)
        } else {
            let err = error_at(&token, format!("Missing '{symbol}' in {context}"));
            self.unget_token(token);
            Err(err)
        }
    }

    /// Requires any identifier.
    ///
    /// # Errors
    /// Returns "Missing <what>" positioned at the offending token.
    pub fn require_identifier(&mut self, what: &str) -> Result<Token> {
        let token = self.get_token();
        if token.is_ident() {
            Ok(token)
        } else {
            let err = error_at(&token, format!("Missing {what}"));
            self.unget_token(token);
            Err(err)
        }
    }

    /// Requires the identifier `name` (case-sensitive).
    ///
    /// # Errors
    /// Returns "Missing '<name>' in <context>" positioned at the offending token.
    pub fn require_identifier_named(&mut self, name: &str, context: &str) -> Result<Token> {
        let token = self.get_token();
        if token.is_identifier(name) {
            Ok(token)
        } else {
            let err = error_at(&token, format!("Missing '{name}' in {context}"));
            self.unget_token(token);
            Err(err)
        }
    }

    /// Consumes the raw remainder of the current line. A held token is
    /// folded back in front of the text.
    pub fn rest_of_line(&mut self) -> String {
        let tail = self.source.rest_of_line();
        match self.lookahead.take() {
            Some(token) if !token.is_eof() => format!("{} {tail}", token.text).trim().to_string(),
            _ => tail,
        }
    }

    /// Returns true if no tokens remain.
    pub fn is_eof(&mut self) -> bool {
        self.peek().is_eof()
    }

    /// Line of the most recently consumed token.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.last_line
    }

    /// Source text between two byte offsets.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        self.source.slice(start, end)
    }

    /// The wrapped source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}
