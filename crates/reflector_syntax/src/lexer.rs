//! Lexer for C-family header text.
//!
//! The lexer produces only what the declaration parsers need: identifiers,
//! literals and punctuation. Comments are not tokens. The comment text that
//! precedes a token is attached to it instead, with two exceptions: a `//`
//! comment that shares a line with the previous token belongs to that token
//! and is dropped, and comments before end of input ride on the EOF token.

use crate::span::Span;
use crate::stream::TokenSource;
use crate::token::{Token, TokenKind};

/// Punctuation longer than one character, longest first.
///
/// `<` and `>` are deliberately absent from every entry: template argument
/// lists such as `TMap<FName, TArray<int32>>` must close one bracket at a time.
const MULTI_CHAR_SYMBOLS: &[&str] = &[
    "...", "::", "->", "&&", "||", "==", "!=", "++", "--", "+=", "-=", "*=", "/=", "|=", "&=",
    "^=", "%=", "##",
];

/// Lexer for header source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Line the previous token ended on; 0 before the first token.
    last_token_line: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            last_token_line: 0,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let comment = self.skip_trivia();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token::eof(Span::point(start, start_line, start_column)).with_comment(comment);
        };

        let kind = match c {
            '"' => self.scan_string(),
            '\'' => self.scan_char(),
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if self.peek_char_n(1).is_some_and(|n| n.is_ascii_digit()) => self.scan_number(),
            c if is_ident_start(c) => self.scan_identifier(),
            c if c.is_ascii_punctuation() => self.scan_symbol(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };

        self.last_token_line = self.line;
        Token {
            kind,
            text: self.source[start..self.position].to_string(),
            span: Span::new(start, self.position, start_line, start_column),
            comment,
        }
    }

    /// Tokenizes all source up to and including the EOF token.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Consumes the raw remainder of the current line and returns it trimmed.
    ///
    /// A backslash immediately before the newline continues the line.
    pub fn rest_of_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            if c == '\\' && (self.rest[1..].starts_with('\n') || self.rest[1..].starts_with("\r\n"))
            {
                self.advance();
                while self.peek_char() != Some('\n') {
                    self.advance();
                }
                self.advance();
                line.push(' ');
                continue;
            }
            line.push(c);
            self.advance();
        }
        self.last_token_line = self.line;
        line.trim().to_string()
    }

    /// Current line number (1-based).
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-based).
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The full source text.
    #[must_use]
    pub const fn source(&self) -> &'src str {
        self.source
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, chars: usize) {
        for _ in 0..chars {
            self.advance();
        }
    }

    /// Skips whitespace and comments, returning the comment text to attach
    /// to the next token.
    fn skip_trivia(&mut self) -> Option<String> {
        let mut comment: Option<String> = None;
        loop {
            match (self.peek_char(), self.peek_char_n(1)) {
                (Some(c), _) if c.is_whitespace() => self.advance(),
                (Some('\\'), Some('\n')) => self.advance_by(2),
                (Some('/'), Some('/')) => {
                    let trailing = self.line == self.last_token_line;
                    let start = self.position;
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                    if !trailing {
                        push_comment(&mut comment, self.source[start..self.position].trim_end());
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.position;
                    self.advance_by(2);
                    while !self.rest.is_empty() && !self.rest.starts_with("*/") {
                        self.advance();
                    }
                    self.advance_by(2);
                    push_comment(&mut comment, &self.source[start..self.position]);
                }
                _ => break,
            }
        }
        comment
    }

    fn scan_identifier(&mut self) -> TokenKind {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.advance();
        }
        TokenKind::Identifier
    }

    #[allow(clippy::cast_possible_wrap)]
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;

        if self.rest.starts_with("0x") || self.rest.starts_with("0X") {
            self.advance_by(2);
            let digits_start = self.position;
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = &self.source[digits_start..self.position];
            self.skip_integer_suffix();
            return match u64::from_str_radix(digits, 16) {
                Ok(v) => TokenKind::Int(v as i64),
                Err(_) => TokenKind::Error(format!("invalid hex literal: 0x{digits}")),
            };
        }

        let mut is_float = false;
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek_char() == Some('.') {
            is_float = true;
            self.advance();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let signed = matches!(self.peek_char_n(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char_n(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance_by(digit_at);
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
        let number_end = self.position;
        while let Some(c @ ('f' | 'F' | 'u' | 'U' | 'l' | 'L')) = self.peek_char() {
            if matches!(c, 'f' | 'F') {
                is_float = true;
            }
            self.advance();
        }

        let text = &self.source[start..number_end];
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => TokenKind::Float(v),
                Err(_) => TokenKind::Error(format!("invalid float literal: {text}")),
            }
        } else {
            match text.parse::<u64>() {
                Ok(v) => TokenKind::Int(v as i64),
                Err(_) => TokenKind::Error(format!("invalid integer literal: {text}")),
            }
        }
    }

    fn skip_integer_suffix(&mut self) {
        while matches!(self.peek_char(), Some('u' | 'U' | 'l' | 'L')) {
            self.advance();
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return TokenKind::Error("unterminated string literal".to_string());
                }
                Some('"') => {
                    self.advance();
                    return TokenKind::Str(value);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some(c @ ('"' | '\\')) => value.push(c),
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                        }
                        None => {
                            return TokenKind::Error("unterminated string literal".to_string());
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_char(&mut self) -> TokenKind {
        self.advance();
        let value = match self.peek_char() {
            Some('\\') => {
                self.advance();
                let escaped = match self.peek_char() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    Some(c) => c,
                    None => return TokenKind::Error("unterminated character literal".to_string()),
                };
                self.advance();
                escaped
            }
            Some(c) if c != '\n' && c != '\'' => {
                self.advance();
                c
            }
            _ => return TokenKind::Error("empty character literal".to_string()),
        };
        if self.peek_char() == Some('\'') {
            self.advance();
            TokenKind::Char(value)
        } else {
            TokenKind::Error("unterminated character literal".to_string())
        }
    }

    fn scan_symbol(&mut self) -> TokenKind {
        let len = MULTI_CHAR_SYMBOLS
            .iter()
            .find(|sym| self.rest.starts_with(**sym))
            .map_or(1, |sym| sym.len());
        self.advance_by(len);
        TokenKind::Symbol
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        Lexer::next_token(self)
    }

    fn rest_of_line(&mut self) -> String {
        Lexer::rest_of_line(self)
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        self.source.get(start..end).unwrap_or("")
    }
}

fn push_comment(comment: &mut Option<String>, text: &str) {
    match comment {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(text);
        }
        None => *comment = Some(text.to_string()),
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize_all(source)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(source: &str) -> Vec<String> {
        Lexer::tokenize_all(source)
            .into_iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn lex_empty() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
        assert_eq!(lex("  \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn lex_identifiers_and_symbols() {
        assert_eq!(
            texts("UPROPERTY(EditAnywhere, Category=\"Combat\")"),
            vec!["UPROPERTY", "(", "EditAnywhere", ",", "Category", "=", "\"Combat\"", ")"]
        );
    }

    #[test]
    fn lex_scope_operator() {
        assert_eq!(texts("EMode::Fast"), vec!["EMode", "::", "Fast"]);
    }

    #[test]
    fn nested_template_closes_one_bracket_at_a_time() {
        assert_eq!(
            texts("TMap<FName, TArray<int32>>"),
            vec!["TMap", "<", "FName", ",", "TArray", "<", "int32", ">", ">"]
        );
    }

    #[test]
    fn lex_integers() {
        assert_eq!(lex("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(lex("0x1F"), vec![TokenKind::Int(31), TokenKind::Eof]);
        assert_eq!(lex("10u"), vec![TokenKind::Int(10), TokenKind::Eof]);
    }

    #[test]
    fn lex_floats() {
        assert_eq!(lex("1.5f"), vec![TokenKind::Float(1.5), TokenKind::Eof]);
        assert_eq!(lex("2.f"), vec![TokenKind::Float(2.0), TokenKind::Eof]);
        assert_eq!(lex("1e3"), vec![TokenKind::Float(1000.0), TokenKind::Eof]);
        assert_eq!(lex(".25"), vec![TokenKind::Float(0.25), TokenKind::Eof]);
    }

    #[test]
    fn lex_strings() {
        assert_eq!(
            lex(r#""a \"b\"""#),
            vec![TokenKind::Str("a \"b\"".into()), TokenKind::Eof]
        );
        assert_eq!(
            lex(r#""line\n""#),
            vec![TokenKind::Str("line\\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_chars() {
        assert_eq!(lex("'a'"), vec![TokenKind::Char('a'), TokenKind::Eof]);
        assert_eq!(lex(r"'\n'"), vec![TokenKind::Char('\n'), TokenKind::Eof]);
    }

    #[test]
    fn lex_unterminated_string() {
        let tokens = lex("\"abc");
        assert!(matches!(tokens[0], TokenKind::Error(_)));
    }

    #[test]
    fn lex_unexpected_character() {
        let tokens = lex("int32 \u{00e9}");
        assert!(matches!(tokens[1], TokenKind::Error(_)));
    }

    #[test]
    fn leading_comments_attach_to_next_token() {
        let tokens = Lexer::tokenize_all("/** Health */\nUPROPERTY()");
        assert_eq!(tokens[0].text, "UPROPERTY");
        assert_eq!(tokens[0].comment.as_deref(), Some("/** Health */"));
        assert_eq!(tokens[1].comment, None);
    }

    #[test]
    fn consecutive_line_comments_are_joined() {
        let tokens = Lexer::tokenize_all("// one\n// two\nint32");
        assert_eq!(tokens[0].comment.as_deref(), Some("// one\n// two"));
    }

    #[test]
    fn trailing_line_comment_is_dropped() {
        let tokens = Lexer::tokenize_all("int32 A; // about A\nint32 B;");
        let b = tokens.iter().find(|t| t.text == "B").unwrap();
        let int32 = tokens.iter().filter(|t| t.text == "int32").nth(1).unwrap();
        assert_eq!(int32.comment, None);
        assert_eq!(b.comment, None);
    }

    #[test]
    fn comment_before_eof_rides_on_eof() {
        let tokens = Lexer::tokenize_all("x // tail\n/* end */");
        assert!(tokens[1].is_eof());
        assert_eq!(tokens[1].comment.as_deref(), Some("/* end */"));
    }

    #[test]
    fn rest_of_line_with_continuation() {
        let mut lexer = Lexer::new("#define FOO(x) \\\n  x + 1\nnext");
        assert!(lexer.next_token().is_symbol("#"));
        assert_eq!(lexer.next_token().text, "define");
        assert_eq!(lexer.rest_of_line(), "FOO(x)    x + 1");
        let next = lexer.next_token();
        assert_eq!(next.text, "next");
        assert_eq!(next.span.line, 3);
    }

    #[test]
    fn span_tracking() {
        let tokens = Lexer::tokenize_all("struct\n  FFoo");
        assert_eq!(tokens[0].span, Span::new(0, 6, 1, 1));
        assert_eq!(tokens[1].span, Span::new(9, 13, 2, 3));
    }

    #[test]
    fn token_source_slice() {
        let lexer = Lexer::new("int32 Value;");
        assert_eq!(TokenSource::slice(&lexer, 6, 11), "Value");
        assert_eq!(TokenSource::slice(&lexer, 6, 99), "");
    }
}
