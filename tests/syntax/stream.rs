//! Integration tests for the token stream

use reflector_syntax::{Lexer, TokenStream};

fn stream(source: &str) -> TokenStream<Lexer<'_>> {
    TokenStream::new(Lexer::new(source))
}

#[test]
fn peek_does_not_consume() {
    let mut tokens = stream("USTRUCT()");
    assert!(tokens.peek().is_identifier("USTRUCT"));
    assert!(tokens.peek().is_identifier("USTRUCT"));
    assert!(tokens.get_token().is_identifier("USTRUCT"));
    assert!(tokens.match_symbol("("));
}

#[test]
fn unget_restores_comment() {
    let mut tokens = stream("/** The owner */\nAActor* Owner;");
    let first = tokens.get_token();
    assert!(first.comment.is_some());
    tokens.unget_token(first.clone());
    assert_eq!(tokens.get_token(), first);
}

#[test]
fn match_helpers_leave_non_matches_in_place() {
    let mut tokens = stream("const int32 Count");
    assert!(!tokens.match_symbol("*"));
    assert!(!tokens.match_identifier("CONST"));
    assert!(tokens.match_identifier_ci("CONST"));
    let ty = tokens.get_identifier().unwrap();
    assert_eq!(ty.text, "int32");
    assert!(tokens.match_identifier("Count"));
    assert!(tokens.is_eof());
}

#[test]
fn require_symbol_reports_context() {
    let mut tokens = stream("int32 Gold }");
    tokens.require_identifier("type").unwrap();
    tokens.require_identifier("name").unwrap();
    let err = tokens
        .require_symbol(";", "'variable declaration'")
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing ';' in 'variable declaration'");
    assert!(tokens.match_symbol("}"));
}

#[test]
fn require_identifier_on_eof() {
    let mut tokens = stream("");
    let err = tokens.require_identifier("variable name").unwrap_err();
    assert_eq!(err.to_string(), "Missing variable name");
    assert!(tokens.is_eof());
}

#[test]
fn line_follows_consumed_tokens() {
    let mut tokens = stream("A\nB\n\nC");
    tokens.get_token();
    assert_eq!(tokens.line(), 1);
    tokens.get_token();
    tokens.get_token();
    assert_eq!(tokens.line(), 4);
}
