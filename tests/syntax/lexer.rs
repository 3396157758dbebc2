//! Integration tests for the lexer
//!
//! Lexes realistic declaration fragments rather than single tokens.

use proptest::prelude::*;
use reflector_syntax::{Lexer, Token, TokenKind};

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens
        .iter()
        .filter(|t| !t.is_eof())
        .map(|t| t.text.as_str())
        .collect()
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn property_declaration() {
    let tokens = Lexer::tokenize_all(
        "UPROPERTY(EditAnywhere, Category = \"Combat\", meta = (ClampMin = \"0\"))\nfloat Health;",
    );
    assert_eq!(
        texts(&tokens),
        [
            "UPROPERTY", "(", "EditAnywhere", ",", "Category", "=", "\"Combat\"", ",", "meta", "=",
            "(", "ClampMin", "=", "\"0\"", ")", ")", "float", "Health", ";"
        ]
    );
    assert_eq!(tokens[6].kind, TokenKind::Str("Combat".to_string()));
    assert_eq!(tokens[6].value_text(), "Combat");
    assert!(tokens.last().unwrap().is_eof());
}

#[test]
fn nested_container_types() {
    let tokens = Lexer::tokenize_all("TMap<FName, TArray<int32>> Lookup;");
    assert_eq!(
        texts(&tokens),
        ["TMap", "<", "FName", ",", "TArray", "<", "int32", ">", ">", "Lookup", ";"]
    );
}

#[test]
fn scoped_names() {
    let tokens = Lexer::tokenize_all("EColor::Type Color; URadio::FOnTuned OnTuned;");
    assert!(tokens[1].is_symbol("::"));
    assert!(tokens[6].is_symbol("::"));
}

#[test]
fn enum_values() {
    let tokens = Lexer::tokenize_all("Red = 0, Green = 0x10, Blue = 7u");
    let values: Vec<_> = tokens.iter().filter_map(Token::int_value).collect();
    assert_eq!(values, [0, 16, 7]);
}

#[test]
fn default_values() {
    let tokens = Lexer::tokenize_all("float Scale = 1.5f; double Ratio = .25;");
    let floats: Vec<_> = tokens
        .iter()
        .filter_map(|t| match t.kind {
            TokenKind::Float(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(floats, [1.5, 0.25]);
    assert_eq!(tokens.iter().filter(|t| t.is_literal()).count(), 2);
}

#[test]
fn identifiers_compare_with_and_without_case() {
    let tokens = Lexer::tokenize_all("BlueprintReadOnly");
    assert!(tokens[0].is_identifier("BlueprintReadOnly"));
    assert!(!tokens[0].is_identifier("blueprintreadonly"));
    assert!(tokens[0].is_identifier_ci("blueprintreadonly"));
    assert_eq!(tokens[0].ident(), Some("BlueprintReadOnly"));
}

// =============================================================================
// Positions and Comments
// =============================================================================

#[test]
fn lines_are_tracked() {
    let tokens = Lexer::tokenize_all("UCLASS()\nclass AWeapon\n{\n};");
    let class = tokens.iter().find(|t| t.is_identifier("AWeapon")).unwrap();
    assert_eq!(class.span.line, 2);
    assert_eq!(class.span.column, 7);
}

#[test]
fn doc_comment_leads_its_declaration() {
    let tokens = Lexer::tokenize_all("int32 Gold; // trailing\n/** Ammo left */\nint32 Ammo;");
    let ammo_type = &tokens[3];
    assert!(ammo_type.is_identifier("int32"));
    assert_eq!(ammo_type.comment.as_deref(), Some("/** Ammo left */"));
    assert!(tokens.iter().all(|t| t.comment.as_deref() != Some("// trailing")));
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn identifier_sequences_lex_back(names in prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,10}", 1..16)) {
        let source = names.join(" ");
        let tokens = Lexer::tokenize_all(&source);
        prop_assert_eq!(tokens.len(), names.len() + 1);
        for (token, name) in tokens.iter().zip(&names) {
            prop_assert!(token.is_identifier(name));
        }
    }

    #[test]
    fn decimal_integers_keep_their_value(value in 0i64..=i64::from(u32::MAX)) {
        let tokens = Lexer::tokenize_all(&value.to_string());
        prop_assert_eq!(tokens[0].int_value(), Some(value));
    }
}
