//! Integration tests for Error types
//!
//! Tests error construction, display, location, and error kinds.

use reflector_foundation::{Error, ErrorKind, PendingPair};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_syntax() {
    let err = Error::syntax("Missing ';' in 'variable declaration'");
    assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    assert_eq!(err.to_string(), "Missing ';' in 'variable declaration'");
}

#[test]
fn error_duplicate_name() {
    let err = Error::duplicate_name("FLoot", "struct FLoot");
    assert!(matches!(err.kind, ErrorKind::DuplicateName { .. }));
    assert_eq!(err.to_string(), "'FLoot' conflicts with 'struct FLoot'");
}

#[test]
fn error_unresolved_type_is_verbatim() {
    let err = Error::unresolved_type("Unable to find class with name 'AMissing'");
    assert!(matches!(err.kind, ErrorKind::UnresolvedType(_)));
    assert_eq!(err.to_string(), "Unable to find class with name 'AMissing'");
}

#[test]
fn error_unknown_specifier() {
    let err = Error::unknown_specifier("struct", "Glorious");
    assert_eq!(err.to_string(), "Unknown struct specifier 'Glorious'");
}

#[test]
fn error_unmatched_pairs_lists_every_request() {
    let err = Error::unmatched_pairs(vec![
        PendingPair {
            function: "Buy".to_string(),
            id: 2,
        },
        PendingPair {
            function: "Sell".to_string(),
            id: 4,
        },
    ]);
    let msg = err.to_string();
    assert!(msg.starts_with("Request functions missing response pairs"));
    assert!(msg.contains("Buy"));
    assert!(msg.contains("Sell"));
}

#[test]
fn error_prefixed_kinds() {
    assert_eq!(Error::config("bad").to_string(), "configuration error: bad");
    assert_eq!(Error::serialization("bad").to_string(), "serialization error: bad");
    assert_eq!(Error::internal("bad").to_string(), "internal error: bad");
}

// =============================================================================
// Location
// =============================================================================

#[test]
fn error_without_location() {
    let err = Error::semantic("Struct members cannot be replicated");
    assert_eq!(err.line(), None);
    assert_eq!(err.report(), "Error: Struct members cannot be replicated");
}

#[test]
fn error_located_reports_file_and_line() {
    let err = Error::semantic("Struct members cannot be replicated").located("Game/Loot.h", 12);
    assert_eq!(err.line(), Some(12));
    assert_eq!(
        err.report(),
        "Game/Loot.h(12): Error: Struct members cannot be replicated"
    );
}

#[test]
fn first_location_wins() {
    let err = Error::syntax("Unexpected end of file")
        .located("Game/Inner.h", 3)
        .located("Game/Outer.h", 40);
    assert_eq!(err.report(), "Game/Inner.h(3): Error: Unexpected end of file");
}
