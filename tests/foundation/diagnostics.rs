//! Integration tests for the diagnostic sink

use reflector_foundation::{Diagnostic, Diagnostics, Severity};

#[test]
fn diagnostic_display_includes_location() {
    let d = Diagnostic::new(Severity::Warning, "property", "Odd category").at("Game/Loot.h", 7);
    assert_eq!(d.to_string(), "Game/Loot.h(7): Warning: Odd category");

    let bare = Diagnostic::new(Severity::Note, "parse", "hello");
    assert_eq!(bare.to_string(), "Note: hello");
}

#[test]
fn errors_are_counted_per_file() {
    let mut sink = Diagnostics::new();
    sink.push(Diagnostic::new(Severity::Error, "parse", "a").at("A.h", 1));
    sink.push(Diagnostic::new(Severity::Error, "parse", "b").at("A.h", 2));
    sink.push(Diagnostic::new(Severity::Error, "parse", "c").at("B.h", 1));
    sink.push(Diagnostic::new(Severity::Warning, "parse", "d").at("A.h", 3));

    assert_eq!(sink.error_count_for("A.h"), 2);
    assert_eq!(sink.error_count_for("B.h"), 1);
    assert_eq!(sink.error_count_for("C.h"), 0);
    assert_eq!(sink.warning_count(), 1);
    assert_eq!(sink.len(), 4);
}

#[test]
fn diagnostics_filter_by_category() {
    let mut sink = Diagnostics::new();
    sink.push(Diagnostic::new(Severity::Warning, "documentation", "x"));
    sink.push(Diagnostic::new(Severity::Warning, "deprecation", "y"));
    let docs: Vec<_> = sink.in_category("documentation").map(|d| d.message.as_str()).collect();
    assert_eq!(docs, ["x"]);

    sink.clear();
    assert!(sink.is_empty());
}

#[test]
fn severities_are_ordered() {
    assert!(Severity::Note < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
}
