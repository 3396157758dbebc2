//! Integration tests for tooltip formatting

use reflector_syntax::format_comment_for_tooltip;

#[test]
fn single_line_javadoc() {
    assert_eq!(format_comment_for_tooltip("/** Health of the actor */"), "Health of the actor");
}

#[test]
fn multi_line_javadoc_loses_gutter() {
    let raw = "/**\n * Health of the actor.\n * Clamped to zero.\n */";
    assert_eq!(
        format_comment_for_tooltip(raw),
        "Health of the actor.\nClamped to zero."
    );
}

#[test]
fn line_comment() {
    assert_eq!(format_comment_for_tooltip("// Speed in cm/s"), "Speed in cm/s");
}

#[test]
fn separators_only() {
    assert_eq!(format_comment_for_tooltip("/** ---------- */"), "");
    assert_eq!(format_comment_for_tooltip("//"), "");
}

#[test]
fn private_notes_are_removed() {
    assert_eq!(format_comment_for_tooltip("/** Shown //~ hidden\n */"), "Shown");
}
