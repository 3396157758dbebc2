//! Integration tests for specifier registries

use std::cmp::Ordering;

use reflector_model::specifiers::{
    ClassSpecifier, FunctionSpecifier, InterfaceSpecifier, MetadataSpecifier, ParameterSpecifier,
    StructSpecifier, VariableSpecifier, compare_ignore_ascii_case,
};

fn is_sorted<T>(table: &[(&str, T)]) -> bool {
    table
        .windows(2)
        .all(|pair| compare_ignore_ascii_case(pair[0].0, pair[1].0) == Ordering::Less)
}

#[test]
fn tables_are_sorted_without_case() {
    assert!(is_sorted(ClassSpecifier::TABLE));
    assert!(is_sorted(InterfaceSpecifier::TABLE));
    assert!(is_sorted(StructSpecifier::TABLE));
    assert!(is_sorted(FunctionSpecifier::TABLE));
    assert!(is_sorted(VariableSpecifier::TABLE));
    assert!(is_sorted(ParameterSpecifier::TABLE));
    assert!(is_sorted(MetadataSpecifier::TABLE));
}

#[test]
fn lookup_ignores_case() {
    assert_eq!(
        VariableSpecifier::lookup("editanywhere"),
        Some(VariableSpecifier::EditAnywhere)
    );
    assert_eq!(
        FunctionSpecifier::lookup("BLUEPRINTPURE"),
        Some(FunctionSpecifier::BlueprintPure)
    );
    assert_eq!(ClassSpecifier::lookup("minimalapi"), Some(ClassSpecifier::MinimalAPI));
}

#[test]
fn lookup_rejects_other_kinds() {
    assert_eq!(StructSpecifier::lookup("Blueprintable"), None);
    assert_eq!(ParameterSpecifier::lookup("EditAnywhere"), None);
    assert_eq!(InterfaceSpecifier::lookup(""), None);
}

#[test]
fn canonical_names() {
    assert_eq!(VariableSpecifier::ReplicatedUsing.name(), "ReplicatedUsing");
    assert_eq!(MetadataSpecifier::lookup("displayname").map(MetadataSpecifier::name), Some("DisplayName"));
}
