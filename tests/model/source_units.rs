//! Integration tests for source units

use reflector_model::{ScopeId, SourceUnit};

fn unit(filename: &str) -> SourceUnit {
    SourceUnit::new(filename, "Game", "", ScopeId::from_index(0))
}

#[test]
fn names_derive_from_the_path() {
    let unit = unit("Source/Game/Public/Weapon.h");
    assert_eq!(unit.file_name(), "Weapon.h");
    assert_eq!(unit.base_name(), "Weapon");
    assert_eq!(unit.generated_header(), "Weapon.generated.h");
}

#[test]
fn includes_match_by_name_or_trailing_path() {
    let unit = unit("Source/Game/Public/Weapon.h");
    assert!(unit.matches_include("Weapon.h"));
    assert!(unit.matches_include("Public/Weapon.h"));
    assert!(unit.matches_include("Public\\Weapon.h"));
    assert!(!unit.matches_include("Private/Weapon.h"));
    assert!(!unit.matches_include("Weapons.h"));
}

#[test]
fn new_units_are_unparsed() {
    let unit = unit("Loot.h");
    assert!(!unit.parsed);
    assert!(!unit.dependencies_resolved);
    assert!(unit.includes.is_empty());
}
