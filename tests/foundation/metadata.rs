//! Integration tests for metadata maps

use proptest::prelude::*;
use reflector_foundation::MetaData;

#[test]
fn insert_replaces_and_returns_previous() {
    let mut meta = MetaData::new();
    assert_eq!(meta.insert("Category", "Combat"), None);
    assert_eq!(meta.insert("Category", "Loot"), Some("Combat".to_string()));
    assert_eq!(meta.get("Category"), Some("Loot"));
    assert_eq!(meta.len(), 1);
}

#[test]
fn bool_values() {
    let mut meta = MetaData::new();
    meta.insert("BlueprintType", "");
    meta.insert("Hidden", "TRUE");
    meta.insert("Shown", "false");
    assert!(meta.get_bool("BlueprintType"));
    assert!(meta.get_bool("Hidden"));
    assert!(!meta.get_bool("Shown"));
    assert!(!meta.get_bool("Missing"));
}

#[test]
fn extend_overwrites_on_collision() {
    let mut base = MetaData::new();
    base.insert("A", "1");
    base.insert("B", "2");
    let mut other = MetaData::new();
    other.insert("B", "3");
    other.insert("C", "4");

    base.extend_from(&other);
    let entries: Vec<_> = base.iter().collect();
    assert_eq!(entries, [("A", "1"), ("B", "3"), ("C", "4")]);
}

#[test]
fn clones_are_independent() {
    let mut original = MetaData::new();
    original.insert("ToolTip", "Health");
    let mut copy = original.clone();
    copy.remove("ToolTip");
    assert!(original.contains("ToolTip"));
    assert!(copy.is_empty());
}

proptest! {
    #[test]
    fn iteration_is_sorted_by_key(pairs in prop::collection::vec(("[A-Za-z]{1,8}", "[a-z0-9 ]{0,8}"), 0..24)) {
        let mut meta = MetaData::new();
        for (k, v) in &pairs {
            meta.insert(k.as_str(), v.as_str());
        }
        let keys: Vec<_> = meta.iter().map(|(k, _)| k.to_string()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn last_insert_wins(key in "[A-Za-z]{1,8}", values in prop::collection::vec("[a-z]{0,6}", 1..8)) {
        let mut meta = MetaData::new();
        for v in &values {
            meta.insert(key.as_str(), v.as_str());
        }
        prop_assert_eq!(meta.get(&key), values.last().map(String::as_str));
    }
}
