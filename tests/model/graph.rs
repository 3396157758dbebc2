//! Integration tests for the type graph
//!
//! Builds small graphs by hand: scopes, declarations, and class chains.

use proptest::prelude::*;
use reflector_foundation::ErrorKind;
use reflector_model::{
    ClassData, ClassFlags, PropertyDescriptor, PropertyType, ScalarKind, ScopeId, StructBody,
    StructData, StructFlags, TypeGraph, TypeId, TypeKind, TypeNode,
};

fn add_class(graph: &mut TypeGraph, file: ScopeId, name: &str, parent: Option<TypeId>) -> TypeId {
    let type_scope = graph.add_type_scope(file);
    let mut data = ClassData::new(type_scope);
    data.body.super_type = parent;
    let id = graph.add_node(TypeNode::new(name, file, TypeKind::Class(data)));
    graph.declare(file, name, id).unwrap();
    graph.register_global(id).unwrap();
    id
}

fn add_struct(graph: &mut TypeGraph, file: ScopeId, name: &str) -> TypeId {
    let type_scope = graph.add_type_scope(file);
    let data = StructData {
        body: StructBody::new(type_scope),
        flags: StructFlags::empty(),
    };
    let id = graph.add_node(TypeNode::new(name, file, TypeKind::Struct(data)));
    graph.declare(file, name, id).unwrap();
    id
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn duplicate_declaration_names_existing_kind() {
    let mut graph = TypeGraph::new();
    let file = graph.add_file_scope();
    add_struct(&mut graph, file, "FLoot");

    let scope = graph.add_type_scope(file);
    let data = StructData {
        body: StructBody::new(scope),
        flags: StructFlags::empty(),
    };
    let again = graph.add_node(TypeNode::new("FLoot", file, TypeKind::Struct(data)));
    let err = graph.declare(file, "FLoot", again).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateName { .. }));
    assert_eq!(err.to_string(), "'FLoot' conflicts with 'struct FLoot'");
}

#[test]
fn same_name_in_different_files() {
    let mut graph = TypeGraph::new();
    let a = graph.add_file_scope();
    let b = graph.add_file_scope();
    let first = add_struct(&mut graph, a, "FLoot");
    let second = add_struct(&mut graph, b, "FLoot");
    assert_ne!(first, second);
    assert_eq!(graph.len(), 2);
}

#[test]
fn global_registry_rejects_second_holder() {
    let mut graph = TypeGraph::new();
    let a = graph.add_file_scope();
    let b = graph.add_file_scope();
    add_class(&mut graph, a, "AWeapon", None);

    let scope = graph.add_type_scope(b);
    let other = graph.add_node(TypeNode::new("AWeapon", b, TypeKind::Class(ClassData::new(scope))));
    let err = graph.register_global(other).unwrap_err();
    assert_eq!(err.to_string(), "'AWeapon' conflicts with 'class AWeapon'");
}

#[test]
fn interfaces_report_their_kind() {
    let mut graph = TypeGraph::new();
    let file = graph.add_file_scope();
    let scope = graph.add_type_scope(file);
    let mut data = ClassData::new(scope);
    data.flags |= ClassFlags::INTERFACE;
    let id = graph.add_node(TypeNode::new("UInteractable", file, TypeKind::Class(data)));
    assert_eq!(graph.node(id).kind_name(), "interface");
    assert_eq!(graph.node(id).name_without_prefix(), "Interactable");
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn lookup_walks_outer_scopes() {
    let mut graph = TypeGraph::new();
    let file = graph.add_file_scope();
    let loot = add_struct(&mut graph, file, "FLoot");
    let weapon = add_class(&mut graph, file, "AWeapon", None);
    let inner = graph.node(weapon).type_scope().unwrap();

    assert_eq!(graph.lookup(inner, "FLoot", true), Some(loot));
    assert_eq!(graph.lookup(inner, "FLoot", false), None);
    assert_eq!(graph.scope(inner).owner, Some(weapon));
}

#[test]
fn lookup_follows_includes() {
    let mut graph = TypeGraph::new();
    let shared = graph.add_file_scope();
    let game = graph.add_file_scope();
    let loot = add_struct(&mut graph, shared, "FLoot");

    assert_eq!(graph.lookup(game, "FLoot", true), None);
    graph.include_scope(game, shared);
    assert_eq!(graph.lookup(game, "FLoot", true), Some(loot));
}

#[test]
fn lookup_survives_include_cycles() {
    let mut graph = TypeGraph::new();
    let a = graph.add_file_scope();
    let b = graph.add_file_scope();
    graph.include_scope(a, b);
    graph.include_scope(b, a);
    assert_eq!(graph.lookup(a, "FMissing", true), None);
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn ancestors_are_nearest_first() {
    let mut graph = TypeGraph::new();
    let file = graph.add_file_scope();
    let object = add_class(&mut graph, file, "UObject", None);
    let actor = add_class(&mut graph, file, "AActor", Some(object));
    let pawn = add_class(&mut graph, file, "APawn", Some(actor));

    let chain: Vec<_> = graph.ancestors(pawn).collect();
    assert_eq!(chain, [actor, object]);
    assert!(graph.is_child_of(pawn, object));
    assert!(graph.is_child_of(pawn, pawn));
    assert!(!graph.is_child_of(object, pawn));
    assert!(graph.is_child_of_named(pawn, "AActor"));
}

#[test]
fn properties_are_found_through_parents() {
    let mut graph = TypeGraph::new();
    let file = graph.add_file_scope();
    let actor = add_class(&mut graph, file, "AActor", None);
    let pawn = add_class(&mut graph, file, "APawn", Some(actor));
    graph
        .node_mut(actor)
        .body_mut()
        .unwrap()
        .properties
        .push(PropertyDescriptor::new("Health", PropertyType::Scalar(ScalarKind::Float)));

    let (owner, prop) = graph.find_property(pawn, "Health", true).unwrap();
    assert_eq!(owner, actor);
    assert_eq!(prop.name, "Health");
    assert!(graph.find_property(pawn, "Health", false).is_none());
}

#[test]
fn hierarchical_metadata_takes_nearest_setting() {
    let mut graph = TypeGraph::new();
    let file = graph.add_file_scope();
    let base = add_class(&mut graph, file, "UBase", None);
    let middle = add_class(&mut graph, file, "UMiddle", Some(base));
    let leaf = add_class(&mut graph, file, "ULeaf", Some(middle));

    graph.node_mut(base).metadata.insert("IsBlueprintBase", "true");
    assert!(graph.bool_metadata_hierarchical(leaf, "IsBlueprintBase"));

    graph.node_mut(middle).metadata.insert("IsBlueprintBase", "false");
    assert!(!graph.bool_metadata_hierarchical(leaf, "IsBlueprintBase"));
    assert!(!graph.bool_metadata_hierarchical(leaf, "Unset"));
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn lookup_is_stable(names in prop::collection::btree_set("F[A-Z][a-z]{1,8}", 1..16)) {
        let mut graph = TypeGraph::new();
        let file = graph.add_file_scope();
        let owner = add_class(&mut graph, file, "AOwner", None);
        let inner = graph.node(owner).type_scope().unwrap();
        let ids: Vec<_> = names.iter().map(|n| add_struct(&mut graph, file, n)).collect();

        for (name, &id) in names.iter().zip(&ids) {
            prop_assert_eq!(graph.lookup(inner, name, true), Some(id));
            prop_assert_eq!(graph.lookup(inner, name, true), graph.lookup(file, name, false));
        }
    }
}
