//! The scope and type graph.
//!
//! [`TypeGraph`] owns two arenas: [`TypeNode`]s and [`Scope`]s. Everything
//! else refers to them through [`TypeId`] and [`ScopeId`] handles, which keeps
//! the cyclic references of a type system (class to super-class, scope to
//! outer scope, property to struct) free of shared ownership.

mod ids;
mod node;
mod scope;

use std::collections::HashMap;

use reflector_foundation::{Error, Result};

pub use ids::{ScopeId, TypeId, UnitId};
pub(crate) use ids::next_index;
pub use node::{
    strip_prefix, ClassCategories, ClassData, ConstructorInfo, EnumData, EnumEntry, EnumForm,
    FunctionData, REPLACE_CONVERTED, SparseDelegate, StructBody, StructData, TypeKind, TypeNode,
};
pub use scope::{Scope, ScopeKind};

use crate::property::PropertyDescriptor;

/// Arena of types and scopes plus the session-wide name registry.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    scopes: Vec<Scope>,
    globals: HashMap<String, TypeId>,
}

impl TypeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Arenas
    // =========================================================================

    /// Creates a root scope for a source unit.
    pub fn add_file_scope(&mut self) -> ScopeId {
        self.push_scope(Scope::new(ScopeKind::File, None))
    }

    /// Creates a type scope nested in `outer`.
    pub fn add_type_scope(&mut self, outer: ScopeId) -> ScopeId {
        self.push_scope(Scope::new(ScopeKind::Type, Some(outer)))
    }

    fn push_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId::from_index(next_index(self.scopes.len()));
        self.scopes.push(scope);
        id
    }

    /// Adds a node without declaring it anywhere. A struct or class node
    /// becomes the owner of its type scope.
    pub fn add_node(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId::from_index(next_index(self.nodes.len()));
        if let Some(type_scope) = node.type_scope() {
            self.scopes[type_scope.index()].owner = Some(id);
        }
        self.nodes.push(node);
        id
    }

    /// Returns a node.
    #[must_use]
    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    /// Returns a node mutably.
    pub fn node_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.nodes[id.index()]
    }

    /// Returns a scope.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Re-parents a type scope, used once the super-type is known.
    pub fn set_outer(&mut self, scope: ScopeId, outer: ScopeId) {
        self.scopes[scope.index()].outer = Some(outer);
    }

    /// Makes `included` visible from the file scope `scope`.
    pub fn include_scope(&mut self, scope: ScopeId, included: ScopeId) {
        if scope == included {
            return;
        }
        let target = &mut self.scopes[scope.index()];
        if !target.included.contains(&included) {
            target.included.push(included);
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if there are no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates every node with its handle.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (TypeId::from_index(next_index(i)), node))
    }

    // =========================================================================
    // Naming
    // =========================================================================

    /// Declares `name` in `scope`.
    ///
    /// # Errors
    /// Fails if the name is already declared in that scope.
    pub fn declare(&mut self, scope: ScopeId, name: &str, id: TypeId) -> Result<()> {
        if let Some(existing) = self.scopes[scope.index()].get(name) {
            let existing = self.node(existing);
            return Err(Error::duplicate_name(
                name,
                format!("{} {}", existing.kind_name(), existing.name),
            ));
        }
        log::trace!(target: "reflector", "declare {name} in {scope:?}");
        self.scopes[scope.index()].insert(name, id);
        Ok(())
    }

    /// Looks up `name` starting at `scope`.
    ///
    /// With `include_parents`, the walk continues through outer scopes, and
    /// file scopes also consult their included file scopes.
    #[must_use]
    pub fn lookup(&self, scope: ScopeId, name: &str, include_parents: bool) -> Option<TypeId> {
        let mut visited = Vec::new();
        self.lookup_in(scope, name, include_parents, &mut visited)
    }

    fn lookup_in(
        &self,
        scope: ScopeId,
        name: &str,
        include_parents: bool,
        visited: &mut Vec<ScopeId>,
    ) -> Option<TypeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if visited.contains(&id) {
                return None;
            }
            visited.push(id);
            let scope = self.scope(id);
            if let Some(found) = scope.get(name) {
                return Some(found);
            }
            if !include_parents {
                return None;
            }
            for &included in &scope.included {
                if let Some(found) = self.lookup_in(included, name, true, visited) {
                    return Some(found);
                }
            }
            current = scope.outer;
        }
        None
    }

    /// Registers a node in the session-wide registry under its name.
    ///
    /// # Errors
    /// Fails if another node already holds the name.
    pub fn register_global(&mut self, id: TypeId) -> Result<()> {
        let name = self.node(id).name.clone();
        if let Some(&existing) = self.globals.get(&name) {
            if existing != id {
                let existing = self.node(existing);
                return Err(Error::duplicate_name(
                    name,
                    format!("{} {}", existing.kind_name(), existing.name),
                ));
            }
        }
        self.globals.insert(name, id);
        Ok(())
    }

    /// Searches the session-wide registry.
    #[must_use]
    pub fn find_global(&self, name: &str) -> Option<TypeId> {
        self.globals.get(name).copied()
    }

    /// Finds a delegate signature by its stored name anywhere in the graph.
    #[must_use]
    pub fn find_delegate(&self, name: &str) -> Option<TypeId> {
        self.iter()
            .find(|(_, node)| node.is_delegate() && node.name == name)
            .map(|(id, _)| id)
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Iterates the super-type chain of `id`, nearest first, excluding `id`.
    pub fn ancestors(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let mut current = self.node(id).super_type();
        let mut steps = 0usize;
        std::iter::from_fn(move || {
            let next = current?;
            // A malformed chain cannot loop forever.
            steps += 1;
            if steps > self.nodes.len() {
                return None;
            }
            current = self.node(next).super_type();
            Some(next)
        })
    }

    /// Returns true if `id` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_child_of(&self, id: TypeId, ancestor: TypeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Returns true if `id` is named `name` or derives from a type named so.
    #[must_use]
    pub fn is_child_of_named(&self, id: TypeId, name: &str) -> bool {
        self.node(id).name == name || self.ancestors(id).any(|a| self.node(a).name == name)
    }

    /// Finds a function declared on a class, optionally searching its
    /// ancestors.
    #[must_use]
    pub fn find_function(&self, owner: TypeId, name: &str, include_super: bool) -> Option<TypeId> {
        let direct = self.node(owner).body().and_then(|body| {
            body.functions
                .iter()
                .copied()
                .find(|&f| self.node(f).name == name && !self.node(f).is_delegate())
        });
        if direct.is_some() || !include_super {
            return direct;
        }
        self.ancestors(owner)
            .find_map(|ancestor| self.find_function(ancestor, name, false))
    }

    /// Finds a property declared on a struct or class, optionally searching
    /// its ancestors. Returns the declaring type with the property.
    #[must_use]
    pub fn find_property(
        &self,
        owner: TypeId,
        name: &str,
        include_super: bool,
    ) -> Option<(TypeId, &PropertyDescriptor)> {
        let direct = self
            .node(owner)
            .body()
            .and_then(|b| b.property(name))
            .map(|p| (owner, p));
        if direct.is_some() || !include_super {
            return direct;
        }
        self.ancestors(owner).find_map(|ancestor| {
            self.node(ancestor)
                .body()
                .and_then(|b| b.property(name))
                .map(|p| (ancestor, p))
        })
    }

    /// Reads a boolean metadata key on `id` or the nearest ancestor that
    /// sets it.
    #[must_use]
    pub fn bool_metadata_hierarchical(&self, id: TypeId, key: &str) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|t| {
                let md = &self.node(t).metadata;
                md.contains(key).then(|| md.get_bool(key))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ClassFlags;

    fn class(graph: &mut TypeGraph, file: ScopeId, name: &str, parent: Option<TypeId>) -> TypeId {
        let outer = parent
            .and_then(|p| graph.node(p).type_scope())
            .unwrap_or(file);
        let type_scope = graph.add_type_scope(outer);
        let mut data = ClassData::new(type_scope);
        data.body.super_type = parent;
        let id = graph.add_node(TypeNode::new(name, file, TypeKind::Class(data)));
        graph.declare(file, name, id).unwrap();
        graph.register_global(id).unwrap();
        id
    }

    #[test]
    fn duplicate_declaration_fails() {
        let mut graph = TypeGraph::new();
        let file = graph.add_file_scope();
        class(&mut graph, file, "UThing", None);
        let other = graph.add_node(TypeNode::new(
            "UThing",
            file,
            TypeKind::Function(FunctionData::default()),
        ));
        let err = graph.declare(file, "UThing", other).unwrap_err();
        assert_eq!(err.to_string(), "'UThing' conflicts with 'class UThing'");
    }

    #[test]
    fn lookup_walks_outer_and_included_scopes() {
        let mut graph = TypeGraph::new();
        let base_file = graph.add_file_scope();
        let file = graph.add_file_scope();
        let base = class(&mut graph, base_file, "UBase", None);
        let derived = class(&mut graph, file, "UDerived", Some(base));

        assert_eq!(graph.lookup(file, "UBase", true), None);
        graph.include_scope(file, base_file);
        assert_eq!(graph.lookup(file, "UBase", true), Some(base));
        assert_eq!(graph.lookup(file, "UBase", false), None);

        let derived_scope = graph.node(derived).type_scope().unwrap();
        assert_eq!(graph.scope(derived_scope).owner, Some(derived));
        assert_eq!(graph.lookup(derived_scope, "UBase", true), Some(base));
    }

    #[test]
    fn lookup_is_stable() {
        let mut graph = TypeGraph::new();
        let file = graph.add_file_scope();
        let id = class(&mut graph, file, "UThing", None);
        for _ in 0..3 {
            assert_eq!(graph.lookup(file, "UThing", true), Some(id));
            assert_eq!(graph.find_global("UThing"), Some(id));
        }
    }

    #[test]
    fn include_cycles_terminate() {
        let mut graph = TypeGraph::new();
        let a = graph.add_file_scope();
        let b = graph.add_file_scope();
        graph.include_scope(a, b);
        graph.include_scope(b, a);
        assert_eq!(graph.lookup(a, "Missing", true), None);
    }

    #[test]
    fn hierarchy_queries() {
        let mut graph = TypeGraph::new();
        let file = graph.add_file_scope();
        let object = class(&mut graph, file, "UObject", None);
        let actor = class(&mut graph, file, "AActor", Some(object));
        let pawn = class(&mut graph, file, "APawn", Some(actor));
        assert_eq!(graph.ancestors(pawn).collect::<Vec<_>>(), vec![actor, object]);
        assert!(graph.is_child_of(pawn, object));
        assert!(!graph.is_child_of(object, pawn));
        assert!(graph.is_child_of_named(pawn, "AActor"));

        graph.node_mut(actor).metadata.insert("BlueprintType", "true");
        assert!(graph.bool_metadata_hierarchical(pawn, "BlueprintType"));
        graph.node_mut(pawn).metadata.insert("BlueprintType", "false");
        assert!(!graph.bool_metadata_hierarchical(pawn, "BlueprintType"));
    }

    #[test]
    fn global_names_are_unique() {
        let mut graph = TypeGraph::new();
        let a = graph.add_file_scope();
        let b = graph.add_file_scope();
        class(&mut graph, a, "UThing", None);
        let type_scope = graph.add_type_scope(b);
        let mut data = ClassData::new(type_scope);
        data.flags |= ClassFlags::NATIVE;
        let second = graph.add_node(TypeNode::new("UThing", b, TypeKind::Class(data)));
        assert!(graph.register_global(second).is_err());
    }
}
