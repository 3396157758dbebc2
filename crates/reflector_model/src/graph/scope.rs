//! Name scopes.

use std::collections::HashMap;

use super::{ScopeId, TypeId};

/// Whether a scope belongs to a file or a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeKind {
    /// Root scope of a source unit.
    File,
    /// Nested scope of a struct or class.
    Type,
}

/// A `name → TypeId` map with an optional outer scope.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scope {
    /// File or type scope.
    pub kind: ScopeKind,
    /// Enclosing scope: the super-type's scope, or the owning file scope.
    pub outer: Option<ScopeId>,
    /// Owning type, for type scopes.
    pub owner: Option<TypeId>,
    /// File scopes consulted by lookup, for file scopes.
    pub included: Vec<ScopeId>,
    names: HashMap<String, TypeId>,
    order: Vec<TypeId>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, outer: Option<ScopeId>) -> Self {
        Self {
            kind,
            outer,
            owner: None,
            included: Vec::new(),
            names: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Looks up a name declared directly in this scope.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// Types declared here, in declaration order.
    #[must_use]
    pub fn declared(&self) -> &[TypeId] {
        &self.order
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &str, id: TypeId) {
        self.names.insert(name.to_string(), id);
        self.order.push(id);
    }
}
