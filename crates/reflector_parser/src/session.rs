//! The process-scoped parsing context.
//!
//! A [`Session`] owns everything a module parse produces: the type graph,
//! one [`SourceUnit`] per header, the set of units that failed, and the
//! diagnostic sink. Parsers borrow it mutably for the duration of one file.

use std::collections::HashSet;

use reflector_foundation::{
    Diagnostic, Diagnostics, Error, ErrorContext, ParserConfig, Severity,
};
use reflector_model::{
    ClassData, ClassFlags, ScopeId, SourceUnit, StructBody, StructData, StructFlags, TypeGraph,
    TypeId, TypeKind, TypeNode, UnitId,
};

use crate::resolver::prescan;

/// State shared by every file of a parse.
#[derive(Debug)]
pub struct Session {
    config: ParserConfig,
    graph: TypeGraph,
    units: Vec<SourceUnit>,
    failed_units: HashSet<UnitId>,
    diagnostics: Diagnostics,
    errors: Vec<Error>,
    intrinsic_scope: ScopeId,
}

impl Session {
    /// Creates a session and registers the configured intrinsic types.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        let mut graph = TypeGraph::new();
        let intrinsic_scope = graph.add_file_scope();
        let mut session = Self {
            config,
            graph,
            units: Vec::new(),
            failed_units: HashSet::new(),
            diagnostics: Diagnostics::new(),
            errors: Vec::new(),
            intrinsic_scope,
        };
        session.register_intrinsics();
        session
    }

    fn register_intrinsics(&mut self) {
        let classes = self.config.intrinsic_classes.clone();
        for class in &classes {
            self.register_intrinsic_class(&class.name, class.parent.as_deref(), false);
        }
        let interfaces = self.config.intrinsic_interfaces.clone();
        for interface in &interfaces {
            self.register_intrinsic_class(&interface.name, interface.parent.as_deref(), true);
        }
        let structs = self.config.intrinsic_structs.clone();
        for name in &structs {
            let type_scope = self.graph.add_type_scope(self.intrinsic_scope);
            let data = StructData {
                body: StructBody::new(type_scope),
                flags: StructFlags::NATIVE,
            };
            let mut node = TypeNode::new(name.as_str(), self.intrinsic_scope, TypeKind::Struct(data));
            node.metadata.insert("BlueprintType", "true");
            self.add_intrinsic(node);
        }
    }

    fn register_intrinsic_class(&mut self, name: &str, parent: Option<&str>, interface: bool) {
        let super_type = parent.and_then(|p| self.graph.find_global(p));
        let outer = super_type
            .and_then(|s| self.graph.node(s).type_scope())
            .unwrap_or(self.intrinsic_scope);
        let type_scope = self.graph.add_type_scope(outer);
        let mut data = ClassData::new(type_scope);
        data.body.super_type = super_type;
        data.flags = if interface {
            ClassFlags::INTERFACE | ClassFlags::NATIVE | ClassFlags::ABSTRACT | ClassFlags::PARSED
        } else {
            ClassFlags::NATIVE | ClassFlags::INTRINSIC | ClassFlags::PARSED
        };
        self.add_intrinsic(TypeNode::new(name, self.intrinsic_scope, TypeKind::Class(data)));
    }

    fn add_intrinsic(&mut self, node: TypeNode) {
        let name = node.name.clone();
        if self.graph.find_global(&name).is_some() {
            log::warn!(target: "reflector", "intrinsic type {name} configured twice");
            return;
        }
        let id = self.graph.add_node(node);
        // Fresh scope and fresh name: neither call can collide.
        let declared = self
            .graph
            .declare(self.intrinsic_scope, &name, id)
            .and_then(|()| self.graph.register_global(id));
        if let Err(err) = declared {
            log::warn!(target: "reflector", "intrinsic type {name}: {err}");
        }
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Adds a header to the session. The header is pre-scanned for its
    /// includes and class declarations but not parsed.
    pub fn add_unit(
        &mut self,
        filename: impl Into<String>,
        module: impl Into<String>,
        source: impl Into<String>,
    ) -> UnitId {
        let source = source.into();
        let scope = self.graph.add_file_scope();
        self.graph.include_scope(scope, self.intrinsic_scope);
        let scan = prescan(&source);
        let mut unit = SourceUnit::new(filename, module, source, scope);
        unit.includes = scan.includes;
        unit.prescanned = scan.classes;
        let id = UnitId::from_index(u32::try_from(self.units.len()).unwrap_or(u32::MAX));
        log::debug!(target: "reflector", "added unit {}", unit.filename);
        self.units.push(unit);
        id
    }

    /// Returns a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id.index()]
    }

    /// Returns a unit mutably.
    pub fn unit_mut(&mut self, id: UnitId) -> &mut SourceUnit {
        &mut self.units[id.index()]
    }

    /// All units in the order they were added.
    #[must_use]
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Handles of every unit.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.units.len()).map(|i| UnitId::from_index(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    /// Finds the unit an `#include` target refers to.
    #[must_use]
    pub fn find_unit_by_include(&self, include: &str) -> Option<UnitId> {
        self.unit_ids().find(|&id| self.unit(id).matches_include(include))
    }

    /// Finds the unit whose pre-scan saw a class named `name`.
    #[must_use]
    pub fn find_unit_declaring_class(&self, name: &str) -> Option<UnitId> {
        self.unit_ids()
            .find(|&id| self.unit(id).prescanned.iter().any(|c| c.name == name))
    }

    /// Unit a type was declared in; `None` for intrinsic types.
    #[must_use]
    pub fn unit_declaring(&self, id: TypeId) -> Option<UnitId> {
        self.graph.node(id).unit
    }

    /// Scope holding the intrinsic types.
    #[must_use]
    pub const fn intrinsic_scope(&self) -> ScopeId {
        self.intrinsic_scope
    }

    // =========================================================================
    // Failure tracking
    // =========================================================================

    /// Returns true if `unit` failed to parse.
    #[must_use]
    pub fn is_failed(&self, unit: UnitId) -> bool {
        self.failed_units.contains(&unit)
    }

    /// Records a fatal error for `unit` and marks it failed.
    pub fn record_failure(&mut self, unit: UnitId, mut error: Error) {
        let filename = self.unit(unit).filename.clone();
        let context = error.context.get_or_insert_with(ErrorContext::new);
        if context.source.is_none() {
            context.source = Some(filename.clone());
        }
        let mut diagnostic = Diagnostic::new(Severity::Error, "parse", error.kind.to_string());
        diagnostic.file = Some(filename);
        diagnostic.line = error.line();
        self.diagnostics.push(diagnostic);
        self.errors.push(error);
        self.failed_units.insert(unit);
    }

    /// Fatal errors recorded so far, in order.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The type graph.
    #[must_use]
    pub const fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// The type graph, mutably.
    pub fn graph_mut(&mut self) -> &mut TypeGraph {
        &mut self.graph
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The diagnostic sink, mutably.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Finds a type by name anywhere in the session.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.graph.find_global(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsics_are_registered() {
        let session = Session::new(ParserConfig::default());
        let object = session.find_type("UObject").unwrap();
        let actor = session.find_type("AActor").unwrap();
        assert!(session.graph().is_child_of(actor, object));
        let interface = session.find_type("UInterface").unwrap();
        assert!(session.graph().node(interface).is_interface());
        let vector = session.find_type("FVector").unwrap();
        assert!(session.graph().node(vector).metadata.get_bool("BlueprintType"));
        assert_eq!(session.graph().node(vector).unit, None);
    }

    #[test]
    fn units_see_intrinsics() {
        let mut session = Session::new(ParserConfig::default());
        let id = session.add_unit("Game/Thing.h", "Game", "");
        let scope = session.unit(id).scope;
        assert_eq!(
            session.graph().lookup(scope, "UObject", true),
            session.find_type("UObject")
        );
    }

    #[test]
    fn add_unit_prescans() {
        let mut session = Session::new(ParserConfig::default());
        let id = session.add_unit(
            "Game/Thing.h",
            "Game",
            "#include \"Base.h\"\nUCLASS()\nclass UThing : public UBase {};\n",
        );
        let unit = session.unit(id);
        assert_eq!(unit.includes, vec!["Base.h".to_string()]);
        assert_eq!(unit.prescanned[0].name, "UThing");
        assert_eq!(unit.prescanned[0].parent.as_deref(), Some("UBase"));
        assert_eq!(session.find_unit_by_include("Thing.h"), Some(id));
        assert_eq!(session.find_unit_declaring_class("UThing"), Some(id));
    }

    #[test]
    fn failures_are_recorded() {
        let mut session = Session::new(ParserConfig::default());
        let id = session.add_unit("Game/Thing.h", "Game", "");
        session.record_failure(id, Error::syntax("boom"));
        assert!(session.is_failed(id));
        assert_eq!(session.errors()[0].report(), "Game/Thing.h: Error: boom");
        assert_eq!(session.diagnostics().error_count_for("Game/Thing.h"), 1);
    }
}
