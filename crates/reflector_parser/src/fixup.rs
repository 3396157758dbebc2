//! Binding delegate properties to their signatures once a file is parsed.
//!
//! A delegate property may name a signature declared later in the file or
//! inside another class, so binding waits until every declaration of the
//! file is in the graph. Properties are found on the structs and classes
//! the file defines (including the parameters of their functions) and on
//! the parameters of the delegates it declares.

use std::collections::HashMap;

use reflector_foundation::{Diagnostic, Error, Result, Severity};
use reflector_model::{
    FunctionFlags, PropertyDescriptor, PropertyFlags, PropertyType, ScopeId, TypeGraph, TypeId,
    UnitId, is_supported_by_blueprint,
};

use crate::header::signature_name;
use crate::session::Session;

/// Where a property lives inside its node.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Member(TypeId, usize),
    Param(TypeId, usize),
    Return(TypeId),
}

impl Slot {
    fn get(self, graph: &TypeGraph) -> Option<&PropertyDescriptor> {
        match self {
            Self::Member(id, index) => graph.node(id).body()?.properties.get(index),
            Self::Param(id, index) => graph.node(id).as_function()?.params.get(index),
            Self::Return(id) => graph.node(id).as_function()?.return_value.as_ref(),
        }
    }

    fn get_mut(self, graph: &mut TypeGraph) -> Option<&mut PropertyDescriptor> {
        match self {
            Self::Member(id, index) => graph.node_mut(id).body_mut()?.properties.get_mut(index),
            Self::Param(id, index) => graph.node_mut(id).as_function_mut()?.params.get_mut(index),
            Self::Return(id) => graph.node_mut(id).as_function_mut()?.return_value.as_mut(),
        }
    }
}

/// The delegate reference held by a property.
struct Reference {
    name: String,
    owner: Option<String>,
    signature: Option<TypeId>,
    multicast: bool,
    flags: PropertyFlags,
    line: u32,
}

impl Reference {
    fn of(prop: &PropertyDescriptor) -> Option<Self> {
        let PropertyType::Delegate {
            name,
            owner,
            signature,
            multicast,
        } = &prop.ty
        else {
            return None;
        };
        Some(Self {
            name: name.clone(),
            owner: owner.clone(),
            signature: *signature,
            multicast: *multicast,
            flags: prop.flags,
            line: prop.line,
        })
    }

    fn key(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}::{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// One pass over a group of declarations. Resolved signatures are cached
/// by delegate name for the length of the pass.
struct Fixup<'s> {
    session: &'s mut Session,
    filename: &'s str,
    cache: HashMap<String, TypeId>,
}

/// Binds the delegate properties of everything `unit` declared.
///
/// # Errors
/// Fails when a signature cannot be found, is not a delegate, or disagrees
/// with the property on being multicast.
pub fn fixup_unit(session: &mut Session, unit: UnitId, delegates: &[TypeId]) -> Result<()> {
    let filename = session.unit(unit).filename.clone();
    let types = session.unit(unit).defined_types.clone();

    for id in types {
        let node = session.graph().node(id);
        let Some(scope) = node.type_scope() else {
            continue;
        };
        Fixup::new(session, &filename).fix_struct(id, scope)?;
    }

    let mut pass = Fixup::new(session, &filename);
    for &delegate in delegates {
        let scope = pass.session.graph().node(delegate).scope;
        pass.fix_function(delegate, scope, delegate)?;
    }
    Ok(())
}

impl<'s> Fixup<'s> {
    fn new(session: &'s mut Session, filename: &'s str) -> Self {
        Self {
            session,
            filename,
            cache: HashMap::new(),
        }
    }

    fn fix_struct(&mut self, id: TypeId, scope: ScopeId) -> Result<()> {
        let Some(body) = self.session.graph().node(id).body() else {
            return Ok(());
        };
        let members = body.properties.len();
        let functions = body.functions.clone();
        for index in 0..members {
            self.fix_slot(Slot::Member(id, index), scope, id)?;
        }
        for function in functions {
            self.fix_function(function, scope, id)?;
        }
        Ok(())
    }

    /// `owner` is the struct or class the function is fixed up for, or
    /// the delegate itself at file scope.
    fn fix_function(&mut self, id: TypeId, scope: ScopeId, owner: TypeId) -> Result<()> {
        let Some(data) = self.session.graph().node(id).as_function() else {
            return Ok(());
        };
        let params = data.params.len();
        let has_return = data.return_value.is_some();
        for index in 0..params {
            self.fix_slot(Slot::Param(id, index), scope, owner)?;
        }
        if has_return {
            self.fix_slot(Slot::Return(id), scope, owner)?;
        }
        Ok(())
    }

    fn fix_slot(&mut self, slot: Slot, scope: ScopeId, owner: TypeId) -> Result<()> {
        let Some(reference) = slot.get(self.session.graph()).and_then(Reference::of) else {
            return Ok(());
        };

        let signature = match reference.signature {
            Some(signature) => {
                self.check_multicast(&reference, signature)?;
                signature
            }
            None => self.resolve(&reference, scope)?,
        };
        let multicast = self.is_multicast(signature);
        log::trace!(
            target: "reflector",
            "bound delegate {} to {}",
            reference.key(),
            self.session.graph().node(signature).name
        );

        if let Some(prop) = slot.get_mut(self.session.graph_mut()) {
            if let PropertyType::Delegate {
                signature: bound,
                multicast: kind,
                ..
            } = &mut prop.ty
            {
                *bound = Some(signature);
                *kind = multicast;
            }
        }

        let assignable = reference
            .flags
            .intersects(PropertyFlags::BLUEPRINT_ASSIGNABLE | PropertyFlags::BLUEPRINT_CALLABLE);
        if multicast && assignable {
            self.check_assignable(signature, owner, reference.line);
        }
        Ok(())
    }

    fn is_multicast(&self, signature: TypeId) -> bool {
        self.session
            .graph()
            .node(signature)
            .as_function()
            .is_some_and(|f| f.flags.contains(FunctionFlags::MULTICAST_DELEGATE))
    }

    /// Finds the signature for an unbound reference: in `scope` and its
    /// parents, then in the owner class, then anywhere.
    fn resolve(&mut self, reference: &Reference, scope: ScopeId) -> Result<TypeId> {
        let key = reference.key();
        if let Some(&cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let signature = signature_name(&reference.name);
        let graph = self.session.graph();
        let owner_scope = reference.owner.as_deref().and_then(|owner| {
            let owner = graph.find_global(self.session.config().redirect_type(owner))?;
            graph.node(owner).type_scope()
        });
        let found = graph
            .lookup(scope, &signature, true)
            .or_else(|| owner_scope.and_then(|s| graph.lookup(s, &signature, false)))
            .or_else(|| graph.find_delegate(&signature));

        let qualified = match &reference.owner {
            Some(owner) => format!("{owner}.{signature}"),
            None => signature.clone(),
        };
        let Some(found) = found else {
            return Err(Error::unresolved_type(format!("Failed to find delegate function '{qualified}'"))
                .located(self.filename, reference.line));
        };
        if !graph.node(found).is_delegate() {
            return Err(Error::semantic(format!(
                "Only delegate functions can be used as the type for a delegate property; '{qualified}' is not a delegate."
            ))
            .located(self.filename, reference.line));
        }
        self.cache.insert(key, found);
        Ok(found)
    }

    fn check_multicast(&self, reference: &Reference, signature: TypeId) -> Result<()> {
        let multicast = self.is_multicast(signature);
        if multicast == reference.multicast {
            return Ok(());
        }
        let name = &self.session.graph().node(signature).name;
        let message = if reference.multicast {
            format!(
                "Cannot declare a multi-cast delegate property for a single-cast delegate type '{name}'. Either mark the property as single-cast, or change the delegate type to multi-cast."
            )
        } else {
            format!(
                "Cannot declare a single-cast delegate property for a multi-cast delegate type '{name}'. Either mark the property as multi-cast, or change the delegate type to single-cast."
            )
        };
        Err(Error::semantic(message).located(self.filename, reference.line))
    }

    /// Parameters of delegates bound to scripting-assignable properties
    /// must be scripting types passed by value or const reference. A
    /// dynamic `owner` may pass arrays by reference.
    fn check_assignable(&mut self, signature: TypeId, owner: TypeId, line: u32) {
        let graph = self.session.graph();
        let dynamic = graph.node(owner).is_dynamic();
        let node = graph.node(signature);
        let Some(data) = node.as_function() else {
            return;
        };
        let mut problems = Vec::new();
        for param in &data.params {
            if !is_supported_by_blueprint(graph, param, false) {
                problems.push(format!(
                    "Type '{}' is not supported by blueprint. Function: {} Parameter {}",
                    param.cpp_type, node.name, param.name
                ));
            }
            let array_exception = dynamic && matches!(param.ty, PropertyType::Array(_));
            if param.is_out_param() && !array_exception {
                problems.push(format!(
                    "BlueprintAssignable delegates do not support non-const references at the moment. Function: {} Parameter: '{}'",
                    node.name, param.name
                ));
            }
        }
        for problem in problems {
            let diagnostic = Diagnostic::new(Severity::Error, "parse", problem).at(self.filename, line);
            self.session.diagnostics_mut().push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use reflector_foundation::ParserConfig;

    use super::*;
    use crate::resolver::parse_header;

    fn radio(property: &str) -> String {
        format!(
            "#include \"Radio.generated.h\"\nUCLASS()\nclass URadio : public UObject\n{{\n\
             \tGENERATED_BODY()\npublic:\n\t{property}\n\
             \tDECLARE_DYNAMIC_MULTICAST_DELEGATE_OneParam(FOnTuned, float, Frequency);\n}};\n"
        )
    }

    fn parse(source: &str) -> (Session, bool) {
        let mut session = Session::new(ParserConfig::default());
        let unit = session.add_unit("Game/Radio.h", "Game", source);
        let ok = parse_header(&mut session, unit).is_success();
        (session, ok)
    }

    #[test]
    fn later_signatures_are_bound_after_the_file() {
        let (session, ok) = parse(&radio("UPROPERTY()\n\tURadio::FOnTuned OnTuned;"));
        assert!(ok, "{:?}", session.errors());

        let graph = session.graph();
        let class = session.find_type("URadio").unwrap();
        let scope = graph.node(class).type_scope().unwrap();
        let expected = graph.lookup(scope, &signature_name("FOnTuned"), false).unwrap();
        let PropertyType::Delegate {
            signature,
            multicast,
            owner,
            ..
        } = &graph.node(class).body().unwrap().properties[0].ty
        else {
            panic!("expected a delegate property");
        };
        assert_eq!(*signature, Some(expected));
        assert!(*multicast);
        assert_eq!(owner.as_deref(), Some("URadio"));
    }

    #[test]
    fn missing_signatures_fail_the_file() {
        let (session, ok) = parse(&radio("UPROPERTY()\n\tURadio::FOnLost OnLost;"));
        assert!(!ok);
        assert_eq!(
            session.errors()[0].to_string(),
            format!("Failed to find delegate function 'URadio.{}'", signature_name("FOnLost"))
        );
    }

    fn listener(class_specifiers: &str) -> String {
        format!(
            "#include \"Listener.generated.h\"\n\
             DECLARE_DYNAMIC_MULTICAST_DELEGATE_OneParam(FOnItems, TArray<int32>&, Items);\n\
             UCLASS({class_specifiers})\nclass UListener : public UObject\n{{\n\
             \tGENERATED_BODY()\npublic:\n\tUPROPERTY(BlueprintAssignable)\n\tFOnItems OnItems;\n}};\n"
        )
    }

    fn reference_errors(session: &Session) -> usize {
        session
            .diagnostics()
            .entries()
            .iter()
            .filter(|d| d.message.contains("do not support non-const references"))
            .count()
    }

    #[test]
    fn assignable_delegates_reject_reference_params() {
        let (session, _) = parse(&listener(""));
        assert_eq!(reference_errors(&session), 1);
    }

    #[test]
    fn dynamic_owners_may_pass_arrays_by_reference() {
        let (session, _) = parse(&listener("meta = (ReplaceConverted = \"/Game/Listener\")"));
        let class = session.find_type("UListener").unwrap();
        assert!(session.graph().node(class).is_dynamic());
        assert_eq!(reference_errors(&session), 0);
    }

    #[test]
    fn reference_keys_include_the_owner() {
        let reference = Reference {
            name: "FOnTuned".to_string(),
            owner: Some("URadio".to_string()),
            signature: None,
            multicast: false,
            flags: PropertyFlags::empty(),
            line: 1,
        };
        assert_eq!(reference.key(), "URadio::FOnTuned");
    }
}
