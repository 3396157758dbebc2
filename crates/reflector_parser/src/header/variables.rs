//! `UPROPERTY` member declarations.

use reflector_foundation::{Error, MetaData, Result};
use reflector_model::specifiers::MetadataSubject;
use reflector_model::{
    BoolKind, PointerKind, PropertyFlags, PropertyType, StructFlags, TypeId, TypeKind,
    is_supported_by_blueprint, is_supported_by_expose_on_spawn,
};

use super::HeaderParser;
use super::types::{NameScope, VariableCategory};

impl HeaderParser<'_> {
    /// Parses `UPROPERTY(...) Type Name [DIM] [: 1] [= init];` and appends
    /// the property to `owner`.
    pub(super) fn compile_variable(&mut self, owner: TypeId) -> Result<()> {
        let mut metadata = MetaData::new();
        let specifiers = self.read_specifier_set("Variable", &mut metadata)?;
        let mut prop = self.parse_var_type(
            VariableCategory::Member,
            PropertyFlags::PARM_FLAGS,
            Some(owner),
            specifiers,
            metadata,
        )?;

        let owner_name = self.session.graph().node(owner).name.clone();
        let owner_is_struct = matches!(self.session.graph().node(owner).kind, TypeKind::Struct(_));
        let exposed = prop.is_exposed();

        if !prop.metadata.contains("Category") && exposed {
            if self.session.config().engine_module {
                self.report_error(
                    "An explicit Category specifier is required for any property exposed to the editor or Blueprints in an Engine module.",
                );
            } else {
                prop.metadata.insert("Category", owner_name.as_str());
            }
        }

        if let PropertyType::Object { class, .. } = prop.ty {
            if prop.pointer == PointerKind::Native && self.session.graph().is_child_of_named(class, "UInterface") {
                let type_name = prop.cpp_type.trim_end_matches('*').trim_end();
                return Err(Error::semantic(format!(
                    "UPROPERTY pointers cannot be interfaces - did you mean TScriptInterface<{type_name}>?"
                )));
            }
        }

        let announced = PropertyFlags::EDIT
            | PropertyFlags::BLUEPRINT_VISIBLE
            | PropertyFlags::BLUEPRINT_ASSIGNABLE
            | PropertyFlags::BLUEPRINT_CALLABLE;
        if prop.metadata.contains("Category") && !prop.flags.intersects(announced) {
            self.warn(
                "property",
                "Property has a Category set but is not exposed to the editor or Blueprints with EditAnywhere, BlueprintReadWrite, VisibleAnywhere, BlueprintReadOnly, BlueprintAssignable, BlueprintCallable keywords.",
            );
        }

        if !prop.flags.contains(PropertyFlags::EDIT) {
            if prop.flags.contains(PropertyFlags::DISABLE_EDIT_ON_INSTANCE) {
                self.report_error("Property cannot have 'DisableEditOnInstance' without being editable");
            }
            if prop.flags.contains(PropertyFlags::DISABLE_EDIT_ON_TEMPLATE) {
                self.report_error("Property cannot have 'DisableEditOnTemplate' without being editable");
            }
        }

        if prop.metadata.get("ExposeOnSpawn") == Some("true")
            && !is_supported_by_expose_on_spawn(self.session.graph(), &prop)
        {
            self.report_error("ExposeOnSpawn - Property cannot be exposed");
        }

        let scope = NameScope {
            owner: Some(owner),
            function: None,
        };
        self.parse_var_name_and_dim(&mut prop, VariableCategory::Member, scope)?;
        self.parse_bitfield(&mut prop)?;
        self.check_deprecated_class(&prop);
        let subject = MetadataSubject::Property {
            numeric_or_struct: prop.ty.is_numeric() || matches!(prop.ty, PropertyType::Struct { .. }),
        };
        self.validate_metadata(&prop.name, &prop.metadata, subject)?;

        if self.stream.match_symbol(",") {
            return Err(Error::semantic(format!(
                "Comma delimited properties cannot be converted {owner_name}.{}",
                prop.name
            )));
        }

        if prop.flags.contains(PropertyFlags::BLUEPRINT_VISIBLE) {
            let graph = self.session.graph();
            let mut problems = Vec::new();
            if owner_is_struct && !graph.bool_metadata_hierarchical(owner, "BlueprintType") {
                problems.push(format!(
                    "Cannot expose property to blueprints in a struct that is not a BlueprintType. {owner_name}.{}",
                    prop.name
                ));
            }
            if prop.is_static_array() {
                problems.push(format!(
                    "Static array cannot be exposed to blueprint {owner_name}.{}",
                    prop.name
                ));
            }
            if !is_supported_by_blueprint(graph, &prop, true) {
                problems.push(format!(
                    "Type '{}' is not supported by blueprint. {owner_name}.{}",
                    prop.cpp_type, prop.name
                ));
            }
            for problem in problems {
                self.report_error(problem);
            }
        }

        self.skip_member_initializer()?;
        self.stream.require_symbol(";", "'variable declaration'")?;
        while self.stream.match_symbol(";") {}

        log::trace!(
            target: "reflector",
            "{}({}): property {owner_name}.{}: {}",
            self.filename,
            prop.line,
            prop.name,
            prop.cpp_type
        );

        let instanced = prop
            .flags
            .intersects(PropertyFlags::INSTANCED_REFERENCE | PropertyFlags::CONTAINS_INSTANCED_REFERENCE);
        let node = self.session.graph_mut().node_mut(owner);
        if instanced {
            if let Some(data) = node.as_struct_mut() {
                data.flags |= StructFlags::HAS_INSTANCED_REFERENCE;
            }
        }
        if let Some(body) = node.body_mut() {
            body.properties.push(prop);
        }
        Ok(())
    }

    /// Reads `: 1` after a member name. Unsigned integers become bit-sized
    /// bools.
    fn parse_bitfield(&mut self, prop: &mut reflector_model::PropertyDescriptor) -> Result<()> {
        if !self.stream.match_symbol(":") {
            return Ok(());
        }
        match prop.ty {
            PropertyType::Bool(_) => {}
            PropertyType::Scalar(kind) => match kind.bitfield_bits() {
                Some(bits) => prop.ty = PropertyType::Bool(BoolKind::Bitfield(bits)),
                None => {
                    return Err(Error::semantic(format!(
                        "Bitfield '{}' must be declared as bool, uint8, uint16 or uint32",
                        prop.name
                    )));
                }
            },
            _ => {
                return Err(Error::semantic(format!(
                    "Bitfield '{}' must be declared as bool, uint8, uint16 or uint32",
                    prop.name
                )));
            }
        }
        let size = self.stream.get_token();
        if size.int_value() != Some(1) {
            return Err(Error::semantic(format!(
                "Bad or missing bitfield size for '{}', must be 1.",
                prop.name
            )));
        }
        Ok(())
    }

    /// Skips `= expr` up to the terminating `;`, or a braced initializer.
    fn skip_member_initializer(&mut self) -> Result<()> {
        if self.stream.match_symbol("=") {
            loop {
                if self.stream.peek_symbol(";") {
                    return Ok(());
                }
                if self.stream.get_token().is_eof() {
                    return Err(Error::syntax("Missing ';' in 'variable declaration'"));
                }
            }
        }
        if self.stream.match_symbol("{") {
            self.skip_braces("member initializer")?;
        }
        Ok(())
    }

    /// Skips to the `}` matching an already consumed `{`.
    pub(super) fn skip_braces(&mut self, what: &str) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax(format!("Missing '}}' in {what}")));
            }
            if token.is_symbol("{") {
                depth += 1;
            } else if token.is_symbol("}") {
                depth -= 1;
            }
        }
        Ok(())
    }
}
