//! `USTRUCT` declarations.

use reflector_foundation::{Error, GeneratedCodeVersion, MetaData, Result};
use reflector_model::specifiers::{MetadataSubject, StructSpecifier};
use reflector_model::{
    AccessSpecifier, StructBody, StructData, StructFlags, TypeId, TypeKind, TypeNode, strip_prefix,
};

use super::HeaderParser;
use super::specifiers::apply_metadata_specifier;
use crate::nest::AllowFlags;
use crate::resolver::is_api_macro;

impl HeaderParser<'_> {
    /// Parses `USTRUCT(...)` and the struct that follows it.
    pub(super) fn compile_struct(&mut self) -> Result<TypeId> {
        self.nests.check_allowed("'struct'", AllowFlags::TYPE_DECL)?;

        let mut metadata = MetaData::new();
        let specifiers = self.read_specifier_set("Struct", &mut metadata)?;
        self.stream
            .require_identifier_named("struct", "Struct declaration specifier")?;
        self.skip_deprecated_macro()?;

        let mut flags = StructFlags::NATIVE;
        let mut name = self.stream.require_identifier("struct name")?;
        if is_api_macro(&name) {
            flags |= StructFlags::REQUIRED_API;
            name = self.stream.require_identifier("struct name")?;
        }
        let name = name.text;
        let line = self.stream.line();
        log::trace!(target: "reflector", "{}({line}): struct {name}", self.filename);

        for specifier in &specifiers {
            match StructSpecifier::lookup(&specifier.key) {
                Some(StructSpecifier::NoExport) => {
                    flags.remove(StructFlags::NATIVE);
                    flags |= StructFlags::NO_EXPORT;
                }
                Some(StructSpecifier::Atomic) => flags |= StructFlags::ATOMIC,
                Some(StructSpecifier::Immutable) => flags |= StructFlags::IMMUTABLE | StructFlags::ATOMIC,
                None => apply_metadata_specifier("struct", specifier, &mut metadata)?,
            }
        }

        let file_scope = self.file_scope();
        if self.session.graph().scope(file_scope).get(&name).is_some() {
            return Err(Error::semantic(format!("struct: '{name}' already defined here")));
        }
        if let Some(existing) = self.session.graph().find_global(&name) {
            let existing = self.session.graph().node(existing);
            let message = match existing.unit {
                Some(unit) => format!(
                    "struct: '{name}' conflicts with another type of the same name defined at {}({})",
                    self.session.unit(unit).filename,
                    existing.line
                ),
                None => format!("struct: '{name}' conflicts with another type of the same name"),
            };
            return Err(Error::semantic(message));
        }

        let parent = self.parse_struct_parent()?;
        if let Some(parent) = parent {
            if let Some(data) = self.session.graph().node(parent).as_struct() {
                flags |= data.flags & StructFlags::INHERIT;
            }
        }
        self.check_struct_prefix(&name)?;

        self.validate_metadata(&name, &metadata, MetadataSubject::Type)?;
        let raw_comment = self.take_tooltip(&mut metadata);
        self.stream.require_symbol("{", "'struct'")?;
        let body_line = self.stream.line();

        let outer = parent
            .and_then(|p| self.session.graph().node(p).type_scope())
            .unwrap_or(file_scope);
        let graph = self.session.graph_mut();
        let type_scope = graph.add_type_scope(outer);
        let mut body = StructBody::new(type_scope);
        body.super_type = parent;
        body.body_line = body_line;
        let mut node = TypeNode::new(name.as_str(), file_scope, TypeKind::Struct(StructData { body, flags }))
            .declared_at(self.unit, line);
        node.metadata = metadata;
        node.raw_comment = raw_comment;
        let id = graph.add_node(node);
        graph.declare(file_scope, &name, id)?;
        graph.register_global(id)?;
        self.session.unit_mut(self.unit).defined_types.push(id);

        let saved_access = std::mem::replace(&mut self.access, AccessSpecifier::Public);
        let parsed = self.parse_struct_body(id, &name);
        self.access = saved_access;
        parsed?;

        let has_body = self
            .session
            .graph()
            .node(id)
            .body()
            .is_some_and(|b| b.generated_body_line.is_some());
        if !has_body && flags.contains(StructFlags::NATIVE) {
            return Err(Error::semantic("Expected a GENERATED_BODY() at the start of struct")
                .located(self.filename.clone(), body_line));
        }
        Ok(id)
    }

    /// Reads `: public Parent` and resolves the parent struct.
    fn parse_struct_parent(&mut self) -> Result<Option<TypeId>> {
        if !self.stream.match_symbol(":") {
            return Ok(None);
        }
        self.stream.require_identifier_named("public", "struct inheritance")?;
        let Some(parent) = self.stream.get_identifier() else {
            return Err(Error::syntax("'struct': Missing parent struct after ': public'"));
        };
        let name = self.session.config().redirect_type(&parent.text).to_string();
        let found = self
            .lookup_type(&name)
            .filter(|&id| self.session.graph().node(id).as_struct().is_some());
        match found {
            Some(id) => Ok(Some(id)),
            None => Err(Error::unresolved_type(format!("'struct': Can't find struct '{name}'"))),
        }
    }

    fn check_struct_prefix(&self, name: &str) -> Result<()> {
        let config = self.session.config();
        if config.structs_with_no_prefix.contains(name) {
            return Ok(());
        }
        let stripped = strip_prefix(name);
        let has_prefix = stripped.len() < name.len() && (name.starts_with('F') || name.starts_with('T'));
        if has_prefix {
            let expected_prefix = if config.structs_with_t_prefix.contains(stripped) { "T" } else { "F" };
            let expected = format!("{expected_prefix}{stripped}");
            if name != expected {
                return Err(Error::semantic(format!(
                    "Struct '{name}' has an invalid Unreal prefix, expecting '{expected}'"
                )));
            }
            return Ok(());
        }
        let expected_prefix = if config.structs_with_t_prefix.contains(name) { "T" } else { "F" };
        Err(Error::semantic(format!(
            "Struct '{name}' is missing a valid Unreal prefix, expecting '{expected_prefix}{name}'"
        )))
    }

    fn parse_struct_body(&mut self, id: TypeId, name: &str) -> Result<()> {
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax(format!("Unexpected end of struct definition {name}")));
            }
            self.comment.clone_from(&token.comment);

            if let Some(access) = super::parse_access_specifier(&token) {
                self.stream.require_symbol(":", &format!("after {token}"))?;
                self.access = access;
            } else if token.is_identifier("UPROPERTY") {
                self.compile_variable(id)?;
            } else if token.is_identifier("UFUNCTION") {
                return Err(Error::semantic("USTRUCTs cannot contain UFUNCTIONs."));
            } else if token.is_identifier("GENERATED_USTRUCT_BODY") || token.is_identifier("GENERATED_BODY") {
                if self.access != AccessSpecifier::Public {
                    return Err(Error::semantic(format!(
                        "{token} must be in the public scope of '{name}', not private or protected."
                    )));
                }
                let line = self.stream.line();
                let body = self.session.graph_mut().node_mut(id).body_mut();
                if let Some(body) = body {
                    if body.generated_body_line.is_some() {
                        return Err(Error::semantic(format!(
                            "Multiple {token} declarations found in '{name}'"
                        )));
                    }
                    body.generated_body_line = Some(line);
                }
                self.stream.require_symbol("(", "'struct'")?;
                self.compile_version(id)?;
                self.stream.require_symbol(")", "'struct'")?;
                self.stream.match_symbol(";");
            } else if token.is_symbol("#") {
                self.compile_struct_directive(name)?;
            } else if self.skip_unknown_object_macro(&token) {
            } else if token.is_symbol("}") {
                self.stream.match_symbol(";");
                return Ok(());
            } else {
                let text = token.text.clone();
                if !self.skip_declaration(token)? {
                    return Err(Error::syntax(format!("'struct': Unexpected '{text}'")));
                }
            }
        }
    }

    /// Reads the optional version argument of a generated-body macro,
    /// leaving the closing parenthesis in the stream.
    pub(super) fn compile_version(&mut self, owner: TypeId) -> Result<()> {
        let token = self.stream.get_token();
        if token.is_eof() {
            return Ok(());
        }
        let default = self.session.config().default_generated_code_version;
        let version = if token.is_symbol(")") {
            self.stream.unget_token(token);
            default
        } else {
            token
                .ident()
                .and_then(GeneratedCodeVersion::from_identifier)
                .unwrap_or(default)
        };
        if let Some(body) = self.session.graph_mut().node_mut(owner).body_mut() {
            body.generated_code_version = version;
        }
        Ok(())
    }
}
