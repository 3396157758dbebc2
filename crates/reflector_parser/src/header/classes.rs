//! `UCLASS` and `UINTERFACE` declarations, their `I<Name>` native mixins,
//! and the class-body members recognised without an annotation.

use reflector_foundation::{Error, MetaData, Result};
use reflector_model::specifiers::{
    ClassSpecifier, InterfaceSpecifier, MetadataSpecifier, MetadataSubject,
    require_exactly_one_value,
};
use reflector_model::{
    AccessSpecifier, ClassCategories, ClassData, ClassFlags, PropertyFlags, TypeId, TypeKind,
    TypeNode, strip_prefix,
};
use reflector_syntax::Token;

use super::specifiers::{Specifier, apply_metadata_specifier};
use super::HeaderParser;
use crate::directive::CompilerDirective;
use crate::nest::{AllowFlags, NestKind};
use crate::resolver::is_api_macro;

/// Category metadata keys a class copies from its parent.
const INHERITED_CATEGORY_KEYS: &[&str] = &[
    "HideCategories",
    "ShowCategories",
    "HideFunctions",
    "AutoExpandCategories",
    "AutoCollapseCategories",
];

const MISSING_GENERATED_BODY: &str = "Expected a GENERATED_BODY() at the start of class";

/// Which `Serialize` overload a class body declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArchiveKind {
    Binary,
    Structured,
}

impl ArchiveKind {
    const fn metadata_key(self) -> &'static str {
        match self {
            Self::Binary => "SerializeToFArchive",
            Self::Structured => "SerializeToFStructuredArchive",
        }
    }
}

fn join(names: &[String]) -> String {
    names.join(" ")
}

impl HeaderParser<'_> {
    // =========================================================================
    // Names
    // =========================================================================

    /// Reads `[XXX_API] Name`. Returns the name and whether an export macro
    /// was present.
    fn parse_declared_name(&mut self, what: &str) -> Result<(String, bool)> {
        let name = self.stream.require_identifier(what)?;
        if is_api_macro(&name) {
            let name = self.stream.require_identifier(what)?;
            return Ok((name.text, true));
        }
        Ok((name.text, false))
    }

    /// Finds a class by its script name: as written, then with the `U` and
    /// `A` prefixes in place of its own.
    pub(super) fn find_class(&self, name: &str) -> Option<TypeId> {
        let stripped = strip_prefix(name);
        let graph = self.session.graph();
        [name.to_string(), format!("U{stripped}"), format!("A{stripped}")]
            .iter()
            .find_map(|candidate| {
                self.lookup_type(candidate)
                    .filter(|&id| graph.node(id).is_class())
            })
    }

    pub(super) fn require_class(&self, name: &str) -> Result<TypeId> {
        self.find_class(name).ok_or_else(|| {
            Error::unresolved_type(format!("Unable to find class with name '{name}'"))
        })
    }

    // =========================================================================
    // UCLASS
    // =========================================================================

    /// Parses `UCLASS(...)` and the class head, leaving its body open.
    pub(super) fn compile_class(&mut self) -> Result<()> {
        self.nests.check_allowed("'class'", AllowFlags::CLASS)?;

        let mut metadata = MetaData::new();
        let specifiers = self.read_specifier_set("Class", &mut metadata)?;
        self.access = AccessSpecifier::Private;
        let raw_comment = self.take_tooltip(&mut metadata);

        self.stream.require_identifier_named("class", "Class declaration")?;
        self.skip_deprecated_macro()?;
        let (name, api) = self.parse_declared_name("class name")?;
        let line = self.stream.line();
        self.stream.match_identifier("final");
        log::trace!(target: "reflector", "{}({line}): class {name}", self.filename);

        let file_scope = self.file_scope();
        let mut class = ClassData::new(file_scope);
        let (parent, interfaces) = self.parse_class_bases(&name, &mut class.flags)?;
        class.body.super_type = parent;
        class.interfaces = interfaces;

        if let Some(parent) = parent {
            self.check_parent_compiled(&name, parent)?;
            self.inherit_from_parent(parent, &mut class, &mut metadata);
        }

        for specifier in &specifiers {
            self.apply_class_specifier(specifier, &mut class, &mut metadata)?;
        }

        class.flags |= ClassFlags::NATIVE | ClassFlags::PARSED;
        if api {
            class.flags |= ClassFlags::REQUIRED_API;
        }
        if class.flags.contains(ClassFlags::MINIMAL_API | ClassFlags::REQUIRED_API) {
            return Err(Error::semantic(
                "MinimalAPI cannot be specified when the class is fully exported using a MODULENAME_API macro",
            ));
        }
        write_category_metadata(&class.categories, &mut metadata);

        let prefix = match parent {
            Some(parent) if self.session.graph().is_child_of_named(parent, "AActor") => "A",
            _ => "U",
        };
        let expected = format!("{prefix}{}", strip_prefix(&name));
        if name != expected {
            return Err(Error::semantic(format!(
                "Class '{name}' has an invalid Unreal prefix, expecting '{expected}'"
            )));
        }
        self.validate_metadata(&name, &metadata, MetadataSubject::Type)?;

        let id = self.declare_class(&name, line, class, metadata, raw_comment)?;
        self.stream.require_symbol("{", "'Class'")?;
        self.set_body_line(id);
        let scope = self.session.graph().node(id).type_scope().unwrap_or(file_scope);
        self.nests.push(NestKind::Class, scope, Some(id))?;
        self.class = Some(id);
        Ok(())
    }

    /// Reads `: public Parent, public IInterface, ...`.
    fn parse_class_bases(
        &mut self,
        name: &str,
        flags: &mut ClassFlags,
    ) -> Result<(Option<TypeId>, Vec<TypeId>)> {
        if !self.stream.match_symbol(":") {
            return Ok((None, Vec::new()));
        }
        self.stream.require_identifier_named("public", "class inheritance")?;
        let Some(parent_name) = self.stream.get_identifier() else {
            return Err(Error::syntax("'extends': Missing class name"));
        };
        let parent = self.require_class(&parent_name.text)?;
        if self.session.graph().node(parent).is_interface() {
            return Err(Error::semantic(format!(
                "Class '{name}' cannot extend interface '{}', use 'implements'",
                parent_name.text
            )));
        }

        let mut interfaces = Vec::new();
        while self.stream.match_symbol(",") {
            if !self.stream.match_identifier("public") {
                return Err(Error::syntax("Interface inheritance must be public"));
            }
            let Some(base) = self.stream.get_identifier() else {
                return Err(Error::syntax("Failed to get interface class identifier"));
            };
            if self.stream.match_symbol("<") {
                // Templated native bases are never reflected interfaces.
                self.skip_template_arguments()?;
                continue;
            }
            // Bases that are not reflected classes are plain C++ and ignored.
            let Some(interface) = self.find_class(&base.text) else {
                continue;
            };
            let node = self.session.graph().node(interface);
            let Some(data) = node.as_class().filter(|c| c.is_interface()) else {
                return Err(Error::semantic(format!(
                    "Implements: Class {} is not an interface; Can only inherit from non-UObjects or UInterface derived interfaces",
                    node.name
                )));
            };
            *flags |= data.flags & ClassFlags::SCRIPT_INHERIT;
            interfaces.push(interface);
        }
        Ok((Some(parent), interfaces))
    }

    /// Skips template arguments after a consumed `<`.
    fn skip_template_arguments(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax("Unexpected end of file"));
            }
            if token.is_symbol("<") {
                depth += 1;
            } else if token.is_symbol(">") {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Every ancestor must have been parsed without errors.
    fn check_parent_compiled(&self, name: &str, parent: TypeId) -> Result<()> {
        let graph = self.session.graph();
        for ancestor in std::iter::once(parent).chain(graph.ancestors(parent)) {
            let node = graph.node(ancestor);
            let parsed = node
                .as_class()
                .is_some_and(|c| c.flags.intersects(ClassFlags::PARSED | ClassFlags::INTRINSIC));
            let failed = node.unit.is_some_and(|unit| self.session.is_failed(unit));
            if !parsed || failed {
                return Err(Error::semantic(format!(
                    "'{name}' can't be compiled: Parent class '{}' has errors",
                    node.name
                )));
            }
        }
        Ok(())
    }

    fn inherit_from_parent(&self, parent: TypeId, class: &mut ClassData, metadata: &mut MetaData) {
        let node = self.session.graph().node(parent);
        let Some(data) = node.as_class() else {
            return;
        };
        class.flags |= data.flags & ClassFlags::SCRIPT_INHERIT;
        class.config_name.clone_from(&data.config_name);
        class.within.clone_from(&data.within);
        class.categories = ClassCategories {
            class_group: Vec::new(),
            ..data.categories.clone()
        };
        for key in INHERITED_CATEGORY_KEYS {
            if let Some(value) = node.metadata.get(key) {
                metadata.insert(*key, value);
            }
        }
    }

    fn apply_class_specifier(
        &self,
        specifier: &Specifier,
        class: &mut ClassData,
        metadata: &mut MetaData,
    ) -> Result<()> {
        let Some(spec) = ClassSpecifier::lookup(&specifier.key) else {
            return apply_metadata_specifier("class", specifier, metadata);
        };
        let values = &specifier.values;
        let categories = &mut class.categories;
        match spec {
            ClassSpecifier::NoExport => class.flags |= ClassFlags::NO_EXPORT,
            ClassSpecifier::Intrinsic => class.flags |= ClassFlags::INTRINSIC,
            ClassSpecifier::Within => {
                let within = require_exactly_one_value(spec.name(), values)?;
                if self.find_class(&within).is_none() {
                    return Err(Error::unresolved_type(format!("Within class '{within}' not found.")));
                }
                class.within = Some(within);
            }
            ClassSpecifier::EditInlineNew => class.flags |= ClassFlags::EDIT_INLINE_NEW,
            ClassSpecifier::NotEditInlineNew => class.flags.remove(ClassFlags::EDIT_INLINE_NEW),
            ClassSpecifier::Placeable => {
                if !class.flags.contains(ClassFlags::NOT_PLACEABLE) {
                    return Err(Error::semantic(
                        "The 'placeable' specifier is only allowed on classes which have a base class that's marked as not placeable. Classes are assumed to be placeable by default.",
                    ));
                }
                class.flags.remove(ClassFlags::NOT_PLACEABLE);
            }
            ClassSpecifier::DefaultToInstanced => class.flags |= ClassFlags::DEFAULT_TO_INSTANCED,
            ClassSpecifier::HideDropdown => class.flags |= ClassFlags::HIDE_DROP_DOWN,
            ClassSpecifier::DependsOn => {
                return Err(Error::semantic(
                    "The dependsOn specifier is deprecated. Please use #include \"ClassHeaderFilename.h\" instead.",
                ));
            }
            ClassSpecifier::MinimalAPI => class.flags |= ClassFlags::MINIMAL_API,
            ClassSpecifier::Const => class.flags |= ClassFlags::CONST,
            ClassSpecifier::PerObjectConfig => class.flags |= ClassFlags::PER_OBJECT_CONFIG,
            ClassSpecifier::ConfigDoNotCheckDefaults => {
                class.flags |= ClassFlags::CONFIG_DO_NOT_CHECK_DEFAULTS;
            }
            ClassSpecifier::Abstract => class.flags |= ClassFlags::ABSTRACT,
            ClassSpecifier::Deprecated => {
                class.flags |= ClassFlags::DEPRECATED | ClassFlags::NOT_PLACEABLE;
            }
            ClassSpecifier::Transient => class.flags |= ClassFlags::TRANSIENT,
            ClassSpecifier::NonTransient => class.flags.remove(ClassFlags::TRANSIENT),
            ClassSpecifier::CustomConstructor => class.flags |= ClassFlags::CUSTOM_CONSTRUCTOR,
            ClassSpecifier::Config => {
                class.config_name = Some(require_exactly_one_value(spec.name(), values)?);
            }
            ClassSpecifier::DefaultConfig => class.flags |= ClassFlags::DEFAULT_CONFIG,
            ClassSpecifier::GlobalUserConfig => class.flags |= ClassFlags::GLOBAL_USER_CONFIG,
            ClassSpecifier::NotPlaceable => class.flags |= ClassFlags::NOT_PLACEABLE,
            ClassSpecifier::HideCategories => ClassCategories::add_unique(&mut categories.hide, values),
            ClassSpecifier::ShowCategories => {
                ClassCategories::add_unique(&mut categories.show, values);
                categories.hide.retain(|c| !values.contains(c));
            }
            ClassSpecifier::HideFunctions => {
                ClassCategories::add_unique(&mut categories.hide_functions, values);
            }
            ClassSpecifier::ShowFunctions => {
                ClassCategories::add_unique(&mut categories.show_functions, values);
                categories.hide_functions.retain(|c| !values.contains(c));
            }
            ClassSpecifier::AutoExpandCategories => {
                ClassCategories::add_unique(&mut categories.auto_expand, values);
                categories.auto_collapse.retain(|c| !values.contains(c));
            }
            ClassSpecifier::AutoCollapseCategories => {
                ClassCategories::add_unique(&mut categories.auto_collapse, values);
                categories.auto_expand.retain(|c| !values.contains(c));
            }
            ClassSpecifier::DontAutoCollapseCategories => {
                categories.auto_collapse.retain(|c| !values.contains(c));
                ClassCategories::add_unique(&mut categories.dont_auto_collapse, values);
            }
            ClassSpecifier::ClassGroup => {
                ClassCategories::add_unique(&mut categories.class_group, values);
            }
            ClassSpecifier::CollapseCategories => class.flags |= ClassFlags::COLLAPSE_CATEGORIES,
            ClassSpecifier::DontCollapseCategories => {
                class.flags.remove(ClassFlags::COLLAPSE_CATEGORIES);
            }
            ClassSpecifier::AdvancedClassDisplay => {
                metadata.insert("AdvancedClassDisplay", "true");
            }
            ClassSpecifier::ConversionRoot => {
                metadata.insert("IsConversionRoot", "true");
            }
            ClassSpecifier::Blueprintable => {
                metadata.insert("IsBlueprintBase", "true");
                metadata.insert("BlueprintType", "true");
            }
            ClassSpecifier::NotBlueprintable => {
                metadata.insert("IsBlueprintBase", "false");
                metadata.remove("BlueprintType");
            }
            ClassSpecifier::BlueprintType => {
                MetadataSpecifier::BlueprintType.apply(values, metadata)?;
            }
            ClassSpecifier::NotBlueprintType => {
                MetadataSpecifier::NotBlueprintType.apply(values, metadata)?;
            }
        }
        Ok(())
    }

    /// Adds a class or interface node, naming it in the file scope and the
    /// session registry.
    fn declare_class(
        &mut self,
        name: &str,
        line: u32,
        mut class: ClassData,
        metadata: MetaData,
        raw_comment: Option<String>,
    ) -> Result<TypeId> {
        let file_scope = self.file_scope();
        let graph = self.session.graph_mut();
        let outer = class
            .body
            .super_type
            .and_then(|p| graph.node(p).type_scope())
            .unwrap_or(file_scope);
        class.body.type_scope = graph.add_type_scope(outer);
        let mut node = TypeNode::new(name, file_scope, TypeKind::Class(class)).declared_at(self.unit, line);
        node.metadata = metadata;
        node.raw_comment = raw_comment;
        let id = graph.add_node(node);
        graph.declare(file_scope, name, id)?;
        graph.register_global(id)?;
        self.session.unit_mut(self.unit).defined_types.push(id);
        Ok(id)
    }

    fn set_body_line(&mut self, id: TypeId) {
        let line = self.stream.line();
        if let Some(body) = self.session.graph_mut().node_mut(id).body_mut() {
            body.body_line = line;
        }
    }

    // =========================================================================
    // UINTERFACE
    // =========================================================================

    /// Parses `UINTERFACE(...)` and the `U<Name>` head, leaving its body open.
    pub(super) fn compile_interface(&mut self) -> Result<()> {
        self.nests.check_allowed("'interface'", AllowFlags::CLASS)?;

        let mut metadata = MetaData::new();
        let specifiers = self.read_specifier_set("Interface", &mut metadata)?;
        let raw_comment = self.take_tooltip(&mut metadata);
        self.stream.require_identifier_named("class", "Interface declaration")?;
        let (name, api) = self.parse_declared_name("interface name")?;
        let line = self.stream.line();
        log::trace!(target: "reflector", "{}({line}): interface {name}", self.filename);

        let mut class = ClassData::new(self.file_scope());
        class.flags = ClassFlags::INTERFACE | ClassFlags::ABSTRACT | ClassFlags::NATIVE | ClassFlags::PARSED;
        if api {
            class.flags |= ClassFlags::REQUIRED_API;
        }

        if self.stream.match_symbol(":") {
            self.stream.require_identifier_named("public", "interface inheritance")?;
            let Some(parent_name) = self.stream.get_identifier() else {
                return Err(Error::syntax("'extends': Missing interface name"));
            };
            let parent = self.require_class(&parent_name.text)?;
            let parent_node = self.session.graph().node(parent);
            let parent_flags = parent_node.as_class().map_or(ClassFlags::empty(), |c| c.flags);
            if !parent_flags.contains(ClassFlags::INTERFACE) && name != "UInterface" {
                return Err(Error::semantic(format!(
                    "Interface class '{name}' cannot inherit from non-interface class '{}'",
                    parent_node.name
                )));
            }
            if !parent_flags.contains(ClassFlags::NATIVE) {
                return Err(Error::semantic("Native classes cannot extend non-native classes"));
            }
            self.check_parent_compiled(&name, parent)?;
            class.flags |= parent_flags & ClassFlags::SCRIPT_INHERIT;
            class.body.super_type = Some(parent);
        }

        for specifier in &specifiers {
            match InterfaceSpecifier::lookup(&specifier.key) {
                Some(InterfaceSpecifier::DependsOn) => {
                    return Err(Error::semantic(
                        "The dependsOn specifier is deprecated. Please use #include \"ClassHeaderFilename.h\" instead.",
                    ));
                }
                Some(InterfaceSpecifier::MinimalAPI) => class.flags |= ClassFlags::MINIMAL_API,
                Some(InterfaceSpecifier::ConversionRoot) => {
                    metadata.insert("IsConversionRoot", "true");
                }
                None => apply_metadata_specifier("interface", specifier, &mut metadata)?,
            }
        }

        let expected = format!("U{}", strip_prefix(&name));
        if name != expected {
            return Err(Error::semantic(format!(
                "Interface name '{name}' is invalid, the first class should be identified as '{expected}'"
            )));
        }
        self.validate_metadata(&name, &metadata, MetadataSubject::Type)?;

        let id = self.declare_class(&name, line, class, metadata, raw_comment)?;
        self.stream.require_symbol("{", "'Class'")?;
        self.set_body_line(id);
        let scope = self.session.graph().node(id).type_scope().unwrap_or_else(|| self.file_scope());
        self.nests.push(NestKind::Interface, scope, Some(id))?;
        self.class = Some(id);
        self.access = AccessSpecifier::Private;
        Ok(())
    }

    /// Handles a plain `class` at global scope. An `I<Name>` mixin of a
    /// known interface opens a native interface body; anything else is
    /// skipped as C++. Returns whether the declaration was consumed cleanly.
    pub(super) fn try_parse_native_interface(&mut self, class_token: Token) -> Result<bool> {
        let Some(mut name) = self.stream.get_identifier() else {
            return self.skip_plain_class(class_token);
        };
        if is_api_macro(&name) {
            match self.stream.get_identifier() {
                Some(next) => name = next,
                None => return self.skip_plain_class(class_token),
            }
        }
        if !name.text.starts_with('I') {
            return self.skip_plain_class(class_token);
        }
        let interface_name = format!("U{}", strip_prefix(&name.text));
        let Some(interface) = self
            .lookup_type(&interface_name)
            .filter(|&id| self.session.graph().node(id).is_interface())
        else {
            return self.skip_plain_class(class_token);
        };

        // Forward declaration.
        if self.stream.match_symbol(";") {
            self.class_body.open = false;
            return Ok(true);
        }

        const CONTEXT: &str = "C++ interface mix-in class declaration";
        if self.stream.match_symbol(":") {
            self.stream.require_identifier_named("public", CONTEXT)?;
            let Some(parent) = self.stream.get_identifier() else {
                return Err(Error::syntax(format!("Missing parent interface in {CONTEXT}")));
            };
            let resolved = self.require_class(&parent.text)?;
            if !self.session.graph().node(resolved).is_interface() {
                return Err(Error::semantic(format!(
                    "Interface '{}' must inherit from an interface",
                    name.text
                )));
            }
        }
        self.stream.require_symbol("{", CONTEXT)?;
        log::trace!(target: "reflector", "{}: native interface {}", self.filename, name.text);

        let scope = self
            .session
            .graph()
            .node(interface)
            .type_scope()
            .unwrap_or_else(|| self.file_scope());
        self.nests.push(NestKind::NativeInterface, scope, Some(interface))?;
        self.class = Some(interface);
        Ok(true)
    }

    fn skip_plain_class(&mut self, class_token: Token) -> Result<bool> {
        self.class_body.open = false;
        self.skip_declaration(class_token)
    }

    // =========================================================================
    // Generated bodies
    // =========================================================================

    fn read_generated_body(&mut self, token: &Token, owner: TypeId) -> Result<()> {
        self.stream.require_symbol("(", &token.text)?;
        self.compile_version(owner)?;
        self.stream.require_symbol(")", &token.text)?;
        self.stream.match_symbol(";");
        Ok(())
    }

    /// `GENERATED_IINTERFACE_BODY()` or `GENERATED_BODY()` in a mixin.
    pub(super) fn compile_native_interface_body(&mut self, token: &Token) -> Result<()> {
        if self.nests.top_kind() != Some(NestKind::NativeInterface) {
            return Err(Error::syntax(format!(
                "{token} must occur inside the native interface definition"
            )));
        }
        let owner = self.current_class()?;
        let line = self.stream.line();
        self.read_generated_body(token, owner)?;
        if let Some(class) = self.session.graph_mut().node_mut(owner).as_class_mut() {
            class.native_interface_body_line = Some(line);
        }
        self.class_body.iinterface_body = true;
        if token.is_identifier("GENERATED_IINTERFACE_BODY") {
            self.access = AccessSpecifier::Public;
        }
        Ok(())
    }

    /// `GENERATED_UINTERFACE_BODY()` or `GENERATED_BODY()` in a `UINTERFACE`.
    pub(super) fn compile_interface_body(&mut self, token: &Token) -> Result<()> {
        if self.nests.top_kind() != Some(NestKind::Interface) {
            return Err(Error::syntax(format!(
                "{token} must occur inside the interface definition"
            )));
        }
        let owner = self.current_class()?;
        let line = self.stream.line();
        self.read_generated_body(token, owner)?;
        if let Some(body) = self.session.graph_mut().node_mut(owner).body_mut() {
            body.generated_body_line = Some(line);
        }
        self.class_body.uinterface_body = true;
        if token.is_identifier("GENERATED_UINTERFACE_BODY") {
            self.access = AccessSpecifier::Public;
        }
        Ok(())
    }

    /// `GENERATED_UCLASS_BODY()` or `GENERATED_BODY()` in a `UCLASS`.
    pub(super) fn compile_class_body(&mut self, token: &Token) -> Result<()> {
        if self.nests.top_kind() != Some(NestKind::Class) {
            return Err(Error::syntax(format!("{token} must occur inside the class definition")));
        }
        let owner = self.current_class()?;
        if token.is_identifier("GENERATED_UCLASS_BODY") {
            self.access = AccessSpecifier::Public;
        }
        let line = self.stream.line();
        self.read_generated_body(token, owner)?;
        if let Some(body) = self.session.graph_mut().node_mut(owner).body_mut() {
            body.generated_body_line = Some(line);
        }
        self.class_body.generated_body = true;
        Ok(())
    }

    // =========================================================================
    // Closing
    // =========================================================================

    /// Handles the `}` closing a class, interface or mixin body.
    pub(super) fn close_class(&mut self) -> Result<()> {
        self.stream.match_symbol(";");
        let id = self.current_class()?;
        let state = std::mem::take(&mut self.class_body);

        match self.nests.top_kind() {
            Some(kind @ (NestKind::Interface | NestKind::NativeInterface)) => {
                self.nests.pop(kind, "'Interface'")?;
                let missing = if state.saw_annotation {
                    !state.uinterface_body
                } else {
                    !state.iinterface_body
                };
                if missing {
                    return Err(Error::semantic(MISSING_GENERATED_BODY));
                }
            }
            _ => {
                self.nests.pop(NestKind::Class, "'Class'")?;
                for problem in crate::validate::verify_property_markups(self.session.graph(), id) {
                    self.report_error(problem);
                }
                crate::validate::check_interface_conformance(self.session.graph(), id)?;
                if state.saw_annotation && !state.generated_body {
                    return Err(Error::semantic(MISSING_GENERATED_BODY));
                }
            }
        }
        self.class = None;
        self.access = AccessSpecifier::Private;
        Ok(())
    }

    // =========================================================================
    // Unannotated members
    // =========================================================================

    /// Records a constructor of the open class. Returns `Ok(handled)` when
    /// `token` began one, or hands back the token to continue with.
    pub(super) fn try_constructor(
        &mut self,
        token: Token,
    ) -> Result<std::result::Result<bool, Token>> {
        let id = self.current_class()?;
        let mut before: Option<Token> = None;
        let mut ctor = token;

        let explicit = ctor.is_identifier("explicit");
        if explicit {
            before = Some(std::mem::replace(&mut ctor, self.stream.get_token()));
        }
        if is_api_macro(&ctor) {
            if !explicit {
                self.stream.match_identifier("explicit");
            }
            before = Some(std::mem::replace(&mut ctor, self.stream.get_token()));
        }

        if ctor.text != self.session.graph().node(id).name {
            return Ok(Err(match before {
                Some(previous) => {
                    self.stream.unget_token(ctor);
                    previous
                }
                None => ctor,
            }));
        }

        let paren = self.stream.get_token();
        if !paren.is_symbol("(") {
            self.stream.unget_token(paren);
            return Ok(Err(ctor));
        }

        let mut found = self
            .session
            .graph()
            .node(id)
            .as_class()
            .map(|c| c.constructors)
            .unwrap_or_default();
        let mut vtable_ctor = false;
        if !found.default && self.stream.match_symbol(")") {
            found.default = true;
        } else if !found.object_initializer || !found.vtable_helper {
            let (mut is_const, mut is_ref, mut initializer_ctor) = (false, false, false);
            let mut depth = 1usize;
            while depth > 0 {
                let param = self.stream.get_token();
                if param.is_eof() {
                    break;
                }
                // A template or a second parameter rules both forms out.
                if param.is_symbol(",") || param.is_symbol("<") {
                    initializer_ctor = false;
                    vtable_ctor = false;
                    break;
                }
                if param.is_symbol("(") {
                    depth += 1;
                } else if param.is_symbol(")") {
                    depth -= 1;
                } else if param.is_identifier("const") {
                    is_const = true;
                } else if param.is_symbol("&") {
                    is_ref = true;
                } else if param.is_identifier("FObjectInitializer")
                    || param.is_identifier("FPostConstructInitializeProperties")
                {
                    initializer_ctor = true;
                } else if param.is_identifier("FVTableHelper") {
                    vtable_ctor = true;
                }
            }
            while depth > 0 {
                let param = self.stream.get_token();
                if param.is_eof() {
                    break;
                }
                if param.is_symbol("(") {
                    depth += 1;
                } else if param.is_symbol(")") {
                    depth -= 1;
                }
            }
            found.object_initializer |= initializer_ctor && is_ref && is_const;
            found.vtable_helper |= vtable_ctor && is_ref;
        }
        found.any |= !vtable_ctor;

        if let Some(class) = self.session.graph_mut().node_mut(id).as_class_mut() {
            class.constructors = found;
        }

        if self.stream.match_symbol(";") {
            return Ok(Ok(true));
        }
        // Inline definition.
        self.skip_declaration(ctor).map(Ok)
    }

    /// Looks for `void Serialize(FArchive&)` or the structured-archive form
    /// and records it on the open class. Returns the last token consumed,
    /// from which the declaration is then skipped.
    pub(super) fn detect_serialize(&mut self, mut token: Token) -> Result<Token> {
        while token.is_identifier("virtual") || is_api_macro(&token) {
            token = self.stream.get_token();
        }
        if !token.is_identifier("void") {
            return Ok(token);
        }
        token = self.stream.get_token();
        if !token.is_identifier("Serialize") {
            return Ok(token);
        }
        token = self.stream.get_token();
        if !token.is_symbol("(") {
            return Ok(token);
        }
        token = self.stream.get_token();
        let archive = if token.is_identifier("FArchive") {
            ArchiveKind::Binary
        } else if token.is_identifier("FStructuredArchive") {
            ArchiveKind::Structured
        } else {
            return Ok(token);
        };

        token = self.stream.get_token();
        let introducer = match archive {
            ArchiveKind::Binary => token.is_symbol("&"),
            ArchiveKind::Structured => {
                token.is_symbol("::") && {
                    token = self.stream.get_token();
                    token.is_identifier("FRecord")
                }
            }
        };
        if !introducer {
            return Ok(token);
        }
        token = self.stream.get_token();
        // The parameter name is optional.
        if !token.is_symbol(")") {
            token = self.stream.get_token();
        }
        if !token.is_symbol(")") {
            return Ok(token);
        }

        let define = match self.directives.open() {
            [] => "",
            [CompilerDirective::WithEditorOnlyData] => "WITH_EDITORONLY_DATA",
            _ => {
                return Err(Error::semantic(
                    "Serialize functions must be defined outside of all compiler define blocks, except for WITH_EDITORONLY_DATA",
                ));
            }
        };
        let id = self.current_class()?;
        let node = self.session.graph_mut().node_mut(id);
        node.metadata.insert(archive.metadata_key(), define);
        if let Some(class) = node.as_class_mut() {
            class.has_serialize = true;
        }
        Ok(token)
    }

    // =========================================================================
    // End of file
    // =========================================================================

    /// Derives class flags from the properties of every class in the unit
    /// and settles inherited config names.
    pub(super) fn post_parsing_class_setup(&mut self) -> Result<()> {
        let classes: Vec<TypeId> = self
            .session
            .unit(self.unit)
            .defined_types
            .iter()
            .copied()
            .filter(|&id| self.session.graph().node(id).is_class())
            .collect();

        for id in classes {
            let graph = self.session.graph();
            let node = graph.node(id);
            let Some(class) = node.as_class() else {
                continue;
            };
            let mut flags = class.flags;
            for property in &class.body.properties {
                if property.flags.contains(PropertyFlags::CONFIG) {
                    flags |= ClassFlags::CONFIG;
                }
                if property
                    .flags
                    .intersects(PropertyFlags::INSTANCED_REFERENCE | PropertyFlags::CONTAINS_INSTANCED_REFERENCE)
                {
                    flags |= ClassFlags::HAS_INSTANCED_REFERENCE;
                }
            }

            let mut config_name = class.config_name.clone();
            if flags.contains(ClassFlags::CONFIG) && config_name.is_none() {
                config_name = class
                    .body
                    .super_type
                    .and_then(|parent| graph.node(parent).as_class())
                    .and_then(|parent| parent.config_name.clone());
                if config_name.is_none() {
                    return Err(Error::semantic(format!(
                        "Classes with config / globalconfig member variables need to specify config file. ({})",
                        node.name
                    )));
                }
            }

            if let Some(class) = self.session.graph_mut().node_mut(id).as_class_mut() {
                class.flags = flags;
                class.config_name = config_name;
            }
        }
        Ok(())
    }
}

/// Writes the category lists as space-separated metadata.
fn write_category_metadata(categories: &ClassCategories, metadata: &mut MetaData) {
    let lists = [
        ("ClassGroupNames", &categories.class_group),
        ("AutoCollapseCategories", &categories.auto_collapse),
        ("HideCategories", &categories.hide),
        ("ShowCategories", &categories.show),
        ("HideFunctions", &categories.hide_functions),
        ("AutoExpandCategories", &categories.auto_expand),
    ];
    for (key, list) in lists {
        if list.is_empty() {
            metadata.remove(key);
        } else {
            metadata.insert(key, join(list));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_metadata_is_space_separated() {
        let categories = ClassCategories {
            hide: vec!["Rendering".into(), "Physics".into()],
            class_group: vec!["Common".into()],
            ..ClassCategories::default()
        };
        let mut metadata = MetaData::new();
        metadata.insert("ShowCategories", "Stale");
        write_category_metadata(&categories, &mut metadata);
        assert_eq!(metadata.get("HideCategories"), Some("Rendering Physics"));
        assert_eq!(metadata.get("ClassGroupNames"), Some("Common"));
        assert!(!metadata.contains("ShowCategories"));
    }

    #[test]
    fn archive_metadata_keys() {
        assert_eq!(ArchiveKind::Binary.metadata_key(), "SerializeToFArchive");
        assert_eq!(
            ArchiveKind::Structured.metadata_key(),
            "SerializeToFStructuredArchive"
        );
    }
}
