//! `UFUNCTION` declarations and the parameter lists they share with
//! delegates.

use reflector_foundation::{Error, MetaData, Result};
use reflector_model::specifiers::{FunctionSpecifier, MetadataSubject};
use reflector_model::{
    AccessSpecifier, ClassFlags, FunctionData, FunctionExportFlags, FunctionFlags,
    PropertyDescriptor, PropertyFlags, PropertyType, ScalarKind, TypeId, TypeKind, TypeNode,
    is_supported_by_blueprint,
};

use super::HeaderParser;
use super::specifiers::{Specifier, apply_metadata_specifier};
use super::types::{NameScope, VariableCategory};
use crate::nest::{AllowFlags, NestKind};
use crate::resolver::is_api_macro;
use crate::validate::parameters_match;

/// What a `UFUNCTION` or `UDELEGATE` specifier list asks for.
#[derive(Clone, Debug, Default)]
pub(super) struct FunctionSpec {
    pub flags: FunctionFlags,
    pub export_flags: FunctionExportFlags,
    pub rpc_id: Option<u16>,
    pub rpc_response_id: Option<u16>,
    pub endpoint_name: Option<String>,
    pub cpp_impl_name: Option<String>,
    pub cpp_validation_impl_name: Option<String>,
    pub sealed_event: bool,
    /// `BlueprintPure=false`.
    pub force_impure: bool,
}

impl FunctionSpec {
    fn new(flags: FunctionFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// Moves the gathered state into a function payload named `name`.
    pub(super) fn into_data(self, name: &str, owner: Option<TypeId>) -> FunctionData {
        let flags = self.flags;
        let implemented_elsewhere = flags.contains(FunctionFlags::NET)
            || (flags.contains(FunctionFlags::BLUEPRINT_EVENT) && flags.contains(FunctionFlags::NATIVE));
        let cpp_impl_name = self.cpp_impl_name.unwrap_or_else(|| {
            if implemented_elsewhere && !flags.contains(FunctionFlags::DELEGATE) {
                format!("{name}_Implementation")
            } else {
                name.to_string()
            }
        });
        let cpp_validation_impl_name = self
            .cpp_validation_impl_name
            .unwrap_or_else(|| format!("{name}_Validate"));
        FunctionData {
            flags,
            export_flags: self.export_flags,
            rpc_id: self.rpc_id,
            rpc_response_id: self.rpc_response_id,
            endpoint_name: self.endpoint_name,
            cpp_impl_name,
            cpp_validation_impl_name,
            owner,
            ..FunctionData::default()
        }
    }
}

/// Parses a service identifier, which must fit in `1..=65535`.
fn parse_net_id(text: &str) -> Result<u16> {
    let value = text
        .split_once('=')
        .map_or("", |(_, value)| value)
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|&id| id > 0);
    value.ok_or_else(|| Error::semantic(format!("Invalid network identifier {text} for function")))
}

/// Reads `ServiceRequest(Endpoint, Id=N, ResponseId=N)` values.
fn parse_net_service_identifiers(spec: &mut FunctionSpec, values: &[String]) -> Result<()> {
    for value in values {
        let value = value.trim();
        match value.split_once('=') {
            Some((key, _)) if key.trim().eq_ignore_ascii_case("Id") => {
                spec.rpc_id = Some(parse_net_id(value)?);
            }
            Some((key, _)) if key.trim().eq_ignore_ascii_case("ResponseId") => {
                spec.rpc_response_id = Some(parse_net_id(value)?);
            }
            Some(_) => {}
            None => {
                if let Some(existing) = &spec.endpoint_name {
                    return Err(Error::semantic(format!(
                        "Function should not specify multiple endpoints - '{value}' found but already using '{existing}'"
                    )));
                }
                spec.endpoint_name = Some(value.to_string());
            }
        }
    }
    Ok(())
}

/// Converts a C++ default argument to the text stored as
/// `CPP_Default_<Param>`.
fn default_value_text(cpp: &str) -> String {
    let text = cpp.trim();
    if let Some(inner) = text
        .strip_prefix("TEXT(")
        .and_then(|t| t.strip_suffix(')'))
        .map(str::trim)
    {
        return inner.trim_matches('"').to_string();
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return text[1..text.len() - 1].to_string();
    }
    match text {
        "nullptr" | "NULL" | "NAME_None" | "FName()" => return "None".to_string(),
        "FString()" | "FText()" | "FText::GetEmpty()" => return String::new(),
        _ => {}
    }
    let numeric = text.trim_end_matches(['f', 'F']);
    if !numeric.is_empty() && numeric.parse::<f64>().is_ok() {
        return numeric.to_string();
    }
    text.to_string()
}

/// Parameters `AdvancedDisplay` metadata marks: either a list of names or
/// the index of the first advanced parameter.
fn is_advanced_display(metadata: &MetaData, index: usize, name: &str) -> bool {
    let Some(value) = metadata.get("AdvancedDisplay") else {
        return false;
    };
    if let Ok(first) = value.trim().parse::<usize>() {
        return index >= first;
    }
    value.split(',').any(|entry| entry.trim() == name)
}

impl HeaderParser<'_> {
    /// Applies `UFUNCTION`/`UDELEGATE` specifiers to `spec` and checks the
    /// combinations.
    pub(super) fn process_function_specifiers(
        &mut self,
        spec: &mut FunctionSpec,
        specifiers: &[Specifier],
        metadata: &mut MetaData,
    ) -> Result<()> {
        let mut unreliable = false;
        let mut saw_accessor = false;

        for specifier in specifiers {
            let Some(known) = FunctionSpecifier::lookup(&specifier.key) else {
                apply_metadata_specifier("function", specifier, metadata)?;
                continue;
            };
            let flags = spec.flags;
            match known {
                FunctionSpecifier::BlueprintNativeEvent | FunctionSpecifier::BlueprintImplementableEvent => {
                    let native = known == FunctionSpecifier::BlueprintNativeEvent;
                    let kind = specifier.key.as_str();
                    if flags.contains(FunctionFlags::NET) {
                        self.report_error(format!("{kind} functions cannot be replicated!"));
                    } else if flags.contains(FunctionFlags::BLUEPRINT_EVENT)
                        && flags.contains(FunctionFlags::NATIVE) != native
                    {
                        self.report_error(
                            "A function cannot be both BlueprintNativeEvent and BlueprintImplementableEvent!",
                        );
                    } else if saw_accessor {
                        self.report_error(format!(
                            "A function cannot be both {kind} and a Blueprint Property accessor!"
                        ));
                    } else if flags.contains(FunctionFlags::PRIVATE) {
                        self.report_error(format!("A Private function cannot be a {kind}!"));
                    }
                    spec.flags |= FunctionFlags::EVENT | FunctionFlags::BLUEPRINT_EVENT;
                    if !native {
                        spec.flags.remove(FunctionFlags::NATIVE);
                    }
                }
                FunctionSpecifier::Exec => {
                    spec.flags |= FunctionFlags::EXEC;
                    if flags.contains(FunctionFlags::NET) {
                        self.report_error("Exec functions cannot be replicated!");
                    }
                }
                FunctionSpecifier::SealedEvent => spec.sealed_event = true,
                FunctionSpecifier::Server | FunctionSpecifier::Client => {
                    if flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
                        return Err(Error::semantic(
                            "BlueprintImplementableEvent or BlueprintNativeEvent functions cannot be declared as Client or Server",
                        ));
                    }
                    spec.flags |= FunctionFlags::NET;
                    spec.flags |= if known == FunctionSpecifier::Server {
                        FunctionFlags::NET_SERVER
                    } else {
                        FunctionFlags::NET_CLIENT
                    };
                    if let Some(name) = specifier.values.first() {
                        spec.cpp_impl_name = Some(name.clone());
                    }
                    if known == FunctionSpecifier::Server && flags.contains(FunctionFlags::EXEC) {
                        self.report_error("Exec functions cannot be replicated!");
                    }
                }
                FunctionSpecifier::NetMulticast => {
                    if flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
                        return Err(Error::semantic(
                            "BlueprintImplementableEvent or BlueprintNativeEvent functions cannot be declared as Multicast",
                        ));
                    }
                    spec.flags |= FunctionFlags::NET | FunctionFlags::NET_MULTICAST;
                }
                FunctionSpecifier::ServiceRequest | FunctionSpecifier::ServiceResponse => {
                    let kind = specifier.key.as_str();
                    if flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
                        return Err(Error::semantic(format!(
                            "BlueprintImplementableEvent or BlueprintNativeEvent functions cannot be declared as a {kind}"
                        )));
                    }
                    spec.flags |= FunctionFlags::NET | FunctionFlags::NET_RELIABLE;
                    if known == FunctionSpecifier::ServiceRequest {
                        spec.flags |= FunctionFlags::NET_REQUEST;
                        spec.export_flags |= FunctionExportFlags::CUSTOM_THUNK;
                    } else {
                        spec.flags |= FunctionFlags::NET_RESPONSE;
                    }
                    parse_net_service_identifiers(spec, &specifier.values)?;
                    if spec.endpoint_name.is_none() {
                        return Err(Error::semantic(format!("{kind} needs to specify an endpoint name")));
                    }
                }
                FunctionSpecifier::Reliable => spec.flags |= FunctionFlags::NET_RELIABLE,
                FunctionSpecifier::Unreliable => unreliable = true,
                FunctionSpecifier::CustomThunk => spec.export_flags |= FunctionExportFlags::CUSTOM_THUNK,
                FunctionSpecifier::BlueprintCallable => spec.flags |= FunctionFlags::BLUEPRINT_CALLABLE,
                FunctionSpecifier::BlueprintGetter | FunctionSpecifier::BlueprintSetter => {
                    let getter = known == FunctionSpecifier::BlueprintGetter;
                    if flags.contains(FunctionFlags::EVENT) {
                        self.report_error(format!(
                            "Function cannot be a blueprint event and a blueprint {}.",
                            if getter { "getter" } else { "setter" }
                        ));
                    }
                    saw_accessor = true;
                    spec.flags |= FunctionFlags::BLUEPRINT_CALLABLE;
                    if getter {
                        spec.flags |= FunctionFlags::BLUEPRINT_PURE;
                    }
                    metadata.insert(specifier.key.as_str(), "");
                }
                FunctionSpecifier::BlueprintPure => {
                    let pure = specifier
                        .values
                        .first()
                        .is_none_or(|value| value.eq_ignore_ascii_case("true"));
                    spec.flags |= FunctionFlags::BLUEPRINT_CALLABLE;
                    if pure {
                        spec.flags |= FunctionFlags::BLUEPRINT_PURE;
                    } else {
                        spec.force_impure = true;
                    }
                }
                FunctionSpecifier::BlueprintAuthorityOnly => {
                    spec.flags |= FunctionFlags::BLUEPRINT_AUTHORITY_ONLY;
                }
                FunctionSpecifier::BlueprintCosmetic => spec.flags |= FunctionFlags::BLUEPRINT_COSMETIC,
                FunctionSpecifier::WithValidation => {
                    spec.flags |= FunctionFlags::NET_VALIDATE;
                    if let Some(name) = specifier.values.first() {
                        spec.cpp_validation_impl_name = Some(name.clone());
                    }
                }
            }
        }

        let flags = spec.flags;
        if flags.contains(FunctionFlags::NET) {
            spec.flags |= FunctionFlags::EVENT;
            let service = flags.intersects(FunctionFlags::NET_REQUEST | FunctionFlags::NET_RESPONSE);
            let reliable = flags.contains(FunctionFlags::NET_RELIABLE);
            if flags.contains(FunctionFlags::STATIC) {
                self.report_error("Static functions can't be replicated");
            }
            if !reliable && !unreliable && !service {
                self.report_error("Replicated function: 'reliable' or 'unreliable' is required");
            }
            if reliable && unreliable && !service {
                self.report_error("'reliable' and 'unreliable' are mutually exclusive");
            }
        } else if flags.contains(FunctionFlags::NET_RELIABLE) {
            return Err(Error::semantic("'reliable' specified without 'client' or 'server'"));
        } else if unreliable {
            return Err(Error::semantic("'unreliable' specified without 'client' or 'server'"));
        }

        if spec.sealed_event && !spec.flags.contains(FunctionFlags::EVENT) {
            self.report_error("SealedEvent may only be used on events");
        }
        if spec.sealed_event && spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
            self.report_error("SealedEvent cannot be used on Blueprint events");
        }
        if spec.force_impure && spec.flags.contains(FunctionFlags::BLUEPRINT_PURE) {
            self.report_error(
                "BlueprintPure (or BlueprintPure=true) and BlueprintPure=false should not both appear on the same function, they are mutually exclusive",
            );
        }
        Ok(())
    }

    /// Parses `UFUNCTION(...)` and the method declaration that follows.
    pub(super) fn compile_function(&mut self) -> Result<()> {
        self.nests.check_allowed("'Function'", AllowFlags::FUNCTION)?;

        let mut metadata = MetaData::new();
        let specifiers = self.read_specifier_set("Function", &mut metadata)?;
        let class = self.current_class()?;
        let (class_name, class_flags, cannot_implement) = {
            let node = self.session.graph().node(class);
            (
                node.name.clone(),
                node.as_class().map_or(ClassFlags::empty(), |c| c.flags),
                node.metadata.contains("CannotImplementInterfaceInBlueprint"),
            )
        };
        if !class_flags.contains(ClassFlags::NATIVE) {
            return Err(Error::internal("Should only be here for native classes!"));
        }
        let is_interface = class_flags.contains(ClassFlags::INTERFACE);
        let macro_line = self.stream.line();

        let mut spec = FunctionSpec::new(FunctionFlags::NATIVE | self.access.function_flag());
        let mut automatically_final = true;
        if self.access == AccessSpecifier::Private {
            spec.flags |= FunctionFlags::FINAL;
            automatically_final = false;
        }
        if class_flags.contains(ClassFlags::CONST) {
            spec.flags |= FunctionFlags::CONST;
        }
        if self.stream.match_identifier("static") {
            spec.flags |= FunctionFlags::STATIC;
            spec.export_flags |= FunctionExportFlags::CPP_STATIC;
        }
        if metadata.contains("CppFromBpEvent") {
            spec.flags |= FunctionFlags::EVENT;
        }
        if self.directives.is_with_editor() {
            spec.flags |= FunctionFlags::EDITOR_ONLY;
        }

        self.process_function_specifiers(&mut spec, &specifiers, &mut metadata)?;

        if spec.flags.contains(FunctionFlags::NET_SERVER) && !spec.flags.contains(FunctionFlags::NET_VALIDATE) {
            return Err(Error::semantic(
                "Server RPC missing 'WithValidation' keyword in the UFUNCTION() declaration statement.  Required for security purposes.",
            ));
        }
        if spec.export_flags.contains(FunctionExportFlags::CUSTOM_THUNK) && !metadata.contains("CustomThunk") {
            metadata.insert("CustomThunk", "true");
        }
        if spec.flags.contains(FunctionFlags::BLUEPRINT_PURE) && is_interface {
            self.report_error("BlueprintPure specifier is not allowed for interface functions");
        }

        let mut kind = "function";
        if spec.flags.contains(FunctionFlags::NET) {
            kind = "event";
            automatically_final = false;
        }
        if spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
            kind = if spec.flags.contains(FunctionFlags::NATIVE) {
                "BlueprintNativeEvent"
            } else {
                "BlueprintImplementableEvent"
            };
            automatically_final = false;
        }

        let mut saw_virtual = self.stream.match_identifier("virtual");
        let internal_only = metadata.get("BlueprintInternalUseOnly") == Some("true");
        self.check_function_category(&spec, &metadata, internal_only);

        if is_interface {
            if spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT) && cannot_implement && !internal_only {
                self.report_error(
                    "Interfaces that are not implementable in blueprints cannot have BlueprintImplementableEvent members.",
                );
            }
            if spec.flags.contains(FunctionFlags::BLUEPRINT_CALLABLE)
                && !spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT)
                && !cannot_implement
            {
                self.report_error(
                    "Blueprint implementable interfaces cannot contain BlueprintCallable functions that are not BlueprintImplementableEvents.  Use CannotImplementInterfaceInBlueprint on the interface if you wish to keep this function.",
                );
            }
        }

        if is_api_macro(self.stream.peek()) {
            let api = self.stream.get_token().text;
            if class_flags.intersects(ClassFlags::REQUIRED_API | ClassFlags::MINIMAL_API) {
                return Err(Error::semantic(format!(
                    "'{api}' must not be used on methods of a class that is marked '{api}' itself."
                )));
            }
            spec.flags |= FunctionFlags::REQUIRED_API;
            spec.export_flags |= FunctionExportFlags::REQUIRED_API;
            if self.stream.match_identifier("static") {
                return Err(Error::semantic(format!(
                    "Unexpected API macro '{api}'. Did you mean to put '{api}' after the static keyword?"
                )));
            }
        }
        saw_virtual |= self.stream.match_identifier("virtual");

        if saw_virtual {
            automatically_final = false;
            spec.export_flags |= FunctionExportFlags::VIRTUAL;
            if spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
                if is_interface {
                    return Err(Error::semantic(
                        "BlueprintImplementableEvents in Interfaces must not be declared 'virtual'",
                    ));
                } else if spec.flags.contains(FunctionFlags::NATIVE) {
                    self.report_error("BlueprintNativeEvent functions must be non-virtual.");
                } else {
                    self.warn(
                        "function",
                        "BlueprintImplementableEvents should not be virtual. Use BlueprintNativeEvent instead.",
                    );
                }
            }
        } else if is_interface && !spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
            return Err(Error::semantic(
                "Interface functions that are not BlueprintImplementableEvents must be declared 'virtual'",
            ));
        }

        if spec.sealed_event {
            spec.export_flags |= FunctionExportFlags::SEALED_EVENT;
        }
        if automatically_final || spec.sealed_event {
            spec.flags |= FunctionFlags::FINAL;
            spec.export_flags |= FunctionExportFlags::FINAL;
            if is_interface {
                self.report_error("Interface functions cannot be declared 'final'");
            }
        }

        let return_type = if self.stream.match_identifier("void") {
            None
        } else {
            Some(self.parse_var_type(
                VariableCategory::Return,
                PropertyFlags::empty(),
                Some(class),
                Vec::new(),
                MetaData::new(),
            )?)
        };

        let Some(name) = self.stream.get_identifier() else {
            return Err(Error::syntax(format!("Missing {kind} name")));
        };
        let name = name.text;
        if !self.stream.match_symbol("(") {
            return Err(Error::syntax(format!("Bad {kind} definition")));
        }
        log::trace!(target: "reflector", "{}({macro_line}): {kind} {class_name}::{name}", self.filename);

        if spec.flags.contains(FunctionFlags::NET) {
            let service = spec
                .flags
                .intersects(FunctionFlags::NET_REQUEST | FunctionFlags::NET_RESPONSE);
            if return_type.is_some() && !service {
                return Err(Error::semantic("Replicated functions can't have return values"));
            }
            self.track_rpc_ids(&spec, &name)?;
        }

        let scope = self.current_scope();
        let node = TypeNode::new(name.as_str(), scope, TypeKind::Function(FunctionData::default()))
            .declared_at(self.unit, macro_line);
        let id = self.session.graph_mut().add_node(node);

        self.nests.push(NestKind::FunctionDeclaration, scope, Some(id))?;
        let params = self.parse_parameter_list(&name, spec.flags, Some(class), false, &mut metadata)?;
        let return_value = match return_type {
            Some(mut prop) => {
                prop.flags |= PropertyFlags::PARM | PropertyFlags::OUT_PARM | PropertyFlags::RETURN_PARM;
                let names = NameScope {
                    owner: Some(class),
                    function: Some((name.as_str(), params.as_slice())),
                };
                self.parse_var_name_and_dim(&mut prop, VariableCategory::Return, names)?;
                Some(prop)
            }
            None => None,
        };
        self.nests.pop(NestKind::FunctionDeclaration, "'Function'")?;

        let has_outputs = return_value.is_some()
            || params.iter().any(|p| p.flags.contains(PropertyFlags::OUT_PARM));

        let super_function = {
            let graph = self.session.graph();
            graph
                .node(class)
                .super_type()
                .and_then(|parent| graph.find_function(parent, &name, true))
        };
        if let Some(overridden) = super_function {
            let graph = self.session.graph();
            let outer = graph
                .node(overridden)
                .as_function()
                .and_then(|f| f.owner)
                .map_or_else(String::new, |owner| graph.node(owner).name.clone());
            self.report_error(format!(
                "{name}: Override of UFUNCTION in parent class ({outer}) cannot have a UFUNCTION() declaration above it; it will use the same parameters as the original declaration."
            ));
        }

        if !has_outputs && spec.flags.contains(FunctionFlags::BLUEPRINT_PURE) {
            self.report_error(
                "BlueprintPure specifier is not allowed for functions with no return value and no output parameters.",
            );
        }

        if self.stream.match_identifier("const") {
            spec.flags |= FunctionFlags::CONST;
            if has_outputs && spec.flags.contains(FunctionFlags::BLUEPRINT_CALLABLE) && !spec.force_impure {
                spec.flags |= FunctionFlags::BLUEPRINT_PURE;
            }
        }

        self.parse_field_metadata(&name, &mut metadata)?;
        let raw_comment = self.take_tooltip(&mut metadata);

        let mut found_final = self.stream.match_identifier("final");
        let found_override = self.stream.match_identifier("override");
        if !found_final && found_override {
            found_final = self.stream.match_identifier("final");
        }
        if found_override {
            spec.export_flags |= FunctionExportFlags::OVERRIDE;
        }
        if self.stream.match_symbol("=") && self.stream.get_token().int_value() != Some(0) {
            return Err(Error::syntax("Expected 0 to indicate function is abstract"));
        }
        if found_final {
            spec.flags |= FunctionFlags::FINAL;
            spec.export_flags |= FunctionExportFlags::FINAL;
            if is_interface {
                return Err(Error::semantic("Interface functions cannot be declared 'final'"));
            } else if spec.flags.contains(FunctionFlags::BLUEPRINT_EVENT) {
                return Err(Error::semantic("Blueprint events cannot be declared 'final'"));
            }
        }

        if let Some(overridden) = super_function {
            let parent_flags = self
                .session
                .graph()
                .node(overridden)
                .as_function()
                .map_or(FunctionFlags::empty(), |f| f.flags);
            if (spec.flags & FunctionFlags::NET_FUNCS) != (parent_flags & FunctionFlags::NET_FUNCS) {
                return Err(Error::semantic(format!(
                    "Overridden function '{name}': Cannot specify different replication flags when overriding a function."
                )));
            }
        }

        if spec
            .flags
            .intersects(FunctionFlags::BLUEPRINT_CALLABLE | FunctionFlags::BLUEPRINT_EVENT)
        {
            self.check_blueprint_signature(&name, params.iter().chain(return_value.iter()))?;
        }

        if params.iter().any(|p| p.flags.contains(PropertyFlags::OUT_PARM)) {
            spec.flags |= FunctionFlags::HAS_OUT_PARMS;
        }
        if metadata.iter().any(|(key, _)| key.starts_with("CPP_Default_")) {
            spec.flags |= FunctionFlags::HAS_DEFAULTS;
        }

        let mut data = spec.into_data(&name, Some(class));
        data.params = params;
        data.return_value = return_value;
        data.super_function = super_function;

        let param_names = data.param_names();
        let subject = MetadataSubject::Function {
            params: &param_names,
            is_static: data.flags.contains(FunctionFlags::STATIC),
            in_function_library: self
                .session
                .graph()
                .is_child_of_named(class, "UBlueprintFunctionLibrary"),
        };
        self.validate_metadata(&name, &metadata, subject)?;

        self.check_sibling_function(scope, &name, &data)?;

        let graph = self.session.graph_mut();
        let node = graph.node_mut(id);
        node.metadata = metadata;
        node.raw_comment = raw_comment;
        node.kind = TypeKind::Function(data);
        graph.declare(scope, &name, id)?;
        if let Some(body) = graph.node_mut(class).body_mut() {
            body.functions.push(id);
        }

        let next = self.stream.get_token();
        if next.is_eof() {
            return Err(Error::syntax("Unexpected end of file"));
        }
        if next.is_symbol("{") {
            self.skip_braces("function body")?;
        } else if !next.is_symbol(";") {
            self.stream.unget_token(next);
        }
        Ok(())
    }

    /// Engine modules must categorise scripting-callable functions.
    fn check_function_category(&mut self, spec: &FunctionSpec, metadata: &MetaData, internal_only: bool) {
        if !spec
            .flags
            .intersects(FunctionFlags::BLUEPRINT_CALLABLE | FunctionFlags::BLUEPRINT_PURE)
        {
            return;
        }
        let deprecated = metadata.contains("DeprecatedFunction");
        let accessor = metadata.contains("BlueprintSetter") || metadata.contains("BlueprintGetter");
        let categorised = metadata.contains("Category");
        if !categorised && !internal_only && !deprecated && !accessor && self.session.config().engine_module {
            self.report_error(
                "An explicit Category specifier is required for Blueprint accessible functions in an Engine module.",
            );
        }
    }

    /// Claims the service ids of a replicated function.
    fn track_rpc_ids(&mut self, spec: &FunctionSpec, name: &str) -> Result<()> {
        if let Some(id) = spec.rpc_id {
            if let Some(existing) = self.rpc.used.get(&id) {
                return Err(Error::semantic(format!(
                    "Function {existing} already uses identifier {id}"
                )));
            }
            self.rpc.used.insert(id, name.to_string());
            if spec.flags.contains(FunctionFlags::NET_RESPONSE) {
                self.rpc.pending.remove(&id);
            }
        }
        if let Some(response) = spec.rpc_response_id {
            if !self.rpc.used.contains_key(&response) {
                self.rpc.pending.insert(response, name.to_string());
            }
        }
        Ok(())
    }

    fn check_blueprint_signature<'p>(
        &mut self,
        function: &str,
        params: impl Iterator<Item = &'p PropertyDescriptor>,
    ) -> Result<()> {
        let mut problems = Vec::new();
        for param in params {
            if param.is_static_array() {
                return Err(Error::semantic(format!(
                    "Static array cannot be exposed to blueprint. Function: {function} Parameter {}",
                    param.name
                )));
            }
            if !is_supported_by_blueprint(self.session.graph(), param, false) {
                problems.push(format!(
                    "Type '{}' is not supported by blueprint. {function}.{}",
                    param.cpp_type, param.name
                ));
            }
        }
        for problem in problems {
            self.report_error(problem);
        }
        Ok(())
    }

    /// Rejects a second declaration that differs from an earlier one only
    /// in its return type. Other duplicates fail when the name is declared.
    fn check_sibling_function(
        &self,
        scope: reflector_model::ScopeId,
        name: &str,
        data: &FunctionData,
    ) -> Result<()> {
        let graph = self.session.graph();
        let Some(existing) = graph.scope(scope).get(name) else {
            return Ok(());
        };
        let Some(other) = graph.node(existing).as_function() else {
            return Ok(());
        };
        if graph.node(existing).is_delegate() || !parameters_match(&other.params, &data.params) {
            return Ok(());
        }
        let same_return = match (&other.return_value, &data.return_value) {
            (Some(a), Some(b)) => a.ty.matches(&b.ty),
            (None, None) => true,
            _ => false,
        };
        if same_return {
            return Ok(());
        }
        Err(Error::semantic(format!(
            "Function '{name}' conflicts only by return type with '{}'",
            graph.node(existing).name
        )))
    }

    /// Reads parameters up to and including `)`. Delegates separate each
    /// type from its name with a comma.
    pub(super) fn parse_parameter_list(
        &mut self,
        function: &str,
        flags: FunctionFlags,
        owner: Option<TypeId>,
        comma_before_name: bool,
        metadata: &mut MetaData,
    ) -> Result<Vec<PropertyDescriptor>> {
        let mut params: Vec<PropertyDescriptor> = Vec::new();
        if self.stream.match_symbol(")") {
            return Ok(params);
        }

        let category = if flags.contains(FunctionFlags::NET) {
            VariableCategory::ReplicatedParameter
        } else {
            VariableCategory::RegularParameter
        };
        let disallow = !(PropertyFlags::PARM_FLAGS
            | PropertyFlags::AUTO_WEAK
            | PropertyFlags::REP_SKIP
            | PropertyFlags::UOBJECT_WRAPPER
            | PropertyFlags::NATIVE_ACCESS);

        loop {
            let mut prop = self.parse_var_type(category, disallow, owner, Vec::new(), MetaData::new())?;
            prop.flags |= PropertyFlags::PARM;
            if comma_before_name {
                self.stream.require_symbol(
                    ",",
                    "Delegate definitions require a , between the parameter type and parameter name",
                )?;
            }
            let names = NameScope {
                owner,
                function: Some((function, params.as_slice())),
            };
            self.parse_var_name_and_dim(&mut prop, category, names)?;

            if is_advanced_display(metadata, params.len(), &prop.name) {
                prop.flags |= PropertyFlags::ADVANCED_DISPLAY;
            }
            self.check_parameter(&prop, flags)?;

            if self.stream.match_symbol("=") {
                let default = self.read_default_argument()?;
                let key = format!("CPP_Default_{}", prop.name);
                let stored = flags.intersects(FunctionFlags::BLUEPRINT_CALLABLE | FunctionFlags::EXEC);
                if stored && !metadata.contains(&key) {
                    let value = default_value_text(&default);
                    log::debug!(target: "reflector", "C++ default parameter parsed: {} \"{default}\" -> \"{value}\"", prop.name);
                    metadata.insert(key, value);
                }
            }
            params.push(prop);

            if !self.stream.match_symbol(",") {
                break;
            }
        }
        self.stream.require_symbol(")", "parameter list")?;
        Ok(params)
    }

    /// Replication and scripting rules for one parameter.
    fn check_parameter(&mut self, prop: &PropertyDescriptor, flags: FunctionFlags) -> Result<()> {
        let is_delegate = matches!(prop.ty, PropertyType::Delegate { .. });
        if flags.contains(FunctionFlags::NET) {
            let out = prop.flags.contains(PropertyFlags::OUT_PARM);
            let skipped = prop.flags.contains(PropertyFlags::REP_SKIP);
            if flags.contains(FunctionFlags::NET_REQUEST) {
                if !skipped && out {
                    self.report_error(
                        "Service request functions cannot contain out parameters, unless marked NotReplicated",
                    );
                }
                if !skipped && is_delegate {
                    self.report_error(
                        "Service request functions cannot contain delegate parameters, unless marked NotReplicated",
                    );
                }
            } else {
                if out {
                    self.report_error("Replicated functions cannot contain out parameters");
                }
                if skipped {
                    self.report_error("Only service request functions cannot contain NoReplication parameters");
                }
                if is_delegate {
                    self.report_error(
                        "Replicated functions cannot contain delegate parameters (this would be insecure)",
                    );
                }
                let const_ref = prop.ref_qualifier == reflector_model::RefQualifier::ConstRef;
                if matches!(prop.ty, PropertyType::String) && !const_ref && !prop.is_static_array() {
                    self.report_error("Replicated FString parameters must be passed by const reference");
                }
                if matches!(prop.ty, PropertyType::Array(_)) && !const_ref && !prop.is_static_array() {
                    self.report_error("Replicated TArray parameters must be passed by const reference");
                }
            }
        }

        if flags.intersects(FunctionFlags::BLUEPRINT_EVENT | FunctionFlags::BLUEPRINT_CALLABLE) {
            if let PropertyType::Enum {
                underlying: Some(kind), ..
            } = prop.ty
            {
                if kind != ScalarKind::Byte {
                    return Err(Error::semantic(
                        "Invalid enum param for Blueprints - currently only uint8 supported",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Reads a default argument up to the next top-level `,` or `)`, which
    /// stays in the stream.
    fn read_default_argument(&mut self) -> Result<String> {
        let mut span: Option<(usize, usize)> = None;
        let mut depth = 0usize;
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax("Missing ')' in parameter list"));
            }
            if depth == 0 && (token.is_symbol(")") || token.is_symbol(",")) {
                self.stream.unget_token(token);
                break;
            }
            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth -= 1;
            }
            let start = span.map_or(token.span.start, |(start, _)| start);
            span = Some((start, token.span.end));
        }
        Ok(span.map_or_else(String::new, |(start, end)| {
            self.stream.slice(start, end).trim().to_string()
        }))
    }
}
