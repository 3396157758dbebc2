//! Property types and declarator names.
//!
//! [`HeaderParser::parse_var_type`] reads the optional specifier list and the
//! C++ type of a member, parameter or return value and resolves it against
//! the graph. `parse_var_name_and_dim` reads the declarator that follows.

use reflector_foundation::{Error, MetaData, Result};
use reflector_model::specifiers::{ParameterSpecifier, VariableSpecifier, require_exactly_one_value};
use reflector_model::{
    AccessSpecifier, BoolKind, ClassFlags, PointerKind, PropertyDescriptor, PropertyFlags,
    PropertyType, RefQualifier, ReferenceStrength, ScalarKind, StructFlags, TypeId, TypeKind,
    strip_prefix,
};

use super::HeaderParser;
use super::delegates::signature_name;
use super::specifiers::Specifier;

/// Where a declarator appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum VariableCategory {
    Member,
    RegularParameter,
    ReplicatedParameter,
    Return,
}

impl VariableCategory {
    /// Prefix used in declarator errors.
    pub(super) const fn hint_text(self) -> &'static str {
        match self {
            Self::Member => "Member variable declaration",
            Self::RegularParameter | Self::ReplicatedParameter => "Function parameter",
            Self::Return => "Function return type",
        }
    }

    const fn is_member(self) -> bool {
        matches!(self, Self::Member)
    }
}

/// Names a declarator must not collide with.
#[derive(Clone, Copy, Debug)]
pub(super) struct NameScope<'p> {
    /// Struct or class whose members are visible.
    pub owner: Option<TypeId>,
    /// Function name and the parameters read so far, for parameters.
    pub function: Option<(&'p str, &'p [PropertyDescriptor])>,
}

/// Smart-pointer templates that wrap an object class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ObjectWrapper {
    Lazy,
    Soft,
    Weak,
    AutoWeak,
    ScriptInterface,
    Subobject,
}

impl ObjectWrapper {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "TLazyObjectPtr" => Self::Lazy,
            "TSoftObjectPtr" => Self::Soft,
            "TWeakObjectPtr" => Self::Weak,
            "TAutoWeakObjectPtr" => Self::AutoWeak,
            "TScriptInterface" => Self::ScriptInterface,
            "TSubobjectPtr" => Self::Subobject,
            _ => return None,
        })
    }
}

/// Flags and qualifiers gathered while a type is read.
#[derive(Clone, Copy, Debug, Default)]
struct TypeState {
    flags: PropertyFlags,
    native_const: bool,
    native_const_template_arg: bool,
    pointer: PointerKind,
    ref_qualifier: RefQualifier,
}

/// `inline`, `FORCENOINLINE` and the `FORCEINLINE` family before a return
/// type.
fn is_inline_keyword(name: &str) -> bool {
    name == "inline" || name == "FORCENOINLINE" || name.starts_with("FORCEINLINE")
}

/// Casts stripped from a static array dimension before it is matched
/// against enum tags.
const DIMENSION_CASTS: &[&str] = &[
    "(uint32)",
    "(int32)",
    "(uint16)",
    "(int16)",
    "(uint8)",
    "(int8)",
    "(int)",
    "(unsigned)",
    "(signed)",
    "(unsigned int)",
    "(signed int)",
];

fn strip_dimension_casts(dimension: &str) -> &str {
    let mut text = dimension.trim();
    loop {
        let before = text;
        if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            if inner.matches('(').count() == inner.matches(')').count() {
                text = inner.trim();
            }
        }
        for cast in DIMENSION_CASTS {
            if let Some(rest) = text.strip_prefix(cast) {
                text = rest.trim();
            }
        }
        if text == before {
            return text;
        }
    }
}

fn transient_names(flags: PropertyFlags) -> String {
    [
        (PropertyFlags::DUPLICATE_TRANSIENT, "DuplicateTransient"),
        (PropertyFlags::TEXT_EXPORT_TRANSIENT, "TextExportTransient"),
        (PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT, "NonPIEDuplicateTransient"),
    ]
    .iter()
    .filter(|(flag, _)| flags.contains(*flag))
    .map(|(_, name)| *name)
    .collect::<Vec<_>>()
    .join(", ")
}

impl HeaderParser<'_> {
    // =========================================================================
    // Types
    // =========================================================================

    /// Reads a variable type. Members pass the specifiers of their
    /// `UPROPERTY`; parameters may carry a `UPARAM(...)` that is read here.
    ///
    /// `owner` is the struct or class the member belongs to, or the class
    /// declaring the function for parameters.
    pub(super) fn parse_var_type(
        &mut self,
        category: VariableCategory,
        disallow: PropertyFlags,
        owner: Option<TypeId>,
        specifiers: Vec<Specifier>,
        mut metadata: MetaData,
    ) -> Result<PropertyDescriptor> {
        let member = category.is_member();
        let (owner_is_struct, owner_class_flags) = match owner.map(|id| &self.session.graph().node(id).kind) {
            Some(TypeKind::Struct(_)) => (true, None),
            Some(TypeKind::Class(class)) => (false, Some(class.flags)),
            _ => (false, None),
        };
        let const_class = owner_class_flags.is_some_and(|f| f.contains(ClassFlags::CONST));

        let mut implied = PropertyFlags::empty();
        if member && const_class {
            implied |= PropertyFlags::BLUEPRINT_READ_ONLY;
        }

        let mut specifiers = specifiers;
        if !member && self.stream.match_identifier("UPARAM") {
            specifiers = self.read_specifier_set("Variable", &mut metadata)?;
        }

        let mut state = TypeState::default();
        if !member && self.stream.match_identifier("const") {
            state.flags |= PropertyFlags::CONST_PARM;
            state.native_const = true;
        }
        if member && self.editor_only() {
            state.flags |= PropertyFlags::EDITOR_ONLY;
        }

        let mut rep_notify = None;
        if member {
            self.apply_member_specifiers(
                &specifiers,
                owner_is_struct,
                &mut state.flags,
                &mut implied,
                &mut metadata,
                &mut rep_notify,
            )?;
        } else {
            self.apply_parameter_specifiers(&specifiers, category, &mut state.flags)?;
        }

        if metadata.contains("ExposeOnSpawn") {
            if state.flags.contains(PropertyFlags::DISABLE_EDIT_ON_INSTANCE) {
                self.warn(
                    "property",
                    "Property cannot have both 'DisableEditOnInstance' and 'ExposeOnSpawn' flags",
                );
            }
            if !state.flags.contains(PropertyFlags::BLUEPRINT_VISIBLE) {
                self.warn(
                    "property",
                    "Property cannot have 'ExposeOnSpawn' without 'BlueprintVisible' flag.",
                );
            }
            state.flags |= PropertyFlags::EXPOSE_ON_SPAWN;
        }

        let access = if member { self.access } else { AccessSpecifier::Public };
        state.flags |= access.property_flag();
        if access == AccessSpecifier::Protected {
            state.flags |= PropertyFlags::PROTECTED;
        }

        let (ty, cpp_type) = self.read_type(category, disallow, &mut state)?;

        if member && const_class {
            state.native_const |= self.stream.match_identifier("const");
        }

        if self.stream.match_symbol("&") {
            let is_const = state.flags.contains(PropertyFlags::CONST_PARM);
            match category {
                VariableCategory::RegularParameter | VariableCategory::Return => {
                    state.flags |= PropertyFlags::OUT_PARM;
                    if is_const {
                        state.flags |= PropertyFlags::REFERENCE_PARM;
                    }
                }
                VariableCategory::ReplicatedParameter => {
                    if !is_const {
                        return Err(Error::semantic(format!(
                            "Replicated {cpp_type} parameters cannot be passed by non-const reference"
                        )));
                    }
                    state.flags |= PropertyFlags::REFERENCE_PARM;
                }
                VariableCategory::Member => {}
            }
            state.ref_qualifier = if is_const {
                RefQualifier::ConstRef
            } else {
                RefQualifier::NonConstRef
            };
        }

        let mut prop = PropertyDescriptor::new("", ty)
            .with_cpp_type(cpp_type)
            .with_flags(state.flags | implied)
            .at_line(self.stream.line());
        prop.pointer = state.pointer;
        prop.ref_qualifier = state.ref_qualifier;
        prop.rep_notify = rep_notify;

        if prop.flags.contains(PropertyFlags::REP_NOTIFY) && prop.rep_notify.is_none() {
            return Err(Error::semantic(
                "Must specify a valid function name for replication notifications",
            ));
        }
        self.check_property_flags(&prop, category, owner_class_flags.is_some(), disallow)?;
        if !member {
            self.check_deprecated_class(&prop);
        }

        prop.metadata = metadata;
        if state.native_const {
            prop.metadata.insert("NativeConst", "");
        }
        if state.native_const_template_arg {
            prop.metadata.insert("NativeConstTemplateArg", "");
        }
        Ok(prop)
    }

    fn apply_member_specifiers(
        &mut self,
        specifiers: &[Specifier],
        owner_is_struct: bool,
        flags: &mut PropertyFlags,
        implied: &mut PropertyFlags,
        metadata: &mut MetaData,
        rep_notify: &mut Option<String>,
    ) -> Result<()> {
        let mut seen_edit = false;
        let mut seen_write = false;
        let mut seen_read_only = false;
        let mut seen_getter = false;
        let private_access = self.access == AccessSpecifier::Private
            && metadata.get("AllowPrivateAccess") != Some("true");

        for specifier in specifiers {
            let Some(known) = VariableSpecifier::lookup(&specifier.key) else {
                return Err(Error::unknown_specifier("variable", &specifier.key));
            };
            let edit = match known {
                VariableSpecifier::EditAnywhere => Some(PropertyFlags::EDIT),
                VariableSpecifier::EditInstanceOnly => {
                    Some(PropertyFlags::EDIT | PropertyFlags::DISABLE_EDIT_ON_TEMPLATE)
                }
                VariableSpecifier::EditDefaultsOnly => {
                    Some(PropertyFlags::EDIT | PropertyFlags::DISABLE_EDIT_ON_INSTANCE)
                }
                VariableSpecifier::VisibleAnywhere => Some(PropertyFlags::EDIT | PropertyFlags::EDIT_CONST),
                VariableSpecifier::VisibleInstanceOnly => Some(
                    PropertyFlags::EDIT | PropertyFlags::EDIT_CONST | PropertyFlags::DISABLE_EDIT_ON_TEMPLATE,
                ),
                VariableSpecifier::VisibleDefaultsOnly => Some(
                    PropertyFlags::EDIT | PropertyFlags::EDIT_CONST | PropertyFlags::DISABLE_EDIT_ON_INSTANCE,
                ),
                _ => None,
            };
            if let Some(edit) = edit {
                if seen_edit {
                    self.report_error(format!(
                        "Found more than one edit/visibility specifier ({}), only one is allowed",
                        specifier.key
                    ));
                }
                *flags |= edit;
                seen_edit = true;
                continue;
            }

            match known {
                VariableSpecifier::BlueprintReadWrite => {
                    if seen_read_only {
                        self.report_error(
                            "Cannot specify a property as being both BlueprintReadOnly and BlueprintReadWrite.",
                        );
                    }
                    if private_access {
                        self.report_error("BlueprintReadWrite should not be used on private members");
                    }
                    if flags.contains(PropertyFlags::EDITOR_ONLY) && owner_is_struct {
                        self.report_error("Blueprint exposed struct members cannot be editor only");
                    }
                    *flags |= PropertyFlags::BLUEPRINT_VISIBLE;
                    seen_write = true;
                }
                VariableSpecifier::BlueprintSetter => {
                    if seen_read_only {
                        self.report_error(
                            "Cannot specify a property as being both BlueprintReadOnly and having a BlueprintSetter.",
                        );
                    }
                    if owner_is_struct {
                        self.report_error("Cannot specify BlueprintSetter for a struct member.");
                    }
                    let setter = require_exactly_one_value(&specifier.key, &specifier.values)?;
                    metadata.insert("BlueprintSetter", setter);
                    *flags |= PropertyFlags::BLUEPRINT_VISIBLE;
                    seen_write = true;
                }
                VariableSpecifier::BlueprintReadOnly => {
                    if seen_write {
                        self.report_error(
                            "Cannot specify both BlueprintReadOnly and BlueprintReadWrite or BlueprintSetter.",
                        );
                    }
                    if private_access {
                        self.report_error("BlueprintReadOnly should not be used on private members");
                    }
                    if flags.contains(PropertyFlags::EDITOR_ONLY) && owner_is_struct {
                        self.report_error("Blueprint exposed struct members cannot be editor only");
                    }
                    *flags |= PropertyFlags::BLUEPRINT_VISIBLE | PropertyFlags::BLUEPRINT_READ_ONLY;
                    implied.remove(PropertyFlags::BLUEPRINT_READ_ONLY);
                    seen_read_only = true;
                }
                VariableSpecifier::BlueprintGetter => {
                    if owner_is_struct {
                        self.report_error("Cannot specify BlueprintGetter for a struct member.");
                    }
                    let getter = require_exactly_one_value(&specifier.key, &specifier.values)?;
                    metadata.insert("BlueprintGetter", getter);
                    *flags |= PropertyFlags::BLUEPRINT_VISIBLE;
                    seen_getter = true;
                }
                VariableSpecifier::Config => *flags |= PropertyFlags::CONFIG,
                VariableSpecifier::GlobalConfig => {
                    *flags |= PropertyFlags::GLOBAL_CONFIG | PropertyFlags::CONFIG;
                }
                VariableSpecifier::Localized => {
                    self.report_error("The Localized specifier is deprecated");
                }
                VariableSpecifier::Transient => *flags |= PropertyFlags::TRANSIENT,
                VariableSpecifier::DuplicateTransient => *flags |= PropertyFlags::DUPLICATE_TRANSIENT,
                VariableSpecifier::TextExportTransient => *flags |= PropertyFlags::TEXT_EXPORT_TRANSIENT,
                VariableSpecifier::NonPIETransient => {
                    self.warn(
                        "deprecation",
                        "NonPIETransient is deprecated - NonPIEDuplicateTransient should be used instead",
                    );
                    *flags |= PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT;
                }
                VariableSpecifier::NonPIEDuplicateTransient => {
                    *flags |= PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT;
                }
                VariableSpecifier::Export => *flags |= PropertyFlags::EXPORT_OBJECT,
                VariableSpecifier::EditInline => {
                    self.report_error("EditInline is deprecated. Remove it, or use Instanced instead.");
                }
                VariableSpecifier::NoClear => *flags |= PropertyFlags::NO_CLEAR,
                VariableSpecifier::EditFixedSize => *flags |= PropertyFlags::EDIT_FIXED_SIZE,
                VariableSpecifier::Replicated | VariableSpecifier::ReplicatedUsing => {
                    if owner_is_struct {
                        self.report_error("Struct members cannot be replicated");
                    }
                    *flags |= PropertyFlags::NET;
                    if known == VariableSpecifier::ReplicatedUsing {
                        *rep_notify = Some(require_exactly_one_value(&specifier.key, &specifier.values)?);
                        *flags |= PropertyFlags::REP_NOTIFY;
                    }
                }
                VariableSpecifier::NotReplicated => {
                    if !owner_is_struct {
                        self.report_error("Only Struct members can be marked NotReplicated");
                    }
                    *flags |= PropertyFlags::REP_SKIP;
                }
                VariableSpecifier::RepRetry => self.report_error("'RepRetry' is deprecated."),
                VariableSpecifier::Interp => {
                    *flags |= PropertyFlags::EDIT | PropertyFlags::BLUEPRINT_VISIBLE | PropertyFlags::INTERP;
                }
                VariableSpecifier::NonTransactional => *flags |= PropertyFlags::NON_TRANSACTIONAL,
                VariableSpecifier::Instanced => {
                    *flags |= PropertyFlags::PERSISTENT_INSTANCE
                        | PropertyFlags::EXPORT_OBJECT
                        | PropertyFlags::INSTANCED_REFERENCE;
                    metadata.insert("EditInline", "true");
                }
                VariableSpecifier::BlueprintAssignable => *flags |= PropertyFlags::BLUEPRINT_ASSIGNABLE,
                VariableSpecifier::BlueprintCallable => *flags |= PropertyFlags::BLUEPRINT_CALLABLE,
                VariableSpecifier::BlueprintAuthorityOnly => {
                    *flags |= PropertyFlags::BLUEPRINT_AUTHORITY_ONLY;
                }
                VariableSpecifier::AssetRegistrySearchable => {
                    *flags |= PropertyFlags::ASSET_REGISTRY_SEARCHABLE;
                }
                VariableSpecifier::SimpleDisplay => *flags |= PropertyFlags::SIMPLE_DISPLAY,
                VariableSpecifier::AdvancedDisplay => *flags |= PropertyFlags::ADVANCED_DISPLAY,
                VariableSpecifier::SaveGame => *flags |= PropertyFlags::SAVE_GAME,
                VariableSpecifier::SkipSerialization => *flags |= PropertyFlags::SKIP_SERIALIZATION,
                // Edit and visibility specifiers were handled above.
                _ => {}
            }
        }

        if seen_getter && !seen_write {
            *flags |= PropertyFlags::BLUEPRINT_READ_ONLY;
            implied.remove(PropertyFlags::BLUEPRINT_READ_ONLY);
        }
        Ok(())
    }

    fn apply_parameter_specifiers(
        &mut self,
        specifiers: &[Specifier],
        category: VariableCategory,
        flags: &mut PropertyFlags,
    ) -> Result<()> {
        for specifier in specifiers {
            match ParameterSpecifier::lookup(&specifier.key) {
                Some(ParameterSpecifier::Const) => *flags |= PropertyFlags::CONST_PARM,
                Some(ParameterSpecifier::Ref) => {
                    *flags |= PropertyFlags::OUT_PARM | PropertyFlags::REFERENCE_PARM;
                }
                Some(ParameterSpecifier::NotReplicated) => {
                    if category == VariableCategory::ReplicatedParameter {
                        *flags |= PropertyFlags::REP_SKIP;
                    } else {
                        self.report_error(
                            "Only parameters in service request functions can be marked NotReplicated",
                        );
                    }
                }
                None => return Err(Error::unknown_specifier("variable", &specifier.key)),
            }
        }
        Ok(())
    }

    /// Reads `[const] [mutable] [class|struct|enum] Type[<...>] [const] [*]`.
    /// Returns the type and its source spelling.
    fn read_type(
        &mut self,
        category: VariableCategory,
        disallow: PropertyFlags,
        state: &mut TypeState,
    ) -> Result<(PropertyType, String)> {
        let hint = category.hint_text();
        if category == VariableCategory::Return
            && self.stream.peek().ident().is_some_and(is_inline_keyword)
        {
            self.stream.get_token();
        }

        let mut unconsumed_const = false;
        if self.stream.match_identifier("const") {
            unconsumed_const = true;
            state.native_const = true;
        }
        self.stream.match_identifier("mutable");

        let mut unconsumed_keyword = None;
        if self.stream.match_identifier("struct") {
            unconsumed_keyword = Some("struct");
        } else if self.stream.match_identifier("class") {
            unconsumed_keyword = Some("class");
        } else if self.stream.match_identifier("enum") {
            if category.is_member() {
                return Err(Error::syntax(format!("{hint}: Cannot declare enum at variable declaration")));
            }
            unconsumed_keyword = Some("enum");
        }

        let Some(token) = self.stream.get_identifier() else {
            return Err(Error::syntax(format!("{hint}: Missing variable type")));
        };
        let name = self.session.config().redirect_type(&token.text).to_string();

        let (ty, cpp_type) = if let Some(kind) = ScalarKind::from_keyword(&name) {
            (PropertyType::Scalar(kind), name)
        } else {
            match name.as_str() {
                "signed" => {
                    self.stream.match_identifier("int");
                    (PropertyType::Scalar(ScalarKind::Int), "int".to_string())
                }
                "unsigned" => {
                    self.stream.match_identifier("int");
                    (PropertyType::Scalar(ScalarKind::UInt), "unsigned int".to_string())
                }
                "bool" => (PropertyType::Bool(BoolKind::Native), name),
                "FName" => (PropertyType::Name, name),
                "FString" => {
                    if !category.is_member() && self.stream.match_symbol("&") {
                        if state.flags.contains(PropertyFlags::CONST_PARM) {
                            state.flags.remove(PropertyFlags::CONST_PARM);
                            state.ref_qualifier = RefQualifier::ConstRef;
                        } else {
                            state.flags |= PropertyFlags::OUT_PARM;
                            state.ref_qualifier = RefQualifier::NonConstRef;
                        }
                    }
                    (PropertyType::String, name)
                }
                "Text" => {
                    return Err(Error::semantic(format!(
                        "'{name}' is missing a prefix, expecting 'FText'"
                    )));
                }
                "FText" => (PropertyType::Text, name),
                "TArray" | "TSet" | "TMap" => self.read_container(&name, category, disallow, state)?,
                "TEnumAsByte" => self.read_enum_as_byte()?,
                "TFieldPath" => {
                    self.stream.require_symbol("<", &name)?;
                    let Some(field) = self.stream.get_identifier() else {
                        return Err(Error::syntax(format!("{name}: Missing template type")));
                    };
                    self.stream.require_symbol(">", &name)?;
                    let cpp = format!("TFieldPath<{}>", field.text);
                    (PropertyType::FieldPath { field_class: field.text }, cpp)
                }
                _ => {
                    let mut resolved = self.read_named_type(&name, category, disallow, state)?;
                    match (&resolved.0, unconsumed_keyword) {
                        (PropertyType::Enum { .. }, Some("enum"))
                        | (PropertyType::Struct { .. }, Some("struct")) => unconsumed_keyword = None,
                        (PropertyType::Object { .. } | PropertyType::Interface { .. }, _) => {
                            if unconsumed_keyword == Some("class") {
                                unconsumed_keyword = None;
                            }
                            unconsumed_const = false;
                        }
                        _ => {}
                    }
                    if let PropertyType::Object { .. } = resolved.0 {
                        if state.pointer == PointerKind::Native {
                            resolved.1.push('*');
                        }
                    }
                    resolved
                }
            }
        };

        if !category.is_member() && self.stream.match_identifier("const") {
            state.flags |= PropertyFlags::CONST_PARM;
            state.native_const = true;
        }
        if unconsumed_const {
            return Err(if category.is_member() {
                Error::semantic("Const properties are not supported.")
            } else {
                Error::semantic(format!(
                    "Inappropriate keyword 'const' on variable of type '{cpp_type}'"
                ))
            });
        }
        if let Some(keyword) = unconsumed_keyword {
            return Err(Error::semantic(format!(
                "Inappropriate keyword '{keyword}' on variable of type '{cpp_type}'"
            )));
        }
        if self.stream.match_symbol("*") {
            return Err(Error::semantic(format!(
                "Inappropriate '*' on variable of type '{cpp_type}', cannot have an exposed pointer to this type."
            )));
        }
        Ok((ty, cpp_type))
    }

    /// Reads the `<...>` of `TArray`, `TSet` or `TMap`.
    fn read_container(
        &mut self,
        name: &str,
        category: VariableCategory,
        disallow: PropertyFlags,
        outer: &mut TypeState,
    ) -> Result<(PropertyType, String)> {
        let context = format!("'{}'", name.to_ascii_lowercase());
        self.stream.require_symbol("<", &context)?;

        let first = self.read_element(category, disallow, outer)?;
        let second = if name == "TMap" {
            if !self.stream.match_symbol(",") {
                return Err(Error::syntax("Missing value type while parsing TMap."));
            }
            Some(self.read_element(category, disallow, outer)?)
        } else {
            None
        };

        let close = self.stream.get_token();
        if !close.is_symbol(">") {
            if !close.is_symbol(",") {
                return Err(Error::syntax(format!("Expected '>' but found '{close}'")));
            }
            let extra = self.stream.get_token();
            return Err(Error::semantic(if name == "TSet" {
                format!("Found '{extra}' - explicit KeyFuncs are not supported in TSet properties.")
            } else {
                format!("Found '{extra}' - explicit allocators are not supported in {name} properties.")
            }));
        }

        Ok(match second {
            Some(value) => {
                let cpp = format!("TMap<{}, {}>", first.cpp_type, value.cpp_type);
                (PropertyType::map(first, value)?, cpp)
            }
            None if name == "TSet" => {
                let cpp = format!("TSet<{}>", first.cpp_type);
                (PropertyType::set(first)?, cpp)
            }
            None => {
                let cpp = format!("TArray<{}>", first.cpp_type);
                (PropertyType::array(first)?, cpp)
            }
        })
    }

    /// Reads one container element type.
    fn read_element(
        &mut self,
        category: VariableCategory,
        disallow: PropertyFlags,
        outer: &mut TypeState,
    ) -> Result<PropertyDescriptor> {
        let mut state = TypeState::default();
        let (ty, cpp_type) = self.read_type(category, disallow, &mut state)?;
        if ty.is_container() {
            return Err(Error::semantic("Nested containers are not supported."));
        }
        outer.native_const_template_arg |= state.native_const;
        let mut element = PropertyDescriptor::new("", ty)
            .with_cpp_type(cpp_type)
            .with_flags(state.flags & !disallow);
        element.pointer = state.pointer;
        if state.native_const {
            element.metadata.insert("NativeConst", "");
        }
        Ok(element)
    }

    /// Reads `<[enum] E[::Inner]>` after `TEnumAsByte`.
    fn read_enum_as_byte(&mut self) -> Result<(PropertyType, String)> {
        self.stream.require_symbol("<", "TEnumAsByte")?;
        self.stream.match_identifier("enum");

        let target = self.stream.get_identifier().and_then(|inner| {
            self.lookup_type(&inner.text)
                .filter(|&id| self.session.graph().node(id).as_enum().is_some())
        });
        if self.stream.match_symbol("::") && self.stream.get_identifier().is_none() {
            return Err(Error::syntax("Expected a namespace scoped enum name."));
        }
        let Some(target) = target else {
            return Err(Error::unresolved_type("Expected the name of a previously defined enum"));
        };
        self.stream.require_symbol(">", "TEnumAsByte")?;

        let cpp = format!("TEnumAsByte<{}>", self.session.graph().node(target).name);
        Ok((
            PropertyType::Enum {
                target,
                underlying: Some(ScalarKind::Byte),
                as_byte: true,
            },
            cpp,
        ))
    }

    /// Resolves a type name that is not a built-in: enums, structs,
    /// delegates, then object and class references.
    fn read_named_type(
        &mut self,
        name: &str,
        category: VariableCategory,
        disallow: PropertyFlags,
        state: &mut TypeState,
    ) -> Result<(PropertyType, String)> {
        let found = self.lookup_type(name);
        let graph = self.session.graph();

        if let Some(target) = found {
            if let Some(data) = graph.node(target).as_enum() {
                let underlying = data.underlying;
                if category.is_member() && underlying.is_none() {
                    return Err(Error::semantic(
                        "You cannot use the raw enum name as a type for member variables, instead use TEnumAsByte or a C++11 enum class with an explicit underlying type.",
                    ));
                }
                if self.stream.match_symbol("::") && self.stream.get_identifier().is_none() {
                    return Err(Error::syntax("Expected a namespace scoped enum name."));
                }
                let ty = PropertyType::Enum {
                    target,
                    underlying,
                    as_byte: false,
                };
                return Ok((ty, name.to_string()));
            }
        }

        if let Some(target) = self.resolve_struct(name, found)? {
            let instanced = self
                .session
                .graph()
                .node(target)
                .as_struct()
                .is_some_and(|s| s.flags.contains(StructFlags::HAS_INSTANCED_REFERENCE));
            if instanced && !disallow.contains(PropertyFlags::CONTAINS_INSTANCED_REFERENCE) {
                state.flags |= PropertyFlags::CONTAINS_INSTANCED_REFERENCE;
            }
            return Ok((PropertyType::Struct { target }, name.to_string()));
        }

        if self.stream.match_symbol("::") {
            let Some(delegate) = self.stream.get_identifier() else {
                return Err(Error::syntax(format!("Missing delegate name after '{name}::'")));
            };
            let Some(class) = self.find_class(name) else {
                return Err(Error::unresolved_type(format!(
                    "Cannot find class '{}', to resolve delegate '{}'",
                    strip_prefix(name),
                    delegate.text
                )));
            };
            let graph = self.session.graph();
            let signature = graph
                .node(class)
                .type_scope()
                .and_then(|scope| graph.lookup(scope, &signature_name(&delegate.text), false))
                .filter(|&id| graph.node(id).is_delegate());
            let ty = self.delegate_type(delegate.text.clone(), Some(name.to_string()), signature);
            return Ok((ty, format!("{name}::{}", delegate.text)));
        }

        let signature = signature_name(name);
        if let Some(id) = self.lookup_type(&signature).filter(|&id| self.session.graph().node(id).is_delegate()) {
            return Ok((self.delegate_type(name.to_string(), None, Some(id)), name.to_string()));
        }

        if let Some(resolved) = self.read_object_type(name, category, disallow, state)? {
            return Ok(resolved);
        }

        if let Some(id) = self.session.graph().find_delegate(&signature) {
            return Ok((self.delegate_type(name.to_string(), None, Some(id)), name.to_string()));
        }
        Err(Error::unresolved_type(format!(
            "Unrecognized type '{name}' - type must be a UCLASS, USTRUCT or UENUM"
        )))
    }

    /// Finds the struct `name` refers to, insisting on its exact spelling.
    fn resolve_struct(&self, name: &str, found: Option<TypeId>) -> Result<Option<TypeId>> {
        let graph = self.session.graph();
        if let Some(id) = found.filter(|&id| graph.node(id).as_struct().is_some()) {
            return Ok(Some(id));
        }
        let stripped = strip_prefix(name);
        let candidate = ["F", "T"].iter().find_map(|prefix| {
            let candidate = format!("{prefix}{stripped}");
            self.lookup_type(&candidate)
                .filter(|&id| graph.node(id).as_struct().is_some())
                .map(|id| (id, candidate))
        });
        let Some((_, expected)) = candidate else {
            return Ok(None);
        };
        if stripped.len() < name.len() {
            Err(Error::semantic(format!(
                "Struct '{name}' is missing or has an incorrect prefix, expecting '{expected}'"
            )))
        } else if self.session.config().structs_with_no_prefix.contains(name) {
            Ok(None)
        } else {
            Err(Error::semantic(format!(
                "Struct '{name}' is missing a prefix, expecting '{expected}'"
            )))
        }
    }

    fn delegate_type(&self, name: String, owner: Option<String>, signature: Option<TypeId>) -> PropertyType {
        let multicast = signature.is_some_and(|id| {
            self.session
                .graph()
                .node(id)
                .as_function()
                .is_some_and(|f| f.flags.contains(reflector_model::FunctionFlags::MULTICAST_DELEGATE))
        });
        PropertyType::Delegate {
            name,
            owner,
            signature,
            multicast,
        }
    }

    /// Reads an object or class reference. Returns `None` when `name` is
    /// not a class or a known wrapper template.
    fn read_object_type(
        &mut self,
        name: &str,
        category: VariableCategory,
        disallow: PropertyFlags,
        state: &mut TypeState,
    ) -> Result<Option<(PropertyType, String)>> {
        let wrapper = ObjectWrapper::from_name(name);
        let mut strength = ReferenceStrength::Strong;
        let mut cpp = name.to_string();

        let class = match name {
            "TSubclassOf" => self.require_class("UClass")?,
            "FScriptInterface" => {
                state.flags |= PropertyFlags::UOBJECT_WRAPPER;
                let target = self.require_class("UInterface")?;
                return Ok(Some((PropertyType::Interface { target }, cpp)));
            }
            "TSoftClassPtr" => {
                strength = ReferenceStrength::Soft;
                self.require_class("UClass")?
            }
            _ => match wrapper {
                Some(wrapper) => {
                    self.stream.require_symbol("<", name)?;
                    self.stream.match_identifier("class");
                    state.native_const_template_arg |= self.stream.match_identifier("const");
                    let Some(inner) = self.stream.get_identifier() else {
                        return Err(Error::syntax(format!("{name}: Missing template type")));
                    };
                    let inner_name = self.session.config().redirect_type(&inner.text).to_string();
                    let Some(class) = self.find_class(&inner_name) else {
                        return Err(Error::unresolved_type(format!(
                            "Unrecognized type '{inner_name}' (in expression {name}<{inner_name}>) - type must be a UCLASS"
                        )));
                    };
                    strength = match wrapper {
                        ObjectWrapper::Weak | ObjectWrapper::AutoWeak => ReferenceStrength::Weak,
                        ObjectWrapper::Lazy => ReferenceStrength::Lazy,
                        ObjectWrapper::Soft => ReferenceStrength::Soft,
                        ObjectWrapper::ScriptInterface | ObjectWrapper::Subobject => ReferenceStrength::Strong,
                    };
                    if wrapper == ObjectWrapper::Subobject {
                        state.flags |= PropertyFlags::SUBOBJECT_REFERENCE | PropertyFlags::INSTANCED_REFERENCE;
                    }
                    if wrapper == ObjectWrapper::AutoWeak && !disallow.contains(PropertyFlags::AUTO_WEAK) {
                        state.flags |= PropertyFlags::AUTO_WEAK;
                    }
                    state.flags |= PropertyFlags::UOBJECT_WRAPPER;
                    self.stream.require_symbol(">", name)?;
                    cpp = format!("{name}<{inner_name}>");
                    class
                }
                None => match self.find_class(name) {
                    Some(class) => class,
                    None => return Ok(None),
                },
            },
        };

        let graph = self.session.graph();
        let mut meta_class = None;
        if graph.is_child_of_named(class, "UClass") {
            if self.stream.match_symbol("<") {
                state.flags |= PropertyFlags::UOBJECT_WRAPPER;
                self.stream.match_identifier("class");
                let Some(limitor) = self.stream.get_identifier() else {
                    return Err(Error::syntax("'class': Missing class limitor"));
                };
                let limitor = self.session.config().redirect_type(&limitor.text).to_string();
                meta_class = Some(self.require_class(&limitor)?);
                self.stream.require_symbol(">", "'class limitor'")?;
                cpp = format!("{name}<{limitor}>");
            } else {
                meta_class = Some(self.require_class("UObject")?);
            }
            match (wrapper, strength) {
                (Some(ObjectWrapper::Soft), _) => {
                    return Err(Error::semantic(
                        "Class variables cannot be stored in TSoftObjectPtr, use TSoftClassPtr instead.",
                    ));
                }
                (_, ReferenceStrength::Weak) => {
                    return Err(Error::semantic("Class variables cannot be weak, they are always strong."));
                }
                (_, ReferenceStrength::Lazy) => {
                    return Err(Error::semantic("Class variables cannot be lazy, they are always strong."));
                }
                _ => {}
            }
        }

        let graph = self.session.graph();
        let default_to_instanced = std::iter::once(class)
            .chain(graph.ancestors(class))
            .filter_map(|id| graph.node(id).as_class())
            .any(|c| c.flags.contains(ClassFlags::DEFAULT_TO_INSTANCED));
        if default_to_instanced {
            state.flags |= (PropertyFlags::INSTANCED_REFERENCE | PropertyFlags::EXPORT_OBJECT) & !disallow;
        }
        let const_class = graph
            .node(class)
            .as_class()
            .is_some_and(|c| c.flags.contains(ClassFlags::CONST));

        if !state.flags.contains(PropertyFlags::UOBJECT_WRAPPER) {
            state.native_const |= self.stream.match_identifier("const");
            self.stream.require_symbol("*", "Expected a pointer type")?;
            if category.is_member() {
                self.stream.match_identifier("const");
            }
            state.pointer = PointerKind::Native;
        }
        if !category.is_member() && const_class {
            state.flags |= PropertyFlags::CONST_PARM;
        }

        if wrapper == Some(ObjectWrapper::ScriptInterface) {
            return Ok(Some((PropertyType::Interface { target: class }, cpp)));
        }
        if strength == ReferenceStrength::Weak && disallow.contains(PropertyFlags::AUTO_WEAK) {
            strength = ReferenceStrength::Strong;
        }
        let ty = PropertyType::Object {
            strength,
            class,
            meta_class,
        };
        Ok(Some((ty, cpp)))
    }

    /// Rules tying specifier flags to the resolved type.
    fn check_property_flags(
        &self,
        prop: &PropertyDescriptor,
        category: VariableCategory,
        owner_is_class: bool,
        disallow: PropertyFlags,
    ) -> Result<()> {
        let flags = prop.flags;
        let base = prop.ty.element().map_or(&prop.ty, |element| &element.ty);

        if flags.contains(PropertyFlags::PERSISTENT_INSTANCE) {
            match base {
                PropertyType::Object { .. } if base.is_class_reference() => {
                    return Err(Error::semantic(
                        "'Instanced' cannot be applied to class properties (UClass* or TSubclassOf<>)",
                    ));
                }
                PropertyType::Object { .. } => {}
                _ => {
                    return Err(Error::semantic(
                        "'Instanced' is only allowed on object property (or array of objects)",
                    ));
                }
            }
        }

        let plain_object = matches!(
            prop.ty,
            PropertyType::Object {
                strength: ReferenceStrength::Strong | ReferenceStrength::Weak | ReferenceStrength::Lazy,
                meta_class: None,
                ..
            }
        );
        if plain_object && flags.contains(PropertyFlags::CONFIG) {
            return Err(Error::semantic("Not allowed to use 'config' with object variables"));
        }

        let multicast = prop.ty.is_multicast_delegate();
        if flags.contains(PropertyFlags::BLUEPRINT_ASSIGNABLE) && !multicast {
            return Err(Error::semantic(
                "'BlueprintAssignable' is only allowed on multicast delegate properties",
            ));
        }
        if flags.contains(PropertyFlags::BLUEPRINT_CALLABLE) && !multicast {
            return Err(Error::semantic(
                "'BlueprintCallable' is only allowed on a property when it is a multicast delegate",
            ));
        }
        if flags.contains(PropertyFlags::BLUEPRINT_AUTHORITY_ONLY) && !multicast {
            return Err(Error::semantic(
                "'BlueprintAuthorityOnly' is only allowed on a property when it is a multicast delegate",
            ));
        }

        let transients = flags
            & (PropertyFlags::DUPLICATE_TRANSIENT
                | PropertyFlags::TEXT_EXPORT_TRANSIENT
                | PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT);
        if !transients.is_empty() && !(category.is_member() && owner_is_class) {
            return Err(Error::semantic(format!(
                "'{}' specifier(s) are only allowed on class member variables",
                transient_names(transients)
            )));
        }

        if flags.intersects(disallow) {
            return Err(Error::semantic("Specified type modifiers not allowed here"));
        }
        Ok(())
    }

    /// Records an error when a non-deprecated property refers to a
    /// deprecated class.
    pub(super) fn check_deprecated_class(&mut self, prop: &PropertyDescriptor) {
        if prop.flags.contains(PropertyFlags::DEPRECATED) {
            return;
        }
        let graph = self.session.graph();
        let base = prop.ty.element().map_or(&prop.ty, |element| &element.ty);
        let referenced = match base {
            PropertyType::Object {
                class, meta_class, ..
            } => meta_class.or(Some(*class)),
            PropertyType::Interface { target } => Some(*target),
            _ => None,
        };
        let deprecated = referenced.filter(|&id| {
            graph
                .node(id)
                .as_class()
                .is_some_and(|c| c.flags.contains(ClassFlags::DEPRECATED))
        });
        if let Some(class) = deprecated {
            let name = graph.node(class).name.clone();
            self.report_error(format!(
                "Property is using a deprecated class: {name}.  Property should be marked deprecated as well."
            ));
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Reads the declarator name and an optional `[DIM]` into `prop`.
    pub(super) fn parse_var_name_and_dim(
        &mut self,
        prop: &mut PropertyDescriptor,
        category: VariableCategory,
        scope: NameScope<'_>,
    ) -> Result<()> {
        let hint = category.hint_text();
        if category == VariableCategory::Return {
            prop.name = "ReturnValue".to_string();
        } else {
            let Some(token) = self.stream.get_identifier() else {
                return Err(Error::syntax("Missing variable name"));
            };
            let mut name = token.text;
            if let Some(index) = name.find("_DEPRECATED") {
                if index + "_DEPRECATED".len() != name.len() {
                    return Err(Error::semantic("Deprecated variables must end with _DEPRECATED"));
                }
                self.warn_deprecated_exposure(prop, hint, &name);
                prop.flags |= PropertyFlags::DEPRECATED;
                name.truncate(index);
            }
            prop.name = name;
        }
        prop.line = self.stream.line();

        self.check_shadowing(prop, category, scope)?;

        if self.stream.match_symbol("[") {
            match category {
                VariableCategory::Return => {
                    return Err(Error::semantic("Arrays aren't allowed as return types"));
                }
                VariableCategory::RegularParameter | VariableCategory::ReplicatedParameter => {
                    return Err(Error::semantic("Arrays aren't allowed as function parameters"));
                }
                VariableCategory::Member => {}
            }
            if prop.is_container() {
                return Err(Error::semantic("Static arrays of containers are not allowed"));
            }
            if prop.ty.is_bool() {
                return Err(Error::semantic("Bool arrays are not allowed"));
            }
            let dimension = self.read_dimension(hint, &prop.name)?;
            if let Some(size_enum) = self.array_size_enum(&dimension) {
                prop.metadata.insert("ArraySizeEnum", size_enum);
            }
            prop.array_dim = Some(dimension);
        }

        if category.is_member() {
            let field = prop.name.clone();
            self.parse_field_metadata(&field, &mut prop.metadata)?;
            self.take_tooltip(&mut prop.metadata);
        } else if matches!(
            prop.ty,
            PropertyType::Object {
                strength: ReferenceStrength::Lazy,
                ..
            }
        ) {
            return Err(Error::semantic("UFunctions cannot take a lazy pointer as a parameter."));
        }
        Ok(())
    }

    fn warn_deprecated_exposure(&mut self, prop: &PropertyDescriptor, hint: &str, name: &str) {
        let flags = prop.flags;
        let visible = flags.contains(PropertyFlags::BLUEPRINT_VISIBLE);
        if visible && !prop.metadata.contains("BlueprintGetter") {
            self.warn(
                "deprecation",
                format!(
                    "{hint}: Deprecated property '{name}' should not be marked as blueprint visible without having a BlueprintGetter"
                ),
            );
        }
        if visible
            && !flags.contains(PropertyFlags::BLUEPRINT_READ_ONLY)
            && !prop.metadata.contains("BlueprintSetter")
        {
            self.warn(
                "deprecation",
                format!(
                    "{hint}: Deprecated property '{name}' should not be marked as blueprint writeable without having a BlueprintSetter"
                ),
            );
        }
        if flags.intersects(PropertyFlags::EDIT | PropertyFlags::EDIT_CONST) {
            self.warn(
                "deprecation",
                format!("{hint}: Deprecated property '{name}' should not be marked as visible or editable"),
            );
        }
    }

    fn check_shadowing(
        &self,
        prop: &PropertyDescriptor,
        category: VariableCategory,
        scope: NameScope<'_>,
    ) -> Result<()> {
        let graph = self.session.graph();
        let name = prop.name.as_str();
        let new_deprecated = category.is_member() && prop.flags.contains(PropertyFlags::DEPRECATED);

        // (declaring scope, is a function, existing property is deprecated)
        let mut existing = None;
        if let Some((function, params)) = scope.function {
            existing = params
                .iter()
                .find(|p| p.name == name)
                .map(|p| (function.to_string(), false, p.flags.contains(PropertyFlags::DEPRECATED)));
        }
        if let (None, Some(owner)) = (&existing, scope.owner) {
            existing = graph
                .find_property(owner, name, true)
                .map(|(declaring, p)| {
                    (
                        graph.node(declaring).name.clone(),
                        false,
                        p.flags.contains(PropertyFlags::DEPRECATED),
                    )
                })
                .or_else(|| {
                    graph.find_function(owner, name, true).map(|f| {
                        let declaring = graph
                            .node(f)
                            .as_function()
                            .and_then(|data| data.owner)
                            .unwrap_or(owner);
                        (graph.node(declaring).name.clone(), true, false)
                    })
                });
        }

        let Some((outer, is_function, existing_deprecated)) = existing else {
            return Ok(());
        };
        let allowed = (is_function && !category.is_member()) || existing_deprecated || new_deprecated;
        if allowed {
            return Ok(());
        }
        let here = match (scope.function, scope.owner) {
            (Some((function, _)), _) => function.to_string(),
            (None, Some(owner)) => graph.node(owner).name.clone(),
            (None, None) => self.filename.clone(),
        };
        Err(Error::semantic(format!(
            "{}: '{name}' cannot be defined in '{here}' as it is already defined in scope '{outer}' (shadowing is not allowed)",
            category.hint_text()
        )))
    }

    /// Reads the raw text of a dimension up to and including `]`.
    fn read_dimension(&mut self, hint: &str, name: &str) -> Result<String> {
        let mut span = None;
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax(format!("{hint} {name}: Missing ']'")));
            }
            if token.is_symbol("]") {
                break;
            }
            let (start, _) = span.unwrap_or((token.span.start, token.span.end));
            span = Some((start, token.span.end));
        }
        Ok(span.map_or_else(String::new, |(start, end)| {
            self.stream.slice(start, end).trim().to_string()
        }))
    }

    /// Name of the enum a dimension such as `EWeapon::Count` or
    /// `(int32)WEAPON_MAX` refers to.
    fn array_size_enum(&self, dimension: &str) -> Option<String> {
        let text = strip_dimension_casts(dimension);
        let graph = self.session.graph();
        if let Some((enum_name, _)) = text.split_once("::") {
            return self
                .lookup_type(enum_name)
                .filter(|&id| graph.node(id).as_enum().is_some())
                .map(|id| graph.node(id).name.clone());
        }
        graph
            .iter()
            .find(|(_, node)| node.as_enum().is_some_and(|data| data.entry(text).is_some()))
            .map(|(_, node)| node.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_casts_are_stripped() {
        assert_eq!(strip_dimension_casts("(int32)EWeapon::Count"), "EWeapon::Count");
        assert_eq!(strip_dimension_casts("((uint8)WEAPON_MAX)"), "WEAPON_MAX");
        assert_eq!(strip_dimension_casts("4"), "4");
    }

    #[test]
    fn inline_keywords() {
        assert!(is_inline_keyword("FORCEINLINE_DEBUGGABLE"));
        assert!(is_inline_keyword("inline"));
        assert!(!is_inline_keyword("int32"));
    }

    #[test]
    fn transient_flag_names() {
        let flags = PropertyFlags::DUPLICATE_TRANSIENT | PropertyFlags::NON_PIE_DUPLICATE_TRANSIENT;
        assert_eq!(transient_names(flags), "DuplicateTransient, NonPIEDuplicateTransient");
    }

    #[test]
    fn hint_texts() {
        assert_eq!(VariableCategory::Return.hint_text(), "Function return type");
        assert_eq!(
            VariableCategory::ReplicatedParameter.hint_text(),
            "Function parameter"
        );
    }
}
