//! Type graph nodes.

use reflector_foundation::{GeneratedCodeVersion, MetaData};

use super::{ScopeId, TypeId, UnitId};
use crate::flags::{ClassFlags, EnumFlags, FunctionExportFlags, FunctionFlags, StructFlags};
use crate::property::{PropertyDescriptor, ScalarKind};

/// Metadata key marking a dynamically generated type.
pub const REPLACE_CONVERTED: &str = "ReplaceConverted";

// =============================================================================
// Enums
// =============================================================================

/// How an enum was written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnumForm {
    /// `enum T { ... };`
    #[default]
    Regular,
    /// `namespace N { enum T { ... }; }`
    Namespaced,
    /// `enum class T : base { ... };`
    EnumClass,
}

impl EnumForm {
    /// Whether tag names are qualified with the enum name.
    #[must_use]
    pub const fn qualifies_tags(self) -> bool {
        !matches!(self, Self::Regular)
    }
}

/// One enumerator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumEntry {
    /// Tag name, qualified as `T::Tag` for namespaced and enum-class forms.
    pub name: String,
    /// Value, or `None` when the initializer could not be evaluated.
    pub value: Option<i64>,
    /// Declared inside `#if WITH_EDITORONLY_DATA`.
    pub editor_only: bool,
}

/// Payload of an enum node.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumData {
    /// Declaration form.
    pub form: EnumForm,
    /// Explicit underlying type, if one was given.
    pub underlying: Option<ScalarKind>,
    /// C++ spelling of the type, `N::T` for namespaced enums.
    pub cpp_type: String,
    /// Enumerators in declaration order, ending with the synthetic `_MAX`.
    pub entries: Vec<EnumEntry>,
    /// Enum flags.
    pub flags: EnumFlags,
}

impl EnumData {
    /// Finds an entry by its (possibly qualified) name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&EnumEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries written in source, without the synthetic `_MAX`.
    #[must_use]
    pub fn declared_entries(&self) -> &[EnumEntry] {
        self.entries.split_last().map_or(&[], |(_, declared)| declared)
    }

    /// Strips the `T::` qualifier from a tag.
    #[must_use]
    pub fn short_name(tag: &str) -> &str {
        tag.rsplit_once("::").map_or(tag, |(_, short)| short)
    }
}

// =============================================================================
// Structs and classes
// =============================================================================

/// What structs and classes share.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructBody {
    /// Parent struct or class.
    pub super_type: Option<TypeId>,
    /// Reflected properties in declaration order.
    pub properties: Vec<PropertyDescriptor>,
    /// Reflected functions and delegates declared inside.
    pub functions: Vec<TypeId>,
    /// Scope holding nested declarations.
    pub type_scope: ScopeId,
    /// Line of the opening brace.
    pub body_line: u32,
    /// Line of the generated-body marker, once seen.
    pub generated_body_line: Option<u32>,
    /// Generated-code version selected by the marker.
    pub generated_code_version: GeneratedCodeVersion,
}

impl StructBody {
    /// Creates an empty body bound to its type scope.
    #[must_use]
    pub fn new(type_scope: ScopeId) -> Self {
        Self {
            super_type: None,
            properties: Vec::new(),
            functions: Vec::new(),
            type_scope,
            body_line: 0,
            generated_body_line: None,
            generated_code_version: GeneratedCodeVersion::default(),
        }
    }

    /// Finds a property declared directly on this body.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Payload of a struct node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructData {
    /// Shared body.
    pub body: StructBody,
    /// Struct flags.
    pub flags: StructFlags,
}

/// Category lists collected from class specifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassCategories {
    /// `HideCategories=`
    pub hide: Vec<String>,
    /// `ShowCategories=`
    pub show: Vec<String>,
    /// `HideFunctions=`
    pub hide_functions: Vec<String>,
    /// `ShowFunctions=`
    pub show_functions: Vec<String>,
    /// `AutoExpandCategories=`
    pub auto_expand: Vec<String>,
    /// `AutoCollapseCategories=`
    pub auto_collapse: Vec<String>,
    /// `DontAutoCollapseCategories=`
    pub dont_auto_collapse: Vec<String>,
    /// `ClassGroup=`
    pub class_group: Vec<String>,
}

impl ClassCategories {
    /// Adds `names` to `list`, skipping names already present.
    pub fn add_unique(list: &mut Vec<String>, names: &[String]) {
        for name in names {
            if !list.contains(name) {
                list.push(name.clone());
            }
        }
    }
}

/// Native constructors matched in a class body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ConstructorInfo {
    /// `Name()`
    pub default: bool,
    /// `Name(const FObjectInitializer&)`
    pub object_initializer: bool,
    /// `Name(FVTableHelper&)`
    pub vtable_helper: bool,
    /// Whether any user constructor was declared.
    pub any: bool,
}

/// Payload of a class or interface node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassData {
    /// Shared body.
    pub body: StructBody,
    /// Class flags; interfaces carry `INTERFACE`.
    pub flags: ClassFlags,
    /// Implemented interfaces.
    pub interfaces: Vec<TypeId>,
    /// `Config=` name, possibly inherited.
    pub config_name: Option<String>,
    /// `Within=` class name.
    pub within: Option<String>,
    /// Category lists.
    pub categories: ClassCategories,
    /// Constructors seen in the body.
    pub constructors: ConstructorInfo,
    /// Whether `Serialize(FArchive&)` is declared.
    pub has_serialize: bool,
    /// For interfaces, line of the `I<Name>` native mixin's generated body.
    pub native_interface_body_line: Option<u32>,
}

impl ClassData {
    /// Creates an empty class payload.
    #[must_use]
    pub fn new(type_scope: ScopeId) -> Self {
        Self {
            body: StructBody::new(type_scope),
            flags: ClassFlags::empty(),
            interfaces: Vec::new(),
            config_name: None,
            within: None,
            categories: ClassCategories::default(),
            constructors: ConstructorInfo::default(),
            has_serialize: false,
            native_interface_body_line: None,
        }
    }

    /// Returns true for `UINTERFACE` classes.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(ClassFlags::INTERFACE)
    }
}

// =============================================================================
// Functions and delegates
// =============================================================================

/// Owner and name carried by sparse delegates.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseDelegate {
    /// Class that owns the delegate.
    pub owning_class: String,
    /// Member name of the delegate.
    pub delegate_name: String,
}

/// Payload of a function or delegate node.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionData {
    /// Function flags.
    pub flags: FunctionFlags,
    /// Flags that only matter to the generated glue.
    pub export_flags: FunctionExportFlags,
    /// Parameters in order.
    pub params: Vec<PropertyDescriptor>,
    /// Return value.
    pub return_value: Option<PropertyDescriptor>,
    /// Service request/response id.
    pub rpc_id: Option<u16>,
    /// Response id a service request waits for.
    pub rpc_response_id: Option<u16>,
    /// Name of the native implementation.
    pub cpp_impl_name: String,
    /// Name of the native validation function.
    pub cpp_validation_impl_name: String,
    /// Service endpoint.
    pub endpoint_name: Option<String>,
    /// Class or struct the function is declared in.
    pub owner: Option<TypeId>,
    /// Overridden super-class function.
    pub super_function: Option<TypeId>,
    /// Sparse delegate details.
    pub sparse: Option<SparseDelegate>,
}

impl FunctionData {
    /// Returns true if the function has a return value or out parameters.
    #[must_use]
    pub fn has_outputs(&self) -> bool {
        self.return_value.is_some() || self.params.iter().any(PropertyDescriptor::is_out_param)
    }

    /// Parameter names, with `ReturnValue` appended when there is one.
    #[must_use]
    pub fn param_names(&self) -> Vec<String> {
        self.params
            .iter()
            .chain(self.return_value.iter())
            .map(|p| p.name.clone())
            .collect()
    }

    /// Returns true for blueprint-implementable or native events.
    #[must_use]
    pub fn is_blueprint_event(&self) -> bool {
        self.flags.contains(FunctionFlags::BLUEPRINT_EVENT)
    }

    /// Returns true for replicated functions.
    #[must_use]
    pub fn is_net(&self) -> bool {
        self.flags.contains(FunctionFlags::NET)
    }

    /// Returns true for functions callable from scripting.
    #[must_use]
    pub fn is_blueprint_callable(&self) -> bool {
        self.flags.contains(FunctionFlags::BLUEPRINT_CALLABLE)
    }
}

// =============================================================================
// TypeNode
// =============================================================================

/// Kind-specific node payload.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    /// `UENUM`
    Enum(EnumData),
    /// `USTRUCT`
    Struct(StructData),
    /// `UCLASS` or `UINTERFACE`
    Class(ClassData),
    /// `UFUNCTION`
    Function(FunctionData),
    /// Dynamic delegate signature.
    Delegate(FunctionData),
}

/// A declared type in the graph.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeNode {
    /// Name including prefix. Delegates store `<Name>__DelegateSignature`.
    pub name: String,
    /// Scope the node was declared in.
    pub scope: ScopeId,
    /// Declaring unit; `None` for intrinsic types.
    pub unit: Option<UnitId>,
    /// Declaration line.
    pub line: u32,
    /// Metadata, including `ToolTip` from the doc comment.
    pub metadata: MetaData,
    /// Doc comment as written, for `@param` parsing.
    pub raw_comment: Option<String>,
    /// Kind-specific payload.
    pub kind: TypeKind,
}

impl TypeNode {
    /// Creates a node with empty metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, scope: ScopeId, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            scope,
            unit: None,
            line: 0,
            metadata: MetaData::new(),
            raw_comment: None,
            kind,
        }
    }

    /// Sets the declaring unit and line.
    #[must_use]
    pub fn declared_at(mut self, unit: UnitId, line: u32) -> Self {
        self.unit = Some(unit);
        self.line = line;
        self
    }

    /// Lower-case kind word used in messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Enum(_) => "enum",
            TypeKind::Struct(_) => "struct",
            TypeKind::Class(c) if c.is_interface() => "interface",
            TypeKind::Class(_) => "class",
            TypeKind::Function(_) => "function",
            TypeKind::Delegate(_) => "delegate",
        }
    }

    /// Enum payload.
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumData> {
        match &self.kind {
            TypeKind::Enum(data) => Some(data),
            _ => None,
        }
    }

    /// Class payload.
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.kind {
            TypeKind::Class(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable class payload.
    pub fn as_class_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.kind {
            TypeKind::Class(data) => Some(data),
            _ => None,
        }
    }

    /// Struct payload.
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructData> {
        match &self.kind {
            TypeKind::Struct(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable struct payload.
    pub fn as_struct_mut(&mut self) -> Option<&mut StructData> {
        match &mut self.kind {
            TypeKind::Struct(data) => Some(data),
            _ => None,
        }
    }

    /// Body shared by structs and classes.
    #[must_use]
    pub fn body(&self) -> Option<&StructBody> {
        match &self.kind {
            TypeKind::Struct(data) => Some(&data.body),
            TypeKind::Class(data) => Some(&data.body),
            _ => None,
        }
    }

    /// Mutable body shared by structs and classes.
    pub fn body_mut(&mut self) -> Option<&mut StructBody> {
        match &mut self.kind {
            TypeKind::Struct(data) => Some(&mut data.body),
            TypeKind::Class(data) => Some(&mut data.body),
            _ => None,
        }
    }

    /// Function or delegate payload.
    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionData> {
        match &self.kind {
            TypeKind::Function(data) | TypeKind::Delegate(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable function or delegate payload.
    pub fn as_function_mut(&mut self) -> Option<&mut FunctionData> {
        match &mut self.kind {
            TypeKind::Function(data) | TypeKind::Delegate(data) => Some(data),
            _ => None,
        }
    }

    /// Returns true for classes and interfaces.
    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }

    /// Returns true for `UINTERFACE` classes.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.as_class().is_some_and(ClassData::is_interface)
    }

    /// Returns true for delegate signatures.
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        matches!(self.kind, TypeKind::Delegate(_))
    }

    /// Parent struct or class.
    #[must_use]
    pub fn super_type(&self) -> Option<TypeId> {
        self.body().and_then(|b| b.super_type)
    }

    /// Scope of nested declarations, for structs and classes.
    #[must_use]
    pub fn type_scope(&self) -> Option<ScopeId> {
        self.body().map(|b| b.type_scope)
    }

    /// Returns true for types generated from converted script assets.
    /// These carry `ReplaceConverted` metadata.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.metadata.contains(REPLACE_CONVERTED)
    }

    /// Name with its one-letter prefix removed.
    #[must_use]
    pub fn name_without_prefix(&self) -> &str {
        strip_prefix(&self.name)
    }
}

/// Removes a one-letter type prefix (`U`, `A`, `F`, `I`, `T`, `E`) when it is
/// followed by an upper-case letter.
#[must_use]
pub fn strip_prefix(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('U' | 'A' | 'F' | 'I' | 'T' | 'E'), Some(next)) if next.is_ascii_uppercase() => {
            &name[1..]
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyType, RefQualifier};
    use crate::flags::PropertyFlags;

    #[test]
    fn prefix_stripping() {
        assert_eq!(strip_prefix("UObject"), "Object");
        assert_eq!(strip_prefix("FVector"), "Vector");
        assert_eq!(strip_prefix("Float"), "Float");
        assert_eq!(strip_prefix("U"), "U");
    }

    #[test]
    fn enum_short_names() {
        assert_eq!(EnumData::short_name("EColor::Red"), "Red");
        assert_eq!(EnumData::short_name("Red"), "Red");
    }

    #[test]
    fn declared_entries_skip_the_max_tag() {
        let entry = |name: &str, value| EnumEntry {
            name: name.to_string(),
            value: Some(value),
            editor_only: false,
        };
        let data = EnumData {
            entries: vec![entry("EMode::Single", 0), entry("EMode::EMode_MAX", 1)],
            ..EnumData::default()
        };
        assert_eq!(data.declared_entries().len(), 1);
        assert_eq!(data.declared_entries()[0].name, "EMode::Single");
        assert!(EnumData::default().declared_entries().is_empty());
    }

    #[test]
    fn outputs_include_out_params() {
        let mut f = FunctionData::default();
        assert!(!f.has_outputs());
        let mut out = PropertyDescriptor::new("Result", PropertyType::String)
            .with_flags(PropertyFlags::PARM | PropertyFlags::OUT_PARM);
        out.ref_qualifier = RefQualifier::NonConstRef;
        f.params.push(out);
        assert!(f.has_outputs());
        assert_eq!(f.param_names(), vec!["Result".to_string()]);
    }

    #[test]
    fn node_accessors() {
        let scope = ScopeId::from_index(0);
        let node = TypeNode::new(
            "UThing",
            scope,
            TypeKind::Class(ClassData::new(ScopeId::from_index(1))),
        );
        assert!(node.is_class());
        assert!(!node.is_interface());
        assert_eq!(node.kind_name(), "class");
        assert_eq!(node.type_scope(), Some(ScopeId::from_index(1)));
        assert_eq!(node.name_without_prefix(), "Thing");
    }

    #[test]
    fn converted_types_are_dynamic() {
        let mut node = TypeNode::new(
            "UGenerated",
            ScopeId::from_index(0),
            TypeKind::Class(ClassData::new(ScopeId::from_index(1))),
        );
        assert!(!node.is_dynamic());
        node.metadata.insert(REPLACE_CONVERTED, "/Game/Generated");
        assert!(node.is_dynamic());
    }
}
