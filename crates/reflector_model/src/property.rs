//! Property descriptors.
//!
//! A [`PropertyDescriptor`] is what the variable parser produces for every
//! member variable, function parameter and return value. Its [`PropertyType`]
//! is a closed tagged union; container variants own their element
//! descriptors, and construction refuses nested containers.

use reflector_foundation::{Error, MetaData, Result};

use crate::flags::PropertyFlags;
use crate::graph::TypeId;

// =============================================================================
// Scalar kinds
// =============================================================================

/// Built-in numeric types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarKind {
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// Platform `int`.
    Int,
    /// `uint8`
    Byte,
    /// `uint16`
    UInt16,
    /// `uint32`
    UInt32,
    /// `uint64`
    UInt64,
    /// Platform `unsigned int`.
    UInt,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl ScalarKind {
    /// Matches a fixed-width keyword (`int32`, `uint8`, `float`, ...).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "int" => Self::Int,
            "uint8" => Self::Byte,
            "uint16" => Self::UInt16,
            "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        })
    }

    /// The keyword that spells this type.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Int => "int",
            Self::Byte => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::UInt => "unsigned int",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Returns true for integer kinds.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float | Self::Double)
    }

    /// Width in bits of a bitfield declared with this type, if allowed.
    #[must_use]
    pub const fn bitfield_bits(self) -> Option<u8> {
        match self {
            Self::Byte => Some(8),
            Self::UInt16 => Some(16),
            Self::UInt32 => Some(32),
            _ => None,
        }
    }

    /// Enum underlying types accepted by `enum class E : T`.
    #[must_use]
    pub const fn is_enum_underlying(self) -> bool {
        !matches!(self, Self::Int | Self::UInt | Self::Float | Self::Double)
    }
}

/// How a boolean is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolKind {
    /// Native `bool`.
    #[default]
    Native,
    /// `uintN bFoo : 1`, with N bits of storage.
    Bitfield(u8),
}

/// How an object reference holds its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferenceStrength {
    /// Raw `UObject*` or `TSubclassOf`.
    #[default]
    Strong,
    /// `TWeakObjectPtr`.
    Weak,
    /// `TLazyObjectPtr`.
    Lazy,
    /// `TSoftObjectPtr` and `TSoftClassPtr`.
    Soft,
}

/// Whether the declaration carried a `*`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerKind {
    /// No pointer.
    #[default]
    None,
    /// A native `*`.
    Native,
}

/// Reference qualifier on a parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefQualifier {
    /// By value.
    #[default]
    None,
    /// `const T&`.
    ConstRef,
    /// `T&`.
    NonConstRef,
}

// =============================================================================
// Property types
// =============================================================================

/// The type of a reflected property.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyType {
    /// Numeric scalar.
    Scalar(ScalarKind),
    /// Boolean.
    Bool(BoolKind),
    /// `FName`
    Name,
    /// `FString`
    String,
    /// `FText`
    Text,
    /// Enum reference.
    Enum {
        /// The enum.
        target: TypeId,
        /// Underlying storage; `None` for a raw enum wrapped as byte.
        underlying: Option<ScalarKind>,
        /// Declared through `TEnumAsByte`.
        as_byte: bool,
    },
    /// Struct value.
    Struct {
        /// The struct.
        target: TypeId,
    },
    /// Object or class reference.
    Object {
        /// How the target is held.
        strength: ReferenceStrength,
        /// Referenced class; `UClass` for class references.
        class: TypeId,
        /// Bound for class references (`TSubclassOf<X>` gives `X`).
        meta_class: Option<TypeId>,
    },
    /// `TScriptInterface<I>` or `FScriptInterface`.
    Interface {
        /// The interface class.
        target: TypeId,
    },
    /// Delegate reference, bound to its signature by the fixup pass.
    Delegate {
        /// Delegate name as written, e.g. `FOnHit`.
        name: String,
        /// Owning class for `Class::FDelegate` references.
        owner: Option<String>,
        /// Signature function once resolved.
        signature: Option<TypeId>,
        /// Whether the property is multicast.
        multicast: bool,
    },
    /// `TFieldPath<F>`.
    FieldPath {
        /// Field class name, e.g. `FProperty`.
        field_class: String,
    },
    /// `TArray<T>`.
    Array(Box<PropertyDescriptor>),
    /// `TSet<T>`.
    Set(Box<PropertyDescriptor>),
    /// `TMap<K, V>`.
    Map {
        /// Key descriptor.
        key: Box<PropertyDescriptor>,
        /// Value descriptor.
        value: Box<PropertyDescriptor>,
    },
}

/// Position of an element inside a container, for error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ElementRole {
    Key,
    Element,
    Value,
}

fn check_element(element: &PropertyDescriptor, role: ElementRole) -> Result<()> {
    if element.ty.is_container() {
        return Err(Error::semantic("Nested containers are not supported."));
    }
    match (&element.ty, role) {
        (PropertyType::Delegate { .. }, _) => Err(Error::semantic(
            "Delegates are not supported inside containers.",
        )),
        (PropertyType::Interface { .. }, ElementRole::Key) => Err(Error::semantic(
            "UINTERFACEs are not currently supported as key types.",
        )),
        (PropertyType::Interface { .. }, ElementRole::Element) => Err(Error::semantic(
            "UINTERFACEs are not currently supported as element types.",
        )),
        (PropertyType::Text, ElementRole::Key) => Err(Error::semantic(
            "FText is not currently supported as a key type.",
        )),
        (PropertyType::Text, ElementRole::Element) => Err(Error::semantic(
            "FText is not currently supported as an element type.",
        )),
        _ => Ok(()),
    }
}

impl PropertyType {
    /// Builds `TArray<element>`.
    ///
    /// # Errors
    /// Fails if the element is a container or a delegate.
    pub fn array(element: PropertyDescriptor) -> Result<Self> {
        // Arrays hold interfaces and text; only hashed positions reject them.
        check_element(&element, ElementRole::Value)?;
        Ok(Self::Array(Box::new(element)))
    }

    /// Builds `TSet<element>`.
    ///
    /// # Errors
    /// Fails if the element is a container, delegate, interface or text.
    pub fn set(element: PropertyDescriptor) -> Result<Self> {
        check_element(&element, ElementRole::Element)?;
        Ok(Self::Set(Box::new(element)))
    }

    /// Builds `TMap<key, value>`.
    ///
    /// # Errors
    /// Fails if either side is a container or delegate, or the key is an
    /// interface or text.
    pub fn map(key: PropertyDescriptor, value: PropertyDescriptor) -> Result<Self> {
        check_element(&key, ElementRole::Key)?;
        check_element(&value, ElementRole::Value)?;
        Ok(Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// Returns true for arrays, sets and maps.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Set(_) | Self::Map { .. })
    }

    /// Element of an array or set, or value of a map.
    #[must_use]
    pub fn element(&self) -> Option<&PropertyDescriptor> {
        match self {
            Self::Array(inner) | Self::Set(inner) => Some(inner),
            Self::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns true for numeric scalars.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Returns true for booleans of either storage.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns true for strong object references, which includes class
    /// references.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }

    /// Returns true for class references (`UClass*`, `TSubclassOf`,
    /// `TSoftClassPtr`).
    #[must_use]
    pub fn is_class_reference(&self) -> bool {
        matches!(
            self,
            Self::Object {
                meta_class: Some(_),
                ..
            }
        )
    }

    /// Returns true for multicast delegates.
    #[must_use]
    pub fn is_multicast_delegate(&self) -> bool {
        matches!(
            self,
            Self::Delegate {
                multicast: true,
                ..
            }
        )
    }

    /// Short kind tag used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.keyword(),
            Self::Bool(_) => "bool",
            Self::Name => "FName",
            Self::String => "FString",
            Self::Text => "FText",
            Self::Enum { .. } => "enum",
            Self::Struct { .. } => "struct",
            Self::Object {
                meta_class: Some(_),
                ..
            } => "class",
            Self::Object { .. } => "object",
            Self::Interface { .. } => "interface",
            Self::Delegate {
                multicast: true, ..
            } => "multicast delegate",
            Self::Delegate { .. } => "delegate",
            Self::FieldPath { .. } => "field path",
            Self::Array(_) => "TArray",
            Self::Set(_) => "TSet",
            Self::Map { .. } => "TMap",
        }
    }

    /// Structural type equality used when comparing function signatures.
    ///
    /// Bitfield and native bools compare equal, as do delegates with the same
    /// signature. Containers compare their elements recursively.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Bool(_), Self::Bool(_))
            | (Self::Name, Self::Name)
            | (Self::String, Self::String)
            | (Self::Text, Self::Text) => true,
            (Self::Enum { target: a, .. }, Self::Enum { target: b, .. })
            | (Self::Struct { target: a }, Self::Struct { target: b })
            | (Self::Interface { target: a }, Self::Interface { target: b }) => a == b,
            (
                Self::Object {
                    strength: sa,
                    class: ca,
                    meta_class: ma,
                },
                Self::Object {
                    strength: sb,
                    class: cb,
                    meta_class: mb,
                },
            ) => sa == sb && ca == cb && ma == mb,
            (
                Self::Delegate {
                    signature: sa,
                    multicast: ma,
                    name: na,
                    ..
                },
                Self::Delegate {
                    signature: sb,
                    multicast: mb,
                    name: nb,
                    ..
                },
            ) => ma == mb && if sa.is_some() && sb.is_some() { sa == sb } else { na == nb },
            (Self::FieldPath { field_class: a }, Self::FieldPath { field_class: b }) => a == b,
            (Self::Array(a), Self::Array(b)) | (Self::Set(a), Self::Set(b)) => a.ty.matches(&b.ty),
            (Self::Map { key: ka, value: va }, Self::Map { key: kb, value: vb }) => {
                ka.ty.matches(&kb.ty) && va.ty.matches(&vb.ty)
            }
            _ => false,
        }
    }

    /// Flags a container inherits from its elements.
    #[must_use]
    pub fn propagated_flags(&self) -> PropertyFlags {
        match self {
            Self::Array(inner) | Self::Set(inner) => {
                inner.flags & PropertyFlags::PROPAGATE_FROM_INNER
            }
            Self::Map { key, value } => {
                (key.flags | value.flags) & PropertyFlags::PROPAGATE_FROM_INNER
            }
            _ => PropertyFlags::empty(),
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// A fully parsed property: member variable, parameter or return value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyDescriptor {
    /// Declared name; `ReturnValue` for return values.
    pub name: String,
    /// Resolved type.
    pub ty: PropertyType,
    /// The type as spelled in source, e.g. `TArray<int32>`.
    pub cpp_type: String,
    /// Trait flags.
    pub flags: PropertyFlags,
    /// Metadata from `meta=(...)` and the doc comment.
    pub metadata: MetaData,
    /// Static array dimension expression, `[DIM]`.
    pub array_dim: Option<String>,
    /// Function named by `ReplicatedUsing`.
    pub rep_notify: Option<String>,
    /// Reference qualifier on parameters.
    pub ref_qualifier: RefQualifier,
    /// Pointer marker.
    pub pointer: PointerKind,
    /// Line the name appeared on.
    pub line: u32,
}

impl PropertyDescriptor {
    /// Creates a descriptor. Container types start with the flags their
    /// elements propagate outward.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        let flags = ty.propagated_flags();
        Self {
            name: name.into(),
            cpp_type: ty.kind_name().to_string(),
            ty,
            flags,
            metadata: MetaData::new(),
            array_dim: None,
            rep_notify: None,
            ref_qualifier: RefQualifier::None,
            pointer: PointerKind::None,
            line: 0,
        }
    }

    /// Sets the source spelling of the type.
    #[must_use]
    pub fn with_cpp_type(mut self, cpp_type: impl Into<String>) -> Self {
        self.cpp_type = cpp_type.into();
        self
    }

    /// Adds flags.
    #[must_use]
    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// Returns true for arrays, sets and maps.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.ty.is_container()
    }

    /// Returns true for a `[DIM]` static array.
    #[must_use]
    pub fn is_static_array(&self) -> bool {
        self.array_dim.is_some()
    }

    /// Returns true for parameters written to by the callee.
    #[must_use]
    pub fn is_out_param(&self) -> bool {
        self.flags.contains(PropertyFlags::OUT_PARM)
            && !self.flags.contains(PropertyFlags::CONST_PARM)
    }

    /// Returns true for the function return value.
    #[must_use]
    pub fn is_return(&self) -> bool {
        self.flags.contains(PropertyFlags::RETURN_PARM)
    }

    /// Returns true if the property is visible to the editor or to scripting.
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        self.flags
            .intersects(PropertyFlags::EDIT | PropertyFlags::BLUEPRINT_VISIBLE)
    }
}
