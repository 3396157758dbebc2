//! Trait flag sets for reflected declarations.

use bitflags::bitflags;

bitflags! {
    /// Traits of a property, parameter or return value.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PropertyFlags: u64 {
        /// Editable in the editor.
        const EDIT                          = 1 << 0;
        /// Parameter is const.
        const CONST_PARM                    = 1 << 1;
        /// Readable (and maybe writable) from scripting.
        const BLUEPRINT_VISIBLE             = 1 << 2;
        /// Object is exported with its owner.
        const EXPORT_OBJECT                 = 1 << 3;
        /// Read-only from scripting.
        const BLUEPRINT_READ_ONLY           = 1 << 4;
        /// Replicated.
        const NET                           = 1 << 5;
        /// Array size fixed in the editor.
        const EDIT_FIXED_SIZE               = 1 << 6;
        /// Function parameter.
        const PARM                          = 1 << 7;
        /// Output parameter.
        const OUT_PARM                      = 1 << 8;
        /// Return value.
        const RETURN_PARM                   = 1 << 9;
        /// Not editable on templates.
        const DISABLE_EDIT_ON_TEMPLATE      = 1 << 10;
        /// Not saved.
        const TRANSIENT                     = 1 << 11;
        /// Loaded from config.
        const CONFIG                        = 1 << 12;
        /// Not editable on instances.
        const DISABLE_EDIT_ON_INSTANCE      = 1 << 13;
        /// Visible but read-only in the editor.
        const EDIT_CONST                    = 1 << 14;
        /// Loaded from the base class config.
        const GLOBAL_CONFIG                 = 1 << 15;
        /// Refers to an instanced sub-object.
        const INSTANCED_REFERENCE           = 1 << 16;
        /// Not copied on duplication.
        const DUPLICATE_TRANSIENT           = 1 << 17;
        /// Saved with game state.
        const SAVE_GAME                     = 1 << 18;
        /// Cannot be cleared to none in the editor.
        const NO_CLEAR                      = 1 << 19;
        /// Passed by reference.
        const REFERENCE_PARM                = 1 << 20;
        /// Multicast delegate assignable from scripting.
        const BLUEPRINT_ASSIGNABLE          = 1 << 21;
        /// Deprecated; loaded but not saved.
        const DEPRECATED                    = 1 << 22;
        /// Has a replication notify function.
        const REP_NOTIFY                    = 1 << 23;
        /// Animatable.
        const INTERP                        = 1 << 24;
        /// Changes are not transacted.
        const NON_TRANSACTIONAL             = 1 << 25;
        /// Only present in editor builds.
        const EDITOR_ONLY                   = 1 << 26;
        /// Weak reference chosen automatically.
        const AUTO_WEAK                     = 1 << 27;
        /// A container or struct holding instanced references.
        const CONTAINS_INSTANCED_REFERENCE  = 1 << 28;
        /// Indexed by the asset registry.
        const ASSET_REGISTRY_SEARCHABLE     = 1 << 29;
        /// Shown in the simple view.
        const SIMPLE_DISPLAY                = 1 << 30;
        /// Shown in the advanced view.
        const ADVANCED_DISPLAY              = 1 << 31;
        /// Declared protected.
        const PROTECTED                     = 1 << 32;
        /// Multicast delegate callable from scripting.
        const BLUEPRINT_CALLABLE            = 1 << 33;
        /// Multicast delegate only broadcast with authority.
        const BLUEPRINT_AUTHORITY_ONLY      = 1 << 34;
        /// Skipped by text export.
        const TEXT_EXPORT_TRANSIENT         = 1 << 35;
        /// Only duplicated outside play-in-editor.
        const NON_PIE_DUPLICATE_TRANSIENT   = 1 << 36;
        /// Pin exposed on spawn nodes.
        const EXPOSE_ON_SPAWN               = 1 << 37;
        /// Owned instanced object.
        const PERSISTENT_INSTANCE           = 1 << 38;
        /// Wrapped in a template such as `TSubclassOf`.
        const UOBJECT_WRAPPER               = 1 << 39;
        /// Skipped by replication (struct members and service parameters).
        const REP_SKIP                      = 1 << 40;
        /// Native access is public.
        const NATIVE_ACCESS_PUBLIC          = 1 << 41;
        /// Native access is protected.
        const NATIVE_ACCESS_PROTECTED       = 1 << 42;
        /// Native access is private.
        const NATIVE_ACCESS_PRIVATE         = 1 << 43;
        /// Not serialized.
        const SKIP_SERIALIZATION            = 1 << 44;
        /// Sub-object pointer.
        const SUBOBJECT_REFERENCE           = 1 << 45;

        /// Flags that only make sense on parameters.
        const PARM_FLAGS = Self::PARM.bits()
            | Self::OUT_PARM.bits()
            | Self::RETURN_PARM.bits()
            | Self::REFERENCE_PARM.bits()
            | Self::CONST_PARM.bits();

        /// Flags carried outward from a container's inner descriptor.
        const PROPAGATE_FROM_INNER = Self::INSTANCED_REFERENCE.bits()
            | Self::CONTAINS_INSTANCED_REFERENCE.bits();

        /// Native access specifier bits.
        const NATIVE_ACCESS = Self::NATIVE_ACCESS_PUBLIC.bits()
            | Self::NATIVE_ACCESS_PROTECTED.bits()
            | Self::NATIVE_ACCESS_PRIVATE.bits();
    }
}

bitflags! {
    /// Traits of a function or delegate signature.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FunctionFlags: u32 {
        /// Cannot be overridden.
        const FINAL                     = 1 << 0;
        /// Declared with an `XXX_API` macro.
        const REQUIRED_API              = 1 << 1;
        /// Only runs with network authority.
        const BLUEPRINT_AUTHORITY_ONLY  = 1 << 2;
        /// Cosmetic; skipped on dedicated servers.
        const BLUEPRINT_COSMETIC        = 1 << 3;
        /// Replicated.
        const NET                       = 1 << 4;
        /// Reliable replication.
        const NET_RELIABLE              = 1 << 5;
        /// Service request.
        const NET_REQUEST               = 1 << 6;
        /// Console command.
        const EXEC                      = 1 << 7;
        /// Implemented natively.
        const NATIVE                    = 1 << 8;
        /// Event.
        const EVENT                     = 1 << 9;
        /// Service response.
        const NET_RESPONSE              = 1 << 10;
        /// Static.
        const STATIC                    = 1 << 11;
        /// Replicated to all clients.
        const NET_MULTICAST             = 1 << 12;
        /// Multicast delegate signature.
        const MULTICAST_DELEGATE        = 1 << 13;
        /// Public.
        const PUBLIC                    = 1 << 14;
        /// Private.
        const PRIVATE                   = 1 << 15;
        /// Protected.
        const PROTECTED                 = 1 << 16;
        /// Delegate signature.
        const DELEGATE                  = 1 << 17;
        /// Runs on the server.
        const NET_SERVER                = 1 << 18;
        /// Has out parameters.
        const HAS_OUT_PARMS             = 1 << 19;
        /// Has parameters with default values.
        const HAS_DEFAULTS              = 1 << 20;
        /// Runs on the owning client.
        const NET_CLIENT                = 1 << 21;
        /// Callable from scripting.
        const BLUEPRINT_CALLABLE        = 1 << 22;
        /// Overridable from scripting.
        const BLUEPRINT_EVENT           = 1 << 23;
        /// No side effects.
        const BLUEPRINT_PURE            = 1 << 24;
        /// Editor builds only.
        const EDITOR_ONLY               = 1 << 25;
        /// Const method.
        const CONST                     = 1 << 26;
        /// Has a validation function.
        const NET_VALIDATE              = 1 << 27;

        /// Access bits.
        const ACCESS = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();

        /// Net category bits.
        const NET_FUNCS = Self::NET.bits()
            | Self::NET_REQUEST.bits()
            | Self::NET_RESPONSE.bits()
            | Self::NET_MULTICAST.bits()
            | Self::NET_SERVER.bits()
            | Self::NET_CLIENT.bits();
    }
}

bitflags! {
    /// Native export details of a function that do not affect reflection.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FunctionExportFlags: u16 {
        /// `final`.
        const FINAL             = 1 << 0;
        /// `virtual`.
        const VIRTUAL           = 1 << 1;
        /// Has an `XXX_API` macro.
        const REQUIRED_API      = 1 << 2;
        /// Inline body seen.
        const INLINE            = 1 << 3;
        /// `static`.
        const CPP_STATIC        = 1 << 4;
        /// User-written thunk.
        const CUSTOM_THUNK      = 1 << 5;
        /// `SealedEvent`.
        const SEALED_EVENT      = 1 << 6;
        /// Implementation name overridden.
        const IMPLEMENTED_IN_CPP = 1 << 7;
        /// `override`.
        const OVERRIDE          = 1 << 8;
    }
}

bitflags! {
    /// Traits of a struct.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StructFlags: u16 {
        /// Declared natively.
        const NATIVE                    = 1 << 0;
        /// Serialized as a unit.
        const ATOMIC                    = 1 << 1;
        /// Serialized as a unit and never modified in place.
        const IMMUTABLE                 = 1 << 2;
        /// No generated boilerplate.
        const NO_EXPORT                 = 1 << 3;
        /// Declared with an `XXX_API` macro.
        const REQUIRED_API              = 1 << 4;
        /// Has a member that is an instanced reference.
        const HAS_INSTANCED_REFERENCE   = 1 << 5;

        /// Flags a child struct takes from its parent.
        const INHERIT = Self::HAS_INSTANCED_REFERENCE.bits() | Self::ATOMIC.bits();
    }
}

bitflags! {
    /// Traits of a class or interface.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ClassFlags: u32 {
        /// Cannot be instantiated.
        const ABSTRACT                      = 1 << 0;
        /// Saves config to the default ini.
        const DEFAULT_CONFIG                = 1 << 1;
        /// Has config properties.
        const CONFIG                        = 1 << 2;
        /// Never saved.
        const TRANSIENT                     = 1 << 3;
        /// Declared natively.
        const NATIVE                        = 1 << 4;
        /// No generated boilerplate.
        const NO_EXPORT                     = 1 << 5;
        /// Cannot be placed in a level.
        const NOT_PLACEABLE                 = 1 << 6;
        /// Config saved per object.
        const PER_OBJECT_CONFIG             = 1 << 7;
        /// Can be created inline in the editor.
        const EDIT_INLINE_NEW               = 1 << 8;
        /// Properties are not grouped by category.
        const COLLAPSE_CATEGORIES           = 1 << 9;
        /// Interface.
        const INTERFACE                     = 1 << 10;
        /// Constructor is user-written.
        const CUSTOM_CONSTRUCTOR            = 1 << 11;
        /// All members are const.
        const CONST                         = 1 << 12;
        /// Declared with an `XXX_API` macro.
        const REQUIRED_API                  = 1 << 13;
        /// Deprecated.
        const DEPRECATED                    = 1 << 14;
        /// Hidden from class pickers.
        const HIDE_DROP_DOWN                = 1 << 15;
        /// Config saved to the user ini.
        const GLOBAL_USER_CONFIG            = 1 << 16;
        /// Exists before parsing.
        const INTRINSIC                     = 1 << 17;
        /// Has instanced reference members.
        const HAS_INSTANCED_REFERENCE       = 1 << 18;
        /// References to this class are instanced by default.
        const DEFAULT_TO_INSTANCED          = 1 << 19;
        /// Config defaults are not checked.
        const CONFIG_DO_NOT_CHECK_DEFAULTS  = 1 << 20;
        /// Exports only the minimal API.
        const MINIMAL_API                   = 1 << 21;
        /// Parsed successfully.
        const PARSED                        = 1 << 22;

        /// Flags a child class takes from its parent.
        const INHERIT = Self::TRANSIENT.bits()
            | Self::DEFAULT_CONFIG.bits()
            | Self::CONFIG.bits()
            | Self::PER_OBJECT_CONFIG.bits()
            | Self::CONFIG_DO_NOT_CHECK_DEFAULTS.bits()
            | Self::NOT_PLACEABLE.bits()
            | Self::CONST.bits()
            | Self::HAS_INSTANCED_REFERENCE.bits()
            | Self::DEPRECATED.bits()
            | Self::DEFAULT_TO_INSTANCED.bits()
            | Self::GLOBAL_USER_CONFIG.bits();

        /// Flags taken from the parent, then filtered by specifiers.
        const SCRIPT_INHERIT = Self::INHERIT.bits()
            | Self::EDIT_INLINE_NEW.bits()
            | Self::COLLAPSE_CATEGORIES.bits();
    }
}

bitflags! {
    /// Traits of an enum.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EnumFlags: u8 {
        /// Exposed to scripting.
        const BLUEPRINT_TYPE    = 1 << 0;
        /// Values are bit flags.
        const FLAGS             = 1 << 1;
    }
}

/// Native access specifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessSpecifier {
    /// `public:`
    #[default]
    Public,
    /// `protected:`
    Protected,
    /// `private:`
    Private,
}

impl AccessSpecifier {
    /// Parses `public`, `protected` or `private`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    /// Keyword text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }

    /// The matching native access property flag.
    #[must_use]
    pub const fn property_flag(self) -> PropertyFlags {
        match self {
            Self::Public => PropertyFlags::NATIVE_ACCESS_PUBLIC,
            Self::Protected => PropertyFlags::NATIVE_ACCESS_PROTECTED,
            Self::Private => PropertyFlags::NATIVE_ACCESS_PRIVATE,
        }
    }

    /// The matching function access flag.
    #[must_use]
    pub const fn function_flag(self) -> FunctionFlags {
        match self {
            Self::Public => FunctionFlags::PUBLIC,
            Self::Protected => FunctionFlags::PROTECTED,
            Self::Private => FunctionFlags::PRIVATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_masks() {
        assert!(PropertyFlags::PARM_FLAGS.contains(PropertyFlags::OUT_PARM));
        assert!(FunctionFlags::NET_FUNCS.contains(FunctionFlags::NET_SERVER));
        assert!(!FunctionFlags::NET_FUNCS.contains(FunctionFlags::NET_RELIABLE));
        assert!(ClassFlags::SCRIPT_INHERIT.contains(ClassFlags::CONST));
    }

    #[test]
    fn access_specifier_round_trip() {
        for access in [
            AccessSpecifier::Public,
            AccessSpecifier::Protected,
            AccessSpecifier::Private,
        ] {
            assert_eq!(AccessSpecifier::from_keyword(access.name()), Some(access));
        }
        assert_eq!(AccessSpecifier::from_keyword("friend"), None);
    }

    #[test]
    fn access_maps_to_flags() {
        assert_eq!(
            AccessSpecifier::Private.function_flag(),
            FunctionFlags::PRIVATE
        );
        assert!(
            PropertyFlags::NATIVE_ACCESS.contains(AccessSpecifier::Protected.property_flag())
        );
    }
}
