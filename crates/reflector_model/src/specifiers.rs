//! Specifier registries.
//!
//! Each declaration kind has a static table of the keywords its annotation
//! macro accepts, sorted in ASCII case-insensitive order. Lookup is a binary
//! search that yields a closed enum, so every consumer dispatches with one
//! exhaustive `match`.
//!
//! The second half of this module validates the *values* of a small set of
//! checked metadata keys.

use std::cmp::Ordering;

use reflector_foundation::{Error, MetaData, Result};

/// Compares two keywords the way the registries are sorted.
#[must_use]
pub fn compare_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Binary search over a sorted registry table.
#[must_use]
pub fn find_sorted<T: Copy>(table: &[(&str, T)], keyword: &str) -> Option<T> {
    table
        .binary_search_by(|(name, _)| compare_ignore_ascii_case(name, keyword))
        .ok()
        .map(|index| table[index].1)
}

macro_rules! specifier_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                #[doc = concat!("`", stringify!($variant), "`")]
                $variant,
            )+
        }

        impl $name {
            /// Registry table, sorted case-insensitively.
            pub const TABLE: &'static [(&'static str, Self)] = &[
                $((stringify!($variant), Self::$variant),)+
            ];

            /// Looks up a keyword, ignoring ASCII case.
            #[must_use]
            pub fn lookup(keyword: &str) -> Option<Self> {
                find_sorted(Self::TABLE, keyword)
            }

            /// Canonical spelling.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

specifier_table! {
    /// `UCLASS` specifiers.
    pub enum ClassSpecifier {
        Abstract,
        AdvancedClassDisplay,
        AutoCollapseCategories,
        AutoExpandCategories,
        Blueprintable,
        BlueprintType,
        ClassGroup,
        CollapseCategories,
        Config,
        ConfigDoNotCheckDefaults,
        Const,
        ConversionRoot,
        CustomConstructor,
        DefaultConfig,
        DefaultToInstanced,
        DependsOn,
        Deprecated,
        DontAutoCollapseCategories,
        DontCollapseCategories,
        EditInlineNew,
        GlobalUserConfig,
        HideCategories,
        HideDropdown,
        HideFunctions,
        Intrinsic,
        MinimalAPI,
        NoExport,
        NonTransient,
        NotBlueprintable,
        NotBlueprintType,
        NotEditInlineNew,
        NotPlaceable,
        PerObjectConfig,
        Placeable,
        ShowCategories,
        ShowFunctions,
        Transient,
        Within,
    }
}

specifier_table! {
    /// `UINTERFACE` specifiers.
    pub enum InterfaceSpecifier {
        ConversionRoot,
        DependsOn,
        MinimalAPI,
    }
}

specifier_table! {
    /// `USTRUCT` specifiers.
    pub enum StructSpecifier {
        Atomic,
        Immutable,
        NoExport,
    }
}

specifier_table! {
    /// `UFUNCTION` specifiers.
    pub enum FunctionSpecifier {
        BlueprintAuthorityOnly,
        BlueprintCallable,
        BlueprintCosmetic,
        BlueprintGetter,
        BlueprintImplementableEvent,
        BlueprintNativeEvent,
        BlueprintPure,
        BlueprintSetter,
        Client,
        CustomThunk,
        Exec,
        NetMulticast,
        Reliable,
        SealedEvent,
        Server,
        ServiceRequest,
        ServiceResponse,
        Unreliable,
        WithValidation,
    }
}

specifier_table! {
    /// `UPROPERTY` specifiers.
    pub enum VariableSpecifier {
        AdvancedDisplay,
        AssetRegistrySearchable,
        BlueprintAssignable,
        BlueprintAuthorityOnly,
        BlueprintCallable,
        BlueprintGetter,
        BlueprintReadOnly,
        BlueprintReadWrite,
        BlueprintSetter,
        Config,
        DuplicateTransient,
        EditAnywhere,
        EditDefaultsOnly,
        EditFixedSize,
        EditInline,
        EditInstanceOnly,
        Export,
        GlobalConfig,
        Instanced,
        Interp,
        Localized,
        NoClear,
        NonPIEDuplicateTransient,
        NonPIETransient,
        NonTransactional,
        NotReplicated,
        Replicated,
        ReplicatedUsing,
        RepRetry,
        SaveGame,
        SimpleDisplay,
        SkipSerialization,
        TextExportTransient,
        Transient,
        VisibleAnywhere,
        VisibleDefaultsOnly,
        VisibleInstanceOnly,
    }
}

specifier_table! {
    /// `UPARAM` specifiers.
    pub enum ParameterSpecifier {
        Const,
        NotReplicated,
        Ref,
    }
}

specifier_table! {
    /// Specifiers that any declaration kind accepts and that only write
    /// metadata.
    pub enum MetadataSpecifier {
        BlueprintInternalUseOnly,
        BlueprintType,
        CallInEditor,
        DisplayName,
        FriendlyName,
        NotBlueprintType,
    }
}

specifier_table! {
    /// Metadata keys whose values are validated.
    pub enum CheckedMetadata {
        BlueprintProtected,
        ClampMax,
        ClampMin,
        DevelopmentStatus,
        ExpandEnumAsExecs,
        ForceUnits,
        UIMax,
        UIMin,
        Units,
    }
}

impl MetadataSpecifier {
    /// Writes this specifier into a metadata map.
    ///
    /// # Errors
    /// Fails if a value-carrying specifier was given no value.
    pub fn apply(self, values: &[String], metadata: &mut MetaData) -> Result<()> {
        match self {
            Self::DisplayName | Self::FriendlyName => {
                let value = require_exactly_one_value(self.name(), values)?;
                metadata.insert(self.name(), value);
            }
            Self::NotBlueprintType => {
                metadata.insert("NotBlueprintType", "true");
                metadata.remove("BlueprintType");
            }
            Self::BlueprintType => {
                metadata.insert("BlueprintType", "true");
                metadata.remove("NotBlueprintType");
            }
            Self::BlueprintInternalUseOnly | Self::CallInEditor => {
                metadata.insert(self.name(), "true");
            }
        }
        Ok(())
    }
}

/// Requires a specifier to carry exactly one value.
///
/// # Errors
/// Fails when the specifier carries no value or more than one.
pub fn require_exactly_one_value(specifier: &str, values: &[String]) -> Result<String> {
    match values {
        [value] if !value.is_empty() => Ok(value.clone()),
        _ => Err(Error::semantic(format!(
            "The '{specifier}' specifier must be given exactly one value"
        ))),
    }
}

/// Requires a specifier to carry at least one value.
///
/// # Errors
/// Fails when the specifier carries no value.
pub fn require_value(specifier: &str, values: &[String]) -> Result<()> {
    if values.iter().any(|v| !v.is_empty()) {
        Ok(())
    } else {
        Err(Error::semantic(format!(
            "The '{specifier}' specifier must be given a value"
        )))
    }
}

// =============================================================================
// Checked metadata
// =============================================================================

/// Measurement units accepted by `Units` and `ForceUnits`, with their short
/// spellings.
const KNOWN_UNITS: &[(&str, &[&str])] = &[
    ("Micrometers", &["um"]),
    ("Millimeters", &["mm"]),
    ("Centimeters", &["cm"]),
    ("Meters", &["m"]),
    ("Kilometers", &["km"]),
    ("Inches", &["in"]),
    ("Feet", &["ft"]),
    ("Yards", &["yd"]),
    ("Miles", &["mi"]),
    ("Lightyears", &["ly"]),
    ("Degrees", &["deg"]),
    ("Radians", &["rad"]),
    ("MetersPerSecond", &["m/s"]),
    ("KilometersPerHour", &["km/h"]),
    ("MilesPerHour", &["mph", "mi/h"]),
    ("Celsius", &["C"]),
    ("Farenheit", &["F"]),
    ("Kelvin", &["K"]),
    ("Micrograms", &["ug"]),
    ("Milligrams", &["mg"]),
    ("Grams", &["g"]),
    ("Kilograms", &["kg"]),
    ("MetricTons", &["t"]),
    ("Ounces", &["oz"]),
    ("Pounds", &["lb"]),
    ("Stones", &["st"]),
    ("Newtons", &["N"]),
    ("PoundsForce", &["lbf"]),
    ("KilogramsForce", &["kgf"]),
    ("Hertz", &["Hz"]),
    ("Kilohertz", &["kHz"]),
    ("Megahertz", &["MHz"]),
    ("Gigahertz", &["GHz"]),
    ("RevolutionsPerMinute", &["rpm"]),
    ("Bytes", &["B"]),
    ("Kilobytes", &["KB"]),
    ("Megabytes", &["MB"]),
    ("Gigabytes", &["GB"]),
    ("Terabytes", &["TB"]),
    ("Lumens", &["lm"]),
    ("Milliseconds", &["ms"]),
    ("Seconds", &["s"]),
    ("Minutes", &["min"]),
    ("Hours", &["hr"]),
    ("Days", &["dy"]),
    ("Months", &["mth"]),
    ("Years", &["yr"]),
    ("Multiplier", &["x"]),
    ("Percent", &["%"]),
];

/// Returns true if `text` names a known measurement unit.
#[must_use]
pub fn is_known_unit(text: &str) -> bool {
    let text = text.trim();
    KNOWN_UNITS.iter().any(|(name, short)| {
        name.eq_ignore_ascii_case(text) || short.iter().any(|s| s.eq_ignore_ascii_case(text))
    })
}

/// What a checked metadata entry is attached to.
#[derive(Clone, Copy, Debug)]
pub enum MetadataSubject<'a> {
    /// A property.
    Property {
        /// Whether the property is numeric or a struct.
        numeric_or_struct: bool,
    },
    /// A function.
    Function {
        /// Parameter names, `ReturnValue` included when there is one.
        params: &'a [String],
        /// Whether the function is static.
        is_static: bool,
        /// Whether the owning class derives from `UBlueprintFunctionLibrary`.
        in_function_library: bool,
    },
    /// Anything else.
    Type,
}

/// A failed metadata check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataViolation {
    /// What went wrong.
    pub message: String,
    /// Fatal violations abort the declaration; others are recorded as errors.
    pub fatal: bool,
}

impl MetadataViolation {
    fn fatal(message: String) -> Self {
        Self {
            message,
            fatal: true,
        }
    }
}

/// Validates one metadata entry attached to `field`.
#[must_use]
pub fn check_metadata(
    key: &str,
    value: &str,
    field: &str,
    subject: MetadataSubject<'_>,
) -> Option<MetadataViolation> {
    let checked = CheckedMetadata::lookup(key)?;
    match checked {
        CheckedMetadata::UIMin
        | CheckedMetadata::UIMax
        | CheckedMetadata::ClampMin
        | CheckedMetadata::ClampMax => (!is_numeric(value)).then(|| {
            MetadataViolation::fatal(format!(
                "Metadata value for '{key}' is non-numeric : '{value}'"
            ))
        }),
        CheckedMetadata::DevelopmentStatus => {
            (value != "EarlyAccess" && value != "Experimental").then(|| {
                MetadataViolation::fatal(format!(
                    "'{key}' metadata was '{value}' but it must be EarlyAccess or Experimental"
                ))
            })
        }
        CheckedMetadata::Units | CheckedMetadata::ForceUnits => match subject {
            MetadataSubject::Property {
                numeric_or_struct: true,
            } => (!is_known_unit(value)).then(|| {
                MetadataViolation::fatal(format!(
                    "Unrecognized units ({value}) specified for property '{field}'"
                ))
            }),
            _ => Some(MetadataViolation::fatal(format!(
                "'{key}' meta data can only be applied to numeric and struct properties"
            ))),
        },
        CheckedMetadata::ExpandEnumAsExecs => match subject {
            MetadataSubject::Function { params, .. } => value
                .split([',', '|'])
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .find(|name| !params.iter().any(|p| p == name))
                .map(|missing| MetadataViolation {
                    message: format!("Function does not have a parameter named '{missing}'"),
                    fatal: false,
                }),
            _ => None,
        },
        CheckedMetadata::BlueprintProtected => match subject {
            MetadataSubject::Function {
                is_static: true,
                in_function_library: true,
                ..
            } => Some(MetadataViolation::fatal(format!(
                "{key} doesn't make sense on static method '{field}' in a blueprint function library"
            ))),
            _ => None,
        },
    }
}

fn is_numeric(value: &str) -> bool {
    let value = value.trim();
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1
}
