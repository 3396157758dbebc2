//! Configuration for a parsing session.
//!
//! Read once when a session starts and never mutated by the parser.

use std::collections::{HashMap, HashSet};

/// Version of the generated-code contract a type opts into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneratedCodeVersion {
    /// Legacy layout.
    V1,
    /// Current layout.
    #[default]
    V2,
}

impl GeneratedCodeVersion {
    /// Parses the identifier used inside `GENERATED_BODY(...)`.
    #[must_use]
    pub fn from_identifier(text: &str) -> Option<Self> {
        match text {
            "V1" => Some(Self::V1),
            "V2" | "VLatest" => Some(Self::V2),
            _ => None,
        }
    }
}

/// How strictly descriptions are checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DocumentationPolicy {
    /// No checking.
    #[default]
    None,
    /// Descriptions required, `@param` coverage required, no duplicates.
    Strict,
}

impl DocumentationPolicy {
    /// Parses a policy name as written in `DocumentationPolicy=` metadata.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("Strict") {
            Some(Self::Strict)
        } else if name.eq_ignore_ascii_case("None") {
            Some(Self::None)
        } else {
            None
        }
    }
}

/// A type that exists before any header is parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntrinsicType {
    /// Full name including prefix, e.g. `UObject`.
    pub name: String,
    /// Parent type name, if any.
    pub parent: Option<String>,
}

impl IntrinsicType {
    /// Creates an intrinsic type description.
    #[must_use]
    pub fn new(name: &str, parent: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            parent: parent.map(str::to_string),
        }
    }
}

/// Configuration consumed by the parser.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParserConfig {
    /// Type-name aliases applied before type resolution.
    pub type_redirects: HashMap<String, String>,

    /// Structs exempt from the naming-prefix rule.
    pub structs_with_no_prefix: HashSet<String>,

    /// Structs whose prefix is `T` rather than `F`.
    pub structs_with_t_prefix: HashSet<String>,

    /// Metadata keys renamed on the way into the graph.
    pub metadata_key_redirects: HashMap<String, String>,

    /// Version used when `GENERATED_BODY()` names none.
    pub default_generated_code_version: GeneratedCodeVersion,

    /// Header whose include is never treated as a dependency edge.
    pub bootstrap_header: String,

    /// Classes available to every file.
    pub intrinsic_classes: Vec<IntrinsicType>,

    /// Interface classes available to every file.
    pub intrinsic_interfaces: Vec<IntrinsicType>,

    /// Scripting-visible structs available to every file.
    pub intrinsic_structs: Vec<String>,

    /// Whether the module being parsed belongs to the engine itself.
    pub engine_module: bool,

    /// Policy applied when a class does not pick one.
    pub default_documentation_policy: DocumentationPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            type_redirects: HashMap::new(),
            structs_with_no_prefix: HashSet::new(),
            structs_with_t_prefix: HashSet::new(),
            metadata_key_redirects: HashMap::new(),
            default_generated_code_version: GeneratedCodeVersion::V2,
            bootstrap_header: "NoExportTypes.h".to_string(),
            intrinsic_classes: vec![
                IntrinsicType::new("UObject", None),
                IntrinsicType::new("UClass", Some("UObject")),
                IntrinsicType::new("AActor", Some("UObject")),
                IntrinsicType::new("UActorComponent", Some("UObject")),
                IntrinsicType::new("UBlueprintFunctionLibrary", Some("UObject")),
            ],
            intrinsic_interfaces: vec![IntrinsicType::new("UInterface", Some("UObject"))],
            intrinsic_structs: ["FVector", "FVector2D", "FRotator", "FTransform", "FLinearColor", "FColor", "FGuid"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            engine_module: false,
            default_documentation_policy: DocumentationPolicy::None,
        }
    }
}

impl ParserConfig {
    /// Configuration for parsing engine modules: categories are mandatory
    /// and documentation is checked strictly.
    #[must_use]
    pub fn engine() -> Self {
        Self {
            engine_module: true,
            default_documentation_policy: DocumentationPolicy::Strict,
            ..Self::default()
        }
    }

    /// Builder method to add a type redirect.
    #[must_use]
    pub fn with_type_redirect(mut self, from: &str, to: &str) -> Self {
        self.type_redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Builder method to exempt a struct from the prefix rule.
    #[must_use]
    pub fn with_struct_without_prefix(mut self, name: &str) -> Self {
        self.structs_with_no_prefix.insert(name.to_string());
        self
    }

    /// Builder method to give a struct the `T` prefix.
    #[must_use]
    pub fn with_t_prefixed_struct(mut self, name: &str) -> Self {
        self.structs_with_t_prefix.insert(name.to_string());
        self
    }

    /// Builder method to rename a metadata key.
    #[must_use]
    pub fn with_metadata_key_redirect(mut self, from: &str, to: &str) -> Self {
        self.metadata_key_redirects
            .insert(from.to_string(), to.to_string());
        self
    }

    /// Builder method to mark the module as an engine module.
    #[must_use]
    pub fn with_engine_module(mut self, engine: bool) -> Self {
        self.engine_module = engine;
        self
    }

    /// Builder method to set the default documentation policy.
    #[must_use]
    pub fn with_documentation_policy(mut self, policy: DocumentationPolicy) -> Self {
        self.default_documentation_policy = policy;
        self
    }

    /// Builder method to set the default generated-code version.
    #[must_use]
    pub fn with_generated_code_version(mut self, version: GeneratedCodeVersion) -> Self {
        self.default_generated_code_version = version;
        self
    }

    /// Applies the type redirect map to an identifier.
    #[must_use]
    pub fn redirect_type<'a>(&'a self, name: &'a str) -> &'a str {
        self.type_redirects.get(name).map_or(name, String::as_str)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    /// Returns a configuration error if the text is not valid TOML or does
    /// not match the configuration schema.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::config(e.to_string()))
    }
}
