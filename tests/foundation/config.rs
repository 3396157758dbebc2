//! Integration tests for session configuration

use reflector_foundation::{DocumentationPolicy, ErrorKind, GeneratedCodeVersion, ParserConfig};

#[test]
fn defaults_register_core_types() {
    let config = ParserConfig::default();
    assert!(config.intrinsic_classes.iter().any(|c| c.name == "AActor"));
    assert!(config.intrinsic_interfaces.iter().any(|c| c.name == "UInterface"));
    assert!(config.intrinsic_structs.iter().any(|s| s == "FVector"));
    assert_eq!(config.default_generated_code_version, GeneratedCodeVersion::V2);
    assert_eq!(config.default_documentation_policy, DocumentationPolicy::None);
}

#[test]
fn redirects_apply_only_to_known_names() {
    let config = ParserConfig::default().with_type_redirect("FOldLoot", "FLoot");
    assert_eq!(config.redirect_type("FOldLoot"), "FLoot");
    assert_eq!(config.redirect_type("FLoot"), "FLoot");
}

#[test]
fn from_toml() {
    let config = ParserConfig::from_toml_str(
        r#"
engine_module = true
default_documentation_policy = "Strict"
structs_with_no_prefix = ["Vertex"]

[type_redirects]
FOldLoot = "FLoot"
"#,
    )
    .unwrap();
    assert!(config.engine_module);
    assert_eq!(config.default_documentation_policy, DocumentationPolicy::Strict);
    assert!(config.structs_with_no_prefix.contains("Vertex"));
    assert_eq!(config.redirect_type("FOldLoot"), "FLoot");
    assert_eq!(config.bootstrap_header, "NoExportTypes.h");
}

#[test]
fn from_toml_rejects_bad_input() {
    let err = ParserConfig::from_toml_str("engine_module = \"sometimes\"").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
}

#[test]
fn policy_names_ignore_case() {
    assert_eq!(DocumentationPolicy::from_name("strict"), Some(DocumentationPolicy::Strict));
    assert_eq!(DocumentationPolicy::from_name("NONE"), Some(DocumentationPolicy::None));
    assert_eq!(DocumentationPolicy::from_name("Loose"), None);
}

#[test]
fn generated_code_versions() {
    assert_eq!(GeneratedCodeVersion::from_identifier("V1"), Some(GeneratedCodeVersion::V1));
    assert_eq!(GeneratedCodeVersion::from_identifier("VLatest"), Some(GeneratedCodeVersion::V2));
    assert_eq!(GeneratedCodeVersion::from_identifier("V9"), None);
}
