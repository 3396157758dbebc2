//! Integration tests for graph snapshots

use reflector_foundation::ParserConfig;
use reflector_parser::{Session, parse_module, snapshot};

const HEADER: &str = r#"#include "Crate.generated.h"

/** A breakable crate. */
UCLASS(Blueprintable)
class ACrate : public AActor
{
	GENERATED_BODY()

public:
	UPROPERTY(EditAnywhere, BlueprintReadOnly, Category = "Crate", meta = (ClampMin = "1"))
	int32 Hits;
};
"#;

fn parsed() -> Session {
    let mut session = Session::new(ParserConfig::default());
    let unit = session.add_unit("Game/Crate.h", "Game", HEADER);
    assert!(parse_module(&mut session, &[unit]).is_success());
    session
}

#[test]
fn snapshot_keeps_hierarchy_and_metadata() {
    let session = parsed();
    let bytes = snapshot::to_bytes(&session).unwrap();
    let restored = snapshot::from_bytes(&bytes).unwrap();

    let graph = &restored.graph;
    let id = graph.find_global("ACrate").unwrap();
    assert!(graph.is_child_of_named(id, "AActor"));
    assert_eq!(graph.node(id).metadata.get("ToolTip"), Some("A breakable crate."));

    let hits = &graph.node(id).body().unwrap().properties[0];
    assert_eq!(hits.metadata.get("ClampMin"), Some("1"));
    assert_eq!(hits.metadata.get("Category"), Some("Crate"));
}

#[test]
fn snapshot_keeps_units() {
    let session = parsed();
    let restored = snapshot::from_bytes(&snapshot::to_bytes(&session).unwrap()).unwrap();
    assert_eq!(restored.units.len(), 1);
    assert_eq!(restored.units[0].filename, "Game/Crate.h");
    assert!(restored.units[0].parsed);
    assert!(restored.units[0].saw_generated_include);
}

#[test]
fn missing_files_are_serialization_errors() {
    let path = std::env::temp_dir().join("reflector_does_not_exist.msgpack");
    let err = snapshot::load_from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("serialization error: failed to open file"));
}
