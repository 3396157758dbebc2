//! Full pipeline: configure, parse a module, inspect, snapshot.

use reflector::foundation::{DocumentationPolicy, ParserConfig, Severity};
use reflector::model::{PropertyFlags, PropertyType};
use reflector::parser::{CompilationResult, Session, parse_module, snapshot};

const CONFIG: &str = r#"
default_documentation_policy = "Strict"

[type_redirects]
FOldLoot = "FLoot"
"#;

const LOOT: &str = r#"#include "Loot.generated.h"

/** Coins and trinkets. */
USTRUCT(BlueprintType)
struct FLoot
{
	GENERATED_BODY()

	/** Coins carried. */
	UPROPERTY(EditAnywhere, BlueprintReadWrite)
	int32 Gold;

	UPROPERTY(EditAnywhere, BlueprintReadWrite)
	int32 Gems;
};
"#;

const CHEST: &str = r#"#include "Loot.h"
#include "Chest.generated.h"

DECLARE_DYNAMIC_MULTICAST_DELEGATE_OneParam(FOnOpened, int32, Gold);

/** A chest that can be opened once. */
UCLASS(Blueprintable)
class AChest : public AActor
{
	GENERATED_BODY()

public:
	/** What is inside. */
	UPROPERTY(EditAnywhere, BlueprintReadOnly, Category = "Chest")
	FOldLoot Contents;

	/** Fired when the lid opens. */
	UPROPERTY(BlueprintAssignable, Category = "Chest")
	FOnOpened OnOpened;

	/** Opens the chest. */
	UFUNCTION(BlueprintCallable, Category = "Chest")
	void Open();
};
"#;

fn run() -> Session {
    let config = ParserConfig::from_toml_str(CONFIG).unwrap();
    assert_eq!(config.default_documentation_policy, DocumentationPolicy::Strict);

    let mut session = Session::new(config);
    let chest = session.add_unit("Source/Game/Chest.h", "Game", CHEST);
    let loot = session.add_unit("Source/Game/Loot.h", "Game", LOOT);
    let result = parse_module(&mut session, &[chest, loot]);
    assert_eq!(
        result,
        CompilationResult::Succeeded,
        "unexpected failure: {:?}",
        session.errors().iter().map(|e| e.report()).collect::<Vec<_>>()
    );
    session
}

#[test]
fn module_parses_with_redirects() {
    let session = run();
    let graph = session.graph();
    let loot = session.find_type("FLoot").unwrap();
    let chest = session.find_type("AChest").unwrap();

    let body = graph.node(chest).body().unwrap();
    assert_eq!(body.properties[0].ty, PropertyType::Struct { target: loot });
    assert!(body.properties[1].ty.is_multicast_delegate());
    assert!(body.properties[1].flags.contains(PropertyFlags::BLUEPRINT_ASSIGNABLE));
    assert!(graph.find_function(chest, "Open", false).is_some());
}

#[test]
fn undocumented_members_are_warned_about() {
    let session = run();
    let warnings: Vec<_> = session
        .diagnostics()
        .in_category("documentation")
        .filter(|d| d.severity == Severity::Warning)
        .map(|d| d.message.as_str())
        .collect();
    assert!(warnings.contains(
        &"Property 'FLoot::Gems' does not provide a tooltip / comment (DocumentationPolicy)."
    ));
    assert!(!warnings.iter().any(|w| w.contains("FLoot::Gold")));
}

#[test]
fn snapshot_survives_a_trip_through_disk() {
    let session = run();
    let path = std::env::temp_dir().join(format!("reflector_pipeline_{}.msgpack", std::process::id()));
    snapshot::save_to_file(&session, &path).unwrap();
    let restored = snapshot::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.graph.len(), session.graph().len());
    let names: Vec<_> = restored.units.iter().map(|u| u.filename.as_str()).collect();
    assert_eq!(names, ["Source/Game/Chest.h", "Source/Game/Loot.h"]);

    let chest = restored.graph.find_global("AChest").unwrap();
    assert_eq!(
        restored.graph.node(chest).metadata.get("ToolTip"),
        Some("A chest that can be opened once.")
    );
}
