//! Integration tests for module parsing
//!
//! Each test builds a small module out of several headers and checks the
//! order they are parsed in and how failures spread.

use reflector_foundation::ParserConfig;
use reflector_model::{PropertyType, TypeId};
use reflector_parser::{CompilationResult, Session, parse_header, parse_module};

const LOOT: &str = r#"#include "Loot.generated.h"

USTRUCT(BlueprintType)
struct FLoot
{
	GENERATED_BODY()

	UPROPERTY(EditAnywhere, BlueprintReadWrite)
	int32 Gold;
};
"#;

const CHEST: &str = r#"#include "Loot.h"
#include "Chest.generated.h"

UCLASS()
class AChest : public AActor
{
	GENERATED_BODY()

public:
	UPROPERTY(EditAnywhere, Category = "Loot")
	FLoot Contents;
};
"#;

fn level(index: usize) -> String {
    let parent = if index == 0 {
        "AActor".to_string()
    } else {
        format!("ALevel{}", index - 1)
    };
    format!(
        "#include \"Level{index}.generated.h\"\n\
         UCLASS()\nclass ALevel{index} : public {parent}\n{{\n\tGENERATED_BODY()\n\
         public:\n\tUPROPERTY(EditAnywhere, Category = \"Level\")\n\tint32 Depth{index};\n}};\n"
    )
}

fn find(session: &Session, name: &str) -> TypeId {
    session
        .find_type(name)
        .unwrap_or_else(|| panic!("type {name} was not declared"))
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn included_headers_parse_first() {
    let mut session = Session::new(ParserConfig::default());
    let chest = session.add_unit("Game/Chest.h", "Game", CHEST);
    let loot = session.add_unit("Game/Loot.h", "Game", LOOT);
    assert_eq!(parse_module(&mut session, &[chest, loot]), CompilationResult::Succeeded);

    let loot_id = find(&session, "FLoot");
    let chest_id = find(&session, "AChest");
    let contents = &session.graph().node(chest_id).body().unwrap().properties[0];
    assert_eq!(contents.ty, PropertyType::Struct { target: loot_id });
    assert!(session.unit(loot).parsed);
    assert_eq!(session.unit_declaring(loot_id), Some(loot));
}

#[test]
fn undeclared_structs_fail_the_user() {
    let mut session = Session::new(ParserConfig::default());
    let chest = session.add_unit("Game/Chest.h", "Game", CHEST.replace("#include \"Loot.h\"\n", ""));
    let loot = session.add_unit("Game/Loot.h", "Game", LOOT);
    assert_eq!(
        parse_module(&mut session, &[chest, loot]),
        CompilationResult::CompilationError
    );
    assert!(session.is_failed(chest));
    assert!(!session.unit(loot).parsed);
    assert!(
        session
            .diagnostics()
            .entries()
            .iter()
            .any(|d| d.message.contains("Unrecognized type 'FLoot'"))
    );
}

#[test]
fn inheritance_chains_resolve_in_any_order() {
    let mut session = Session::new(ParserConfig::default());
    let units: Vec<_> = (0..5)
        .rev()
        .map(|i| session.add_unit(format!("Game/Level{i}.h"), "Game", level(i)))
        .collect();
    assert_eq!(parse_module(&mut session, &units), CompilationResult::Succeeded);

    let deepest = find(&session, "ALevel4");
    let chain: Vec<_> = session
        .graph()
        .ancestors(deepest)
        .map(|id| session.graph().node(id).name.clone())
        .collect();
    assert_eq!(chain, ["ALevel3", "ALevel2", "ALevel1", "ALevel0", "AActor", "UObject"]);

    let (owner, _) = session.graph().find_property(deepest, "Depth0", true).unwrap();
    assert_eq!(owner, find(&session, "ALevel0"));
}

#[test]
fn interfaces_can_live_in_another_header() {
    let mut session = Session::new(ParserConfig::default());
    let door = session.add_unit(
        "Game/Door.h",
        "Game",
        "#include \"Interact.h\"\n#include \"Door.generated.h\"\n\
         UCLASS()\nclass ADoor : public AActor, public IInteractable\n{\n\tGENERATED_BODY()\n};\n",
    );
    let interact = session.add_unit(
        "Game/Interact.h",
        "Game",
        "#include \"Interact.generated.h\"\n\
         UINTERFACE(MinimalAPI)\nclass UInteractable : public UInterface\n{\n\tGENERATED_BODY()\n};\n\
         class IInteractable\n{\n\tGENERATED_BODY()\n};\n",
    );
    assert!(parse_module(&mut session, &[door, interact]).is_success());

    let interface = find(&session, "UInteractable");
    let door_class = session.graph().node(find(&session, "ADoor")).as_class().unwrap();
    assert_eq!(door_class.interfaces, [interface]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn broken_parents_stop_their_children() {
    let mut session = Session::new(ParserConfig::default());
    let child = session.add_unit("Game/Level1.h", "Game", level(1));
    let base = session.add_unit(
        "Game/Level0.h",
        "Game",
        level(0).replace("\tGENERATED_BODY()\n", ""),
    );
    assert_eq!(
        parse_module(&mut session, &[child, base]),
        CompilationResult::CompilationError
    );
    assert!(session.is_failed(base));
    assert!(!session.is_failed(child));
    assert!(!session.unit(child).parsed);
    assert_eq!(session.errors().len(), 1);
    assert_eq!(session.diagnostics().error_count_for("Game/Level0.h"), 1);
    assert!(session.errors()[0].report().starts_with("Game/Level0.h"));
}

#[test]
fn a_failed_header_reports_the_same_on_every_request() {
    let mut session = Session::new(ParserConfig::default());
    let broken = session.add_unit("Game/Broken.h", "Game", "USTRUCT()\nstruct FBroken\n{\n");
    assert_eq!(
        parse_header(&mut session, broken),
        CompilationResult::OtherCompilationError
    );
    session.unit_mut(broken).parsed = false;
    assert_eq!(
        parse_header(&mut session, broken),
        CompilationResult::OtherCompilationError
    );
    assert_eq!(session.errors().len(), 1);
}

#[test]
fn later_units_are_untouched_after_a_failure() {
    let mut session = Session::new(ParserConfig::default());
    let broken = session.add_unit("Game/Broken.h", "Game", "USTRUCT()\nstruct Broken\n{\n};\n");
    let loot = session.add_unit("Game/Loot.h", "Game", LOOT);
    assert_eq!(
        parse_module(&mut session, &[broken, loot]),
        CompilationResult::CompilationError
    );
    assert!(!session.unit(loot).parsed);
    assert!(session.find_type("FLoot").is_none());
}
