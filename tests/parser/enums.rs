//! Integration tests for enum values

use proptest::prelude::*;
use reflector_foundation::ParserConfig;
use reflector_parser::{Session, parse_header};

fn parse_enum(initializers: &[Option<u16>]) -> Vec<(String, Option<i64>)> {
    let mut source = String::from("#include \"Auto.generated.h\"\nUENUM()\nenum class EAuto : int32\n{\n");
    for (index, init) in initializers.iter().enumerate() {
        match init {
            Some(value) => source.push_str(&format!("\tTag{index} = {value},\n")),
            None => source.push_str(&format!("\tTag{index},\n")),
        }
    }
    source.push_str("};\n");

    let mut session = Session::new(ParserConfig::default());
    let unit = session.add_unit("Game/Auto.h", "Game", source);
    assert!(parse_header(&mut session, unit).is_success());
    let id = session.find_type("EAuto").unwrap();
    session
        .graph()
        .node(id)
        .as_enum()
        .unwrap()
        .entries
        .iter()
        .map(|e| (e.name.clone(), e.value))
        .collect()
}

#[test]
fn non_literal_initializers_are_unknown() {
    let mut session = Session::new(ParserConfig::default());
    let unit = session.add_unit(
        "Game/Flags.h",
        "Game",
        "#include \"Flags.generated.h\"\nUENUM()\nenum class EFlags : uint8\n{\n\
         \tNone = 0,\n\tBoth = 1 | 2,\n\tAfter\n};\n",
    );
    assert!(parse_header(&mut session, unit).is_success());
    let data = session
        .graph()
        .node(session.find_type("EFlags").unwrap())
        .as_enum()
        .unwrap();
    let values: Vec<_> = data.entries.iter().map(|e| e.value).collect();
    assert_eq!(values, [Some(0), None, None, Some(1)]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn values_count_up_from_the_last_initializer(
        initializers in prop::collection::vec(prop::option::of(0u16..1000), 1..12)
    ) {
        let entries = parse_enum(&initializers);
        prop_assert_eq!(entries.len(), initializers.len() + 1);

        let mut expected = 0i64;
        for (entry, init) in entries.iter().zip(&initializers) {
            if let Some(value) = init {
                expected = i64::from(*value);
            }
            prop_assert_eq!(entry.1, Some(expected));
            expected += 1;
        }

        let max = entries.last().unwrap();
        prop_assert_eq!(max.0.as_str(), "EAuto::EAuto_MAX");
        let largest = entries[..initializers.len()].iter().filter_map(|e| e.1).max().unwrap();
        prop_assert_eq!(max.1, Some(largest + 1));
    }
}
