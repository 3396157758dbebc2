//! Integration tests for struct naming

use proptest::prelude::*;
use reflector_foundation::ParserConfig;
use reflector_parser::{Session, parse_header};

fn parse_struct(config: ParserConfig, declared: &str) -> Result<(), String> {
    let mut session = Session::new(config);
    let source = format!(
        "#include \"Named.generated.h\"\nUSTRUCT()\nstruct {declared}\n{{\n\tGENERATED_BODY()\n}};\n"
    );
    let unit = session.add_unit("Game/Named.h", "Game", source);
    if parse_header(&mut session, unit).is_success() {
        Ok(())
    } else {
        Err(session.errors()[0].to_string())
    }
}

#[test]
fn exempt_structs_skip_the_prefix() {
    let config = ParserConfig::default().with_struct_without_prefix("Vertex");
    assert_eq!(parse_struct(config, "Vertex"), Ok(()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn structs_need_the_f_prefix(suffix in "[a-z]{1,8}") {
        let name = format!("Gen{suffix}");
        prop_assert_eq!(parse_struct(ParserConfig::default(), &format!("F{name}")), Ok(()));
        prop_assert_eq!(
            parse_struct(ParserConfig::default(), &name),
            Err(format!("Struct '{name}' is missing a valid Unreal prefix, expecting 'F{name}'"))
        );
    }
}
