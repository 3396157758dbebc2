//! Skipping C++ the parser does not model.

use reflector_foundation::{Error, Result};
use reflector_syntax::{Token, TokenKind};

use super::HeaderParser;

/// Identifiers that look like macros but are not.
const NOT_MACROS: &[&str] = &["FORCEINLINE_DEBUGGABLE", "FORCEINLINE_STATS", "SIZE_T"];

/// Guesses whether `name` is a macro: all capitals, or one of the
/// delegate and event declaration families.
fn probably_a_macro(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_uppercase() => {}
        _ => return false,
    }
    if ["DECLARE_MULTICAST_DELEGATE", "DECLARE_DELEGATE", "DECLARE_EVENT"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
    {
        return true;
    }
    chars.all(|c| c == '_' || c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// An all-capitals identifier with at least one underscore that is not an
/// export macro.
fn looks_like_object_macro(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_uppercase() => {}
        _ => return false,
    }
    let rest = chars.as_str();
    if !rest.chars().all(|c| c == '_' || c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return false;
    }
    if !rest.contains('_') || (name.len() > 4 && name.ends_with("_API")) {
        return false;
    }
    !NOT_MACROS.iter().any(|known| known.eq_ignore_ascii_case(name))
}

impl HeaderParser<'_> {
    /// Consumes an unknown object-like macro, one that is not followed by
    /// an argument list. Returns false, consuming nothing, otherwise.
    pub(super) fn skip_unknown_object_macro(&mut self, token: &Token) -> bool {
        token.ident().is_some_and(looks_like_object_macro) && !self.stream.peek_symbol("(")
    }

    /// Skips a C++ declaration or definition that starts with `token`.
    ///
    /// Returns true if the declaration ended cleanly at a `;` or at the
    /// brace closing its definition.
    pub(super) fn skip_declaration(&mut self, token: Token) -> Result<bool> {
        let mut possibly_class = token.is_identifier("class") || token.is_identifier("struct");
        let mut is_macro = token.ident().is_some_and(probably_a_macro) && !token.is_identifier("DECLARE_FUNCTION");
        let (mut open, mut close) = brackets(is_macro);
        let mut nests = 0i32;
        let mut end_found = false;
        let mut definition = false;
        let mut retest: Option<Token> = None;

        loop {
            let token = match retest.take() {
                Some(token) => token,
                None => self.stream.get_token(),
            };
            if token.is_eof() {
                break;
            }
            if possibly_class && nests == 0 && token.is_symbol("(") {
                possibly_class = false;
            }
            if nests == 0 && token.is_symbol(";") {
                end_found = true;
                break;
            }

            if token.is_symbol(open) {
                definition = true;
                nests += 1;
            } else if token.is_symbol(close) {
                nests -= 1;
                // An all-capitals class name followed by its body is not a macro.
                if nests == 0 && !(is_macro && self.stream.peek_symbol("{")) {
                    end_found = true;
                    break;
                }
                if nests < 0 {
                    return Err(Error::syntax("Unexpected '}'. Did you miss a semi-colon?"));
                }
            } else if is_macro && nests == 0 {
                is_macro = false;
                (open, close) = brackets(false);
                retest = Some(token);
            }
        }

        if end_found {
            if possibly_class && definition {
                let name = self.stream.get_token();
                if name.is_eof() {
                    return Ok(false);
                }
                if !name.is_ident() {
                    self.stream.unget_token(name);
                } else if !self.stream.match_symbol(";") {
                    return Err(Error::syntax(format!(
                        "Unexpected '{name}'. Did you miss a semi-colon?"
                    )));
                }
            }
            while self.stream.match_symbol(";") {}
        }
        Ok(nests == 0 && end_found)
    }

    /// Skips statements until the brace depth drops below `nest_count`,
    /// or until a `;` when starting at depth zero.
    pub(super) fn skip_statements(&mut self, mut nest_count: i32, tag: &str) -> Result<()> {
        let original = nest_count;
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                break;
            }
            if token.is_symbol("{") {
                nest_count += 1;
            } else if token.is_symbol("}") {
                nest_count -= 1;
            } else if token.is_symbol(";") && original == 0 {
                break;
            }
            if nest_count < original || nest_count < 0 {
                break;
            }
        }
        if nest_count > 0 {
            return Err(Error::syntax(format!("Unexpected end of file at end of {tag}")));
        }
        if nest_count < 0 {
            return Err(Error::syntax(format!("Extraneous closing brace found in {tag}")));
        }
        Ok(())
    }

    /// Skips `DEPRECATED(version, "message")` if present.
    pub(super) fn skip_deprecated_macro(&mut self) -> Result<()> {
        if !self.stream.match_identifier("DEPRECATED") {
            return Ok(());
        }
        self.stream.require_symbol("(", "DEPRECATED macro")?;
        let version = self.stream.get_token();
        if !matches!(version.kind, TokenKind::Float(_) | TokenKind::Int(_)) {
            return Err(Error::syntax("Expected engine version in DEPRECATED macro"));
        }
        self.stream.require_symbol(",", "DEPRECATED macro")?;
        let message = self.stream.get_token();
        if !matches!(message.kind, TokenKind::Str(_)) {
            return Err(Error::syntax("Expected deprecation message in DEPRECATED macro"));
        }
        self.stream.require_symbol(")", "DEPRECATED macro")?;
        Ok(())
    }
}

const fn brackets(is_macro: bool) -> (&'static str, &'static str) {
    if is_macro { ("(", ")") } else { ("{", "}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_guesses() {
        assert!(probably_a_macro("DECLARE_DELEGATE_OneParam"));
        assert!(probably_a_macro("FORCEINLINE"));
        assert!(!probably_a_macro("FVector"));
        assert!(!probably_a_macro("int32"));
    }

    #[test]
    fn object_macro_guesses() {
        assert!(looks_like_object_macro("PRAGMA_DISABLE_OPTIMIZATION"));
        assert!(!looks_like_object_macro("FORCEINLINE"));
        assert!(!looks_like_object_macro("GAME_API"));
        assert!(!looks_like_object_macro("SIZE_T"));
        assert!(!looks_like_object_macro("Some_Thing"));
    }
}
