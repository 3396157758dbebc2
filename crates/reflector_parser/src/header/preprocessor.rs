//! `#` directives.
//!
//! The parser does not preprocess. It tracks `#if` blocks only far enough
//! to tag editor-only declarations and to insist that every block closes.

use reflector_foundation::{Error, Result};
use reflector_syntax::{Token, TokenKind};

use super::HeaderParser;
use crate::directive::CompilerDirective;

/// `#if 0` and `#if 1`.
fn is_zero_or_one(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Int(0 | 1))
}

impl HeaderParser<'_> {
    /// Handles a directive at global or class scope. The `#` has been
    /// consumed.
    pub(super) fn compile_directive(&mut self) -> Result<()> {
        let Some(directive) = self.stream.get_identifier() else {
            return Err(Error::syntax("Missing compiler directive after '#'"));
        };
        let line = self.stream.line();
        log::trace!(target: "reflector", "{}({line}): #{}", self.filename, directive.text);

        if directive.is_identifier_ci("error") {
            return Err(Error::syntax("#Error directive encountered"));
        } else if directive.is_identifier_ci("include") {
            let target = self.stream.get_token();
            if let TokenKind::Str(path) = &target.kind {
                let expected = self.session.unit(self.unit).generated_header();
                if path.eq_ignore_ascii_case(&expected) {
                    self.session.unit_mut(self.unit).saw_generated_include = true;
                }
            }
        } else if directive.is_identifier_ci("if") {
            let negated = self.stream.match_symbol("!");
            let condition = self.stream.get_token();
            let pushed = if is_zero_or_one(&condition) {
                CompilerDirective::Insignificant
            } else if !condition.is_ident() {
                return Err(Error::syntax("Missing define name '#if'"));
            } else if condition.is_identifier("WITH_EDITORONLY_DATA") {
                CompilerDirective::WithEditorOnlyData
            } else if condition.is_identifier("WITH_EDITOR") {
                CompilerDirective::WithEditor
            } else if condition.is_identifier("WITH_HOT_RELOAD")
                || condition.is_identifier("WITH_HOT_RELOAD_CTORS")
                || (negated && condition.is_identifier("CPP"))
            {
                CompilerDirective::Insignificant
            } else {
                return Err(Error::syntax(format!(
                    "Unknown define '#if {condition}' in class or global scope"
                )));
            };
            self.directives.push(pushed);
        } else if directive.is_identifier_ci("endif") {
            self.directives.pop()?;
        } else if directive.is_identifier_ci("ifdef") || directive.is_identifier_ci("ifndef") {
            self.directives.push(CompilerDirective::Insignificant);
        } else if !["pragma", "define", "undef", "else"]
            .iter()
            .any(|known| directive.is_identifier_ci(known))
        {
            return Err(Error::syntax(format!("Unrecognized compiler directive {directive}")));
        }

        if self.stream.line() == line {
            self.stream.rest_of_line();
        }
        Ok(())
    }

    /// Handles a directive inside a struct body. The `#` has been consumed.
    pub(super) fn compile_struct_directive(&mut self, struct_name: &str) -> Result<()> {
        if self.stream.match_identifier("ifdef") || self.stream.match_identifier("ifndef") {
            self.directives.push(CompilerDirective::Insignificant);
        } else if self.stream.match_identifier("endif") {
            self.directives.pop()?;
        } else if self.stream.match_identifier("if") {
            let negated = self.stream.match_symbol("!");
            let condition = self.stream.get_token();
            if condition.is_identifier("WITH_EDITORONLY_DATA") {
                if negated {
                    return Err(Error::syntax("Cannot use !WITH_EDITORONLY_DATA"));
                }
                self.directives.push(CompilerDirective::WithEditorOnlyData);
            } else if condition.is_identifier("WITH_EDITOR") {
                if negated {
                    return Err(Error::syntax("Cannot use !WITH_EDITOR"));
                }
                self.directives.push(CompilerDirective::WithEditor);
            } else if condition.is_identifier("CPP")
                || is_zero_or_one(&condition)
                || condition.is_identifier("WITH_HOT_RELOAD")
                || condition.is_identifier("WITH_HOT_RELOAD_CTORS")
            {
                if negated {
                    self.directives.push(CompilerDirective::Insignificant);
                } else {
                    self.skip_guarded_text(struct_name)?;
                }
            } else {
                return Err(Error::syntax(
                    "'struct': Unsupported preprocessor directive inside a struct.",
                ));
            }
        } else {
            // #pragma, #define and friends: nothing to record.
            self.stream.rest_of_line();
        }
        Ok(())
    }

    /// Skips C++-only text up to the `#endif` closing the current block.
    fn skip_guarded_text(&mut self, struct_name: &str) -> Result<()> {
        let mut depth = 1usize;
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax(format!(
                    "Unexpected end of struct definition {struct_name}"
                )));
            }
            if token.is_symbol("{") {
                depth += 1;
            } else if token.is_symbol("}") {
                depth -= 1;
                if depth == 0 {
                    return Err(Error::syntax("Missing 'endif' in 'if'"));
                }
            } else if token.is_symbol("#") {
                if self.stream.peek_identifier("if", true) || self.stream.peek_identifier("ifdef", true) {
                    depth += 1;
                } else if self.stream.match_identifier("endif") {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
            }
        }
    }
}
