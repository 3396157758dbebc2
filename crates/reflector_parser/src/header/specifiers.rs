//! Annotation argument lists.
//!
//! `MACRO( Spec, Spec=Value, Spec=(A, B), meta=(Key, Key=Value) )` is read
//! into [`Specifier`]s plus a metadata map. `UMETA(...)` uses the metadata
//! half of the same grammar.

use reflector_foundation::{Diagnostic, Error, MetaData, Result, Severity};
use reflector_model::specifiers::{MetadataSpecifier, MetadataSubject, check_metadata};
use reflector_syntax::{Token, error_at};

use super::HeaderParser;

/// One entry of an annotation argument list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Specifier {
    /// Keyword as written.
    pub key: String,
    /// Values after `=`, one per list element.
    pub values: Vec<String>,
}

impl Specifier {
    /// The single value, or `""` when none was given.
    #[must_use]
    pub fn value(&self) -> &str {
        self.values.first().map_or("", String::as_str)
    }
}

/// Applies a specifier from the shared metadata table, failing with
/// "Unknown `kind` specifier" when it is not there either.
pub(super) fn apply_metadata_specifier(
    kind: &'static str,
    specifier: &Specifier,
    metadata: &mut MetaData,
) -> Result<()> {
    let Some(shared) = MetadataSpecifier::lookup(&specifier.key) else {
        return Err(Error::unknown_specifier(kind, &specifier.key));
    };
    shared.apply(&specifier.values, metadata)
}

/// Text of a value made of `tokens`: a lone string literal loses its quotes,
/// anything longer is the source text it spans.
fn value_text(parser: &HeaderParser<'_>, tokens: &[Token]) -> String {
    match tokens {
        [] => String::new(),
        [single] => single.value_text().to_string(),
        [first, .., last] => {
            let raw = parser.stream.slice(first.span.start, last.span.end).trim();
            raw.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(raw)
                .to_string()
        }
    }
}

impl HeaderParser<'_> {
    /// Reads `( ... )` after an annotation macro. `kind` names the
    /// declaration in error messages, e.g. `Class`.
    pub(super) fn read_specifier_set(
        &mut self,
        kind: &str,
        metadata: &mut MetaData,
    ) -> Result<Vec<Specifier>> {
        let context = format!("{kind} declaration specifier");
        self.stream.require_symbol("(", &context)?;
        let mut specifiers = Vec::new();
        let mut first = true;
        while !self.stream.match_symbol(")") {
            if !first {
                self.stream.require_symbol(",", &context)?;
            }
            first = false;

            let token = self.stream.get_token();
            if !token.is_ident() {
                return Err(error_at(
                    &token,
                    format!("Expected {kind} specifier, found '{token}'"),
                ));
            }
            if token.is_identifier_ci("meta") {
                self.stream.require_symbol("=", &context)?;
                self.stream.require_symbol("(", &context)?;
                self.read_metadata_list(&token.text, metadata)?;
                continue;
            }

            let mut specifier = Specifier {
                key: token.text,
                values: Vec::new(),
            };
            if self.stream.match_symbol("=") {
                if self.stream.match_symbol("(") {
                    specifier.values = self.read_value_list()?;
                } else {
                    specifier.values.push(self.read_value()?);
                }
            } else if self.stream.match_symbol("(") {
                specifier.values = self.read_value_list()?;
            }
            specifiers.push(specifier);
        }
        Ok(specifiers)
    }

    /// Reads tokens up to the next top-level `,` or `)`, leaving the
    /// delimiter in the stream.
    fn read_value(&mut self) -> Result<String> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(error_at(&token, "End of file encountered in specifier list"));
            }
            if depth == 0 && (token.is_symbol(",") || token.is_symbol(")")) {
                self.stream.unget_token(token);
                break;
            }
            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth -= 1;
            }
            tokens.push(token);
        }
        Ok(value_text(self, &tokens))
    }

    /// Reads `A, B, C )` after an opening parenthesis.
    fn read_value_list(&mut self) -> Result<Vec<String>> {
        let mut values = Vec::new();
        loop {
            if self.stream.match_symbol(")") {
                return Ok(values);
            }
            let value = self.read_value()?;
            if !value.is_empty() {
                values.push(value);
            }
            self.stream.match_symbol(",");
        }
    }

    /// Reads `Key, Key=Value )` into `metadata`. `owner` names the
    /// construct in error messages.
    pub(super) fn read_metadata_list(&mut self, owner: &str, metadata: &mut MetaData) -> Result<()> {
        loop {
            if self.stream.match_symbol(")") {
                return Ok(());
            }
            let key = self.stream.get_token();
            if !key.is_ident() {
                return Err(error_at(
                    &key,
                    format!("'{owner}': Expected a metadata key, found '{key}'"),
                ));
            }
            let value = if self.stream.match_symbol("=") {
                self.read_value()?
            } else {
                String::new()
            };
            self.insert_metadata(metadata, &key.text, value)?;
            if !self.stream.match_symbol(",") && !self.stream.peek_symbol(")") {
                let token = self.stream.get_token();
                return Err(error_at(
                    &token,
                    format!("'{owner}': Expected ',' or ')' in metadata, found '{token}'"),
                ));
            }
        }
    }

    /// Reads an optional `UMETA(...)` following a field.
    pub(super) fn parse_field_metadata(&mut self, field: &str, metadata: &mut MetaData) -> Result<()> {
        if self.stream.match_identifier("UMETA") {
            self.stream
                .require_symbol("(", &format!("' {field} metadata'"))?;
            if self.stream.peek_symbol(")") {
                return Err(Error::syntax(format!("'{field}': No metadata specified")));
            }
            self.read_metadata_list(field, metadata)?;
        }
        Ok(())
    }

    /// Inserts one metadata pair, applying configured key redirects.
    fn insert_metadata(&mut self, metadata: &mut MetaData, key: &str, value: String) -> Result<()> {
        let redirected = self.session.config().metadata_key_redirects.get(key).cloned();
        let key = match redirected {
            Some(new_key) => {
                self.warn(
                    "deprecation",
                    format!(
                        "Remapping old metadata key '{key}' to new key '{new_key}', please update the declaration."
                    ),
                );
                new_key
            }
            None => key.to_string(),
        };
        if let Some(existing) = metadata.get(&key) {
            if existing != value {
                return Err(Error::semantic(format!(
                    "Metadata key '{key}' first seen with value '{existing}' then '{value}'"
                )));
            }
        }
        metadata.insert(key, value);
        Ok(())
    }

    /// Runs the checked-metadata rules over `metadata`. Fatal violations
    /// are returned; the rest are recorded as errors.
    pub(super) fn validate_metadata(
        &mut self,
        field: &str,
        metadata: &MetaData,
        subject: MetadataSubject<'_>,
    ) -> Result<()> {
        let violations: Vec<_> = metadata
            .iter()
            .filter_map(|(key, value)| check_metadata(key, value, field, subject))
            .collect();
        for violation in violations {
            if violation.fatal {
                return Err(Error::semantic(violation.message));
            }
            self.report_error(violation.message);
        }
        Ok(())
    }

    /// Records a non-fatal warning at the current line.
    pub(super) fn warn(&mut self, category: &'static str, message: impl Into<String>) {
        let diagnostic =
            Diagnostic::new(Severity::Warning, category, message).at(&self.filename, self.stream.line());
        self.session.diagnostics_mut().push(diagnostic);
    }
}
