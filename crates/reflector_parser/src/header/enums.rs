//! `UENUM` declarations.

use reflector_foundation::{Error, MetaData, Result};
use reflector_model::{
    EnumData, EnumEntry, EnumFlags, EnumForm, ScalarKind, TypeKind, TypeNode,
};

use reflector_model::specifiers::MetadataSubject;

use super::HeaderParser;
use super::specifiers::apply_metadata_specifier;
use crate::nest::AllowFlags;

/// Prefix of the synthetic `_MAX` tag of a regular enum: the longest
/// common prefix of its tags cut back to the last underscore, or the enum
/// name when there is none.
fn max_tag_prefix(enum_name: &str, tags: &[String]) -> String {
    let Some((first, rest)) = tags.split_first() else {
        return enum_name.to_string();
    };
    let mut common = first.as_str();
    for tag in rest {
        let shared = common
            .char_indices()
            .zip(tag.chars())
            .find(|((_, a), b)| a != b)
            .map_or_else(|| common.len().min(tag.len()), |((i, _), _)| i);
        common = &common[..shared];
    }
    match common.rfind('_') {
        Some(end) if end > 0 => common[..end].to_string(),
        _ => enum_name.to_string(),
    }
}

impl HeaderParser<'_> {
    /// Parses `UENUM(...)` and the enum that follows it.
    pub(super) fn compile_enum(&mut self) -> Result<()> {
        self.nests.check_allowed("'Enum'", AllowFlags::TYPE_DECL)?;

        let mut metadata = MetaData::new();
        for specifier in self.read_specifier_set("Enum", &mut metadata)? {
            apply_metadata_specifier("enum", &specifier, &mut metadata)?;
        }

        let Some(keyword) = self.stream.get_identifier() else {
            return Err(Error::syntax("Missing identifier after UENUM()"));
        };
        let (form, name) = if keyword.is_identifier("namespace") {
            (EnumForm::Namespaced, self.stream.get_identifier())
        } else if keyword.is_identifier("enum") {
            let Some(next) = self.stream.get_identifier() else {
                return Err(Error::syntax("Missing identifier after enum"));
            };
            if next.is_identifier("class") || next.is_identifier("struct") {
                (EnumForm::EnumClass, self.stream.get_identifier())
            } else {
                (EnumForm::Regular, Some(next))
            }
        } else {
            return Err(Error::syntax(
                "UENUM() should be followed by 'enum' or 'namespace' keywords.",
            ));
        };
        let Some(name) = name else {
            return Err(Error::syntax("Missing enumeration name"));
        };
        let name = name.text;
        let line = self.stream.line();
        log::trace!(target: "reflector", "{}({line}): enum {name}", self.filename);

        let file_scope = self.file_scope();
        if self.session.graph().scope(file_scope).get(&name).is_some() {
            return Err(Error::semantic(format!("enum: '{name}' already defined here")));
        }
        self.parse_field_metadata(&name, &mut metadata)?;
        self.validate_metadata(&name, &metadata, MetadataSubject::Type)?;

        let mut underlying = None;
        if form == EnumForm::EnumClass && self.stream.match_symbol(":") {
            let Some(base) = self.stream.get_identifier() else {
                return Err(Error::syntax("Missing enum base"));
            };
            underlying = ScalarKind::from_keyword(&base.text).filter(|kind| kind.is_enum_underlying());
            if underlying.is_none() {
                return Err(Error::syntax(format!("Unsupported enum class base type: {base}")));
            }
        }
        // Regular and namespaced enums are stored as bytes.
        let is_byte = form != EnumForm::EnumClass || underlying == Some(ScalarKind::Byte);
        if !is_byte && metadata.contains("BlueprintType") {
            return Err(Error::semantic(
                "Invalid BlueprintType enum base - currently only uint8 supported",
            ));
        }

        self.stream.require_symbol("{", "'Enum'")?;
        let cpp_type = if form == EnumForm::Namespaced {
            self.stream.require_identifier_named("enum", "'Enum'")?;
            let Some(inner) = self.stream.get_identifier() else {
                return Err(Error::syntax("Missing enumeration name"));
            };
            self.stream.require_symbol("{", "'Enum'")?;
            format!("{name}::{}", inner.text)
        } else {
            name.clone()
        };

        let raw_comment = self.take_tooltip(&mut metadata);
        let entries = self.parse_enumerators(&name, form, &mut metadata)?;

        self.stream.require_symbol("}", "'Enum'")?;
        self.stream.match_symbol(";");
        if form == EnumForm::Namespaced {
            self.stream.require_symbol("}", "'Enum'")?;
        }

        let mut flags = EnumFlags::empty();
        if metadata.get_bool("BlueprintType") {
            flags |= EnumFlags::BLUEPRINT_TYPE;
        }
        if metadata.contains("Bitflags") {
            flags |= EnumFlags::FLAGS;
        }
        let data = EnumData {
            form,
            underlying,
            cpp_type,
            entries,
            flags,
        };
        let mut node =
            TypeNode::new(name.as_str(), file_scope, TypeKind::Enum(data)).declared_at(self.unit, line);
        node.metadata = metadata;
        node.raw_comment = raw_comment;

        let graph = self.session.graph_mut();
        let id = graph.add_node(node);
        graph.declare(file_scope, &name, id)?;
        graph.register_global(id)?;
        self.session.unit_mut(self.unit).defined_types.push(id);
        Ok(())
    }

    /// Reads enumerators up to, not including, the closing brace and
    /// appends the synthetic `_MAX` tag.
    fn parse_enumerators(
        &mut self,
        enum_name: &str,
        form: EnumForm,
        metadata: &mut MetaData,
    ) -> Result<Vec<EnumEntry>> {
        let mut entries: Vec<EnumEntry> = Vec::new();
        let mut tags = Vec::new();
        let mut next_value = Some(0i64);

        loop {
            if self.stream.match_symbol("#") {
                self.compile_directive()?;
                continue;
            }
            let Some(tag) = self.stream.get_identifier() else {
                break;
            };
            let mut tag_metadata = MetaData::new();
            if let Some(comment) = &tag.comment {
                super::add_tooltip(comment, &mut tag_metadata);
            }

            if self.stream.match_symbol("=") {
                next_value = self.parse_enumerator_initializer()?;
            }

            let qualified = if form.qualifies_tags() {
                format!("{enum_name}::{}", tag.text)
            } else {
                tag.text.clone()
            };
            entries.push(EnumEntry {
                name: qualified,
                value: next_value,
                editor_only: self.editor_only(),
            });
            tags.push(tag.text.clone());
            next_value = next_value.map(|v| v.wrapping_add(1));

            self.parse_field_metadata(&tag.text, &mut tag_metadata)?;
            for (key, value) in tag_metadata.iter() {
                metadata.insert(format!("{}.{key}", tag.text), value);
            }

            if !self.stream.match_symbol(",") {
                let closing = self.stream.get_token();
                if closing.is_eof() {
                    return Err(Error::syntax("UENUM: end of file encountered"));
                }
                if closing.is_symbol("}") {
                    self.stream.unget_token(closing);
                    break;
                }
                if closing.is_symbol("#") {
                    self.compile_directive()?;
                }
            }
        }

        let prefix = if form.qualifies_tags() {
            enum_name.to_string()
        } else {
            max_tag_prefix(enum_name, &tags)
        };
        let max_short = format!("{prefix}_MAX");
        if tags.iter().any(|tag| *tag == max_short) {
            return Err(Error::semantic(format!(
                "Illegal enumeration tag specified.  Conflicts with auto-generated tag '{max_short}'"
            )));
        }
        let max_value = entries.iter().filter_map(|e| e.value).max().map_or(0, |v| v.wrapping_add(1));
        let max_name = if form.qualifies_tags() {
            format!("{enum_name}::{max_short}")
        } else {
            max_short
        };
        entries.push(EnumEntry {
            name: max_name,
            value: Some(max_value),
            editor_only: false,
        });
        Ok(entries)
    }

    /// Reads `= init` after a tag. Only a lone (possibly negated) integer
    /// literal has a known value; anything else yields `None`.
    fn parse_enumerator_initializer(&mut self) -> Result<Option<i64>> {
        let negative = self.stream.match_symbol("-");
        let init = self.stream.get_token();
        if init.is_eof() {
            return Err(Error::syntax("UENUM: missing enumerator initializer"));
        }
        let mut value = init.int_value().map(|v| if negative { v.wrapping_neg() } else { v });
        loop {
            let token = self.stream.get_token();
            if token.is_eof() {
                return Err(Error::syntax(
                    "Enumerator: end of file encountered while parsing the initializer",
                ));
            }
            if token.is_symbol(",") || token.is_symbol("}") || token.is_identifier("UMETA") {
                self.stream.unget_token(token);
                return Ok(value);
            }
            value = None;
        }
    }
}
