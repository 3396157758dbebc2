//! Documentation policy checks.
//!
//! Under [`DocumentationPolicy::Strict`] every type, property, function and
//! enumerator needs a description of its own, functions need an `@param`
//! line for each parameter, and siblings may not share a description.
//! Violations are warnings; they never fail a file.

use std::collections::HashMap;

use reflector_foundation::{Diagnostic, DocumentationPolicy, MetaData, Severity};
use reflector_model::{EnumData, TypeGraph, TypeId, TypeKind, UnitId};

use crate::session::Session;

const CATEGORY: &str = "documentation";

/// Description recorded for a node: its tooltip, else its short tooltip.
/// Empty descriptions and descriptions equal to `name` count as missing.
fn description<'m>(metadata: &'m MetaData, name: &str) -> Option<&'m str> {
    ["ToolTip", "ShortToolTip"]
        .into_iter()
        .filter_map(|key| metadata.get(key))
        .map(str::trim)
        .find(|text| !text.is_empty() && *text != name)
}

/// Parameter names documented by `@param Name description` lines.
pub fn param_tags(comment: &str) -> Vec<String> {
    comment
        .lines()
        .filter_map(|line| {
            let (_, rest) = line.split_once("@param")?;
            let name = rest
                .split_whitespace()
                .next()?
                .trim_end_matches([':', ',', '-']);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Policy in force for a node.
fn policy_for(session: &Session, metadata: &MetaData) -> DocumentationPolicy {
    metadata
        .get("DocumentationPolicy")
        .and_then(DocumentationPolicy::from_name)
        .unwrap_or(session.config().default_documentation_policy)
}

/// Collects the findings for one node before they are recorded.
struct Findings<'g> {
    graph: &'g TypeGraph,
    warnings: Vec<(String, u32)>,
}

impl Findings<'_> {
    fn warn(&mut self, message: String, line: u32) {
        self.warnings.push((format!("{message} (DocumentationPolicy)."), line));
    }

    /// Warns about every description in `items` shared with an earlier item.
    fn check_unique(&mut self, owner: &str, kind: &str, items: &[(String, Option<String>, u32)]) {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (name, text, line) in items {
            let Some(text) = text.as_deref() else {
                continue;
            };
            if let Some(first) = seen.get(text) {
                self.warn(
                    format!("{kind} '{owner}::{first}' and '{owner}::{name}' are using identical tooltips"),
                    *line,
                );
            } else {
                seen.insert(text, name);
            }
        }
    }

    fn check_type(&mut self, id: TypeId) {
        let graph = self.graph;
        let node = graph.node(id);
        if description(&node.metadata, &node.name).is_none() {
            let kind = match node.kind {
                TypeKind::Enum(_) => "Enum",
                TypeKind::Struct(_) => "Struct",
                _ => "Class",
            };
            self.warn(format!("{kind} '{}' does not provide a tooltip / comment", node.name), node.line);
        }

        if let TypeKind::Enum(data) = &node.kind {
            self.check_enumerators(&node.name, &node.metadata, data, node.line);
            return;
        }
        let Some(body) = node.body() else {
            return;
        };

        let mut properties = Vec::new();
        for prop in &body.properties {
            let text = description(&prop.metadata, &prop.name).map(str::to_string);
            if text.is_none() {
                self.warn(
                    format!("Property '{}::{}' does not provide a tooltip / comment", node.name, prop.name),
                    prop.line,
                );
            }
            properties.push((prop.name.clone(), text, prop.line));
        }
        self.check_unique(&node.name, "Property", &properties);

        let mut functions = Vec::new();
        for &function in &body.functions {
            let text = self.check_function(&node.name, function);
            let function = graph.node(function);
            functions.push((function.name.clone(), text, function.line));
        }
        self.check_unique(&node.name, "Function", &functions);
    }

    /// Returns the function's description, if it has one.
    fn check_function(&mut self, owner: &str, id: TypeId) -> Option<String> {
        let graph = self.graph;
        let node = graph.node(id);
        let data = node.as_function()?;
        let text = description(&node.metadata, &node.name).map(str::to_string);
        if text.is_none() {
            self.warn(
                format!("Function '{owner}::{}' does not provide a tooltip / comment", node.name),
                node.line,
            );
        }

        let tags = node.raw_comment.as_deref().map(param_tags).unwrap_or_default();
        let params = data.param_names();
        for param in &params {
            if !tags.contains(param) {
                self.warn(
                    format!(
                        "Function '{owner}::{}' doesn't provide a tooltip for parameter '{param}'",
                        node.name
                    ),
                    node.line,
                );
            }
        }
        for tag in &tags {
            if !params.contains(tag) {
                self.warn(
                    format!(
                        "Function '{owner}::{}' provides a tooltip for an unknown parameter '{tag}'",
                        node.name
                    ),
                    node.line,
                );
            }
        }
        text
    }

    fn check_enumerators(&mut self, owner: &str, metadata: &MetaData, data: &EnumData, line: u32) {
        let mut entries = Vec::new();
        for entry in data.declared_entries() {
            let short = EnumData::short_name(&entry.name);
            let text = metadata
                .get(&format!("{short}.ToolTip"))
                .or_else(|| metadata.get(&format!("{short}.ShortToolTip")))
                .map(str::trim)
                .filter(|text| !text.is_empty() && *text != short)
                .map(str::to_string);
            if text.is_none() {
                self.warn(
                    format!("Enum entry '{owner}::{short}' does not provide a tooltip / comment"),
                    line,
                );
            }
            entries.push((short.to_string(), text, line));
        }
        self.check_unique(owner, "Enum entries", &entries);
    }
}

/// Checks every type `unit` defined against its documentation policy and
/// records warnings in the session.
pub fn check_unit(session: &mut Session, unit: UnitId) {
    let file = session.unit(unit).filename.clone();
    let types = session.unit(unit).defined_types.clone();

    let mut warnings = Vec::new();
    for id in types {
        let node = session.graph().node(id);
        if policy_for(session, &node.metadata) == DocumentationPolicy::None {
            continue;
        }
        log::debug!(target: "reflector", "checking documentation of {}", node.name);
        let mut findings = Findings {
            graph: session.graph(),
            warnings: Vec::new(),
        };
        findings.check_type(id);
        warnings.extend(
            findings
                .warnings
                .into_iter()
                .map(|(message, line)| Diagnostic::new(Severity::Warning, CATEGORY, message).at(&file, line)),
        );
    }
    for warning in warnings {
        session.diagnostics_mut().push(warning);
    }
}
