//! Parsed source files.

use std::path::Path;

use crate::graph::{ScopeId, TypeId};

/// A class found by the pre-scan, before the unit is parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrescannedClass {
    /// Class name.
    pub name: String,
    /// Parent class name, if an inheritance clause was found.
    pub parent: Option<String>,
    /// Whether it was declared with `UINTERFACE`.
    pub interface: bool,
}

/// One header file and its parse state.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceUnit {
    /// Path as given to the session.
    pub filename: String,
    /// Owning module or package.
    pub module: String,
    /// Full text.
    pub source: String,
    /// `#include` targets in order of appearance.
    pub includes: Vec<String>,
    /// Root file scope.
    pub scope: ScopeId,
    /// Set once a parse has been attempted to completion.
    pub parsed: bool,
    /// Set before dependencies are resolved, which breaks include cycles.
    pub dependencies_resolved: bool,
    /// Types declared at file scope, in order.
    pub defined_types: Vec<TypeId>,
    /// Whether `#include "<base>.generated.h"` was seen.
    pub saw_generated_include: bool,
    /// Classes found by the pre-scan.
    pub prescanned: Vec<PrescannedClass>,
}

impl SourceUnit {
    /// Creates an unparsed unit.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        module: impl Into<String>,
        source: impl Into<String>,
        scope: ScopeId,
    ) -> Self {
        Self {
            filename: filename.into(),
            module: module.into(),
            source: source.into(),
            includes: Vec::new(),
            scope,
            parsed: false,
            dependencies_resolved: false,
            defined_types: Vec::new(),
            saw_generated_include: false,
            prescanned: Vec::new(),
        }
    }

    /// Final path component, e.g. `Actor.h`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.filename)
    }

    /// File name without extension, e.g. `Actor`.
    #[must_use]
    pub fn base_name(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.filename)
    }

    /// Name of the header the code generator emits for this file.
    #[must_use]
    pub fn generated_header(&self) -> String {
        format!("{}.generated.h", self.base_name())
    }

    /// Returns true if an `#include` target refers to this unit, either by
    /// bare file name or by a trailing relative path.
    #[must_use]
    pub fn matches_include(&self, include: &str) -> bool {
        let include = include.replace('\\', "/");
        let filename = self.filename.replace('\\', "/");
        if filename == include {
            return true;
        }
        if include.contains('/') {
            filename.ends_with(&format!("/{include}"))
        } else {
            self.file_name() == include
        }
    }
}
