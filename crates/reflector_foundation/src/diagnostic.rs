//! Non-fatal diagnostics.
//!
//! Fatal problems are [`Error`](crate::Error)s. Everything else (deprecation
//! warnings, documentation policy findings, rule violations that should not
//! stop the current declaration) is recorded here and mirrored to the `log`
//! facade.

use std::fmt;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Informational.
    Note,
    /// Suspicious but legal.
    Warning,
    /// A rule violation; the file fails once its parse completes.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => write!(f, "Note"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A single recorded diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Short category tag, e.g. `documentation` or `deprecation`.
    pub category: &'static str,
    /// Human-readable message.
    pub message: String,
    /// File the diagnostic refers to.
    pub file: Option<String>,
    /// Line in that file.
    pub line: Option<u32>,
}

impl Diagnostic {
    /// Creates a diagnostic without a location.
    #[must_use]
    pub fn new(severity: Severity, category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}({line}): ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            _ => {}
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Collects diagnostics for a whole session.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and forwards it to the logger.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Note => log::debug!(target: "reflector", "{diagnostic}"),
            Severity::Warning => log::warn!(target: "reflector", "{diagnostic}"),
            Severity::Error => log::error!(target: "reflector", "{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    /// All diagnostics in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Iterates diagnostics of one category.
    pub fn in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.iter().filter(move |d| d.category == category)
    }

    /// Number of error-severity diagnostics recorded for `file`.
    #[must_use]
    pub fn error_count_for(&self, file: &str) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error && d.file.as_deref() == Some(file))
            .count()
    }

    /// Number of warnings recorded.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every diagnostic.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
