//! Error types for the Reflector front end.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every fatal parse condition is an [`Error`]; it unwinds to the per-file
//! driver, which records the file as failed.

use std::fmt;

use thiserror::Error;

/// The main error type for Reflector operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Attaches a file and line unless the error already carries a location.
    #[must_use]
    pub fn located(mut self, source: impl Into<String>, line: u32) -> Self {
        match &mut self.context {
            Some(ctx) if ctx.source.is_some() => {}
            Some(ctx) => {
                ctx.source = Some(source.into());
                ctx.line.get_or_insert(line);
            }
            None => {
                self.context = Some(ErrorContext::new().with_source(source).with_line(line));
            }
        }
        self
    }

    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax(message.into()))
    }

    /// Creates a semantic (rule violation) error.
    #[must_use]
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic(message.into()))
    }

    /// Creates a duplicate declaration error.
    #[must_use]
    pub fn duplicate_name(name: impl Into<String>, existing: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName {
            name: name.into(),
            existing: existing.into(),
        })
    }

    /// Creates an error for a name that does not resolve to a known type.
    #[must_use]
    pub fn unresolved_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnresolvedType(message.into()))
    }

    /// Creates an unknown specifier error.
    #[must_use]
    pub fn unknown_specifier(kind: &'static str, specifier: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownSpecifier {
            kind,
            specifier: specifier.into(),
        })
    }

    /// Creates a nesting (context stack) error.
    #[must_use]
    pub fn nesting(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Nesting(message.into()))
    }

    /// Creates the aggregated unmatched-pairs error.
    #[must_use]
    pub fn unmatched_pairs(entries: Vec<PendingPair>) -> Self {
        Self::new(ErrorKind::UnmatchedPairs(entries))
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns the line this error was raised at, if known.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.context.as_ref().and_then(|ctx| ctx.line)
    }

    /// Formats the error the way compiler output usually looks:
    /// `file(line): Error: message`.
    #[must_use]
    pub fn report(&self) -> String {
        match &self.context {
            Some(ErrorContext {
                source: Some(source),
                line: Some(line),
                ..
            }) => format!("{source}({line}): Error: {}", self.kind),
            Some(ErrorContext {
                source: Some(source),
                ..
            }) => format!("{source}: Error: {}", self.kind),
            _ => format!("Error: {}", self.kind),
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Malformed source: unexpected token, missing symbol, unmatched brace.
    #[error("{0}")]
    Syntax(String),

    /// A legality rule was violated.
    #[error("{0}")]
    Semantic(String),

    /// A name was declared twice in one scope.
    #[error("'{name}' conflicts with '{existing}'")]
    DuplicateName {
        /// The name being declared.
        name: String,
        /// Description of the existing declaration.
        existing: String,
    },

    /// A type, class or delegate name could not be resolved.
    #[error("{0}")]
    UnresolvedType(String),

    /// A specifier keyword is not valid for the declaration kind.
    #[error("Unknown {kind} specifier '{specifier}'")]
    UnknownSpecifier {
        /// Declaration kind (`struct`, `variable`, ...).
        kind: &'static str,
        /// The offending keyword.
        specifier: String,
    },

    /// The declaration context stack was violated.
    #[error("{0}")]
    Nesting(String),

    /// Requests remained without their matching responses at end of file.
    #[error("Request functions missing response pairs:{}", format_pairs(.0))]
    UnmatchedPairs(Vec<PendingPair>),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A graph snapshot could not be written or read.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A request function still waiting for its response identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPair {
    /// Name of the request function.
    pub function: String,
    /// The response identifier it expects.
    pub id: u16,
}

impl fmt::Display for PendingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} missing id {}", self.function, self.id)
    }
}

fn format_pairs(pairs: &[PendingPair]) -> String {
    let mut out = String::new();
    for pair in pairs {
        out.push('\n');
        out.push_str(&pair.to_string());
    }
    out
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Source file name.
    pub source: Option<String>,
    /// Line number in source (1-based).
    pub line: Option<u32>,
    /// Column number in source (1-based).
    pub column: Option<u32>,
    /// Enclosing declarations, innermost last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source file.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line only.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds an enclosing declaration frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            match (self.line, self.column) {
                (Some(line), Some(col)) => write!(f, ":{line}:{col}")?,
                (Some(line), None) => write!(f, ":{line}")?,
                _ => {}
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_specifier_message() {
        let err = Error::unknown_specifier("struct", "Blorp");
        assert_eq!(err.to_string(), "Unknown struct specifier 'Blorp'");
    }

    #[test]
    fn located_does_not_override_existing_source() {
        let err = Error::syntax("boom")
            .located("A.h", 3)
            .located("B.h", 9);
        let ctx = err.context.unwrap();
        assert_eq!(ctx.source.as_deref(), Some("A.h"));
        assert_eq!(ctx.line, Some(3));
    }

    #[test]
    fn located_fills_source_on_bare_position() {
        let err = Error::syntax("boom")
            .with_context(ErrorContext::new().with_position(12, 4))
            .located("A.h", 1);
        assert_eq!(err.line(), Some(12));
        assert_eq!(err.report(), "A.h(12): Error: boom");
    }

    #[test]
    fn unmatched_pairs_lists_every_entry() {
        let err = Error::unmatched_pairs(vec![
            PendingPair {
                function: "ServerRequestA".into(),
                id: 7,
            },
            PendingPair {
                function: "ServerRequestB".into(),
                id: 9,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("Request functions missing response pairs:"));
        assert!(msg.contains("ServerRequestA missing id 7"));
        assert!(msg.contains("ServerRequestB missing id 9"));
    }

    #[test]
    fn context_display() {
        let ctx = ErrorContext::new()
            .with_source("Foo.h")
            .with_position(10, 5)
            .with_frame("struct FFoo");
        let text = ctx.to_string();
        assert!(text.starts_with("at Foo.h:10:5"));
        assert!(text.contains("in struct FFoo"));
    }
}
