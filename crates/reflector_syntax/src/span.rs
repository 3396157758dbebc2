//! Source location tracking.

/// A span of header text.
///
/// Byte offsets index the source; line and column are for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Creates an empty span at a position.
    #[must_use]
    pub const fn point(offset: usize, line: u32, column: u32) -> Self {
        Self::new(offset, offset, line, column)
    }

    /// Creates a span covering the range from this span to another.
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }

    /// Returns the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text this span covers in the given source, or `""` if the
    /// span lies outside it.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to() {
        let a = Span::new(0, 5, 1, 1);
        let b = Span::new(6, 10, 1, 7);
        let combined = a.to(b);
        assert_eq!(combined.start, 0);
        assert_eq!(combined.end, 10);
        assert_eq!(combined.column, 1);
    }

    #[test]
    fn span_text() {
        let source = "USTRUCT()";
        assert_eq!(Span::new(0, 7, 1, 1).text(source), "USTRUCT");
        assert_eq!(Span::new(4, 40, 1, 5).text(source), "");
    }

    #[test]
    fn point_is_empty() {
        let span = Span::point(3, 1, 4);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }
}
