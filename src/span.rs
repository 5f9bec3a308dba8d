//! Source code location tracking
//!
//! Spans record where tokens came from in the source text, and the
//! [`LineMap`] converts byte offsets into 1-based line numbers for
//! diagnostics.

use std::fmt;

/// A span representing a byte range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Start position (byte offset)
    pub start: usize,
    /// End position (byte offset, exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Get the source text for this span
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Maps byte offsets to 1-based source lines.
///
/// Built once per compilation from the raw source; every diagnostic that
/// carries a line number goes through this table.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset at which each line begins; `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
}

impl LineMap {
    /// Build the line table for the given source text
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(pos + 1);
            }
        }
        Self { line_starts }
    }

    /// The 1-based line on which the given byte offset falls.
    ///
    /// Offsets past the end of the source are attributed to the last line.
    pub fn line_at(&self, pos: usize) -> u32 {
        self.line_starts.partition_point(|&start| start <= pos) as u32
    }

    /// Number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_text() {
        let source = "int x = 5;";
        let span = Span::new(0, 3);
        assert_eq!(span.text(source), "int");
    }

    #[test]
    fn test_line_at_single_line() {
        let map = LineMap::new("int x = 5;");
        assert_eq!(map.line_at(0), 1);
        assert_eq!(map.line_at(9), 1);
    }

    #[test]
    fn test_line_at_multiple_lines() {
        let map = LineMap::new("int x;\nint y;\nint z;\n");
        assert_eq!(map.line_at(0), 1);
        assert_eq!(map.line_at(7), 2);
        assert_eq!(map.line_at(14), 3);
    }

    #[test]
    fn test_line_at_past_end() {
        let map = LineMap::new("int x;\nx = 1;");
        assert_eq!(map.line_at(100), 2);
    }

    #[test]
    fn test_line_count() {
        let map = LineMap::new("a\nb\nc");
        assert_eq!(map.line_count(), 3);
    }
}
