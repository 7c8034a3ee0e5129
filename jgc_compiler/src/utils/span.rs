//! Source location tracking for the console front end
//!
//! Tokens, parse-tree nodes and diagnostics all carry spans so that an error
//! can point at the exact lexeme it came from. The script scanner keeps
//! whitespace tokens alive, so offsets are exact down to the character.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance past one character, tracking line breaks
    pub fn advance(self, ch: char) -> Self {
        let mut next = self;
        next.offset += ch.len_utf8();
        if ch == '\n' {
            next.line += 1;
            next.column = 1;
        } else {
            next.column += 1;
        }
        next
    }

    /// Advance past a whole lexeme
    pub fn advance_str(self, s: &str) -> Self {
        let mut pos = self;
        for ch in s.chars() {
            pos = pos.advance(ch);
        }
        pos
    }

    /// Translate a position measured inside an excerpt onto the enclosing
    /// source, given the excerpt's starting position. Statement text is
    /// re-scanned in isolation, so its positions come back excerpt-local.
    pub fn rebased(self, base: Position) -> Self {
        if self.line <= 1 {
            Self {
                offset: base.offset + self.offset,
                line: base.line,
                column: base.column + self.column.saturating_sub(1),
            }
        } else {
            Self {
                offset: base.offset + self.offset,
                line: base.line + self.line - 1,
                column: self.column,
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "span start is after its end");
        Self { start, end }
    }

    /// Span from byte offsets only (useful for testing)
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self {
            start: Position::new(start, 0, 0),
            end: Position::new(end, 0, 0),
        }
    }

    /// Merge two spans into one covering both; diagnostics use this to
    /// anchor at the model token and the offending token together
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: std::cmp::min_by_key(self.start, other.start, |p| p.offset),
            end: std::cmp::max_by_key(self.end, other.end, |p| p.offset),
        }
    }

    /// Byte length of the span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// The source text the span covers
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset..self.end.offset]
    }

    /// An unknown/dummy span for synthesized nodes
    pub fn dummy() -> Self {
        Self::new(Position::start(), Position::start())
    }

    /// Translate an excerpt-local span onto the enclosing source.
    pub fn rebased(self, base: Position) -> Self {
        Self {
            start: self.start.rebased(base),
            end: self.end.rebased(base),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value carrying its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Tracks line starts of a compile unit for position lookup and
/// cargo-style error excerpts
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// The original source text
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(at, _)| at + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Line and column for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let column = self.source[self.line_starts[line]..offset].chars().count();
        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// A line of text by 1-based line number
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next_start) => next_start - 1,
            None => self.source.len(),
        };
        let line = &self.source[start..end];
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// The text covered by a span
    pub fn span_text(&self, span: &Span) -> &str {
        span.slice(&self.source)
    }

    /// Render a diagnostic with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Error: {}", message);
        let _ = writeln!(out, "  --> {}:{}", span.start.line, span.start.column);

        if let Some(line) = self.get_line(span.start.line) {
            let gutter = span.start.line.to_string();
            let blank = " ".repeat(gutter.len());
            let _ = writeln!(out, "   {} |", blank);
            let _ = writeln!(out, "{} | {}", gutter, line);

            let caret_at = (span.start.column as usize).saturating_sub(1);
            let caret_len = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                line.len().saturating_sub(caret_at)
            };
            let _ = writeln!(
                out,
                "   {} | {}{}",
                blank,
                " ".repeat(caret_at),
                "^".repeat(caret_len.max(1))
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_advances_through_newlines() {
        let pos = Position::start().advance_str("ab\nc");
        assert_eq!(pos.offset, 4);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn span_merge_covers_both_anchors() {
        let model = Span::from_offsets(4, 8);
        let offender = Span::from_offsets(12, 13);
        let merged = model.merge(offender);
        assert_eq!(merged.start.offset, 4);
        assert_eq!(merged.end.offset, 13);
    }

    #[test]
    fn rebasing_translates_excerpt_positions() {
        // Excerpt starts at line 3 column 5, offset 20 of the file.
        let base = Position::new(20, 3, 5);

        let same_line = Position::new(4, 1, 5).rebased(base);
        assert_eq!(same_line.offset, 24);
        assert_eq!(same_line.line, 3);
        assert_eq!(same_line.column, 9);

        let later_line = Position::new(10, 2, 3).rebased(base);
        assert_eq!(later_line.offset, 30);
        assert_eq!(later_line.line, 4);
        assert_eq!(later_line.column, 3);
    }

    #[test]
    fn source_map_positions_and_lines() {
        let map = SourceMap::new("x = h_ab\ny = other\n".to_string());
        let pos = map.position_at(10);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(map.get_line(1), Some("x = h_ab"));
        assert_eq!(map.get_line(2), Some("y = other"));
        assert_eq!(map.get_line(99), None);
    }

    #[test]
    fn crlf_lines_drop_the_carriage_return() {
        let map = SourceMap::new("h.flow\r\nh.pitfiller\r\n".to_string());
        assert_eq!(map.get_line(1), Some("h.flow"));
        assert_eq!(map.get_line(2), Some("h.pitfiller"));
    }

    #[test]
    fn format_error_underlines_span() {
        let map = SourceMap::new("x = h_ab 5\n".to_string());
        let span = Span::new(Position::new(9, 1, 10), Position::new(10, 1, 11));
        let rendered = map.format_error(&span, "no default key declared");
        assert!(rendered.contains("--> 1:10"));
        assert!(rendered.contains("x = h_ab 5"));
        assert!(rendered.contains('^'));
    }
}
