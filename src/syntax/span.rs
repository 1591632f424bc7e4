//! Mapping byte offsets in a source file to lines and columns
//!
//! Line positions are part of the token stream's contract, not just of
//! diagnostics rendering: the lexer terminates statements at line breaks
//! and attaches doc comments by line adjacency, so it asks this table
//! where offsets fall.

use crate::diagnostics::Span;
use std::path::PathBuf;

/// A source file and the positions of its line breaks
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
    /// Byte offsets of every `'\n'`. A `"\r\n"` sequence breaks at the
    /// `'\n'` like a bare one; the `'\r'` is lexer-skipped whitespace.
    newlines: Vec<usize>,
}

impl SourceFile {
    /// Create a new source file
    pub fn new(path: PathBuf, content: String) -> Self {
        let newlines = content
            .bytes()
            .enumerate()
            .filter_map(|(offset, byte)| (byte == b'\n').then_some(offset))
            .collect();

        Self {
            path,
            content,
            newlines,
        }
    }

    /// Get the file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Create a span for a byte range, anchored at its start position
    pub fn span(&self, start: usize, end: usize) -> Span {
        let line = self.line_of(start);
        let line_start = match line.checked_sub(2) {
            Some(previous_break) => self.newlines[previous_break] + 1,
            None => 0,
        };

        Span {
            file: self.path.clone(),
            start,
            end,
            line,
            col: start - line_start + 1,
        }
    }

    /// The 1-indexed line containing the given byte offset. A line's
    /// terminating `'\n'` counts as part of the line it ends.
    pub fn line_of(&self, offset: usize) -> usize {
        let breaks_before = match self.newlines.binary_search(&offset) {
            Ok(index) | Err(index) => index,
        };
        breaks_before + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let source = SourceFile::new(
            PathBuf::from("demo.vo"),
            "package demo\n\nfunc F() {}\n".to_string(),
        );

        assert_eq!(source.line_of(0), 1);
        // The newline ending line 1 still belongs to line 1.
        assert_eq!(source.line_of(12), 1);
        assert_eq!(source.line_of(13), 2);
        assert_eq!(source.line_of(14), 3);
        // End of file, after the trailing newline.
        assert_eq!(source.line_of(source.content().len()), 4);
    }

    #[test]
    fn test_span_anchor() {
        let source = SourceFile::new(PathBuf::from("demo.vo"), "var x = 42".to_string());

        let span = source.span(4, 5);
        assert_eq!(span.line, 1);
        assert_eq!(span.col, 5);
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn test_span_on_later_line() {
        let source = SourceFile::new(
            PathBuf::from("demo.vo"),
            "package demo\nfunc F() {}\n".to_string(),
        );

        // `F` sits on line 2 at column 6.
        let span = source.span(18, 19);
        assert_eq!(span.line, 2);
        assert_eq!(span.col, 6);
    }

    #[test]
    fn test_crlf_breaks_at_the_newline() {
        let source = SourceFile::new(
            PathBuf::from("demo.vo"),
            "package demo\r\nfunc F() {}\r\n".to_string(),
        );

        // `func` starts right after the "\r\n".
        let span = source.span(14, 18);
        assert_eq!(span.line, 2);
        assert_eq!(span.col, 1);
    }
}
