//! Diagnostic reporting for the vouch analyzer
//!
//! Structured findings with stable error codes, source spans, and both
//! human-readable and machine-readable (JSON) renderings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error_codes;
pub use error_codes::*;

/// A source region: a half-open byte range anchored at the line and
/// column where it starts.
///
/// No Vo token crosses a line break (line breaks terminate statements),
/// so a span's end is only ever needed as a width; spans carry a single
/// line/column anchor instead of a start/end pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Source file path
    pub file: PathBuf,

    /// Start byte offset (0-indexed)
    pub start: usize,

    /// End byte offset (0-indexed, exclusive)
    pub end: usize,

    /// Line the region starts on (1-indexed)
    pub line: usize,

    /// Column the region starts at (1-indexed)
    pub col: usize,
}

impl Span {
    /// Create a span anchored at the start of a file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: path.into(),
            start: 0,
            end: 0,
            line: 1,
            col: 1,
        }
    }

    /// The region reaching from this span through `other`. The earlier
    /// anchor wins, so `a.to(b)` and `b.to(a)` describe the same region.
    pub fn to(&self, other: &Span) -> Span {
        let anchor = if self.start <= other.start { self } else { other };
        Span {
            file: anchor.file.clone(),
            start: anchor.start,
            end: self.end.max(other.end),
            line: anchor.line,
            col: anchor.col,
        }
    }

    /// Width of the region in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the region is empty
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// An additional note attached to a diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Note message
    pub message: String,

    /// Optional span for the note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Note {
    /// Create a new note with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    /// Attach a span to this note
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// An analyzer diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable error code (e.g., "V3001")
    pub code: String,

    /// Severity level
    pub severity: Severity,

    /// Primary message
    pub message: String,

    /// Primary source span
    pub span: Span,

    /// Additional notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder {
            code: code.into(),
            severity: Severity::Error,
            message: String::new(),
            span: None,
            notes: Vec::new(),
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder {
            code: code.into(),
            severity: Severity::Warning,
            message: String::new(),
            span: None,
            notes: Vec::new(),
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Format as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format as human-readable string
    pub fn to_human_readable(&self, source: &str) -> String {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        let mut output = format!(
            "{}[{}]: {}\n  --> {}:{}:{}\n",
            severity,
            self.code,
            self.message,
            self.span.file.display(),
            self.span.line,
            self.span.col
        );

        if let Some(line) = source.lines().nth(self.span.line.saturating_sub(1)) {
            output.push_str(&format!("   |\n{:>3} | {}\n   |", self.span.line, line));

            // The underline runs for the span's width, capped to the
            // anchor line (spans reaching further only start here).
            let underline_start = self.span.col.saturating_sub(1).min(line.len());
            let available = line.len().saturating_sub(underline_start).max(1);
            let underline_len = self.span.len().clamp(1, available);

            output.push_str(&format!(
                " {}{}\n",
                " ".repeat(underline_start),
                "^".repeat(underline_len)
            ));
        }

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note.message));
        }

        output
    }
}

/// Builder for constructing diagnostics
pub struct DiagnosticBuilder {
    code: String,
    severity: Severity,
    message: String,
    span: Option<Span>,
    notes: Vec<Note>,
}

impl DiagnosticBuilder {
    /// Set the message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the primary span
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add a note
    pub fn note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            code: self.code,
            severity: self.severity,
            message: self.message,
            span: self.span.unwrap_or_else(|| Span::file("")),
            notes: self.notes,
        }
    }
}

/// A collection of diagnostics
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Create a new empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Count errors
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Count warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
            .count()
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take all diagnostics
    pub fn take(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Merge another bag into this one
    pub fn merge(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by source position so emission order is stable
    /// across runs regardless of internal iteration order.
    pub fn sort_by_position(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            (&a.span.file, a.span.start, &a.code, &a.message).cmp(&(
                &b.span.file,
                b.span.start,
                &b.code,
                &b.message,
            ))
        });
    }

    /// Get the number of diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the bag is empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Format all diagnostics as JSON
    pub fn to_json(&self) -> String {
        let json_array: Vec<String> = self.diagnostics.iter().map(|d| d.to_json()).collect();
        format!("[{}]", json_array.join(","))
    }
}

impl From<Diagnostic> for DiagnosticBag {
    fn from(diagnostic: Diagnostic) -> Self {
        let mut bag = DiagnosticBag::new();
        bag.push(diagnostic);
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_json() {
        let diag = Diagnostic::error("V3001")
            .message("expression does not define an error code")
            .span(Span::file("demo.vo"))
            .build();

        let json = diag.to_json();
        assert!(json.contains("V3001"));
        assert!(json.contains("does not define"));
    }

    #[test]
    fn test_diagnostic_warning() {
        let diag = Diagnostic::warning("V1002")
            .message("function \"Foo\" is exported, but does not declare any error codes")
            .build();
        assert!(!diag.is_error());
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn test_bag_counts() {
        let mut bag = DiagnosticBag::new();
        assert!(bag.is_empty());

        bag.push(Diagnostic::error("V1003").message("mismatch").build());
        bag.push(Diagnostic::warning("V1002").message("undeclared").build());

        assert_eq!(bag.len(), 2);
        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.warning_count(), 1);
    }

    #[test]
    fn test_sort_by_position() {
        let mut a = Span::file("demo.vo");
        a.start = 40;
        let mut b = Span::file("demo.vo");
        b.start = 7;

        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::error("V3001").message("later").span(a).build());
        bag.push(Diagnostic::error("V3001").message("earlier").span(b).build());
        bag.sort_by_position();

        assert_eq!(bag.diagnostics()[0].message, "earlier");
        assert_eq!(bag.diagnostics()[1].message, "later");
    }

    #[test]
    fn test_diagnostic_note() {
        let diag = Diagnostic::error("V1003")
            .message("mismatch of declared and actual error codes")
            .note(Note::new("declared in the 'Errors:' block above"))
            .build();

        let json = diag.to_json();
        assert!(json.contains("declared in"));
    }

    #[test]
    fn test_span_to_keeps_earlier_anchor() {
        let mut a = Span::file("demo.vo");
        a.start = 10;
        a.end = 20;
        a.line = 2;
        a.col = 3;
        let mut b = Span::file("demo.vo");
        b.start = 15;
        b.end = 30;
        b.line = 2;
        b.col = 8;

        let covering = a.to(&b);
        assert_eq!(covering.start, 10);
        assert_eq!(covering.end, 30);
        assert_eq!(covering.col, 3);
        assert_eq!(covering.len(), 20);
        assert!(!covering.is_empty());
        assert!(Span::file("demo.vo").is_empty());

        // Order does not matter.
        assert_eq!(b.to(&a), covering);
    }
}
