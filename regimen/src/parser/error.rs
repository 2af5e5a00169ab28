use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unbalanced brackets, a misplaced count, a missing name.
    Syntax,
    /// A definition reuses a registered name.
    DuplicateName,
    /// Not an error: the line was accepted but something looks off.
    Warning,
}

/// A problem found while parsing one line, with its source location.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Self::new(ParseErrorKind::Syntax, Severity::Error, message, span, file_id)
    }

    pub fn duplicate(name: &str, span: Range<usize>, file_id: usize) -> Self {
        Self::new(
            ParseErrorKind::DuplicateName,
            Severity::Error,
            format!("'{}' is already defined", name),
            span,
            file_id,
        )
    }

    pub fn warning(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        Self::new(ParseErrorKind::Warning, Severity::Warning, message, span, file_id)
    }

    fn new(
        kind: ParseErrorKind,
        severity: Severity,
        message: impl Into<String>,
        span: Range<usize>,
        file_id: usize,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            span,
            file_id,
            severity,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.kind == ParseErrorKind::Warning
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}
