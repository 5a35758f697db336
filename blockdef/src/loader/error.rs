use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Composition file errors with source location information.
#[derive(Debug, Clone)]
pub struct LoadError {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl LoadError {
    pub fn error(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        LoadError {
            message: message.into(),
            span,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Wrap a TOML syntax or schema error. `toml` reports spans for most of them.
    pub fn from_toml(err: &toml::de::Error, file_id: usize) -> Self {
        LoadError::error(err.message().trim(), err.span().unwrap_or(0..0), file_id)
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}
