use std::fmt;

use blockdef::NodeId;
use codespan_reporting::diagnostic::{Diagnostic, Severity};

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The workspace has no `block_creator`.
    NoRoot,
    /// More than one `block_creator`; the first one is used.
    MultipleRoots(usize),
    /// The block ends up with nothing to place in its message.
    NoLiveFields,
    /// A node lacks a slot its kind always has. Treated as an empty slot.
    MissingRequiredSlot { node: NodeId, slot: String },
    /// A field holds something unusable. The kind's default is used instead.
    InvalidFieldValue {
        node: NodeId,
        field: String,
        value: String,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::NoRoot => write!(f, "no block_creator in the workspace"),
            GenerationError::MultipleRoots(count) => write!(
                f,
                "{} block_creator nodes in the workspace; only the first is generated",
                count
            ),
            GenerationError::NoLiveFields => {
                write!(f, "the block has no fields or inputs")
            }
            GenerationError::MissingRequiredSlot { node, slot } => {
                write!(f, "node {} has no {} slot", node, slot)
            }
            GenerationError::InvalidFieldValue { node, field, value } => {
                write!(f, "invalid value {:?} for {} on node {}", value, field, node)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// A generation error or warning, tied to the node it concerns when known.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationDiagnostic {
    pub error: GenerationError,
    pub node: Option<NodeId>,
    pub is_warning: bool,
}

impl GenerationDiagnostic {
    pub fn warning(error: GenerationError, node: Option<NodeId>) -> Self {
        GenerationDiagnostic {
            error,
            node,
            is_warning: true,
        }
    }

    /// Convert to a codespan-reporting Diagnostic. Compositions carry no source
    /// spans, so the node id goes into a note instead of a label.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let severity = if self.is_warning {
            Severity::Warning
        } else {
            Severity::Error
        };
        let notes = self
            .node
            .map(|node| vec![format!("at node {}", node)])
            .unwrap_or_default();
        Diagnostic::new(severity)
            .with_message(self.error.to_string())
            .with_notes(notes)
    }
}

impl From<GenerationError> for GenerationDiagnostic {
    fn from(error: GenerationError) -> Self {
        GenerationDiagnostic {
            error,
            node: None,
            is_warning: false,
        }
    }
}

impl fmt::Display for GenerationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for GenerationDiagnostic {}
