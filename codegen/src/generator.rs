use blockdef::{CompositionTree, NodeId, NodeKind};

use crate::error::{GenerationDiagnostic, GenerationError};
use crate::gate::is_live;

/// State shared by one generation pass: the tree being read and the warnings
/// collected along the way.
pub struct Context<'t> {
    pub tree: &'t dyn CompositionTree,
    diagnostics: Vec<GenerationDiagnostic>,
}

impl<'t> Context<'t> {
    pub fn new(tree: &'t dyn CompositionTree) -> Self {
        Context {
            tree,
            diagnostics: Vec::new(),
        }
    }

    /// Record a warning once; the same problem seen twice is reported once.
    pub fn warn(&mut self, error: GenerationError, node: Option<NodeId>) {
        tracing::debug!(%error, "generation warning");
        if !self.diagnostics.iter().any(|d| d.error == error) {
            self.diagnostics
                .push(GenerationDiagnostic::warning(error, node));
        }
    }

    pub fn into_diagnostics(self) -> Vec<GenerationDiagnostic> {
        self.diagnostics
    }

    /// Field value as text, empty when the field is missing.
    pub fn text(&self, node: NodeId, key: &str) -> String {
        self.tree
            .field(node, key)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Field value as a number. Missing fields fall back to the kind's default
    /// silently, unusable ones with a warning.
    pub fn number(&mut self, node: NodeId, key: &str) -> f64 {
        let fallback = self
            .default_for(node, key)
            .and_then(|v| v.as_number())
            .unwrap_or(0.0);
        let tree = self.tree;
        match tree.field(node, key) {
            None => fallback,
            Some(value) => match value.as_number() {
                Some(n) => n,
                None => {
                    let value = value.to_string();
                    self.invalid(node, key, value);
                    fallback
                }
            },
        }
    }

    /// Field value as a boolean, with the same fallback rules as [`Context::number`].
    pub fn boolean(&mut self, node: NodeId, key: &str) -> bool {
        let fallback = self
            .default_for(node, key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let tree = self.tree;
        match tree.field(node, key) {
            None => fallback,
            Some(value) => match value.as_bool() {
                Some(b) => b,
                None => {
                    let value = value.to_string();
                    self.invalid(node, key, value);
                    fallback
                }
            },
        }
    }

    fn default_for(&self, node: NodeId, key: &str) -> Option<blockdef::FieldValue> {
        self.tree.kind(node)?.default_field(key)
    }

    fn invalid(&mut self, node: NodeId, key: &str, value: String) {
        self.warn(
            GenerationError::InvalidFieldValue {
                node,
                field: key.to_string(),
                value,
            },
            Some(node),
        );
    }
}

/// The tree walk both generators share. Implementors supply the per-kind
/// producers and how a fragment joins its following siblings.
pub trait CodeGenerator<'t> {
    fn tree(&self) -> &'t dyn CompositionTree;

    /// Produce the code for one node. `None` means the node contributes nothing
    /// and its siblings are not visited either.
    fn node_to_code(&mut self, node: NodeId, kind: NodeKind) -> Option<String>;

    /// Join `code` with the code of `next` and everything after it.
    fn scrub(&mut self, code: String, next: NodeId) -> String;

    /// Code for `node`, and for its following siblings unless `this_only`.
    /// Nodes outside the root's reach produce nothing.
    fn block_to_code(&mut self, node: NodeId, this_only: bool) -> String {
        let tree = self.tree();
        let Some(kind) = tree.kind(node) else {
            return String::new();
        };
        if kind != NodeKind::BlockCreator && !is_live(tree, node) {
            return String::new();
        }
        let Some(code) = self.node_to_code(node, kind) else {
            return String::new();
        };
        match tree.next_sibling(node) {
            Some(next) if !this_only => self.scrub(code, next),
            _ => code,
        }
    }

    /// Code for the whole chain held in `node`'s slot.
    fn statement_to_code(&mut self, node: NodeId, slot: &str) -> String {
        match self.tree().slot_target(node, slot) {
            Some(head) => self.block_to_code(head, false),
            None => String::new(),
        }
    }
}

/// Chain items hung in a slot, head first.
pub fn chain(tree: &dyn CompositionTree, node: NodeId, slot: &str) -> Vec<NodeId> {
    let mut items = Vec::new();
    let mut current = tree.slot_target(node, slot);
    while let Some(id) = current {
        // Guard against a host tree whose sibling links loop.
        if items.contains(&id) {
            break;
        }
        items.push(id);
        current = tree.next_sibling(id);
    }
    items
}
