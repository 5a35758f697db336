use crate::node::{FieldValue, Mutation, NodeId, NodeKind};

/// Read-only view of a composition, as the generators query it.
///
/// The editor owning the tree implements this; [`crate::Composition`] is the
/// in-memory implementation used for files and tests.
pub trait CompositionTree {
    /// Nodes not attached to anything, in workspace order.
    fn top_blocks(&self) -> Vec<NodeId>;

    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    fn field(&self, node: NodeId, key: &str) -> Option<&FieldValue>;

    fn mutation(&self, node: NodeId) -> Option<&Mutation>;

    /// Direct children: the head of every occupied slot in slot order,
    /// followed by the next sibling if there is one.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// The node whose slot (directly or through a sibling chain) holds `node`.
    fn surrounding_parent(&self, node: NodeId) -> Option<NodeId>;

    /// Whether the node declares a slot of this name, occupied or not.
    fn has_slot(&self, node: NodeId, slot: &str) -> bool;

    /// Head of the chain attached to a slot.
    fn slot_target(&self, node: NodeId, slot: &str) -> Option<NodeId>;

    /// Number of nodes in the subtree rooted at `node`, counting `node` itself
    /// and everything chained after it.
    fn descendant_count(&self, node: NodeId) -> usize {
        1 + self
            .children(node)
            .into_iter()
            .map(|child| self.descendant_count(child))
            .sum::<usize>()
    }

    /// Pre-order walk of the subtree rooted at `node`.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        for child in self.children(node) {
            out.extend(self.descendants(child));
        }
        out
    }
}
