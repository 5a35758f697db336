use std::collections::HashSet;

use blockdef::{CompositionTree, NodeId, NodeKind};

/// Whether `node` is surrounded, at any depth, by a `block_creator`.
/// Nodes that are not emit nothing from either generator.
pub fn is_live(tree: &dyn CompositionTree, node: NodeId) -> bool {
    let mut seen = HashSet::from([node]);
    let mut current = tree.surrounding_parent(node);
    while let Some(parent) = current {
        if tree.kind(parent) == Some(NodeKind::BlockCreator) {
            return true;
        }
        // A parent loop can only come from a broken host tree.
        if !seen.insert(parent) {
            return false;
        }
        current = tree.surrounding_parent(parent);
    }
    false
}
