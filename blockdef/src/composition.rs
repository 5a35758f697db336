use std::collections::BTreeMap;
use std::fmt;

use crate::node::{FieldValue, Mutation, NodeId, NodeKind, slot};
use crate::tree::CompositionTree;

/// A named child slot. Statement slots hold the head of a chain,
/// value slots hold a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub target: Option<NodeId>,
}

/// A node of the composition arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub fields: BTreeMap<String, FieldValue>,
    pub mutation: Option<Mutation>,
    pub slots: Vec<Slot>,
    /// Owner of the slot this node (or the head of its chain) sits in.
    pub parent: Option<NodeId>,
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl Node {
    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompositionError {
    UnknownNode(NodeId),
    UnknownSlot { node: NodeId, kind: NodeKind, slot: String },
    AlreadyAttached(NodeId),
    Cycle { parent: NodeId, child: NodeId },
    Misplaced { child: NodeId, kind: NodeKind, slot: String },
    SlotFull { node: NodeId, slot: String },
}

impl fmt::Display for CompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionError::UnknownNode(id) => write!(f, "unknown node {}", id),
            CompositionError::UnknownSlot { node, kind, slot } => {
                write!(f, "{} node {} has no slot named {}", kind, node, slot)
            }
            CompositionError::AlreadyAttached(id) => {
                write!(f, "node {} is already attached", id)
            }
            CompositionError::Cycle { parent, child } => {
                write!(f, "attaching {} under {} would create a cycle", child, parent)
            }
            CompositionError::Misplaced { kind, slot: name, .. } if *kind == NodeKind::BlockCreator => {
                write!(f, "block_creator cannot be nested in `{}`", name)
            }
            CompositionError::Misplaced { kind, slot: name, .. } => {
                write!(f, "`{}` holds {}, not {}", name, slot::contents(name), kind)
            }
            CompositionError::SlotFull { node, slot } => {
                write!(f, "`{}` of node {} holds a single node", slot, node)
            }
        }
    }
}

impl std::error::Error for CompositionError {}

/// Arena holding every node of a workspace.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    nodes: Vec<Node>,
}

impl Composition {
    pub fn new() -> Self {
        Composition { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, CompositionError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(CompositionError::UnknownNode(id))
    }

    /// Add a free-standing node carrying its kind's default fields and slots.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let fields = kind
            .default_fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let slots = kind
            .slot_names()
            .iter()
            .map(|name| Slot {
                name: name.to_string(),
                target: None,
            })
            .collect();
        self.nodes.push(Node {
            id,
            kind,
            fields,
            mutation: None,
            slots,
            parent: None,
            previous: None,
            next: None,
        });
        id
    }

    pub fn set_field(
        &mut self,
        id: NodeId,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), CompositionError> {
        self.node_mut(id)?.fields.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Set a node's mutation. A type group grows `TYPEn` slots to match its count.
    pub fn set_mutation(&mut self, id: NodeId, mutation: Mutation) -> Result<(), CompositionError> {
        let node = self.node_mut(id)?;
        if let Mutation::TypeGroup { count } = mutation {
            for i in 0..count {
                let name = slot::type_n(i);
                if node.slot(&name).is_none() {
                    node.slots.push(Slot { name, target: None });
                }
            }
        }
        node.mutation = Some(mutation);
        Ok(())
    }

    /// Attach `child` (and anything chained after it) at the end of the chain in
    /// `parent`'s slot.
    pub fn attach(&mut self, parent: NodeId, slot_name: &str, child: NodeId) -> Result<(), CompositionError> {
        let parent_node = self.node(parent).ok_or(CompositionError::UnknownNode(parent))?;
        let slot = parent_node
            .slot(slot_name)
            .ok_or_else(|| CompositionError::UnknownSlot {
                node: parent,
                kind: parent_node.kind,
                slot: slot_name.to_string(),
            })?;
        let head = slot.target;

        let child_node = self.node(child).ok_or(CompositionError::UnknownNode(child))?;
        if child_node.parent.is_some() || child_node.previous.is_some() {
            return Err(CompositionError::AlreadyAttached(child));
        }
        if child == parent || self.is_within(parent, child) {
            return Err(CompositionError::Cycle { parent, child });
        }

        let mut current = Some(child);
        while let Some(id) = current {
            let node = self.node(id).ok_or(CompositionError::UnknownNode(id))?;
            if !node.kind.fits(slot_name) {
                return Err(CompositionError::Misplaced {
                    child: id,
                    kind: node.kind,
                    slot: slot_name.to_string(),
                });
            }
            current = node.next;
        }
        let chained = self.node(child).is_some_and(|n| n.next.is_some());
        if slot::is_type_slot(slot_name) && (head.is_some() || chained) {
            return Err(CompositionError::SlotFull {
                node: parent,
                slot: slot_name.to_string(),
            });
        }

        match head {
            None => {
                let node = self.node_mut(parent)?;
                if let Some(slot) = node.slots.iter_mut().find(|s| s.name == slot_name) {
                    slot.target = Some(child);
                }
            }
            Some(head) => {
                let tail = self.chain_tail(head);
                self.node_mut(tail)?.next = Some(child);
                self.node_mut(child)?.previous = Some(tail);
            }
        }

        let mut current = Some(child);
        while let Some(id) = current {
            let node = self.node_mut(id)?;
            node.parent = Some(parent);
            current = node.next;
        }
        Ok(())
    }

    fn chain_tail(&self, head: NodeId) -> NodeId {
        let mut tail = head;
        while let Some(next) = self.nodes.get(tail.0).and_then(|n| n.next) {
            tail = next;
        }
        tail
    }

    /// Whether `node` sits somewhere inside `ancestor`'s subtree.
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.surrounding_parent(node);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor || steps > self.nodes.len() {
                return true;
            }
            steps += 1;
            current = self.surrounding_parent(id);
        }
        false
    }
}

impl CompositionTree for Composition {
    fn top_blocks(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none() && n.previous.is_none())
            .map(|n| n.id)
            .collect()
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.node(node).map(|n| n.kind)
    }

    fn field(&self, node: NodeId, key: &str) -> Option<&FieldValue> {
        self.node(node).and_then(|n| n.fields.get(key))
    }

    fn mutation(&self, node: NodeId) -> Option<&Mutation> {
        self.node(node).and_then(|n| n.mutation.as_ref())
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(n) = self.node(node) else {
            return Vec::new();
        };
        n.slots
            .iter()
            .filter_map(|s| s.target)
            .chain(n.next)
            .collect()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.next)
    }

    fn surrounding_parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn has_slot(&self, node: NodeId, slot: &str) -> bool {
        self.node(node).is_some_and(|n| n.slot(slot).is_some())
    }

    fn slot_target(&self, node: NodeId, slot: &str) -> Option<NodeId> {
        self.node(node).and_then(|n| n.slot(slot)).and_then(|s| s.target)
    }
}
