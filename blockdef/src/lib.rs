pub mod composition;
pub mod loader;
pub mod node;
pub mod tree;

pub use composition::{Composition, CompositionError, Node, Slot};
pub use node::{FieldValue, Mutation, NodeId, NodeKind, OptionKind};
pub use tree::CompositionTree;
