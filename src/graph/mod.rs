//! GC-root reference graph: shared, cycle-safe, arena-backed.

pub mod builder;
pub mod node;

// Re-export main types
pub use builder::build_ref_graph;
pub use node::{RefField, RefGraph, RefTree, RefTreeNode, TreeHandle};
