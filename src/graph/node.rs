//! Reference graph node model.
//!
//! Despite the tree-shaped naming, the structure is a graph: nodes live in
//! an arena keyed by [`TreeHandle`] and a child that references an
//! already-visited identifier reuses the existing handle instead of deep
//! copying. Handle equality is exactly node identity.

use crate::linker::{Instance, LinkedRecords};
use crate::parser::heap_dump::{MemberField, StaticField};
use crate::parser::reader::Id;
use crate::parser::values::ValueHolder;
use std::collections::HashMap;

/// The field through which a node was reached: member, static, or an
/// array slot wrapping the field that reached the array. Provenance for
/// path-to-root reporting, not an ownership relation.
#[derive(Debug, Clone, PartialEq)]
pub enum RefField {
    /// Root attachment points have no dominating field.
    None,
    Member(MemberField),
    Static(StaticField),
    ArrayElement { field: Box<RefField>, index: usize },
}

/// Index of a subtree node in the graph arena. Copying a handle is how
/// "child reuses existing node" is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeHandle(pub(crate) usize);

/// One subtree: the identifier it stands for and its ordered children.
/// The instance behind the identifier resolves through the linked index;
/// the synthetic root carries the null identifier and resolves to nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct RefTree {
    pub id: Id,
    pub children: Vec<RefTreeNode>,
}

/// A child edge of a subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum RefTreeNode {
    /// A GC root attachment point (flat root, or a thread's frame root).
    GcRoot { tree: TreeHandle },
    /// A scalar leaf.
    Primitive { field: RefField, value: ValueHolder },
    /// A primitive-array leaf; the payload stays in the instance index and
    /// is not expanded further.
    PrimitiveArray { field: RefField, instance_id: Id },
    /// One slot of an object array. `None` for an empty slot.
    ObjectArrayElement {
        field: RefField,
        tree: Option<TreeHandle>,
    },
    /// A resolved (or, with `tree: None`, unresolvable) object or class
    /// reference.
    CommonObject {
        field: RefField,
        tree: Option<TreeHandle>,
    },
}

static NO_FIELD: RefField = RefField::None;

impl RefTreeNode {
    /// The dominating field of this edge.
    pub fn dominating_field(&self) -> &RefField {
        match self {
            RefTreeNode::GcRoot { .. } => &NO_FIELD,
            RefTreeNode::Primitive { field, .. } => field,
            RefTreeNode::PrimitiveArray { field, .. } => field,
            RefTreeNode::ObjectArrayElement { field, .. } => field,
            RefTreeNode::CommonObject { field, .. } => field,
        }
    }

    /// The subtree this edge points at, if any.
    pub fn tree(&self) -> Option<TreeHandle> {
        match self {
            RefTreeNode::GcRoot { tree } => Some(*tree),
            RefTreeNode::ObjectArrayElement { tree, .. } => *tree,
            RefTreeNode::CommonObject { tree, .. } => *tree,
            RefTreeNode::Primitive { .. } | RefTreeNode::PrimitiveArray { .. } => None,
        }
    }
}

/// The whole reference graph: an arena of subtrees, the synthetic root
/// whose children are the GC roots, and the identifier-to-handle map built
/// during traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct RefGraph {
    pub(crate) nodes: Vec<RefTree>,
    pub(crate) root: TreeHandle,
    pub(crate) by_id: HashMap<Id, TreeHandle>,
}

impl RefGraph {
    /// The synthetic root node. Its identifier is the null sentinel and
    /// its children are exactly the (non-Java-frame) GC roots.
    pub fn root(&self) -> &RefTree {
        &self.nodes[self.root.0]
    }

    pub fn root_handle(&self) -> TreeHandle {
        self.root
    }

    /// Resolve a handle to its subtree.
    pub fn node(&self, handle: TreeHandle) -> &RefTree {
        &self.nodes[handle.0]
    }

    /// The canonical subtree handle for an identifier, if the identifier
    /// was reached during traversal.
    pub fn lookup(&self, id: Id) -> Option<TreeHandle> {
        self.by_id.get(&id).copied()
    }

    /// Total number of subtree nodes, the synthetic root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve the instance a subtree stands for through the linked index.
    pub fn instance_of<'a>(
        &self,
        handle: TreeHandle,
        linked: &'a LinkedRecords,
    ) -> Option<&'a Instance> {
        linked.query_instance(self.node(handle).id)
    }
}
