//! Reference graph construction.
//!
//! Breadth-first walk from the GC roots over the linked instance index.
//! An explicit work queue keeps arbitrarily deep object graphs off the call
//! stack; the visited map (identifier -> handle, filled before enqueueing)
//! is the sole dedup and cycle-breaking mechanism: an identifier is
//! expanded at most once, and every later occurrence reuses its handle.

use crate::linker::{Instance, LinkedRecords};
use crate::parser::reader::Id;
use crate::parser::values::ValueHolder;
use crate::utils::config::NULL_REFERENCE;
use log::debug;
use std::collections::{HashMap, VecDeque};

use super::node::{RefField, RefGraph, RefTree, RefTreeNode, TreeHandle};

struct GraphBuilder {
    nodes: Vec<RefTree>,
    visited: HashMap<Id, TreeHandle>,
    /// Pending expansions: the subtree to expand and the dominating field
    /// it was reached through (array slots wrap it per element).
    queue: VecDeque<(TreeHandle, RefField)>,
}

/// Build the reference graph for a linked snapshot.
///
/// The returned graph's root children are exactly the GC roots, except
/// Java-frame roots, which attach under their owning thread's node.
pub fn build_ref_graph(linked: &LinkedRecords) -> RefGraph {
    let mut builder = GraphBuilder {
        nodes: Vec::new(),
        visited: HashMap::new(),
        queue: VecDeque::new(),
    };
    let root = builder.alloc(NULL_REFERENCE);

    builder.seed_roots(root, linked);

    while let Some((handle, field)) = builder.queue.pop_front() {
        builder.expand(handle, field, linked);
    }

    debug!(
        "Built reference graph: {} nodes from {} GC roots",
        builder.nodes.len(),
        builder.nodes[root.0].children.len()
    );

    RefGraph {
        nodes: builder.nodes,
        root,
        by_id: builder.visited,
    }
}

impl GraphBuilder {
    fn alloc(&mut self, id: Id) -> TreeHandle {
        let handle = TreeHandle(self.nodes.len());
        self.nodes.push(RefTree {
            id,
            children: Vec::new(),
        });
        handle
    }

    /// Register an identifier, allocating its subtree on first sight.
    /// Returns the canonical handle and whether it is newly created.
    fn intern(&mut self, id: Id) -> (TreeHandle, bool) {
        if let Some(handle) = self.visited.get(&id) {
            return (*handle, false);
        }
        let handle = TreeHandle(self.nodes.len());
        self.nodes.push(RefTree {
            id,
            children: Vec::new(),
        });
        self.visited.insert(id, handle);
        (handle, true)
    }

    /// Attach every GC root with a resolvable instance under the synthetic
    /// root. Thread instances get their frame roots as children instead of
    /// generic member expansion; everything else is enqueued for expansion.
    fn seed_roots(&mut self, root: TreeHandle, linked: &LinkedRecords) {
        for (id, record) in &linked.gc_roots {
            if record.is_java_frame() {
                continue;
            }
            let Some(instance) = linked.query_instance(*id) else {
                continue;
            };
            if self.visited.contains_key(id) {
                // another root already claimed this identifier
                continue;
            }
            let (tree, _) = self.intern(*id);
            self.nodes[root.0].children.push(RefTreeNode::GcRoot { tree });

            let thread = match instance {
                Instance::Object(_) => linked.query_thread(*id),
                _ => None,
            };
            match thread {
                Some(thread) => {
                    for frame in &thread.frames {
                        let (frame_tree, fresh) = self.intern(frame.id);
                        self.nodes[tree.0]
                            .children
                            .push(RefTreeNode::GcRoot { tree: frame_tree });
                        if fresh {
                            self.queue.push_back((frame_tree, RefField::None));
                        }
                    }
                }
                None => self.queue.push_back((tree, RefField::None)),
            }
        }
    }

    /// Expand one dequeued subtree according to its instance kind.
    fn expand(&mut self, handle: TreeHandle, via_field: RefField, linked: &LinkedRecords) {
        let id = self.nodes[handle.0].id;
        let Some(instance) = linked.query_instance(id) else {
            return;
        };
        match instance {
            Instance::ObjectArray(array) => {
                self.expand_array_elements(handle, &via_field, &array.elements);
            }
            Instance::Class(class) => {
                for field in &class.static_fields {
                    self.attach_field_value(
                        handle,
                        RefField::Static(field.clone()),
                        &field.value,
                        linked,
                    );
                }
            }
            Instance::Object(object) => {
                if linked.is_thread_instance(id) {
                    // thread members are represented by frame roots only
                    return;
                }
                for field in &object.fields {
                    self.attach_field_value(
                        handle,
                        RefField::Member(field.field.clone()),
                        &field.value,
                        linked,
                    );
                }
            }
            Instance::PrimitiveArray(_) => {}
        }
    }

    /// Emit one ObjectArrayElement child per slot, each wrapping the
    /// parent's dominating field with the slot index.
    fn expand_array_elements(
        &mut self,
        parent: TreeHandle,
        base_field: &RefField,
        elements: &[Option<Id>],
    ) {
        for (index, element) in elements.iter().enumerate() {
            let field = RefField::ArrayElement {
                field: Box::new(base_field.clone()),
                index,
            };
            let node = match element {
                None => RefTreeNode::ObjectArrayElement { field, tree: None },
                Some(element_id) => {
                    let (tree, fresh) = self.intern(*element_id);
                    if fresh {
                        self.queue.push_back((tree, field.clone()));
                    }
                    RefTreeNode::ObjectArrayElement {
                        field,
                        tree: Some(tree),
                    }
                }
            };
            self.nodes[parent.0].children.push(node);
        }
    }

    /// Classify one field value into a child edge of `parent`.
    fn attach_field_value(
        &mut self,
        parent: TreeHandle,
        field: RefField,
        value: &ValueHolder,
        linked: &LinkedRecords,
    ) {
        if !matches!(value, ValueHolder::Reference { .. }) {
            self.nodes[parent.0].children.push(RefTreeNode::Primitive {
                field,
                value: value.clone(),
            });
            return;
        }

        let target = value
            .reference_id()
            .and_then(|id| linked.query_instance(id));
        let node = match target {
            None => RefTreeNode::CommonObject { field, tree: None },
            Some(Instance::PrimitiveArray(array)) => RefTreeNode::PrimitiveArray {
                field,
                instance_id: array.id,
            },
            Some(Instance::ObjectArray(array)) => {
                // an array reached through a field is inlined: its slots
                // become children of the referrer, wrapping this field
                self.expand_array_elements(parent, &field, &array.elements);
                return;
            }
            Some(Instance::Object(object)) => {
                let (tree, fresh) = self.intern(object.id);
                if fresh {
                    self.queue.push_back((tree, field.clone()));
                }
                RefTreeNode::CommonObject {
                    field,
                    tree: Some(tree),
                }
            }
            Some(Instance::Class(class)) => {
                let (tree, fresh) = self.intern(class.id);
                if fresh {
                    self.queue.push_back((tree, field.clone()));
                }
                RefTreeNode::CommonObject {
                    field,
                    tree: Some(tree),
                }
            }
        };
        self.nodes[parent.0].children.push(node);
    }
}
