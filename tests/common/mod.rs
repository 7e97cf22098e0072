//! Common test fixtures for the collector integration suites.

#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gc_pool::{FieldDescriptor, FieldKind, GcManager, GcObject, GcRef, TypeDescriptor};

/// Graph node with a scalar payload, one direct edge and an edge list.
pub struct Node {
    pub id: u32,
    pub next: Option<GcRef>,
    pub children: Vec<Option<GcRef>>,
    drops: Option<Arc<AtomicUsize>>,
}

static NODE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "id",
        kind: FieldKind::Scalar,
    },
    FieldDescriptor {
        name: "next",
        kind: FieldKind::Reference,
    },
    FieldDescriptor {
        name: "children",
        kind: FieldKind::ReferenceList,
    },
];

static NODE_DESCRIPTOR: TypeDescriptor = TypeDescriptor {
    name: "Node",
    fields: NODE_FIELDS,
};

impl Node {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            next: None,
            children: Vec::new(),
            drops: None,
        }
    }

    /// Node that bumps `drops` when destroyed, for double-free checks.
    pub fn counted(id: u32, drops: Arc<AtomicUsize>) -> Self {
        Self {
            id,
            next: None,
            children: Vec::new(),
            drops: Some(drops),
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if let Some(counter) = &self.drops {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl GcObject for Node {
    fn descriptor(&self) -> &'static TypeDescriptor {
        &NODE_DESCRIPTOR
    }

    fn reference(&self, field: usize) -> Option<GcRef> {
        match field {
            1 => self.next,
            _ => None,
        }
    }

    fn references(&self, field: usize) -> Box<dyn Iterator<Item = Option<GcRef>> + '_> {
        match field {
            2 => Box::new(self.children.iter().copied()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Inserts a rooted parent owning `child_count` otherwise-unreferenced
/// children, and returns the parent's handle.
pub fn build_family(gc: &mut GcManager, id: u32, child_count: usize) -> GcRef {
    let children: Vec<Option<GcRef>> = (0..child_count)
        .map(|i| {
            Some(
                gc.insert(Box::new(Node::new(id * 1_000_000 + i as u32)))
                    .unwrap(),
            )
        })
        .collect();
    let mut parent = Node::new(id);
    parent.children = children;
    let parent_ref = gc.insert(Box::new(parent)).unwrap();
    gc.set_root(parent_ref, true);
    parent_ref
}

/// Inserts a `next`-linked chain and returns its head.
pub fn build_chain(gc: &mut GcManager, start_id: u32, len: usize) -> GcRef {
    let mut head = gc.insert(Box::new(Node::new(start_id))).unwrap();
    for offset in 1..len {
        let mut node = Node::new(start_id + offset as u32);
        node.next = Some(head);
        head = gc.insert(Box::new(node)).unwrap();
    }
    head
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
