use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::scene::visitor::{NodeVisitor, Traversal, TraversalObserver, VisitorKind};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identifier.
pub type NodeId = u64;

/// Shared, reference-counted handle to a [`Node`].
///
/// Parents own their children through this handle; the graph never keeps a
/// node alive through a parent back reference.
pub type NodeRef = Arc<Node>;

/// A grouping node in the traversal graph.
///
/// # Design Principles
///
/// - Children are owned (`Arc`), parents are observed (`Weak`), so the graph
///   never forms a reference cycle
/// - Structural edits take `&self`; the lists live behind `RwLock` so that
///   independent traversal passes can share the graph across threads
/// - An optional [`TraversalObserver`] is consulted before a visitor descends
///
/// # Hierarchy
///
/// A node may have any number of parents. The attachment controller relies on
/// [`Node::num_parents`] to verify that its payload is parented exactly once.
pub struct Node {
    id: NodeId,
    name: String,

    // === Core Hierarchy ===
    /// Child node handles, in traversal order
    children: RwLock<Vec<NodeRef>>,
    /// Back references to every group currently holding this node
    parents: RwLock<SmallVec<[Weak<Node>; 2]>>,

    // === Core State ===
    /// Visibility flag for culling
    visible: AtomicBool,
    observer: Option<Arc<dyn TraversalObserver>>,
}

impl Node {
    /// Creates a new, visible, childless node.
    #[must_use]
    pub fn new(name: &str) -> NodeRef {
        Arc::new(Self::build(name, None))
    }

    /// Creates a node whose traversal is gated by `observer`.
    #[must_use]
    pub fn with_observer(name: &str, observer: Arc<dyn TraversalObserver>) -> NodeRef {
        Arc::new(Self::build(name, Some(observer)))
    }

    fn build(name: &str, observer: Option<Arc<dyn TraversalObserver>>) -> Self {
        Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            children: RwLock::new(Vec::new()),
            parents: RwLock::new(SmallVec::new()),
            visible: AtomicBool::new(true),
            observer,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn observer(&self) -> Option<&Arc<dyn TraversalObserver>> {
        self.observer.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Hidden nodes (and their subtrees) are skipped by cull visitors.
    #[inline]
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Appends `child` to this node's children and records the back reference.
    ///
    /// Returns `false` without touching the graph when `child` is already a
    /// child of this node or is this node itself.
    pub fn add_child(self: &Arc<Self>, child: &NodeRef) -> bool {
        if Arc::ptr_eq(self, child) {
            log::warn!("Cannot attach node '{}' to itself!", self.name);
            return false;
        }

        {
            let mut children = self.children.write();
            if children.iter().any(|c| Arc::ptr_eq(c, child)) {
                return false;
            }
            children.push(Arc::clone(child));
        }
        child.parents.write().push(Arc::downgrade(self));
        true
    }

    /// Removes `child` from this node's children.
    ///
    /// Returns `false` if `child` was not a child of this node.
    pub fn remove_child(self: &Arc<Self>, child: &NodeRef) -> bool {
        let removed = {
            let mut children = self.children.write();
            children
                .iter()
                .position(|c| Arc::ptr_eq(c, child))
                .map(|pos| children.remove(pos))
        };

        match removed {
            Some(detached) => {
                detached.forget_parent(self);
                true
            }
            None => false,
        }
    }

    /// Removes every child, returning how many were detached.
    pub fn remove_children(self: &Arc<Self>) -> usize {
        let drained: Vec<NodeRef> = std::mem::take(&mut *self.children.write());
        for child in &drained {
            child.forget_parent(self);
        }
        drained.len()
    }

    fn forget_parent(&self, parent: &Arc<Self>) {
        let target = Arc::as_ptr(parent);
        let mut parents = self.parents.write();
        if let Some(pos) = parents.iter().position(|p| std::ptr::eq(p.as_ptr(), target)) {
            parents.remove(pos);
        }
    }

    /// Returns a snapshot of the child list.
    #[must_use]
    pub fn children(&self) -> Vec<NodeRef> {
        self.children.read().clone()
    }

    #[must_use]
    pub fn num_children(&self) -> usize {
        self.children.read().len()
    }

    #[must_use]
    pub fn contains(&self, child: &NodeRef) -> bool {
        self.children.read().iter().any(|c| Arc::ptr_eq(c, child))
    }

    /// Returns the parents that are still alive.
    #[must_use]
    pub fn parents(&self) -> Vec<NodeRef> {
        self.parents.read().iter().filter_map(Weak::upgrade).collect()
    }

    #[must_use]
    pub fn num_parents(&self) -> usize {
        self.parents.read().iter().filter(|p| p.strong_count() > 0).count()
    }

    #[must_use]
    pub fn has_parent(&self, parent: &NodeRef) -> bool {
        let target = Arc::as_ptr(parent);
        self.parents.read().iter().any(|p| std::ptr::eq(p.as_ptr(), target))
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Depth-first traversal entry point.
    ///
    /// Cull visitors skip hidden nodes. The observer, if any, runs before the
    /// node is entered and may prune the whole subtree for this pass.
    pub fn accept(&self, visitor: &mut NodeVisitor) {
        if visitor.kind() == VisitorKind::Cull && !self.is_visible() {
            visitor.record_pruned(self.id);
            return;
        }

        if let Some(observer) = &self.observer
            && observer.visited(visitor.cycle(), visitor.kind()) == Traversal::Prune
        {
            visitor.record_pruned(self.id);
            return;
        }

        visitor.record_visited(self.id);
        self.traverse(visitor);
    }

    /// Visits every child in order. This is the standard group traversal.
    pub fn traverse(&self, visitor: &mut NodeVisitor) {
        let children = self.children.read();
        for child in children.iter() {
            child.accept(visitor);
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("children", &self.num_children())
            .field("parents", &self.num_parents())
            .field("visible", &self.is_visible())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
