//! Traversal Visitors
//!
//! A traversal pass is one [`NodeVisitor`] walking the graph depth-first. Each
//! pass carries its [`VisitorKind`] and the [`CycleId`] of the frame it belongs
//! to explicitly; nothing in the graph reads a global frame counter.
//!
//! A frame usually consists of several passes sharing one cycle id (an update
//! pass, the main cull pass, an overlay cull pass, a draw pass). Those passes
//! are not ordered relative to each other except through observers such as
//! [`FrameMarker`](crate::scene::FrameMarker).

use std::fmt;

use crate::scene::node::NodeId;

/// Identifier of one traversal cycle (one logical frame).
///
/// Supplied by the traversal driver; strictly increasing from frame to frame.
pub type CycleId = u64;

/// The kind of traversal a visitor performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitorKind {
    /// Per-frame state update pass.
    Update,
    /// Visibility determination pass.
    Cull,
    /// Drawing pass.
    Draw,
}

impl fmt::Display for VisitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Cull => f.write_str("cull"),
            Self::Draw => f.write_str("draw"),
        }
    }
}

/// Decision returned by a [`TraversalObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Enter the node and visit its children.
    Continue,
    /// Skip the node and its whole subtree for this pass.
    Prune,
}

/// Hook consulted each time a visitor reaches the node it is attached to.
///
/// Observers are shared between passes that may run on different threads, so
/// they must synchronise their own state.
pub trait TraversalObserver: Send + Sync {
    fn visited(&self, cycle: CycleId, kind: VisitorKind) -> Traversal;
}

/// A single depth-first traversal pass.
///
/// Records which nodes were entered and which were pruned, in order.
#[derive(Debug, Clone)]
pub struct NodeVisitor {
    kind: VisitorKind,
    cycle: CycleId,
    visited: Vec<NodeId>,
    pruned: Vec<NodeId>,
}

impl NodeVisitor {
    #[must_use]
    pub fn new(kind: VisitorKind, cycle: CycleId) -> Self {
        Self {
            kind,
            cycle,
            visited: Vec::new(),
            pruned: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> VisitorKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Nodes entered by this pass, in visiting order.
    #[must_use]
    pub fn visited(&self) -> &[NodeId] {
        &self.visited
    }

    /// Nodes skipped by this pass (hidden, or pruned by an observer).
    #[must_use]
    pub fn pruned(&self) -> &[NodeId] {
        &self.pruned
    }

    #[must_use]
    pub fn has_visited(&self, id: NodeId) -> bool {
        self.visited.contains(&id)
    }

    /// How many times `id` was entered. More than one means the node was
    /// reached through two paths in the same pass.
    #[must_use]
    pub fn visit_count(&self, id: NodeId) -> usize {
        self.visited.iter().filter(|&&v| v == id).count()
    }

    pub(crate) fn record_visited(&mut self, id: NodeId) {
        self.visited.push(id);
    }

    pub(crate) fn record_pruned(&mut self, id: NodeId) {
        self.pruned.push(id);
    }
}

/// Source of strictly increasing cycle ids for a traversal driver.
#[derive(Debug, Default, Clone)]
pub struct CycleCounter {
    current: CycleId,
}

impl CycleCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting after `last`; the next [`advance`](Self::advance)
    /// returns `last + 1`.
    #[must_use]
    pub fn starting_after(last: CycleId) -> Self {
        Self { current: last }
    }

    /// Begins a new cycle and returns its id.
    pub fn advance(&mut self) -> CycleId {
        self.current += 1;
        self.current
    }

    /// The id of the cycle in progress (0 before the first `advance`).
    #[must_use]
    pub fn current(&self) -> CycleId {
        self.current
    }

    /// Creates a visitor for the cycle in progress.
    #[must_use]
    pub fn visitor(&self, kind: VisitorKind) -> NodeVisitor {
        NodeVisitor::new(kind, self.current)
    }
}
