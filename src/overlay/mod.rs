//! Overlay host interface
//!
//! The overlay subsystem projects draped geometry onto another surface. Its
//! rendering is outside this crate; what the attachment controller needs is
//! the attachment point, an ordered set of containers the host traverses on
//! its own pass, and a notification after structural edits.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::scene::{Node, NodeRef, NodeVisitor};

/// The indirect traversal subsystem as seen by a
/// [`DrapeableNode`](crate::drape::DrapeableNode).
///
/// Hosts may batch or defer heavy recomputation in response to
/// [`notify_graph_changed`](Self::notify_graph_changed), but must eventually
/// re-derive their traversal set.
pub trait OverlayHost: Send + Sync {
    /// Adds `container` to the attachment point.
    fn attach(&self, container: &NodeRef);

    /// Removes `container` from the attachment point.
    fn detach(&self, container: &NodeRef);

    /// Signals that the set of draped containers changed.
    fn notify_graph_changed(&self);
}

/// Reference [`OverlayHost`]: a group node traversed by its own pass.
///
/// Attach and detach are idempotent. Every change notification bumps
/// [`revision`](Self::revision).
#[derive(Debug)]
pub struct OverlayGroup {
    group: NodeRef,
    revision: AtomicU64,
}

impl OverlayGroup {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            group: Node::new("OverlayGroup"),
            revision: AtomicU64::new(0),
        })
    }

    /// The attachment point itself.
    #[must_use]
    pub fn group(&self) -> &NodeRef {
        &self.group
    }

    /// Number of graph-changed notifications received so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Snapshot of attached containers, in attachment order.
    #[must_use]
    pub fn attached(&self) -> Vec<NodeRef> {
        self.group.children()
    }

    #[must_use]
    pub fn contains(&self, container: &NodeRef) -> bool {
        self.group.contains(container)
    }

    /// Runs the overlay pass over every attached container.
    pub fn traverse(&self, visitor: &mut NodeVisitor) {
        self.group.traverse(visitor);
    }
}

impl OverlayHost for OverlayGroup {
    fn attach(&self, container: &NodeRef) {
        if !self.group.add_child(container) {
            log::debug!("overlay: container '{}' already attached", container.name());
        }
    }

    fn detach(&self, container: &NodeRef) {
        if !self.group.remove_child(container) {
            log::debug!("overlay: container '{}' was not attached", container.name());
        }
    }

    fn notify_graph_changed(&self) {
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!("overlay: graph changed (revision {revision})");
    }
}
