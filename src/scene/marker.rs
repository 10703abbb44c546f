//! Frame marker: cross-pass reachability record.
//!
//! The overlay pass traverses a draped payload through a container that lives
//! outside the payload owner's subtree. The marker on that container remembers
//! the last cycle in which the owner was reached by the main cull pass, so the
//! overlay pass can skip the payload when the owner was culled or detached.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::scene::visitor::{CycleId, Traversal, TraversalObserver, VisitorKind};

/// Records the cycle id of the last main-pass cull that reached the owner.
///
/// # Pass ordering
///
/// The cull gate compares against the exact cycle id, so within one cycle the
/// overlay cull pass must run after the main cull pass has finished. An
/// overlay cull that runs first still sees the previous cycle and prunes the
/// payload for that cycle. Update and draw passes are not ordered.
#[derive(Debug)]
pub struct FrameMarker {
    last_cycle: AtomicU64,
    recorded: AtomicBool,
}

impl FrameMarker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_cycle: AtomicU64::new(0),
            recorded: AtomicBool::new(false),
        }
    }

    /// Stores `cycle` as the most recent cycle in which the owner was reached.
    #[inline]
    pub fn record(&self, cycle: CycleId) {
        self.last_cycle.store(cycle, Ordering::Release);
        self.recorded.store(true, Ordering::Release);
    }

    /// The last recorded cycle, or `None` if nothing was recorded yet.
    #[inline]
    #[must_use]
    pub fn last_cycle(&self) -> Option<CycleId> {
        self.recorded
            .load(Ordering::Acquire)
            .then(|| self.last_cycle.load(Ordering::Acquire))
    }

    #[inline]
    #[must_use]
    pub fn was_reached_in(&self, cycle: CycleId) -> bool {
        self.last_cycle() == Some(cycle)
    }
}

impl Default for FrameMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl TraversalObserver for FrameMarker {
    /// Cull passes only descend when the owner was reached in the same cycle;
    /// other passes always descend. See the pass ordering note on
    /// [`FrameMarker`].
    fn visited(&self, cycle: CycleId, kind: VisitorKind) -> Traversal {
        match kind {
            VisitorKind::Cull if !self.was_reached_in(cycle) => {
                log::trace!("frame marker: stale ({:?} != {cycle}), pruning", self.last_cycle());
                Traversal::Prune
            }
            _ => Traversal::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_marker_prunes_cull() {
        let marker = FrameMarker::new();
        assert_eq!(marker.last_cycle(), None);
        assert_eq!(marker.visited(0, VisitorKind::Cull), Traversal::Prune);
        assert_eq!(marker.visited(1, VisitorKind::Cull), Traversal::Prune);
    }

    #[test]
    fn test_marker_matches_only_recorded_cycle() {
        let marker = FrameMarker::new();
        marker.record(7);

        assert_eq!(marker.visited(7, VisitorKind::Cull), Traversal::Continue);
        assert_eq!(marker.visited(8, VisitorKind::Cull), Traversal::Prune);
        assert!(marker.was_reached_in(7));
        assert!(!marker.was_reached_in(6));
    }

    #[test]
    fn test_marker_records_every_cycle_id() {
        let marker = FrameMarker::new();
        marker.record(0);
        assert_eq!(marker.last_cycle(), Some(0));

        marker.record(u64::MAX);
        assert_eq!(marker.last_cycle(), Some(u64::MAX));
        assert_eq!(marker.visited(u64::MAX, VisitorKind::Cull), Traversal::Continue);
    }

    #[test]
    fn test_non_cull_passes_always_continue() {
        let marker = FrameMarker::new();
        assert_eq!(marker.visited(3, VisitorKind::Update), Traversal::Continue);
        assert_eq!(marker.visited(3, VisitorKind::Draw), Traversal::Continue);
    }
}
