//! Scene graph module
//!
//! Shared-ownership node graph and the traversal machinery:
//! - Node: grouping node with owned children and weak parent back references
//! - NodeVisitor: one depth-first pass, tagged with its kind and cycle id
//! - TraversalObserver: per-node hook that may prune a pass
//! - FrameMarker: observer that gates cull passes on cross-pass reachability

pub mod marker;
pub mod node;
pub mod visitor;

pub use marker::FrameMarker;
pub use node::{Node, NodeId, NodeRef};
pub use visitor::{CycleCounter, CycleId, NodeVisitor, Traversal, TraversalObserver, VisitorKind};
