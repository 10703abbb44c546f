use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::drape::settings::{AttachMode, DrapeSettings};
use crate::overlay::OverlayHost;
use crate::scene::{CycleId, FrameMarker, Node, NodeRef, NodeVisitor, Traversal, TraversalObserver, VisitorKind};

/// Observed structural state of a drapeable node's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// No payload.
    Empty,
    /// The payload is the sole child of the drapeable node.
    Direct,
    /// The payload is the sole child of the container.
    Draped,
    /// The payload is parented in both places, or in neither.
    Broken,
}

/// Observer installed on the drapeable node itself.
///
/// Records the cycle on the container's marker whenever a cull pass reaches
/// the drapeable node while its payload is draped under a live host.
struct DrapeSync {
    marker: Arc<FrameMarker>,
    owner: RwLock<Option<Weak<dyn OverlayHost>>>,
    armed: AtomicBool,
}

impl DrapeSync {
    fn owner(&self) -> Option<Arc<dyn OverlayHost>> {
        self.owner.read().as_ref().and_then(Weak::upgrade)
    }

    fn owner_handle(&self) -> Option<Weak<dyn OverlayHost>> {
        self.owner.read().clone()
    }

    fn set_owner(&self, owner: Option<Weak<dyn OverlayHost>>) {
        *self.owner.write() = owner;
    }

    fn arm(&self, armed: bool) {
        self.armed.store(armed, Ordering::Release);
    }
}

impl TraversalObserver for DrapeSync {
    fn visited(&self, cycle: CycleId, kind: VisitorKind) -> Traversal {
        if kind == VisitorKind::Cull
            && self.armed.load(Ordering::Acquire)
            && self.owner.read().as_ref().is_some_and(|o| o.strong_count() > 0)
        {
            log::trace!("drape: reached in cycle {cycle}");
            self.marker.record(cycle);
        }
        Traversal::Continue
    }
}

/// Attachment controller for a payload that can be draped.
///
/// The controller owns:
/// - its own traversable group node ([`node`](Self::node)), which callers
///   place in their scene
/// - a container ([`container`](Self::container)) that holds the payload
///   while draped and is handed to the overlay host
/// - the container's [`FrameMarker`]
///
/// The owning host is held weakly. When the host is absent or has been
/// dropped, draped mode falls back to direct attachment.
///
/// Mutation takes `&mut self`, so it cannot overlap with traversal passes,
/// which only need `&self` (or just the node handles).
pub struct DrapeableNode {
    node: NodeRef,
    container: NodeRef,
    sync: Arc<DrapeSync>,
    payload: Option<NodeRef>,
    mode: AttachMode,
}

impl DrapeableNode {
    /// Creates a drapeable node with no payload.
    #[must_use]
    pub fn new(owner: Option<Weak<dyn OverlayHost>>, settings: DrapeSettings) -> Self {
        let marker = Arc::new(FrameMarker::new());
        let container = Node::with_observer(&format!("{}.container", settings.name), marker.clone());
        let sync = Arc::new(DrapeSync {
            marker,
            owner: RwLock::new(owner),
            armed: AtomicBool::new(false),
        });
        let node = Node::with_observer(&settings.name, sync.clone());

        Self {
            node,
            container,
            sync,
            payload: None,
            mode: settings.mode,
        }
    }

    /// Creates a drapeable node owned by `host`.
    #[must_use]
    pub fn with_host<H: OverlayHost + 'static>(host: &Arc<H>, settings: DrapeSettings) -> Self {
        let owner: Weak<dyn OverlayHost> = Arc::downgrade(host) as Weak<dyn OverlayHost>;
        Self::new(Some(owner), settings)
    }

    /// Sets the initial payload.
    #[must_use]
    pub fn with_payload(mut self, payload: NodeRef) -> Self {
        self.set_payload(Some(payload));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The controller's own node. Add this to the scene.
    #[inline]
    #[must_use]
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> &NodeRef {
        &self.container
    }

    #[inline]
    #[must_use]
    pub fn marker(&self) -> &FrameMarker {
        &self.sync.marker
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&NodeRef> {
        self.payload.as_ref()
    }

    /// The requested mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> AttachMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn is_draped(&self) -> bool {
        self.mode.is_draped()
    }

    /// The mode actually in force: draped only while the host is alive.
    #[must_use]
    pub fn effective_mode(&self) -> AttachMode {
        if self.draped_host().is_some() {
            AttachMode::Draped
        } else {
            AttachMode::Direct
        }
    }

    /// The owning host, if it is still alive.
    #[must_use]
    pub fn owner(&self) -> Option<Arc<dyn OverlayHost>> {
        self.sync.owner()
    }

    fn draped_host(&self) -> Option<Arc<dyn OverlayHost>> {
        if self.mode.is_draped() { self.sync.owner() } else { None }
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Replaces the payload.
    ///
    /// The old payload is detached from wherever the current mode put it, the
    /// container is cleared, and the new payload (if any) is attached per the
    /// current mode. When the container moved in or out of the overlay host,
    /// the host is notified once.
    pub fn set_payload(&mut self, payload: Option<NodeRef>) {
        let detached_from = self.detach_payload();

        self.container.remove_children();
        self.payload = payload;

        let attached_to = self.attach_payload();
        if let Some(host) = attached_to.or(detached_from) {
            host.notify_graph_changed();
        }

        self.sync.arm(self.mode.is_draped() && self.payload.is_some());
        self.check_attachment();
    }

    /// Switches between direct and draped attachment.
    ///
    /// A no-op when `mode` is already current. Otherwise the payload is fully
    /// detached under the old mode and reattached under the new one.
    pub fn set_mode(&mut self, mode: AttachMode) {
        if self.mode == mode {
            return;
        }

        log::debug!("drape '{}': {:?} -> {:?}", self.node.name(), self.mode, mode);
        let saved = self.payload.clone();
        if saved.is_some() {
            self.set_payload(None);
        }

        self.mode = mode;

        if saved.is_some() {
            self.set_payload(saved);
        } else {
            self.sync.arm(false);
        }
    }

    #[inline]
    pub fn set_draped(&mut self, draped: bool) {
        self.set_mode(AttachMode::from_draped(draped));
    }

    /// Replaces the owning host, moving the payload accordingly.
    pub fn set_owner(&mut self, owner: Option<Weak<dyn OverlayHost>>) {
        let unchanged = match (&self.sync.owner_handle(), &owner) {
            (None, None) => true,
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        };
        if unchanged {
            return;
        }

        let saved = self.payload.clone();
        if saved.is_some() {
            self.set_payload(None);
        }

        self.sync.set_owner(owner);

        if saved.is_some() {
            self.set_payload(saved);
        }
    }

    /// Takes the payload out of the graph. Returns the host the container was
    /// removed from, if any.
    fn detach_payload(&mut self) -> Option<Arc<dyn OverlayHost>> {
        let old = self.payload.take()?;

        if let Some(host) = self.draped_host() {
            host.detach(&self.container);
            log::debug!("drape '{}': undraped '{}'", self.node.name(), old.name());
            Some(host)
        } else {
            self.node.remove_child(&old);
            log::debug!("drape '{}': removed '{}'", self.node.name(), old.name());
            None
        }
    }

    /// Puts the payload into the graph. Returns the host the container was
    /// added to, if any.
    fn attach_payload(&self) -> Option<Arc<dyn OverlayHost>> {
        let payload = self.payload.as_ref()?;

        if let Some(host) = self.draped_host() {
            self.container.add_child(payload);
            host.attach(&self.container);
            log::debug!("drape '{}': draped '{}'", self.node.name(), payload.name());
            Some(host)
        } else {
            if self.mode.is_draped() {
                log::debug!(
                    "drape '{}': no live overlay host, attaching '{}' directly",
                    self.node.name(),
                    payload.name()
                );
            }
            self.node.add_child(payload);
            None
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Traverses the drapeable node.
    ///
    /// A cull pass arriving while the payload is draped under a live host
    /// stamps the container's marker with the visitor's cycle first; the
    /// node's children (the payload, when direct) are then visited normally.
    pub fn traverse(&self, visitor: &mut NodeVisitor) {
        self.node.accept(visitor);
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Reports where the payload is currently parented.
    #[must_use]
    pub fn attachment(&self) -> Attachment {
        let Some(payload) = &self.payload else {
            return if self.container.num_children() == 0 {
                Attachment::Empty
            } else {
                Attachment::Broken
            };
        };

        let in_node = self.node.contains(payload);
        let in_container = self.container.contains(payload);
        match (in_node, in_container) {
            (true, false) if self.container.num_children() == 0 => Attachment::Direct,
            (false, true) if self.container.num_children() == 1 => Attachment::Draped,
            _ => Attachment::Broken,
        }
    }

    fn check_attachment(&self) {
        let state = self.attachment();
        debug_assert!(
            state != Attachment::Broken,
            "drape '{}': payload attachment is broken",
            self.node.name()
        );
        if state == Attachment::Broken {
            log::error!("drape '{}': payload attachment is broken, repairing", self.node.name());
            self.repair();
        }
    }

    /// Clears every attachment and reattaches per the current mode.
    fn repair(&self) {
        if let Some(payload) = &self.payload {
            self.node.remove_child(payload);
        }
        self.container.remove_children();
        let owner = self.owner();
        if let Some(host) = &owner {
            host.detach(&self.container);
        }
        if let Some(host) = self.attach_payload().or(owner) {
            host.notify_graph_changed();
        }
    }
}

impl Drop for DrapeableNode {
    fn drop(&mut self) {
        if self.payload.is_some() {
            self.set_payload(None);
        }
    }
}

impl std::fmt::Debug for DrapeableNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrapeableNode")
            .field("name", &self.node.name())
            .field("mode", &self.mode)
            .field("effective_mode", &self.effective_mode())
            .field("payload", &self.payload.as_ref().map(|p| p.name().to_string()))
            .field("last_cycle", &self.marker().last_cycle())
            .finish_non_exhaustive()
    }
}
