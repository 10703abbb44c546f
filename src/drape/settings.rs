//! Drapeable Node Settings
//!
//! Construction-time configuration for a [`DrapeableNode`](super::DrapeableNode).
//!
//! ```rust,ignore
//! use drapeable::drape::{AttachMode, DrapeSettings};
//!
//! let settings = DrapeSettings {
//!     name: "road-label".into(),
//!     mode: AttachMode::Draped,
//! };
//!
//! // Unnamed, attached directly
//! let settings = DrapeSettings::default();
//! ```

// ---------------------------------------------------------------------------
// AttachMode
// ---------------------------------------------------------------------------

/// How a payload is parented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachMode {
    /// The payload is a child of the drapeable node and is traversed with it.
    #[default]
    Direct,
    /// The payload is parented under a container owned by the overlay host
    /// and traversed by the host's own pass.
    Draped,
}

impl AttachMode {
    #[inline]
    #[must_use]
    pub fn from_draped(draped: bool) -> Self {
        if draped { Self::Draped } else { Self::Direct }
    }

    #[inline]
    #[must_use]
    pub fn is_draped(self) -> bool {
        matches!(self, Self::Draped)
    }
}

// ---------------------------------------------------------------------------
// DrapeSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrapeSettings {
    /// Name given to the controller's node; the container is named
    /// `"{name}.container"`.
    pub name: String,
    /// Initial attachment mode.
    pub mode: AttachMode,
}

impl Default for DrapeSettings {
    fn default() -> Self {
        Self {
            name: "DrapeableNode".to_string(),
            mode: AttachMode::Direct,
        }
    }
}

impl DrapeSettings {
    /// Default settings with the given initial mode.
    #[must_use]
    pub fn with_mode(mode: AttachMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}
