//! Drapeable nodes
//!
//! A [`DrapeableNode`] owns a payload subgraph and keeps it attached in
//! exactly one place: under itself ([`AttachMode::Direct`]) or under a
//! container handed to an [`OverlayHost`](crate::overlay::OverlayHost)
//! ([`AttachMode::Draped`]).

pub mod node;
pub mod settings;

pub use node::{Attachment, DrapeableNode};
pub use settings::{AttachMode, DrapeSettings};
