#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod drape;
pub mod errors;
pub mod overlay;
pub mod scene;

pub use assets::{ReadOptions, ReadResult, ResultCode, Uri, UriContext};
pub use drape::{AttachMode, Attachment, DrapeSettings, DrapeableNode};
pub use errors::DrapeError;
pub use overlay::{OverlayGroup, OverlayHost};
pub use scene::{CycleCounter, CycleId, FrameMarker, Node, NodeRef, NodeVisitor, VisitorKind};
