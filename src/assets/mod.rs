//! Resource location and synchronous reads.
//!
//! - [`Uri`] / [`UriContext`]: location resolution, no I/O
//! - [`ReadOptions`], [`ReadResult`], [`ResultCode`]: blocking reads of images,
//!   node descriptions and text from files or HTTP(S)
//! - [`NodeDescription`]: the JSON format read by [`Uri::read_node`]

pub mod format;
pub mod reader;
pub mod uri;

pub use format::NodeDescription;
pub use reader::{ReadOptions, ReadResult, ResultCode};
pub use uri::{Uri, UriContext};
