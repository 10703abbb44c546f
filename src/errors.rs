//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`DrapeError`] covers the failure modes of resource
//! fetching:
//! - File I/O errors
//! - HTTP transport and response errors
//! - Image, JSON and text decoding errors
//! - Missing readers or disabled features
//!
//! The scene-graph and attachment operations never fail; they degrade to
//! defined fallbacks instead. Fetch failures are surfaced to callers as a
//! [`ResultCode`] via [`DrapeError::result_code`], never as panics.
//!
//! ```rust,ignore
//! use drapeable::errors::{DrapeError, Result};
//!
//! fn fetch() -> Result<Vec<u8>> {
//!     Ok(std::fs::read("terrain.png")?)
//! }
//! ```

use thiserror::Error;

use crate::assets::ResultCode;

/// The main error type for resource fetching.
#[derive(Error, Debug)]
pub enum DrapeError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // HTTP & Network Errors
    // ========================================================================
    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status}")]
    HttpResponse {
        /// HTTP status code
        status: u16,
    },

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload was not valid UTF-8 text.
    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // ========================================================================
    // Reader Availability
    // ========================================================================
    /// No reader understands the requested format.
    #[error("No reader for: {0}")]
    NoReader(String),

    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl DrapeError {
    /// Classifies this error into the coarse [`ResultCode`] categories
    /// reported by [`Uri`](crate::assets::Uri) reads.
    #[must_use]
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound => ResultCode::NotFound,
            Self::Io(_) | Self::HttpError(_) => ResultCode::TransportError,
            Self::HttpResponse { status: 404 | 410 } => ResultCode::NotFound,
            Self::HttpResponse { .. } => ResultCode::ServerError,
            Self::ImageDecode(_) | Self::Json(_) | Self::Utf8(_) => ResultCode::DecodeError,
            Self::NoReader(_) | Self::FeatureNotEnabled(_) => ResultCode::NoReader,
        }
    }
}

/// Alias for `Result<T, DrapeError>`.
pub type Result<T> = std::result::Result<T, DrapeError>;
