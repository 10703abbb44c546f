//! Synchronous resource reads.
//!
//! Every read returns a [`ReadResult`] that always carries a [`ResultCode`].
//! Ordinary failures (missing files, HTTP errors, undecodable data) are
//! reported through the code and never panic. Reads block the calling thread
//! and have no timeout; callers that need responsiveness should run them off
//! the update and traversal path.

use std::fmt;
use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::assets::format::NodeDescription;
use crate::errors::{DrapeError, Result};
use crate::scene::NodeRef;

/// Outcome category of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    /// The resource does not exist.
    NotFound,
    /// The resource could not be transferred (I/O or network failure).
    TransportError,
    /// The server answered with an error status.
    ServerError,
    /// No reader handles the requested format.
    NoReader,
    /// The data was fetched but could not be decoded.
    DecodeError,
}

impl ResultCode {
    #[inline]
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ok => "ok",
            Self::NotFound => "not found",
            Self::TransportError => "transport error",
            Self::ServerError => "server error",
            Self::NoReader => "no reader",
            Self::DecodeError => "decode error",
        };
        f.write_str(text)
    }
}

/// Options for a single read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Overrides the format derived from the location's extension
    /// (e.g. `"png"`, `"json"`).
    pub format_hint: Option<String>,
    /// Extra headers sent with HTTP requests.
    pub headers: Vec<(String, String)>,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format_hint(mut self, hint: impl Into<String>) -> Self {
        self.format_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Data returned by a read, together with its [`ResultCode`].
#[derive(Debug)]
pub struct ReadResult<T> {
    data: Option<T>,
    code: ResultCode,
    detail: Option<String>,
}

impl<T> ReadResult<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            code: ResultCode::Ok,
            detail: None,
        }
    }

    #[must_use]
    pub fn failed(error: &DrapeError) -> Self {
        Self {
            data: None,
            code: error.result_code(),
            detail: Some(error.to_string()),
        }
    }

    pub(crate) fn from_fetch(location: &str, result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                log::warn!("read '{location}' failed: {err}");
                Self::failed(&err)
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn code(&self) -> ResultCode {
        self.code
    }

    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.code.is_ok()
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Human-readable failure description, if the read failed.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Converts into a `Result`, keeping only the code on failure.
    pub fn into_result(self) -> std::result::Result<T, ResultCode> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(self.code),
        }
    }
}

// ============================================================================
// Readers
// ============================================================================

pub(crate) fn read_image(location: &str, options: &ReadOptions) -> Result<DynamicImage> {
    let format = match &options.format_hint {
        Some(hint) => Some(ImageFormat::from_extension(hint).ok_or_else(|| DrapeError::NoReader(hint.clone()))?),
        None => None,
    };

    let bytes = fetch_bytes(location, options)?;
    let image = match format {
        Some(format) => image::load_from_memory_with_format(&bytes, format)?,
        None => image::load_from_memory(&bytes)?,
    };
    Ok(image)
}

pub(crate) fn read_node(location: &str, options: &ReadOptions) -> Result<NodeRef> {
    let extension = options
        .format_hint
        .clone()
        .or_else(|| extension_of(location));
    if let Some(ext) = extension
        && !ext.eq_ignore_ascii_case("json")
    {
        return Err(DrapeError::NoReader(ext));
    }

    let bytes = fetch_bytes(location, options)?;
    let description: NodeDescription = serde_json::from_slice(&bytes)?;
    Ok(description.build())
}

pub(crate) fn read_string(location: &str, options: &ReadOptions) -> Result<String> {
    let bytes = fetch_bytes(location, options)?;
    Ok(String::from_utf8(bytes)?)
}

fn fetch_bytes(location: &str, options: &ReadOptions) -> Result<Vec<u8>> {
    if super::uri::is_server_address(location) {
        return fetch_http(location, options);
    }

    let path = location.strip_prefix("file://").unwrap_or(location);
    log::debug!("read: file '{path}'");
    Ok(std::fs::read(path)?)
}

#[cfg(feature = "http")]
fn fetch_http(location: &str, options: &ReadOptions) -> Result<Vec<u8>> {
    log::debug!("read: GET '{location}'");
    let mut request = ehttp::Request::get(location);
    for (key, value) in &options.headers {
        request.headers.insert(key, value);
    }

    let response = ehttp::fetch_blocking(&request).map_err(DrapeError::HttpError)?;
    if !response.ok {
        return Err(DrapeError::HttpResponse {
            status: response.status,
        });
    }
    Ok(response.bytes)
}

#[cfg(not(feature = "http"))]
fn fetch_http(location: &str, _options: &ReadOptions) -> Result<Vec<u8>> {
    Err(DrapeError::FeatureNotEnabled(format!(
        "http (required for '{location}')"
    )))
}

/// Lower-cased extension of the path part of `location`, ignoring any query
/// or fragment.
fn extension_of(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
