//! Resource identifiers.
//!
//! A [`Uri`] keeps the location exactly as written (`base`) next to the
//! location resolved against its [`UriContext`] (`full`). Resolution is pure
//! string/URL manipulation; no I/O happens until one of the `read_*` calls.

use std::fmt;

use image::DynamicImage;

use crate::assets::reader::{self, ReadOptions, ReadResult};
use crate::scene::NodeRef;

/// The location relative paths are resolved against, typically the full
/// location of the document that referenced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UriContext {
    referrer: String,
}

impl UriContext {
    #[must_use]
    pub fn new(referrer: impl Into<String>) -> Self {
        Self {
            referrer: referrer.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn referrer(&self) -> &str {
        &self.referrer
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.referrer.is_empty()
    }

    /// Resolves `location` against this context.
    ///
    /// Absolute locations and empty contexts pass through unchanged. Server
    /// referrers use URL joining; file referrers join against the referrer's
    /// directory (a referrer ending in a separator is the directory).
    #[must_use]
    pub fn resolve(&self, location: &str) -> String {
        if self.referrer.is_empty() || location.is_empty() || is_absolute(location) {
            return location.to_string();
        }

        if is_server_address(&self.referrer) {
            return match url::Url::parse(&self.referrer).and_then(|base| base.join(location)) {
                Ok(joined) => joined.into(),
                Err(err) => {
                    log::warn!("uri: cannot join '{location}' onto '{}': {err}", self.referrer);
                    location.to_string()
                }
            };
        }

        let directory = match self.referrer.rfind(['/', '\\']) {
            Some(pos) => &self.referrer[..=pos],
            None => "",
        };
        normalize(&format!("{directory}{location}"))
    }
}

impl From<&Uri> for UriContext {
    fn from(uri: &Uri) -> Self {
        Self::new(uri.full.clone())
    }
}

/// A resource location together with its resolved form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Uri {
    base: String,
    full: String,
    context: UriContext,
}

impl Uri {
    /// Resolves `location` against `context`.
    #[must_use]
    pub fn new(location: &str, context: &UriContext) -> Self {
        Self {
            base: location.to_string(),
            full: context.resolve(location),
            context: context.clone(),
        }
    }

    /// The location as given.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The resolved location.
    #[inline]
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &UriContext {
        &self.context
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        is_server_address(&self.full)
    }

    /// Returns a copy with `suffix` appended to both the base and the resolved
    /// location. The context is kept.
    #[must_use]
    pub fn append(&self, suffix: &str) -> Self {
        Self {
            base: format!("{}{suffix}", self.base),
            full: format!("{}{suffix}", self.full),
            context: self.context.clone(),
        }
    }

    // ========================================================================
    // Synchronous reads
    // ========================================================================

    /// Fetches and decodes an image. Blocks; there is no timeout.
    #[must_use]
    pub fn read_image(&self, options: &ReadOptions) -> ReadResult<DynamicImage> {
        ReadResult::from_fetch(&self.full, reader::read_image(&self.full, options))
    }

    /// Fetches a JSON node description and builds the node graph it describes.
    #[must_use]
    pub fn read_node(&self, options: &ReadOptions) -> ReadResult<NodeRef> {
        ReadResult::from_fetch(&self.full, reader::read_node(&self.full, options))
    }

    /// Fetches a UTF-8 text resource.
    #[must_use]
    pub fn read_string(&self, options: &ReadOptions) -> ReadResult<String> {
        ReadResult::from_fetch(&self.full, reader::read_string(&self.full, options))
    }
}

impl From<&str> for Uri {
    fn from(location: &str) -> Self {
        Self {
            base: location.to_string(),
            full: location.to_string(),
            context: UriContext::default(),
        }
    }
}

impl From<String> for Uri {
    fn from(location: String) -> Self {
        Self {
            full: location.clone(),
            base: location,
            context: UriContext::default(),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

// ============================================================================
// Path helpers
// ============================================================================

pub(crate) fn is_server_address(location: &str) -> bool {
    let lower = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_absolute(location: &str) -> bool {
    let bytes = location.as_bytes();
    location.contains("://")
        || location.starts_with('/')
        || location.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Folds `.` and `..` segments and converts separators to `/`.
fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let rooted = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted { format!("/{joined}") } else { joined }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_referrer_resolves_against_directory() {
        let context = UriContext::new("data/maps/world.earth");
        assert_eq!(context.resolve("roads.json"), "data/maps/roads.json");
        assert_eq!(context.resolve("../images/sea.png"), "data/images/sea.png");
        assert_eq!(context.resolve("./a/./b.txt"), "data/maps/a/b.txt");
    }

    #[test]
    fn test_directory_referrer() {
        let context = UriContext::new("/srv/tiles/");
        assert_eq!(context.resolve("0/0/0.png"), "/srv/tiles/0/0/0.png");
    }

    #[test]
    fn test_bare_referrer_has_no_directory() {
        let context = UriContext::new("world.earth");
        assert_eq!(context.resolve("roads.json"), "roads.json");
    }

    #[test]
    fn test_absolute_locations_pass_through() {
        let context = UriContext::new("data/world.earth");
        assert_eq!(context.resolve("/abs/file.png"), "/abs/file.png");
        assert_eq!(context.resolve("C:\\tiles\\a.png"), "C:\\tiles\\a.png");
        assert_eq!(
            context.resolve("https://example.com/a.png"),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_server_referrer_uses_url_join() {
        let context = UriContext::new("http://example.com/maps/world.earth");
        assert_eq!(context.resolve("tiles/1.png"), "http://example.com/maps/tiles/1.png");
        assert_eq!(context.resolve("../up.png"), "http://example.com/up.png");
    }

    #[test]
    fn test_normalize_keeps_leading_parent_segments() {
        assert_eq!(normalize("../../a/b/../c"), "../../a/c");
        assert_eq!(normalize("/../a"), "/a");
        assert_eq!(normalize("a\\b\\c.txt"), "a/b/c.txt");
    }
}
