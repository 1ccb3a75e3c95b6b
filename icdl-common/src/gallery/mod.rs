//! Main representation of an imgchest.com gallery
//!
//! # Gallery
//! A gallery is a tagged collection of images addressed by a single post id.
//!
//! How much of it is filled in depends on the resolution mode: the
//! authenticated API carries full per-image info, while the rendered page
//! only exposes direct file links.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Gallery metadata as one JSON object.
///
/// Kept as a raw map instead of a closed struct: the authenticated API
/// passes through whatever fields the server sends, while page extraction
/// fills a fixed set of scalar fields and must omit absent keys entirely.
pub type Metadata = Map<String, Value>;

/// One downloadable file belonging to a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Direct URL of the file on the image host's CDN.
    pub url: String,
    /// Per-image metadata. Only present when the gallery was resolved
    /// through the authenticated API.
    pub data: Option<Value>,
}

impl GalleryImage {
    /// Last path segment of the URL, for sinks that write to disk.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Resolvers a queued reference can be delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelegatedResolver {
    /// The single-gallery resolver.
    Gallery,
}

/// Downstream-directed message naming a gallery URL and the resolver that
/// should process it, rather than being a terminal artifact itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedGallery {
    /// Canonical URL of the gallery.
    pub url: String,
    /// Which resolver the consuming pipeline should hand this reference to.
    pub resolver: DelegatedResolver,
    /// Raw listing payload as returned by the site.
    pub data: Value,
}
