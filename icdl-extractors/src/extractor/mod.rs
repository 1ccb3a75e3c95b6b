//! Capability traits shared by the website extractor modules.
//!
//! # Extractors
//!
//! A gallery extractor resolves one gallery id into a metadata mapping and
//! an ordered image list. The work happens behind [`ResolveStrategy`]: one
//! implementation scrapes the JSON document embedded in the rendered page,
//! the other calls the authenticated REST API. The strategy is picked once
//! at construction and never swapped afterwards.
use async_trait::async_trait;
use icdl_common::{
    gallery::{GalleryImage, Metadata, QueuedGallery},
    tokio::{sync::mpsc::UnboundedSender, task::JoinHandle},
};

use crate::error::ExtractorError;

pub type ExtractorThreadHandle = JoinHandle<Result<u64, ExtractorError>>;

/// One way of turning a fetched gallery page into metadata and images.
///
/// Both methods receive the raw gallery page body. Strategies backed by the
/// API are free to ignore it; it is still passed so a resolver always runs
/// one code path.
#[async_trait]
pub trait ResolveStrategy: Send {
    /// Resolve the gallery's metadata mapping.
    async fn metadata(&mut self, page: &str) -> Result<Metadata, ExtractorError>;

    /// Resolve the gallery's ordered image list.
    ///
    /// Must be called after [`metadata`](ResolveStrategy::metadata) on the
    /// same instance; strategies may stash state between the two calls.
    async fn images(&mut self, page: &str) -> Result<Vec<GalleryImage>, ExtractorError>;
}

/// Capability for a listing extractor to send queued gallery references
/// through an [`unbounded_channel`](icdl_common::tokio::sync::mpsc::unbounded_channel)
/// to another task.
#[async_trait]
pub trait QueueFetch {
    /// Walks the listing page by page until exhaustion, sending each
    /// reference through the channel. Returns how many were sent.
    async fn fetch(
        &mut self,
        sender_channel: UnboundedSender<QueuedGallery>,
    ) -> Result<u64, ExtractorError>;

    /// High-level convenience thread builder for [`fetch`](QueueFetch::fetch)
    fn setup_fetch_thread(
        self,
        sender_channel: UnboundedSender<QueuedGallery>,
    ) -> ExtractorThreadHandle;
}
