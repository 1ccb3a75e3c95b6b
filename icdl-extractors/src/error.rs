use icdl_common::gallery::QueuedGallery;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

/// Enumerates the possible errors that can arise during extractor operations.
///
/// This error type consolidates issues from the two resolution strategies,
/// the authenticated API client and the user-listing paginator.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The gallery page body contained the site's "Not Found" marker.
    /// Detection is a substring heuristic on the rendered page, not a
    /// structured signal.
    #[error("Gallery not found")]
    NotFound,

    /// The API answered a request with a redirect-range status code.
    /// With redirects disabled, this is how an invalid or expired access
    /// token surfaces. Terminal, never retried.
    #[error("Invalid API access token")]
    AuthenticationFailure,

    /// The API kept answering 429 after the configured number of retries.
    /// Only reachable when a finite retry ceiling is set; the default
    /// policy retries without bound.
    #[error("API rate limit still active after {retries} retries")]
    RateLimitExceeded { retries: u32 },

    /// The API returned a status that is neither success, redirect nor
    /// rate limit. The raw body is logged at debug level before this is
    /// raised. Terminal, never retried.
    #[error("API request failed")]
    StopExtraction,

    /// The supplied gallery id is not 11 alphanumeric characters.
    #[error("Invalid gallery id: {id}")]
    InvalidGalleryId { id: String },

    /// The server returned a response that could not be understood or was
    /// not in the expected shape (e.g. an API post payload without its
    /// image list).
    #[error("Server returned an invalid response")]
    InvalidServerResponse,

    /// A listing element or API image is missing an essential field.
    /// `field` indicates the name of the missing field.
    #[error("Entry is missing an essential field {field}")]
    MissingField { field: String },

    /// `images` was called on an API-mode resolver before `metadata` had
    /// stashed the image list.
    #[error("Image list is not available before metadata resolution")]
    ImageListPending,

    /// An error occurred during a network request (e.g. connection timeout,
    /// DNS resolution failure). Wraps an underlying `reqwest::Error`.
    #[error("Connection Error")]
    ConnectionError(#[from] reqwest::Error),

    /// An error occurred while deserializing a JSON document.
    /// Wraps an underlying `serde_json::Error`.
    #[error("Error while deserializing JSON")]
    JsonSerializeFail(#[from] serde_json::Error),

    /// Failed to send a queued gallery reference through an asynchronous
    /// (`tokio::sync::mpsc`) channel to the consuming pipeline.
    #[error("Failed to send gallery reference through channel")]
    ChannelSendFail(#[from] SendError<QueuedGallery>),
}
