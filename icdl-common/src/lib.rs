//! Common data structures shared between the Image Chest extractor crates.
//!
//! Everything a downstream queue or download pipeline needs to consume
//! extractor output lives here, together with re-exports of the crates the
//! whole workspace builds on, so every member uses one coherent version set.

// Public Exports
pub use log;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;

pub mod gallery;
pub mod macros;
