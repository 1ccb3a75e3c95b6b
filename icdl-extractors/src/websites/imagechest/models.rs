use icdl_common::serde::{self, Deserialize};
use icdl_common::serde_json::Value;

/// Envelope of every authenticated API response.
///
/// The payload stays a raw [`Value`]: the API passes through whatever
/// fields the server sends and the resolver forwards them unmodified.
#[derive(Debug, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ApiResponse {
    pub data: Value,
}
