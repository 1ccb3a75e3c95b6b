//! Extraction of the JSON document embedded in rendered gallery pages.
//!
//! The site inlines its page state as an entity-escaped HTML attribute
//! value (`data-page="..."`). Extraction unescapes the attribute value and
//! decodes it as JSON.
use html_escape::decode_html_entities;
use icdl_common::serde_json::{json, Value};

use crate::error::ExtractorError;

const PAGE_DATA_BEGIN: &str = "data-page=\"";

/// Decode the embedded page-state document out of a raw HTML body.
///
/// A body without the marker (or with an unterminated attribute) yields an
/// empty JSON object. Malformed JSON at a found marker is fatal and
/// propagated to the caller.
pub fn page_data(page: &str) -> Result<Value, ExtractorError> {
    let Some(start) = page.find(PAGE_DATA_BEGIN) else {
        return Ok(json!({}));
    };

    let rest = &page[start + PAGE_DATA_BEGIN.len()..];

    let Some(end) = rest.find('"') else {
        return Ok(json!({}));
    };

    let unescaped = decode_html_entities(&rest[..end]);

    Ok(icdl_common::serde_json::from_str(&unescaped)?)
}
