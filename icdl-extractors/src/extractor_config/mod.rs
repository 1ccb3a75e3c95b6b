use icdl_common::serde;
use icdl_common::serde::{Deserialize, Serialize};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Display;

pub(crate) const CLIENT_UA_NAME: &str = "Rust Imagechest Downloader";
pub(crate) const EXTRACTOR_UA_NAME: &str = "Rust Imagechest Gallery Extractor";

pub(crate) const DEFAULT_CLI_UA: &str =
    concat!("Rust Imagechest Downloader/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_EXT_UA: &str = concat!(
    "Rust Imagechest Gallery Extractor/",
    env!("CARGO_PKG_VERSION")
);

pub mod serialize;

pub static DEFAULT_SERVERS: Lazy<HashMap<String, ServerConfig>> = Lazy::new(|| {
    let mut hmap = HashMap::with_capacity(1);
    hmap.insert("imagechest".to_string(), ServerConfig::default());
    hmap
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ServerConfig {
    pub name: String,
    pub pretty_name: String,
    pub client_user_agent: String,
    pub extractor_user_agent: String,
    pub base_url: String,
    pub post_list_url: Option<String>,
    pub api_url: Option<String>,
}

impl ServerConfig {
    /// Canonical page URL for a gallery id.
    #[inline]
    #[must_use]
    pub fn gallery_url(&self, gallery_id: &str) -> String {
        format!("{}/p/{}", self.base_url, gallery_id)
    }

    /// Listing endpoint used for user searches.
    #[inline]
    #[must_use]
    pub fn listing_url(&self) -> String {
        self.post_list_url
            .clone()
            .unwrap_or_else(|| format!("{}/api/posts", self.base_url))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: String::from("imagechest"),
            pretty_name: String::from("Image Chest"),
            client_user_agent: DEFAULT_CLI_UA.to_string(),
            extractor_user_agent: DEFAULT_EXT_UA.to_string(),
            base_url: String::from("https://imgchest.com"),
            post_list_url: Some(String::from("https://imgchest.com/api/posts")),
            api_url: Some(String::from("https://api.imgchest.com")),
        }
    }
}

impl Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
