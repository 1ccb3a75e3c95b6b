//! Gallery and user extractors for `https://imgchest.com`
//!
//! Galleries resolve through one of two strategies, picked once when the
//! extractor is built:
//! - without an access token, metadata and images are read from the JSON
//!   document embedded in the rendered gallery page;
//! - with an access token, the authenticated REST API is called instead,
//!   and full per-image metadata survives.
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use icdl_common::{
    client,
    gallery::{DelegatedResolver, GalleryImage, Metadata, QueuedGallery},
    log::debug,
    reqwest::Client,
    serde_json,
    serde_json::{json, Map, Value},
    tokio::{spawn, sync::mpsc::UnboundedSender},
};

use crate::error::ExtractorError;
use crate::extractor::{ExtractorThreadHandle, QueueFetch, ResolveStrategy};
use crate::extractor_config::{ServerConfig, DEFAULT_SERVERS};

mod api;
mod models;
mod page_data;

pub use api::ImagechestApi;

use page_data::page_data;

/// Timestamp format the API uses for post and image creation times.
const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Scalar fields copied verbatim from the embedded page document.
const PAGE_METADATA_FIELDS: [&str; 12] = [
    "id",
    "slug",
    "status",
    "title",
    "nsfw",
    "score",
    "comments",
    "upvotes",
    "downvotes",
    "favorites",
    "views",
    "created",
];

/// Gallery ids are always 11 alphanumeric characters.
fn valid_gallery_id(id: &str) -> bool {
    id.len() == 11 && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn parse_api_date(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    NaiveDateTime::parse_from_str(raw, API_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Main object to resolve a single gallery.
pub struct ImagechestExtractor {
    gallery_id: String,
    gallery_url: String,
    client: Client,
    server_cfg: ServerConfig,
    strategy: Box<dyn ResolveStrategy>,
}

impl ImagechestExtractor {
    /// Sets up the extractor for one gallery id with the default server
    /// definition. Token presence fixes the resolution mode for the whole
    /// lifetime of the extractor.
    pub fn new(gallery_id: &str, access_token: Option<String>) -> Result<Self, ExtractorError> {
        let config = DEFAULT_SERVERS.get("imagechest").unwrap().clone();
        Self::new_with_config(gallery_id, access_token, config)
    }

    pub fn new_with_config(
        gallery_id: &str,
        access_token: Option<String>,
        config: ServerConfig,
    ) -> Result<Self, ExtractorError> {
        if !valid_gallery_id(gallery_id) {
            return Err(ExtractorError::InvalidGalleryId {
                id: gallery_id.to_string(),
            });
        }

        // Use a common client for all connections with a set User-Agent
        let client = client!(config.client_user_agent.clone());

        let strategy: Box<dyn ResolveStrategy> = match access_token {
            Some(token) => {
                debug!("Resolving gallery {gallery_id} through the authenticated API");
                Box::new(ApiResolve {
                    gallery_id: gallery_id.to_string(),
                    api: ImagechestApi::new(&config, token),
                    image_list: None,
                })
            }
            None => {
                debug!("Resolving gallery {gallery_id} from the rendered page");
                Box::new(PageScrape {
                    gallery_id: gallery_id.to_string(),
                })
            }
        };

        Ok(Self {
            gallery_id: gallery_id.to_string(),
            gallery_url: config.gallery_url(gallery_id),
            client,
            server_cfg: config,
            strategy,
        })
    }

    /// The id this extractor was built for.
    #[must_use]
    pub fn gallery_id(&self) -> &str {
        &self.gallery_id
    }

    /// Canonical page URL of the gallery.
    #[must_use]
    pub fn gallery_url(&self) -> &str {
        &self.gallery_url
    }

    /// Returns the used client for external use.
    #[must_use]
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Return the current configured server for this extractor
    #[must_use]
    pub fn config(&self) -> ServerConfig {
        self.server_cfg.clone()
    }

    /// Fetches the gallery page and resolves metadata plus the ordered
    /// image list in one go. The page body is fetched in both modes; the
    /// API strategy ignores its content.
    pub async fn resolve(&mut self) -> Result<(Metadata, Vec<GalleryImage>), ExtractorError> {
        let page = self
            .client
            .get(&self.gallery_url)
            .send()
            .await?
            .text()
            .await?;

        let metadata = self.strategy.metadata(&page).await?;
        let images = self.strategy.images(&page).await?;

        Ok((metadata, images))
    }

    /// Resolves the metadata mapping from an already fetched page body.
    pub async fn metadata(&mut self, page: &str) -> Result<Metadata, ExtractorError> {
        self.strategy.metadata(page).await
    }

    /// Resolves the ordered image list from an already fetched page body.
    pub async fn images(&mut self, page: &str) -> Result<Vec<GalleryImage>, ExtractorError> {
        self.strategy.images(page).await
    }
}

/// Unauthenticated resolution from the JSON document embedded in the
/// rendered gallery page.
struct PageScrape {
    gallery_id: String,
}

#[async_trait]
impl ResolveStrategy for PageScrape {
    async fn metadata(&mut self, page: &str) -> Result<Metadata, ExtractorError> {
        if page.contains("Not Found") {
            return Err(ExtractorError::NotFound);
        }

        let data = page_data(page)?;

        let mut metadata = Map::new();
        metadata.insert("gallery_id".to_string(), json!(self.gallery_id));

        // Each field is looked up on its own; absence skips the field and
        // nothing else.
        for field in PAGE_METADATA_FIELDS {
            if let Some(value) = data.pointer(&format!("/props/post/{field}")) {
                metadata.insert(field.to_string(), value.clone());
            }
        }

        // A missing tag list leaves the key out entirely.
        if let Some(tags) = data.pointer("/props/post/tags").and_then(Value::as_array) {
            let tags: Option<Vec<&str>> = tags.iter().map(Value::as_str).collect();
            if let Some(tags) = tags {
                metadata.insert("tags".to_string(), json!(tags.join(",")));
            }
        }

        Ok(metadata)
    }

    async fn images(&mut self, page: &str) -> Result<Vec<GalleryImage>, ExtractorError> {
        let data = page_data(page)?;

        // A broken file list degrades to an empty gallery. Callers cannot
        // tell the two apart, only the log can.
        let Some(files) = data.pointer("/props/post/files").and_then(Value::as_array) else {
            debug!("No file list in page document of gallery {}", self.gallery_id);
            return Ok(Vec::new());
        };

        let links: Option<Vec<GalleryImage>> = files
            .iter()
            .map(|file| {
                file.get("link")
                    .and_then(Value::as_str)
                    .map(|link| GalleryImage {
                        url: link.to_string(),
                        data: None,
                    })
            })
            .collect();

        Ok(links.unwrap_or_else(|| {
            debug!(
                "Malformed file list in page document of gallery {}",
                self.gallery_id
            );
            Vec::new()
        }))
    }
}

/// Authenticated resolution through the REST API. The image list arrives
/// with the metadata response and is stashed so `images` can pair every
/// link with its full per-image metadata.
struct ApiResolve {
    gallery_id: String,
    api: ImagechestApi,
    image_list: Option<Vec<Value>>,
}

#[async_trait]
impl ResolveStrategy for ApiResolve {
    async fn metadata(&mut self, _page: &str) -> Result<Metadata, ExtractorError> {
        let post = self.api.post(&self.gallery_id).await?;

        let Value::Object(mut post) = post else {
            return Err(ExtractorError::InvalidServerResponse);
        };

        if let Some(date) = post.get("created").and_then(parse_api_date) {
            post.insert("date".to_string(), json!(date));
        }

        let Some(Value::Array(mut images)) = post.remove("images") else {
            return Err(ExtractorError::InvalidServerResponse);
        };

        for img in &mut images {
            if let Some(obj) = img.as_object_mut() {
                if let Some(date) = obj.get("created").and_then(parse_api_date) {
                    obj.insert("date".to_string(), json!(date));
                }
            }
        }

        post.remove("image_count");
        post.insert("gallery_id".to_string(), json!(self.gallery_id));

        self.image_list = Some(images);

        Ok(post)
    }

    async fn images(&mut self, _page: &str) -> Result<Vec<GalleryImage>, ExtractorError> {
        let Some(list) = &self.image_list else {
            return Err(ExtractorError::ImageListPending);
        };

        list.iter()
            .map(|img| {
                let link = img.get("link").and_then(Value::as_str).ok_or_else(|| {
                    ExtractorError::MissingField {
                        field: "link".to_string(),
                    }
                })?;

                Ok(GalleryImage {
                    url: link.to_string(),
                    data: Some(img.clone()),
                })
            })
            .collect()
    }
}

/// Extractor for imgchest.com user profiles.
///
/// Walks the listing endpoint page by page and yields queue references for
/// an external pipeline to route back into [`ImagechestExtractor`]. It
/// never resolves gallery contents itself.
#[derive(Debug, Clone)]
pub struct ImagechestUserExtractor {
    client: Client,
    server_cfg: ServerConfig,
    username: String,
    page: u32,
}

impl ImagechestUserExtractor {
    /// Sets up the listing extractor for one user handle with the default
    /// server definition.
    #[must_use]
    pub fn new(username: &str) -> Self {
        let config = DEFAULT_SERVERS.get("imagechest").unwrap().clone();
        Self::new_with_config(username, config)
    }

    #[must_use]
    pub fn new_with_config(username: &str, config: ServerConfig) -> Self {
        let client = client!(config.client_user_agent.clone());

        // Decoded exactly once, the listing endpoint expects the plain name.
        let username =
            urlencoding::decode(username).map_or_else(|_| username.to_string(), |s| s.into_owned());

        Self {
            client,
            server_cfg: config,
            username,
            page: 1,
        }
    }

    /// The page number the next request will ask for.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.page
    }

    /// Fetches the next listing page.
    ///
    /// Returns `Ok(None)` the first time a response is not valid JSON or
    /// lacks the `data` array; that ends the listing and is not an error.
    /// An empty `data` array does NOT end it: termination depends on the
    /// response shape alone, never on a count.
    pub async fn next_page(&mut self) -> Result<Option<Vec<QueuedGallery>>, ExtractorError> {
        let url = self.server_cfg.listing_url();
        let page = self.page.to_string();

        debug!("Fetching listing page {} of user {}", page, self.username);

        let body = self
            .client
            .get(&url)
            .query(&[
                ("page", page.as_str()),
                ("sort", "new"),
                ("tag", ""),
                ("q", ""),
                ("username", &self.username),
                ("nsfw", "true"),
            ])
            .send()
            .await?
            .text()
            .await?;

        self.page += 1;

        let Ok(listing) = serde_json::from_str::<Value>(&body) else {
            return Ok(None);
        };
        let Some(data) = listing.get("data").and_then(Value::as_array) else {
            return Ok(None);
        };

        let mut galleries = Vec::with_capacity(data.len());

        for gallery in data {
            let link = gallery.get("link").and_then(Value::as_str).ok_or_else(|| {
                ExtractorError::MissingField {
                    field: "link".to_string(),
                }
            })?;

            galleries.push(QueuedGallery {
                url: link.to_string(),
                resolver: DelegatedResolver::Gallery,
                data: gallery.clone(),
            });
        }

        Ok(Some(galleries))
    }
}

#[async_trait]
impl QueueFetch for ImagechestUserExtractor {
    async fn fetch(
        &mut self,
        sender_channel: UnboundedSender<QueuedGallery>,
    ) -> Result<u64, ExtractorError> {
        let mut total_sent = 0_u64;

        while let Some(galleries) = self.next_page().await? {
            for gallery in galleries {
                sender_channel.send(gallery)?;
                total_sent += 1;
            }
        }

        debug!("Listing exhausted after {total_sent} galleries");

        Ok(total_sent)
    }

    fn setup_fetch_thread(
        mut self,
        sender_channel: UnboundedSender<QueuedGallery>,
    ) -> ExtractorThreadHandle {
        spawn(async move { self.fetch(sender_channel).await })
    }
}
