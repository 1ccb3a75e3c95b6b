//! Interface for the Image Chest API
//!
//! <https://imgchest.com/docs/api/1.0/general/overview>
use icdl_common::{log::debug, serde_json, serde_json::Value};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

use super::models::ApiResponse;
use crate::error::ExtractorError;
use crate::extractor_config::ServerConfig;

const API_ROOT: &str = "https://api.imgchest.com";

/// How long a 429 response suspends the call before resubmission.
const RATE_LIMIT_WAIT: Duration = Duration::from_secs(600);

/// Authenticated REST client for the versioned API endpoints.
///
/// Holds only its bound token and base URL; safe for sequential reuse. A
/// single logical call may perform multiple round-trips and suspend for
/// multiples of the rate-limit wait before returning or failing.
#[derive(Debug, Clone)]
pub struct ImagechestApi {
    client: Client,
    root: String,
    access_token: String,
    rate_limit_wait: Duration,
    retry_limit: Option<u32>,
}

impl ImagechestApi {
    /// Binds a client to an access token. Redirects stay disabled so auth
    /// failures surface as status codes instead of followed hops.
    #[must_use]
    pub fn new(config: &ServerConfig, access_token: String) -> Self {
        let client = Client::builder()
            .user_agent(config.extractor_user_agent.clone())
            .redirect(Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            root: config
                .api_url
                .clone()
                .unwrap_or_else(|| API_ROOT.to_string()),
            access_token,
            rate_limit_wait: RATE_LIMIT_WAIT,
            retry_limit: None,
        }
    }

    /// Overrides how long a rate-limited call sleeps before retrying.
    #[must_use]
    pub fn rate_limit_wait(mut self, wait: Duration) -> Self {
        self.rate_limit_wait = wait;
        self
    }

    /// Caps how often a single call may be resubmitted after 429 responses.
    /// `None` retries without bound.
    #[must_use]
    pub fn retry_limit(mut self, limit: Option<u32>) -> Self {
        self.retry_limit = limit;
        self
    }

    pub async fn file(&self, file_id: &str) -> Result<Value, ExtractorError> {
        self.call(&format!("/v1/file/{file_id}")).await
    }

    pub async fn post(&self, post_id: &str) -> Result<Value, ExtractorError> {
        self.call(&format!("/v1/post/{post_id}")).await
    }

    pub async fn user(&self, username: &str) -> Result<Value, ExtractorError> {
        self.call(&format!("/v1/user/{username}")).await
    }

    async fn call(&self, endpoint: &str) -> Result<Value, ExtractorError> {
        let url = format!("{}{}", self.root, endpoint);

        let mut retries = 0_u32;

        loop {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() < 300 {
                let body = response.text().await?;
                let parsed: ApiResponse = serde_json::from_str(&body)?;
                return Ok(parsed.data);
            }

            if status.is_redirection() {
                return Err(ExtractorError::AuthenticationFailure);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                // Classified on the status line alone; the body is never read.
                if let Some(limit) = self.retry_limit {
                    if retries >= limit {
                        return Err(ExtractorError::RateLimitExceeded { retries: limit });
                    }
                }
                retries += 1;

                debug!(
                    "Rate limited on {}, waiting {}s before resubmitting",
                    url,
                    self.rate_limit_wait.as_secs()
                );
                sleep(self.rate_limit_wait).await;
                continue;
            }

            debug!("{}", response.text().await.unwrap_or_default());
            return Err(ExtractorError::StopExtraction);
        }
    }
}

#[cfg(test)]
mod test {
    use super::ImagechestApi;
    use crate::error::ExtractorError;
    use crate::extractor_config::ServerConfig;
    use icdl_common::serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_api(uri: &str, token: &str) -> ImagechestApi {
        let config = ServerConfig {
            api_url: Some(uri.to_string()),
            ..ServerConfig::default()
        };
        ImagechestApi::new(&config, token.to_string())
    }

    #[tokio::test]
    async fn success_returns_data_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/post/abcdefghijk"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "abcdefghijk"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = mock_api(&server.uri(), "secret-token");
        let data = api.post("abcdefghijk").await.unwrap();

        assert_eq!(data["id"], json!("abcdefghijk"));
    }

    #[tokio::test]
    async fn rate_limit_waits_once_then_retries_identical_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/post/abcdefghijk"))
            .respond_with(ResponseTemplate::new(429).set_body_string("not json"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/post/abcdefghijk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
            .expect(1)
            .mount(&server)
            .await;

        let api = mock_api(&server.uri(), "t").rate_limit_wait(Duration::from_millis(5));
        let data = api.post("abcdefghijk").await.unwrap();

        assert_eq!(data["ok"], json!(true));
    }

    #[tokio::test]
    async fn redirect_is_invalid_token_with_zero_retries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/user/someone"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
            .expect(1)
            .mount(&server)
            .await;

        let api = mock_api(&server.uri(), "t");
        let result = api.user("someone").await;

        assert!(matches!(result, Err(ExtractorError::AuthenticationFailure)));
    }

    #[tokio::test]
    async fn other_status_is_terminal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/file/somefile"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let api = mock_api(&server.uri(), "t");
        let result = api.file("somefile").await;

        assert!(matches!(result, Err(ExtractorError::StopExtraction)));
    }

    #[tokio::test]
    async fn finite_retry_ceiling_is_honored() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/post/abcdefghijk"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let api = mock_api(&server.uri(), "t")
            .rate_limit_wait(Duration::from_millis(1))
            .retry_limit(Some(1));
        let result = api.post("abcdefghijk").await;

        assert!(matches!(
            result,
            Err(ExtractorError::RateLimitExceeded { retries: 1 })
        ));
    }
}
