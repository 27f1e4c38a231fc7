//! Reel HTTP Client
//!
//! Drives a video generation job against the remote video service: submit a
//! creation or remix request, wait for the job to finish, and download the
//! rendered video to disk.
//!
//! # Example
//!
//! ```no_run
//! use reel_client::{ClientConfig, JobPoller, VideoClient};
//! use reel_core::dto::video::CreateVideo;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reel_client::ClientError> {
//!     let client = VideoClient::new(ClientConfig::new("sk-..."))?;
//!     let cancel = CancellationToken::new();
//!
//!     let job = client
//!         .create_video(&CreateVideo::new("a paper boat in the rain").with_seconds(4), &cancel)
//!         .await?;
//!
//!     let poller = JobPoller::from_config(&client, client.config());
//!     let job = poller
//!         .wait_for_completion(&job.id, &cancel, |update| println!("{}", update))
//!         .await?;
//!
//!     client.download_video(&job.id, "video.mp4", &cancel).await?;
//!     Ok(())
//! }
//! ```

pub mod attachment;
pub mod config;
pub mod download;
pub mod error;
pub mod poller;
pub mod submission;
mod videos;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use poller::{JobPoller, StatusSource, StatusUpdate};

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Path prefix of every video endpoint
pub const VIDEOS_PATH: &str = "/v1/videos";

/// HTTP client for the video service API
///
/// One instance serves every call of a job (create, status, content) and
/// reuses pooled connections between them.
#[derive(Debug, Clone)]
pub struct VideoClient {
    config: ClientConfig,
    /// HTTP client instance
    client: Client,
}

impl VideoClient {
    /// Create a new client from a validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_client(config, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(config: ClientConfig, client: Client) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config: ClientConfig { base_url, ..config },
            client,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn videos_url(&self) -> String {
        format!("{}{}", self.config.base_url, VIDEOS_PATH)
    }

    fn video_url(&self, video_id: &str, suffix: &str) -> Result<String> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(ClientError::InvalidRequest("video ID cannot be empty".into()));
        }
        Ok(format!("{}/{}{}", self.videos_url(), video_id, suffix))
    }

    /// Start a request with authorization and account headers attached
    fn request(&self, method: Method, url: &str, accept: &'static str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, HeaderValue::from_static(accept));

        if let Some(org) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.config.project {
            builder = builder.header("OpenAI-Project", project);
        }

        builder
    }

    /// Send a request, giving up as soon as `cancel` fires
    async fn send(&self, request: RequestBuilder, cancel: &CancellationToken) -> Result<Response> {
        let response = cancellable(cancel, async { Ok(request.send().await?) }).await?;
        ensure_success(response, cancel).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Deserialize a successful JSON response
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let body = cancellable(cancel, async { Ok(response.bytes().await?) }).await?;

        serde_json::from_slice(&body).map_err(|e| {
            ClientError::MalformedResponse(format!("failed to parse JSON response: {}", e))
        })
    }
}

/// Pass successful responses through; turn anything else into an API error
async fn ensure_success(response: Response, cancel: &CancellationToken) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match cancellable(cancel, async { Ok(response.text().await?) }).await {
        Ok(body) => api_error_message(&body),
        Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
        Err(e) => e.to_string(),
    };

    tracing::debug!("Request failed with status {}: {}", status, message);
    Err(ClientError::api_error(status.as_u16(), message))
}

/// Extract a readable message from an error response body
///
/// Prefers `error.message` from a JSON body, then the raw trimmed text, then
/// "unknown error" for an empty body.
pub(crate) fn api_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "unknown error".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .get("error")?
                .get("message")?
                .as_str()
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| trimmed.to_string())
}

/// Run `fut` unless `cancel` fires first
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("sk-test").with_base_url("http://localhost:8080")
    }

    #[test]
    fn test_client_creation() {
        let client = VideoClient::new(config()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let mut config = config();
        config.base_url = "http://localhost:8080/".to_string();
        let client = VideoClient::with_client(config, Client::new());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        assert!(VideoClient::new(ClientConfig::new("")).is_err());
    }

    #[test]
    fn test_video_urls() {
        let client = VideoClient::new(config()).unwrap();
        assert_eq!(
            client.video_url("video_1", "/content").unwrap(),
            "http://localhost:8080/v1/videos/video_1/content"
        );
        assert!(client.video_url("  ", "").is_err());
    }

    #[test]
    fn test_error_message_from_json() {
        let body = r#"{"error": {"message": "Invalid size", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Invalid size");
    }

    #[test]
    fn test_error_message_empty_body() {
        assert_eq!(api_error_message(""), "unknown error");
        assert_eq!(api_error_message(" \n "), "unknown error");
    }

    #[test]
    fn test_error_message_raw_text() {
        assert_eq!(api_error_message("  Bad Gateway\n"), "Bad Gateway");
        assert_eq!(api_error_message(r#"{"detail": "nope"}"#), r#"{"detail": "nope"}"#);
        assert_eq!(
            api_error_message(r#"{"error": {"message": ""}}"#),
            r#"{"error": {"message": ""}}"#
        );
    }

    #[tokio::test]
    async fn test_cancellable_prefers_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<()> = cancellable(&cancel, std::future::pending()).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
