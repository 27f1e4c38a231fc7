//! Client configuration
//!
//! Everything the client needs to reach the service and to pace a job wait.
//! The struct is built once at startup by the caller; the client never reads
//! the process environment itself.

use reel_core::domain::progress::UnitBoundary;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default service address
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Configuration for [`crate::VideoClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token sent on every request
    pub api_key: String,

    /// Base URL of the service (e.g., "https://api.openai.com")
    pub base_url: String,

    /// Sent as `OpenAI-Organization` when set
    pub organization: Option<String>,

    /// Sent as `OpenAI-Project` when set
    pub project: Option<String>,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Delay between two status checks while waiting on a job
    pub poll_interval: Duration,

    /// Upper bound on the whole wait for a job to finish
    pub max_wait: Duration,

    /// Upper bound on fetching one page of the video listing
    pub list_timeout: Duration,

    /// How a raw progress of exactly 1.0 is read
    pub progress_boundary: UnitBoundary,
}

impl ClientConfig {
    /// Creates a configuration with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            project: None,
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(30 * 60),
            list_timeout: Duration::from_secs(2 * 60),
            progress_boundary: UnitBoundary::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Blank values are ignored
    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = non_blank(organization);
        self
    }

    /// Blank values are ignored
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = non_blank(project);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    pub fn with_progress_boundary(mut self, boundary: UnitBoundary) -> Self {
        self.progress_boundary = boundary;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::InvalidRequest("API key cannot be empty".into()));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::InvalidRequest(
                "base URL must start with http:// or https://".into(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(ClientError::InvalidRequest(
                "poll interval must be greater than 0".into(),
            ));
        }

        if self.max_wait.is_zero() {
            return Err(ClientError::InvalidRequest(
                "max wait must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("max_wait", &self.max_wait)
            .field("list_timeout", &self.list_timeout)
            .field("progress_boundary", &self.progress_boundary)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
