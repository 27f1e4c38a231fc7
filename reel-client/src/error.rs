//! Error types for the Reel client

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while driving a video job
#[derive(Debug, Error)]
pub enum ClientError {
    /// Attachment content type is not one the service accepts
    #[error("unsupported reference file type; supported types: {}", supported.join(", "))]
    UnsupportedAttachmentType {
        /// Canonical types the service accepts
        supported: Vec<String>,
    },

    /// API returned a non-2xx status code
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// 2xx response that is missing required data
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Job reached a terminal failure state
    #[error("{}", describe_job_failure(status, message))]
    JobFailed {
        /// Terminal status label
        status: String,
        /// Message from the job's error object, or a generic one
        message: String,
    },

    /// Overall deadline elapsed
    #[error("timed out waiting for the video job")]
    Timeout,

    /// Caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// Local file operation failed
    #[error("{op} {}: {source}", path.display())]
    Io {
        /// Operation that failed, e.g. "open reference"
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the operation and path it concerns
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Validation failures that the user can fix by entering something else
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedAttachmentType { .. } | Self::InvalidRequest(_)
        )
    }
}

/// "job failed: <reason>", or just the message when it is the generic one
fn describe_job_failure(status: &str, message: &str) -> String {
    if message == format!("job {}", status) {
        message.to_string()
    } else {
        format!("job {}: {}", status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(ClientError::api_error(404, "missing").is_not_found());
        assert!(ClientError::api_error(429, "slow down").is_client_error());
        assert!(ClientError::api_error(503, "busy").is_server_error());
        assert!(!ClientError::Timeout.is_client_error());
    }

    #[test]
    fn test_display_messages() {
        let err = ClientError::UnsupportedAttachmentType {
            supported: vec!["image/jpeg".into(), "video/mp4".into()],
        };
        assert_eq!(
            err.to_string(),
            "unsupported reference file type; supported types: image/jpeg, video/mp4"
        );

        let err = ClientError::JobFailed {
            status: "failed".into(),
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "job failed: quota exceeded");

        let err = ClientError::JobFailed {
            status: "expired".into(),
            message: "job expired".into(),
        };
        assert_eq!(err.to_string(), "job expired");
        assert_eq!(
            ClientError::api_error(400, "bad prompt").to_string(),
            "API error (400): bad prompt"
        );
    }

    #[test]
    fn test_io_context() {
        let err = ClientError::io(
            "open reference",
            "/tmp/missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.to_string(), "open reference /tmp/missing.png: no such file");
        assert!(!err.is_recoverable());
    }
}
