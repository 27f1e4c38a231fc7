//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A video generation job as reported by the remote service
///
/// Every field except `id` and `status` is optional on the wire; absent or
/// null values decode to their empty form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub object: String,
    #[serde(default)]
    pub status: JobStatus,
    /// Raw progress, either a fraction in [0, 1] or a percentage
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "seconds_from_any")]
    pub seconds: Option<u32>,
    /// Output size as "WxH"
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub remixed_from_video_id: Option<String>,
    #[serde(default)]
    pub error: Option<JobError>,
}

impl Job {
    /// Raw progress value, zero when the service did not report one
    pub fn raw_progress(&self) -> f64 {
        self.progress.unwrap_or(0.0)
    }

    /// Creation time, if the service reported a positive timestamp
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Completion time, if the service reported a positive timestamp
    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_at
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Message of the embedded error object, if present and non-empty
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.trim())
            .filter(|m| !m.is_empty())
    }
}

/// Terminal error attached to a failed job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Job status as reported by the service
///
/// The service sends a free-form string. Known labels are matched
/// case-insensitively; anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    InProgress,
    Running,
    Completed,
    Failed,
    /// "canceled", the spelling the service uses
    Canceled,
    /// "cancelled"
    Cancelled,
    Rejected,
    Expired,
    Other(String),
}

/// Coarse lifecycle bucket for a [`JobStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Still queued or rendering; keep polling
    Pending,
    /// Terminal success; content can be fetched
    Succeeded,
    /// Terminal failure; no further transitions
    Failed,
}

impl JobStatus {
    /// Maps a raw status label onto the closed set, ignoring case and
    /// surrounding whitespace
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            "cancelled" => Self::Cancelled,
            "rejected" => Self::Rejected,
            "expired" => Self::Expired,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Other(raw) => raw,
        }
    }

    /// Unknown labels are treated as still pending so that new non-terminal
    /// states introduced by the service do not abort a wait.
    pub fn phase(&self) -> JobPhase {
        match self {
            Self::Completed => JobPhase::Succeeded,
            Self::Failed | Self::Canceled | Self::Cancelled | Self::Rejected | Self::Expired => {
                JobPhase::Failed
            }
            Self::Queued | Self::InProgress | Self::Running | Self::Other(_) => JobPhase::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase() != JobPhase::Pending
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The service reports `seconds` as a string ("4"), older payloads as a number.
fn seconds_from_any<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        Some(Seconds::Number(n)) => Some(n),
        Some(Seconds::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(JobStatus::parse("COMPLETED"), JobStatus::Completed);
        assert_eq!(JobStatus::parse(" In_Progress "), JobStatus::InProgress);
        assert_eq!(JobStatus::parse("Canceled"), JobStatus::Canceled);
        assert_eq!(JobStatus::parse("cancelled"), JobStatus::Cancelled);
    }

    #[test]
    fn test_cancel_spellings_are_kept() {
        assert_eq!(JobStatus::parse("canceled").to_string(), "canceled");
        assert_eq!(JobStatus::parse("cancelled").to_string(), "cancelled");

        let job: Job = serde_json::from_str(r#"{"id": "video_9", "status": "canceled"}"#).unwrap();
        assert_eq!(job.status.as_str(), "canceled");
        assert!(job.status.is_terminal());
    }

    #[test]
    fn test_status_phases() {
        for label in ["queued", "in_progress", "running"] {
            assert_eq!(JobStatus::parse(label).phase(), JobPhase::Pending);
        }
        assert_eq!(JobStatus::parse("completed").phase(), JobPhase::Succeeded);
        for label in ["failed", "canceled", "cancelled", "rejected", "expired"] {
            assert_eq!(JobStatus::parse(label).phase(), JobPhase::Failed, "{label}");
        }
    }

    #[test]
    fn test_unknown_status_is_pending() {
        let status = JobStatus::parse("moderating");
        assert_eq!(status, JobStatus::Other("moderating".to_string()));
        assert_eq!(status.phase(), JobPhase::Pending);
        assert_eq!(status.to_string(), "moderating");
    }

    #[test]
    fn test_job_deserialize_full() {
        let job: Job = serde_json::from_str(
            r#"{
                "id": "video_123",
                "object": "video",
                "status": "failed",
                "progress": 0.42,
                "model": "sora-2",
                "seconds": "8",
                "size": "1280x720",
                "created_at": 1712697600,
                "completed_at": null,
                "error": {"message": "quota exceeded", "type": "billing", "code": "quota"}
            }"#,
        )
        .unwrap();

        assert_eq!(job.id, "video_123");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.seconds, Some(8));
        assert_eq!(job.size.as_deref(), Some("1280x720"));
        assert!(job.created_at_utc().is_some());
        assert!(job.completed_at_utc().is_none());
        assert_eq!(job.error_message(), Some("quota exceeded"));
        assert_eq!(job.error.unwrap().kind.as_deref(), Some("billing"));
    }

    #[test]
    fn test_job_deserialize_sparse() {
        let job: Job = serde_json::from_str(r#"{"status": "queued", "seconds": 4}"#).unwrap();
        assert!(job.id.is_empty());
        assert_eq!(job.seconds, Some(4));
        assert_eq!(job.raw_progress(), 0.0);
        assert!(job.created_at_utc().is_none());
    }

    #[test]
    fn test_zero_timestamp_is_unknown() {
        let job = Job {
            created_at: Some(0),
            ..Default::default()
        };
        assert!(job.created_at_utc().is_none());
    }

    #[test]
    fn test_blank_error_message_is_none() {
        let job = Job {
            error: Some(JobError {
                message: "  ".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(job.error_message(), None);
    }
}
