//! Job poller
//!
//! Waits for a submitted job to reach a terminal state. The job status is
//! fetched on a fixed interval; a status line is reported only when the
//! status or the normalized progress differs from the previous check. The
//! whole wait is bounded by a deadline and can be cancelled at any point.

use async_trait::async_trait;
use reel_core::domain::job::{Job, JobPhase, JobStatus};
use reel_core::domain::progress::UnitBoundary;
use std::fmt;
use std::sync::Arc;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::{VideoClient, cancellable};

/// Anything that can report the current state of a job
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches a fresh copy of the job
    async fn fetch_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<Job>;
}

#[async_trait]
impl StatusSource for VideoClient {
    async fn fetch_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<Job> {
        self.get_video(job_id, cancel).await
    }
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for &T {
    async fn fetch_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<Job> {
        (**self).fetch_status(job_id, cancel).await
    }
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn fetch_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<Job> {
        (**self).fetch_status(job_id, cancel).await
    }
}

/// An observable change in a job's status or progress
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub job_id: String,
    pub status: JobStatus,
    /// Progress on the 0-100 scale
    pub progress: f64,
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status: {} ({:.0}%)", self.status, self.progress)
    }
}

/// Remembers the last reported state so unchanged checks stay silent
#[derive(Debug, Default)]
struct ChangeTracker {
    last: Option<(JobStatus, f64)>,
}

impl ChangeTracker {
    /// Records the new state; true if it differs from the previous one
    fn observe(&mut self, status: &JobStatus, progress: f64) -> bool {
        let changed = match &self.last {
            Some((last_status, last_progress)) => {
                last_status != status || *last_progress != progress
            }
            None => true,
        };
        if changed {
            self.last = Some((status.clone(), progress));
        }
        changed
    }
}

/// Polls a [`StatusSource`] until a job finishes
pub struct JobPoller<S> {
    source: S,
    interval: Duration,
    max_wait: Duration,
    boundary: UnitBoundary,
}

impl<S: StatusSource> JobPoller<S> {
    /// Creates a poller with a 5 second interval and a 30 minute deadline
    pub fn new(source: S) -> Self {
        Self {
            source,
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(30 * 60),
            boundary: UnitBoundary::default(),
        }
    }

    /// Creates a poller paced by the client configuration
    pub fn from_config(source: S, config: &ClientConfig) -> Self {
        Self {
            source,
            interval: config.poll_interval,
            max_wait: config.max_wait,
            boundary: config.progress_boundary,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_boundary(mut self, boundary: UnitBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Waits until the job completes
    ///
    /// The first check happens one interval after the call. `on_change` is
    /// invoked for every check whose status or progress differs from the
    /// previous one, including the first.
    ///
    /// # Errors
    /// * `JobFailed` if the job ends in a failure state
    /// * `Timeout` if the deadline passes first
    /// * `Cancelled` if `cancel` fires first
    /// * any error from fetching the status, unchanged
    pub async fn wait_for_completion<F>(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
        mut on_change: F,
    ) -> Result<Job>
    where
        F: FnMut(&StatusUpdate),
    {
        info!(
            "Waiting for job {} (interval: {:?}, deadline: {:?})",
            job_id, self.interval, self.max_wait
        );

        let deadline = Instant::now() + self.max_wait;
        match time::timeout_at(deadline, self.poll(job_id, cancel, &mut on_change)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Job {} did not finish within {:?}", job_id, self.max_wait);
                Err(ClientError::Timeout)
            }
        }
    }

    async fn poll<F>(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
        on_change: &mut F,
    ) -> Result<Job>
    where
        F: FnMut(&StatusUpdate),
    {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tracker = ChangeTracker::default();

        loop {
            cancellable(cancel, async {
                ticker.tick().await;
                Ok(())
            })
            .await?;

            let job = self.source.fetch_status(job_id, cancel).await?;
            let progress = self.boundary.normalize(job.raw_progress());

            if tracker.observe(&job.status, progress) {
                debug!("Job {} is {} ({:.0}%)", job_id, job.status, progress);
                on_change(&StatusUpdate {
                    job_id: job_id.to_string(),
                    status: job.status.clone(),
                    progress,
                });
            }

            match job.status.phase() {
                JobPhase::Succeeded => {
                    info!("Job {} completed", job_id);
                    return Ok(job);
                }
                JobPhase::Failed => {
                    let err = failure(&job);
                    warn!("Job {} ended: {}", job_id, err);
                    return Err(err);
                }
                JobPhase::Pending => {}
            }
        }
    }
}

fn failure(job: &Job) -> ClientError {
    let status = job.status.to_string();
    let message = job
        .error_message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("job {}", status));

    ClientError::JobFailed { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::domain::job::JobError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed sequence of jobs; repeats the last one when exhausted
    struct ScriptedSource {
        script: Mutex<VecDeque<Job>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(steps: &[(&str, f64)]) -> Self {
            let script = steps
                .iter()
                .map(|(status, progress)| job(status, *progress))
                .collect();
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_jobs(jobs: Vec<Job>) -> Self {
            Self {
                script: Mutex::new(jobs.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, _job_id: &str, _cancel: &CancellationToken) -> Result<Job> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                Ok(script.pop_front().unwrap())
            } else {
                Ok(script.front().cloned().unwrap())
            }
        }
    }

    struct FailingSource;

    #[async_trait]
    impl StatusSource for FailingSource {
        async fn fetch_status(&self, _job_id: &str, _cancel: &CancellationToken) -> Result<Job> {
            Err(ClientError::api_error(500, "upstream unavailable"))
        }
    }

    fn job(status: &str, progress: f64) -> Job {
        Job {
            id: "video_1".to_string(),
            status: JobStatus::parse(status),
            progress: Some(progress),
            ..Default::default()
        }
    }

    fn fast<S: StatusSource>(source: S) -> JobPoller<S> {
        JobPoller::new(source)
            .with_interval(Duration::from_millis(1))
            .with_max_wait(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_reports_each_change_and_completes() {
        let source = ScriptedSource::new(&[
            ("queued", 0.1),
            ("queued", 0.3),
            ("in_progress", 0.6),
            ("completed", 1.0),
        ]);
        let poller = fast(&source);

        let mut updates = Vec::new();
        let job = poller
            .wait_for_completion("video_1", &CancellationToken::new(), |u| {
                updates.push(u.clone())
            })
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(source.calls(), 4);
        let seen: Vec<_> = updates
            .iter()
            .map(|u| (u.status.as_str().to_string(), u.progress.round() as i64))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("queued".to_string(), 10),
                ("queued".to_string(), 30),
                ("in_progress".to_string(), 60),
                ("completed".to_string(), 100),
            ]
        );
    }

    #[tokio::test]
    async fn test_unchanged_checks_are_silent() {
        let source = ScriptedSource::new(&[
            ("queued", 0.0),
            ("queued", 0.0),
            ("QUEUED", 0.0),
            ("in_progress", 0.0),
            ("in_progress", 0.5),
            ("in_progress", 0.5),
            ("completed", 1.0),
        ]);
        let poller = fast(&source);

        let mut updates = Vec::new();
        poller
            .wait_for_completion("video_1", &CancellationToken::new(), |u| {
                updates.push(u.to_string())
            })
            .await
            .unwrap();

        assert_eq!(source.calls(), 7);
        assert_eq!(
            updates,
            vec![
                "Status: queued (0%)",
                "Status: in_progress (0%)",
                "Status: in_progress (50%)",
                "Status: completed (100%)",
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_carries_embedded_message() {
        let mut failed = job("failed", 0.4);
        failed.error = Some(JobError {
            message: "quota exceeded".to_string(),
            ..Default::default()
        });
        let source = ScriptedSource::with_jobs(vec![job("queued", 0.0), failed]);

        let err = fast(&source)
            .wait_for_completion("video_1", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        match err {
            ClientError::JobFailed { status, message } => {
                assert_eq!(status, "failed");
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_without_error_object() {
        for label in ["canceled", "rejected", "Expired"] {
            let source = ScriptedSource::new(&[(label, 0.0)]);
            let err = fast(&source)
                .wait_for_completion("video_1", &CancellationToken::new(), |_| {})
                .await
                .unwrap_err();

            match err {
                ClientError::JobFailed { status, message } => {
                    assert_eq!(message, format!("job {}", status));
                }
                other => panic!("unexpected error for {label}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_service_spelling() {
        let source = ScriptedSource::new(&[("canceled", 0.0)]);
        let err = fast(&source)
            .wait_for_completion("video_1", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            ClientError::JobFailed { status, message }
                if status == "canceled" && message == "job canceled"
        ));
        assert_eq!(err.to_string(), "job canceled");
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let source = ScriptedSource::new(&[("moderating", 0.0), ("completed", 1.0)]);
        let job = fast(&source)
            .wait_for_completion("video_1", &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_deadline_yields_timeout() {
        let source = ScriptedSource::new(&[("in_progress", 0.2)]);
        let poller = JobPoller::new(&source)
            .with_interval(Duration::from_millis(5))
            .with_max_wait(Duration::from_millis(40));

        let err = poller
            .wait_for_completion("video_1", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout));
        assert!(source.calls() >= 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_waiting() {
        let source = ScriptedSource::new(&[("queued", 0.0)]);
        let poller = JobPoller::new(&source).with_interval(Duration::from_secs(60));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = poller
            .wait_for_completion("video_1", &cancel, |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_wait() {
        let err = fast(FailingSource)
            .wait_for_completion("video_1", &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_percent_boundary_policy() {
        let source = ScriptedSource::new(&[("in_progress", 1.0), ("completed", 100.0)]);
        let poller = fast(&source).with_boundary(UnitBoundary::Percent);

        let mut progress = Vec::new();
        poller
            .wait_for_completion("video_1", &CancellationToken::new(), |u| {
                progress.push(u.progress)
            })
            .await
            .unwrap();

        assert_eq!(progress, vec![1.0, 100.0]);
    }

    #[test]
    fn test_change_tracker() {
        let mut tracker = ChangeTracker::default();
        assert!(tracker.observe(&JobStatus::Queued, 0.0));
        assert!(!tracker.observe(&JobStatus::Queued, 0.0));
        assert!(tracker.observe(&JobStatus::Queued, 5.0));
        assert!(tracker.observe(&JobStatus::Running, 5.0));
    }
}
