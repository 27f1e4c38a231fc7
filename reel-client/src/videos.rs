//! Video API endpoints

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reel_core::domain::job::Job;
use reel_core::dto::video::{CreateVideo, ListQuery, MAX_LIST_LIMIT, VideoPage};
use reqwest::Method;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::VideoClient;
use crate::download::write_atomically;
use crate::error::{ClientError, Result};
use crate::submission::{encode_create, encode_remix};

const JSON: &str = "application/json";
const MP4: &str = "video/mp4";

impl VideoClient {
    // =============================================================================
    // Job Submission
    // =============================================================================

    /// Submit a new generation job
    ///
    /// The reference file, if any, is classified before the request is built;
    /// an unsupported type fails without touching the network.
    ///
    /// # Returns
    /// The queued job, with a non-empty ID
    pub async fn create_video(&self, req: &CreateVideo, cancel: &CancellationToken) -> Result<Job> {
        let form = encode_create(req).await?;
        let url = self.videos_url();

        debug!("POST {}", url);
        let request = self.request(Method::POST, &url, JSON).multipart(form);
        let response = self.send(request, cancel).await?;

        let job = self.decode_new_job(response, cancel).await?;
        info!("Created video job {}", job.id);
        Ok(job)
    }

    /// Submit a remix of an existing video
    ///
    /// # Arguments
    /// * `video_id` - ID of the finished video to remix
    /// * `prompt` - Description of the change
    pub async fn remix_video(
        &self,
        video_id: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Job> {
        let body = encode_remix(prompt)?;
        let url = self.video_url(video_id, "/remix")?;

        debug!("POST {}", url);
        let request = self
            .request(Method::POST, &url, JSON)
            .json(&body);
        let response = self.send(request, cancel).await?;

        let job = self.decode_new_job(response, cancel).await?;
        info!("Created remix job {} from {}", job.id, video_id);
        Ok(job)
    }

    async fn decode_new_job(
        &self,
        response: reqwest::Response,
        cancel: &CancellationToken,
    ) -> Result<Job> {
        let job: Job = self.handle_response(response, cancel).await?;
        if job.id.trim().is_empty() {
            return Err(ClientError::MalformedResponse(
                "response missing job ID".into(),
            ));
        }
        Ok(job)
    }

    // =============================================================================
    // Job Query
    // =============================================================================

    /// Fetch the current state of a job
    pub async fn get_video(&self, video_id: &str, cancel: &CancellationToken) -> Result<Job> {
        let url = self.video_url(video_id, "")?;

        debug!("GET {}", url);
        let response = self
            .send(self.request(Method::GET, &url, JSON), cancel)
            .await?;

        self.handle_response(response, cancel).await
    }

    /// List videos, one page at a time
    ///
    /// Unset query parameters are left out of the URL; a limit of zero lets
    /// the service pick its default page size.
    pub async fn list_videos(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<VideoPage> {
        if query.limit > MAX_LIST_LIMIT {
            return Err(ClientError::InvalidRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIST_LIMIT
            )));
        }

        let url = self.videos_url();
        debug!("GET {} {:?}", url, query);
        let request = self
            .request(Method::GET, &url, JSON)
            .query(&query.to_query_pairs());
        let response = self.send(request, cancel).await?;

        self.handle_response(response, cancel).await
    }

    // =============================================================================
    // Content
    // =============================================================================

    /// Open the rendered video of a finished job as a byte stream
    pub async fn fetch_content(
        &self,
        video_id: &str,
        cancel: &CancellationToken,
    ) -> Result<impl Stream<Item = Result<Bytes>> + Send + 'static> {
        let url = self.video_url(video_id, "/content")?;

        debug!("GET {}", url);
        let response = self
            .send(self.request(Method::GET, &url, MP4), cancel)
            .await?;

        Ok(response.bytes_stream().map_err(ClientError::from))
    }

    /// Download the rendered video of a finished job to `target`
    ///
    /// The file only appears under `target` once the whole video was written.
    ///
    /// # Returns
    /// The target path
    pub async fn download_video(
        &self,
        video_id: &str,
        target: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let target = target.as_ref();
        let stream = self.fetch_content(video_id, cancel).await?;
        let written = write_atomically(stream, target, cancel).await?;

        info!("Saved {} ({} bytes) to {}", video_id, written, target.display());
        Ok(target.to_path_buf())
    }
}
