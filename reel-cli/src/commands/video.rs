//! Video command handlers
//!
//! Status and download commands, plus the helpers shared by every command
//! that submits a job and waits for its video.

use anyhow::{Context, Result};
use colored::*;
use reel_client::{JobPoller, StatusUpdate, VideoClient};
use reel_core::domain::job::{Job, JobPhase, JobStatus};
use reel_core::domain::progress::normalize_progress;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::signal::Interrupts;

/// Build a client for the configured service
pub fn connect(config: &Config) -> Result<VideoClient> {
    VideoClient::new(config.client_config()).context("invalid client configuration")
}

/// Path the video of `video_id` is saved to inside `dir`
pub fn video_file(dir: &Path, video_id: &str) -> PathBuf {
    dir.join(format!("{}.mp4", video_id))
}

/// Wait for a submitted job and download its video into `dir`
///
/// Prints every status change on the way.
///
/// # Returns
/// The path of the saved video
pub async fn finish_job(
    client: &VideoClient,
    job: &Job,
    dir: &Path,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    println!("{} {}", "Video job queued with ID:".green(), job.id.cyan());

    let poller = JobPoller::from_config(client, client.config());
    poller
        .wait_for_completion(&job.id, cancel, print_update)
        .await
        .context("video generation did not complete")?;

    let target = video_file(dir, &job.id);
    let saved = client
        .download_video(&job.id, &target, cancel)
        .await
        .context("failed to download video")?;

    println!("{} {}", "Video saved to".green(), saved.display());
    Ok(saved)
}

fn print_update(update: &StatusUpdate) {
    println!(
        "  {} {} ({:.0}%)",
        "Status:".dimmed(),
        colorize_status(&update.status),
        update.progress
    );
}

/// Handle the status command
pub async fn handle_status_command(
    video_id: &str,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    let client = connect(config)?;
    let job_guard = interrupts.begin_job();

    let job = client
        .get_video(video_id, job_guard.token())
        .await
        .with_context(|| format!("failed to fetch video {}", video_id))?;

    print_job_details(&job);
    Ok(())
}

/// Handle the download command
pub async fn handle_download_command(
    video_id: &str,
    output: &Path,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    let client = connect(config)?;
    let job_guard = interrupts.begin_job();

    std::fs::create_dir_all(output)
        .with_context(|| format!("unable to create {}", output.display()))?;

    let saved = client
        .download_video(video_id, video_file(output, video_id), job_guard.token())
        .await
        .context("failed to download video")?;

    println!("{} {}", "Video saved to".green(), saved.display());
    Ok(())
}

/// Print one line of a video listing
pub fn print_job_summary(job: &Job) {
    println!("  {} {}", "▸".cyan(), job.id.bold());
    println!("    Status:   {}", colorize_status(&job.status));
    if let Some(model) = &job.model {
        println!("    Model:    {}", model);
    }
    if let Some(seconds) = job.seconds {
        println!("    Duration: {}s", seconds);
    }
    if let Some(size) = &job.size {
        println!("    Size:     {}", size);
    }
    if let Some(created) = job.created_at_utc() {
        println!("    Created:  {}", created.to_rfc3339().dimmed());
    }
    let progress = normalize_progress(job.raw_progress());
    if progress > 0.0 && progress <= 100.0 {
        println!("    Progress: {:.0}%", progress);
    }
    println!();
}

/// Print detailed video information
pub fn print_job_details(job: &Job) {
    println!("{}", "Video Details:".bold());
    println!("  ID:        {}", job.id.cyan());
    println!("  Status:    {}", colorize_status(&job.status));
    println!(
        "  Progress:  {:.0}%",
        normalize_progress(job.raw_progress())
    );
    if let Some(model) = &job.model {
        println!("  Model:     {}", model);
    }
    if let Some(seconds) = job.seconds {
        println!("  Duration:  {}s", seconds);
    }
    if let Some(size) = &job.size {
        println!("  Size:      {}", size);
    }
    if let Some(source) = &job.remixed_from_video_id {
        println!("  Remix of:  {}", source.dimmed());
    }
    if let Some(created) = job.created_at_utc() {
        println!("  Created:   {}", created.to_rfc3339());
    }
    if let Some(completed) = job.completed_at_utc() {
        println!("  Completed: {}", completed.to_rfc3339());
    }
    if let Some(message) = job.error_message() {
        println!("  Error:     {}", message.red());
    }
}

/// Colorize a status for display
pub fn colorize_status(status: &JobStatus) -> ColoredString {
    let text = status.as_str();
    match status.phase() {
        JobPhase::Succeeded => text.green(),
        JobPhase::Failed => text.red(),
        JobPhase::Pending => match status {
            JobStatus::Queued => text.yellow(),
            _ => text.blue(),
        },
    }
}
