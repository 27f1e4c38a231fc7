//! Remix command handlers

use anyhow::{Context, Result};
use colored::*;
use reel_client::VideoClient;
use std::io::{BufRead, Write};
use std::path::Path;

use super::video::{connect, finish_job};
use crate::config::Config;
use crate::prompt::Prompter;
use crate::signal::Interrupts;

/// Handle the remix command
pub async fn handle_remix_command(
    video_id: &str,
    prompt: &str,
    output: &Path,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("unable to create {}", output.display()))?;

    let client = connect(config)?;
    remix(&client, video_id, prompt, output, interrupts).await
}

async fn remix(
    client: &VideoClient,
    video_id: &str,
    prompt: &str,
    dir: &Path,
    interrupts: &Interrupts,
) -> Result<()> {
    let job_guard = interrupts.begin_job();
    let cancel = job_guard.token();

    let job = client
        .remix_video(video_id, prompt, cancel)
        .await
        .with_context(|| format!("failed to remix video {}", video_id))?;

    finish_job(client, &job, dir, cancel).await?;
    Ok(())
}

/// Walk the user through remixing a video
pub async fn interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    client: &VideoClient,
    interrupts: &Interrupts,
) -> Result<()> {
    let video_id = prompter.required("Video ID to remix")?;
    let prompt = prompter.required("Describe the change")?;
    let dir = prompter.destination()?;

    prompter.say("")?;
    prompter.say("Summary:".bold())?;
    prompter.say(format!("  Source: {}", video_id))?;
    prompter.say(format!("  Prompt: {}", prompt))?;
    prompter.say(format!("  Output: {}", dir.display()))?;

    if !prompter.confirm("Submit this remix?")? {
        prompter.say("Cancelled.".yellow())?;
        return Ok(());
    }

    remix(client, &video_id, &prompt, &dir, interrupts).await
}
