//! Create command handlers
//!
//! Submits a new generation job, waits for it and saves the video.

use anyhow::{Context, Result, bail};
use colored::*;
use reel_client::VideoClient;
use reel_core::domain::model::{ALLOWED_SECONDS, DEFAULT_SECONDS, MODELS, ModelOption};
use reel_core::dto::video::CreateVideo;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::video::{connect, finish_job};
use crate::config::Config;
use crate::prompt::{Prompter, expand_path};
use crate::signal::Interrupts;

/// Arguments of the create command
pub struct CreateArgs {
    pub prompt: String,
    pub model: String,
    pub seconds: u32,
    pub size: Option<String>,
    pub reference: Option<PathBuf>,
    pub output: PathBuf,
}

/// Handle the create command
pub async fn handle_create_command(
    args: CreateArgs,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    let Some(model) = ModelOption::find(&args.model) else {
        bail!(
            "unknown model '{}', expected one of: {}",
            args.model,
            model_names()
        );
    };

    let size = match args.size {
        Some(size) => {
            let Some(resolution) = model.resolution(&size) else {
                bail!("model {} does not support size {}", model.name, size);
            };
            resolution.value
        }
        None => model.resolutions[0].value,
    };

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("unable to create {}", args.output.display()))?;

    let mut request = CreateVideo::new(args.prompt)
        .with_model(model.name)
        .with_seconds(args.seconds)
        .with_size(size);
    if let Some(reference) = args.reference {
        request = request.with_input_reference(reference);
    }

    let client = connect(config)?;
    submit(&client, &request, &args.output, interrupts).await
}

async fn submit(
    client: &VideoClient,
    request: &CreateVideo,
    dir: &Path,
    interrupts: &Interrupts,
) -> Result<()> {
    let job_guard = interrupts.begin_job();
    let cancel = job_guard.token();

    let job = client
        .create_video(request, cancel)
        .await
        .context("failed to create video job")?;

    finish_job(client, &job, dir, cancel).await?;
    Ok(())
}

/// Walk the user through creating a video
pub async fn interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    client: &VideoClient,
    interrupts: &Interrupts,
) -> Result<()> {
    let models: Vec<_> = MODELS
        .iter()
        .map(|m| (m, format!("{} (${:.2}/s)", m.name, m.rate_per_second)))
        .collect();
    let model: &ModelOption =
        prompter.choose("Select model:", &models, 0, |m| vec![m.name.to_string()])?;

    let prompt = prompter.required("Prompt")?;

    let durations: Vec<_> = ALLOWED_SECONDS
        .iter()
        .map(|s| (*s, format!("{} seconds", s)))
        .collect();
    let default_duration = ALLOWED_SECONDS
        .iter()
        .position(|s| *s == DEFAULT_SECONDS)
        .unwrap_or(0);
    let seconds = prompter.choose("Select duration:", &durations, default_duration, |s| {
        vec![s.to_string(), format!("{}s", s)]
    })?;

    let resolutions: Vec<_> = model
        .resolutions
        .iter()
        .map(|r| (r, r.label.to_string()))
        .collect();
    let resolution = prompter.choose("Select resolution:", &resolutions, 0, |r| {
        vec![r.value.to_string()]
    })?;

    let mut reference = ask_reference(prompter)?;
    let dir = prompter.destination()?;

    let cost = model.estimate_cost(seconds);
    prompter.say("")?;
    prompter.say("Summary:".bold())?;
    prompter.say(format!("  Model:      {}", model.name))?;
    prompter.say(format!("  Prompt:     {}", prompt))?;
    prompter.say(format!("  Duration:   {}s", seconds))?;
    prompter.say(format!("  Resolution: {}", resolution.label))?;
    if let Some(path) = &reference {
        prompter.say(format!("  Reference:  {}", path.display()))?;
    }
    prompter.say(format!("  Output:     {}", dir.display()))?;
    prompter.say(format!(
        "  Estimated cost: ${:.2} ({}s @ ${:.2}/s)",
        cost, seconds, model.rate_per_second
    ))?;

    if !prompter.confirm("Submit this job?")? {
        prompter.say("Cancelled.".yellow())?;
        return Ok(());
    }

    loop {
        let mut request = CreateVideo::new(prompt.clone())
            .with_model(model.name)
            .with_seconds(seconds)
            .with_size(resolution.value);
        if let Some(path) = &reference {
            request = request.with_input_reference(path.clone());
        }

        let job_guard = interrupts.begin_job();
        let cancel = job_guard.token();
        match client.create_video(&request, cancel).await {
            Ok(job) => {
                finish_job(client, &job, &dir, cancel).await?;
                return Ok(());
            }
            Err(e) if e.is_recoverable() => {
                prompter.say(format!("{} {}", "Error:".red(), e))?;
                reference = ask_reference(prompter)?;
            }
            Err(e) => return Err(e).context("failed to create video job"),
        }
    }
}

/// Optional reference file; re-asks until the path exists or is left blank
fn ask_reference<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<Option<PathBuf>> {
    loop {
        let input = prompter.optional(
            "Reference image or video (jpeg, png, webp, mp4; leave blank to skip)",
        )?;
        if input.is_empty() {
            return Ok(None);
        }

        let path = expand_path(&input)?;
        if path.is_file() {
            return Ok(Some(path));
        }
        prompter.say(format!("File not found: {}", path.display()).yellow())?;
    }
}

fn model_names() -> String {
    MODELS.iter().map(|m| m.name).collect::<Vec<_>>().join(", ")
}
