//! Commands module
//!
//! Defines all CLI commands and their handlers. Without a subcommand the
//! CLI runs the interactive menu.

mod create;
mod interactive;
mod list;
mod remix;
mod video;

use anyhow::Result;
use clap::Subcommand;
use reel_core::domain::model::DEFAULT_SECONDS;
use reel_core::dto::video::ListOrder;
use std::path::PathBuf;

use crate::config::Config;
use crate::signal::Interrupts;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new video and download it
    Create {
        /// What the video should show
        #[arg(long)]
        prompt: String,

        /// Model name
        #[arg(long, default_value = "sora-2")]
        model: String,

        /// Clip length in seconds (4, 8 or 12)
        #[arg(long, default_value_t = DEFAULT_SECONDS)]
        seconds: u32,

        /// Output size as WxH; defaults to the model's first size
        #[arg(long)]
        size: Option<String>,

        /// Reference image or video (jpeg, png, webp or mp4)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Directory to save the video into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Remix an existing video and download the result
    Remix {
        /// ID of the video to remix
        video_id: String,

        /// Description of the change
        #[arg(long)]
        prompt: String,

        /// Directory to save the video into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// List recent videos
    List {
        /// Number of videos to show (1-100)
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Sort order (asc or desc)
        #[arg(long, default_value = "desc")]
        order: ListOrder,

        /// Cursor from a previous page
        #[arg(long)]
        after: Option<String>,
    },
    /// Show the status of a video
    Status {
        /// Video ID
        video_id: String,
    },
    /// Download a finished video
    Download {
        /// Video ID
        video_id: String,

        /// Directory to save the video into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module, or starts the
/// interactive menu when no command was given.
pub async fn handle_command(
    command: Option<Commands>,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    let Some(command) = command else {
        return interactive::run(config, interrupts).await;
    };

    match command {
        Commands::Create {
            prompt,
            model,
            seconds,
            size,
            reference,
            output,
        } => {
            let args = create::CreateArgs {
                prompt,
                model,
                seconds,
                size,
                reference,
                output,
            };
            create::handle_create_command(args, config, interrupts).await
        }
        Commands::Remix {
            video_id,
            prompt,
            output,
        } => remix::handle_remix_command(&video_id, &prompt, &output, config, interrupts).await,
        Commands::List {
            limit,
            order,
            after,
        } => list::handle_list_command(limit, order, after, config, interrupts).await,
        Commands::Status { video_id } => {
            video::handle_status_command(&video_id, config, interrupts).await
        }
        Commands::Download { video_id, output } => {
            video::handle_download_command(&video_id, &output, config, interrupts).await
        }
    }
}

/// One-line rendering of an error and its causes
///
/// A cause is skipped when its parent message already ends with it.
pub fn describe_error(err: &anyhow::Error) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if parts.last().is_some_and(|parent| parent.ends_with(&text)) {
            continue;
        }
        parts.push(text);
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use reel_client::ClientError;

    #[test]
    fn test_describe_error_skips_repeated_causes() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Err::<(), _>(ClientError::io("open reference", "/tmp/ref.png", source))
            .context("failed to create video job")
            .unwrap_err();

        assert_eq!(
            describe_error(&err),
            "failed to create video job: open reference /tmp/ref.png: no such file"
        );
    }

    #[test]
    fn test_describe_error_keeps_distinct_causes() {
        let err = Err::<(), _>(ClientError::api_error(500, "unknown error"))
            .context("video generation did not complete")
            .unwrap_err();

        assert_eq!(
            describe_error(&err),
            "video generation did not complete: API error (500): unknown error"
        );
    }
}
