//! Reel CLI
//!
//! Command-line interface for generating videos with a remote video
//! generation service.

mod commands;
mod config;
mod prompt;
mod signal;

use anyhow::Result;
use clap::Parser;
use colored::*;
use commands::{Commands, describe_error, handle_command};
use config::{API_KEY_VAR, Config};
use prompt::Prompter;
use reel_client::config::DEFAULT_BASE_URL;
use signal::Interrupts;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Generate, remix and download videos", long_about = None)]
struct Cli {
    /// API key; asked for interactively when missing
    #[arg(long, env = API_KEY_VAR, hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Organization ID sent with every request
    #[arg(long, env = "OPENAI_ORG_ID")]
    organization: Option<String>,

    /// Project ID sent with every request
    #[arg(long, env = "OPENAI_PROJECT_ID")]
    project: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), describe_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reel_cli=warn,reel_client=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let env_path = config::resolve_env_path();
    if config::load_env_file(&env_path)? {
        tracing::debug!("Loaded environment from {}", env_path.display());
    }

    let cli = Cli::parse();
    let interrupts = Interrupts::install();

    let api_key = match cli.api_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => key,
        None => ask_api_key(&env_path)?,
    };

    let config = Config {
        api_key,
        base_url: cli.base_url,
        organization: cli.organization,
        project: cli.project,
    };

    handle_command(cli.command, &config, &interrupts).await
}

/// Ask for the API key and offer to store it in the dotenv file
fn ask_api_key(env_path: &std::path::Path) -> Result<String> {
    let mut prompter = Prompter::stdio();
    prompter.say(format!("{} is not set.", API_KEY_VAR).yellow())?;
    let key = prompter.required_secret("Enter your API key", std::io::stdin().is_terminal())?;

    if prompter.confirm(&format!("Save the key to {}?", env_path.display()))? {
        config::upsert_env_value(env_path, API_KEY_VAR, &key)?;
        prompter.say(format!("Saved to {}", env_path.display()).green())?;
    }

    Ok(key)
}
