//! Interactive menu
//!
//! Runs when the CLI is started without a subcommand. A failed create or
//! remix ends the session with that error; a failed listing or a cancelled
//! job returns to the menu.

use anyhow::Result;
use colored::*;
use reel_client::ClientError;
use std::io::{BufRead, Write};

use super::video::connect;
use super::{create, describe_error, list, remix};
use crate::config::Config;
use crate::prompt::Prompter;
use crate::signal::Interrupts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Remix,
    List,
    Quit,
}

impl Action {
    fn names(&self) -> Vec<String> {
        let name = match self {
            Action::Create => "create",
            Action::Remix => "remix",
            Action::List => "list",
            Action::Quit => "quit",
        };
        vec![name.to_string()]
    }
}

/// Run the menu on stdin/stdout
pub async fn run(config: &Config, interrupts: &Interrupts) -> Result<()> {
    let mut prompter = Prompter::stdio();
    run_with(&mut prompter, config, interrupts).await
}

async fn run_with<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    let client = connect(config)?;
    let actions = [
        (Action::Create, "Create a new video".to_string()),
        (Action::Remix, "Remix an existing video".to_string()),
        (Action::List, "List videos".to_string()),
        (Action::Quit, "Quit".to_string()),
    ];

    loop {
        let action = prompter.choose("What would you like to do?", &actions, 0, Action::names)?;

        let outcome = match action {
            Action::Create => create::interactive(prompter, &client, interrupts).await,
            Action::Remix => remix::interactive(prompter, &client, interrupts).await,
            Action::List => list::interactive(prompter, &client, interrupts).await,
            Action::Quit => return Ok(()),
        };

        if let Err(e) = outcome {
            if action != Action::List && !may_continue(&e) {
                return Err(e);
            }
            prompter.say(format!("{} {}", "Error:".red(), describe_error(&e)))?;
        }

        prompter.say("")?;
        if !prompter.confirm("Perform another action?")? {
            return Ok(());
        }
    }
}

/// Errors after which the menu is offered again
fn may_continue(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ClientError>())
        .any(|e| e.is_recoverable() || matches!(e, ClientError::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::io::Cursor;

    fn unreachable_config() -> Config {
        Config {
            api_key: "sk-test".to_string(),
            // Nothing listens on the discard port.
            base_url: "http://127.0.0.1:9".to_string(),
            organization: None,
            project: None,
        }
    }

    #[tokio::test]
    async fn test_failed_create_ends_session_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = format!("1\n\na kite\n\n\n\n{}\ny\nn\n", dir.path().display());
        let mut prompter = Prompter::new(Cursor::new(input.into_bytes()), Vec::new());

        let result = run_with(&mut prompter, &unreachable_config(), &Interrupts::default()).await;

        let err = result.unwrap_err();
        assert!(describe_error(&err).starts_with("failed to create video job"));
        assert!(!String::from_utf8(prompter.output).unwrap().contains("Perform another action?"));
    }

    #[tokio::test]
    async fn test_failed_list_returns_to_menu() {
        let input = "3\n\n\nn\n";
        let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());

        let result = run_with(&mut prompter, &unreachable_config(), &Interrupts::default()).await;

        assert!(result.is_ok());
        let printed = String::from_utf8(prompter.output).unwrap();
        assert!(printed.contains("failed to list videos"));
        assert!(printed.contains("Perform another action?"));
    }

    #[test]
    fn test_may_continue() {
        let cancelled = Err::<(), _>(ClientError::Cancelled)
            .context("video generation did not complete")
            .unwrap_err();
        assert!(may_continue(&cancelled));

        let invalid = anyhow::Error::new(ClientError::InvalidRequest("prompt cannot be empty".into()));
        assert!(may_continue(&invalid));

        let remote = Err::<(), _>(ClientError::api_error(500, "unknown error"))
            .context("failed to remix video video_1")
            .unwrap_err();
        assert!(!may_continue(&remote));
    }
}
