//! List command handlers

use anyhow::{Context, Result, bail};
use colored::*;
use reel_client::VideoClient;
use reel_core::dto::video::{ListOrder, ListQuery, MAX_LIST_LIMIT, VideoPage};
use std::io::{BufRead, Write};

use super::video::{connect, print_job_summary};
use crate::config::Config;
use crate::prompt::Prompter;
use crate::signal::Interrupts;

/// Page size used when none is given
pub const DEFAULT_LIMIT: u32 = 20;

/// Handle the list command
pub async fn handle_list_command(
    limit: u32,
    order: ListOrder,
    after: Option<String>,
    config: &Config,
    interrupts: &Interrupts,
) -> Result<()> {
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        bail!("limit must be between 1 and {}", MAX_LIST_LIMIT);
    }

    let mut query = ListQuery::new(limit).order(order);
    if let Some(after) = after {
        query = query.after(after);
    }

    let client = connect(config)?;
    let page = fetch(&client, &query, interrupts).await?;
    print_page(&page);
    Ok(())
}

async fn fetch(
    client: &VideoClient,
    query: &ListQuery,
    interrupts: &Interrupts,
) -> Result<VideoPage> {
    let job_guard = interrupts.begin_job();
    let list = client.list_videos(query, job_guard.token());

    match tokio::time::timeout(client.config().list_timeout, list).await {
        Ok(result) => result.context("failed to list videos"),
        Err(_) => bail!(
            "listing videos took longer than {:?}",
            client.config().list_timeout
        ),
    }
}

/// Walk the user through listing videos
pub async fn interactive<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    client: &VideoClient,
    interrupts: &Interrupts,
) -> Result<()> {
    let limit = ask_limit(prompter)?;
    let orders = [
        (ListOrder::Desc, "Newest first (desc)".to_string()),
        (ListOrder::Asc, "Oldest first (asc)".to_string()),
    ];
    let order = prompter.choose("Sort order:", &orders, 0, |o| vec![o.to_string()])?;

    let page = fetch(client, &ListQuery::new(limit).order(order), interrupts).await?;
    print_page(&page);
    Ok(())
}

/// Page size between 1 and the service maximum; blank picks the default
fn ask_limit<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> Result<u32> {
    loop {
        let input = prompter.optional(&format!(
            "Number of videos to show (1-{}, default {})",
            MAX_LIST_LIMIT, DEFAULT_LIMIT
        ))?;
        if input.is_empty() {
            return Ok(DEFAULT_LIMIT);
        }
        match input.parse::<u32>() {
            Ok(limit) if (1..=MAX_LIST_LIMIT).contains(&limit) => return Ok(limit),
            _ => prompter.say(
                format!("Please enter a number between 1 and {}.", MAX_LIST_LIMIT).yellow(),
            )?,
        }
    }
}

fn print_page(page: &VideoPage) {
    if page.data.is_empty() {
        println!("{}", "No videos found.".yellow());
        return;
    }

    println!("{}", format!("Found {} video(s):", page.data.len()).bold());
    println!();
    for job in &page.data {
        print_job_summary(job);
    }

    if page.has_next_page() {
        if let Some(cursor) = page.cursor() {
            println!("{} {}", "More videos available after:".dimmed(), cursor);
        }
    }
}
