// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Locate command implementation for gitdesk.

use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::cli::locate::LocateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::locator::{InMemoryPages, IncrementalLocator};
use crate::notify::TracingSink;

/// Spinner style for a search of unknown length.
fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        })
        .clone()
}

/// Main handler for the locate command.
///
/// Ctrl-C cancels the search.
///
/// # Errors
///
/// Returns an error if the id file cannot be read or a page load fails.
pub async fn run_locate_command(args: &LocateArgs, config: &Config) -> Result<()> {
    let ids = read_ids(&args.ids).await?;
    info!(count = ids.len(), page_size = args.page_size, "loaded id list");

    let pages = InMemoryPages::new(ids, args.page_size as usize)
        .with_initial(args.initial)
        .with_latency(Duration::from_millis(args.latency_ms));
    let locator = IncrementalLocator::new(Arc::new(pages), Arc::new(TracingSink), &config.locator);

    let spinner = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(spinner_style());
    spinner.set_message(format!("searching for {}", args.target));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut state = locator.subscribe();
    let search = locator.locate(&args.target);
    tokio::pin!(search);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    let outcome = loop {
        tokio::select! {
            outcome = &mut search => break outcome,
            Ok(()) = state.changed() => {
                let current = state.borrow_and_update().clone();
                spinner.set_message(format!(
                    "searching for {}: {} loaded, {} pages",
                    args.target, current.loaded, current.loads
                ));
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                locator.cancel();
            }
        }
    };
    spinner.finish_and_clear();
    let outcome = outcome?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("failed to serialize outcome")?
        );
    } else {
        println!("{}: {outcome}", args.target);
    }
    Ok(())
}

/// Reads one id per line, skipping blank lines.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn read_ids(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse_ids(&content))
}

/// Ids from `content`, one per non-blank line.
#[must_use]
pub fn parse_ids(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
