// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Replay command: feeds a recorded notification stream through the bridge.
//!
//! ```text
//! events.jsonl --parse--> Vec<ProgressNotification>
//!                               |
//!                    feeder (plays the backend)
//!                               | flume
//!                               v
//!                         EventBridge --> OperationRegistry
//!                                               | broadcast
//!                                               v
//!                                    display task (indicatif bars)
//! ```
//!
//! `--cancel ID` cancels the operation once the registry tracks it; the feeder
//! then acts like a backend honouring the token: it reports `Cancelled` and
//! drops the rest of that operation's stream.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bridge::{EventBridge, NotificationSender, ProgressNotification, notification_channel};
use crate::cli::replay::ReplayArgs;
use crate::config::Config;
use crate::error::Result;
use crate::operation::{
    Operation, OperationKind, OperationRegistry, OperationStatus, ProgressSample, RegistryEvent,
    Stage,
};

/// Replay settings independent of the command line.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub delay: Duration,
    pub cancel: HashSet<String>,
    pub show_progress: bool,
}

/// What the registry looked like after the replay.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    /// Operations that reached a terminal status, in the order they did.
    pub finished: Vec<Operation>,
    /// Operations still active when the stream ended.
    pub active: Vec<Operation>,
}

/// Main handler for the replay command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the bridge fails.
pub async fn run_replay_command(args: &ReplayArgs, config: &Config) -> Result<()> {
    let notifications = read_notifications(&args.file).await?;
    let options = ReplayOptions {
        delay: Duration::from_millis(args.delay_ms),
        cancel: args.cancel.iter().cloned().collect(),
        show_progress: !args.quiet,
    };

    let summary = replay(notifications, config, &options).await?;

    for operation in &summary.finished {
        println!("{}", format_operation(operation));
    }
    if !summary.active.is_empty() {
        println!("Still running:");
        for operation in &summary.active {
            println!("  {}", format_operation(operation));
        }
    }
    Ok(())
}

/// Reads a JSON-lines notification file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not a valid
/// notification.
pub async fn read_notifications(path: &Path) -> Result<Vec<ProgressNotification>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_notifications(&content).with_context(|| format!("in {}", path.display()))
}

/// Parses one notification per non-empty line; `#` starts a comment line.
///
/// # Errors
///
/// Returns an error naming the first line that fails to parse.
pub fn parse_notifications(content: &str) -> Result<Vec<ProgressNotification>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str::<ProgressNotification>(line)
                .with_context(|| format!("invalid notification on line {}", i + 1))
        })
        .collect()
}

/// Runs `notifications` through a fresh registry and bridge.
///
/// # Errors
///
/// Returns an error if the bridge task fails.
pub async fn replay(
    notifications: Vec<ProgressNotification>,
    config: &Config,
    options: &ReplayOptions,
) -> Result<ReplaySummary> {
    let registry = OperationRegistry::with_finished_memory(config.bridge.finished_memory);
    let display_events = registry.subscribe();
    let feeder_events = registry.subscribe();

    let stop_display = CancellationToken::new();
    let display = spawn_display(display_events, options.show_progress, stop_display.clone());

    let mut bridge = EventBridge::new(registry.clone(), &config.bridge);
    let (sender, receiver) = notification_channel(config.bridge.channel_capacity);
    bridge.start(receiver)?;

    let mut feeder = Feeder {
        registry: &registry,
        events: feeder_events,
        sender,
        options,
        cancelled: HashSet::new(),
        settled: HashSet::new(),
    };
    let fed = feeder.feed(notifications).await;
    drop(feeder);

    // All senders are gone once the feeder is dropped, so draining applies
    // everything that was queued and then stops.
    bridge.drain().await?;
    fed?;

    stop_display.cancel();
    let finished = display.await.context("display task panicked")?;

    let summary = ReplaySummary {
        finished,
        active: registry.list(),
    };
    info!(
        finished = summary.finished.len(),
        active = summary.active.len(),
        "replay done"
    );
    Ok(summary)
}

/// Plays the backend side of the stream.
struct Feeder<'a> {
    registry: &'a OperationRegistry,
    events: broadcast::Receiver<RegistryEvent>,
    sender: NotificationSender,
    options: &'a ReplayOptions,
    cancelled: HashSet<String>,
    /// Ids that ended or already had their cancellation attempted.
    settled: HashSet<String>,
}

impl Feeder<'_> {
    async fn feed(&mut self, notifications: Vec<ProgressNotification>) -> Result<()> {
        for notification in notifications {
            let id = notification.operation_id.clone();
            if self.cancelled.contains(&id) {
                continue;
            }

            let terminal = notification.sample.stage.is_terminal();
            let kind = notification.operation_type;
            self.send(notification).await?;

            if terminal {
                self.settled.insert(id);
            } else if self.options.cancel.contains(&id) && self.settled.insert(id.clone()) {
                self.cancel(&id, kind).await?;
            }
            if !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
        }
        Ok(())
    }

    async fn send(&self, notification: ProgressNotification) -> Result<()> {
        self.sender
            .send_async(notification)
            .await
            .context("progress bridge stopped receiving")
    }

    async fn cancel(&mut self, id: &str, kind: OperationKind) -> Result<()> {
        if !self.wait_until_tracked(id).await {
            return Ok(());
        }
        if !self.registry.cancel(id) {
            warn!(id, "operation is not cancellable");
            return Ok(());
        }
        info!(id, "operation cancelled");
        self.cancelled.insert(id.to_string());
        self.send(ProgressNotification::new(
            id,
            kind,
            ProgressSample::new(Stage::Cancelled, 0),
        ))
        .await
    }

    async fn wait_until_tracked(&mut self, id: &str) -> bool {
        loop {
            if self.registry.contains(id) {
                return true;
            }
            match self.events.recv().await {
                Ok(RegistryEvent::Started(operation)) if operation.id == id => return true,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return false,
            }
        }
    }
}

fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} {prefix:.bold} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

fn spawn_display(
    mut events: broadcast::Receiver<RegistryEvent>,
    show_progress: bool,
    stop: CancellationToken,
) -> JoinHandle<Vec<Operation>> {
    tokio::spawn(async move {
        let target = if show_progress {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let multi = MultiProgress::with_draw_target(target);
        let mut bars: HashMap<String, ProgressBar> = HashMap::new();
        let mut finished = Vec::new();

        loop {
            let event = tokio::select! {
                biased;
                event = events.recv() => event,
                () = stop.cancelled() => break,
            };
            match event {
                Ok(RegistryEvent::Started(operation) | RegistryEvent::Updated(operation)) => {
                    let bar = bars.entry(operation.id.clone()).or_insert_with(|| {
                        let bar = multi.add(ProgressBar::new(100));
                        bar.set_style(bar_style());
                        bar
                    });
                    bar.set_prefix(format!("{} {}", operation.name, operation.id));
                }
                Ok(RegistryEvent::Progress { id, progress }) => {
                    if let Some(bar) = bars.get(&id) {
                        bar.set_position(u64::from(progress.percent));
                        bar.set_message(progress.text);
                    }
                }
                Ok(RegistryEvent::Finished(operation)) => {
                    if let Some(bar) = bars.remove(&operation.id) {
                        bar.finish_with_message(format!("{:?}", operation.status));
                    }
                    finished.push(operation);
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "display fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
        finished
    })
}

fn format_operation(operation: &Operation) -> String {
    let detail = match operation.status {
        OperationStatus::Failed => operation.error.clone().unwrap_or_default(),
        _ => operation
            .progress
            .as_ref()
            .map(|progress| progress.text.clone())
            .unwrap_or_default(),
    };
    let status = format!("{:?}", operation.status);
    format!(
        "{:<16} {:<6} {status:<10} {detail}",
        operation.id, operation.name
    )
}
