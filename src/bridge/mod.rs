// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bridge from the backend's progress notification stream to the registry.
//!
//! ```text
//! backend ---> flume::Sender<ProgressNotification>
//!                         |
//!                         v
//! EventBridge task:  select! { shutdown token | recv_async }
//!                         |
//!                         v
//!              ProgressHandler::handle(n)
//!     terminal stage?  yes -> registry.complete/fail/finish(Cancelled)
//!                      no  -> registry.track(kind label, id, "git", cancellable)
//!                             (refused for finished ids: late progress)
//!                             registry.update_progress(translate(sample))
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start(rx)--> Running --shutdown().await--> ShutDown
//!   \______________________shutdown().await_________/
//! ```
//!
//! `shutdown` joins the processing task before returning, so once it resolves
//! no further notification can be handled. Dropping a running bridge stops
//! the task at its next poll without waiting for it.
//!
//! Late progress is recognised by the registry, which remembers every
//! terminal transition: backend reports as well as `cancel` from the UI.

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::types::BridgeConfig;
use crate::error::BridgeError;
use crate::operation::{
    OperationKind, OperationProgress, OperationRegistry, OperationStatus, ProgressSample,
    StartOptions,
};

/// One progress notification from the Git backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotification {
    pub operation_id: String,
    pub operation_type: OperationKind,
    #[serde(flatten)]
    pub sample: ProgressSample,
}

impl ProgressNotification {
    #[must_use]
    pub fn new(
        operation_id: impl Into<String>,
        operation_type: OperationKind,
        sample: ProgressSample,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            operation_type,
            sample,
        }
    }
}

pub type NotificationSender = flume::Sender<ProgressNotification>;
pub type NotificationReceiver = flume::Receiver<ProgressNotification>;

/// Bounded channel for feeding notifications into an [`EventBridge`].
#[must_use]
pub fn notification_channel(capacity: usize) -> (NotificationSender, NotificationReceiver) {
    flume::bounded(capacity)
}

/// What handling a single notification did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Operation started or refreshed and its progress replaced.
    Applied,
    /// Operation ended with the given status.
    Finished(OperationStatus),
    /// Non-terminal notification for an id that already finished.
    DiscardedLate,
    /// Malformed notification, skipped.
    Skipped,
}

/// Applies notifications to the registry, one at a time.
///
/// This is the synchronous core of [`EventBridge`]; it can also be driven
/// directly.
#[derive(Debug)]
pub struct ProgressHandler {
    registry: OperationRegistry,
    category: String,
}

impl ProgressHandler {
    #[must_use]
    pub fn new(registry: OperationRegistry, config: &BridgeConfig) -> Self {
        Self {
            registry,
            category: config.category.clone(),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Apply one notification. Never fails; anomalies are logged and skipped.
    pub fn handle(&self, notification: &ProgressNotification) -> NotificationOutcome {
        let id = notification.operation_id.as_str();
        if id.trim().is_empty() {
            warn!(
                kind = %notification.operation_type,
                stage = %notification.sample.stage,
                "progress notification without operation id skipped"
            );
            return NotificationOutcome::Skipped;
        }

        if let Some(status) = notification.sample.stage.terminal_status() {
            self.finish(id, status, notification.sample.message.clone());
            return NotificationOutcome::Finished(status);
        }

        let kind = notification.operation_type;
        let tracked = self.registry.track(
            kind.label(),
            StartOptions::builder()
                .id(id)
                .category(self.category.clone())
                .cancellable(kind.is_cancellable())
                .build(),
        );
        if tracked.is_none() {
            trace!(id, stage = %notification.sample.stage, "late progress for finished operation dropped");
            return NotificationOutcome::DiscardedLate;
        }

        let progress = OperationProgress::from_sample(notification.sample.clone());
        trace!(id, percent = progress.percent, text = %progress.text, "progress");
        self.registry.update_progress(id, progress);
        NotificationOutcome::Applied
    }

    fn finish(&self, id: &str, status: OperationStatus, message: Option<String>) {
        match status {
            OperationStatus::Completed => self.registry.complete(id),
            OperationStatus::Failed => self.registry.fail(id, message),
            OperationStatus::Cancelled | OperationStatus::Running => {
                self.registry.finish(id, OperationStatus::Cancelled, None);
            }
        }
        debug!(id, ?status, "operation reported terminal stage");
    }
}

enum BridgeState {
    Idle(ProgressHandler),
    Running {
        token: CancellationToken,
        task: JoinHandle<ProgressHandler>,
    },
    ShutDown,
}

/// Subscription that drives an [`OperationRegistry`] from a notification stream.
pub struct EventBridge {
    state: BridgeState,
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            BridgeState::Idle(_) => "idle",
            BridgeState::Running { .. } => "running",
            BridgeState::ShutDown => "shut down",
        };
        f.debug_struct("EventBridge").field("state", &state).finish()
    }
}

impl EventBridge {
    #[must_use]
    pub fn new(registry: OperationRegistry, config: &BridgeConfig) -> Self {
        Self {
            state: BridgeState::Idle(ProgressHandler::new(registry, config)),
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, BridgeState::Running { .. })
    }

    /// Subscribe to `source` and start applying notifications.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadySubscribed`] if the bridge is running and
    /// [`BridgeError::ShutDown`] if it was already torn down.
    pub fn start(&mut self, source: NotificationReceiver) -> Result<(), BridgeError> {
        let handler = match std::mem::replace(&mut self.state, BridgeState::ShutDown) {
            BridgeState::Idle(handler) => handler,
            running @ BridgeState::Running { .. } => {
                self.state = running;
                return Err(BridgeError::AlreadySubscribed);
            }
            BridgeState::ShutDown => return Err(BridgeError::ShutDown),
        };

        let token = CancellationToken::new();
        let task = tokio::spawn(run_bridge(handler, source, token.clone()));
        info!("progress bridge subscribed");
        self.state = BridgeState::Running { token, task };
        Ok(())
    }

    /// Tear the subscription down and wait for the processing task to exit.
    ///
    /// Idempotent: later calls return `Ok(())` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TaskPanicked`] if the processing task panicked.
    pub async fn shutdown(&mut self) -> Result<(), BridgeError> {
        match std::mem::replace(&mut self.state, BridgeState::ShutDown) {
            BridgeState::Running { token, task } => {
                token.cancel();
                task.await
                    .map_err(|e| BridgeError::TaskPanicked(e.to_string()))?;
                info!("progress bridge shut down");
                Ok(())
            }
            BridgeState::Idle(_) | BridgeState::ShutDown => Ok(()),
        }
    }

    /// Like [`shutdown`](Self::shutdown), but lets the task apply everything
    /// already queued: it waits until every sender has been dropped and the
    /// channel is empty.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TaskPanicked`] if the processing task panicked.
    pub async fn drain(&mut self) -> Result<(), BridgeError> {
        match std::mem::replace(&mut self.state, BridgeState::ShutDown) {
            BridgeState::Running { task, .. } => {
                task.await
                    .map_err(|e| BridgeError::TaskPanicked(e.to_string()))?;
                info!("progress bridge drained");
                Ok(())
            }
            BridgeState::Idle(_) | BridgeState::ShutDown => Ok(()),
        }
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        if let BridgeState::Running { token, .. } = &self.state {
            token.cancel();
            debug!("progress bridge dropped while running");
        }
    }
}

async fn run_bridge(
    handler: ProgressHandler,
    source: NotificationReceiver,
    token: CancellationToken,
) -> ProgressHandler {
    let mut handled = 0_u64;
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            received = source.recv_async() => match received {
                Ok(notification) => {
                    handler.handle(&notification);
                    handled += 1;
                }
                Err(flume::RecvError::Disconnected) => {
                    debug!("notification source disconnected");
                    break;
                }
            },
        }
    }
    debug!(handled, "progress bridge loop exited");
    handler
}
