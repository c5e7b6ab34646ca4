// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Long-running backend operations and their progress samples.
//!
//! # Lifecycle
//!
//! ```text
//!  start() / first progress notification
//!               |
//!               v
//!           Running <---- update_progress() (wholesale replace)
//!               |
//!     +---------+----------+
//!     v         v          v
//! Completed  Cancelled   Failed      (removed from the active set)
//! ```
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`OperationRegistry`] | Active operations keyed by id |
//! | [`Operation`] | Snapshot of one tracked operation |
//! | [`ProgressSample`] | One raw progress measurement |
//! | [`Stage`] | Ordered phase of a Git transfer |
//! | [`OperationKind`] | Clone, Fetch, Push or Pull |

pub mod registry;

use std::fmt;
use std::time::SystemTime;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::progress::ProgressDisplay;

pub use registry::{OperationRegistry, RegistryEvent};

/// Kind of Git backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Clone,
    Fetch,
    Push,
    Pull,
}

impl OperationKind {
    /// Short label used as the operation name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clone => "Clone",
            Self::Fetch => "Fetch",
            Self::Push => "Push",
            Self::Pull => "Pull",
        }
    }

    /// Whether the backend can abort this kind of operation midway.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Clone | Self::Fetch)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase reported by the Git backend, in the order a transfer moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Starting,
    Counting,
    Compressing,
    Receiving,
    Writing,
    Resolving,
    Indexing,
    CheckingOut,
    Complete,
    Failed,
    Cancelled,
}

impl Stage {
    /// Returns whether this stage ends the operation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }

    /// Terminal status an operation ends in when this stage is reported.
    #[must_use]
    pub const fn terminal_status(self) -> Option<OperationStatus> {
        match self {
            Self::Complete => Some(OperationStatus::Completed),
            Self::Failed => Some(OperationStatus::Failed),
            Self::Cancelled => Some(OperationStatus::Cancelled),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "Starting",
            Self::Counting => "Counting",
            Self::Compressing => "Compressing",
            Self::Receiving => "Receiving",
            Self::Writing => "Writing",
            Self::Resolving => "Resolving",
            Self::Indexing => "Indexing",
            Self::CheckingOut => "Checking out",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress measurement as reported by the backend.
///
/// Counters the backend did not report are `None`; `received_bytes` is always
/// known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSample {
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_objects: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_objects: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_objects: Option<u64>,
    #[serde(default)]
    pub received_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_deltas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_deltas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressSample {
    /// A sample with only the stage and byte counter set.
    #[must_use]
    pub const fn new(stage: Stage, received_bytes: u64) -> Self {
        Self {
            stage,
            total_objects: None,
            received_objects: None,
            indexed_objects: None,
            received_bytes,
            total_deltas: None,
            indexed_deltas: None,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_objects(mut self, received: u64, total: u64) -> Self {
        self.received_objects = Some(received);
        self.total_objects = Some(total);
        self
    }

    #[must_use]
    pub const fn with_indexed_objects(mut self, indexed: u64) -> Self {
        self.indexed_objects = Some(indexed);
        self
    }

    #[must_use]
    pub const fn with_deltas(mut self, indexed: u64, total: u64) -> Self {
        self.indexed_deltas = Some(indexed);
        self.total_deltas = Some(total);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Lifecycle status of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl OperationStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Stored progress: the raw sample plus what it translated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationProgress {
    pub sample: ProgressSample,
    pub percent: u8,
    pub text: String,
}

impl OperationProgress {
    #[must_use]
    pub fn new(sample: ProgressSample, display: ProgressDisplay) -> Self {
        Self {
            sample,
            percent: display.percent,
            text: display.text,
        }
    }

    /// Translate `sample` and pair it with the result.
    #[must_use]
    pub fn from_sample(sample: ProgressSample) -> Self {
        let display = crate::progress::translate(&sample);
        Self::new(sample, display)
    }
}

/// Snapshot of a tracked operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cancellable: bool,
    pub status: OperationStatus,
    pub progress: Option<OperationProgress>,
    pub started_at: SystemTime,
    /// Message attached when the operation failed.
    pub error: Option<String>,
}

/// Optional parameters for [`OperationRegistry::start`].
///
/// ```
/// use gitdesk_core::operation::StartOptions;
///
/// let options = StartOptions::builder()
///     .id("fetch-origin")
///     .category("git")
///     .cancellable(true)
///     .build();
/// assert_eq!(options.id.as_deref(), Some("fetch-origin"));
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct StartOptions {
    /// Caller-assigned id; a fresh `op-<n>` id is generated when absent.
    #[builder(into)]
    pub id: Option<String>,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(into)]
    pub category: Option<String>,
    /// Fixed at creation; ignored when `start` refreshes an active operation.
    #[builder(default)]
    pub cancellable: bool,
}

#[cfg(test)]
mod tests;
