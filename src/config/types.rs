// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! [global]   output_log_level, file_log_level, log_file, json_log
//! [locator]  max_iterations, poll_interval_ms, max_duration_ms
//! [bridge]   category, channel_capacity, finished_memory
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::LogLevel;
use crate::operation::registry::DEFAULT_FINISHED_MEMORY;

/// Global options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Log file; no file logging when unset.
    pub log_file: Option<PathBuf>,
    /// Write the log file as JSON lines.
    pub json_log: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::DEBUG,
            log_file: None,
            json_log: false,
        }
    }
}

/// Bounds for the incremental locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocatorConfig {
    /// Maximum number of pages a single search may load.
    pub max_iterations: u32,
    /// Wait between checks while a foreign loader is busy.
    pub poll_interval_ms: u64,
    /// Optional wall-clock cap for one search.
    pub max_duration_ms: Option<u64>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            poll_interval_ms: 100,
            max_duration_ms: None,
        }
    }
}

impl LocatorConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_ms.map(Duration::from_millis)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero iteration cap, poll
    /// interval or wall-clock cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(invalid("locator", "max_iterations", "must be greater than 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("locator", "poll_interval_ms", "must be greater than 0"));
        }
        if self.max_duration_ms == Some(0) {
            return Err(invalid(
                "locator",
                "max_duration_ms",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}

/// Progress bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Category assigned to operations created from notifications.
    pub category: String,
    /// Capacity of the notification channel.
    pub channel_capacity: usize,
    /// How many finished ids the registry remembers, so late progress for
    /// them is dropped instead of restarting the operation.
    pub finished_memory: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            category: "git".to_string(),
            channel_capacity: 256,
            finished_memory: DEFAULT_FINISHED_MEMORY,
        }
    }
}

impl BridgeConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty category or a zero
    /// channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.category.trim().is_empty() {
            return Err(invalid("bridge", "category", "must not be empty"));
        }
        if self.channel_capacity == 0 {
            return Err(invalid("bridge", "channel_capacity", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(section: &str, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}
