// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. gitdesk.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. GITDESK_* env vars
//! 5. --set section.key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! GITDESK_LOCATOR__MAX_ITERATIONS=80   → locator.max_iterations = 80
//! GITDESK_BRIDGE__CATEGORY=vcs         → bridge.category = "vcs"
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{AppResult, ConfigError, Result};

use loader::ConfigLoader;
use types::{BridgeConfig, GlobalConfig, LocatorConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub locator: LocatorConfig,
    pub bridge: BridgeConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitdesk_core::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("gitdesk.toml")
    ///     .with_env_prefix("GITDESK")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read and
    /// [`ConfigError::ParseError`] if it is not valid TOML or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format!("{e:#}"),
        })?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        self.locator.validate()?;
        self.bridge.validate()?;
        Ok(())
    }

    /// Effective options as `key = value` lines, sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();

        options.insert(
            "global.output_log_level",
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level",
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file",
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert("global.json_log", self.global.json_log.to_string());

        options.insert(
            "locator.max_iterations",
            self.locator.max_iterations.to_string(),
        );
        options.insert(
            "locator.poll_interval_ms",
            self.locator.poll_interval_ms.to_string(),
        );
        options.insert(
            "locator.max_duration_ms",
            self.locator
                .max_duration_ms
                .map_or_else(|| "off".to_string(), |ms| ms.to_string()),
        );

        options.insert("bridge.category", self.bridge.category.clone());
        options.insert(
            "bridge.channel_capacity",
            self.bridge.channel_capacity.to_string(),
        );
        options.insert(
            "bridge.finished_memory",
            self.bridge.finished_memory.to_string(),
        );

        let max_key_len = options.keys().map(|key| key.len()).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}
