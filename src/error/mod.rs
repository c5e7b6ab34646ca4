// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!        AppError (one pointer + tag)
//!                  |
//!      +-----------+-----------+
//!      |           |           |
//!      v           v           v
//!   Locator     Bridge      Config
//!     Box         Box         Box
//!
//! Sub-errors (unboxed internally):
//!   Locator  LoadFailed, Busy
//!   Bridge   AlreadySubscribed, ShutDown, TaskPanicked
//!   Config   ParseError, InvalidValue, ReadError
//!
//! Unknown operation ids are not errors: registry mutators
//! are total and ignore them.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`AppError`].
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum pointer-sized plus a tag.
#[derive(Debug, Error)]
pub enum AppError {
    /// Incremental search failed abnormally.
    #[error("locator error: {0}")]
    Locator(#[from] Box<LocatorError>),

    /// Progress event bridge misuse or failure.
    #[error("bridge error: {0}")]
    Bridge(#[from] Box<BridgeError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),
}

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for AppError {
                fn from(err: $error) -> Self {
                    AppError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    LocatorError => Locator,
    BridgeError => Bridge,
    ConfigError => Config,
}

// --- Locator Errors ---

/// Abnormal terminations of an incremental search.
///
/// Exhaustion and cancellation are normal outcomes and are reported through
/// `LocateOutcome`, not here.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// The paged-loading collaborator failed to load the next page.
    #[error("failed to load more items while locating '{target}': {source}")]
    LoadFailed {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// Another search is already running on this locator.
    #[error("a search for '{running}' is already in progress")]
    Busy { running: String },
}

// --- Bridge Errors ---

/// Progress event bridge errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `start` was called on a bridge that already has a subscription.
    #[error("progress bridge is already subscribed")]
    AlreadySubscribed,

    /// `start` was called after the bridge was shut down.
    #[error("progress bridge has been shut down")]
    ShutDown,

    /// The processing task panicked.
    #[error("progress bridge task panicked: {0}")]
    TaskPanicked(String),
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

#[cfg(test)]
mod tests;
