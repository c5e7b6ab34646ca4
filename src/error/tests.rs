// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{AppError, AppResult, BridgeError, ConfigError, LocatorError};

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidValue {
        section: "locator".to_string(),
        key: "max_iterations".to_string(),
        message: "must be greater than 0".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'max_iterations' in section '[locator]': must be greater than 0"
    );
}

#[test]
fn test_load_failed_keeps_source() {
    let err = LocatorError::LoadFailed {
        target: "abc123".to_string(),
        source: anyhow::anyhow!("backend unavailable"),
    };
    assert!(std::error::Error::source(&err).is_some());
    insta::assert_snapshot!(
        err.to_string(),
        @"failed to load more items while locating 'abc123': backend unavailable"
    );
}

#[test]
fn test_boxed_conversion() {
    let err: AppError = BridgeError::AlreadySubscribed.into();
    assert!(matches!(err, AppError::Bridge(_)));
    assert_eq!(
        err.to_string(),
        "bridge error: progress bridge is already subscribed"
    );
}

#[test]
fn test_app_error_size() {
    // Every variant is a thin Box, so only the discriminant is added
    let size = std::mem::size_of::<AppError>();
    assert!(size <= 16, "AppError is {size} bytes, expected <= 16");
}

#[test]
fn test_app_result_size() {
    let size = std::mem::size_of::<AppResult<()>>();
    assert!(size <= 16, "AppResult<()> is {size} bytes, expected <= 16");
}

#[test]
fn test_every_variant_is_produced_by_conversion() {
    let locator: AppError = LocatorError::Busy {
        running: "abc123".to_string(),
    }
    .into();
    let config: AppError = ConfigError::ParseError {
        path: "gitdesk.toml".to_string(),
        message: "expected '='".to_string(),
    }
    .into();

    assert!(matches!(locator, AppError::Locator(_)));
    assert!(matches!(config, AppError::Config(_)));
}
