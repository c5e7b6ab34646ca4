// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};

#[test]
fn test_log_level_bounds() {
    assert!(LogLevel::new(0).is_ok());
    assert!(LogLevel::new(6).is_ok());
    assert!(LogLevel::new(7).is_err());
    assert_eq!(LogLevel::from_u8(4), Some(LogLevel::DEBUG));
    assert_eq!(LogLevel::from_u8(42), None);
}

#[test]
fn test_filter_strings() {
    let filters: Vec<_> = [
        LogLevel::SILENT,
        LogLevel::WARN,
        LogLevel::DEBUG,
        LogLevel::DUMP,
    ]
    .into_iter()
    .map(LogLevel::to_filter_string)
    .collect();

    insta::assert_debug_snapshot!(filters, @r#"
    [
        "off",
        "warn,gitdesk_core=warn,gitdesk=warn",
        "warn,gitdesk_core=debug,gitdesk=debug",
        "trace",
    ]
    "#);
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::DEBUG);
    assert!(config.log_file().is_none());
    assert!(!config.json_file());
}

#[test]
fn test_log_level_deserialize_rejects_out_of_range() {
    let ok: Result<LogLevel, _> = serde_json::from_str("5");
    let bad: Result<LogLevel, _> = serde_json::from_str("9");
    assert_eq!(ok.ok(), Some(LogLevel::TRACE));
    assert!(bad.is_err());
}
