// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic TOML files on disk.

use std::io::Write;
use std::time::Duration;

use gitdesk_core::config::Config;
use gitdesk_core::config::loader::ConfigLoader;
use gitdesk_core::logging::LogLevel;
use tempfile::NamedTempFile;

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// =============================================================================
// Loading from files
// =============================================================================

#[test]
fn config_from_file() {
    let file = toml_file(
        r#"
[global]
output_log_level = 4
json_log = true

[locator]
max_iterations = 20
poll_interval_ms = 250

[bridge]
category = "vcs"
"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert!(config.global.json_log);
    assert_eq!(config.locator.max_iterations, 20);
    assert_eq!(config.locator.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.bridge.category, "vcs");
    assert_eq!(config.bridge.channel_capacity, 256);
}

#[test]
fn config_later_files_win() {
    let base = toml_file("[locator]\nmax_iterations = 20\npoll_interval_ms = 50\n");
    let local = toml_file("[locator]\nmax_iterations = 5\n");

    let loader = ConfigLoader::new()
        .add_toml_file(base.path())
        .add_toml_file(local.path());
    assert_eq!(loader.format_sources().len(), 2);
    let config = loader.build().unwrap();

    assert_eq!(config.locator.max_iterations, 5);
    assert_eq!(config.locator.poll_interval_ms, 50);
}

#[test]
fn config_set_overrides_file() {
    let file = toml_file("[bridge]\nfinished_memory = 10\n");

    let config = ConfigLoader::new()
        .add_toml_file(file.path())
        .set_assignment("bridge.finished_memory=32")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.bridge.finished_memory, 32);
}

#[test]
fn config_invalid_file_reports_error() {
    let file = toml_file("[locator\nmax_iterations = 5\n");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn config_invalid_value_rejected() {
    let file = toml_file("[locator]\npoll_interval_ms = 0\n");
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("poll_interval_ms"), "{err:#}");
}

#[test]
fn config_sources_listed_in_order() {
    let file = toml_file("");
    let loader = ConfigLoader::new()
        .add_toml_file(file.path())
        .add_toml_str("[bridge]\ncategory = \"git\"\n");

    let sources = loader.format_sources();
    assert_eq!(sources.len(), 2);
    assert!(sources[0].starts_with("1. [file] "));
    assert_eq!(sources[1], "2. [string] <string>");
}
