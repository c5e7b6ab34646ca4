// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use crate::cli::{Cli, Command};
use clap::Parser;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["gitdesk", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "gitdesk",
        "-l",
        "5",
        "-c",
        "a.toml",
        "--config",
        "b.toml",
        "-s",
        "locator.max_iterations=10",
        "--no-default-config",
        "options",
    ])
    .unwrap();

    assert_eq!(cli.global.log_level, Some(5));
    assert_eq!(
        cli.global.configs,
        vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]
    );
    assert_eq!(cli.global.options, vec!["locator.max_iterations=10"]);
    assert!(cli.global.no_default_config);
    assert!(matches!(cli.command, Some(Command::Options)));
}

#[test]
fn test_log_level_out_of_range() {
    assert!(Cli::try_parse_from(["gitdesk", "-l", "7", "version"]).is_err());
}

#[test]
fn test_parse_replay() {
    let cli = Cli::try_parse_from([
        "gitdesk",
        "replay",
        "events.jsonl",
        "--delay-ms",
        "20",
        "--cancel",
        "clone-1",
        "-q",
    ])
    .unwrap();

    let Some(Command::Replay(args)) = cli.command else {
        panic!("expected replay command");
    };
    assert_eq!(args.file, PathBuf::from("events.jsonl"));
    assert_eq!(args.delay_ms, 20);
    assert_eq!(args.cancel, vec!["clone-1"]);
    assert!(args.quiet);
}

#[test]
fn test_parse_locate_defaults() {
    let cli = Cli::try_parse_from(["gitdesk", "locate", "ids.txt", "target-oid"]).unwrap();

    let Some(Command::Locate(args)) = cli.command else {
        panic!("expected locate command");
    };
    assert_eq!(args.ids, PathBuf::from("ids.txt"));
    assert_eq!(args.target, "target-oid");
    assert_eq!(args.page_size, 50);
    assert_eq!(args.initial, 0);
    assert_eq!(args.latency_ms, 0);
    assert!(!args.json);
}

#[test]
fn test_locate_rejects_zero_page_size() {
    assert!(Cli::try_parse_from(["gitdesk", "locate", "ids.txt", "x", "-p", "0"]).is_err());
}

#[test]
fn test_no_command() {
    let cli = Cli::try_parse_from(["gitdesk"]).unwrap();
    assert!(cli.command.is_none());
}
