// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Replay command arguments.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `replay` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ReplayArgs {
    /// JSON-lines file with one progress notification per line.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Delay between notifications, in milliseconds.
    #[arg(long = "delay-ms", value_name = "MS", default_value_t = 0)]
    pub delay_ms: u64,

    /// Cancels this operation as soon as it appears in the registry.
    /// Can be specified multiple times.
    #[arg(long = "cancel", value_name = "ID", action = clap::ArgAction::Append)]
    pub cancel: Vec<String>,

    /// Hides progress bars.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
