// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Locate command arguments.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `locate` command.
#[derive(Debug, Clone, Args)]
pub struct LocateArgs {
    /// File with one id per line, newest first.
    #[arg(value_name = "IDS")]
    pub ids: PathBuf,

    /// Id to search for.
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ids revealed per page load.
    #[arg(short = 'p', long = "page-size", value_name = "N", default_value_t = 50,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Ids loaded before the search starts.
    #[arg(long = "initial", value_name = "N", default_value_t = 0)]
    pub initial: usize,

    /// Simulated latency of each page load, in milliseconds.
    #[arg(long = "latency-ms", value_name = "MS", default_value_t = 0)]
    pub latency_ms: u64,

    /// Prints the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}
