// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for gitdesk using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! gitdesk [global options] <command>
//! replay FILE            feed recorded progress notifications through the bridge
//! locate IDS TARGET      search a paged id list for TARGET
//! options                print the effective configuration
//! sources                print the loaded configuration files
//! version
//! ```

pub mod global;
pub mod locate;
pub mod replay;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::cli::locate::LocateArgs;
use crate::cli::replay::ReplayArgs;
use clap::{Parser, Subcommand};

/// Git client operation tracking core.
///
/// Drives the operation registry, progress bridge and incremental locator
/// from the command line.
#[derive(Debug, Parser)]
#[command(
    name = "gitdesk",
    author,
    version,
    about = "Git client operation tracking",
    long_about = "gitdesk Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Tracks long-running Git operations and locates commits in\n\
                  lazily loaded history. `gitdesk replay events.jsonl` replays a\n\
                  recorded progress stream; `gitdesk locate ids.txt <oid>` runs\n\
                  an incremental search. See `gitdesk <command> --help` for more\n\
                  information about a command.",
    after_help = "CONFIGURATION:\n\n\
                  gitdesk reads `gitdesk.toml` from the current directory when it\n\
                  exists, then every file given with --config, in order. Variables\n\
                  named GITDESK_<SECTION>__<KEY> override file values, and --set\n\
                  overrides everything. Use --no-default-config to skip\n\
                  `gitdesk.toml`."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Lists the configuration files used by gitdesk.
    Sources,

    /// Replays a recorded progress notification stream.
    Replay(ReplayArgs),

    /// Searches a paged id list for a target.
    Locate(LocateArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
