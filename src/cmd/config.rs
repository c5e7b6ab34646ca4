// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Config-related commands for gitdesk.

use crate::config::Config;

/// Display current configuration options.
pub fn run_options_command(config: &Config) {
    for line in config.format_options() {
        println!("{line}");
    }
}

/// Display loaded configuration files.
pub fn run_sources_command(sources: &[String]) {
    if sources.is_empty() {
        println!("No configuration files loaded");
    } else {
        for line in sources {
            println!("{line}");
        }
    }
}
