// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   Replay | Locate | Options | Sources | Version
//! ```

use std::process::ExitCode;

use gitdesk_core::cli::global::GlobalOptions;
use gitdesk_core::cli::{self, Command};
use gitdesk_core::cmd::config::{run_options_command, run_sources_command};
use gitdesk_core::cmd::locate::run_locate_command;
use gitdesk_core::cmd::replay::run_replay_command;
use gitdesk_core::config::Config;
use gitdesk_core::config::loader::ConfigLoader;
use gitdesk_core::logging::init_logging;
use gitdesk_core::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Config file picked up from the working directory when present.
const DEFAULT_CONFIG_FILE: &str = "gitdesk.toml";

/// Prefix of `GITDESK_SECTION__KEY` environment overrides.
const ENV_PREFIX: &str = "GITDESK";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    // Config is loaded before logging so `[global]` can set log levels; the
    // command line still wins.
    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&cli.global, &config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

fn build_log_config(global: &GlobalOptions, config: &Config) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(config.global.output_log_level);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(config.global.file_log_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.clone().or_else(|| config.global.log_file.clone()))
        .with_json_file(config.global.json_log)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: &Config) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Sources) => {
            run_sources_command(&build_config_loader(&cli.global).format_sources());
            Ok(())
        }
        Some(Command::Replay(args)) => run_replay_command(args, config).await,
        Some(Command::Locate(args)) => run_locate_command(args, config).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}

fn load_config(global: &GlobalOptions) -> gitdesk_core::error::Result<Config> {
    let mut loader = build_config_loader(global);
    for assignment in &global.options {
        loader = loader.set_assignment(assignment)?;
    }
    loader.build()
}
