// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |             replay / locate / options
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '--+--------------------+---'
//!                 |                    |
//!                 v                    v
//!  backend --> bridge              locator
//!   events   (flume, task)     (paged search,
//!                 |             single-flight)
//!                 v                    |
//!             progress                 v
//!            (translate)            notify
//!                 |              (user messages)
//!                 v
//!             operation
//!        (registry, DashMap)
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod bridge;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod locator;
pub mod logging;
pub mod notify;
pub mod operation;
pub mod progress;
