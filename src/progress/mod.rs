// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Turns raw progress samples into a percentage and a display line.
//!
//! ```text
//! first match wins:
//!   1. Resolving, total_deltas > 0, indexed_deltas  -> "Resolving: 5/10"
//!   2. total_objects > 0, received_objects          -> "Receiving: 3/9 (2.0 KB)"
//!   3. anything else                                -> "Receiving: 2.0 KB"  (0%)
//! ```
//!
//! Both functions are total. The `message` field never influences the result.

use serde::Serialize;

use crate::operation::{ProgressSample, Stage};

/// Translated form of a [`ProgressSample`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressDisplay {
    /// Always within `0..=100`.
    pub percent: u8,
    pub text: String,
}

/// Translate a sample into a percentage and display text.
#[must_use]
pub fn translate(sample: &ProgressSample) -> ProgressDisplay {
    if sample.stage == Stage::Resolving
        && let Some(total) = sample.total_deltas.filter(|total| *total > 0)
        && let Some(indexed) = sample.indexed_deltas
    {
        return ProgressDisplay {
            percent: percent_of(indexed, total),
            text: format!("Resolving: {indexed}/{total}"),
        };
    }

    if let Some(total) = sample.total_objects.filter(|total| *total > 0)
        && let Some(received) = sample.received_objects
    {
        return ProgressDisplay {
            percent: percent_of(received, total),
            text: format!(
                "{}: {received}/{total} ({})",
                sample.stage,
                human_bytes(sample.received_bytes)
            ),
        };
    }

    ProgressDisplay {
        percent: 0,
        text: format!("{}: {}", sample.stage, human_bytes(sample.received_bytes)),
    }
}

/// `round(done / total * 100)`, saturating at 100. `total` must be non-zero.
fn percent_of(done: u64, total: u64) -> u8 {
    let done = u128::from(done);
    let total = u128::from(total);
    let rounded = (done * 100 + total / 2) / total;
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Render a byte count with 1024-based units and one decimal place.
///
/// `0` renders as `"0 B"`; gigabytes are the largest unit.
#[must_use]
pub fn human_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests;
