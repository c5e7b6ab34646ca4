// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{human_bytes, translate};
use crate::operation::{ProgressSample, Stage};

#[test]
fn test_resolving_uses_deltas_regardless_of_bytes() {
    for bytes in [0, 1, 4096, u64::MAX] {
        let sample = ProgressSample::new(Stage::Resolving, bytes).with_deltas(5, 10);
        let display = translate(&sample);
        assert_eq!(display.percent, 50);
        assert!(display.text.contains("5/10"), "{}", display.text);
    }
}

#[test]
fn test_receiving_without_totals_falls_back_to_bytes() {
    let mut sample = ProgressSample::new(Stage::Receiving, 2048);
    sample.total_objects = Some(0);
    let display = translate(&sample);

    assert_eq!(display.percent, 0);
    insta::assert_snapshot!(display.text, @"Receiving: 2.0 KB");
}

#[test]
fn test_objects_branch_text() {
    let sample = ProgressSample::new(Stage::Receiving, 3 * 1024 * 1024).with_objects(30, 120);
    let display = translate(&sample);

    assert_eq!(display.percent, 25);
    insta::assert_snapshot!(display.text, @"Receiving: 30/120 (3.0 MB)");
}

#[test]
fn test_resolving_with_zero_deltas_uses_objects() {
    let sample = ProgressSample::new(Stage::Resolving, 0)
        .with_deltas(0, 0)
        .with_objects(1, 4);
    let display = translate(&sample);

    assert_eq!(display.percent, 25);
    assert_eq!(display.text, "Resolving: 1/4 (0 B)");
}

#[test]
fn test_deltas_ignored_outside_resolving() {
    let sample = ProgressSample::new(Stage::Indexing, 512).with_deltas(5, 10);
    let display = translate(&sample);

    assert_eq!(display.percent, 0);
    assert_eq!(display.text, "Indexing: 512.0 B");
}

#[test]
fn test_missing_received_objects_falls_back() {
    let mut sample = ProgressSample::new(Stage::Counting, 0);
    sample.total_objects = Some(50);
    let display = translate(&sample);

    assert_eq!(display.percent, 0);
    assert_eq!(display.text, "Counting: 0 B");
}

#[test]
fn test_percent_is_clamped_and_rounded() {
    let over = ProgressSample::new(Stage::Receiving, 0).with_objects(15, 10);
    assert_eq!(translate(&over).percent, 100);

    let half_up = ProgressSample::new(Stage::Receiving, 0).with_objects(1, 8);
    assert_eq!(translate(&half_up).percent, 13);

    let huge = ProgressSample::new(Stage::Resolving, 0).with_deltas(u64::MAX, u64::MAX);
    assert_eq!(translate(&huge).percent, 100);
}

#[test]
fn test_percent_stays_in_range() {
    let counters = [0, 1, 2, 7, 99, 100, 1_000, u64::MAX];
    for stage in [Stage::Receiving, Stage::Resolving, Stage::Indexing] {
        for &done in &counters {
            for &total in &counters {
                let sample = ProgressSample::new(stage, done)
                    .with_objects(done, total)
                    .with_deltas(done, total);
                assert!(translate(&sample).percent <= 100);
            }
        }
    }
}

#[test]
fn test_message_does_not_affect_percent() {
    let plain = ProgressSample::new(Stage::Receiving, 10).with_objects(1, 2);
    let noisy = plain.clone().with_message("100% done, trust me");
    assert_eq!(translate(&plain), translate(&noisy));
}

#[test]
fn test_human_bytes() {
    let rendered: Vec<_> = [
        0,
        1,
        1023,
        1024,
        2048,
        1536,
        5 * 1024 * 1024,
        3 * 1024 * 1024 * 1024,
        2048 * 1024 * 1024 * 1024,
    ]
    .into_iter()
    .map(human_bytes)
    .collect();

    insta::assert_debug_snapshot!(rendered, @r#"
    [
        "0 B",
        "1.0 B",
        "1023.0 B",
        "1.0 KB",
        "2.0 KB",
        "1.5 KB",
        "5.0 MB",
        "3.0 GB",
        "2048.0 GB",
    ]
    "#);
}
