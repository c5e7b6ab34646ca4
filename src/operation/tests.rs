// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{OperationKind, OperationStatus, ProgressSample, Stage, StartOptions};

#[test]
fn test_stage_order_follows_transfer() {
    assert!(Stage::Starting < Stage::Receiving);
    assert!(Stage::Receiving < Stage::Resolving);
    assert!(Stage::Resolving < Stage::Indexing);
    assert!(Stage::Indexing < Stage::Complete);
}

#[test]
fn test_terminal_stages() {
    let terminal: Vec<_> = [
        Stage::Starting,
        Stage::Receiving,
        Stage::Complete,
        Stage::Failed,
        Stage::Cancelled,
    ]
    .into_iter()
    .map(|stage| (stage.as_str(), stage.terminal_status()))
    .collect();

    insta::assert_debug_snapshot!(terminal, @r#"
    [
        (
            "Starting",
            None,
        ),
        (
            "Receiving",
            None,
        ),
        (
            "Complete",
            Some(
                Completed,
            ),
        ),
        (
            "Failed",
            Some(
                Failed,
            ),
        ),
        (
            "Cancelled",
            Some(
                Cancelled,
            ),
        ),
    ]
    "#);
}

#[test]
fn test_cancellable_kinds() {
    assert!(OperationKind::Clone.is_cancellable());
    assert!(OperationKind::Fetch.is_cancellable());
    assert!(!OperationKind::Push.is_cancellable());
    assert!(!OperationKind::Pull.is_cancellable());
}

#[test]
fn test_status_terminal() {
    assert!(!OperationStatus::Running.is_terminal());
    assert!(OperationStatus::Completed.is_terminal());
    assert!(OperationStatus::Cancelled.is_terminal());
    assert!(OperationStatus::Failed.is_terminal());
}

#[test]
fn test_sample_deserializes_camel_case() {
    let sample: ProgressSample = serde_json::from_str(
        r#"{"stage":"Resolving","receivedBytes":10,"totalDeltas":10,"indexedDeltas":5}"#,
    )
    .unwrap();

    assert_eq!(
        sample,
        ProgressSample::new(Stage::Resolving, 10).with_deltas(5, 10)
    );
}

#[test]
fn test_sample_defaults_missing_bytes_to_zero() {
    let sample: ProgressSample = serde_json::from_str(r#"{"stage":"Starting"}"#).unwrap();
    assert_eq!(sample.received_bytes, 0);
    assert!(sample.total_objects.is_none());
}

#[test]
fn test_start_options_builder() {
    let options = StartOptions::builder()
        .id("op")
        .description("fetching origin")
        .build();
    assert_eq!(options.id.as_deref(), Some("op"));
    assert_eq!(options.description.as_deref(), Some("fetching origin"));
    assert!(options.category.is_none());
    assert!(!options.cancellable);
}
