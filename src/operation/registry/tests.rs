// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{OperationRegistry, RegistryEvent};
use crate::operation::{OperationProgress, OperationStatus, ProgressSample, Stage, StartOptions};

fn with_id(id: &str) -> StartOptions {
    StartOptions::builder().id(id).build()
}

fn receiving(received: u64, total: u64) -> OperationProgress {
    OperationProgress::from_sample(
        ProgressSample::new(Stage::Receiving, 1024).with_objects(received, total),
    )
}

#[test]
fn test_start_generates_unique_ids() {
    let registry = OperationRegistry::new();
    let first = registry.start("Clone", StartOptions::default());
    let second = registry.start("Clone", StartOptions::default());

    assert_ne!(first, second);
    assert!(first.starts_with("op-"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_start_twice_keeps_single_entry_and_later_fields_win() {
    let registry = OperationRegistry::new();
    let first = registry.start(
        "Fetch",
        StartOptions::builder()
            .id("X")
            .description("first")
            .cancellable(true)
            .build(),
    );
    let second = registry.start(
        "Pull",
        StartOptions::builder()
            .id("X")
            .description("second")
            .category("git")
            .build(),
    );

    assert_eq!(first, "X");
    assert_eq!(second, "X");
    assert_eq!(registry.len(), 1);

    let op = registry.get("X").unwrap();
    assert_eq!(op.name, "Pull");
    assert_eq!(op.description.as_deref(), Some("second"));
    assert_eq!(op.category.as_deref(), Some("git"));
    // cancellable is fixed at creation
    assert!(op.cancellable);
}

#[test]
fn test_update_progress_replaces_wholesale() {
    let registry = OperationRegistry::new();
    registry.start("Clone", with_id("c"));

    let with_deltas = OperationProgress::from_sample(
        ProgressSample::new(Stage::Resolving, 10).with_deltas(1, 4),
    );
    assert!(registry.update_progress("c", with_deltas));
    assert!(registry.update_progress("c", receiving(3, 10)));

    let progress = registry.get("c").unwrap().progress.unwrap();
    assert_eq!(progress.sample.stage, Stage::Receiving);
    assert!(progress.sample.total_deltas.is_none());
    assert_eq!(progress.percent, 30);
}

#[test]
fn test_update_progress_unknown_id_is_noop() {
    let registry = OperationRegistry::new();
    assert!(!registry.update_progress("missing", receiving(1, 2)));
    assert!(registry.is_empty());
}

#[test]
fn test_complete_is_idempotent() {
    let registry = OperationRegistry::new();
    registry.start("Push", with_id("p"));

    registry.complete("p");
    assert!(registry.get("p").is_none());
    registry.complete("p");
    assert!(registry.get("p").is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_progress_after_complete_is_ignored() {
    let registry = OperationRegistry::new();
    registry.start("Push", with_id("p"));
    registry.complete("p");

    assert!(!registry.update_progress("p", receiving(1, 1)));
    assert!(!registry.contains("p"));
}

#[test]
fn test_cancel_requires_cancellable() {
    let registry = OperationRegistry::new();
    registry.start("Push", with_id("push"));
    registry.start(
        "Fetch",
        StartOptions::builder().id("fetch").cancellable(true).build(),
    );

    assert!(!registry.cancel("push"));
    assert!(registry.contains("push"));

    let token = registry.cancellation_token("fetch").unwrap();
    assert!(registry.cancel("fetch"));
    assert!(token.is_cancelled());
    assert!(!registry.contains("fetch"));

    // Second cancel: already gone
    assert!(!registry.cancel("fetch"));
    assert!(!registry.cancel("unknown"));
}

#[test]
fn test_track_refuses_finished_ids() {
    let registry = OperationRegistry::new();
    let fetch = StartOptions::builder().id("fetch").cancellable(true).build();

    assert_eq!(registry.track("Fetch", fetch.clone()).as_deref(), Some("fetch"));
    assert!(registry.cancel("fetch"));
    assert!(registry.is_finished("fetch"));

    assert_eq!(registry.track("Fetch", fetch.clone()), None);
    assert!(registry.is_empty());

    // An explicit start is a new operation under the same id
    registry.start("Fetch", fetch.clone());
    assert!(!registry.is_finished("fetch"));
    assert!(!registry.cancellation_token("fetch").unwrap().is_cancelled());
    assert_eq!(registry.track("Fetch", fetch).as_deref(), Some("fetch"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_finish_remembers_ids_never_tracked() {
    let registry = OperationRegistry::new();
    registry.complete("overtaken");

    assert!(registry.is_finished("overtaken"));
    assert_eq!(registry.track("Pull", with_id("overtaken")), None);
}

#[test]
fn test_rejected_cancel_is_not_remembered() {
    let registry = OperationRegistry::new();
    registry.start("Push", with_id("push"));

    assert!(!registry.cancel("push"));
    assert!(!registry.is_finished("push"));
}

#[test]
fn test_finished_memory_evicts_oldest() {
    let registry = OperationRegistry::with_finished_memory(2);
    for id in ["a", "b", "c"] {
        registry.complete(id);
    }

    assert!(!registry.is_finished("a"));
    assert!(registry.is_finished("b"));
    assert!(registry.is_finished("c"));

    let forgetful = OperationRegistry::with_finished_memory(0);
    forgetful.complete("a");
    assert!(!forgetful.is_finished("a"));
}

#[test]
fn test_list_is_ordered_by_start() {
    let registry = OperationRegistry::new();
    for id in ["c", "a", "b"] {
        registry.start("Fetch", with_id(id));
    }
    registry.complete("a");

    let ids: Vec<_> = registry.list().into_iter().map(|op| op.id).collect();
    assert_eq!(ids, ["c", "b"]);
}

#[test]
fn test_events_follow_lifecycle() {
    let registry = OperationRegistry::new();
    let mut events = registry.subscribe();

    registry.start("Clone", StartOptions::builder().id("e").cancellable(true).build());
    registry.start("Clone", with_id("e"));
    registry.update_progress("e", receiving(5, 10));
    registry.fail("e", Some("remote hung up".to_string()));
    registry.complete("e");

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(match event {
            RegistryEvent::Started(op) => format!("started {}", op.id),
            RegistryEvent::Updated(op) => format!("updated {}", op.id),
            RegistryEvent::Progress { id, progress } => {
                format!("progress {id} {}", progress.percent)
            }
            RegistryEvent::Finished(op) => {
                format!("finished {} {:?} {:?}", op.id, op.status, op.error)
            }
        });
    }

    insta::assert_debug_snapshot!(kinds, @r#"
    [
        "started e",
        "updated e",
        "progress e 50",
        "finished e Failed Some(\"remote hung up\")",
    ]
    "#);
}

#[test]
fn test_finish_cancelled_fires_token_even_if_not_cancellable() {
    let registry = OperationRegistry::new();
    registry.start("Push", with_id("p"));
    let token = registry.cancellation_token("p").unwrap();

    registry.finish("p", OperationStatus::Cancelled, None);
    assert!(token.is_cancelled());
    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_start_never_duplicates() {
    let registry = OperationRegistry::new();
    let mut handles = Vec::new();
    for n in 0..32 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let id = format!("shared-{}", n % 4);
            registry.start("Fetch", StartOptions::builder().id(id.clone()).build());
            registry.update_progress(&id, receiving(n, 32));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.len(), 4);
}
