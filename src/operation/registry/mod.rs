// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Registry of in-flight operations.
//!
//! ```text
//! OperationRegistry (Clone handle, Arc inside)
//!   active: DashMap<id, Entry>      sharded, per-entry locks
//!   events: broadcast<RegistryEvent>
//!
//!   finished: Mutex<RecentlyFinished> bounded, oldest evicted first
//!
//!   start ----------> insert or refresh metadata   -> Started | Updated
//!   track ----------> start unless recently finished
//!   update_progress -> replace progress wholesale  -> Progress
//!   complete/fail --> remove + remember id         -> Finished
//!   cancel ---------> remove_if(cancellable)       -> Finished + token fired
//! ```
//!
//! Every mutator is total. Progress and completion notifications can race
//! against consumers that already stopped tracking an id, so unknown ids are
//! ignored instead of reported.
//!
//! Terminal transitions and `track` serialize on the `finished` lock, which is
//! always taken before any map shard. A `track` can therefore never observe an
//! id that has left the map but is not yet remembered.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{Operation, OperationProgress, OperationStatus, StartOptions};

/// Capacity of the change-event channel; slow observers see `Lagged`.
const EVENT_CAPACITY: usize = 256;

/// Finished ids remembered by [`OperationRegistry::new`].
pub const DEFAULT_FINISHED_MEMORY: usize = 256;

/// Change notification for observers of the registry.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A new operation became active.
    Started(Operation),
    /// An active operation's metadata was refreshed by a repeated `start`.
    Updated(Operation),
    /// Progress was replaced.
    Progress {
        id: String,
        progress: OperationProgress,
    },
    /// The operation reached a terminal status and left the active set.
    Finished(Operation),
}

struct Entry {
    operation: Operation,
    seq: u64,
    cancel_token: CancellationToken,
}

/// Most recently finished ids, oldest evicted first.
#[derive(Debug, Default)]
struct RecentlyFinished {
    capacity: usize,
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl RecentlyFinished {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    fn remember(&mut self, id: &str) {
        if self.capacity == 0 || self.ids.contains(id) {
            return;
        }
        if self.order.len() == self.capacity
            && let Some(evicted) = self.order.pop_front()
        {
            self.ids.remove(&evicted);
        }
        self.order.push_back(id.to_string());
        self.ids.insert(id.to_string());
    }

    fn forget(&mut self, id: &str) {
        if self.ids.remove(id) {
            self.order.retain(|remembered| remembered != id);
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

struct Inner {
    active: DashMap<String, Entry>,
    finished: Mutex<RecentlyFinished>,
    next_seq: AtomicU64,
    events: broadcast::Sender<RegistryEvent>,
}

/// Authoritative map of operation id to operation state.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct OperationRegistry {
    inner: Arc<Inner>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("active", &self.inner.active.len())
            .finish_non_exhaustive()
    }
}

impl OperationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_finished_memory(DEFAULT_FINISHED_MEMORY)
    }

    /// Registry remembering the last `capacity` finished ids for [`track`](Self::track).
    #[must_use]
    pub fn with_finished_memory(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                active: DashMap::new(),
                finished: Mutex::new(RecentlyFinished::new(capacity)),
                next_seq: AtomicU64::new(1),
                events,
            }),
        }
    }

    /// Subscribe to change events. Only events sent after this call are seen.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.inner.events.subscribe()
    }

    fn next_seq(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_finished(&self) -> MutexGuard<'_, RecentlyFinished> {
        // The set stays consistent across a panic in another holder.
        self.inner
            .finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: RegistryEvent) {
        // No receivers is fine: nobody is watching.
        let _ = self.inner.events.send(event);
    }

    /// Starts tracking an operation and returns its id.
    ///
    /// If `options.id` names an operation that is already active, its name,
    /// description and category are replaced in place and no second entry is
    /// created. `cancellable` keeps the value it had at creation.
    ///
    /// An explicit start clears any memory of `id` having finished, so
    /// [`track`](Self::track) accepts it again.
    pub fn start(&self, name: impl Into<String>, options: StartOptions) -> String {
        let mut finished = self.lock_finished();
        if let Some(id) = options.id.as_deref() {
            finished.forget(id);
        }
        let (id, event) = self.insert_or_refresh(name.into(), options);
        drop(finished);

        self.emit(event);
        id
    }

    /// Like [`start`](Self::start), but refuses ids that finished recently.
    ///
    /// Used for operations reported by the backend: progress that arrives
    /// after a terminal transition (for example a sample already in flight
    /// when the user cancelled) must not bring the operation back. Returns
    /// `None` when the id was refused.
    pub fn track(&self, name: impl Into<String>, options: StartOptions) -> Option<String> {
        let finished = self.lock_finished();
        if let Some(id) = options.id.as_deref()
            && finished.contains(id)
        {
            trace!(id, "start refused for finished operation");
            return None;
        }
        let (id, event) = self.insert_or_refresh(name.into(), options);
        drop(finished);

        self.emit(event);
        Some(id)
    }

    /// Whether `id` is among the recently finished operations.
    #[must_use]
    pub fn is_finished(&self, id: &str) -> bool {
        self.lock_finished().contains(id)
    }

    fn insert_or_refresh(&self, name: String, options: StartOptions) -> (String, RegistryEvent) {
        let seq = self.next_seq();
        let id = options.id.unwrap_or_else(|| format!("op-{seq}"));

        let event = match self.inner.active.entry(id.clone()) {
            MapEntry::Occupied(mut occupied) => {
                let operation = &mut occupied.get_mut().operation;
                operation.name = name;
                operation.description = options.description;
                operation.category = options.category;
                trace!(id = %id, "refreshed active operation");
                RegistryEvent::Updated(operation.clone())
            }
            MapEntry::Vacant(vacant) => {
                let operation = Operation {
                    id: id.clone(),
                    name,
                    description: options.description,
                    category: options.category,
                    cancellable: options.cancellable,
                    status: OperationStatus::Running,
                    progress: None,
                    started_at: SystemTime::now(),
                    error: None,
                };
                debug!(id = %id, name = %operation.name, cancellable = operation.cancellable, "operation started");
                vacant.insert(Entry {
                    operation: operation.clone(),
                    seq,
                    cancel_token: CancellationToken::new(),
                });
                RegistryEvent::Started(operation)
            }
        };
        (id, event)
    }

    /// Replaces the progress of an active operation.
    ///
    /// Returns `false` (and does nothing) when `id` is not active.
    pub fn update_progress(&self, id: &str, progress: OperationProgress) -> bool {
        let Some(mut entry) = self.inner.active.get_mut(id) else {
            trace!(id, "progress for inactive operation ignored");
            return false;
        };
        entry.operation.progress = Some(progress.clone());
        drop(entry);

        self.emit(RegistryEvent::Progress {
            id: id.to_string(),
            progress,
        });
        true
    }

    /// Marks an operation completed and removes it. Repeated calls are no-ops.
    pub fn complete(&self, id: &str) {
        self.finish(id, OperationStatus::Completed, None);
    }

    /// Marks an operation failed and removes it. Repeated calls are no-ops.
    pub fn fail(&self, id: &str, message: Option<String>) {
        self.finish(id, OperationStatus::Failed, message);
    }

    /// Requests cancellation.
    ///
    /// Accepted only for an active, cancellable operation: its status becomes
    /// `Cancelled`, it leaves the active set, and its cancellation token fires.
    /// Returns whether the request was accepted.
    pub fn cancel(&self, id: &str) -> bool {
        let mut finished = self.lock_finished();
        let Some((_, entry)) = self
            .inner
            .active
            .remove_if(id, |_, entry| entry.operation.cancellable)
        else {
            debug!(id, "cancel rejected: unknown or not cancellable");
            return false;
        };
        finished.remember(id);
        drop(finished);

        entry.cancel_token.cancel();
        self.emit_finished(entry, OperationStatus::Cancelled, None);
        true
    }

    /// Ends an operation with a terminal status regardless of `cancellable`.
    ///
    /// Used when the backend itself reports the outcome. The id is remembered
    /// as finished even when it was not active, so a terminal report that
    /// overtakes the first progress sample still wins.
    pub fn finish(&self, id: &str, status: OperationStatus, message: Option<String>) {
        debug_assert!(status.is_terminal(), "finish called with {status:?}");
        let mut finished = self.lock_finished();
        let removed = self.inner.active.remove(id);
        finished.remember(id);
        drop(finished);

        let Some((_, entry)) = removed else {
            trace!(id, ?status, "finish for inactive operation ignored");
            return;
        };

        if status == OperationStatus::Cancelled {
            entry.cancel_token.cancel();
        }
        self.emit_finished(entry, status, message);
    }

    fn emit_finished(&self, entry: Entry, status: OperationStatus, message: Option<String>) {
        let mut operation = entry.operation;
        operation.status = status;
        operation.error = message;
        debug!(id = %operation.id, ?status, "operation finished");
        self.emit(RegistryEvent::Finished(operation));
    }

    /// Snapshot of an active operation.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Operation> {
        self.inner
            .active
            .get(id)
            .map(|entry| entry.operation.clone())
    }

    /// Snapshots of all active operations, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Operation> {
        let mut entries: Vec<(u64, Operation)> = self
            .inner
            .active
            .iter()
            .map(|entry| (entry.seq, entry.operation.clone()))
            .collect();
        entries.sort_unstable_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, operation)| operation).collect()
    }

    /// Token fired when the operation is cancelled, for backend workers to observe.
    #[must_use]
    pub fn cancellation_token(&self, id: &str) -> Option<CancellationToken> {
        self.inner
            .active
            .get(id)
            .map(|entry| entry.cancel_token.clone())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.active.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.active.is_empty()
    }
}

#[cfg(test)]
mod tests;
