// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded, cancellable search inside a lazily loaded sequence.
//!
//! Typical use: "scroll to commit X" while the history list is loaded page by
//! page and X may not be loaded yet.
//!
//! ```text
//! locate(target)
//!   already loaded? ----------------------------------> Found (0 loads)
//!   loop:
//!     cancelled?                  --> Cancelled      (no notification)
//!     wall-clock cap exceeded?    --> NotFound(TimeLimit)
//!     re-read sequence; present?  --> Found
//!     !has_more()                 --> NotFound(Exhausted)
//!     loads == max_iterations     --> NotFound(IterationLimit)
//!     is_loading()?
//!        ours (single-flight)     --> join it, loop
//!        foreign                  --> sleep poll_interval, loop
//!     load_more() via SingleFlight, loads += 1, publish length
//!   NotFound -> one Warning through the NotificationSink
//!   every exit -> searching = false
//! ```
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`IncrementalLocator`] | Runs searches, owns cancellation and search state |
//! | [`PagedSequence`] | Collaborator that owns the items and loads pages |
//! | [`SingleFlight`] | Shared-future guard against overlapping loads |
//! | [`InMemoryPages`] | `PagedSequence` over a fixed id list |
//! | [`LocateOutcome`] | Found / not found / cancelled |

pub mod memory;
pub mod single_flight;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::types::LocatorConfig;
use crate::error::{LocatorError, Result};
use crate::notify::{NotificationSink, Severity};

pub use memory::InMemoryPages;
pub use single_flight::{LoadError, SingleFlight};

/// Externally owned, lazily growing ordered sequence.
///
/// `load_more` appends to the sequence and updates the flags as a side
/// effect. Implementations are read fresh on every search iteration.
pub trait PagedSequence: Send + Sync {
    /// Ids of the items loaded so far, in order.
    fn current_ids(&self) -> Vec<String>;

    /// Whether more pages can be loaded.
    fn has_more(&self) -> bool;

    /// Whether a page load (from anyone) is currently running.
    fn is_loading(&self) -> bool;

    /// Load the next page.
    fn load_more(&self) -> BoxFuture<'_, Result<()>>;

    /// Position of `id` in the current sequence.
    fn position(&self, id: &str) -> Option<usize> {
        self.current_ids().iter().position(|item| item == id)
    }
}

/// Why a search ended without finding its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotFoundReason {
    /// The sequence has no more pages.
    Exhausted,
    /// The per-search page limit was reached.
    IterationLimit,
    /// The wall-clock cap elapsed.
    TimeLimit,
}

/// Normal results of [`IncrementalLocator::locate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LocateOutcome {
    Found { index: usize, loads: u32 },
    NotFound { reason: NotFoundReason, loads: u32 },
    Cancelled { loads: u32 },
}

impl LocateOutcome {
    /// Index of the target, if found.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Found { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Number of pages this search loaded itself.
    #[must_use]
    pub const fn loads(&self) -> u32 {
        match self {
            Self::Found { loads, .. } | Self::NotFound { loads, .. } | Self::Cancelled { loads } => {
                *loads
            }
        }
    }
}

impl fmt::Display for LocateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { index, loads } => write!(f, "found at index {index} after {loads} loads"),
            Self::NotFound { reason, loads } => {
                write!(f, "not found ({reason:?}) after {loads} loads")
            }
            Self::Cancelled { loads } => write!(f, "cancelled after {loads} loads"),
        }
    }
}

/// Observable search state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchState {
    pub searching: bool,
    pub target: Option<String>,
    /// Length of the sequence after the latest load.
    pub loaded: usize,
    /// Pages loaded by the current search.
    pub loads: u32,
}

/// Clears the searching flag however `locate` exits, including when its
/// future is dropped.
struct SearchGuard<'a> {
    locator: &'a IncrementalLocator,
}

impl Drop for SearchGuard<'_> {
    fn drop(&mut self) {
        self.locator.searching.store(false, Ordering::Release);
        self.locator.state.send_modify(|state| {
            state.searching = false;
            state.target = None;
        });
    }
}

/// Finds an item in a [`PagedSequence`], loading no more pages than needed.
///
/// One search runs at a time per locator; a concurrent `locate` returns
/// [`LocatorError::Busy`]. Other loaders may drive the same sequence
/// concurrently; the locator never starts a load while one is running.
pub struct IncrementalLocator {
    source: Arc<dyn PagedSequence>,
    sink: Arc<dyn NotificationSink>,
    flight: Arc<SingleFlight>,
    max_iterations: u32,
    poll_interval: Duration,
    max_duration: Option<Duration>,
    searching: AtomicBool,
    cancel_token: Mutex<CancellationToken>,
    pending: Mutex<Option<String>>,
    state: watch::Sender<SearchState>,
}

impl fmt::Debug for IncrementalLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalLocator")
            .field("max_iterations", &self.max_iterations)
            .field("poll_interval", &self.poll_interval)
            .field("max_duration", &self.max_duration)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl IncrementalLocator {
    #[must_use]
    pub fn new(
        source: Arc<dyn PagedSequence>,
        sink: Arc<dyn NotificationSink>,
        config: &LocatorConfig,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            sink,
            flight: Arc::new(SingleFlight::new()),
            max_iterations: config.max_iterations,
            poll_interval: config.poll_interval(),
            max_duration: config.max_duration(),
            searching: AtomicBool::new(false),
            cancel_token: Mutex::new(CancellationToken::new()),
            pending: Mutex::new(None),
            state,
        }
    }

    /// Share a single-flight guard with other loaders of the same sequence.
    #[must_use]
    pub fn with_single_flight(mut self, flight: Arc<SingleFlight>) -> Self {
        self.flight = flight;
        self
    }

    /// The guard this locator loads through; hand it to other loaders so their
    /// loads and ours coalesce.
    #[must_use]
    pub fn single_flight(&self) -> Arc<SingleFlight> {
        Arc::clone(&self.flight)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    /// Queue a target to be searched by [`run_pending`](Self::run_pending).
    pub fn request(&self, target: impl Into<String>) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(target.into());
    }

    #[must_use]
    pub fn pending_target(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Search for the queued target, if any.
    ///
    /// # Errors
    ///
    /// Same as [`locate`](Self::locate).
    pub async fn run_pending(&self) -> Option<std::result::Result<LocateOutcome, LocatorError>> {
        let target = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        Some(self.locate(&target).await)
    }

    /// Stop the running search at its next check and drop any queued target.
    ///
    /// Produces no notification. An in-flight page load is no longer awaited.
    pub fn cancel(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.cancel_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        debug!("search cancellation requested");
    }

    /// Find `target`, loading pages as needed.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::Busy`] if a search is already running on this locator.
    /// - [`LocatorError::LoadFailed`] if the sequence fails to load a page.
    ///
    /// Exhaustion and cancellation are reported as [`LocateOutcome`] values.
    pub async fn locate(&self, target: &str) -> std::result::Result<LocateOutcome, LocatorError> {
        // The flag and the fresh token change under one lock, so a `cancel`
        // that sees the search running always reaches its token.
        let token = {
            let mut current = self
                .cancel_token
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if self
                .searching
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(LocatorError::Busy {
                    running: self.state.borrow().target.clone().unwrap_or_default(),
                });
            }
            let token = CancellationToken::new();
            *current = token.clone();
            token
        };
        let _guard = SearchGuard { locator: self };

        self.state.send_modify(|state| {
            state.searching = true;
            state.target = Some(target.to_string());
            state.loads = 0;
        });

        if let Some(index) = self.source.position(target) {
            debug!(target, index, "target already loaded");
            return Ok(LocateOutcome::Found { index, loads: 0 });
        }

        let outcome = self.search(target, &token).await?;
        match &outcome {
            LocateOutcome::NotFound { reason, loads } => {
                info!(target, ?reason, loads, "target not found");
                self.sink
                    .notify(Severity::Warning, &not_found_message(target, *reason, *loads));
            }
            LocateOutcome::Found { index, loads } => debug!(target, index, loads, "target found"),
            LocateOutcome::Cancelled { loads } => debug!(target, loads, "search cancelled"),
        }
        Ok(outcome)
    }

    async fn search(
        &self,
        target: &str,
        token: &CancellationToken,
    ) -> std::result::Result<LocateOutcome, LocatorError> {
        let deadline = self.max_duration.map(|cap| Instant::now() + cap);
        let mut loads = 0_u32;

        loop {
            if token.is_cancelled() {
                return Ok(LocateOutcome::Cancelled { loads });
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(LocateOutcome::NotFound {
                    reason: NotFoundReason::TimeLimit,
                    loads,
                });
            }

            if let Some(index) = self.source.position(target) {
                return Ok(LocateOutcome::Found { index, loads });
            }
            if !self.source.has_more() {
                return Ok(LocateOutcome::NotFound {
                    reason: NotFoundReason::Exhausted,
                    loads,
                });
            }
            if loads >= self.max_iterations {
                return Ok(LocateOutcome::NotFound {
                    reason: NotFoundReason::IterationLimit,
                    loads,
                });
            }

            if self.source.is_loading() {
                self.wait_for_loader(token).await;
                continue;
            }

            let source = Arc::clone(&self.source);
            let load = self
                .flight
                .run(move || async move { source.load_more().await }.boxed());

            let result = tokio::select! {
                biased;
                () = token.cancelled() => return Ok(LocateOutcome::Cancelled { loads }),
                result = load => result,
            };
            result.map_err(|e| LocatorError::LoadFailed {
                target: target.to_string(),
                source: anyhow::Error::new(e),
            })?;

            // A page that lands after cancellation is not reported.
            if token.is_cancelled() {
                return Ok(LocateOutcome::Cancelled { loads });
            }

            loads += 1;
            let loaded = self.source.current_ids().len();
            debug!(target, loads, loaded, "page loaded");
            self.state.send_modify(|state| {
                state.loaded = loaded;
                state.loads = loads;
            });
        }
    }

    /// Another load is running: join it if it went through our guard,
    /// otherwise wait one poll interval.
    async fn wait_for_loader(&self, token: &CancellationToken) {
        if self.flight.is_in_flight() {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                joined = self.flight.join() => {
                    if let Some(Err(e)) = joined {
                        debug!(error = %e, "joined load failed");
                    }
                }
            }
        } else {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

fn not_found_message(target: &str, reason: NotFoundReason, loads: u32) -> String {
    match reason {
        NotFoundReason::Exhausted => format!("'{target}' was not found in the loaded history"),
        NotFoundReason::IterationLimit => {
            format!("'{target}' was not found after loading {loads} more pages")
        }
        NotFoundReason::TimeLimit => format!("Gave up searching for '{target}': time limit reached"),
    }
}
