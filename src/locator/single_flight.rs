// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-flight guard for page loads.
//!
//! ```text
//! caller A --run()--> no live load -> create Shared future, keep WeakShared
//! caller B --run()--> live load    -> clone Shared, await the same result
//!
//! all holders dropped -> load future dropped (aborted), slot upgrade fails
//! load finished       -> slot cleared, next run() starts a new load
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use thiserror::Error;

/// Failure of a shared load, observed identically by every joined caller.
#[derive(Debug, Clone, Error)]
#[error("{0:#}")]
pub struct LoadError(Arc<anyhow::Error>);

type SharedLoad = Shared<BoxFuture<'static, Result<(), LoadError>>>;

/// Coalesces concurrent loads of one resource into a single in-flight call.
#[derive(Default)]
pub struct SingleFlight {
    slot: Mutex<Option<WeakShared<BoxFuture<'static, Result<(), LoadError>>>>>,
}

impl std::fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

impl SingleFlight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live, unfinished load, if any.
    fn live(&self) -> Option<SharedLoad> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .and_then(WeakShared::upgrade)
            .filter(|shared| shared.peek().is_none())
    }

    /// Whether a load started through this guard is still running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.live().is_some()
    }

    /// Wait for the in-flight load, if there is one.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn join(&self) -> Option<Result<(), LoadError>> {
        let shared = self.live()?;
        let result = shared.clone().await;
        self.clear_if(&shared);
        Some(result)
    }

    /// Run `start` unless a load is already in flight, in which case wait for
    /// that one instead. Every caller observes the same result.
    ///
    /// Dropping the returned future releases this caller's handle; the load
    /// itself is dropped once no caller holds it.
    ///
    /// # Errors
    ///
    /// Returns the shared load's error.
    pub async fn run<F>(&self, start: F) -> Result<(), LoadError>
    where
        F: FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send,
    {
        let shared = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            let live = slot
                .as_ref()
                .and_then(WeakShared::upgrade)
                .filter(|shared| shared.peek().is_none());
            if let Some(shared) = live {
                tracing::trace!("joining in-flight load");
                shared
            } else {
                let shared = start()
                    .map(|result| result.map_err(|e| LoadError(Arc::new(e))))
                    .boxed()
                    .shared();
                *slot = shared.downgrade();
                shared
            }
        };

        let result = shared.clone().await;
        self.clear_if(&shared);
        result
    }

    fn clear_if(&self, finished: &SharedLoad) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let same = slot
            .as_ref()
            .and_then(WeakShared::upgrade)
            .is_some_and(|current| current.ptr_eq(finished));
        if same {
            *slot = None;
        }
    }
}
