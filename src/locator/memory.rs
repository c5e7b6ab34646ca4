// gitdesk-core: Git client operation tracking
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory [`PagedSequence`] that reveals a fixed id list page by page.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::PagedSequence;
use crate::error::Result;

/// Fixed list of ids exposed `page_size` at a time.
#[derive(Debug)]
pub struct InMemoryPages {
    all: Vec<String>,
    page_size: usize,
    loaded: Mutex<usize>,
    loading: AtomicBool,
    latency: Duration,
    load_calls: AtomicUsize,
}

/// Resets the loading flag when a load finishes or is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl InMemoryPages {
    /// Nothing loaded yet; each `load_more` reveals `page_size` ids.
    #[must_use]
    pub fn new(ids: Vec<String>, page_size: usize) -> Self {
        Self {
            all: ids,
            page_size: page_size.max(1),
            loaded: Mutex::new(0),
            loading: AtomicBool::new(false),
            latency: Duration::ZERO,
            load_calls: AtomicUsize::new(0),
        }
    }

    /// Start with the first `count` ids already loaded.
    #[must_use]
    pub fn with_initial(self, count: usize) -> Self {
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) = count.min(self.all.len());
        self
    }

    /// Delay every page load by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of `load_more` calls that actually ran.
    #[must_use]
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::Acquire)
    }

    fn loaded(&self) -> usize {
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PagedSequence for InMemoryPages {
    fn current_ids(&self) -> Vec<String> {
        self.all[..self.loaded()].to_vec()
    }

    fn has_more(&self) -> bool {
        self.loaded() < self.all.len()
    }

    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn load_more(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            anyhow::ensure!(
                !self.loading.swap(true, Ordering::AcqRel),
                "a page load is already running"
            );
            let _loading = LoadingGuard(&self.loading);
            self.load_calls.fetch_add(1, Ordering::AcqRel);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
            *loaded = (*loaded + self.page_size).min(self.all.len());
            Ok(())
        }
        .boxed()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.all[..self.loaded()].iter().position(|item| item == id)
    }
}
