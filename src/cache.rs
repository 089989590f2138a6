//! Single-slot TTL cache with single-flight refresh.
//!
//! Every aggregator owns one `SlotCache` per upstream concern. Entries are
//! created empty at process start, populated on the first successful fetch,
//! overwritten on every later one, and never destroyed. A failed refresh
//! leaves the slot untouched and propagates the error — stale values are
//! never served in place of a failed fetch.
//!
//! Concurrency: the slot mutex is held across the whole check-then-fetch in
//! `get_or_refresh`, so N concurrent callers observing a cold or expired
//! slot produce exactly one upstream call; the rest queue on the lock and
//! read the freshly stored value.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    fetched_at: Option<Instant>,
}

#[derive(Debug)]
pub struct SlotCache<T> {
    slot: Mutex<Slot<T>>,
    validity: Duration,
}

impl<T: Clone> SlotCache<T> {
    pub fn new(validity: Duration) -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                fetched_at: None,
            }),
            validity,
        }
    }

    fn slot_is_fresh(&self, slot: &Slot<T>) -> bool {
        match (&slot.value, slot.fetched_at) {
            (Some(_), Some(at)) => at.elapsed() < self.validity,
            _ => false,
        }
    }

    /// Return the cached value iff it is still within the validity window.
    /// Never performs I/O.
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.lock().await;
        if self.slot_is_fresh(&slot) {
            slot.value.clone()
        } else {
            None
        }
    }

    /// Overwrite the slot with a new value, stamped now.
    pub async fn put(&self, value: T) {
        let mut slot = self.slot.lock().await;
        slot.value = Some(value);
        slot.fetched_at = Some(Instant::now());
    }

    /// Whether the slot currently holds a value inside its validity window.
    pub async fn is_fresh(&self) -> bool {
        let slot = self.slot.lock().await;
        self.slot_is_fresh(&slot)
    }

    /// Serve the cached value if fresh (and not forced), otherwise run
    /// `fetch` and store its result.
    ///
    /// The lock is held for the duration of the fetch: concurrent callers
    /// await the in-flight refresh instead of issuing their own, and then
    /// return the value it stored.
    pub async fn get_or_refresh<F, Fut, E>(&self, force_refresh: bool, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if !force_refresh && self.slot_is_fresh(&slot) {
            // Freshness re-checked under the lock: a caller that queued
            // behind an in-flight refresh lands here and reuses its result.
            if let Some(value) = slot.value.clone() {
                return Ok(value);
            }
        }

        let value = fetch().await?;
        slot.value = Some(value.clone());
        slot.fetched_at = Some(Instant::now());
        Ok(value)
    }
}
