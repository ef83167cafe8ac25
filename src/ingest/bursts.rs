//! # Burst Boundaries
//!
//! Records where each burst ends in the sequence of announced records, so
//! that the swap publishes exactly one burst and the parser never stages a
//! record of the next burst before the previous one is published.
//!
//! Boundaries live in a fixed ring written only by the link handler. Slot
//! `k` holds the announced-record count at the `k`-th sentinel. A slot is
//! reused only once its burst is published.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Bursts that may be received but not yet published
pub const BURST_BACKLOG: usize = 16;

/// Boundary ring plus publish progress
#[derive(Debug)]
pub struct BurstLedger {
    boundaries: [AtomicU64; BURST_BACKLOG],
    /// Boundaries recorded so far
    recorded: AtomicU64,
    /// Bursts published so far
    published: watch::Sender<u64>,
}

impl Default for BurstLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BurstLedger {
    #[must_use]
    pub fn new() -> Self {
        let (published, _) = watch::channel(0);
        Self {
            boundaries: std::array::from_fn(|_| AtomicU64::new(0)),
            recorded: AtomicU64::new(0),
            published,
        }
    }

    /// Link side: close the current burst after `announced` records.
    ///
    /// Returns the burst number, or `None` when the backlog is full. The
    /// records then carry over into the next burst.
    pub fn record(&self, announced: u64) -> Option<u64> {
        let recorded = self.recorded.load(Ordering::Relaxed);
        if recorded.saturating_sub(self.published()) >= BURST_BACKLOG as u64 {
            return None;
        }
        self.slot(recorded + 1).store(announced, Ordering::Relaxed);
        self.recorded.store(recorded + 1, Ordering::Release);
        Some(recorded + 1)
    }

    /// Bursts recorded so far.
    #[must_use]
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Acquire)
    }

    /// Bursts published so far.
    #[must_use]
    pub fn published(&self) -> u64 {
        *self.published.borrow()
    }

    /// Announced-record count at which `burst` ended.
    ///
    /// Only meaningful for recorded bursts that are not yet published.
    #[must_use]
    pub fn boundary(&self, burst: u64) -> u64 {
        self.slot(burst).load(Ordering::Relaxed)
    }

    /// Swap side: `burst` is now in the current table.
    pub fn mark_published(&self, burst: u64) {
        self.published.send_modify(|n| *n = (*n).max(burst));
    }

    /// The latest unpublished burst that ends before record `seq` (1-based),
    /// if any.
    #[must_use]
    pub fn blocking_burst(&self, seq: u64) -> Option<u64> {
        let recorded = self.recorded();
        let published = self.published();
        // A slot overwritten mid-scan belongs to a burst at or below the
        // refreshed published count, which never blocks
        (published + 1..=recorded)
            .filter(|&burst| self.boundary(burst) < seq)
            .max()
    }

    /// Wait until `burst` has been published.
    pub async fn wait_published(&self, burst: u64) {
        let mut rx = self.published.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|&n| n >= burst).await;
    }

    fn slot(&self, burst: u64) -> &AtomicU64 {
        &self.boundaries[((burst - 1) % BURST_BACKLOG as u64) as usize]
    }
}
