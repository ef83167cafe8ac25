//! # Ingest Module
//!
//! The path from wire bytes to the staging table.
//!
//! This module handles:
//! - The decoder glue that runs in the link's non-blocking context
//! - The bounded word queue between decoder and parser
//! - The record parser task
//! - Burst boundaries shared by the decoder, parser and swap
//! - Counters for every drop, overflow and desync on the way

pub mod queue;
pub mod bursts;
pub mod link;
pub mod parser;

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use self::bursts::BurstLedger;
use crate::signal::Signal;

/// Ingest counters; written from any context, read for status logging
#[derive(Debug, Default)]
pub struct IngestStats {
    records_announced: AtomicU64,
    records_dropped: AtomicU64,
    records_parsed: AtomicU64,
    staging_overflows: AtomicU64,
    framing_errors: AtomicU64,
    bursts_received: AtomicU64,
    bursts_dropped: AtomicU64,
    bursts_published: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSnapshot {
    /// Records handed to the queue with a record-ready signal
    pub records_announced: u64,
    /// Records dropped because the queue was full
    pub records_dropped: u64,
    /// Records popped and decoded by the parser
    pub records_parsed: u64,
    /// Parsed records dropped because the staging table was full
    pub staging_overflows: u64,
    /// Sentinels that arrived mid-record
    pub framing_errors: u64,
    /// Burst sentinels received
    pub bursts_received: u64,
    /// Sentinels ignored because too many bursts awaited publishing
    pub bursts_dropped: u64,
    /// Bursts published into the current table
    pub bursts_published: u64,
}

impl IngestStats {
    #[must_use]
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            records_announced: self.records_announced.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            records_parsed: self.records_parsed.load(Ordering::Relaxed),
            staging_overflows: self.staging_overflows.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            bursts_received: self.bursts_received.load(Ordering::Relaxed),
            bursts_dropped: self.bursts_dropped.load(Ordering::Relaxed),
            bursts_published: self.bursts_published.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_announced(&self) -> u64 {
        self.records_announced.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn announced(&self) -> u64 {
        self.records_announced.load(Ordering::Acquire)
    }

    pub(crate) fn record_dropped(&self) -> u64 {
        self.records_dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_parsed(&self) {
        self.records_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn staging_overflow(&self) -> u64 {
        self.staging_overflows.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn framing_error(&self) -> u64 {
        self.framing_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn burst_received(&self) {
        self.bursts_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn burst_dropped(&self) -> u64 {
        self.bursts_dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn burst_published(&self) -> u64 {
        self.bursts_published.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Wakeups and progress shared by the decoder, parser and swap tasks
#[derive(Debug, Clone)]
pub struct IngestContext {
    /// One signal per record enqueued
    pub record_ready: Signal,
    /// One signal per burst sentinel
    pub burst_complete: Signal,
    pub stats: Arc<IngestStats>,
    pub bursts: Arc<BurstLedger>,
    consumed: Arc<watch::Sender<u64>>,
}

impl Default for IngestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestContext {
    #[must_use]
    pub fn new() -> Self {
        let (consumed, _) = watch::channel(0);
        Self {
            record_ready: Signal::new(),
            burst_complete: Signal::new(),
            stats: Arc::new(IngestStats::default()),
            bursts: Arc::new(BurstLedger::new()),
            consumed: Arc::new(consumed),
        }
    }

    /// Parser side: one announced record has been fully handled.
    pub(crate) fn mark_consumed(&self) {
        self.consumed.send_modify(|n| *n += 1);
    }

    /// Records the parser has handled so far.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        *self.consumed.borrow()
    }

    /// Link side: a sentinel closed the current burst.
    ///
    /// Returns false when the burst backlog is full; the burst's records
    /// then join the next one and no burst-complete signal is due.
    pub(crate) fn close_burst(&self) -> bool {
        self.bursts.record(self.stats.announced()).is_some()
    }

    /// Swap side: wait until every record of the oldest unpublished burst
    /// has been handled by the parser, and return that burst's number.
    ///
    /// Called after a burst-complete wakeup, so the burst is recorded.
    pub async fn wait_for_burst(&self) -> u64 {
        let burst = self.bursts.published() + 1;
        let boundary = self.bursts.boundary(burst);
        let mut rx = self.consumed.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|&n| n >= boundary).await;
        burst
    }

    /// Parser side: wait until every burst that ended before the next
    /// record has been published, so staging never holds two bursts.
    pub(crate) async fn wait_for_swap(&self) {
        let seq = self.consumed() + 1;
        if let Some(burst) = self.bursts.blocking_burst(seq) {
            self.bursts.wait_published(burst).await;
        }
    }
}
