//! # Telemetry Queue
//!
//! Bounded FIFO of raw 32-bit words between the frame decoder (single
//! producer, never blocks) and the record parser (single consumer, blocks).
//!
//! Records are enqueued as a unit: either all seven words fit or none is
//! written, so a full queue never leaves the consumer misaligned.
//!
//! Capacity is fixed when the queue is created and never grows. The
//! underlying `tokio::sync::mpsc` channel allocates its slot blocks lazily
//! and recycles them, so memory use is bounded by that capacity but not all
//! of it is reserved up front.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::protocol::wire::{RecordWords, RECORD_WORDS};

/// Reasons a record could not be enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("telemetry queue full")]
    Full,

    #[error("telemetry queue consumer closed")]
    Closed,
}

/// Create a queue holding up to `capacity` words (at least one record).
#[must_use]
pub fn telemetry_queue(capacity: usize) -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = mpsc::channel(capacity.max(RECORD_WORDS));
    (QueueProducer { tx }, QueueConsumer { rx })
}

/// Producer half, used from the decoder's non-blocking context
#[derive(Debug, Clone)]
pub struct QueueProducer {
    tx: mpsc::Sender<u32>,
}

impl QueueProducer {
    /// Enqueue one record's words without blocking.
    ///
    /// # Errors
    ///
    /// [`QueueError::Full`] when fewer than seven slots are free; nothing is
    /// enqueued in that case.
    pub fn try_push_record(&self, words: &RecordWords) -> std::result::Result<(), QueueError> {
        let permits = self
            .tx
            .try_reserve_many(RECORD_WORDS)
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(()) => QueueError::Full,
                mpsc::error::TrySendError::Closed(()) => QueueError::Closed,
            })?;

        for (permit, &word) in permits.zip(words.iter()) {
            permit.send(word);
        }
        Ok(())
    }

    /// Free word slots.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer half, owned by the record parser
#[derive(Debug)]
pub struct QueueConsumer {
    rx: mpsc::Receiver<u32>,
}

impl QueueConsumer {
    /// Wait for the next word; `None` once the producer is gone and the
    /// queue is drained.
    pub async fn pop(&mut self) -> Option<u32> {
        self.rx.recv().await
    }

    /// Pop exactly one record's words in FIFO order.
    pub async fn pop_record(&mut self) -> Option<RecordWords> {
        let mut words = [0u32; RECORD_WORDS];
        for slot in words.iter_mut() {
            *slot = self.pop().await?;
        }
        Some(words)
    }

    /// Take a word if one is immediately available.
    pub fn try_pop(&mut self) -> Option<u32> {
        self.rx.try_recv().ok()
    }
}
