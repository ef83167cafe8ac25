//! # Record Parser
//!
//! Consumes one queued record per record-ready signal, decodes it and
//! appends it to the staging table. A record that follows a burst boundary
//! waits until the swap has published that burst.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::queue::QueueConsumer;
use super::IngestContext;
use crate::protocol::record::decode_record;
use crate::track::TrackStore;

/// What happened to one parsed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Appended to staging at this index
    Staged(usize),
    /// Staging was full; record dropped
    Overflow,
}

/// Parser task state
#[derive(Debug)]
pub struct RecordParser {
    queue: QueueConsumer,
    store: Arc<TrackStore>,
    ctx: IngestContext,
}

impl RecordParser {
    pub fn new(queue: QueueConsumer, store: Arc<TrackStore>, ctx: IngestContext) -> Self {
        Self { queue, store, ctx }
    }

    /// Wait for the next record and stage it.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn parse_next(&mut self) -> Option<ParseOutcome> {
        self.ctx.record_ready.wait().await;
        let words = self.queue.pop_record().await?;
        self.ctx.wait_for_swap().await;
        let record = decode_record(&words);

        debug!(
            "Record {}: lon {:.4} lat {:.4} alt {:.1} vel {:.1} trk {:.1}",
            record.callsign,
            record.longitude,
            record.latitude,
            record.altitude,
            record.velocity,
            record.heading
        );

        let outcome = match self.store.stage(record).await {
            Ok(index) => ParseOutcome::Staged(index),
            Err(e) => {
                let overflows = self.ctx.stats.staging_overflow();
                warn!("Staging overflow: {} ({} records dropped)", e, overflows);
                ParseOutcome::Overflow
            }
        };

        self.ctx.stats.record_parsed();
        self.ctx.mark_consumed();
        Some(outcome)
    }

    /// Parse until the queue closes.
    pub async fn run(mut self) {
        while self.parse_next().await.is_some() {}
        info!("Telemetry queue closed; record parser stopping");
    }
}
