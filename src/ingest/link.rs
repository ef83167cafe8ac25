//! # Link Handler
//!
//! Decoder glue running in the link's receive context. It never waits:
//! complete records go to the queue followed by a record-ready signal, burst
//! sentinels record the burst boundary and raise burst-complete. Drops and
//! desyncs are counted and logged.

use bytes::BytesMut;
use tracing::{debug, info, warn};

use super::queue::QueueProducer;
use super::IngestContext;
use crate::error::{RadarError, Result};
use crate::protocol::framer::{FrameDecoder, FrameEvent};
use crate::serial::TelemetryLink;

/// Read buffer size for the link reader
const READ_CHUNK_SIZE: usize = 256;

/// Receive-side handler: frame decoder plus its signal targets
#[derive(Debug)]
pub struct LinkHandler {
    decoder: FrameDecoder,
    queue: QueueProducer,
    ctx: IngestContext,
}

impl LinkHandler {
    pub fn new(queue: QueueProducer, ctx: IngestContext) -> Self {
        Self {
            decoder: FrameDecoder::new(),
            queue,
            ctx,
        }
    }

    /// Process received bytes in order.
    pub fn on_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(event) = self.decoder.push_byte(byte) {
                self.on_event(event);
            }
        }
    }

    fn on_event(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Record(words) => match self.queue.try_push_record(&words) {
                Ok(()) => {
                    self.ctx.stats.record_announced();
                    self.ctx.record_ready.signal();
                }
                Err(e) => {
                    let dropped = self.ctx.stats.record_dropped();
                    warn!("Dropped telemetry record ({}), {} dropped so far", e, dropped);
                }
            },
            FrameEvent::BurstComplete { discarded_words } => {
                if discarded_words > 0 {
                    let errors = self.ctx.stats.framing_error();
                    warn!(
                        "Framing desync: burst sentinel after {} of 7 record words, partial record discarded ({} desyncs)",
                        discarded_words, errors
                    );
                }
                self.ctx.stats.burst_received();
                if self.ctx.close_burst() {
                    self.ctx.burst_complete.signal();
                    debug!("Burst sentinel received");
                } else {
                    let dropped = self.ctx.stats.burst_dropped();
                    warn!(
                        "Burst backlog full; records carried into the next burst ({} boundaries dropped)",
                        dropped
                    );
                }
            }
        }
    }

    /// Drop the producer and wake the parser, which then finds the queue
    /// closed once it has drained the records already announced.
    pub fn close(self) {
        let LinkHandler { queue, ctx, .. } = self;
        drop(queue);
        ctx.record_ready.signal();
    }
}

/// Feed a telemetry link into the handler until end of stream.
///
/// On return the queue is closed and the parser woken so it can stop.
///
/// # Errors
///
/// Returns [`RadarError::Serial`] when a read fails.
pub async fn run_link_reader<L: TelemetryLink>(mut link: L, mut handler: LinkHandler) -> Result<()> {
    let mut buf = BytesMut::with_capacity(READ_CHUNK_SIZE);

    let result = loop {
        buf.clear();
        let n = match link.read_chunk(&mut buf).await {
            Ok(n) => n,
            Err(e) => break Err(RadarError::Serial(format!("Telemetry link read failed: {}", e))),
        };

        if n == 0 {
            info!("Telemetry link closed; keeping last published tracks");
            break Ok(());
        }

        handler.on_bytes(&buf[..n]);
    };

    handler.close();
    result
}
