//! # Telemetry Module
//!
//! Per-burst operational log written as JSON Lines.
//!
//! This module handles:
//! - Summarizing each published burst (tracks, visibility, selection, counters)
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod logger;

pub use logger::BurstLogger;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ingest::IngestSnapshot;
use crate::track::Callsign;

/// One line of the burst log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurstSummary {
    pub timestamp: DateTime<Utc>,
    /// Burst sequence number since startup
    pub burst: u64,
    /// Entries in the published table
    pub tracks: usize,
    /// Entries within display range
    pub visible: usize,
    pub range_km: u16,
    pub selected: Option<Callsign>,
    /// Cumulative ingest counters
    #[serde(flatten)]
    pub ingest: IngestSnapshot,
}
