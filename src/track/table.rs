//! # Track Table
//!
//! Fixed-capacity, arrival-ordered sequence of track records. Two instances
//! exist at runtime: the staging table written by the record parser and the
//! current table published by the swap step.

use serde::Serialize;
use thiserror::Error;

use super::callsign::Callsign;

/// Upper bound on tracks held by one table.
pub const MAX_TRACKS: usize = 200;

/// Signed pixel position on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenPoint {
    pub x: i16,
    pub y: i16,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Squared pixel distance to another point.
    #[must_use]
    pub fn distance_squared(&self, other: ScreenPoint) -> i32 {
        let dx = i32::from(self.x) - i32::from(other.x);
        let dy = i32::from(self.y) - i32::from(other.y);
        dx * dx + dy * dy
    }
}

/// One aircraft state update.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    /// Aircraft identity
    pub callsign: Callsign,
    /// Longitude in degrees
    pub longitude: f32,
    /// Latitude in degrees
    pub latitude: f32,
    /// Geometric altitude
    pub altitude: f32,
    /// Ground speed
    pub velocity: f32,
    /// True track in degrees
    pub heading: f32,
    /// Screen position, present only while the track is visible.
    ///
    /// Written by every reprojection pass; cleared on publish.
    pub screen: Option<ScreenPoint>,
}

impl TrackRecord {
    /// Creates a not-yet-projected record.
    #[must_use]
    pub fn new(
        callsign: Callsign,
        longitude: f32,
        latitude: f32,
        altitude: f32,
        velocity: f32,
        heading: f32,
    ) -> Self {
        Self {
            callsign,
            longitude,
            latitude,
            altitude,
            velocity,
            heading,
            screen: None,
        }
    }

    /// Visibility flag: set by reprojection when within display range.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.screen.is_some()
    }
}

/// Returned when a record does not fit into a full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("track table full ({capacity} entries)")]
pub struct TableFull {
    pub capacity: usize,
}

/// Fixed-capacity ordered track table.
///
/// Storage is reserved once at construction and never grows past the
/// capacity, so the count always equals the number of entries present.
#[derive(Debug, Clone)]
pub struct TrackTable {
    entries: Vec<TrackRecord>,
    capacity: usize,
}

impl TrackTable {
    /// Creates an empty table; capacity is clamped to `1..=MAX_TRACKS`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_TRACKS);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`TableFull`] when the table is at capacity; the record is
    /// dropped by the caller.
    pub fn push(&mut self, record: TrackRecord) -> std::result::Result<usize, TableFull> {
        if self.entries.len() >= self.capacity {
            return Err(TableFull {
                capacity: self.capacity,
            });
        }
        self.entries.push(record);
        Ok(self.entries.len() - 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TrackRecord> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRecord> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackRecord> {
        self.entries.iter_mut()
    }

    /// Index of the first entry carrying `callsign`.
    #[must_use]
    pub fn position_of(&self, callsign: &Callsign) -> Option<usize> {
        self.entries.iter().position(|t| t.callsign == *callsign)
    }

    /// Number of entries currently marked visible.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|t| t.is_visible()).count()
    }

    /// Empties the table without releasing its storage.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Overwrites this table with `source`, in order, dropping screen positions.
    pub fn copy_from(&mut self, source: &TrackTable) {
        self.entries.clear();
        self.entries.extend(
            source
                .entries
                .iter()
                .take(self.capacity)
                .cloned()
                .map(|mut t| {
                    t.screen = None;
                    t
                }),
        );
    }
}
