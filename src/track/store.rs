//! # Track Store
//!
//! The double-buffered track tables and their mutual-exclusion gates.
//!
//! - Staging: written by the record parser, drained by publish
//! - Current view: current table, selection and display settings, read by
//!   reprojection, selection and rendering
//!
//! Publishing copies staging into current while holding both gates (current
//! first, then staging), so readers never see a partially overwritten table
//! or counts that disagree with the entries present.

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::table::{TableFull, TrackRecord, TrackTable};
use crate::control::DisplaySettings;
use crate::selection::{Rebind, Selection};

/// Everything guarded by the current-table gate
#[derive(Debug, Clone)]
pub struct CurrentView {
    pub tracks: TrackTable,
    pub selection: Selection,
    pub display: DisplaySettings,
}

impl CurrentView {
    #[must_use]
    pub fn new(capacity: usize, display: DisplaySettings) -> Self {
        Self {
            tracks: TrackTable::with_capacity(capacity),
            selection: Selection::Unselected,
            display,
        }
    }

    /// The selected track, if the selection is valid for the current table.
    #[must_use]
    pub fn selected_track(&self) -> Option<&TrackRecord> {
        self.selection.resolve(&self.tracks)
    }
}

/// Result of one publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Entries now in the current table
    pub tracks: usize,
    pub selection: Rebind,
}

/// Move one burst from staging into the current view.
///
/// Screen positions are not carried over; the caller reprojects.
pub fn publish_into(staging: &mut TrackTable, current: &mut CurrentView) -> PublishReport {
    current.tracks.copy_from(staging);
    staging.clear();

    let selection = current.selection.rebind(&current.tracks);
    match selection {
        Rebind::Kept { from, to } if from != to => {
            debug!("Selection moved from #{} to #{}", from, to);
        }
        Rebind::Lost(callsign) => {
            info!("{} not in latest burst; selection cleared", callsign);
        }
        _ => {}
    }

    PublishReport {
        tracks: current.tracks.len(),
        selection,
    }
}

/// Shared handle to both track tables
#[derive(Debug)]
pub struct TrackStore {
    staging: Mutex<TrackTable>,
    current: Mutex<CurrentView>,
}

impl TrackStore {
    #[must_use]
    pub fn new(capacity: usize, display: DisplaySettings) -> Self {
        Self {
            staging: Mutex::new(TrackTable::with_capacity(capacity)),
            current: Mutex::new(CurrentView::new(capacity, display)),
        }
    }

    /// Append a parsed record to staging.
    ///
    /// # Errors
    ///
    /// Returns [`TableFull`] when staging is at capacity.
    pub async fn stage(&self, record: TrackRecord) -> std::result::Result<usize, TableFull> {
        self.staging.lock().await.push(record)
    }

    /// Publish staging into the current view atomically.
    pub async fn publish(&self) -> PublishReport {
        self.publish_then(|_| ()).await.0
    }

    /// Publish, then run `after` on the current view before releasing its
    /// gate. The staging gate is released first.
    pub async fn publish_then<R>(&self, after: impl FnOnce(&mut CurrentView) -> R) -> (PublishReport, R) {
        let mut current = self.current.lock().await;
        let report = {
            let mut staging = self.staging.lock().await;
            publish_into(&mut staging, &mut current)
        };
        let result = after(&mut current);
        (report, result)
    }

    /// Exclusive access to the current view.
    pub async fn current(&self) -> MutexGuard<'_, CurrentView> {
        self.current.lock().await
    }

    pub async fn staging_len(&self) -> usize {
        self.staging.lock().await.len()
    }
}
