//! # Selection Engine
//!
//! Operator target selection over the current track table.
//!
//! A selection is a stable handle: the index of the selected entry tagged
//! with its call sign. Resolving a handle against a table only succeeds while
//! the entry at that index still carries the same identity, so a handle that
//! survived a table swap without being rebound is detected as stale instead
//! of silently pointing at a different aircraft.
//!
//! State machine:
//! - `Unselected` + click: select the visible track nearest the radar center
//! - `Selected` + tilt: hop to the nearest visible track in that direction
//! - `Selected` + out of range or lost on swap: back to `Unselected`

use serde::Serialize;
use std::fmt;

use crate::input::AxisSample;
use crate::track::{Callsign, ScreenPoint, TrackRecord, TrackTable};

/// Index into the current table, tagged with the identity it referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionHandle {
    index: usize,
    callsign: Callsign,
}

impl SelectionHandle {
    #[must_use]
    pub fn new(index: usize, callsign: Callsign) -> Self {
        Self { index, callsign }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn callsign(&self) -> Callsign {
        self.callsign
    }

    /// Entry this handle refers to, or `None` when the handle is stale.
    #[must_use]
    pub fn resolve<'a>(&self, table: &'a TrackTable) -> Option<&'a TrackRecord> {
        table
            .get(self.index)
            .filter(|track| track.callsign == self.callsign)
    }
}

/// Outcome of re-resolving the selection after a table swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    /// Nothing was selected
    Unselected,
    /// The selected call sign was found again
    Kept { from: usize, to: usize },
    /// The selected call sign is absent from the new table
    Lost(Callsign),
}

/// Selection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(SelectionHandle),
}

impl Selection {
    /// Select the entry at `index`, if it exists.
    #[must_use]
    pub fn at(table: &TrackTable, index: usize) -> Self {
        match table.get(index) {
            Some(track) => Self::Selected(SelectionHandle::new(index, track.callsign)),
            None => Self::Unselected,
        }
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }

    #[must_use]
    pub fn handle(&self) -> Option<&SelectionHandle> {
        match self {
            Self::Selected(handle) => Some(handle),
            Self::Unselected => None,
        }
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.handle().map(SelectionHandle::index)
    }

    #[must_use]
    pub fn callsign(&self) -> Option<Callsign> {
        self.handle().map(SelectionHandle::callsign)
    }

    /// Selected entry, if the handle is still valid for `table`.
    #[must_use]
    pub fn resolve<'a>(&self, table: &'a TrackTable) -> Option<&'a TrackRecord> {
        self.handle().and_then(|handle| handle.resolve(table))
    }

    /// Clear the selection; returns true if something was selected.
    pub fn deselect(&mut self) -> bool {
        std::mem::take(self).is_selected()
    }

    /// Re-resolve the selection by call sign against a freshly published table.
    pub fn rebind(&mut self, table: &TrackTable) -> Rebind {
        let Some(handle) = self.handle().copied() else {
            return Rebind::Unselected;
        };

        match table.position_of(&handle.callsign) {
            Some(to) => {
                *self = Self::Selected(SelectionHandle::new(to, handle.callsign));
                Rebind::Kept {
                    from: handle.index,
                    to,
                }
            }
            None => {
                *self = Self::Unselected;
                Rebind::Lost(handle.callsign)
            }
        }
    }

    /// Click: from `Unselected`, pick the visible track nearest `center`.
    ///
    /// Returns true if the selection changed. A click while something is
    /// already selected, or with nothing visible, changes nothing.
    pub fn click(&mut self, table: &TrackTable, center: ScreenPoint) -> bool {
        if self.is_selected() {
            return false;
        }

        match nearest_to_center(table, center) {
            Some(index) => {
                *self = Self::at(table, index);
                true
            }
            None => false,
        }
    }

    /// Hop: from `Selected`, move to the nearest visible track in `direction`.
    ///
    /// Returns true if the selection changed. With no candidate that way
    /// the selection is kept. A stale handle is cleared.
    pub fn hop(&mut self, table: &TrackTable, direction: Direction) -> bool {
        let Some(handle) = self.handle().copied() else {
            return false;
        };
        let Some(from) = handle.resolve(table) else {
            *self = Self::Unselected;
            return true;
        };

        match hop_target(table, handle.index, from, direction) {
            Some(index) if index != handle.index => {
                *self = Self::at(table, index);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unselected => f.write_str("none"),
            Self::Selected(handle) => write!(f, "{} (#{})", handle.callsign, handle.index),
        }
    }
}

/// Index of the visible entry with the smallest squared distance to `center`.
///
/// The first entry wins on equal distance.
#[must_use]
pub fn nearest_to_center(table: &TrackTable, center: ScreenPoint) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;

    for (index, track) in table.iter().enumerate() {
        let Some(point) = track.screen else { continue };
        let distance = point.distance_squared(center);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, _)| index)
}

/// Nearest candidate on the `direction` side of `from`, by geodetic delta.
fn hop_target(
    table: &TrackTable,
    from_index: usize,
    from: &TrackRecord,
    direction: Direction,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, track) in table.iter().enumerate() {
        if index == from_index || !track.is_visible() {
            continue;
        }

        let delta_lon = track.longitude - from.longitude;
        let delta_lat = track.latitude - from.latitude;

        let delta = match direction {
            Direction::East if delta_lon > 0.0 => delta_lon,
            Direction::West if delta_lon < 0.0 => -delta_lon,
            Direction::North if delta_lat > 0.0 => delta_lat,
            Direction::South if delta_lat < 0.0 => -delta_lat,
            _ => continue,
        };

        if best.map_or(true, |(_, d)| delta < d) {
            best = Some((index, delta));
        }
    }

    best.map(|(index, _)| index)
}

/// Cardinal hop direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// Turns 2-axis samples into at most one cardinal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionClassifier {
    midpoint: i32,
    deadzone: i32,
    invert_x: bool,
    invert_y: bool,
}

impl DirectionClassifier {
    /// `invert_x` makes positive X deflection point west, `invert_y` makes
    /// positive Y deflection point south.
    #[must_use]
    pub fn new(midpoint: u16, deadzone: u16, invert_x: bool, invert_y: bool) -> Self {
        Self {
            midpoint: i32::from(midpoint),
            deadzone: i32::from(deadzone),
            invert_x,
            invert_y,
        }
    }

    /// Both axes strictly inside the deadzone.
    #[must_use]
    pub fn is_neutral(&self, sample: AxisSample) -> bool {
        let (dx, dy) = self.deflection(sample);
        dx.abs() < self.deadzone && dy.abs() < self.deadzone
    }

    /// Dominant direction of a sample outside the deadzone.
    ///
    /// Equal deflection on both axes yields no direction.
    #[must_use]
    pub fn classify(&self, sample: AxisSample) -> Option<Direction> {
        if self.is_neutral(sample) {
            return None;
        }

        let (dx, dy) = self.deflection(sample);
        let dx = if self.invert_x { -dx } else { dx };
        let dy = if self.invert_y { -dy } else { dy };

        if dx.abs() > dy.abs() {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        } else if dy.abs() > dx.abs() {
            Some(if dy > 0 { Direction::North } else { Direction::South })
        } else {
            None
        }
    }

    fn deflection(&self, sample: AxisSample) -> (i32, i32) {
        (
            i32::from(sample.x) - self.midpoint,
            i32::from(sample.y) - self.midpoint,
        )
    }
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        Self::new(2048, 900, true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, lon: f32, lat: f32, visible: bool) -> TrackRecord {
        let mut t = TrackRecord::new(Callsign::new(name), lon, lat, 0.0, 0.0, 0.0);
        if visible {
            t.screen = Some(ScreenPoint::new(0, 0));
        }
        t
    }

    fn table(tracks: Vec<TrackRecord>) -> TrackTable {
        let mut table = TrackTable::with_capacity(16);
        for t in tracks {
            table.push(t).unwrap();
        }
        table
    }

    fn at_screen(name: &str, x: i16, y: i16) -> TrackRecord {
        let mut t = track(name, 0.0, 0.0, true);
        t.screen = Some(ScreenPoint::new(x, y));
        t
    }

    #[test]
    fn test_click_picks_nearest_to_center() {
        let tracks = table(vec![
            at_screen("FAR", 10, 10),
            at_screen("NEAR", 125, 170),
            at_screen("MID", 150, 175),
        ]);
        let mut selection = Selection::Unselected;

        assert!(selection.click(&tracks, ScreenPoint::new(120, 175)));
        assert_eq!(selection.index(), Some(1));
        assert_eq!(selection.callsign(), Some(Callsign::new("NEAR")));
    }

    #[test]
    fn test_click_ignores_hidden_and_empty() {
        let mut selection = Selection::Unselected;
        let hidden = table(vec![track("HID", 0.0, 0.0, false)]);
        assert!(!selection.click(&hidden, ScreenPoint::new(120, 175)));
        assert!(!selection.is_selected());

        assert!(!selection.click(&TrackTable::with_capacity(4), ScreenPoint::new(120, 175)));
    }

    #[test]
    fn test_click_while_selected_is_noop() {
        let tracks = table(vec![at_screen("A", 0, 0), at_screen("B", 120, 175)]);
        let mut selection = Selection::at(&tracks, 0);

        assert!(!selection.click(&tracks, ScreenPoint::new(120, 175)));
        assert_eq!(selection.index(), Some(0));
    }

    #[test]
    fn test_hop_picks_minimum_governing_delta() {
        let tracks = table(vec![
            track("SEL", -82.0, 29.0, true),
            track("E_FAR", -81.5, 29.0, true),
            track("E_NEAR", -81.9, 30.0, true),
            track("W", -82.2, 29.0, true),
            track("E_HID", -81.95, 29.0, false),
        ]);
        let mut selection = Selection::at(&tracks, 0);

        assert!(selection.hop(&tracks, Direction::East));
        assert_eq!(selection.callsign(), Some(Callsign::new("E_NEAR")));

        // From E_NEAR (lat 30), everything else is south
        assert!(selection.hop(&tracks, Direction::South));
        assert_eq!(selection.callsign(), Some(Callsign::new("SEL")));
    }

    #[test]
    fn test_hop_with_no_candidate_keeps_selection() {
        let tracks = table(vec![
            track("SEL", -82.0, 29.0, true),
            track("W", -82.2, 29.0, true),
        ]);
        let mut selection = Selection::at(&tracks, 0);

        assert!(!selection.hop(&tracks, Direction::East));
        assert!(!selection.hop(&tracks, Direction::North));
        assert_eq!(selection.index(), Some(0));
    }

    #[test]
    fn test_hop_ties_go_to_first_entry() {
        let tracks = table(vec![
            track("SEL", -82.0, 29.0, true),
            track("N1", -82.5, 29.5, true),
            track("N2", -81.5, 29.5, true),
        ]);
        let mut selection = Selection::at(&tracks, 0);

        assert!(selection.hop(&tracks, Direction::North));
        assert_eq!(selection.index(), Some(1));
    }

    #[test]
    fn test_hop_when_unselected_is_noop() {
        let tracks = table(vec![track("A", 0.0, 0.0, true)]);
        let mut selection = Selection::Unselected;
        assert!(!selection.hop(&tracks, Direction::East));
    }

    #[test]
    fn test_stale_handle_is_detected() {
        let before = table(vec![track("AAL1", 0.0, 0.0, true), track("DAL2", 1.0, 0.0, true)]);
        let mut selection = Selection::at(&before, 1);

        // Same index now holds a different aircraft
        let after = table(vec![track("AAL1", 0.0, 0.0, true), track("UAL3", 1.0, 0.0, true)]);
        assert!(selection.resolve(&after).is_none());

        assert!(selection.hop(&after, Direction::West));
        assert!(!selection.is_selected());
    }

    #[test]
    fn test_rebind_follows_callsign() {
        let before = table(vec![track("AAL1", 0.0, 0.0, true), track("DAL2", 1.0, 0.0, true)]);
        let mut selection = Selection::at(&before, 1);

        let after = table(vec![
            track("UAL3", 0.0, 0.0, false),
            track("SWA4", 0.0, 0.0, false),
            track("DAL2", 1.0, 0.0, false),
        ]);
        assert_eq!(selection.rebind(&after), Rebind::Kept { from: 1, to: 2 });
        assert_eq!(selection.resolve(&after).map(|t| t.callsign), Some(Callsign::new("DAL2")));

        let gone = table(vec![track("AAL1", 0.0, 0.0, false)]);
        assert_eq!(selection.rebind(&gone), Rebind::Lost(Callsign::new("DAL2")));
        assert_eq!(selection, Selection::Unselected);

        assert_eq!(selection.rebind(&gone), Rebind::Unselected);
    }

    #[test]
    fn test_deselect_reports_change() {
        let tracks = table(vec![track("A", 0.0, 0.0, true)]);
        let mut selection = Selection::at(&tracks, 0);
        assert!(selection.deselect());
        assert!(!selection.deselect());
    }

    #[test]
    fn test_classifier_deadzone_is_exclusive() {
        let classifier = DirectionClassifier::default();
        assert!(classifier.is_neutral(AxisSample::new(2048, 2048)));
        assert!(classifier.is_neutral(AxisSample::new(2048 + 899, 2048 - 899)));
        assert!(!classifier.is_neutral(AxisSample::new(2048 + 900, 2048)));
        assert_eq!(classifier.classify(AxisSample::new(2048 + 899, 2048)), None);
    }

    #[test]
    fn test_classifier_default_orientation() {
        let classifier = DirectionClassifier::default();
        assert_eq!(classifier.classify(AxisSample::new(4095, 2048)), Some(Direction::West));
        assert_eq!(classifier.classify(AxisSample::new(0, 2048)), Some(Direction::East));
        assert_eq!(classifier.classify(AxisSample::new(2048, 4095)), Some(Direction::South));
        assert_eq!(classifier.classify(AxisSample::new(2048, 0)), Some(Direction::North));
    }

    #[test]
    fn test_classifier_dominant_axis_and_tie() {
        let classifier = DirectionClassifier::new(2048, 900, false, false);
        assert_eq!(classifier.classify(AxisSample::new(4000, 3500)), Some(Direction::East));
        assert_eq!(classifier.classify(AxisSample::new(3500, 100)), Some(Direction::South));
        assert_eq!(classifier.classify(AxisSample::new(3500, 3500)), None);
    }
}
