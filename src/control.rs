//! # Range & Display Control
//!
//! Display settings mutated by operator button edges: the range radius and
//! the heading-vector / call-sign overlays.

use serde::Serialize;
use tracing::info;

use crate::input::{BUTTON_SW1, BUTTON_SW2, BUTTON_SW3, BUTTON_SW4};
use crate::projection::{Projector, ReprojectReport};
use crate::track::CurrentView;

/// Range window and step, in kilometers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeLimits {
    pub min_km: u16,
    pub max_km: u16,
    pub step_km: u16,
}

impl Default for RangeLimits {
    fn default() -> Self {
        Self {
            min_km: 20,
            max_km: 200,
            step_km: 10,
        }
    }
}

impl RangeLimits {
    #[must_use]
    pub fn clamp(&self, range_km: u16) -> u16 {
        range_km.clamp(self.min_km, self.max_km)
    }
}

/// Operator-adjustable display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplaySettings {
    /// Display range radius
    pub range_km: u16,
    pub limits: RangeLimits,
    /// Heading-vector overlay
    pub show_heading: bool,
    /// Call-sign label overlay
    pub show_callsign: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::new(50, RangeLimits::default(), true, true)
    }
}

/// One operator control action; exactly one per button edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    RangeUp,
    RangeDown,
    ToggleHeading,
    ToggleCallsign,
}

impl ControlAction {
    /// Decode an active-low button mask.
    ///
    /// With several buttons held, the first of SW1, SW2, SW3, SW4 wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use aircraft_radar::control::ControlAction;
    ///
    /// // SW2 and SW4 held (bits low)
    /// assert_eq!(ControlAction::from_button_mask(0b0101), Some(ControlAction::RangeDown));
    /// assert_eq!(ControlAction::from_button_mask(0xFF), None);
    /// ```
    #[must_use]
    pub fn from_button_mask(mask: u8) -> Option<Self> {
        let pressed = |bit: u8| mask & bit == 0;

        if pressed(BUTTON_SW1) {
            Some(Self::RangeUp)
        } else if pressed(BUTTON_SW2) {
            Some(Self::RangeDown)
        } else if pressed(BUTTON_SW3) {
            Some(Self::ToggleHeading)
        } else if pressed(BUTTON_SW4) {
            Some(Self::ToggleCallsign)
        } else {
            None
        }
    }
}

/// What a control action changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    /// Range already at its limit
    Unchanged,
    RangeChanged { from_km: u16, to_km: u16 },
    ToggleChanged,
}

impl DisplaySettings {
    /// Settings with the range clamped into `limits`.
    #[must_use]
    pub fn new(range_km: u16, limits: RangeLimits, show_heading: bool, show_callsign: bool) -> Self {
        Self {
            range_km: limits.clamp(range_km),
            limits,
            show_heading,
            show_callsign,
        }
    }

    /// Apply one action to the settings.
    pub fn apply(&mut self, action: ControlAction) -> ControlEffect {
        match action {
            ControlAction::RangeUp => {
                self.set_range(self.range_km.saturating_add(self.limits.step_km))
            }
            ControlAction::RangeDown => {
                self.set_range(self.range_km.saturating_sub(self.limits.step_km))
            }
            ControlAction::ToggleHeading => {
                self.show_heading = !self.show_heading;
                ControlEffect::ToggleChanged
            }
            ControlAction::ToggleCallsign => {
                self.show_callsign = !self.show_callsign;
                ControlEffect::ToggleChanged
            }
        }
    }

    fn set_range(&mut self, range_km: u16) -> ControlEffect {
        let from_km = self.range_km;
        let to_km = self.limits.clamp(range_km);
        if to_km == from_km {
            return ControlEffect::Unchanged;
        }
        self.range_km = to_km;
        ControlEffect::RangeChanged { from_km, to_km }
    }
}

/// Result of handling one control action against the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOutcome {
    pub effect: ControlEffect,
    /// Present when the range changed and the table was reprojected
    pub reprojection: Option<ReprojectReport>,
}

impl ControlOutcome {
    /// Whether the main display needs redrawing.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.effect != ControlEffect::Unchanged
    }
}

/// Apply `action` to the view's settings, reprojecting on a range change.
///
/// Runs with the current view held, so the new range and the positions
/// computed for it become visible together.
pub fn apply_control(
    view: &mut CurrentView,
    projector: &Projector,
    action: ControlAction,
) -> ControlOutcome {
    let effect = view.display.apply(action);

    let reprojection = match effect {
        ControlEffect::RangeChanged { from_km, to_km } => {
            info!("Display range {} km -> {} km", from_km, to_km);
            Some(projector.reproject(view))
        }
        ControlEffect::ToggleChanged => {
            info!(
                "Overlays: heading {}, call sign {}",
                on_off(view.display.show_heading),
                on_off(view.display.show_callsign)
            );
            None
        }
        ControlEffect::Unchanged => {
            info!("Display range held at {} km", view.display.range_km);
            None
        }
    };

    ControlOutcome {
        effect,
        reprojection,
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ReferencePoint, Viewport};
    use crate::track::{Callsign, TrackRecord};

    fn projector() -> Projector {
        Projector::new(ReferencePoint::new(29.6465, -82.3533), Viewport::default())
    }

    #[test]
    fn test_mask_priority() {
        assert_eq!(ControlAction::from_button_mask(0b1111), None);
        assert_eq!(ControlAction::from_button_mask(0b0000), Some(ControlAction::RangeUp));
        assert_eq!(ControlAction::from_button_mask(0b1101), Some(ControlAction::RangeDown));
        assert_eq!(ControlAction::from_button_mask(0b0011), Some(ControlAction::ToggleHeading));
        assert_eq!(ControlAction::from_button_mask(0b0111), Some(ControlAction::ToggleCallsign));
    }

    #[test]
    fn test_range_clamps_at_max() {
        let mut settings = DisplaySettings::default();
        for _ in 0..30 {
            settings.apply(ControlAction::RangeUp);
        }
        assert_eq!(settings.range_km, 200);
        assert_eq!(settings.apply(ControlAction::RangeUp), ControlEffect::Unchanged);
    }

    #[test]
    fn test_range_clamps_at_min() {
        let mut settings = DisplaySettings::default();
        assert_eq!(
            settings.apply(ControlAction::RangeDown),
            ControlEffect::RangeChanged { from_km: 50, to_km: 40 }
        );
        for _ in 0..10 {
            settings.apply(ControlAction::RangeDown);
        }
        assert_eq!(settings.range_km, 20);
    }

    #[test]
    fn test_step_is_clamped_not_skipped() {
        let limits = RangeLimits {
            min_km: 20,
            max_km: 200,
            step_km: 10,
        };
        let mut settings = DisplaySettings::new(195, limits, true, true);
        assert_eq!(
            settings.apply(ControlAction::RangeUp),
            ControlEffect::RangeChanged { from_km: 195, to_km: 200 }
        );
    }

    #[test]
    fn test_new_clamps_initial_range() {
        let settings = DisplaySettings::new(5, RangeLimits::default(), true, true);
        assert_eq!(settings.range_km, 20);
    }

    #[test]
    fn test_toggles_flip() {
        let mut settings = DisplaySettings::default();
        settings.apply(ControlAction::ToggleHeading);
        assert!(!settings.show_heading);
        assert!(settings.show_callsign);
        settings.apply(ControlAction::ToggleCallsign);
        settings.apply(ControlAction::ToggleHeading);
        assert!(settings.show_heading);
        assert!(!settings.show_callsign);
    }

    #[test]
    fn test_reprojects_only_on_range_change() {
        let mut view = CurrentView::new(8, DisplaySettings::default());
        view.tracks
            .push(TrackRecord::new(Callsign::new("AAL1"), -82.25, 29.6465, 0.0, 0.0, 0.0))
            .unwrap();

        let outcome = apply_control(&mut view, &projector(), ControlAction::RangeUp);
        assert_eq!(outcome.reprojection.map(|r| r.visible), Some(1));
        assert!(view.tracks.get(0).unwrap().is_visible());

        let outcome = apply_control(&mut view, &projector(), ControlAction::ToggleCallsign);
        assert!(outcome.reprojection.is_none());
        assert!(outcome.needs_render());

        view.display.range_km = 200;
        let outcome = apply_control(&mut view, &projector(), ControlAction::RangeUp);
        assert_eq!(outcome.effect, ControlEffect::Unchanged);
        assert!(outcome.reprojection.is_none());
        assert!(!outcome.needs_render());
    }
}
