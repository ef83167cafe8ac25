//! Info panel pass: details of the selected track.

use super::{Color, DisplaySurface, RenderLayout};
use crate::track::{CurrentView, ScreenPoint, TrackRecord};

/// Placeholder for every field when nothing is selected
const NOT_AVAILABLE: &str = "N/A";

const COLUMNS: [i16; 3] = [10, 95, 175];
const ROWS: [i16; 2] = [7, 35];
/// Value line offset below its caption
const VALUE_OFFSET: i16 = 10;

/// Panel field values, formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFields {
    pub callsign: String,
    pub longitude: String,
    pub latitude: String,
    pub altitude: String,
    pub true_track: String,
    pub velocity: String,
}

impl InfoFields {
    #[must_use]
    pub fn from_track(track: Option<&TrackRecord>) -> Self {
        match track {
            Some(t) => Self {
                callsign: t.callsign.trimmed(),
                longitude: format!("{:.4}", t.longitude),
                latitude: format!("{:.4}", t.latitude),
                altitude: format!("{:.4}", t.altitude),
                true_track: format!("{:.4}", t.heading),
                velocity: format!("{:.4}", t.velocity),
            },
            None => Self {
                callsign: NOT_AVAILABLE.to_string(),
                longitude: NOT_AVAILABLE.to_string(),
                latitude: NOT_AVAILABLE.to_string(),
                altitude: NOT_AVAILABLE.to_string(),
                true_track: NOT_AVAILABLE.to_string(),
                velocity: NOT_AVAILABLE.to_string(),
            },
        }
    }
}

/// Draw the info panel for the view's selection.
pub fn render_info<S: DisplaySurface + ?Sized>(surface: &mut S, view: &CurrentView, layout: &RenderLayout) {
    let viewport = layout.viewport;
    surface.fill_rect(
        ScreenPoint::new(0, 0),
        viewport.width,
        viewport.info_panel_height,
        Color::PanelBackground,
    );

    let fields = InfoFields::from_track(view.selected_track());
    let cells = [
        ("CALL SIGN", &fields.callsign),
        ("LONGITUDE", &fields.longitude),
        ("LATITUDE", &fields.latitude),
        ("ALTITUDE", &fields.altitude),
        ("TRUE TRACK", &fields.true_track),
        ("VELOCITY", &fields.velocity),
    ];

    for (i, (caption, value)) in cells.iter().enumerate() {
        let x = COLUMNS[i % COLUMNS.len()];
        let y = ROWS[i / COLUMNS.len()];
        surface.draw_text(ScreenPoint::new(x, y), caption, Color::PanelText);
        surface.draw_text(ScreenPoint::new(x, y + VALUE_OFFSET), value, Color::PanelText);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::DisplaySettings;
    use crate::render::testing::RecordingSurface;
    use crate::selection::Selection;
    use crate::track::Callsign;

    #[test]
    fn test_unselected_shows_placeholders() {
        let view = CurrentView::new(4, DisplaySettings::default());
        let mut surface = RecordingSurface::default();
        render_info(&mut surface, &view, &RenderLayout::default());

        let texts = surface.texts();
        assert_eq!(texts.iter().filter(|t| **t == "N/A").count(), 6);
        assert!(texts.contains(&"TRUE TRACK"));
    }

    #[test]
    fn test_selected_track_fields() {
        let mut view = CurrentView::new(4, DisplaySettings::default());
        view.tracks
            .push(TrackRecord::new(Callsign::new("SWA88"), -82.25, 29.5, 10_500.0, 230.25, 45.5))
            .unwrap();
        view.selection = Selection::at(&view.tracks, 0);

        let fields = InfoFields::from_track(view.selected_track());
        assert_eq!(fields.callsign, "SWA88");
        assert_eq!(fields.longitude, "-82.2500");
        assert_eq!(fields.latitude, "29.5000");
        assert_eq!(fields.altitude, "10500.0000");
        assert_eq!(fields.velocity, "230.2500");
        assert_eq!(fields.true_track, "45.5000");

        let mut surface = RecordingSurface::default();
        render_info(&mut surface, &view, &RenderLayout::default());
        assert!(surface.texts().contains(&"SWA88"));
    }

    #[test]
    fn test_stale_selection_shows_placeholders() {
        let mut view = CurrentView::new(4, DisplaySettings::default());
        view.tracks
            .push(TrackRecord::new(Callsign::new("AAL1"), 0.0, 0.0, 0.0, 0.0, 0.0))
            .unwrap();
        view.selection = Selection::Selected(crate::selection::SelectionHandle::new(
            0,
            Callsign::new("GONE"),
        ));

        assert_eq!(InfoFields::from_track(view.selected_track()).callsign, "N/A");
    }
}
