//! Main radar pass: range rings, labels and visible tracks.

use super::{text_width, Color, DisplaySurface, RenderLayout};
use crate::projection::heading_vector_end;
use crate::track::{CurrentView, ScreenPoint};

const CENTER_DOT_RADIUS: u16 = 5;
const TRACK_RADIUS: u16 = 3;
const SELECTED_TRACK_RADIUS: u16 = 5;
const HEADING_DOT_SPACING: u16 = 3;
/// Vertical offset of a range label above its ring's bottom edge
const RING_LABEL_INSET: i16 = 12;

/// Draw the radar area for `view`.
pub fn render_radar<S: DisplaySurface + ?Sized>(surface: &mut S, view: &CurrentView, layout: &RenderLayout) {
    let viewport = layout.viewport;
    let center = viewport.center();
    let outer = viewport.pixel_radius;
    let inner = outer / 2;

    surface.fill_rect(
        ScreenPoint::new(0, viewport.info_panel_height as i16),
        viewport.width,
        viewport.height.saturating_sub(viewport.info_panel_height),
        Color::Background,
    );

    surface.draw_circle(center, outer, Color::RangeRing);
    surface.draw_circle(center, inner, Color::RangeRing);
    surface.fill_circle(center, CENTER_DOT_RADIUS, Color::RangeRing);

    let range_km = view.display.range_km;
    ring_label(surface, center, outer, &format!("{} km", range_km));
    ring_label(surface, center, inner, &format!("{} km", range_km / 2));

    let selected = view.selection.index();
    for (index, track) in view.tracks.iter().enumerate() {
        let Some(point) = track.screen else { continue };

        let (radius, color, label_gap) = if selected == Some(index) {
            (SELECTED_TRACK_RADIUS, Color::SelectedTrack, 7)
        } else {
            (TRACK_RADIUS, Color::Track, 5)
        };

        surface.fill_circle(point, radius, color);

        if view.display.show_callsign {
            surface.draw_text(
                ScreenPoint::new(point.x + label_gap, point.y - 5),
                &track.callsign.trimmed(),
                Color::Label,
            );
        }

        if view.display.show_heading {
            let end = heading_vector_end(point, track.heading, layout.heading_vector_px);
            surface.draw_dotted_line(point, end, color, HEADING_DOT_SPACING);
        }
    }
}

fn ring_label<S: DisplaySurface + ?Sized>(surface: &mut S, center: ScreenPoint, radius: u16, text: &str) {
    let x = center.x - (text_width(text) / 2) as i16;
    let y = center.y + radius as i16 - RING_LABEL_INSET;
    surface.draw_text(ScreenPoint::new(x, y), text, Color::RangeRing);
}
