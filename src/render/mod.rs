//! # Render Module
//!
//! Draws the current view onto a [`DisplaySurface`].
//!
//! Two passes share one surface: the main radar pass below the info panel and
//! the info pass inside it. Each is driven by its own refresh request.

pub mod info;
pub mod radar;
pub mod trace_surface;

pub use info::render_info;
pub use radar::render_radar;
pub use trace_surface::TraceSurface;

use crate::projection::Viewport;
use crate::track::ScreenPoint;

/// Width of one text cell in pixels, including spacing
pub const CHAR_WIDTH: u16 = 6;

/// Semantic palette; the surface decides the actual colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Background,
    RangeRing,
    Track,
    SelectedTrack,
    Label,
    PanelBackground,
    PanelText,
}

/// Primitive drawing operations in absolute pixel coordinates
pub trait DisplaySurface: Send {
    fn fill_rect(&mut self, origin: ScreenPoint, width: u16, height: u16, color: Color);

    fn draw_circle(&mut self, center: ScreenPoint, radius: u16, color: Color);

    fn fill_circle(&mut self, center: ScreenPoint, radius: u16, color: Color);

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color);

    /// Line with a dot every `spacing` pixels.
    fn draw_dotted_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color, spacing: u16);

    fn draw_text(&mut self, origin: ScreenPoint, text: &str, color: Color);
}

/// Geometry shared by both render passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLayout {
    pub viewport: Viewport,
    /// Heading vector length in pixels
    pub heading_vector_px: u16,
}

impl Default for RenderLayout {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            heading_vector_px: 30,
        }
    }
}

/// Pixel width of `text` in the display font.
#[must_use]
pub fn text_width(text: &str) -> u16 {
    (text.chars().count() as u16).saturating_mul(CHAR_WIDTH)
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// One recorded primitive
    #[derive(Debug, Clone, PartialEq)]
    pub enum Primitive {
        FillRect(ScreenPoint, u16, u16, Color),
        Circle(ScreenPoint, u16, Color),
        FillCircle(ScreenPoint, u16, Color),
        Line(ScreenPoint, ScreenPoint, Color),
        DottedLine(ScreenPoint, ScreenPoint, Color, u16),
        Text(ScreenPoint, String, Color),
    }

    /// Surface that records every primitive for assertions
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub primitives: Vec<Primitive>,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<&str> {
            self.primitives
                .iter()
                .filter_map(|p| match p {
                    Primitive::Text(_, text, _) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn filled_circles(&self) -> Vec<(ScreenPoint, u16, Color)> {
            self.primitives
                .iter()
                .filter_map(|p| match p {
                    Primitive::FillCircle(c, r, color) => Some((*c, *r, *color)),
                    _ => None,
                })
                .collect()
        }

        pub fn dotted_lines(&self) -> usize {
            self.primitives
                .iter()
                .filter(|p| matches!(p, Primitive::DottedLine(..)))
                .count()
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn fill_rect(&mut self, origin: ScreenPoint, width: u16, height: u16, color: Color) {
            self.primitives.push(Primitive::FillRect(origin, width, height, color));
        }

        fn draw_circle(&mut self, center: ScreenPoint, radius: u16, color: Color) {
            self.primitives.push(Primitive::Circle(center, radius, color));
        }

        fn fill_circle(&mut self, center: ScreenPoint, radius: u16, color: Color) {
            self.primitives.push(Primitive::FillCircle(center, radius, color));
        }

        fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
            self.primitives.push(Primitive::Line(from, to, color));
        }

        fn draw_dotted_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color, spacing: u16) {
            self.primitives.push(Primitive::DottedLine(from, to, color, spacing));
        }

        fn draw_text(&mut self, origin: ScreenPoint, text: &str, color: Color) {
            self.primitives.push(Primitive::Text(origin, text.to_string(), color));
        }
    }
}
