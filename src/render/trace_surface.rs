//! Headless display surface that logs primitives through `tracing`.

use tracing::trace;

use super::{Color, DisplaySurface};
use crate::track::ScreenPoint;

/// Display surface without a panel; every primitive becomes a trace event
#[derive(Debug, Default)]
pub struct TraceSurface {
    primitives: u64,
}

impl TraceSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives drawn since creation.
    #[must_use]
    pub fn primitives(&self) -> u64 {
        self.primitives
    }
}

impl DisplaySurface for TraceSurface {
    fn fill_rect(&mut self, origin: ScreenPoint, width: u16, height: u16, color: Color) {
        self.primitives += 1;
        trace!(x = origin.x, y = origin.y, width, height, ?color, "fill_rect");
    }

    fn draw_circle(&mut self, center: ScreenPoint, radius: u16, color: Color) {
        self.primitives += 1;
        trace!(x = center.x, y = center.y, radius, ?color, "circle");
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: u16, color: Color) {
        self.primitives += 1;
        trace!(x = center.x, y = center.y, radius, ?color, "fill_circle");
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        self.primitives += 1;
        trace!(x0 = from.x, y0 = from.y, x1 = to.x, y1 = to.y, ?color, "line");
    }

    fn draw_dotted_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color, spacing: u16) {
        self.primitives += 1;
        trace!(x0 = from.x, y0 = from.y, x1 = to.x, y1 = to.y, spacing, ?color, "dotted_line");
    }

    fn draw_text(&mut self, origin: ScreenPoint, text: &str, color: Color) {
        self.primitives += 1;
        trace!(x = origin.x, y = origin.y, text, ?color, "text");
    }
}
