//! # Reprojection Engine
//!
//! Local tangent-plane projection of geodetic track positions onto the
//! radar area of the display.
//!
//! Distances are computed with a fixed kilometers-per-degree factor for
//! latitude and a cosine-corrected factor for longitude at the reference
//! latitude, which keeps range rings circular away from the equator.

use serde::Serialize;
use tracing::{debug, info};

use crate::track::{Callsign, CurrentView, ScreenPoint, TrackRecord};

/// Kilometers per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.32;

/// Fixed geodetic origin of the display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferencePoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Display geometry.
///
/// The info panel occupies the top `info_panel_height` rows; the radar area
/// is everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
    pub info_panel_height: u16,
    /// Pixels corresponding to the display range radius
    pub pixel_radius: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 240,
            height: 280,
            info_panel_height: 70,
            pixel_radius: 100,
        }
    }
}

impl Viewport {
    /// Center of the radar area.
    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        let radar_height = self.height.saturating_sub(self.info_panel_height);
        ScreenPoint::new(
            (self.width / 2) as i16,
            (self.info_panel_height + radar_height / 2) as i16,
        )
    }
}

/// Range and bearing of a position relative to the reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub range_km: f64,
    /// Counter-clockwise from east, radians
    pub bearing: f64,
}

/// Result of one reprojection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReprojectReport {
    pub visible: usize,
    pub hidden: usize,
    /// Selection cleared because its track left the display range
    pub deselected: Option<Callsign>,
}

/// Geodetic to screen projector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    reference: ReferencePoint,
    viewport: Viewport,
    km_per_degree_lon: f64,
}

impl Projector {
    #[must_use]
    pub fn new(reference: ReferencePoint, viewport: Viewport) -> Self {
        Self {
            reference,
            viewport,
            km_per_degree_lon: KM_PER_DEGREE * reference.latitude.to_radians().cos(),
        }
    }

    #[must_use]
    pub fn reference(&self) -> ReferencePoint {
        self.reference
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Range and bearing of a position from the reference point.
    #[must_use]
    pub fn polar(&self, latitude: f32, longitude: f32) -> Polar {
        let dy_km = (f64::from(latitude) - self.reference.latitude) * KM_PER_DEGREE;
        let dx_km = (f64::from(longitude) - self.reference.longitude) * self.km_per_degree_lon;

        Polar {
            range_km: dx_km.hypot(dy_km),
            bearing: dy_km.atan2(dx_km),
        }
    }

    /// Screen position of a track, or `None` beyond `range_km`.
    ///
    /// # Examples
    ///
    /// ```
    /// use aircraft_radar::projection::{Projector, ReferencePoint, Viewport};
    /// use aircraft_radar::track::{Callsign, TrackRecord};
    ///
    /// let projector = Projector::new(ReferencePoint::new(29.6465, -82.3533), Viewport::default());
    /// let track = TrackRecord::new(Callsign::new("AAL1"), -82.25, 29.6465, 0.0, 0.0, 0.0);
    ///
    /// let point = projector.project(&track, 50).unwrap();
    /// assert!(point.x > 120);
    /// assert!(projector.project(&track, 5).is_none());
    /// ```
    #[must_use]
    pub fn project(&self, track: &TrackRecord, range_km: u16) -> Option<ScreenPoint> {
        let polar = self.polar(track.latitude, track.longitude);
        let range_km = f64::from(range_km);
        if polar.range_km > range_km {
            return None;
        }

        let scale = f64::from(self.viewport.pixel_radius) / range_km;
        let pixels = scale * polar.range_km;
        let center = self.viewport.center();

        Some(ScreenPoint::new(
            center.x + (pixels * polar.bearing.cos()).round() as i16,
            center.y - (pixels * polar.bearing.sin()).round() as i16,
        ))
    }

    /// Recompute visibility and screen position of every current entry.
    ///
    /// Runs with the current view held; a selected track that falls out of
    /// range is deselected in the same pass.
    pub fn reproject(&self, view: &mut CurrentView) -> ReprojectReport {
        let range_km = view.display.range_km;
        let selected = view.selection.index();
        let mut report = ReprojectReport::default();

        for (index, track) in view.tracks.iter_mut().enumerate() {
            track.screen = self.project(track, range_km);

            if track.is_visible() {
                report.visible += 1;
            } else {
                report.hidden += 1;
                if selected == Some(index) {
                    report.deselected = Some(track.callsign);
                }
            }
        }

        if let Some(callsign) = report.deselected {
            view.selection.deselect();
            info!("{} left the {} km range; selection cleared", callsign, range_km);
        }

        debug!(
            "Reprojected {} tracks at {} km: {} visible",
            report.visible + report.hidden,
            range_km,
            report.visible
        );
        report
    }
}

/// End point of a heading vector of `length` pixels drawn from `origin`.
#[must_use]
pub fn heading_vector_end(origin: ScreenPoint, heading_deg: f32, length: u16) -> ScreenPoint {
    let angle = (90.0 - f64::from(heading_deg)).to_radians();
    let length = f64::from(length);

    ScreenPoint::new(
        origin.x + (length * angle.cos()).round() as i16,
        origin.y + (length * angle.sin()).round() as i16,
    )
}
