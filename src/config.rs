//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; missing values take the defaults
//! below, so an empty file is a valid configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::control::{DisplaySettings, RangeLimits};
use crate::error::{RadarError, Result};
use crate::projection::{Projector, ReferencePoint, Viewport};
use crate::protocol::wire::{DEFAULT_BAUD_RATE, RECORD_WORDS};
use crate::render::RenderLayout;
use crate::selection::DirectionClassifier;
use crate::track::MAX_TRACKS;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub reference: ReferenceConfig,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub ingest: IngestConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// Serial link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Fixed geodetic origin of the display
#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_latitude")]
    pub latitude: f64,

    #[serde(default = "default_reference_longitude")]
    pub longitude: f64,
}

/// Display geometry, range window and overlay defaults
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u16,

    #[serde(default = "default_height")]
    pub height: u16,

    #[serde(default = "default_info_panel_height")]
    pub info_panel_height: u16,

    #[serde(default = "default_pixel_radius")]
    pub pixel_radius: u16,

    #[serde(default = "default_range_km")]
    pub range_km: u16,

    #[serde(default = "default_range_min_km")]
    pub range_min_km: u16,

    #[serde(default = "default_range_max_km")]
    pub range_max_km: u16,

    #[serde(default = "default_range_step_km")]
    pub range_step_km: u16,

    #[serde(default = "default_true")]
    pub show_heading: bool,

    #[serde(default = "default_true")]
    pub show_callsign: bool,

    #[serde(default = "default_heading_vector_px")]
    pub heading_vector_px: u16,
}

/// Operator input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Empty for auto-detection
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_axis_midpoint")]
    pub axis_midpoint: u16,

    #[serde(default = "default_deadzone")]
    pub deadzone: u16,

    /// Full scale of the raw evdev stick axes
    #[serde(default = "default_axis_max_raw")]
    pub axis_max_raw: u16,

    #[serde(default = "default_true")]
    pub invert_x: bool,

    #[serde(default = "default_true")]
    pub invert_y: bool,

    /// Delay between an edge and reading the inputs
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Delay before an edge line is re-armed
    #[serde(default = "default_rearm_ms")]
    pub rearm_ms: u64,

    /// Stick polling period while a track is selected
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Ingest path sizing
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Telemetry queue capacity in 32-bit words
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_table_capacity")]
    pub table_capacity: usize,
}

/// Burst log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Application log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write daily log files here when set
    #[serde(default)]
    pub directory: Option<String>,

    #[serde(default = "default_status_interval_s")]
    pub status_interval_s: u64,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }

fn default_reference_latitude() -> f64 { 29.6465 }
fn default_reference_longitude() -> f64 { -82.3533 }

fn default_width() -> u16 { 240 }
fn default_height() -> u16 { 280 }
fn default_info_panel_height() -> u16 { 70 }
fn default_pixel_radius() -> u16 { 100 }
fn default_range_km() -> u16 { 50 }
fn default_range_min_km() -> u16 { 20 }
fn default_range_max_km() -> u16 { 200 }
fn default_range_step_km() -> u16 { 10 }
fn default_heading_vector_px() -> u16 { 30 }
fn default_true() -> bool { true }

fn default_axis_midpoint() -> u16 { 2048 }
fn default_deadzone() -> u16 { 900 }
fn default_axis_max_raw() -> u16 { 255 }
fn default_settle_ms() -> u64 { 5 }
fn default_rearm_ms() -> u64 { 50 }
fn default_poll_interval_ms() -> u64 { 100 }

fn default_queue_capacity() -> usize { 256 }
fn default_table_capacity() -> usize { MAX_TRACKS }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }
fn default_status_interval_s() -> u64 { 30 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            latitude: default_reference_latitude(),
            longitude: default_reference_longitude(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            info_panel_height: default_info_panel_height(),
            pixel_radius: default_pixel_radius(),
            range_km: default_range_km(),
            range_min_km: default_range_min_km(),
            range_max_km: default_range_max_km(),
            range_step_km: default_range_step_km(),
            show_heading: true,
            show_callsign: true,
            heading_vector_px: default_heading_vector_px(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            axis_midpoint: default_axis_midpoint(),
            deadzone: default_deadzone(),
            axis_max_raw: default_axis_max_raw(),
            invert_x: true,
            invert_y: true,
            settle_ms: default_settle_ms(),
            rearm_ms: default_rearm_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            table_capacity: default_table_capacity(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            status_interval_s: default_status_interval_s(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> RadarError {
    RadarError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aircraft_radar::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns [`RadarError::Config`] naming the first out-of-range value.
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if ![9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600]
            .contains(&self.serial.baud_rate)
        {
            return Err(invalid(
                "baud_rate must be one of: 9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600",
            ));
        }

        if !(-89.0..=89.0).contains(&self.reference.latitude) {
            return Err(invalid("reference latitude must be between -89 and 89"));
        }

        if !(-180.0..=180.0).contains(&self.reference.longitude) {
            return Err(invalid("reference longitude must be between -180 and 180"));
        }

        let display = &self.display;
        if display.width == 0 || display.height == 0 {
            return Err(invalid("display width and height must be greater than 0"));
        }

        if display.info_panel_height >= display.height {
            return Err(invalid("info_panel_height must be less than display height"));
        }

        let radar_height = display.height - display.info_panel_height;
        if display.pixel_radius == 0
            || display.pixel_radius > display.width / 2
            || display.pixel_radius > radar_height / 2
        {
            return Err(invalid("pixel_radius must be greater than 0 and fit inside the radar area"));
        }

        if display.range_min_km == 0 || display.range_min_km > display.range_max_km {
            return Err(invalid("range_min_km must be greater than 0 and not above range_max_km"));
        }

        if display.range_km < display.range_min_km || display.range_km > display.range_max_km {
            return Err(invalid("range_km must be within range_min_km and range_max_km"));
        }

        if display.range_step_km == 0 {
            return Err(invalid("range_step_km must be greater than 0"));
        }

        if display.heading_vector_px == 0 {
            return Err(invalid("heading_vector_px must be greater than 0"));
        }

        // Input device_path can be empty (auto-detect)
        if self.input.deadzone >= self.input.axis_midpoint {
            return Err(invalid("deadzone must be less than axis_midpoint"));
        }

        if self.input.axis_max_raw == 0 {
            return Err(invalid("axis_max_raw must be greater than 0"));
        }

        for (name, value) in [
            ("settle_ms", self.input.settle_ms),
            ("rearm_ms", self.input.rearm_ms),
            ("poll_interval_ms", self.input.poll_interval_ms),
        ] {
            if value == 0 || value > 10000 {
                return Err(invalid(format!("{} must be between 1 and 10000", name)));
            }
        }

        if self.ingest.queue_capacity < RECORD_WORDS {
            return Err(invalid("queue_capacity must hold at least one record (7 words)"));
        }

        if self.ingest.table_capacity == 0 || self.ingest.table_capacity > MAX_TRACKS {
            return Err(invalid(format!("table_capacity must be between 1 and {}", MAX_TRACKS)));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        if self.logging.status_interval_s == 0 {
            return Err(invalid("status_interval_s must be greater than 0"));
        }

        Ok(())
    }

    /// Initial display settings.
    #[must_use]
    pub fn display_settings(&self) -> DisplaySettings {
        let limits = RangeLimits {
            min_km: self.display.range_min_km,
            max_km: self.display.range_max_km,
            step_km: self.display.range_step_km,
        };
        DisplaySettings::new(
            self.display.range_km,
            limits,
            self.display.show_heading,
            self.display.show_callsign,
        )
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.display.width,
            height: self.display.height,
            info_panel_height: self.display.info_panel_height,
            pixel_radius: self.display.pixel_radius,
        }
    }

    #[must_use]
    pub fn projector(&self) -> Projector {
        Projector::new(
            ReferencePoint::new(self.reference.latitude, self.reference.longitude),
            self.viewport(),
        )
    }

    #[must_use]
    pub fn render_layout(&self) -> RenderLayout {
        RenderLayout {
            viewport: self.viewport(),
            heading_vector_px: self.display.heading_vector_px,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> DirectionClassifier {
        DirectionClassifier::new(
            self.input.axis_midpoint,
            self.input.deadzone,
            self.input.invert_x,
            self.input.invert_y,
        )
    }
}
