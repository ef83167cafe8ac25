//! # Serial Communication Module
//!
//! Handles the inbound telemetry serial link from the flight-data peer.
//!
//! This module handles:
//! - Opening the serial port (8N1) at the configured baud rate
//! - Falling back across candidate device paths
//! - Exposing the port as a [`TelemetryLink`] for the ingest reader

pub mod port_trait;

use crate::error::{RadarError, Result};
use tracing::{debug, info, warn};

pub use port_trait::{SerialLink, TelemetryLink};

/// Device paths tried when the configured port cannot be opened
const FALLBACK_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyACM0", // USB CDC devices
];

/// Telemetry serial port handle
pub struct TelemetrySerial {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for TelemetrySerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl TelemetrySerial {
    /// Open the configured port, falling back to common device paths.
    ///
    /// # Errors
    ///
    /// Returns [`RadarError::SerialPortNotFound`] if no path can be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aircraft_radar::serial::TelemetrySerial;
    ///
    /// let serial = TelemetrySerial::open("/dev/ttyO4", 115_200)?;
    /// println!("Connected to: {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        let mut paths = vec![port];
        paths.extend(FALLBACK_DEVICE_PATHS.iter().copied().filter(|p| *p != port));
        Self::open_with_paths(&paths, baud_rate)
    }

    /// Open the first path that succeeds.
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened telemetry link at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(RadarError::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        use tokio_serial::SerialPortBuilderExt;

        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| RadarError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Path of the opened device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Hand the port to the ingest reader.
    pub fn into_link(self) -> SerialLink {
        SerialLink::new(self.port)
    }
}
