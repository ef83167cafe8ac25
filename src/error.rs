//! # Error Types
//!
//! Custom error types for the radar core using `thiserror`.

use thiserror::Error;

/// Main error type for the radar core
#[derive(Debug, Error)]
pub enum RadarError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial link errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No telemetry serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Operator input errors
    #[error("Input error: {0}")]
    Input(String),

    /// No usable operator input device
    #[error("No operator input device found")]
    InputDeviceNotFound,

    /// Burst log serialization errors
    #[error("Telemetry log error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for the radar core
pub type Result<T> = std::result::Result<T, RadarError>;
