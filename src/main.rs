//! # Aircraft Radar
//!
//! Shows aircraft around a fixed reference point on a small radar display,
//! fed by a telemetry stream on a serial link.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use aircraft_radar::config::{Config, LoggingConfig};
use aircraft_radar::harness::{Harness, InputTiming, Shared};
use aircraft_radar::input::gamepad::Gamepad;
use aircraft_radar::input::InputLines;
use aircraft_radar::render::TraceSurface;
use aircraft_radar::serial::TelemetrySerial;
use aircraft_radar::telemetry::BurstLogger;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the daily application log
const LOG_FILE_PREFIX: &str = "aircraft-radar.log";

/// Main entry point for the radar display
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the telemetry serial port and the operator gamepad
///    - Spawn ingest, swap, control, selection and render tasks
///
/// 2. **Main Loop**
///    - Log ingest counters every `status_interval_s` seconds
///    - Handle Ctrl+C for graceful shutdown
///
/// Without a gamepad the display still runs, without operator input.
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be loaded or is invalid
/// - The serial port cannot be opened
/// - The gamepad reader thread cannot be started
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("Aircraft Radar v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    let serial = TelemetrySerial::open(&config.serial.port, config.serial.baud_rate)?;
    info!("Telemetry serial port opened at: {}", serial.device_path());

    let shared = Shared::from_config(&config);
    let mut harness = Harness::new(shared.clone());

    harness.spawn_ingest(serial.into_link(), config.ingest.queue_capacity);
    harness.spawn_swap(open_burst_log(&config));

    let lines = InputLines::new();
    match Gamepad::open(&config.input.device_path) {
        Ok(gamepad) => {
            info!("Gamepad opened at: {}", gamepad.device_path());
            let (buttons, axes) = gamepad.spawn(lines.clone(), config.input.axis_max_raw)?;
            let timing = InputTiming::from(&config.input);
            harness.spawn_controls(buttons, lines.buttons.clone(), timing);
            harness.spawn_selection(axes, lines.click.clone(), config.classifier(), timing);
        }
        Err(e) => warn!("No operator input ({}); display only", e),
    }

    let surface = Arc::new(Mutex::new(TraceSurface::new()));
    harness.spawn_renderers(surface, config.render_layout());

    info!(
        "Radar running at {} km around ({}, {})",
        config.display.range_km, config.reference.latitude, config.reference.longitude
    );
    info!("Press Ctrl+C to exit");

    let mut status = interval(Duration::from_secs(config.logging.status_interval_s));
    // The first tick completes immediately
    status.tick().await;

    loop {
        tokio::select! {
            _ = status.tick() => log_status(&shared, harness.running()),

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    log_status(&shared, harness.running());
    harness.shutdown();
    Ok(())
}

/// Console logging, plus daily log files when a directory is configured.
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes
/// the file writer on drop.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Burst log writer, if enabled. A failure only disables the log.
fn open_burst_log(config: &Config) -> Option<BurstLogger> {
    if !config.telemetry.enabled {
        return None;
    }

    let telemetry = &config.telemetry;
    match BurstLogger::new(
        &telemetry.log_dir,
        telemetry.max_records_per_file,
        telemetry.max_files_to_keep,
    ) {
        Ok(logger) => Some(logger),
        Err(e) => {
            warn!("Burst log disabled: {}", e);
            None
        }
    }
}

fn log_status(shared: &Shared, running_tasks: usize) {
    let stats = shared.ingest.stats.snapshot();
    info!(
        "Status: {} records parsed, {} bursts published, {} dropped, {} staging overflows, {} framing errors ({} tasks)",
        stats.records_parsed,
        stats.bursts_published,
        stats.records_dropped,
        stats.staging_overflows,
        stats.framing_errors,
        running_tasks
    );
}
