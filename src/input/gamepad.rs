//! # Gamepad Input Backend
//!
//! Linux evdev gamepad standing in for the button bank and the analog stick.
//!
//! ## Mapping
//!
//! - Triangle / North: SW1 (range up)
//! - Cross / South: SW2 (range down)
//! - Square / West: SW3 (toggle heading vectors)
//! - Circle / East: SW4 (toggle call-sign labels)
//! - Left stick ABS_X / ABS_Y: stick sample, rescaled to 12 bits
//! - Left stick click: stick click
//!
//! A dedicated OS thread blocks on the device and publishes the latest state
//! through atomics, triggering the edge lines on presses. It never waits on
//! anything else.

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    AxisSample, AxisSource, ButtonSource, InputLines, AXIS_MAX, BUTTONS_RELEASED, BUTTON_SW1,
    BUTTON_SW2, BUTTON_SW3, BUTTON_SW4,
};
use crate::error::{RadarError, Result};

/// Latest input state shared between the reader thread and the tasks
#[derive(Debug)]
pub struct GamepadState {
    buttons: AtomicU8,
    x: AtomicU16,
    y: AtomicU16,
    click: AtomicBool,
}

impl GamepadState {
    /// Released buttons, centered stick.
    #[must_use]
    pub fn new() -> Self {
        let mid = AXIS_MAX / 2 + 1;
        Self {
            buttons: AtomicU8::new(BUTTONS_RELEASED),
            x: AtomicU16::new(mid),
            y: AtomicU16::new(mid),
            click: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn buttons(&self) -> u8 {
        self.buttons.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn axes(&self) -> AxisSample {
        AxisSample::new(self.x.load(Ordering::Acquire), self.y.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn click(&self) -> bool {
        self.click.load(Ordering::Acquire)
    }
}

impl Default for GamepadState {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates raw evdev events into [`GamepadState`] updates and edges
#[derive(Debug, Clone)]
pub struct EventMapper {
    state: Arc<GamepadState>,
    lines: InputLines,
    axis_max_raw: i32,
}

impl EventMapper {
    pub fn new(state: Arc<GamepadState>, lines: InputLines, axis_max_raw: u16) -> Self {
        Self {
            state,
            lines,
            axis_max_raw: i32::from(axis_max_raw.max(1)),
        }
    }

    /// Apply one event.
    pub fn process_event(&self, event: &InputEvent) {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => self.process_axis_event(axis, event.value()),
            InputEventKind::Key(key) => self.process_key_event(key, event.value() != 0),
            _ => {}
        }
    }

    fn process_axis_event(&self, axis: AbsoluteAxisType, value: i32) {
        let scaled = self.scale_axis(value);
        match axis {
            AbsoluteAxisType::ABS_X => self.state.x.store(scaled, Ordering::Release),
            AbsoluteAxisType::ABS_Y => self.state.y.store(scaled, Ordering::Release),
            _ => {}
        }
    }

    fn process_key_event(&self, key: Key, pressed: bool) {
        let bit = match key {
            Key::BTN_NORTH => BUTTON_SW1,
            Key::BTN_SOUTH => BUTTON_SW2,
            Key::BTN_WEST => BUTTON_SW3,
            Key::BTN_EAST => BUTTON_SW4,
            Key::BTN_THUMBL => {
                self.state.click.store(pressed, Ordering::Release);
                if pressed && !self.lines.click.trigger() {
                    debug!("Stick click suppressed (line disarmed)");
                }
                return;
            }
            _ => return,
        };

        // Active low
        if pressed {
            self.state.buttons.fetch_and(!bit, Ordering::AcqRel);
            if !self.lines.buttons.trigger() {
                debug!("Button edge suppressed (line disarmed)");
            }
        } else {
            self.state.buttons.fetch_or(bit, Ordering::AcqRel);
        }
    }

    /// Rescale a raw axis value to `0..=AXIS_MAX`.
    fn scale_axis(&self, value: i32) -> u16 {
        let clamped = value.clamp(0, self.axis_max_raw);
        (clamped * i32::from(AXIS_MAX) / self.axis_max_raw) as u16
    }
}

/// Opened evdev gamepad
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl std::fmt::Debug for Gamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gamepad")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Gamepad {
    /// Open `path`, or auto-detect a gamepad when `path` is empty.
    ///
    /// # Errors
    ///
    /// - [`RadarError::Input`] if the configured device cannot be opened
    /// - [`RadarError::InputDeviceNotFound`] if auto-detection finds nothing
    pub fn open(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Self::detect();
        }

        let device = Device::open(path)
            .map_err(|e| RadarError::Input(format!("Failed to open {}: {}", path, e)))?;
        info!(
            "Opened input device {} ({})",
            path,
            device.name().unwrap_or("unnamed")
        );
        Ok(Self {
            device,
            device_path: path.to_string(),
        })
    }

    /// Scan `/dev/input/event*` for the first device with a stick and face buttons.
    pub fn detect() -> Result<Self> {
        let input_dir = Path::new("/dev/input");
        if !input_dir.exists() {
            return Err(RadarError::Input("/dev/input directory not found".to_string()));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| RadarError::Input(format!("Failed to read /dev/input: {}", e)))?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map_or(false, |name| name.to_string_lossy().starts_with("event"))
            })
            .collect();

        // Deterministic choice when several gamepads are connected
        entries.sort();

        for path in entries {
            match Device::open(&path) {
                Ok(device) if is_gamepad(&device) => {
                    let device_path = path.to_string_lossy().to_string();
                    info!(
                        "Found gamepad at {} ({})",
                        device_path,
                        device.name().unwrap_or("unnamed")
                    );
                    return Ok(Self {
                        device,
                        device_path,
                    });
                }
                Ok(_) => debug!("Skipping {}: not a gamepad", path.display()),
                Err(e) => debug!("Could not open {}: {}", path.display(), e),
            }
        }

        Err(RadarError::InputDeviceNotFound)
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Start the blocking reader thread.
    ///
    /// Returns the button and stick sources backed by the thread's state.
    pub fn spawn(self, lines: InputLines, axis_max_raw: u16) -> Result<(GamepadButtons, GamepadAxes)> {
        let state = Arc::new(GamepadState::new());
        let mapper = EventMapper::new(Arc::clone(&state), lines, axis_max_raw);
        let Gamepad {
            mut device,
            device_path,
        } = self;

        std::thread::Builder::new()
            .name("gamepad-reader".to_string())
            .spawn(move || loop {
                match device.fetch_events() {
                    Ok(events) => {
                        for event in events {
                            mapper.process_event(&event);
                        }
                    }
                    Err(e) => {
                        warn!("Input device {} stopped: {}", device_path, e);
                        return;
                    }
                }
            })?;

        Ok((
            GamepadButtons {
                state: Arc::clone(&state),
            },
            GamepadAxes { state },
        ))
    }
}

fn is_gamepad(device: &Device) -> bool {
    let has_stick = device
        .supported_absolute_axes()
        .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_X));
    let has_buttons = device
        .supported_keys()
        .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
    has_stick && has_buttons
}

/// Gamepad face buttons as a [`ButtonSource`]
#[derive(Debug, Clone)]
pub struct GamepadButtons {
    state: Arc<GamepadState>,
}

impl ButtonSource for GamepadButtons {
    fn read_buttons(&mut self) -> Result<u8> {
        Ok(self.state.buttons())
    }
}

/// Gamepad left stick as an [`AxisSource`]
#[derive(Debug, Clone)]
pub struct GamepadAxes {
    state: Arc<GamepadState>,
}

impl AxisSource for GamepadAxes {
    fn read_axes(&mut self) -> Result<AxisSample> {
        Ok(self.state.axes())
    }

    fn read_click(&mut self) -> Result<bool> {
        Ok(self.state.click())
    }
}
