//! # Operator Input Module
//!
//! Hardware-facing operator controls: a four-button bank and a 2-axis
//! analog stick with a click switch.
//!
//! Buttons are reported as an active-low bitmask (a pressed button reads 0).
//! Axis samples are 12-bit values with the neutral position at the midpoint.
//! Edges from either source are delivered through [`InputLines`].

pub mod gamepad;

use crate::error::Result;
use crate::signal::EdgeLine;

/// Range up
pub const BUTTON_SW1: u8 = 1 << 0;
/// Range down
pub const BUTTON_SW2: u8 = 1 << 1;
/// Toggle heading vectors
pub const BUTTON_SW3: u8 = 1 << 2;
/// Toggle call-sign labels
pub const BUTTON_SW4: u8 = 1 << 3;

/// Button mask with nothing pressed
pub const BUTTONS_RELEASED: u8 = 0xFF;

/// Full scale of one axis (12-bit)
pub const AXIS_MAX: u16 = 4095;

/// One 2-axis stick sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSample {
    pub x: u16,
    pub y: u16,
}

impl AxisSample {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Unpack a sample with X in the low 16 bits and Y in the high 16 bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use aircraft_radar::input::AxisSample;
    ///
    /// assert_eq!(AxisSample::from_packed(0x0800_0FFF), AxisSample::new(4095, 2048));
    /// ```
    #[must_use]
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            x: (packed & 0xFFFF) as u16,
            y: (packed >> 16) as u16,
        }
    }
}

/// Button bank (the I²C expander on the original board)
#[cfg_attr(test, mockall::automock)]
pub trait ButtonSource: Send {
    /// Current active-low button mask.
    fn read_buttons(&mut self) -> Result<u8>;
}

/// Analog stick (the ADC on the original board)
#[cfg_attr(test, mockall::automock)]
pub trait AxisSource: Send {
    /// Current stick position.
    fn read_axes(&mut self) -> Result<AxisSample>;

    /// Whether the stick click is held.
    fn read_click(&mut self) -> Result<bool>;
}

/// Edge lines raised by the input backends
#[derive(Debug, Clone, Default)]
pub struct InputLines {
    /// Any button pressed
    pub buttons: EdgeLine,
    /// Stick click pressed
    pub click: EdgeLine,
}

impl InputLines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_packed_splits_halves() {
        let sample = AxisSample::from_packed((1234u32 << 16) | 4000);
        assert_eq!(sample.x, 4000);
        assert_eq!(sample.y, 1234);
    }

    #[test]
    fn test_button_bits_are_distinct() {
        let all = BUTTON_SW1 | BUTTON_SW2 | BUTTON_SW3 | BUTTON_SW4;
        assert_eq!(all, 0x0F);
        assert_eq!(all.count_ones(), 4);
    }

    #[test]
    fn test_mock_sources() {
        let mut buttons = MockButtonSource::new();
        buttons.expect_read_buttons().returning(|| Ok(!BUTTON_SW3));
        assert_eq!(buttons.read_buttons().unwrap() & BUTTON_SW3, 0);

        let mut axes = MockAxisSource::new();
        axes.expect_read_axes()
            .returning(|| Ok(AxisSample::new(2048, 2048)));
        axes.expect_read_click().returning(|| Ok(true));
        assert_eq!(axes.read_axes().unwrap(), AxisSample::new(2048, 2048));
        assert!(axes.read_click().unwrap());
    }
}
