//! # Telemetry Wire Constants and Fixed-Point Values
//!
//! Core definitions for the peer-to-device aircraft telemetry stream.
//!
//! Each record is 28 bytes, little-endian:
//!
//! | Offset | Bytes | Field |
//! |--------|-------|-------|
//! | 0 | 4 | identity low word |
//! | 4 | 4 | identity high word |
//! | 8 | 4 | longitude × 10⁴ (signed) |
//! | 12 | 4 | latitude × 10⁴ (signed) |
//! | 16 | 4 | altitude × 10⁴ (signed) |
//! | 20 | 4 | velocity × 10⁴ (signed) |
//! | 24 | 4 | heading × 10⁴ (signed) |
//!
//! A burst of records is terminated by the standalone word `0xFFFFFFFF`.

/// Bytes per wire word
pub const WORD_SIZE: usize = 4;

/// Identity words per record
pub const IDENTITY_WORDS: usize = 2;

/// Scaled value words per record
pub const VALUE_WORDS: usize = 5;

/// Words per record
pub const RECORD_WORDS: usize = IDENTITY_WORDS + VALUE_WORDS;

/// Bytes per record (28)
pub const RECORD_SIZE: usize = RECORD_WORDS * WORD_SIZE;

/// End-of-burst marker; never a legal data word
pub const BURST_SENTINEL: u32 = 0xFFFF_FFFF;

/// Fixed-point scale applied to every value word
pub const FIXED_POINT_SCALE: f64 = 10_000.0;

/// Default serial baud rate of the telemetry link
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// The seven words of one record, in wire order
pub type RecordWords = [u32; RECORD_WORDS];

/// Decodes a signed fixed-point word into its value.
///
/// # Examples
///
/// ```
/// use aircraft_radar::protocol::wire::decode_fixed;
///
/// let raw = (-823_533i32) as u32;
/// assert!((decode_fixed(raw) - (-82.3533)).abs() < 1e-4);
/// ```
#[must_use]
pub fn decode_fixed(raw: u32) -> f32 {
    (f64::from(raw as i32) / FIXED_POINT_SCALE) as f32
}

/// Encodes a value as a signed fixed-point word.
///
/// Values are rounded to the nearest step and saturate at the `i32` range.
/// The single scaled value whose bit pattern equals [`BURST_SENTINEL`] (−1)
/// is emitted as 0, which stays within one quantization step.
#[must_use]
pub fn encode_fixed(value: f64) -> u32 {
    let scaled = (value * FIXED_POINT_SCALE).round();
    let clamped = scaled.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;

    match clamped as u32 {
        BURST_SENTINEL => 0,
        word => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout_constants() {
        assert_eq!(RECORD_WORDS, 7);
        assert_eq!(RECORD_SIZE, 28);
        assert_eq!(BURST_SENTINEL, u32::MAX);
    }

    #[test]
    fn test_fixed_point_round_trip_within_one_step() {
        let step = 1.0 / FIXED_POINT_SCALE;
        for value in [-82.3533, 29.6465, 0.0, 179.9999, -179.9999, 45.12345, 359.5] {
            let decoded = f64::from(decode_fixed(encode_fixed(value)));
            assert!(
                (decoded - value).abs() <= step,
                "{} decoded as {}",
                value,
                decoded
            );
        }
    }

    #[test]
    fn test_encode_never_emits_sentinel() {
        assert_eq!(encode_fixed(-0.0001), 0);
        assert_ne!(encode_fixed(-0.0002), BURST_SENTINEL);
    }

    #[test]
    fn test_encode_saturates() {
        assert_eq!(encode_fixed(1.0e9) as i32, i32::MAX);
        assert_eq!(encode_fixed(-1.0e9) as i32, i32::MIN);
    }
}
