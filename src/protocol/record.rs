//! # Record Decoding
//!
//! Turns the seven words of one record into a [`TrackRecord`].

use super::wire::{decode_fixed, RecordWords};
use crate::track::{Callsign, TrackRecord};

/// Decodes a complete record.
///
/// Value words are taken in the fixed order longitude, latitude, altitude,
/// velocity, heading.
///
/// # Examples
///
/// ```
/// use aircraft_radar::protocol::encoder::encode_record_words;
/// use aircraft_radar::protocol::record::decode_record;
///
/// let words = encode_record_words("AAL12", -82.25, 29.6465, 3000.0, 210.5, 45.0);
/// let track = decode_record(&words);
/// assert_eq!(track.callsign.to_string(), "AAL12");
/// assert!((track.latitude - 29.6465).abs() < 1e-4);
/// ```
#[must_use]
pub fn decode_record(words: &RecordWords) -> TrackRecord {
    TrackRecord::new(
        Callsign::from_words(words[0], words[1]),
        decode_fixed(words[2]),
        decode_fixed(words[3]),
        decode_fixed(words[4]),
        decode_fixed(words[5]),
        decode_fixed(words[6]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_record_field_order() {
        let words: RecordWords = [
            u32::from_le_bytes(*b"N123"),
            u32::from_le_bytes(*b"AB  "),
            (-823_533i32) as u32,
            296_465,
            30_000_000,
            2_505_000,
            (1_800_000i32) as u32,
        ];

        let track = decode_record(&words);
        assert_eq!(track.callsign, Callsign::new("N123AB"));
        assert!((track.longitude - (-82.3533)).abs() < 1e-4);
        assert!((track.latitude - 29.6465).abs() < 1e-4);
        assert!((track.altitude - 3000.0).abs() < 1e-2);
        assert!((track.velocity - 250.5).abs() < 1e-3);
        assert!((track.heading - 180.0).abs() < 1e-3);
        assert!(!track.is_visible());
    }

    #[test]
    fn test_decode_record_blank_callsign() {
        let blank = u32::from_le_bytes(*b"    ");
        let words: RecordWords = [blank, blank, 0, 0, 0, 0, 0];
        assert!(decode_record(&words).callsign.is_unknown());
    }
}
