//! # Telemetry Encoder
//!
//! Producer-side serialization of aircraft state vectors into wire records
//! and bursts. The device only decodes; this side exists for loopback feeds
//! and test fixtures.

use bytes::{BufMut, Bytes, BytesMut};

use super::wire::{encode_fixed, RecordWords, BURST_SENTINEL, RECORD_SIZE, WORD_SIZE};

/// Identity bytes sent on the wire (two words)
const WIRE_IDENTITY_LEN: usize = 8;

/// Label sent when the source has no call sign
const MISSING_CALLSIGN: &str = "N/A";

/// Aircraft state vector as reported by the upstream flight-data source.
///
/// Missing numeric fields are sent as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateVector {
    pub callsign: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude: Option<f64>,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
}

/// Encode a state vector into the seven words of one record.
pub fn encode_state_vector(state: &StateVector) -> RecordWords {
    let [low, high] = encode_identity(state.callsign.as_deref().unwrap_or(MISSING_CALLSIGN));

    [
        low,
        high,
        encode_fixed(state.longitude.unwrap_or(0.0)),
        encode_fixed(state.latitude.unwrap_or(0.0)),
        encode_fixed(state.altitude.unwrap_or(0.0)),
        encode_fixed(state.velocity.unwrap_or(0.0)),
        encode_fixed(state.true_track.unwrap_or(0.0)),
    ]
}

/// Encode a fully populated record.
///
/// # Examples
///
/// ```
/// use aircraft_radar::protocol::encoder::encode_record_words;
///
/// let words = encode_record_words("DAL9", -82.0, 29.0, 0.0, 0.0, 90.0);
/// assert_eq!(words[0], u32::from_le_bytes(*b"DAL9"));
/// assert_eq!(words[6], 900_000);
/// ```
pub fn encode_record_words(
    callsign: &str,
    longitude: f64,
    latitude: f64,
    altitude: f64,
    velocity: f64,
    heading: f64,
) -> RecordWords {
    encode_state_vector(&StateVector {
        callsign: Some(callsign.to_string()),
        longitude: Some(longitude),
        latitude: Some(latitude),
        altitude: Some(altitude),
        velocity: Some(velocity),
        true_track: Some(heading),
    })
}

/// Serialize records followed by the burst sentinel.
pub fn encode_burst<I>(records: I) -> Bytes
where
    I: IntoIterator<Item = RecordWords>,
{
    let records = records.into_iter();
    let mut buf = BytesMut::with_capacity(records.size_hint().0 * RECORD_SIZE + WORD_SIZE);

    for words in records {
        for word in words {
            buf.put_u32_le(word);
        }
    }
    buf.put_u32_le(BURST_SENTINEL);

    buf.freeze()
}

/// Trimmed ASCII call sign, truncated and space padded to eight bytes,
/// split into two little-endian words.
fn encode_identity(callsign: &str) -> [u32; 2] {
    let mut bytes = [b' '; WIRE_IDENTITY_LEN];
    let ascii = callsign.trim().bytes().filter(u8::is_ascii);
    for (slot, byte) in bytes.iter_mut().zip(ascii) {
        *slot = byte;
    }

    [
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
    ]
}
