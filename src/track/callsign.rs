//! # Call Sign Identity
//!
//! Fixed-width, seven byte aircraft identity as it arrives on the wire.
//!
//! Identity comparisons are exact byte-for-byte matches; padding is kept as
//! received so the same aircraft always compares equal across bursts.

use serde::{Serialize, Serializer};
use std::fmt;

/// Number of identity bytes carried per record.
pub const CALLSIGN_LEN: usize = 7;

/// Label substituted for blank identities.
const UNKNOWN_LABEL: [u8; CALLSIGN_LEN] = *b"N/A    ";

/// Aircraft call sign (7 ASCII bytes, space or NUL padded).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Callsign([u8; CALLSIGN_LEN]);

impl Callsign {
    /// Identity used when the wire carries an empty call sign.
    pub const UNKNOWN: Callsign = Callsign(UNKNOWN_LABEL);

    /// Builds a call sign from raw identity bytes.
    ///
    /// An identity whose first character is a space or NUL is normalized
    /// to [`Callsign::UNKNOWN`].
    #[must_use]
    pub fn from_bytes(bytes: [u8; CALLSIGN_LEN]) -> Self {
        match bytes[0] {
            b' ' | 0 => Self::UNKNOWN,
            _ => Self(bytes),
        }
    }

    /// Reconstructs a call sign from the two identity words of a record.
    ///
    /// The words form a little-endian 64-bit value whose low seven bytes are
    /// the ASCII characters; the eighth byte is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use aircraft_radar::track::Callsign;
    ///
    /// let low = u32::from_le_bytes(*b"DAL1");
    /// let high = u32::from_le_bytes(*b"23  ");
    /// assert_eq!(Callsign::from_words(low, high), Callsign::new("DAL123"));
    /// ```
    #[must_use]
    pub fn from_words(low: u32, high: u32) -> Self {
        let raw = (u64::from(high) << 32) | u64::from(low);
        let le = raw.to_le_bytes();

        let mut bytes = [0u8; CALLSIGN_LEN];
        bytes.copy_from_slice(&le[..CALLSIGN_LEN]);
        Self::from_bytes(bytes)
    }

    /// Builds a space padded call sign from text, truncating to seven bytes.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut bytes = [b' '; CALLSIGN_LEN];
        for (slot, byte) in bytes.iter_mut().zip(text.trim().bytes()) {
            *slot = byte;
        }
        Self::from_bytes(bytes)
    }

    /// Raw identity bytes including padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; CALLSIGN_LEN] {
        &self.0
    }

    /// True for the normalized "unknown" identity.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Call sign text with trailing padding removed.
    #[must_use]
    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.0)
            .trim_end_matches(|c: char| c == ' ' || c == '\0')
            .to_string()
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trimmed())
    }
}

impl fmt::Debug for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callsign({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for Callsign {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.trimmed())
    }
}
