//! # Telemetry Frame Decoder
//!
//! Byte-at-a-time framing state machine for the telemetry stream.
//!
//! Bytes are assembled into little-endian 32-bit words. Words accumulate
//! into the record in progress; the seventh word completes a record. The
//! sentinel word is never part of a record: it ends the burst.
//!
//! ## Resynchronization
//!
//! A sentinel that arrives while a record is only partially assembled is a
//! framing desync. The partial words are discarded and reported in the
//! [`FrameEvent::BurstComplete`] event, so the next record starts aligned.
//! Byte-level drift (a lost byte on the wire) cannot be detected here.

use super::wire::{RecordWords, BURST_SENTINEL, RECORD_WORDS, WORD_SIZE};

/// Output of the frame decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// A complete seven-word record
    Record(RecordWords),

    /// The burst sentinel was received
    BurstComplete {
        /// Words of a partial record discarded by the sentinel (0 when aligned)
        discarded_words: usize,
    },
}

/// Framing state machine
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    word_bytes: [u8; WORD_SIZE],
    byte_index: usize,
    record: RecordWords,
    word_index: usize,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte; returns an event when a record or burst completes.
    ///
    /// Never blocks and never allocates.
    pub fn push_byte(&mut self, byte: u8) -> Option<FrameEvent> {
        self.word_bytes[self.byte_index] = byte;
        self.byte_index += 1;

        if self.byte_index < WORD_SIZE {
            return None;
        }

        self.byte_index = 0;
        self.push_word(u32::from_le_bytes(self.word_bytes))
    }

    /// Feeds a chunk of bytes, collecting every event produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use aircraft_radar::protocol::framer::{FrameDecoder, FrameEvent};
    ///
    /// let mut decoder = FrameDecoder::new();
    /// let events = decoder.push_bytes(&0xFFFF_FFFFu32.to_le_bytes());
    /// assert_eq!(events, vec![FrameEvent::BurstComplete { discarded_words: 0 }]);
    /// ```
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<FrameEvent> {
        bytes.iter().filter_map(|&b| self.push_byte(b)).collect()
    }

    fn push_word(&mut self, word: u32) -> Option<FrameEvent> {
        if word == BURST_SENTINEL {
            let discarded_words = self.word_index;
            self.word_index = 0;
            return Some(FrameEvent::BurstComplete { discarded_words });
        }

        self.record[self.word_index] = word;
        self.word_index += 1;

        if self.word_index == RECORD_WORDS {
            self.word_index = 0;
            return Some(FrameEvent::Record(self.record));
        }

        None
    }

    /// Bytes received since the last record or burst boundary.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.word_index * WORD_SIZE + self.byte_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::RECORD_SIZE;

    fn record_bytes(seed: u32) -> Vec<u8> {
        (0..RECORD_WORDS as u32)
            .flat_map(|i| (seed * 100 + i).to_le_bytes())
            .collect()
    }

    #[test]
    fn test_record_emitted_after_28_bytes() {
        let mut decoder = FrameDecoder::new();
        let bytes = record_bytes(1);

        for &b in &bytes[..RECORD_SIZE - 1] {
            assert_eq!(decoder.push_byte(b), None);
        }
        assert_eq!(decoder.pending_bytes(), RECORD_SIZE - 1);

        let event = decoder.push_byte(bytes[RECORD_SIZE - 1]);
        assert_eq!(
            event,
            Some(FrameEvent::Record([100, 101, 102, 103, 104, 105, 106]))
        );
        assert_eq!(decoder.pending_bytes(), 0);
    }

    #[test]
    fn test_words_are_little_endian() {
        let mut decoder = FrameDecoder::new();
        let mut bytes = vec![0x78, 0x56, 0x34, 0x12];
        bytes.extend(std::iter::repeat(0).take(RECORD_SIZE - 4));

        let events = decoder.push_bytes(&bytes);
        match events.as_slice() {
            [FrameEvent::Record(words)] => assert_eq!(words[0], 0x1234_5678),
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_burst_of_records_then_sentinel() {
        let mut decoder = FrameDecoder::new();
        let mut stream = Vec::new();
        for seed in 1..=3 {
            stream.extend(record_bytes(seed));
        }
        stream.extend(BURST_SENTINEL.to_le_bytes());

        let events = decoder.push_bytes(&stream);
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], FrameEvent::Record(w) if w[0] == 100));
        assert!(matches!(events[2], FrameEvent::Record(w) if w[0] == 300));
        assert_eq!(events[3], FrameEvent::BurstComplete { discarded_words: 0 });
    }

    #[test]
    fn test_empty_burst() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.push_bytes(&BURST_SENTINEL.to_le_bytes());
        assert_eq!(events, vec![FrameEvent::BurstComplete { discarded_words: 0 }]);
    }

    #[test]
    fn test_sentinel_mid_record_discards_partial_words() {
        let mut decoder = FrameDecoder::new();
        let mut stream = record_bytes(1)[..12].to_vec(); // three words
        stream.extend(BURST_SENTINEL.to_le_bytes());
        stream.extend(record_bytes(2));

        let events = decoder.push_bytes(&stream);
        assert_eq!(events[0], FrameEvent::BurstComplete { discarded_words: 3 });
        // The following record is decoded aligned
        assert!(matches!(events[1], FrameEvent::Record(w) if w == [200, 201, 202, 203, 204, 205, 206]));
    }
}
