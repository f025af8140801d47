//! Streaming decoder for the TIC apparent power group.
//!
//! The meter emits a continuous stream of information groups. The decoder
//! looks at one byte at a time and only follows the grammar of the single
//! group carrying instantaneous apparent power:
//!
//! ```text
//! LF label SEP d d d d d SEP checksum CR
//! ```
//!
//! ## State Machine
//!
//! ```text
//!            LF (from any state)
//!   ┌──────────────────────────────────┐
//!   v                                  │
//! AwaitStart ─LF─> Label(0..n) ─> FirstSeparator ─> Digit(0..5)
//!   ^                                                   │
//!   │ mismatch (any state)                              v
//!   │                 Terminator <─ Checksum <─ SecondSeparator
//!   │                      │ CR: verify, emit, reset
//!   └──────────────────────┘
//! ```
//!
//! Every byte that does not match the next expected symbol drops the partial
//! group and returns to `AwaitStart`. Only LF starts a new group, so the
//! rejecting byte is never reinterpreted unless it is LF itself.
//!
//! ## Example
//!
//! ```rust
//! use tic_router::tic::{TicDecoder, TicMode};
//!
//! let mut decoder = TicDecoder::new(TicMode::Standard.format());
//! let mut last = None;
//! for &byte in b"\nSINSTS\t00123\tL\r" {
//!     if let Some(reading) = decoder.feed_reading(byte) {
//!         last = Some(reading.va());
//!     }
//! }
//! assert_eq!(last, Some(123));
//! ```

use crate::tic::constants::{FrameFormat, CHECKSUM_MAX, CHECKSUM_MIN, CR, DIGIT_COUNT, LF};
use crate::tic::frame::{FrameBuffer, Reading};

/// Grammar position of the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// Waiting for LF
    AwaitStart,
    /// Matching label byte at this index
    Label(u8),
    /// Expecting the separator after the label
    FirstSeparator,
    /// Expecting digit at this index
    Digit(u8),
    /// Expecting the separator after the digits
    SecondSeparator,
    /// Expecting the check character
    Checksum,
    /// Expecting CR
    Terminator,
}

/// Decoder diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecoderStats {
    /// Groups accepted with a valid check character
    pub frames: u32,
    /// Complete groups discarded on a bad check character
    pub checksum_failures: u32,
    /// Partial groups abandoned on an unexpected byte
    pub resyncs: u32,
}

/// Byte-at-a-time decoder for one TIC information group.
#[derive(Debug, Clone)]
pub struct TicDecoder {
    format: FrameFormat,
    state: ParserState,
    buffer: FrameBuffer,
    completed: Option<Reading>,
    stats: DecoderStats,
}

impl TicDecoder {
    /// Create a decoder for the given group format
    pub const fn new(format: FrameFormat) -> Self {
        Self {
            format,
            state: ParserState::AwaitStart,
            buffer: FrameBuffer::new(),
            completed: None,
            stats: DecoderStats {
                frames: 0,
                checksum_failures: 0,
                resyncs: 0,
            },
        }
    }

    /// Group format this decoder recognizes
    pub const fn format(&self) -> &FrameFormat {
        &self.format
    }

    /// Current grammar position
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Bytes captured for the group in progress
    pub fn captured(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Decoder diagnostics
    pub const fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Value of the group completed by the latest [`feed`](Self::feed) call.
    ///
    /// `None` unless that call returned `true`.
    pub const fn reading(&self) -> Option<Reading> {
        self.completed
    }

    /// Drop any partial group and wait for LF
    pub fn reset(&mut self) {
        self.state = ParserState::AwaitStart;
        self.buffer.clear();
    }

    /// Feed one byte and return the reading if it completed a valid group.
    #[inline]
    pub fn feed_reading(&mut self, byte: u8) -> Option<Reading> {
        if self.feed(byte) {
            self.completed.take()
        } else {
            None
        }
    }

    /// Feed one byte from the link.
    ///
    /// Returns `true` when the byte terminated a group whose check character
    /// verified; [`reading`](Self::reading) then holds its value.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.completed = None;

        // 7E1 links read as 8N1 carry parity in the top bit
        let byte = byte & 0x7F;
        if byte == 0 {
            return false;
        }

        if byte == LF {
            if self.state != ParserState::AwaitStart {
                self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
            }
            self.buffer.clear();
            self.state = ParserState::Label(0);
            return false;
        }

        let label = self.format.label;
        let next = match self.state {
            ParserState::AwaitStart => return false,
            ParserState::Label(index) => {
                let expected = label.get(usize::from(index)).copied();
                match expected {
                    Some(expected) if byte.eq_ignore_ascii_case(&expected) => {
                        if usize::from(index) + 1 == label.len() {
                            Some(ParserState::FirstSeparator)
                        } else {
                            Some(ParserState::Label(index + 1))
                        }
                    }
                    _ => None,
                }
            }
            ParserState::FirstSeparator => {
                (byte == self.format.separator).then_some(ParserState::Digit(0))
            }
            ParserState::Digit(index) => byte.is_ascii_digit().then(|| {
                if usize::from(index) + 1 == DIGIT_COUNT {
                    ParserState::SecondSeparator
                } else {
                    ParserState::Digit(index + 1)
                }
            }),
            ParserState::SecondSeparator => {
                (byte == self.format.separator).then_some(ParserState::Checksum)
            }
            ParserState::Checksum => {
                (CHECKSUM_MIN..=CHECKSUM_MAX).contains(&byte).then_some(ParserState::Terminator)
            }
            ParserState::Terminator => {
                if byte == CR {
                    return self.complete();
                }
                None
            }
        };

        match next {
            Some(state) if self.buffer.push(byte) => {
                self.state = state;
            }
            _ => self.resync(),
        }
        false
    }

    fn complete(&mut self) -> bool {
        let accepted = self.buffer.verify(&self.format);
        if accepted {
            self.completed = self.buffer.value(&self.format);
            self.stats.frames = self.stats.frames.wrapping_add(1);
        } else {
            self.stats.checksum_failures = self.stats.checksum_failures.wrapping_add(1);
            tic_log!(trace, "TIC checksum mismatch, group dropped");
        }
        self.reset();
        self.completed.is_some()
    }

    fn resync(&mut self) {
        self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tic::checksum::checksum;
    use crate::tic::constants::{TicMode, HT};

    const VALID: &[u8] = b"\nSINSTS\t00123\tL\r";

    fn standard() -> TicDecoder {
        TicDecoder::new(TicMode::Standard.format())
    }

    fn feed_all(decoder: &mut TicDecoder, bytes: &[u8]) -> Vec<u32> {
        bytes
            .iter()
            .filter_map(|&byte| decoder.feed_reading(byte))
            .map(Reading::va)
            .collect()
    }

    #[test]
    fn test_valid_group() {
        let mut decoder = standard();
        let (last, body) = VALID.split_last().unwrap();
        for &byte in body {
            assert!(!decoder.feed(byte));
        }
        assert!(decoder.feed(*last));
        assert_eq!(decoder.reading(), Some(Reading::new(123)));
        assert_eq!(decoder.state(), ParserState::AwaitStart);
        assert!(decoder.captured().is_empty());
        assert_eq!(decoder.stats().frames, 1);
    }

    #[test]
    fn test_reading_cleared_by_next_byte() {
        let mut decoder = standard();
        feed_all(&mut decoder, &VALID[..VALID.len() - 1]);
        assert!(decoder.feed(b'\r'));
        assert!(decoder.reading().is_some());
        assert!(!decoder.feed(b'\n'));
        assert_eq!(decoder.reading(), None);
    }

    #[test]
    fn test_flipped_checksum() {
        let mut decoder = standard();
        let mut frame = VALID.to_vec();
        let index = frame.len() - 2;
        frame[index] = b'M';
        assert!(feed_all(&mut decoder, &frame).is_empty());
        assert_eq!(decoder.state(), ParserState::AwaitStart);
        assert!(decoder.captured().is_empty());
        assert_eq!(decoder.stats().checksum_failures, 1);
    }

    #[test]
    fn test_historic_group() {
        let mut decoder = TicDecoder::new(TicMode::Historic.format());
        let values = feed_all(&mut decoder, b"\nPAPP 00750 -\r");
        assert_eq!(values, [750]);
    }

    #[test]
    fn test_label_case_insensitive() {
        let mut decoder = standard();
        let body = b"sinsts\t00123\t";
        let mut frame = vec![b'\n'];
        frame.extend_from_slice(body);
        frame.push(checksum(body));
        frame.push(b'\r');
        assert_eq!(feed_all(&mut decoder, &frame), [123]);
    }

    #[test]
    fn test_resync_at_every_position() {
        // A corrupt byte at any position aborts the group without a reading
        for position in 1..VALID.len() {
            let mut decoder = standard();
            let mut frame = VALID.to_vec();
            frame[position] = b'#';
            assert!(feed_all(&mut decoder, &frame).is_empty(), "position {position}");
            assert_eq!(decoder.state(), ParserState::AwaitStart, "position {position}");
            assert!(decoder.captured().is_empty());

            // The decoder is ready for the next group
            assert_eq!(feed_all(&mut decoder, VALID), [123]);
        }
    }

    #[test]
    fn test_rejecting_byte_not_reused() {
        let mut decoder = standard();
        // 'S' rejected as a digit must not restart label matching
        let values = feed_all(&mut decoder, b"\nSINSTS\t0SINSTS\t00123\tL\r");
        assert!(values.is_empty());
    }

    #[test]
    fn test_lf_restarts_group() {
        let mut decoder = standard();
        let values = feed_all(&mut decoder, b"\nSINSTS\t00\nSINSTS\t00123\tL\r");
        assert_eq!(values, [123]);
        assert_eq!(decoder.stats().resyncs, 1);
    }

    #[test]
    fn test_null_bytes_ignored() {
        let mut decoder = standard();
        let mut frame = Vec::new();
        for &byte in VALID {
            frame.push(byte);
            frame.push(0x00);
        }
        assert_eq!(feed_all(&mut decoder, &frame), [123]);
    }

    #[test]
    fn test_parity_bit_masked() {
        let mut decoder = standard();
        let frame: Vec<u8> = VALID.iter().map(|&byte| byte | 0x80).collect();
        assert_eq!(feed_all(&mut decoder, &frame), [123]);
    }

    #[test]
    fn test_consecutive_groups_independent() {
        let mut decoder = standard();
        let mut stream = VALID.to_vec();
        stream.extend_from_slice(VALID);
        assert_eq!(feed_all(&mut decoder, &stream), [123, 123]);
        assert_eq!(decoder.stats().frames, 2);
    }

    #[test]
    fn test_other_groups_skipped() {
        let mut decoder = standard();
        let mut stream = Vec::new();
        stream.extend_from_slice(b"\nADSC\t041876097295\tA\r");
        stream.extend_from_slice(b"\nSINSTS1\t00100\tX\r");
        stream.extend_from_slice(VALID);
        stream.extend_from_slice(b"\nSMAXSN\tE230115141532\t06213\t6\r");
        assert_eq!(feed_all(&mut decoder, &stream), [123]);
    }

    #[test]
    fn test_separator_mode_mismatch() {
        let mut decoder = standard();
        let mut frame = VALID.to_vec();
        frame[7] = b' ';
        assert!(feed_all(&mut decoder, &frame).is_empty());
        assert_eq!(frame.iter().filter(|&&b| b == HT).count(), 1);
    }

    #[test]
    fn test_noise_between_groups() {
        let mut decoder = standard();
        let mut stream = vec![0xFF, b'x', b'\r', b'\t'];
        stream.extend_from_slice(VALID);
        stream.extend_from_slice(&[0x55, 0xAA]);
        stream.extend_from_slice(VALID);
        assert_eq!(feed_all(&mut decoder, &stream), [123, 123]);
    }
}
