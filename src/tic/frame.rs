//! Bounded frame buffer and value extraction.
//!
//! The decoder stores the bytes of the group being matched in a
//! [`FrameBuffer`]. Once a group is complete and its check character
//! verified, [`FrameBuffer::value`] reads the fixed-width digit field.
//!
//! ```text
//! ┌────────────┬─────┬───────────┬─────┬──────────┐
//! │ label 4..6 │ SEP │ d d d d d │ SEP │ checksum │
//! └────────────┴─────┴───────────┴─────┴──────────┘
//!               ^ digits_offset()       ^ checksum_offset()
//! ```

use heapless::Vec;

use crate::tic::checksum;
use crate::tic::constants::{FrameFormat, DIGIT_COUNT, FRAME_CAPACITY};

/// Instantaneous apparent power reported by the meter, in VA.
///
/// Only produced from a group whose check character verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reading(u32);

impl Reading {
    /// Largest value the five-digit field can carry
    pub const MAX: u32 = 99_999;

    /// Create a reading, saturating at [`Reading::MAX`]
    #[inline]
    pub const fn new(va: u32) -> Self {
        if va > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(va)
        }
    }

    /// Apparent power in VA
    #[inline]
    pub const fn va(self) -> u32 {
        self.0
    }

    /// True when the meter reports no import
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<Reading> for u32 {
    #[inline]
    fn from(reading: Reading) -> u32 {
        reading.0
    }
}

/// Fixed-capacity buffer holding the bytes matched since the last frame start.
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    bytes: Vec<u8, FRAME_CAPACITY>,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append a matched byte.
    ///
    /// Returns `false` if the buffer is full; the caller must reset.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        self.bytes.push(byte).is_ok()
    }

    /// Drop all captured bytes
    #[inline]
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Number of captured bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing has been captured
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Captured bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at `index`, if captured
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Verify the check character of a complete group.
    ///
    /// Returns `false` if the buffer does not hold a complete group for `format`.
    pub fn verify(&self, format: &FrameFormat) -> bool {
        if self.len() != format.captured_len() {
            return false;
        }
        match (
            self.bytes.get(..format.covered_len()),
            self.get(format.checksum_offset()),
        ) {
            (Some(covered), Some(received)) => checksum::verify(covered, received),
            _ => false,
        }
    }

    /// Parse the five-digit field of a complete group.
    ///
    /// Only meaningful right after [`FrameBuffer::verify`] accepted the group.
    pub fn value(&self, format: &FrameFormat) -> Option<Reading> {
        let start = format.digits_offset();
        let digits = self.bytes.get(start..start + DIGIT_COUNT)?;
        let mut va = 0u32;
        for &digit in digits {
            if !digit.is_ascii_digit() {
                return None;
            }
            va = va * 10 + u32::from(digit - b'0');
        }
        Some(Reading::new(va))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tic::constants::{TicMode, MAX_CAPTURED_LEN};

    fn filled(bytes: &[u8]) -> FrameBuffer {
        let mut buffer = FrameBuffer::new();
        for &byte in bytes {
            assert!(buffer.push(byte));
        }
        buffer
    }

    #[test]
    fn test_value_standard() {
        let buffer = filled(b"SINSTS\t00123\tL");
        let format = TicMode::Standard.format();
        assert!(buffer.verify(&format));
        assert_eq!(buffer.value(&format), Some(Reading::new(123)));
    }

    #[test]
    fn test_value_historic() {
        let buffer = filled(b"PAPP 00750 -");
        let format = TicMode::Historic.format();
        assert!(buffer.verify(&format));
        assert_eq!(buffer.value(&format).map(Reading::va), Some(750));
    }

    #[test]
    fn test_verify_rejects_partial() {
        let buffer = filled(b"SINSTS\t001");
        let format = TicMode::Standard.format();
        assert!(!buffer.verify(&format));
        assert_eq!(buffer.value(&format), None);
    }

    #[test]
    fn test_capacity_bound() {
        let mut buffer = FrameBuffer::new();
        for _ in 0..FRAME_CAPACITY {
            assert!(buffer.push(b'0'));
        }
        assert!(!buffer.push(b'0'));
        assert!(buffer.len() > MAX_CAPTURED_LEN);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.get(0), None);
    }

    #[test]
    fn test_reading_saturates() {
        assert_eq!(Reading::new(150_000).va(), Reading::MAX);
        assert!(Reading::new(0).is_zero());
        assert_eq!(u32::from(Reading::new(42)), 42);
    }
}
