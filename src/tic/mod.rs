//! TIC (télé-information client) decoding.
//!
//! This module recognizes the single information group carrying the
//! instantaneous apparent power in the meter's serial stream, verifies its
//! check character and extracts the value.

pub mod checksum;
pub mod constants;
pub mod decoder;
pub mod frame;

pub use constants::{ChecksumCoverage, FrameFormat, TicMode};
pub use decoder::{DecoderStats, ParserState, TicDecoder};
pub use frame::{FrameBuffer, Reading};
