//! TIC check character.
//!
//! The check character of an information group is the sum of the covered
//! bytes, truncated to its low six bits and shifted into the printable range:
//!
//! ```text
//! checksum = (sum(covered) & 0x3F) + 0x20
//! ```

use crate::tic::constants::CHECKSUM_MIN;

/// Compute the check character of `covered`.
#[inline]
pub fn checksum(covered: &[u8]) -> u8 {
    let sum = covered
        .iter()
        .fold(0u32, |acc, &byte| acc.wrapping_add(u32::from(byte)));
    (sum & 0x3F) as u8 + CHECKSUM_MIN
}

/// Check `received` against the bytes it covers.
#[inline]
pub fn verify(covered: &[u8], received: u8) -> bool {
    checksum(covered) == received
}
