//! TIC protocol constants and mode-dependent frame formats.

/// Start of a TIC information group
pub const LF: u8 = 0x0A;

/// End of a TIC information group
pub const CR: u8 = 0x0D;

/// Field separator in standard mode
pub const HT: u8 = 0x09;

/// Field separator in historic mode
pub const SP: u8 = 0x20;

/// Number of digits in the apparent power field
pub const DIGIT_COUNT: usize = 5;

/// Mnemonic of the apparent power group in historic mode
pub const LABEL_PAPP: &[u8] = b"PAPP";

/// Mnemonic of the apparent power group in standard mode
pub const LABEL_SINSTS: &[u8] = b"SINSTS";

/// Longest supported label
pub const MAX_LABEL_LEN: usize = 6;

/// Largest number of bytes captured for one group:
/// label, separator, digits, separator, checksum.
pub const MAX_CAPTURED_LEN: usize = MAX_LABEL_LEN + 1 + DIGIT_COUNT + 1 + 1;

/// Capacity of the decoder's frame buffer
pub const FRAME_CAPACITY: usize = 16;

const _: () = assert!(FRAME_CAPACITY > MAX_CAPTURED_LEN, "frame buffer too small");

/// Lowest value the check character can take
pub const CHECKSUM_MIN: u8 = 0x20;

/// Highest value the check character can take
pub const CHECKSUM_MAX: u8 = 0x20 + 0x3F;

/// Link speed in historic mode
pub const BAUD_HISTORIC: u32 = 1200;

/// Link speed in standard mode
pub const BAUD_STANDARD: u32 = 9600;

/// Which bytes the check character covers.
///
/// Historic meters stop before the separator preceding the checksum,
/// standard meters include it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ChecksumCoverage {
    /// label, separator, digits
    ExcludeFinalSeparator,
    /// label, separator, digits, separator
    IncludeFinalSeparator,
}

/// TIC transmission mode of the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TicMode {
    /// Legacy "historique" mode: 1200 baud, `PAPP`, space separated
    Historic,
    /// "standard" mode: 9600 baud, `SINSTS`, tab separated
    Standard,
}

impl TicMode {
    /// Parse a mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("historic") || name.eq_ignore_ascii_case("historique") {
            Some(TicMode::Historic)
        } else if name.eq_ignore_ascii_case("standard") {
            Some(TicMode::Standard)
        } else {
            None
        }
    }

    /// Serial speed the meter emits at in this mode
    pub const fn baud_rate(self) -> u32 {
        match self {
            TicMode::Historic => BAUD_HISTORIC,
            TicMode::Standard => BAUD_STANDARD,
        }
    }

    /// Checksum coverage observed on meters in this mode
    pub const fn default_coverage(self) -> ChecksumCoverage {
        match self {
            TicMode::Historic => ChecksumCoverage::ExcludeFinalSeparator,
            TicMode::Standard => ChecksumCoverage::IncludeFinalSeparator,
        }
    }

    /// Frame format for this mode with its usual checksum coverage
    pub const fn format(self) -> FrameFormat {
        self.format_with(self.default_coverage())
    }

    /// Frame format for this mode with an explicit checksum coverage
    pub const fn format_with(self, coverage: ChecksumCoverage) -> FrameFormat {
        match self {
            TicMode::Historic => FrameFormat {
                label: LABEL_PAPP,
                separator: SP,
                coverage,
            },
            TicMode::Standard => FrameFormat {
                label: LABEL_SINSTS,
                separator: HT,
                coverage,
            },
        }
    }
}

/// Resolved grammar of the one group the decoder recognizes.
///
/// ```text
/// LF label SEP d d d d d SEP checksum CR
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    /// Upper-case mnemonic, matched case-insensitively
    pub label: &'static [u8],
    /// Field separator byte
    pub separator: u8,
    /// Bytes covered by the check character
    pub coverage: ChecksumCoverage,
}

impl FrameFormat {
    /// Offset of the first digit in the captured bytes
    pub const fn digits_offset(&self) -> usize {
        self.label.len() + 1
    }

    /// Offset of the check character in the captured bytes
    pub const fn checksum_offset(&self) -> usize {
        self.digits_offset() + DIGIT_COUNT + 1
    }

    /// Number of bytes summed into the check character
    pub const fn covered_len(&self) -> usize {
        match self.coverage {
            ChecksumCoverage::ExcludeFinalSeparator => self.digits_offset() + DIGIT_COUNT,
            ChecksumCoverage::IncludeFinalSeparator => self.checksum_offset(),
        }
    }

    /// Number of bytes captured for a complete group
    pub const fn captured_len(&self) -> usize {
        self.checksum_offset() + 1
    }
}
