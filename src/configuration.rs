//! Router configuration.
//!
//! Protocol mode, checksum convention and controller generation are resolved
//! once at startup into a [`RouterConfig`]. The firmware reads them from the
//! [`CONFIG`] block below (see [`crate::utility::parse_config`]); edit it to
//! match the installation.

use crate::control::direct::{DEFAULT_CEILING_W, DEFAULT_FAST_STEP_W, DEFAULT_SLOW_STEP_W};
use crate::control::indexed::{DEFAULT_FAST_STEP, DEFAULT_REPROBE_MS};
use crate::control::{CalibrationTable, ControlStrategy, DirectLaw, IndexedLaw};
use crate::error::Result;
use crate::tic::{ChecksumCoverage, FrameFormat, TicMode};

/// Installation settings, `KEY=VALUE` per line, `#` starts a comment.
///
/// - `TIC_MODE` - `historic` (1200 baud, PAPP) or `standard` (9600 baud, SINSTS)
/// - `CHECKSUM` - `auto`, `include` or `exclude` the separator before the check character
/// - `GENERATION` - `direct` (watts) or `indexed` (calibration table)
/// - `CEILING` - maximum level: watts (direct) or table index (indexed)
/// - `FAST_STEP`, `SLOW_STEP` - search and tracking steps
/// - `REPROBE_SECS` - dwell in Stabilized before re-probing (indexed)
/// - `PACING_MS` - minimum time between two decisions
pub const CONFIG: &str = r#"
TIC_MODE=standard
CHECKSUM=auto
GENERATION=indexed
CEILING=20
FAST_STEP=1
REPROBE_SECS=60
PACING_MS=0
"#;

/// Default decision interval of the direct generation, ms
pub const DEFAULT_DIRECT_PACING_MS: u64 = 1_000;

/// Controller generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Generation {
    /// Level in watts, fixed decision cadence
    Direct,
    /// Level as a calibration index, wall-clock paced
    Indexed,
}

impl Generation {
    /// Parse a generation name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("direct") {
            Some(Generation::Direct)
        } else if name.eq_ignore_ascii_case("indexed") {
            Some(Generation::Indexed)
        } else {
            None
        }
    }
}

/// Resolved router configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouterConfig {
    /// TIC transmission mode
    pub mode: TicMode,
    /// Checksum convention of the meter
    pub coverage: ChecksumCoverage,
    /// Controller generation
    pub generation: Generation,
    /// Maximum level (watts or index)
    pub ceiling: u16,
    /// Search step (watts or indices)
    pub fast_step: u16,
    /// Tracking step in watts (direct only)
    pub slow_step: u16,
    /// Dwell before re-probing, ms (indexed only)
    pub reprobe_ms: u64,
    /// Minimum interval between decisions, ms
    pub pacing_ms: u64,
}

impl RouterConfig {
    /// Defaults for a mode and generation
    pub const fn new(mode: TicMode, generation: Generation) -> Self {
        match generation {
            Generation::Direct => Self {
                mode,
                coverage: mode.default_coverage(),
                generation,
                ceiling: DEFAULT_CEILING_W,
                fast_step: DEFAULT_FAST_STEP_W,
                slow_step: DEFAULT_SLOW_STEP_W,
                reprobe_ms: DEFAULT_REPROBE_MS,
                pacing_ms: DEFAULT_DIRECT_PACING_MS,
            },
            Generation::Indexed => Self {
                mode,
                coverage: mode.default_coverage(),
                generation,
                ceiling: u16::MAX,
                fast_step: DEFAULT_FAST_STEP,
                slow_step: DEFAULT_SLOW_STEP_W,
                reprobe_ms: DEFAULT_REPROBE_MS,
                pacing_ms: 0,
            },
        }
    }

    /// Grammar of the apparent power group
    pub const fn format(&self) -> FrameFormat {
        self.mode.format_with(self.coverage)
    }

    /// Serial speed to configure on the link
    pub const fn baud_rate(&self) -> u32 {
        self.mode.baud_rate()
    }

    /// Build the control law; `table` is used by the indexed generation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if steps or ceiling are out of range.
    pub fn strategy(&self, table: CalibrationTable) -> Result<ControlStrategy> {
        Ok(match self.generation {
            Generation::Direct => {
                DirectLaw::new(self.ceiling, self.fast_step, self.slow_step)?.into()
            }
            Generation::Indexed => {
                IndexedLaw::new(table, self.fast_step, self.ceiling, self.reprobe_ms)?.into()
            }
        })
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new(TicMode::Standard, Generation::Indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlLaw, DEFAULT_TABLE};

    #[test]
    fn test_default_is_standard_indexed() {
        let config = RouterConfig::default();
        assert_eq!(config.baud_rate(), 9600);
        assert_eq!(config.format().coverage, ChecksumCoverage::IncludeFinalSeparator);
        let strategy = config.strategy(DEFAULT_TABLE).unwrap();
        assert!(matches!(strategy, ControlStrategy::Indexed(_)));
        assert_eq!(strategy.max_level(), 20);
    }

    #[test]
    fn test_direct_defaults() {
        let config = RouterConfig::new(TicMode::Historic, Generation::Direct);
        assert_eq!(config.baud_rate(), 1200);
        assert_eq!(config.pacing_ms, DEFAULT_DIRECT_PACING_MS);
        let strategy = config.strategy(DEFAULT_TABLE).unwrap();
        assert_eq!(strategy.max_level(), DEFAULT_CEILING_W);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let mut config = RouterConfig::new(TicMode::Standard, Generation::Direct);
        config.fast_step = 0;
        assert!(config.strategy(DEFAULT_TABLE).is_err());
    }

    #[test]
    fn test_generation_names() {
        assert_eq!(Generation::from_name("Direct"), Some(Generation::Direct));
        assert_eq!(Generation::from_name("INDEXED"), Some(Generation::Indexed));
        assert_eq!(Generation::from_name("pid"), None);
    }
}
