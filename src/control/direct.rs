//! Direct power control law.
//!
//! The level is the element power in watts. While the meter reads 0 the
//! level climbs by `fast_step` (searching) or `slow_step` (stabilized, to
//! follow a slowly growing surplus). When import appears and the level is
//! larger than it, the import is subtracted; when the import exceeds the
//! level, the element is switched off.
//!
//! This generation never enters `Wait` or `Decrementing`; if asked to decide
//! from one of them it behaves as in `Stabilized`.

use crate::control::{ActuatorCommand, ControlLaw, ControllerState, Decision};
use crate::error::{Result, RouterError};
use crate::tic::Reading;

/// Default power ceiling, W
pub const DEFAULT_CEILING_W: u16 = 2000;

/// Default search step, W
pub const DEFAULT_FAST_STEP_W: u16 = 100;

/// Default tracking step, W
pub const DEFAULT_SLOW_STEP_W: u16 = 10;

/// Step sizes and ceiling of the direct law
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirectLaw {
    ceiling: u16,
    fast_step: u16,
    slow_step: u16,
}

impl DirectLaw {
    /// Create a direct law.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the ceiling or a step is zero, or a
    /// step exceeds the ceiling.
    pub fn new(ceiling: u16, fast_step: u16, slow_step: u16) -> Result<Self> {
        if ceiling == 0 {
            return Err(RouterError::invalid_ceiling());
        }
        if fast_step == 0 || slow_step == 0 || fast_step > ceiling || slow_step > ceiling {
            return Err(RouterError::invalid_step());
        }
        Ok(Self {
            ceiling,
            fast_step,
            slow_step,
        })
    }

    /// Power ceiling, W
    pub const fn ceiling(&self) -> u16 {
        self.ceiling
    }

    /// Search step, W
    pub const fn fast_step(&self) -> u16 {
        self.fast_step
    }

    /// Tracking step, W
    pub const fn slow_step(&self) -> u16 {
        self.slow_step
    }
}

impl Default for DirectLaw {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING_W,
            fast_step: DEFAULT_FAST_STEP_W,
            slow_step: DEFAULT_SLOW_STEP_W,
        }
    }
}

/// `level − import`, saturating at 0
fn shed(level: u16, import: u32) -> u16 {
    u32::from(level).saturating_sub(import) as u16
}

impl ControlLaw for DirectLaw {
    fn decide(
        &mut self,
        state: ControllerState,
        level: u16,
        reading: Reading,
        _now_ms: u64,
    ) -> Decision {
        let import = reading.va();
        let above = u32::from(level) > import;

        match state {
            ControllerState::Idle => {
                if reading.is_zero() {
                    Decision::new(ControllerState::Incrementing, self.fast_step)
                } else {
                    Decision::idle()
                }
            }
            ControllerState::Incrementing => {
                if reading.is_zero() {
                    Decision::new(
                        ControllerState::Incrementing,
                        level.saturating_add(self.fast_step),
                    )
                } else if above {
                    Decision::new(ControllerState::Stabilized, shed(level, import))
                } else {
                    Decision::idle()
                }
            }
            ControllerState::Stabilized | ControllerState::Wait | ControllerState::Decrementing => {
                if reading.is_zero() {
                    Decision::new(
                        ControllerState::Stabilized,
                        level.saturating_add(self.slow_step),
                    )
                } else if above {
                    Decision::new(ControllerState::Stabilized, shed(level, import))
                } else {
                    Decision::idle()
                }
            }
        }
    }

    fn max_level(&self) -> u16 {
        self.ceiling
    }

    fn level_watts(&self, level: u16) -> u32 {
        u32::from(level)
    }

    fn command(&self, level: u16) -> ActuatorCommand {
        ActuatorCommand::Watts(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn law() -> DirectLaw {
        DirectLaw::new(1000, 100, 10).unwrap()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(DirectLaw::new(0, 100, 10).unwrap_err().as_config().unwrap().is_invalid_ceiling());
        assert!(DirectLaw::new(1000, 0, 10).unwrap_err().as_config().unwrap().is_invalid_step());
        assert!(DirectLaw::new(1000, 100, 0).is_err());
        assert!(DirectLaw::new(100, 200, 10).is_err());
    }

    #[test]
    fn test_idle() {
        let mut law = law();
        assert_eq!(
            law.decide(ControllerState::Idle, 0, Reading::new(0), 0),
            Decision::new(ControllerState::Incrementing, 100)
        );
        assert_eq!(
            law.decide(ControllerState::Idle, 0, Reading::new(40), 0),
            Decision::idle()
        );
    }

    #[test]
    fn test_incrementing() {
        let mut law = law();
        assert_eq!(
            law.decide(ControllerState::Incrementing, 300, Reading::new(0), 0),
            Decision::new(ControllerState::Incrementing, 400)
        );
        assert_eq!(
            law.decide(ControllerState::Incrementing, 400, Reading::new(70), 0),
            Decision::new(ControllerState::Stabilized, 330)
        );
        assert_eq!(
            law.decide(ControllerState::Incrementing, 400, Reading::new(400), 0),
            Decision::idle()
        );
    }

    #[test]
    fn test_stabilized() {
        let mut law = law();
        assert_eq!(
            law.decide(ControllerState::Stabilized, 330, Reading::new(0), 0),
            Decision::new(ControllerState::Stabilized, 340)
        );
        assert_eq!(
            law.decide(ControllerState::Stabilized, 340, Reading::new(15), 0),
            Decision::new(ControllerState::Stabilized, 325)
        );
        assert_eq!(
            law.decide(ControllerState::Stabilized, 340, Reading::new(900), 0),
            Decision::idle()
        );
    }

    #[test]
    fn test_saturating_arithmetic() {
        let mut law = DirectLaw::new(u16::MAX, u16::MAX, u16::MAX).unwrap();
        let decision = law.decide(ControllerState::Incrementing, u16::MAX, Reading::new(0), 0);
        assert_eq!(decision.level, u16::MAX);
    }

    #[test]
    fn test_command_is_watts() {
        let law = law();
        assert_eq!(law.command(250), ActuatorCommand::Watts(250));
        assert_eq!(law.level_watts(250), 250);
        assert_eq!(law.max_level(), 1000);
    }
}
