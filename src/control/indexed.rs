//! Calibration-indexed control law.
//!
//! The level is an index into the [`CalibrationTable`]; comparisons use the
//! table's watts at that index. After every step down the law spends one
//! cycle in `Wait` so the meter's averaged value reflects the new setting
//! before `Decrementing` evaluates it again. Once stabilized, it re-probes
//! upwards every `reprobe_ms` to pick up surplus that appeared meanwhile.

use crate::control::{ActuatorCommand, CalibrationTable, ControlLaw, ControllerState, Decision};
use crate::error::{Result, RouterError};
use crate::tic::Reading;

/// Default search step, in table indices
pub const DEFAULT_FAST_STEP: u16 = 1;

/// Default dwell in `Stabilized` before re-probing, ms
pub const DEFAULT_REPROBE_MS: u64 = 60_000;

/// Table, steps and re-probe timer of the indexed law
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedLaw {
    table: CalibrationTable,
    fast_step: u16,
    ceiling: u16,
    reprobe_ms: u64,
    stabilized_at: Option<u64>,
}

impl IndexedLaw {
    /// Create an indexed law.
    ///
    /// `ceiling` caps the index; it is lowered to the table's last index if
    /// larger.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the step is zero or larger than the
    /// table, or the ceiling is zero.
    pub fn new(table: CalibrationTable, fast_step: u16, ceiling: u16, reprobe_ms: u64) -> Result<Self> {
        let ceiling = ceiling.min(table.last_index());
        if ceiling == 0 {
            return Err(RouterError::invalid_ceiling());
        }
        if fast_step == 0 || fast_step > table.last_index() {
            return Err(RouterError::invalid_step());
        }
        Ok(Self {
            table,
            fast_step,
            ceiling,
            reprobe_ms,
            stabilized_at: None,
        })
    }

    /// Calibration table in use
    pub const fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Search step, in indices
    pub const fn fast_step(&self) -> u16 {
        self.fast_step
    }

    /// Dwell before re-probing, ms
    pub const fn reprobe_ms(&self) -> u64 {
        self.reprobe_ms
    }

    /// When `Stabilized` was entered, if it currently is
    pub const fn stabilized_at(&self) -> Option<u64> {
        self.stabilized_at
    }

    fn step_down(level: u16) -> Decision {
        Decision::new(ControllerState::Wait, level.saturating_sub(1))
    }
}

impl Default for IndexedLaw {
    fn default() -> Self {
        let table = CalibrationTable::default();
        Self {
            table,
            fast_step: DEFAULT_FAST_STEP,
            ceiling: table.last_index(),
            reprobe_ms: DEFAULT_REPROBE_MS,
            stabilized_at: None,
        }
    }
}

impl ControlLaw for IndexedLaw {
    fn decide(
        &mut self,
        state: ControllerState,
        level: u16,
        reading: Reading,
        now_ms: u64,
    ) -> Decision {
        let above = self.table.watts(level) > reading.va();

        let decision = match state {
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
                    Self::step_down(level)
                } else {
                    Decision::idle()
                }
            }
            ControllerState::Wait => Decision::new(ControllerState::Decrementing, level),
            ControllerState::Decrementing => {
                if reading.is_zero() {
                    self.stabilized_at = Some(now_ms);
                    Decision::new(ControllerState::Stabilized, level)
                } else if above {
                    Self::step_down(level)
                } else {
                    Decision::idle()
                }
            }
            ControllerState::Stabilized => {
                let since = *self.stabilized_at.get_or_insert(now_ms);
                if now_ms.saturating_sub(since) > self.reprobe_ms {
                    Decision::new(ControllerState::Incrementing, level)
                } else if reading.is_zero() {
                    Decision::new(ControllerState::Stabilized, level)
                } else if above {
                    Self::step_down(level)
                } else {
                    Decision::idle()
                }
            }
        };

        if decision.state != ControllerState::Stabilized {
            self.stabilized_at = None;
        }
        decision
    }

    fn max_level(&self) -> u16 {
        self.ceiling
    }

    fn level_watts(&self, level: u16) -> u32 {
        self.table.watts(level)
    }

    fn command(&self, level: u16) -> ActuatorCommand {
        self.table.command(level)
    }
}
