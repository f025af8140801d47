//! Surplus power control.
//!
//! The controller turns each validated meter reading into the next actuator
//! level. Its goal is zero import: as long as the meter reads 0 VA there is
//! surplus to absorb and the level goes up; once the element draws more than
//! the surplus, the meter shows import and the level comes back down.
//!
//! ## Generations
//!
//! Two control laws share the same [`ControllerState`] machine:
//!
//! - [`DirectLaw`] - the level is a power in watts, raised by a fast step
//!   while searching and a slow step once stabilized, lowered by the observed
//!   import.
//! - [`IndexedLaw`] - the level is an index into a [`CalibrationTable`],
//!   with a settle cycle (`Wait`) before re-evaluating and a periodic
//!   re-probe out of `Stabilized`.
//!
//! [`ControlStrategy`] selects one of them at startup.

use crate::tic::Reading;

pub mod calibration;
pub mod controller;
pub mod direct;
pub mod energy;
pub mod indexed;

#[doc(inline)]
pub use calibration::{CalibrationPoint, CalibrationTable, DEFAULT_TABLE};
#[doc(inline)]
pub use controller::PowerController;
#[doc(inline)]
pub use direct::DirectLaw;
#[doc(inline)]
pub use energy::EnergyAccumulator;
#[doc(inline)]
pub use indexed::IndexedLaw;

/// Position of the search for the zero-import boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ControllerState {
    /// Element off, waiting for surplus
    #[default]
    Idle,
    /// Raising the level by the fast step
    Incrementing,
    /// One settle cycle so the meter's averaging catches up
    Wait,
    /// Re-evaluating after a step down
    Decrementing,
    /// Holding near the boundary
    Stabilized,
}

/// Command sent to the actuator collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ActuatorCommand {
    /// Direct power setpoint, W
    Watts(u16),
    /// Dimmer output from the calibration table
    Dimmer {
        /// Output stage on
        enabled: bool,
        /// Dimmer command, 0-100 %
        percent: u8,
    },
}

/// Outcome of one control decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decision {
    /// State for the next cycle
    pub state: ControllerState,
    /// Level for the next cycle, before clamping
    pub level: u16,
}

impl Decision {
    /// Create a decision
    pub const fn new(state: ControllerState, level: u16) -> Self {
        Self { state, level }
    }

    /// Turn the element off and wait for surplus
    pub const fn idle() -> Self {
        Self::new(ControllerState::Idle, 0)
    }
}

/// A control law: step sizes, level meaning and transition rules.
pub trait ControlLaw {
    /// Compute the next state and level from the current ones.
    ///
    /// The result is clamped to [`max_level`](Self::max_level) by the caller.
    fn decide(
        &mut self,
        state: ControllerState,
        level: u16,
        reading: Reading,
        now_ms: u64,
    ) -> Decision;

    /// Highest valid level
    fn max_level(&self) -> u16;

    /// Approximate element power at `level`, W
    fn level_watts(&self, level: u16) -> u32;

    /// Actuator command for `level`
    fn command(&self, level: u16) -> ActuatorCommand;
}

/// Control law chosen at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlStrategy {
    /// Level in watts
    Direct(DirectLaw),
    /// Level as a calibration table index
    Indexed(IndexedLaw),
}

impl ControlLaw for ControlStrategy {
    #[inline]
    fn decide(
        &mut self,
        state: ControllerState,
        level: u16,
        reading: Reading,
        now_ms: u64,
    ) -> Decision {
        match self {
            ControlStrategy::Direct(law) => law.decide(state, level, reading, now_ms),
            ControlStrategy::Indexed(law) => law.decide(state, level, reading, now_ms),
        }
    }

    #[inline]
    fn max_level(&self) -> u16 {
        match self {
            ControlStrategy::Direct(law) => law.max_level(),
            ControlStrategy::Indexed(law) => law.max_level(),
        }
    }

    #[inline]
    fn level_watts(&self, level: u16) -> u32 {
        match self {
            ControlStrategy::Direct(law) => law.level_watts(level),
            ControlStrategy::Indexed(law) => law.level_watts(level),
        }
    }

    #[inline]
    fn command(&self, level: u16) -> ActuatorCommand {
        match self {
            ControlStrategy::Direct(law) => law.command(level),
            ControlStrategy::Indexed(law) => law.command(level),
        }
    }
}

impl From<DirectLaw> for ControlStrategy {
    fn from(law: DirectLaw) -> Self {
        ControlStrategy::Direct(law)
    }
}

impl From<IndexedLaw> for ControlStrategy {
    fn from(law: IndexedLaw) -> Self {
        ControlStrategy::Indexed(law)
    }
}
