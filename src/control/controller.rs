//! Power controller: state, level and energy ledger around a control law.

use crate::control::energy::EnergyAccumulator;
use crate::control::{ActuatorCommand, ControlLaw, ControlStrategy, ControllerState};
use crate::tic::Reading;

/// Stateful controller driving the element toward zero import.
///
/// One call to [`on_reading`](Self::on_reading) per validated reading. Each
/// call first books the elapsed interval in the energy ledger at the
/// outgoing level, then asks the law for the next state and level, then
/// clamps the level to the law's range.
///
/// # Examples
///
/// ```rust
/// use tic_router::control::{ControllerState, DirectLaw, PowerController};
/// use tic_router::tic::Reading;
///
/// let law = DirectLaw::new(1000, 100, 10).unwrap();
/// let mut controller = PowerController::new(law, 0);
///
/// assert_eq!(controller.on_reading(Reading::new(0), 1_000), 100);
/// assert_eq!(controller.on_reading(Reading::new(0), 2_000), 200);
/// assert_eq!(controller.state(), ControllerState::Incrementing);
/// ```
#[derive(Debug, Clone)]
pub struct PowerController<L: ControlLaw = ControlStrategy> {
    law: L,
    state: ControllerState,
    previous_state: ControllerState,
    level: u16,
    previous_level: u16,
    last_reading: Option<Reading>,
    energy: EnergyAccumulator,
}

impl<L: ControlLaw> PowerController<L> {
    /// Create an idle controller, starting the energy ledger at `now_ms`
    pub fn new(law: L, now_ms: u64) -> Self {
        Self {
            law,
            state: ControllerState::Idle,
            previous_state: ControllerState::Idle,
            level: 0,
            previous_level: 0,
            last_reading: None,
            energy: EnergyAccumulator::new(now_ms),
        }
    }

    /// Process one validated reading and return the next level.
    pub fn on_reading(&mut self, reading: Reading, now_ms: u64) -> u16 {
        let outgoing = self.level;
        self.energy
            .record(reading, self.law.level_watts(outgoing), now_ms);

        let decision = self.law.decide(self.state, outgoing, reading, now_ms);
        let level = decision.level.min(self.law.max_level());

        if decision.state != self.state {
            tic_log!(
                debug,
                "controller {:?} -> {:?} at {} VA",
                self.state,
                decision.state,
                reading.va()
            );
        }

        self.previous_level = outgoing;
        self.previous_state = self.state;
        self.level = level;
        self.state = decision.state;
        self.last_reading = Some(reading);
        level
    }

    /// Undo the latest decision after its command failed to reach the actuator.
    ///
    /// Level and state return to the ones still in force at the output, so
    /// the next interval is booked at the level that was actually applied.
    pub fn rollback(&mut self) {
        tic_log!(debug, "controller rollback to level {}", self.previous_level);
        self.level = self.previous_level;
        self.state = self.previous_state;
    }

    /// Current state
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Level applied after the latest decision
    pub const fn level(&self) -> u16 {
        self.level
    }

    /// Level in force before the latest decision
    pub const fn previous_level(&self) -> u16 {
        self.previous_level
    }

    /// Reading that drove the latest decision
    pub const fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Energy ledger
    pub const fn energy(&self) -> &EnergyAccumulator {
        &self.energy
    }

    /// Control law
    pub const fn law(&self) -> &L {
        &self.law
    }

    /// Actuator command for the current level
    pub fn command(&self) -> ActuatorCommand {
        self.law.command(self.level)
    }

    /// Approximate element power at the current level, W
    pub fn level_watts(&self) -> u32 {
        self.law.level_watts(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{DirectLaw, IndexedLaw, DEFAULT_TABLE};

    fn direct() -> PowerController<DirectLaw> {
        PowerController::new(DirectLaw::new(1000, 100, 10).unwrap(), 0)
    }

    fn indexed() -> PowerController<ControlStrategy> {
        let law = IndexedLaw::new(DEFAULT_TABLE, 1, 20, 60_000).unwrap();
        PowerController::new(ControlStrategy::from(law), 0)
    }

    #[test]
    fn test_convergence_constant_zero() {
        let mut controller = direct();
        let mut expected = 0u16;
        for cycle in 1..=30u64 {
            let level = controller.on_reading(Reading::new(0), cycle * 1_000);
            expected = (expected + 100).min(1000);
            assert_eq!(level, expected);
            assert!(level <= 1000);
            assert_eq!(controller.state(), ControllerState::Incrementing);
        }
    }

    #[test]
    fn test_direct_settles_on_import() {
        let mut controller = direct();
        for cycle in 1..=5u64 {
            controller.on_reading(Reading::new(0), cycle * 1_000);
        }
        assert_eq!(controller.level(), 500);

        let level = controller.on_reading(Reading::new(120), 6_000);
        assert_eq!(level, 380);
        assert_eq!(controller.previous_level(), 500);
        assert_eq!(controller.state(), ControllerState::Stabilized);

        let level = controller.on_reading(Reading::new(0), 7_000);
        assert_eq!(level, 390);
        assert_eq!(controller.command(), ActuatorCommand::Watts(390));
    }

    #[test]
    fn test_indexed_cycle() {
        let mut controller = indexed();
        for cycle in 1..=10u64 {
            controller.on_reading(Reading::new(0), cycle * 1_000);
        }
        assert_eq!(controller.level(), 10);
        assert_eq!(
            controller.command(),
            ActuatorCommand::Dimmer { enabled: true, percent: 50 }
        );

        assert_eq!(controller.on_reading(Reading::new(200), 11_000), 9);
        assert_eq!(controller.state(), ControllerState::Wait);
        assert_eq!(controller.on_reading(Reading::new(200), 12_000), 9);
        assert_eq!(controller.state(), ControllerState::Decrementing);
        assert_eq!(controller.on_reading(Reading::new(0), 13_000), 9);
        assert_eq!(controller.state(), ControllerState::Stabilized);

        // Re-probe after the dwell
        assert_eq!(controller.on_reading(Reading::new(0), 73_001), 9);
        assert_eq!(controller.state(), ControllerState::Incrementing);
        assert_eq!(controller.on_reading(Reading::new(0), 74_000), 10);
    }

    #[test]
    fn test_indexed_clamped_to_ceiling() {
        let law = IndexedLaw::new(DEFAULT_TABLE, 5, 12, 60_000).unwrap();
        let mut controller = PowerController::new(law, 0);
        for cycle in 1..=10u64 {
            let level = controller.on_reading(Reading::new(0), cycle * 1_000);
            assert!(level <= 12);
        }
        assert_eq!(controller.level(), 12);
    }

    #[test]
    fn test_adversarial_readings_stay_in_range() {
        let mut controller = direct();
        let readings = [0, 0, 99_999, 0, 1, 0, 0, 65_535, 0, 999];
        for (cycle, va) in readings.into_iter().enumerate() {
            let level = controller.on_reading(Reading::new(va), cycle as u64 * 500);
            assert!(level <= 1000);
        }
    }

    #[test]
    fn test_import_while_incrementing_with_zero_power() {
        let mut controller = indexed();
        // Index 1 draws 0 W per the table
        controller.on_reading(Reading::new(0), 1_000);
        assert_eq!(controller.level(), 1);
        assert_eq!(controller.on_reading(Reading::new(50), 2_000), 0);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_rollback_restores_applied_level() {
        let mut controller = direct();
        controller.on_reading(Reading::new(0), 1_000);
        controller.on_reading(Reading::new(0), 2_000);
        assert_eq!(controller.level(), 200);

        controller.rollback();
        assert_eq!(controller.level(), 100);
        assert_eq!(controller.state(), ControllerState::Incrementing);

        // The interval after the failed update ran at 100 W
        let routed = controller.energy().routed_wh();
        controller.on_reading(Reading::new(0), 3_602_000);
        assert!((controller.energy().routed_wh() - routed - 100.0).abs() < 1e-9);
        assert_eq!(controller.level(), 200);
    }

    #[test]
    fn test_energy_uses_outgoing_level() {
        let mut controller = direct();
        controller.on_reading(Reading::new(0), 0);
        assert_eq!(controller.level(), 100);

        // 100 W held for one hour with no import
        controller.on_reading(Reading::new(0), 3_600_000);
        assert!((controller.energy().routed_wh() - 100.0).abs() < 1e-9);
        assert_eq!(controller.energy().network_wh(), 0.0);

        // 200 W on, 50 VA import for half an hour
        controller.on_reading(Reading::new(50), 5_400_000);
        assert!((controller.energy().network_wh() - 25.0).abs() < 1e-9);
        assert_eq!(controller.last_reading(), Some(Reading::new(50)));
    }
}
