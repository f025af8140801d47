//! Routed and network energy ledger.
//!
//! Between two decisions the element ran at the previous level. If the meter
//! then shows no import, that power came from the surplus and counts as
//! routed. If the meter shows import while the element was on, the import
//! counts as network energy drawn during routing.

use crate::tic::Reading;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Running totals in Wh. Both only grow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyAccumulator {
    routed_wh: f64,
    network_wh: f64,
    last_ms: u64,
}

impl EnergyAccumulator {
    /// Start accounting at `now_ms`
    pub const fn new(now_ms: u64) -> Self {
        Self {
            routed_wh: 0.0,
            network_wh: 0.0,
            last_ms: now_ms,
        }
    }

    /// Energy sent to the element out of the surplus, Wh
    pub const fn routed_wh(&self) -> f64 {
        self.routed_wh
    }

    /// Energy imported while the element was on, Wh
    pub const fn network_wh(&self) -> f64 {
        self.network_wh
    }

    /// Time of the last recorded decision
    pub const fn last_ms(&self) -> u64 {
        self.last_ms
    }

    /// Account for the interval ending at `now_ms`.
    ///
    /// `previous_watts` is the element power during the interval; `reading`
    /// is the import observed at its end. A clock stepping backwards counts
    /// as an empty interval.
    pub fn record(&mut self, reading: Reading, previous_watts: u32, now_ms: u64) {
        let hours = now_ms.saturating_sub(self.last_ms) as f64 / MS_PER_HOUR;
        if reading.is_zero() {
            self.routed_wh += f64::from(previous_watts) * hours;
        } else if previous_watts != 0 {
            self.network_wh += f64::from(reading.va()) * hours;
        }
        self.last_ms = now_ms;
    }
}
