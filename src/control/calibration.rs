//! Calibration of the phase-control dimmer.
//!
//! A phase-angle dimmer does not deliver power proportional to its command:
//! the first few percent do nothing at all and the response follows an
//! S-curve. The calibration table maps a control index to the percentage sent
//! to the dimmer and the power the element actually draws at that setting.
//!
//! Invariant: watts never decrease with the index. The controller relies on it
//! when it compares `watts(index)` with the meter reading.

use crate::control::ActuatorCommand;
use crate::error::{Result, RouterError};

/// One measured point of the dimmer response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CalibrationPoint {
    /// Dimmer command, 0-100 %
    pub percent: u8,
    /// Approximate power drawn by the element, W
    pub watts: u16,
}

impl CalibrationPoint {
    /// Create a calibration point
    pub const fn new(percent: u8, watts: u16) -> Self {
        Self { percent, watts }
    }
}

/// Checks the table invariants in a const context.
///
/// Used by [`calibration_table!`](crate::calibration_table) to reject bad
/// tables at compile time.
pub const fn is_valid(points: &[CalibrationPoint]) -> bool {
    if points.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < points.len() {
        if points[i].percent > 100 {
            return false;
        }
        if i > 0 && points[i].watts < points[i - 1].watts {
            return false;
        }
        i += 1;
    }
    true
}

/// Monotonic lookup from control index to dimmer percentage and watts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationTable {
    points: &'static [CalibrationPoint],
}

impl CalibrationTable {
    /// Build a table from measured points.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the table is empty, a percentage
    /// exceeds 100 or the watts decrease anywhere.
    pub fn new(points: &'static [CalibrationPoint]) -> Result<Self> {
        if points.is_empty() {
            return Err(RouterError::empty_table());
        }
        if points.iter().any(|point| point.percent > 100) {
            return Err(RouterError::percent_out_of_range());
        }
        if points.windows(2).any(|pair| pair[1].watts < pair[0].watts) {
            return Err(RouterError::non_monotonic_table());
        }
        Ok(Self { points })
    }

    /// Wrap points already checked with [`is_valid`]
    #[doc(hidden)]
    pub const fn from_checked(points: &'static [CalibrationPoint]) -> Self {
        debug_assert!(is_valid(points), "calibration table not checked");
        Self { points }
    }

    /// Number of entries
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction rejects empty tables
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Highest valid index
    pub const fn last_index(&self) -> u16 {
        self.points.len().saturating_sub(1) as u16
    }

    /// Entries of the table
    pub const fn points(&self) -> &'static [CalibrationPoint] {
        self.points
    }

    fn point(&self, index: u16) -> CalibrationPoint {
        let index = usize::from(index).min(self.points.len().saturating_sub(1));
        self.points
            .get(index)
            .copied()
            .unwrap_or(CalibrationPoint::new(0, 0))
    }

    /// Approximate watts at `index` (clamped to the table)
    pub fn watts(&self, index: u16) -> u32 {
        u32::from(self.point(index).watts)
    }

    /// Dimmer percentage at `index` (clamped to the table)
    pub fn percent(&self, index: u16) -> u8 {
        self.point(index).percent
    }

    /// Dimmer command for `index`; the output is off where the table says 0 W.
    pub fn command(&self, index: u16) -> ActuatorCommand {
        let point = self.point(index);
        ActuatorCommand::Dimmer {
            enabled: point.watts != 0,
            percent: point.percent,
        }
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        DEFAULT_TABLE
    }
}

/// Response of a 2 kW element on a phase-angle dimmer, 5 % steps.
///
/// Below roughly 5 % the triac does not latch and the element stays cold.
pub const DEFAULT_TABLE: CalibrationTable = crate::calibration_table![
    (0, 0),
    (5, 0),
    (10, 13),
    (15, 42),
    (20, 97),
    (25, 182),
    (30, 297),
    (35, 442),
    (40, 613),
    (45, 802),
    (50, 1000),
    (55, 1198),
    (60, 1387),
    (65, 1558),
    (70, 1703),
    (75, 1818),
    (80, 1903),
    (85, 1958),
    (90, 1987),
    (95, 1998),
    (100, 2000),
];
