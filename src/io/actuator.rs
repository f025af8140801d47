//! Output stage abstraction.

use crate::control::ActuatorCommand;
use crate::error::Result;

/// Phase-control stage powering the heating element.
///
/// The router calls [`apply`](Self::apply) at most once per validated
/// reading. Between calls the stage must hold the last command.
pub trait Actuator {
    /// Apply a new command.
    ///
    /// # Errors
    ///
    /// Returns an actuator error if the output could not be updated.
    fn apply(&mut self, command: ActuatorCommand) -> Result<()>;
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn apply(&mut self, command: ActuatorCommand) -> Result<()> {
        (**self).apply(command)
    }
}
