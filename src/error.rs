//! Error types for router operations following M-ERRORS-CANONICAL-STRUCTS guideline.
//!
//! Frame-level problems (sync loss, bad checksum) never show up here: the
//! decoder recovers from them locally. What remains are configuration
//! mistakes detected at startup and failures of the boundary collaborators
//! (serial link, actuator).

use core::fmt;

#[cfg(feature = "std")]
use std::backtrace::Backtrace;

/// Result type alias for router operations.
pub type Result<T> = core::result::Result<T, RouterError>;

// =============================================================================
// Error Kind Enums (Internal)
// =============================================================================

/// Configuration error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ConfigErrorKind {
    InvalidStep,
    InvalidCeiling,
    EmptyTable,
    NonMonotonicTable,
    PercentOutOfRange,
    UnknownKey,
    UnknownValue,
    InvalidNumber,
}

/// Serial link error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum LinkErrorKind {
    ReadFailed,
}

/// Actuator error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ActuatorErrorKind {
    WriteFailed,
}

// =============================================================================
// Main Error Type
// =============================================================================

/// Router error types.
///
/// Returned by configuration parsing, calibration table construction and the
/// run loop. Contains a backtrace when the `std` feature is enabled.
#[derive(Debug)]
pub enum RouterError {
    /// Invalid or inconsistent configuration
    Config(ConfigError),
    /// Serial link failures (byte source)
    Link(LinkError),
    /// Actuator output failures
    Actuator(ActuatorError),
}

// =============================================================================
// Structured Error Types
// =============================================================================

/// Configuration error with optional backtrace
#[derive(Debug)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl ConfigError {
    pub(crate) fn new(kind: ConfigErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if a step size was rejected
    pub fn is_invalid_step(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidStep)
    }

    /// Check if the ceiling was rejected
    pub fn is_invalid_ceiling(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidCeiling)
    }

    /// Check if the calibration table was rejected (empty, unordered, bad percent)
    pub fn is_invalid_table(&self) -> bool {
        matches!(
            self.kind,
            ConfigErrorKind::EmptyTable
                | ConfigErrorKind::NonMonotonicTable
                | ConfigErrorKind::PercentOutOfRange
        )
    }

    /// Check if the configuration text could not be understood
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind,
            ConfigErrorKind::UnknownKey
                | ConfigErrorKind::UnknownValue
                | ConfigErrorKind::InvalidNumber
        )
    }
}

/// Serial link error with optional backtrace
#[derive(Debug)]
pub struct LinkError {
    kind: LinkErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl LinkError {
    pub(crate) fn new(kind: LinkErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if a read from the link failed
    pub fn is_read_failed(&self) -> bool {
        matches!(self.kind, LinkErrorKind::ReadFailed)
    }
}

/// Actuator error with optional backtrace
#[derive(Debug)]
pub struct ActuatorError {
    kind: ActuatorErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl ActuatorError {
    pub(crate) fn new(kind: ActuatorErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the output write failed
    pub fn is_write_failed(&self) -> bool {
        matches!(self.kind, ActuatorErrorKind::WriteFailed)
    }
}

// =============================================================================
// Convenience Constructors for RouterError
// =============================================================================

impl RouterError {
    // Configuration errors
    pub(crate) fn invalid_step() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::InvalidStep))
    }

    pub(crate) fn invalid_ceiling() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::InvalidCeiling))
    }

    pub(crate) fn empty_table() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::EmptyTable))
    }

    pub(crate) fn non_monotonic_table() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::NonMonotonicTable))
    }

    pub(crate) fn percent_out_of_range() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::PercentOutOfRange))
    }

    pub(crate) fn unknown_key() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::UnknownKey))
    }

    pub(crate) fn unknown_value() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::UnknownValue))
    }

    pub(crate) fn invalid_number() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::InvalidNumber))
    }

    // Link errors
    /// Serial read failure (framing, overrun, break)
    pub fn link_read_failed() -> Self {
        Self::Link(LinkError::new(LinkErrorKind::ReadFailed))
    }

    // Actuator errors
    /// Actuator rejected or failed to apply a command
    pub fn actuator_write_failed() -> Self {
        Self::Actuator(ActuatorError::new(ActuatorErrorKind::WriteFailed))
    }

    /// Returns the configuration error, if any
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            RouterError::Config(e) => Some(e),
            _ => None,
        }
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Config(e) => write!(f, "Configuration error: {:?}", e.kind),
            RouterError::Link(e) => write!(f, "Link error: {:?}", e.kind),
            RouterError::Actuator(e) => write!(f, "Actuator error: {:?}", e.kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RouterError {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            RouterError::Config(e) => defmt::write!(f, "Configuration error: {}", e.kind),
            RouterError::Link(e) => defmt::write!(f, "Link error: {}", e.kind),
            RouterError::Actuator(e) => defmt::write!(f, "Actuator error: {}", e.kind),
        }
    }
}

// Implement std::error::Error for std-based applications
#[cfg(feature = "std")]
impl std::error::Error for RouterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_predicates() {
        let err = RouterError::non_monotonic_table();
        let config = err.as_config().unwrap();
        assert!(config.is_invalid_table());
        assert!(!config.is_invalid_step());
        assert!(!config.is_parse_error());

        assert!(RouterError::invalid_number().as_config().unwrap().is_parse_error());
        assert!(RouterError::invalid_step().as_config().unwrap().is_invalid_step());
    }

    #[test]
    fn test_boundary_errors() {
        match RouterError::link_read_failed() {
            RouterError::Link(e) => assert!(e.is_read_failed()),
            other => panic!("unexpected {other:?}"),
        }
        match RouterError::actuator_write_failed() {
            RouterError::Actuator(e) => assert!(e.is_write_failed()),
            other => panic!("unexpected {other:?}"),
        }
        assert!(RouterError::link_read_failed().as_config().is_none());
    }

    #[test]
    fn test_display() {
        let text = format!("{}", RouterError::invalid_ceiling());
        assert_eq!(text, "Configuration error: InvalidCeiling");
    }
}
