//! Unified Logging Macros for tic-router
//!
//! This module provides a unified logging interface that automatically
//! selects between `log::` (USB logger) and `defmt::` based on the
//! active feature flags.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::tic_log;
//!
//! tic_log!(info, "Router started");
//! tic_log!(debug, "Reading {} VA", va);
//! tic_log!(warn, "Dropping early reading");
//! tic_log!(trace, "Checksum mismatch");
//! ```
//!
//! # Feature Flags
//!
//! - `usb-logger` - Uses `log::` crate (for USB serial debugging)
//! - `defmt` - Uses `defmt::` (default on the firmware, more efficient for embedded)
//! - neither - Messages are type-checked and discarded (host builds, tests)
//!
//! Arguments must implement both `Debug`/`Display` and `defmt::Format` so the
//! same call site compiles for every backend.

/// Unified logging macro - automatically selects log:: or defmt:: based on features
#[macro_export]
#[cfg(feature = "usb-logger")]
macro_rules! tic_log {
    (info, $($arg:tt)*) => { log::info!($($arg)*) };
    (debug, $($arg:tt)*) => { log::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { log::error!($($arg)*) };
    (trace, $($arg:tt)*) => { log::trace!($($arg)*) };
}

#[macro_export]
#[cfg(all(feature = "defmt", not(feature = "usb-logger")))]
macro_rules! tic_log {
    (info, $($arg:tt)*) => { defmt::info!($($arg)*) };
    (debug, $($arg:tt)*) => { defmt::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { defmt::error!($($arg)*) };
    (trace, $($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[macro_export]
#[cfg(not(any(feature = "defmt", feature = "usb-logger")))]
macro_rules! tic_log {
    ($level:ident, $($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
