#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

//! ## Crate layout
//!
//! - [`tic`] - TIC frame decoder, checksum and value extraction
//! - [`control`] - power controller, control laws, calibration and energy
//! - [`router`] - decoder and controller wired to the I/O boundary
//! - [`io`] - byte source, actuator and clock traits with their adapters
//! - [`configuration`] / [`utility`] - installation settings

// Macro modules (must be declared before use)
#[macro_use]
mod logging;
#[macro_use]
pub mod macros;

pub mod configuration;
pub mod control;
pub mod error;
pub mod io;
pub mod router;
pub mod tic;
pub mod utility;

// Re-export commonly used types
#[doc(inline)]
pub use configuration::{Generation, RouterConfig};
#[doc(inline)]
pub use control::{ActuatorCommand, CalibrationTable, ControllerState, PowerController};
#[doc(inline)]
pub use error::{Result, RouterError};
#[doc(inline)]
pub use router::{Router, RouterSnapshot};
#[doc(inline)]
pub use tic::{Reading, TicDecoder, TicMode};
