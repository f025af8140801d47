//! Boundary collaborators of the router.
//!
//! The core never touches hardware. It reads the meter through a
//! [`ByteSource`], drives the dimmer through an [`Actuator`] and measures
//! elapsed time with a [`Clock`]. Host builds use the mocks in [`mock`];
//! the firmware uses the Embassy adapters.

pub mod actuator;
pub mod clock;
pub mod link;

#[cfg(any(test, feature = "std"))]
pub mod mock;

#[cfg(feature = "embassy-rp")]
pub mod embassy_adapter;

#[doc(inline)]
pub use actuator::Actuator;
#[doc(inline)]
pub use clock::Clock;
#[doc(inline)]
pub use link::ByteSource;
