//! Embassy adapters for the RP2350 firmware.
//!
//! - [`UartByteSource`] reads the meter through an async UART receiver
//! - [`PwmDimmer`] drives the dimmer's control input with a PWM slice and an
//!   enable pin
//! - [`EmbassyClock`] reads `embassy_time::Instant`
//!
//! ## Example
//!
//! ```rust,ignore
//! use tic_router::io::embassy_adapter::{EmbassyClock, PwmDimmer, UartByteSource};
//!
//! let source = UartByteSource::new(uart_rx);
//! let dimmer = PwmDimmer::new(pwm, enable_pin, 2000);
//! router.run(source, dimmer).await?;
//! ```

use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{Async, UartRx};
use embassy_time::Instant;

use crate::control::ActuatorCommand;
use crate::error::{Result, RouterError};
use crate::io::{Actuator, ByteSource, Clock};

/// PWM counter period; 125 MHz / 25 000 = 5 kHz carrier
const PWM_TOP: u16 = 24_999;

/// Wall clock backed by the Embassy time driver
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Meter link over an RP2350 UART receiver.
///
/// The UART must be configured by the caller at [`TicMode::baud_rate`], 7 data bits,
/// even parity, one stop bit.
///
/// [`TicMode::baud_rate`]: crate::tic::TicMode::baud_rate
pub struct UartByteSource<'d> {
    rx: UartRx<'d, Async>,
}

impl<'d> UartByteSource<'d> {
    /// Wrap a configured UART receiver
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self { rx }
    }
}

impl core::fmt::Debug for UartByteSource<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UartByteSource").finish_non_exhaustive()
    }
}

impl ByteSource for UartByteSource<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(first) = buf.first_mut() else {
            return Ok(0);
        };
        // One byte per transfer: the decoder consumes bytes individually
        // and a partial DMA transfer would be lost on a line error.
        let mut byte = [0u8; 1];
        self.rx.read(&mut byte).await.map_err(|e| {
            tic_log!(warn, "UART read error: {:?}", e);
            RouterError::link_read_failed()
        })?;
        *first = byte[0];
        Ok(1)
    }
}

/// Dimmer driven by a PWM duty cycle plus an enable output.
///
/// `Dimmer` commands set the duty to the percentage; `Watts` commands are
/// scaled against `full_scale_w`.
pub struct PwmDimmer<'d> {
    pwm: Pwm<'d>,
    enable: Output<'d>,
    config: PwmConfig,
    full_scale_w: u16,
}

impl<'d> PwmDimmer<'d> {
    /// Wrap a PWM channel A output and an enable pin, output off
    pub fn new(mut pwm: Pwm<'d>, mut enable: Output<'d>, full_scale_w: u16) -> Self {
        let mut config = PwmConfig::default();
        config.top = PWM_TOP;
        config.compare_a = 0;
        pwm.set_config(&config);
        enable.set_low();
        Self {
            pwm,
            enable,
            config,
            full_scale_w: full_scale_w.max(1),
        }
    }

    fn set_duty_permille(&mut self, permille: u32) {
        let permille = permille.min(1000);
        self.config.compare_a = ((u32::from(PWM_TOP) + 1) * permille / 1000) as u16;
        self.pwm.set_config(&self.config);
    }
}

impl core::fmt::Debug for PwmDimmer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PwmDimmer")
            .field("compare_a", &self.config.compare_a)
            .field("full_scale_w", &self.full_scale_w)
            .finish_non_exhaustive()
    }
}

impl Actuator for PwmDimmer<'_> {
    fn apply(&mut self, command: ActuatorCommand) -> Result<()> {
        let (enabled, permille) = match command {
            ActuatorCommand::Watts(watts) => (
                watts != 0,
                u32::from(watts) * 1000 / u32::from(self.full_scale_w),
            ),
            ActuatorCommand::Dimmer { enabled, percent } => (enabled, u32::from(percent) * 10),
        };
        if enabled {
            self.set_duty_permille(permille);
            self.enable.set_high();
        } else {
            self.enable.set_low();
            self.set_duty_permille(0);
        }
        Ok(())
    }
}
