//! High-level router
//!
//! Ties the TIC decoder, the power controller and the clock together and
//! drives the actuator. This is the single owner of all mutable state: one
//! byte in, at most one actuator command out.
//!
//! ## Example
//!
//! ```rust
//! use tic_router::configuration::RouterConfig;
//! use tic_router::control::{ActuatorCommand, DEFAULT_TABLE};
//! use tic_router::io::Clock;
//! use tic_router::router::Router;
//!
//! struct Uptime;
//! impl Clock for Uptime {
//!     fn now_ms(&self) -> u64 { 0 }
//! }
//!
//! let mut router = Router::new(&RouterConfig::default(), DEFAULT_TABLE, Uptime).unwrap();
//! let mut command = None;
//! for &byte in b"\nSINSTS\t00000\tF\r" {
//!     if let Some(c) = router.feed(byte) {
//!         command = Some(c);
//!     }
//! }
//! // First step lands on 5 %, still below the element's conduction threshold
//! assert_eq!(command, Some(ActuatorCommand::Dimmer { enabled: false, percent: 5 }));
//! ```

use crate::configuration::RouterConfig;
use crate::control::{ActuatorCommand, CalibrationTable, ControlStrategy, ControllerState, PowerController};
use crate::error::Result;
use crate::io::{Actuator, ByteSource, Clock};
use crate::tic::{DecoderStats, Reading, TicDecoder};

/// Bytes pulled from the link per read
const READ_CHUNK: usize = 32;

/// Observable state of the router
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouterSnapshot {
    /// Controller state
    pub state: ControllerState,
    /// Level before the latest decision
    pub previous_level: u16,
    /// Level after the latest decision
    pub level: u16,
    /// Reading behind the latest decision
    pub last_reading: Option<Reading>,
    /// Energy routed to the element, Wh
    pub routed_wh: f64,
    /// Energy imported while routing, Wh
    pub network_wh: f64,
    /// Decoder diagnostics
    pub decoder: DecoderStats,
}

/// Decoder + controller + clock, one instance per meter.
#[derive(Debug)]
pub struct Router<C: Clock> {
    decoder: TicDecoder,
    controller: PowerController<ControlStrategy>,
    clock: C,
    pacing_ms: u64,
    last_decision_ms: Option<u64>,
}

impl<C: Clock> Router<C> {
    /// Build a router from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the control law parameters are
    /// invalid.
    pub fn new(config: &RouterConfig, table: CalibrationTable, clock: C) -> Result<Self> {
        let strategy = config.strategy(table)?;
        let now = clock.now_ms();
        tic_log!(
            info,
            "router: {} baud, ceiling {}, pacing {} ms",
            config.baud_rate(),
            config.ceiling,
            config.pacing_ms
        );
        Ok(Self {
            decoder: TicDecoder::new(config.format()),
            controller: PowerController::new(strategy, now),
            clock,
            pacing_ms: config.pacing_ms,
            last_decision_ms: None,
        })
    }

    /// Feed one byte from the meter.
    ///
    /// Returns the command to apply when the byte completed a valid reading
    /// and the pacing interval allowed a decision.
    pub fn feed(&mut self, byte: u8) -> Option<ActuatorCommand> {
        let reading = self.decoder.feed_reading(byte)?;
        self.on_reading(reading)
    }

    /// Run one control decision for an already decoded reading.
    ///
    /// Readings arriving within the pacing interval of the previous decision
    /// are dropped.
    pub fn on_reading(&mut self, reading: Reading) -> Option<ActuatorCommand> {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_decision_ms {
            if now.saturating_sub(last) < self.pacing_ms {
                tic_log!(trace, "reading {} VA dropped by pacing", reading.va());
                return None;
            }
        }
        self.last_decision_ms = Some(now);
        let level = self.controller.on_reading(reading, now);
        tic_log!(
            debug,
            "{} VA -> level {} (routed {} Wh)",
            reading.va(),
            level,
            self.controller.energy().routed_wh()
        );
        Some(self.controller.command())
    }

    /// Pull bytes from `source` and drive `actuator` until the stream ends.
    ///
    /// A command the actuator rejects is rolled back in the controller, so
    /// the router keeps tracking the output actually in force. Calling `run`
    /// again resumes where it stopped.
    ///
    /// # Errors
    ///
    /// Returns the first link or actuator error.
    pub async fn run<S, A>(&mut self, mut source: S, mut actuator: A) -> Result<()>
    where
        S: ByteSource,
        A: Actuator,
    {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                tic_log!(info, "meter link closed");
                return Ok(());
            }
            for &byte in &buf[..n] {
                if let Some(command) = self.feed(byte) {
                    if let Err(e) = actuator.apply(command) {
                        self.controller.rollback();
                        return Err(e);
                    }
                }
            }
        }
    }

    /// Drop any partial group, e.g. after a link error
    pub fn resync(&mut self) {
        self.decoder.reset();
    }

    /// Current observable state
    pub fn snapshot(&self) -> RouterSnapshot {
        let energy = self.controller.energy();
        RouterSnapshot {
            state: self.controller.state(),
            previous_level: self.controller.previous_level(),
            level: self.controller.level(),
            last_reading: self.controller.last_reading(),
            routed_wh: energy.routed_wh(),
            network_wh: energy.network_wh(),
            decoder: self.decoder.stats(),
        }
    }

    /// Frame decoder
    pub fn decoder(&self) -> &TicDecoder {
        &self.decoder
    }

    /// Power controller
    pub fn controller(&self) -> &PowerController<ControlStrategy> {
        &self.controller
    }

    /// Command for the current level, e.g. to restore the output after a reset
    pub fn command(&self) -> ActuatorCommand {
        self.controller.command()
    }
}
