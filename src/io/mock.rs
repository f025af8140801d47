//! Mock collaborators for host testing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tic_router::io::mock::{ManualClock, MockByteSource, RecordingActuator};
//!
//! let mut source = MockByteSource::new();
//! source.add_chunk(b"\nSINSTS\t00000\t=\r".to_vec());
//!
//! let clock = ManualClock::auto_advance(1_000);
//! let mut actuator = RecordingActuator::new();
//! // run the router, then inspect actuator.commands()
//! ```

use core::cell::Cell;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::control::ActuatorCommand;
use crate::error::{Result, RouterError};
use crate::io::{Actuator, ByteSource, Clock};

/// Byte source replaying pre-programmed chunks.
///
/// Each `read()` returns at most one chunk. When the chunks run out the
/// stream ends (`Ok(0)`), unless a failure was programmed.
#[derive(Debug, Default)]
pub struct MockByteSource {
    chunks: VecDeque<Vec<u8>>,
    fail_at_end: bool,
}

impl MockByteSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk to be returned by a later `read()`
    pub fn add_chunk(&mut self, data: Vec<u8>) {
        self.chunks.push_back(data);
    }

    /// Report a link failure instead of end of stream
    pub fn fail_at_end(&mut self) {
        self.fail_at_end = true;
    }

    /// Number of chunks not yet read
    pub fn pending_chunks(&self) -> usize {
        self.chunks.len()
    }
}

impl ByteSource for MockByteSource {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.chunks.pop_front() {
            Some(mut chunk) => {
                let len = chunk.len().min(buf.len());
                buf[..len].copy_from_slice(&chunk[..len]);
                if len < chunk.len() {
                    self.chunks.push_front(chunk.split_off(len));
                }
                Ok(len)
            }
            None if self.fail_at_end => Err(RouterError::link_read_failed()),
            None => Ok(0),
        }
    }
}

/// Actuator recording every command it receives.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    commands: Vec<ActuatorCommand>,
    failing: bool,
}

impl RecordingActuator {
    /// Create an actuator with an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands applied so far
    pub fn commands(&self) -> &[ActuatorCommand] {
        &self.commands
    }

    /// Last command applied
    pub fn last(&self) -> Option<ActuatorCommand> {
        self.commands.last().copied()
    }

    /// Make every subsequent `apply()` fail
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Actuator for RecordingActuator {
    fn apply(&mut self, command: ActuatorCommand) -> Result<()> {
        if self.failing {
            return Err(RouterError::actuator_write_failed());
        }
        self.commands.push(command);
        Ok(())
    }
}

/// Clock under test control.
///
/// With auto-advance, every `now_ms()` call returns the current time and
/// then moves it forward by the step.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    step: u64,
}

impl ManualClock {
    /// Clock frozen at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
            step: 0,
        }
    }

    /// Clock starting at 0 that advances by `step_ms` on every read
    pub fn auto_advance(step_ms: u64) -> Self {
        Self {
            now: Cell::new(0),
            step: step_ms,
        }
    }

    /// Jump to `now_ms`
    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    /// Move forward by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step));
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_source_replays_chunks() {
        let mut source = MockByteSource::new();
        source.add_chunk(vec![1, 2, 3]);
        source.add_chunk(vec![4]);

        let mut buf = [0u8; 2];
        assert_eq!(block_on(source.read(&mut buf)).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(block_on(source.read(&mut buf)).unwrap(), 1);
        assert_eq!(buf[0], 3);
        assert_eq!(block_on(source.read(&mut buf)).unwrap(), 1);
        assert_eq!(buf[0], 4);
        assert_eq!(block_on(source.read(&mut buf)).unwrap(), 0);
        assert_eq!(source.pending_chunks(), 0);
    }

    #[test]
    fn test_source_failure() {
        let mut source = MockByteSource::new();
        source.fail_at_end();
        let mut buf = [0u8; 4];
        assert!(block_on(source.read(&mut buf)).is_err());
    }

    #[test]
    fn test_recording_actuator() {
        let mut actuator = RecordingActuator::new();
        actuator.apply(ActuatorCommand::Watts(10)).unwrap();
        assert_eq!(actuator.last(), Some(ActuatorCommand::Watts(10)));

        actuator.set_failing(true);
        assert!(actuator.apply(ActuatorCommand::Watts(20)).is_err());
        assert_eq!(actuator.commands().len(), 1);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(5);
        assert_eq!(clock.now_ms(), 5);
        clock.advance(10);
        assert_eq!(clock.now_ms(), 15);
        clock.set(100);
        assert_eq!(clock.now_ms(), 100);

        let stepping = ManualClock::auto_advance(1_000);
        assert_eq!(stepping.now_ms(), 0);
        assert_eq!(stepping.now_ms(), 1_000);
    }
}
