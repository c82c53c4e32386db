//! # Relay lifecycle state machine.
//!
//! ```text
//!  Created ──run()──► Running ──stop() / source ended / breaker──► Stopping ──loops exited──► Stopped
//! ```
//!
//! ## Rules
//! - Transitions are compare-and-swap; there is no way back to an earlier state.
//! - `run` is accepted exactly once; a second call reports `AlreadyStarted`
//!   while running and `Stopped` afterwards.
//! - `stop` is idempotent once running; before `run` it reports `NotStarted`.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::RelayError;

/// Observable lifecycle phase of a relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RelayState {
    /// Built, loops not started.
    Created = 0,
    /// Reader and dispatcher are running.
    Running = 1,
    /// Stop requested; waiting for the loops to notice.
    Stopping = 2,
    /// Both loops exited.
    Stopped = 3,
}

impl RelayState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => RelayState::Created,
            1 => RelayState::Running,
            2 => RelayState::Stopping,
            _ => RelayState::Stopped,
        }
    }

    /// True once a stop was requested or completed.
    #[inline]
    pub fn is_stopping_or_stopped(self) -> bool {
        matches!(self, RelayState::Stopping | RelayState::Stopped)
    }
}

/// Atomic holder of a [`RelayState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(RelayState::Created as u8))
    }

    pub(crate) fn get(&self) -> RelayState {
        RelayState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn swap_if(&self, from: RelayState, to: RelayState) -> Result<(), RelayState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(RelayState::from_u8)
    }

    /// `Created → Running`.
    pub(crate) fn start(&self) -> Result<(), RelayError> {
        match self.swap_if(RelayState::Created, RelayState::Running) {
            Ok(()) => Ok(()),
            Err(RelayState::Running) => Err(RelayError::AlreadyStarted),
            Err(_) => Err(RelayError::Stopped),
        }
    }

    /// `Running → Stopping`. Returns `true` if this call made the transition.
    pub(crate) fn request_stop(&self) -> Result<bool, RelayError> {
        match self.swap_if(RelayState::Running, RelayState::Stopping) {
            Ok(()) => Ok(true),
            Err(RelayState::Created) => Err(RelayError::NotStarted),
            Err(_) => Ok(false),
        }
    }

    /// Terminal transition once both loops have exited.
    pub(crate) fn finish(&self) {
        self.0.store(RelayState::Stopped as u8, Ordering::Release);
    }
}
