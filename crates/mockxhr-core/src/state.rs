//! Request lifecycle state machine
//!
//! Provides the linear ready-state lifecycle for one request/response cycle
//! and validates transitions. The state is monotonically non-decreasing
//! within a cycle; the single permitted reset is `open()` taking a finished
//! (or untouched) instance back to `Opened` for reuse.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::errors::StateError;

// ----------------------------------------------------------------------------
// Ready State
// ----------------------------------------------------------------------------

/// Current phase of a request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ReadyState {
    /// Instance constructed, `open()` not yet called
    Unsent = 0,
    /// `open()` succeeded, `send()` not yet called
    Opened = 1,
    /// Response status and headers are known (real or mocked)
    HeadersReceived = 2,
    /// Response body bytes are being assembled
    Loading = 3,
    /// Terminal for this cycle (success, failure, or abort)
    Done = 4,
}

impl ReadyState {
    /// Numeric value matching the native client's state constants
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// State name for logging
    pub fn state_name(self) -> &'static str {
        match self {
            ReadyState::Unsent => "UNSENT",
            ReadyState::Opened => "OPENED",
            ReadyState::HeadersReceived => "HEADERS_RECEIVED",
            ReadyState::Loading => "LOADING",
            ReadyState::Done => "DONE",
        }
    }

    /// Whether this cycle has reached its terminal state
    pub fn is_terminal(self) -> bool {
        self == ReadyState::Done
    }

    /// Validate and perform a transition, consuming the current state.
    ///
    /// Forward transitions may skip intermediate states (abort jumps straight
    /// to `Done`); moving backwards is invalid except for the `open()` reset,
    /// which is always a transition to `Opened`.
    pub fn transition(self, next: ReadyState) -> Result<ReadyState, StateError> {
        // open() reuse: any state may return to Opened
        if next == ReadyState::Opened {
            return Ok(next);
        }
        if next > self {
            Ok(next)
        } else {
            Err(StateError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state_name())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
