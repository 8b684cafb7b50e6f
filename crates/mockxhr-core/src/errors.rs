//! Error types for the mock-intercepting client shim
//!
//! This module contains all error types used throughout the core, including
//! lifecycle state errors, transport errors, and the main XhrError type that
//! unifies them all. Coercion failure is deliberately absent: interpreting a
//! response body as the requested kind never raises an error, it produces
//! `ResponseBody::Null` instead.

use crate::state::ReadyState;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Lifecycle state precondition errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: ReadyState, to: ReadyState },
    #[error("send() requires state OPENED, current state is {state}")]
    SendNotOpened { state: ReadyState },
    #[error("setRequestHeader() requires state OPENED, current state is {state}")]
    HeaderNotOpened { state: ReadyState },
    #[error("Operation not permitted after completion (state is {state})")]
    AlreadyCompleted { state: ReadyState },
}

/// Specific transport error types
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed for {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },
    #[error("Malformed request: {reason}")]
    InvalidRequest { reason: String },
    #[error("Receive failed: {reason}")]
    ReceiveFailed { reason: String },
    #[error("Transport timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
    #[error("Transport shutdown: {reason}")]
    Shutdown { reason: String },
}

// ----------------------------------------------------------------------------
// Core Error Type
// ----------------------------------------------------------------------------

/// Core error types for the client shim
#[derive(Debug, thiserror::Error)]
pub enum XhrError {
    /// State precondition violated; surfaced synchronously to the caller.
    #[error("Invalid state: {0}")]
    InvalidState(#[from] StateError),

    /// Transport failure. Never raised from `send()`; delivered to the
    /// caller through the `error`/`timeout` events instead.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl XhrError {
    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        XhrError::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a send-precondition error for the given state
    pub fn send_not_opened(state: ReadyState) -> Self {
        XhrError::InvalidState(StateError::SendNotOpened { state })
    }

    /// Create a transport connection failed error
    pub fn connection_failed<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        XhrError::Transport(TransportError::ConnectionFailed {
            url: url.into(),
            reason: reason.into(),
        })
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, XhrError>;
