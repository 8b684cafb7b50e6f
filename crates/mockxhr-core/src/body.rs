//! Request-body elision policy
//!
//! Decides whether a request body is transmitted based on the normalized
//! method. Applied before the request leaves the state machine, so neither
//! the real network path nor the mock interception channel ever observes a
//! discarded body.

use crate::types::Method;

/// Return the body to transmit for the given method.
///
/// GET and HEAD discard the body even if one is supplied; every other
/// method (OPTIONS included) transmits it unmodified.
pub fn transmitted_body(method: &Method, body: Option<Vec<u8>>) -> Option<Vec<u8>> {
    if method.is_bodyless() {
        None
    } else {
        body
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
