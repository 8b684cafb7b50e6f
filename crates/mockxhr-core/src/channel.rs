//! Backend and interception seams
//!
//! The client routes every send through exactly one of two collaborators:
//! the interception channel (an opaque responder that may supply a mock
//! response) and the network backend. Both are traits so applications and
//! tests can plug in their own implementations; the event sequence and
//! timing contract are identical whichever branch serves the request.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{RequestDescriptor, ResponseDescriptor};

// ----------------------------------------------------------------------------
// Backend Trait
// ----------------------------------------------------------------------------

/// The real network stack behind the client
#[async_trait]
pub trait Backend: Send + Sync {
    /// Perform one request/response round trip
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor>;

    /// Capabilities of this backend (environment detection)
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::default()
    }
}

// ----------------------------------------------------------------------------
// Backend Capabilities
// ----------------------------------------------------------------------------

/// Environment-dependent behaviors a backend may or may not support.
///
/// Callers branch on capability detection instead of asserting one fixed
/// behavior across all environments; tests treat unsupported behaviors as
/// skippable rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Whether the json response kind is supported
    pub supports_json_kind: bool,
    /// Whether overriding the response mime type is supported
    pub supports_mime_override: bool,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self {
            supports_json_kind: true,
            supports_mime_override: true,
        }
    }
}

// ----------------------------------------------------------------------------
// Interceptor Trait
// ----------------------------------------------------------------------------

/// The mock interception channel.
///
/// Consulted once per `send()` with the request descriptor. `Some` routes
/// the request into the mock pipeline; `None` means "let the real network
/// handle this request" and must behave identically to having no
/// interceptor installed at all.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, request: &RequestDescriptor) -> Option<ResponseDescriptor>;
}

/// Interceptor that declines every request (the unpatched wiring)
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughInterceptor;

impl Interceptor for PassthroughInterceptor {
    fn intercept(&self, _request: &RequestDescriptor) -> Option<ResponseDescriptor> {
        None
    }
}
