//! Mock-intercepting XHR-style client shim
//!
//! This crate provides the core patch/emulation layer: a client object that
//! reproduces a legacy network client's full property surface, lifecycle
//! state machine, event firing order, header formatting, body elision
//! policy, and response coercion semantics, while silently routing matched
//! requests into a mock interception channel. Consumers cannot tell from
//! any observable property whether a request was served by the real network
//! stack or by the mock pipeline.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod body;
pub mod channel;
pub mod client;
pub mod coerce;
pub mod config;
pub mod errors;
pub mod events;
pub mod headers;
pub mod registry;
pub mod state;
pub mod surface;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use channel::{Backend, BackendCapabilities, Interceptor, PassthroughInterceptor};
pub use client::XhrClient;
pub use coerce::{Blob, MarkupDocument, ResponseBody, ResponseKind};
pub use config::ClientConfig;
pub use errors::{Result, StateError, TransportError, XhrError};
pub use events::{EventCallback, EventType, XhrEvent};
pub use headers::{HeaderMap, CRLF};
pub use registry::{ClientFactory, NativeFactory, PatchRegistry, PatchedFactory};
pub use state::ReadyState;
pub use surface::{ClientSurface, SURFACE_MEMBERS};
pub use types::{CredentialsMode, Method, RequestDescriptor, ResponseDescriptor};
