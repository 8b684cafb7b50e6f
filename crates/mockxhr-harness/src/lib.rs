//! Test harness for the client shim
//!
//! Provides the in-memory network backend and scripted mock responder that
//! integration tests (and applications wanting a fully offline wiring)
//! plug into the core's [`Backend`](mockxhr_core::Backend) and
//! [`Interceptor`](mockxhr_core::Interceptor) seams.

pub mod backend;
pub mod responder;

pub use backend::MemoryBackend;
pub use responder::ScriptedResponder;

/// Initialize test logging from `RUST_LOG`. Safe to call from every test;
/// only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
