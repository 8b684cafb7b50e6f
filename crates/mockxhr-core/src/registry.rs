//! Patch installation registry
//!
//! The native constructor is not mutated in place; instead a caller obtains
//! an explicit registry at process start. The registry carries the two
//! read-only facts the patch exposes: the marker that the active factory is
//! patched, and a reference to the original, unpatched factory.
//! Installation happens at most once per process and is idempotent: a
//! second install never double-wraps.

use std::sync::{Arc, OnceLock};

use crate::channel::{Backend, Interceptor};
use crate::client::XhrClient;
use crate::config::ClientConfig;

// ----------------------------------------------------------------------------
// Client Factory
// ----------------------------------------------------------------------------

/// Produces client instances
pub trait ClientFactory: Send + Sync {
    fn create(&self) -> XhrClient;
}

/// The original, unpatched factory: instances wired straight to the backend
pub struct NativeFactory {
    backend: Arc<dyn Backend>,
    config: ClientConfig,
}

impl NativeFactory {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            config: ClientConfig::default(),
        }
    }

    pub fn with_config(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ClientFactory for NativeFactory {
    fn create(&self) -> XhrClient {
        XhrClient::native(Arc::clone(&self.backend), self.config.clone())
    }
}

/// The patched factory: same backend and configuration as the native
/// factory, with sends routed through the interception channel
pub struct PatchedFactory {
    native: Arc<NativeFactory>,
    interceptor: Arc<dyn Interceptor>,
}

impl PatchedFactory {
    pub fn new(native: Arc<NativeFactory>, interceptor: Arc<dyn Interceptor>) -> Self {
        Self {
            native,
            interceptor,
        }
    }
}

impl ClientFactory for PatchedFactory {
    fn create(&self) -> XhrClient {
        XhrClient::new(
            Arc::clone(self.native.backend()),
            Arc::clone(&self.interceptor),
            self.native.config().clone(),
        )
    }
}

// ----------------------------------------------------------------------------
// Patch Registry
// ----------------------------------------------------------------------------

/// The installed patch: marker flag plus native back-reference.
///
/// Read-only after construction; the process-wide installation (see
/// [`install`]) is the only shared state in the shim and is never mutated
/// per request.
pub struct PatchRegistry {
    native: Arc<NativeFactory>,
    patched: PatchedFactory,
}

impl PatchRegistry {
    pub fn new(native: Arc<NativeFactory>, interceptor: Arc<dyn Interceptor>) -> Self {
        let patched = PatchedFactory::new(Arc::clone(&native), interceptor);
        Self { native, patched }
    }

    /// Marker attribute: the active factory is patched
    pub fn is_patched(&self) -> bool {
        true
    }

    /// The original, unpatched factory
    pub fn native(&self) -> &Arc<NativeFactory> {
        &self.native
    }

    /// Construct a patched instance
    pub fn create(&self) -> XhrClient {
        self.patched.create()
    }
}

// ----------------------------------------------------------------------------
// Process-wide Installation
// ----------------------------------------------------------------------------

static INSTALLED: OnceLock<PatchRegistry> = OnceLock::new();

/// Install the registry process-wide. Idempotent: if a registry is already
/// installed, it is returned unchanged and `registry` is dropped.
pub fn install(registry: PatchRegistry) -> &'static PatchRegistry {
    INSTALLED.get_or_init(|| registry)
}

/// The installed registry, if any. No runtime check is made elsewhere for
/// use-before-install; installation is assumed to precede construction of
/// any patched instance.
pub fn installed() -> Option<&'static PatchRegistry> {
    INSTALLED.get()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
