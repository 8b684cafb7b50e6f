//! In-memory network backend
//!
//! Plays the role of the real network stack in tests: requests are recorded
//! for inspection (the received-body and credentials assertions depend on
//! this) and answered from a static route table, optionally after a
//! simulated latency.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use mockxhr_core::{
    Backend, BackendCapabilities, Method, RequestDescriptor, ResponseDescriptor, Result,
    TransportError,
};

// ----------------------------------------------------------------------------
// Memory Backend
// ----------------------------------------------------------------------------

/// What the backend does when a route matches
enum RouteBehavior {
    Respond(ResponseDescriptor),
    Fail(String),
}

/// Recording in-memory backend
pub struct MemoryBackend {
    routes: Mutex<HashMap<(String, String), RouteBehavior>>,
    requests: Mutex<Vec<RequestDescriptor>>,
    latency: Option<Duration>,
    capabilities: BackendCapabilities,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            latency: None,
            capabilities: BackendCapabilities::default(),
        }
    }

    /// Backend that sleeps before answering, for abort/timeout tests
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    /// Override the reported capabilities (environment simulation)
    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Answer `method url` with the given response
    pub fn route(&self, method: &str, url: &str, response: ResponseDescriptor) {
        self.routes.lock().unwrap().insert(
            (Method::new(method).as_str().to_owned(), url.to_owned()),
            RouteBehavior::Respond(response),
        );
    }

    /// Fail `method url` with a connection error
    pub fn fail(&self, method: &str, url: &str, reason: &str) {
        self.routes.lock().unwrap().insert(
            (Method::new(method).as_str().to_owned(), url.to_owned()),
            RouteBehavior::Fail(reason.to_owned()),
        );
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<RequestDescriptor> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let key = (
            request.method.as_str().to_owned(),
            request.url.clone(),
        );
        self.requests.lock().unwrap().push(request);

        match self.routes.lock().unwrap().get(&key) {
            Some(RouteBehavior::Respond(response)) => Ok(response.clone()),
            Some(RouteBehavior::Fail(reason)) => Err(TransportError::ConnectionFailed {
                url: key.1,
                reason: reason.clone(),
            }
            .into()),
            None => Ok(ResponseDescriptor::new(404)),
        }
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
