//! Scripted mock responder
//!
//! Minimal interception channel for exercising the core: a table of
//! exact method/url routes. Anything unmatched is declined, which the
//! client must treat identically to "let the real network handle it".
//! Deliberately not a matching DSL.

use std::sync::Mutex;

use mockxhr_core::{Interceptor, Method, RequestDescriptor, ResponseDescriptor};

// ----------------------------------------------------------------------------
// Scripted Responder
// ----------------------------------------------------------------------------

struct MockRoute {
    method: Method,
    url: String,
    response: ResponseDescriptor,
}

/// Interceptor answering from a static route table
#[derive(Default)]
pub struct ScriptedResponder {
    routes: Mutex<Vec<MockRoute>>,
    hits: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mock response for `method url`
    pub fn on(&self, method: &str, url: &str, response: ResponseDescriptor) {
        self.routes.lock().unwrap().push(MockRoute {
            method: Method::new(method),
            url: url.to_owned(),
            response,
        });
    }

    /// Requests this responder has matched, in match order
    pub fn matched(&self) -> Vec<RequestDescriptor> {
        self.hits.lock().unwrap().clone()
    }

    pub fn match_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }
}

impl Interceptor for ScriptedResponder {
    fn intercept(&self, request: &RequestDescriptor) -> Option<ResponseDescriptor> {
        let routes = self.routes.lock().unwrap();
        let matched = routes
            .iter()
            .find(|r| r.method == request.method && r.url == request.url)
            .map(|r| r.response.clone());
        drop(routes);

        if matched.is_some() {
            self.hits.lock().unwrap().push(request.clone());
        }
        matched
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
