//! Core request/response types
//!
//! Defines the request and response descriptors exchanged with backends and
//! the interception channel, using newtype patterns for semantic validation
//! and type safety.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::headers::HeaderMap;

// ----------------------------------------------------------------------------
// Request Method
// ----------------------------------------------------------------------------

/// HTTP request method, normalized to uppercase for policy checks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Method(String);

impl Method {
    /// Create a method from caller input, normalizing case
    pub fn new(method: &str) -> Self {
        Self(method.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// GET and HEAD never transmit a request body
    pub fn is_bodyless(&self) -> bool {
        matches!(self.0.as_str(), "GET" | "HEAD")
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Credentials Mode
// ----------------------------------------------------------------------------

/// Credentials mode of the transmitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialsMode {
    /// Default: credentials only for same-origin requests
    SameOrigin,
    /// `withCredentials = true`: always include credentials
    Include,
}

impl From<bool> for CredentialsMode {
    fn from(with_credentials: bool) -> Self {
        if with_credentials {
            CredentialsMode::Include
        } else {
            CredentialsMode::SameOrigin
        }
    }
}

// ----------------------------------------------------------------------------
// Request Descriptor
// ----------------------------------------------------------------------------

/// Snapshot of one outgoing request, handed to the interception channel and
/// (when unmatched) to the network backend. The request-body elision policy
/// has already been applied: neither branch ever observes a discarded body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub credentials: CredentialsMode,
}

impl RequestDescriptor {
    /// Request body as text, empty when no body is transmitted
    pub fn body_text(&self) -> String {
        match &self.body {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => String::new(),
        }
    }
}

// ----------------------------------------------------------------------------
// Response Descriptor
// ----------------------------------------------------------------------------

/// One complete response, real or mocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ResponseDescriptor {
    /// Create a response with the canonical reason phrase for the status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_owned(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Create a 200 response with a text body and text/plain content type
    pub fn text<T: Into<String>>(body: T) -> Self {
        let mut response = Self::new(200);
        response.headers.set("Content-Type", "text/plain");
        response.body = body.into().into_bytes();
        response
    }

    /// Create a 200 response with raw bytes and an octet-stream content type
    pub fn bytes(body: Vec<u8>) -> Self {
        let mut response = Self::new(200);
        response.headers.set("Content-Type", "application/octet-stream");
        response.body = body;
        response
    }

    /// Add a header (builder style)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace the body (builder style)
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

/// Canonical reason phrase for common status codes, empty when unknown
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_normalized_uppercase() {
        assert_eq!(Method::new("get").as_str(), "GET");
        assert_eq!(Method::new(" Post ").as_str(), "POST");
        assert_eq!(Method::new("PATCH").as_str(), "PATCH");
    }

    #[test]
    fn test_bodyless_methods() {
        assert!(Method::new("get").is_bodyless());
        assert!(Method::new("HEAD").is_bodyless());
        assert!(!Method::new("OPTIONS").is_bodyless());
        assert!(!Method::new("POST").is_bodyless());
        assert!(!Method::new("DELETE").is_bodyless());
    }

    #[test]
    fn test_credentials_mode_from_flag() {
        assert_eq!(CredentialsMode::from(true), CredentialsMode::Include);
        assert_eq!(CredentialsMode::from(false), CredentialsMode::SameOrigin);
    }

    #[test]
    fn test_response_builders() {
        let response = ResponseDescriptor::text("hello").with_header("X-Powered-By", "responder");

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.headers.get("content-type"), Some("text/plain"));
        assert_eq!(response.headers.get("x-powered-by"), Some("responder"));
        assert_eq!(response.body, b"hello");
    }

    #[test]
    fn test_reason_phrase_unknown_is_empty() {
        assert_eq!(reason_phrase(299), "");
        assert_eq!(reason_phrase(404), "Not Found");
    }
}
