//! Real-network backend
//!
//! Implements the core [`Backend`] seam over an HTTP client, so unmatched
//! requests leave the process exactly as the native implementation would
//! send them. Requests with the `Include` credentials mode go through a
//! cookie-carrying client; everything else uses a plain client.

use async_trait::async_trait;

use mockxhr_core::{
    Backend, BackendCapabilities, HeaderMap, RequestDescriptor, ResponseDescriptor, Result,
    TransportError, XhrError,
};

// ----------------------------------------------------------------------------
// HTTP Backend
// ----------------------------------------------------------------------------

/// Network backend backed by `reqwest`
pub struct HttpBackend {
    plain: reqwest::Client,
    credentialed: reqwest::Client,
}

impl HttpBackend {
    /// Build a backend with default clients
    pub fn new() -> Result<Self> {
        let plain = reqwest::Client::builder()
            .build()
            .map_err(|e| XhrError::config_error(e.to_string()))?;
        let credentialed = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| XhrError::config_error(e.to_string()))?;
        Ok(Self {
            plain,
            credentialed,
        })
    }

    /// Build a backend around caller-supplied clients
    pub fn with_clients(plain: reqwest::Client, credentialed: reqwest::Client) -> Self {
        Self {
            plain,
            credentialed,
        }
    }

    fn client_for(&self, request: &RequestDescriptor) -> &reqwest::Client {
        match request.credentials {
            mockxhr_core::CredentialsMode::Include => &self.credentialed,
            mockxhr_core::CredentialsMode::SameOrigin => &self.plain,
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch(&self, request: RequestDescriptor) -> Result<ResponseDescriptor> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes()).map_err(
            |e| TransportError::InvalidRequest {
                reason: e.to_string(),
            },
        )?;

        let mut builder = self.client_for(&request).request(method, &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body.clone() {
            builder = builder.body(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "network fetch");
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed {
                url: request.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let mut headers = HeaderMap::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::ReceiveFailed {
                reason: e.to_string(),
            })?
            .to_vec();

        Ok(ResponseDescriptor {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            body,
        })
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_json_kind: true,
            supports_mime_override: true,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
