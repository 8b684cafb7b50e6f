//! Client configuration
//!
//! Consolidates the tunable behavior of the client driver so applications
//! and tests configure instances through one structure.

use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for client instances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout; `None` disables timeout handling entirely
    pub timeout: Option<Duration>,
    /// Response bytes per progress event; the driver always fires at least
    /// one progress event per cycle regardless of body size
    pub progress_chunk: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            progress_chunk: 64 * 1024,
        }
    }
}

impl ClientConfig {
    /// Config with a request timeout applied
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }
}
