//! Central-node configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the central node.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the surrounding HTTP layer binds to.
    pub bind_addr: SocketAddr,
    /// Maximum number of items accepted per batch.
    pub max_batch: usize,
    /// Request timeout applied by the transport collaborator.
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Creates a configuration bound to `bind_addr`.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_batch: 1_000,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the maximum batch size.
    pub fn with_max_batch(mut self, max: usize) -> Self {
        self.max_batch = max;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8081)))
    }
}
