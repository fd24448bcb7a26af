//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted via a trait so different
//! implementations can be plugged in (reqwest, ureq, an in-process
//! loopback for tests). Bodies are JSON either way.

use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use parking_lot::RwLock;
use stockmesh_sync_protocol::{from_json, to_json, SyncBatch, SyncReport};

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual transport. Connection and
/// request timeouts are the implementation's responsibility.
pub trait HttpClient: Send + Sync {
    /// Sends a POST with a JSON body and returns the JSON response body.
    fn post(&self, url: &str, body: String) -> Result<String, String>;
}

/// HTTP-based sync transport posting JSON batches to central.
pub struct HttpTransport<C: HttpClient> {
    /// Base URL of the central node (e.g. `http://central:8081`).
    base_url: String,
    /// HTTP client implementation.
    client: C,
    /// Last transport failure, kept for diagnostics.
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport against `base_url`.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the last transport failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }
}

impl<C: HttpClient> SyncTransport for HttpTransport<C> {
    fn push_batch(&self, batch: &SyncBatch) -> SyncResult<SyncReport> {
        let body = to_json(batch).map_err(|e| SyncError::Protocol(e.to_string()))?;
        let url = format!("{}/sync/pull", self.base_url);

        let response = self.client.post(&url, body).map_err(|e| {
            *self.last_error.write() = Some(e.clone());
            SyncError::network(e)
        })?;
        *self.last_error.write() = None;

        from_json(&response).map_err(|e| SyncError::Protocol(e.to_string()))
    }
}

/// Trait for servers that can handle loopback requests.
///
/// Lets a central node living in the same process stand in for the real
/// network, for tests and single-process deployments.
pub trait LoopbackServer: Send + Sync {
    /// Handles a POST and returns the JSON response body.
    fn handle_post(&self, path: &str, body: &str) -> Result<String, String>;
}

/// An HTTP client that routes requests directly to a loopback server.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer> LoopbackClient<S> {
    /// Creates a client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }
}

impl<S: LoopbackServer> HttpClient for LoopbackClient<S> {
    fn post(&self, url: &str, body: String) -> Result<String, String> {
        let path = url.find("/sync/").map(|i| &url[i..]).unwrap_or(url);
        self.server.handle_post(path, &body)
    }
}
