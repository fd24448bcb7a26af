//! Central server facade.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::merge::{CentralStockRecord, LwwMerger};
use std::sync::Arc;
use stockmesh_sync_protocol::{from_json, to_json, SyncBatch, SyncReport};

/// The central node.
///
/// Maintains the reconciled stock view and processes pull and lookup
/// requests. HTTP routing is a thin external layer over [`handle_post`]
/// and [`handle_get`], which dispatch on paths and speak JSON bodies.
///
/// # Example
///
/// ```
/// use stockmesh_sync_server::{CentralServer, ServerConfig};
///
/// let server = CentralServer::new(ServerConfig::default());
/// let report = server
///     .handle_post("/sync/pull", r#"{"items":[{"productId":"SKU-1","quantity":5,"updatedAt":1}]}"#)
///     .unwrap();
/// assert!(report.contains("\"applied\":1"));
/// ```
///
/// [`handle_post`]: CentralServer::handle_post
/// [`handle_get`]: CentralServer::handle_get
pub struct CentralServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl CentralServer {
    /// Creates a central server with an empty stock view.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_merger(config, Arc::new(LwwMerger::new()))
    }

    /// Creates a central server over an existing stock view.
    pub fn with_merger(config: ServerConfig, merger: Arc<LwwMerger>) -> Self {
        let context = Arc::new(HandlerContext::new(config, merger));
        let handler = RequestHandler::new(Arc::clone(&context));
        Self { handler, context }
    }

    /// Handles a pull request.
    pub fn handle_pull(&self, batch: SyncBatch) -> ServerResult<SyncReport> {
        self.handler.handle_pull(batch)
    }

    /// Handles a stock lookup.
    pub fn handle_stock(&self, product_id: &str) -> ServerResult<CentralStockRecord> {
        self.handler.handle_stock(product_id)
    }

    /// Dispatches a POST by path, decoding and encoding JSON bodies.
    pub fn handle_post(&self, path: &str, body: &str) -> ServerResult<String> {
        match path {
            "/sync/pull" => {
                let batch: SyncBatch =
                    from_json(body).map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
                let report = self.handle_pull(batch)?;
                to_json(&report).map_err(|e| ServerError::Internal(e.to_string()))
            }
            other => Err(ServerError::InvalidRequest(format!(
                "unknown path: {other}"
            ))),
        }
    }

    /// Dispatches a GET by path, encoding the JSON response body.
    pub fn handle_get(&self, path: &str) -> ServerResult<String> {
        match path.strip_prefix("/stock/") {
            Some(product_id) if !product_id.is_empty() => {
                let record = self.handle_stock(product_id)?;
                to_json(&record).map_err(|e| ServerError::Internal(e.to_string()))
            }
            _ => Err(ServerError::InvalidRequest(format!(
                "unknown path: {path}"
            ))),
        }
    }

    /// Number of products in the reconciled view.
    pub fn record_count(&self) -> usize {
        self.context.merger.len()
    }
}
