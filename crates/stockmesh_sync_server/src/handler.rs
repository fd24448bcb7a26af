//! Request handlers for the central endpoints.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::merge::{CentralStockRecord, LwwMerger};
use std::sync::Arc;
use stockmesh_sync_protocol::{SyncBatch, SyncReport};

/// Context shared by all central request handlers.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Central stock view (shared across all handlers).
    pub merger: Arc<LwwMerger>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, merger: Arc<LwwMerger>) -> Self {
        Self { config, merger }
    }
}

/// Handler for central-node requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles a pull request: validates the batch and merges it.
    ///
    /// An empty or oversized item list is rejected without touching the
    /// view.
    pub fn handle_pull(&self, batch: SyncBatch) -> ServerResult<SyncReport> {
        if batch.is_empty() {
            return Err(ServerError::InvalidRequest(
                "batch must carry at least one item".into(),
            ));
        }
        if batch.len() > self.context.config.max_batch {
            return Err(ServerError::InvalidRequest(format!(
                "too many items: {} > {}",
                batch.len(),
                self.context.config.max_batch
            )));
        }

        Ok(self.context.merger.apply_batch(&batch))
    }

    /// Handles a stock lookup against the reconciled view.
    pub fn handle_stock(&self, product_id: &str) -> ServerResult<CentralStockRecord> {
        self.context
            .merger
            .get(product_id)
            .ok_or_else(|| ServerError::NotFound {
                product_id: product_id.to_string(),
            })
    }
}
