//! Store-node request surface.
//!
//! The HTTP layer over a store node is a thin external collaborator; this
//! module is the routing-free dispatch it wraps, the store-side
//! counterpart of the central server facade. Bodies are the protocol
//! crate's JSON wire types, and the idempotency key arrives as an
//! explicit argument rather than ambient request state.

use crate::error::SyncError;
use crate::pusher::SyncPusher;
use crate::transport::SyncTransport;
use std::sync::Arc;
use stockmesh_core::{
    Clock, CoreError, ReservationLedger, ReservationOutcome, StockLedger, StockSnapshot,
    StockStore,
};
use stockmesh_sync_protocol::{
    from_json, to_json, AdjustRequest, ReservationRequest, ReservationResponse, StockResponse,
    SyncReport,
};
use thiserror::Error;

/// Result type for store API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the store-node request surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body was malformed or failed boundary validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A stock or reservation operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An on-demand push failed after its internal retries.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A response body could not be encoded.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns true if the error maps to a 404-class response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Core(e) if e.is_not_found())
    }

    /// Returns true if the error maps to a 400-class response.
    pub fn is_client_error(&self) -> bool {
        match self {
            ApiError::InvalidRequest(_) => true,
            ApiError::Core(e) => e.is_client_error(),
            _ => false,
        }
    }

    /// Returns true if the error maps to a 500-class response.
    pub fn is_server_error(&self) -> bool {
        match self {
            ApiError::Internal(_) | ApiError::Sync(_) => true,
            ApiError::Core(e) => e.is_server_error(),
            ApiError::InvalidRequest(_) => false,
        }
    }
}

/// Routing-free request surface of one store node.
///
/// Owns the ledgers over the node's store and the pusher for on-demand
/// sync. HTTP endpoints wrap [`handle_post`] and [`handle_get`].
///
/// [`handle_post`]: StoreApi::handle_post
/// [`handle_get`]: StoreApi::handle_get
pub struct StoreApi<T: SyncTransport> {
    ledger: StockLedger,
    reservations: ReservationLedger,
    pusher: Arc<SyncPusher<T>>,
}

impl<T: SyncTransport> StoreApi<T> {
    /// Creates the surface over a node's store and its pusher.
    pub fn new(store: Arc<StockStore>, clock: Arc<dyn Clock>, pusher: Arc<SyncPusher<T>>) -> Self {
        Self {
            ledger: StockLedger::new(Arc::clone(&store), Arc::clone(&clock)),
            reservations: ReservationLedger::new(store, clock),
            pusher,
        }
    }

    /// Looks up the current stock snapshot.
    pub fn stock(&self, product_id: &str) -> ApiResult<StockResponse> {
        Ok(stock_response(self.ledger.snapshot(product_id)?))
    }

    /// Applies a manual stock adjustment.
    ///
    /// A zero delta is rejected here, at the boundary; the ledger only
    /// guards against negative results.
    pub fn adjust(&self, request: &AdjustRequest) -> ApiResult<StockResponse> {
        if request.delta == 0 {
            return Err(ApiError::InvalidRequest("delta must be non-zero".into()));
        }
        Ok(stock_response(
            self.ledger.adjust(&request.product_id, request.delta)?,
        ))
    }

    /// Reserves stock against an order.
    pub fn allocate(
        &self,
        request: &ReservationRequest,
        idempotency_key: Option<&str>,
    ) -> ApiResult<ReservationResponse> {
        let outcome = self.reservations.allocate(&to_core(request), idempotency_key)?;
        Ok(reservation_response(outcome))
    }

    /// Converts a reservation into a shipment.
    pub fn commit(&self, request: &ReservationRequest) -> ApiResult<ReservationResponse> {
        Ok(reservation_response(self.reservations.commit(&to_core(request))?))
    }

    /// Returns a reservation to available stock.
    pub fn release(&self, request: &ReservationRequest) -> ApiResult<ReservationResponse> {
        Ok(reservation_response(self.reservations.release(&to_core(request))?))
    }

    /// Triggers an immediate push, propagating failure to the caller.
    ///
    /// The scheduled path swallows the same failure; the on-demand path
    /// does not.
    pub fn push(&self) -> ApiResult<SyncReport> {
        Ok(self.pusher.push_now()?)
    }

    /// Dispatches a POST by path, decoding and encoding JSON bodies.
    ///
    /// Only the allocate path honors `idempotency_key`; the push path
    /// carries no body.
    pub fn handle_post(
        &self,
        path: &str,
        body: &str,
        idempotency_key: Option<&str>,
    ) -> ApiResult<String> {
        match path {
            "/stock/adjust" => encode(&self.adjust(&decode(body)?)?),
            "/stock/allocate" => encode(&self.allocate(&decode(body)?, idempotency_key)?),
            "/stock/commit" => encode(&self.commit(&decode(body)?)?),
            "/stock/release" => encode(&self.release(&decode(body)?)?),
            "/sync/push" => encode(&self.push()?),
            other => Err(ApiError::InvalidRequest(format!("unknown path: {other}"))),
        }
    }

    /// Dispatches a GET by path, encoding the JSON response body.
    pub fn handle_get(&self, path: &str) -> ApiResult<String> {
        match path.strip_prefix("/stock/") {
            Some(product_id) if !product_id.is_empty() => encode(&self.stock(product_id)?),
            _ => Err(ApiError::InvalidRequest(format!("unknown path: {path}"))),
        }
    }
}

fn decode<M: serde::de::DeserializeOwned>(body: &str) -> ApiResult<M> {
    from_json(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

fn encode<M: serde::Serialize>(value: &M) -> ApiResult<String> {
    to_json(value).map_err(|e| ApiError::Internal(e.to_string()))
}

fn to_core(request: &ReservationRequest) -> stockmesh_core::ReservationRequest {
    stockmesh_core::ReservationRequest::new(
        request.order_id.clone(),
        request.product_id.clone(),
        request.quantity,
    )
}

fn stock_response(snapshot: StockSnapshot) -> StockResponse {
    StockResponse {
        product_id: snapshot.product_id,
        quantity: snapshot.quantity,
        updated_at: snapshot.updated_at,
    }
}

fn reservation_response(outcome: ReservationOutcome) -> ReservationResponse {
    ReservationResponse {
        status: outcome.status.as_str().to_string(),
        product_id: outcome.product_id,
        on_hand: outcome.on_hand,
        allocated: outcome.allocated,
        updated_at: outcome.updated_at,
    }
}
