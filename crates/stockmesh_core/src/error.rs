//! Error types for the store-node core.

use crate::types::ProductId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while mutating or reading stock state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No stock record exists for the requested product.
    #[error("stock not found for product {product_id}")]
    NotFound {
        /// The unknown product.
        product_id: ProductId,
    },

    /// The adjustment would drive on-hand stock negative.
    #[error("adjustment of {delta} would make stock negative (on hand: {on_hand})")]
    InvalidAdjustment {
        /// Product the adjustment targeted.
        product_id: ProductId,
        /// On-hand quantity at evaluation time.
        on_hand: i64,
        /// Requested delta.
        delta: i64,
    },

    /// A reservation request carried a non-positive quantity.
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity {
        /// The rejected quantity.
        quantity: i64,
    },

    /// Not enough unreserved stock to cover an allocation.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product the allocation targeted.
        product_id: ProductId,
        /// Quantity requested.
        requested: i64,
        /// Unreserved quantity at evaluation time.
        available: i64,
    },

    /// Not enough reserved stock to commit or release.
    #[error("insufficient reservation for product {product_id}: requested {requested}, allocated {allocated}")]
    InsufficientReservation {
        /// Product the transition targeted.
        product_id: ProductId,
        /// Quantity requested.
        requested: i64,
        /// Reserved quantity at evaluation time.
        allocated: i64,
    },

    /// The optimistic write kept losing the version race.
    #[error("concurrent updates exhausted {attempts} attempts for product {product_id}")]
    ConcurrencyExhausted {
        /// Product under contention.
        product_id: ProductId,
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl CoreError {
    /// Returns true if the error maps to a 404-class response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }

    /// Returns true if the error maps to a 400-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidAdjustment { .. }
                | CoreError::InvalidQuantity { .. }
                | CoreError::InsufficientStock { .. }
                | CoreError::InsufficientReservation { .. }
        )
    }

    /// Returns true if the error maps to a 500-class response.
    ///
    /// Callers may retry the whole request; the core does not retry further.
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::ConcurrencyExhausted { .. })
    }
}
