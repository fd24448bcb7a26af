//! Error types for the central node.

use thiserror::Error;

/// Result type for central-node operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while handling central-node requests.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body was malformed or violated a batch constraint.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No central record exists for the requested product.
    #[error("stock not found for product {product_id}")]
    NotFound {
        /// The unknown product.
        product_id: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns true if this error maps to a 400-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServerError::InvalidRequest(_))
    }

    /// Returns true if this error maps to a 404-class response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServerError::NotFound { .. })
    }

    /// Returns true if this error maps to a 500-class response.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServerError::Internal(_))
    }
}
