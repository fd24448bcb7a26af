//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while pushing to the central node.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The central node could not be reached or rejected the call.
    ///
    /// Retried internally by the pusher up to its configured limit; the
    /// outbox is preserved so a later push can drain it.
    #[error("sync network error: {message}")]
    Network {
        /// Description of the failure.
        message: String,
    },

    /// A wire message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SyncError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Returns true if the pusher may retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Network { .. })
    }
}
