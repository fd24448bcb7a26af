//! JSON encoding and decoding for wire types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload was not valid JSON for the expected shape.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Encodes a wire type to its JSON representation.
pub fn to_json<T: Serialize>(value: &T) -> CodecResult<String> {
    serde_json::to_string(value).map_err(|e| CodecError::InvalidMessage(e.to_string()))
}

/// Decodes a wire type from JSON.
pub fn from_json<T: DeserializeOwned>(json: &str) -> CodecResult<T> {
    serde_json::from_str(json).map_err(|e| CodecError::InvalidMessage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncReport;

    #[test]
    fn garbage_is_an_invalid_message() {
        let err = from_json::<SyncReport>("not json").unwrap_err();
        assert!(err.to_string().contains("invalid message"));
    }

    #[test]
    fn unknown_shape_is_rejected() {
        assert!(from_json::<SyncReport>(r#"{"received":"three"}"#).is_err());
    }
}
