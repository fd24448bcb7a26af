//! Store-node request and response bodies.
//!
//! These are the JSON shapes of the store's own HTTP surface, as opposed
//! to the batch types exchanged between nodes. The HTTP routing that
//! carries them is an external layer; this crate only fixes the wire
//! format.

use crate::TimestampMs;
use serde::{Deserialize, Serialize};

/// Body of a manual stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    /// Product to adjust.
    pub product_id: String,
    /// Signed quantity delta. Zero is rejected at the boundary.
    pub delta: i64,
}

/// Body shared by the allocate, commit and release endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Order the reservation belongs to.
    pub order_id: String,
    /// Product to reserve.
    pub product_id: String,
    /// Units requested. Must be positive.
    pub quantity: i64,
}

/// Stock snapshot returned by lookups and adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    /// Product the snapshot describes.
    pub product_id: String,
    /// On-hand quantity at snapshot time.
    pub quantity: i64,
    /// Timestamp of the last mutation.
    pub updated_at: TimestampMs,
}

/// Outcome of a reservation transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    /// `ALLOCATED`, `COMMITTED` or `RELEASED`.
    pub status: String,
    /// Product the transition acted on.
    pub product_id: String,
    /// On-hand quantity after the transition.
    pub on_hand: i64,
    /// Allocated quantity after the transition.
    pub allocated: i64,
    /// Timestamp stamped by the transition.
    pub updated_at: TimestampMs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_json, to_json};

    #[test]
    fn request_bodies_are_camel_case() {
        let adjust: AdjustRequest = from_json(r#"{"productId":"SKU-1","delta":-3}"#).unwrap();
        assert_eq!(adjust.product_id, "SKU-1");
        assert_eq!(adjust.delta, -3);

        let reservation: ReservationRequest =
            from_json(r#"{"orderId":"ORD-1","productId":"SKU-1","quantity":2}"#).unwrap();
        assert_eq!(reservation.order_id, "ORD-1");
        assert_eq!(reservation.quantity, 2);
    }

    #[test]
    fn reservation_response_round_trip() {
        let response = ReservationResponse {
            status: "ALLOCATED".into(),
            product_id: "SKU-1".into(),
            on_hand: 10,
            allocated: 4,
            updated_at: 1_000,
        };
        let json = to_json(&response).unwrap();
        assert!(json.contains("\"status\":\"ALLOCATED\""));
        assert!(json.contains("\"onHand\":10"));
        assert!(json.contains("\"allocated\":4"));

        let back: ReservationResponse = from_json(&json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn stock_response_field_names() {
        let response = StockResponse {
            product_id: "SKU-1".into(),
            quantity: 7,
            updated_at: 1_000,
        };
        let json = to_json(&response).unwrap();
        assert!(json.contains("\"productId\":\"SKU-1\""));
        assert!(json.contains("\"quantity\":7"));
        assert!(json.contains("\"updatedAt\":1000"));
    }
}
