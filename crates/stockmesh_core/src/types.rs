//! Core value types shared across the store node.

/// Product identifier, unique per stock record.
pub type ProductId = String;

/// Wall-clock timestamp in milliseconds since the Unix epoch.
///
/// All last-write-wins comparisons operate on this representation.
pub type TimestampMs = i64;

/// Per-product stock state on the store node.
///
/// `version` is the optimistic-concurrency token: a conditional write
/// succeeds only while the stored version matches the version that was
/// read, and bumps it on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRecord {
    /// Product this record tracks.
    pub product_id: ProductId,
    /// Total physical stock. Never negative.
    pub on_hand: i64,
    /// Portion of `on_hand` reserved against open orders.
    /// Invariant: `0 <= allocated <= on_hand` after every successful mutation.
    pub allocated: i64,
    /// Timestamp of the last successful mutation.
    pub updated_at: TimestampMs,
    /// Monotonically increasing optimistic-concurrency token.
    pub version: u64,
}

impl StockRecord {
    /// Stock not yet reserved: `on_hand - allocated`.
    pub fn available(&self) -> i64 {
        self.on_hand - self.allocated
    }

    /// Read-only view of this record as exposed by the stock endpoints.
    pub fn snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            product_id: self.product_id.clone(),
            quantity: self.on_hand,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only stock view returned by lookups and adjustments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSnapshot {
    /// Product the snapshot describes.
    pub product_id: ProductId,
    /// On-hand quantity at snapshot time.
    pub quantity: i64,
    /// Timestamp of the last mutation captured by the snapshot.
    pub updated_at: TimestampMs,
}

/// Terminal state of a reservation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    /// Stock was reserved against an order.
    Allocated,
    /// A reservation was converted into a shipment.
    Committed,
    /// A reservation was returned to available stock.
    Released,
}

impl ReservationStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Allocated => "ALLOCATED",
            ReservationStatus::Committed => "COMMITTED",
            ReservationStatus::Released => "RELEASED",
        }
    }
}

/// Result of a reservation transition, reflecting the committed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationOutcome {
    /// Which transition produced this outcome.
    pub status: ReservationStatus,
    /// Product the transition acted on.
    pub product_id: ProductId,
    /// On-hand quantity after the transition.
    pub on_hand: i64,
    /// Allocated quantity after the transition.
    pub allocated: i64,
    /// Timestamp stamped by the transition.
    pub updated_at: TimestampMs,
}

impl ReservationOutcome {
    /// Builds an outcome from a committed record.
    pub fn from_record(status: ReservationStatus, record: &StockRecord) -> Self {
        Self {
            status,
            product_id: record.product_id.clone(),
            on_hand: record.on_hand,
            allocated: record.allocated,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(on_hand: i64, allocated: i64) -> StockRecord {
        StockRecord {
            product_id: "SKU-1".into(),
            on_hand,
            allocated,
            updated_at: 1_000,
            version: 1,
        }
    }

    #[test]
    fn available_subtracts_allocated() {
        assert_eq!(record(10, 3).available(), 7);
        assert_eq!(record(5, 5).available(), 0);
    }

    #[test]
    fn snapshot_exposes_on_hand() {
        let snap = record(12, 4).snapshot();
        assert_eq!(snap.product_id, "SKU-1");
        assert_eq!(snap.quantity, 12);
        assert_eq!(snap.updated_at, 1_000);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(ReservationStatus::Allocated.as_str(), "ALLOCATED");
        assert_eq!(ReservationStatus::Committed.as_str(), "COMMITTED");
        assert_eq!(ReservationStatus::Released.as_str(), "RELEASED");
    }

    #[test]
    fn outcome_from_record() {
        let outcome = ReservationOutcome::from_record(ReservationStatus::Committed, &record(8, 2));
        assert_eq!(outcome.status, ReservationStatus::Committed);
        assert_eq!(outcome.on_hand, 8);
        assert_eq!(outcome.allocated, 2);
    }
}
