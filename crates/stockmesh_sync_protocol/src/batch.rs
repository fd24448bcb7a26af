//! Snapshot batches pushed from a store node to central.

use crate::TimestampMs;
use serde::{Deserialize, Serialize};

/// Current-state snapshot of one product, as carried on the wire.
///
/// A batch carries one item per distinct changed product: the latest
/// value at build time, not a replay of individual mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Product the snapshot describes.
    pub product_id: String,
    /// On-hand quantity at snapshot time.
    pub quantity: i64,
    /// Timestamp of the last mutation. A missing value is treated as the
    /// earliest possible time by the merge, so it always loses against an
    /// existing record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<TimestampMs>,
}

impl BatchItem {
    /// Creates an item with a known timestamp.
    pub fn new(product_id: impl Into<String>, quantity: i64, updated_at: TimestampMs) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            updated_at: Some(updated_at),
        }
    }
}

/// A batch of product snapshots sent to the central merge endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatch {
    /// One snapshot per distinct changed product.
    pub items: Vec<BatchItem>,
}

impl SyncBatch {
    /// Creates a batch from items.
    pub fn new(items: Vec<BatchItem>) -> Self {
        Self { items }
    }

    /// Creates an empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the batch carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
