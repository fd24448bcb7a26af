//! Last-write-wins merge over the central stock view.
//!
//! The central node keeps one reconciled quantity per product. Each
//! incoming batch item is compared against the existing record by
//! timestamp: strictly newer wins, ties keep the existing value. The whole
//! batch is applied under a single write guard, so readers observe either
//! none or all of its effects.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use stockmesh_sync_protocol::{SyncBatch, SyncReport, TimestampMs, EPOCH_MS};
use tracing::info;

/// Reconciled per-product stock on the central node.
///
/// Central tracks a single quantity; there is no allocation split and no
/// version token here, only the LWW timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralStockRecord {
    /// Product this record tracks.
    pub product_id: String,
    /// Reconciled on-hand quantity.
    pub quantity: i64,
    /// Timestamp of the snapshot that last won the merge.
    pub updated_at: TimestampMs,
}

/// Applies snapshot batches to the central stock view with LWW semantics.
#[derive(Debug, Default)]
pub struct LwwMerger {
    records: RwLock<HashMap<String, CentralStockRecord>>,
}

impl LwwMerger {
    /// Creates an empty central view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a batch, one item at a time, and reports the outcome.
    ///
    /// Per item: an unseen product is created (applied); an existing
    /// record is overwritten only by a strictly newer timestamp (applied),
    /// otherwise left unchanged (skipped). A missing incoming timestamp is
    /// treated as the earliest possible value.
    pub fn apply_batch(&self, batch: &SyncBatch) -> SyncReport {
        let mut records = self.records.write();
        let mut applied = 0u64;
        let mut skipped = 0u64;

        for item in &batch.items {
            let incoming = item.updated_at.unwrap_or(EPOCH_MS);
            match records.entry(item.product_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(CentralStockRecord {
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        updated_at: incoming,
                    });
                    applied += 1;
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    if incoming > existing.updated_at {
                        existing.quantity = item.quantity;
                        existing.updated_at = incoming;
                        applied += 1;
                    } else {
                        skipped += 1;
                    }
                }
            }
        }

        let report = SyncReport::new(batch.len() as u64, applied, skipped);
        info!(
            received = report.received,
            applied = report.applied,
            skipped = report.skipped,
            "batch merged"
        );
        report
    }

    /// Returns the reconciled record for `product_id`.
    pub fn get(&self, product_id: &str) -> Option<CentralStockRecord> {
        self.records.read().get(product_id).cloned()
    }

    /// Number of products the central view has seen.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if no product has been merged yet.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
