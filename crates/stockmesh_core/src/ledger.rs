//! Stock lookups and manual adjustments.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::mutator::{MutationPlan, OptimisticMutator, RetryPolicy};
use crate::store::StockStore;
use crate::types::StockSnapshot;
use std::sync::Arc;
use tracing::info;

/// Read and adjust per-product stock on the store node.
pub struct StockLedger {
    mutator: OptimisticMutator,
}

impl StockLedger {
    /// Creates a ledger over `store`, stamping mutations from `clock`.
    pub fn new(store: Arc<StockStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            mutator: OptimisticMutator::new(store, clock),
        }
    }

    /// Replaces the optimistic retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.mutator = self.mutator.with_policy(policy);
        self
    }

    /// The store this ledger reads and writes.
    pub fn store(&self) -> &Arc<StockStore> {
        self.mutator.store()
    }

    /// Returns the current snapshot for `product_id`.
    pub fn snapshot(&self, product_id: &str) -> CoreResult<StockSnapshot> {
        self.store()
            .get(product_id)
            .map(|record| record.snapshot())
            .ok_or_else(|| CoreError::NotFound {
                product_id: product_id.to_string(),
            })
    }

    /// Applies a signed delta to on-hand stock.
    ///
    /// Fails with [`CoreError::InvalidAdjustment`] if the result would be
    /// negative, leaving state untouched. Zero deltas are rejected by the
    /// boundary validation layer, not here.
    pub fn adjust(&self, product_id: &str, delta: i64) -> CoreResult<StockSnapshot> {
        let record = self.mutator.mutate(product_id, |current| {
            let new_on_hand = current.on_hand + delta;
            if new_on_hand < 0 {
                return Err(CoreError::InvalidAdjustment {
                    product_id: current.product_id.clone(),
                    on_hand: current.on_hand,
                    delta,
                });
            }
            let mut plan = MutationPlan::from_record(current);
            plan.on_hand = new_on_hand;
            Ok(plan)
        })?;

        info!(product_id, delta, on_hand = record.on_hand, "stock adjusted");
        Ok(record.snapshot())
    }
}
