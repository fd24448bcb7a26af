//! Reservation state machine: allocate, commit, release.
//!
//! Transitions act on the implicit per-product state
//! `available = on_hand - allocated`, each one going through the
//! optimistic mutator and appending a change-log entry on success.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::mutator::{MutationPlan, OptimisticMutator, RetryPolicy};
use crate::store::{IdempotencyRecord, StockStore};
use crate::types::{ProductId, ReservationOutcome, ReservationStatus};
use std::sync::Arc;
use tracing::info;

/// A reservation request tying an order to a product and quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    /// Order the reservation belongs to.
    pub order_id: String,
    /// Product to reserve.
    pub product_id: ProductId,
    /// Units requested. Must be positive.
    pub quantity: i64,
}

impl ReservationRequest {
    /// Creates a request.
    pub fn new(
        order_id: impl Into<String>,
        product_id: impl Into<ProductId>,
        quantity: i64,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Hash stored alongside an idempotency key to identify the payload.
    pub fn request_hash(&self) -> String {
        format!("{}:{}:{}", self.order_id, self.product_id, self.quantity)
    }
}

/// Runs reservation transitions on the store node.
pub struct ReservationLedger {
    mutator: OptimisticMutator,
}

impl ReservationLedger {
    /// Creates a reservation ledger over `store`.
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

    /// Reserves stock against an order: `allocated += quantity`.
    ///
    /// Requires `available >= quantity`. When `idempotency_key` is present
    /// and already known, the allocation is not re-executed; the current
    /// snapshot is returned tagged `Allocated`, which may differ from the
    /// state produced by the original call if other mutations landed in
    /// between.
    pub fn allocate(
        &self,
        request: &ReservationRequest,
        idempotency_key: Option<&str>,
    ) -> CoreResult<ReservationOutcome> {
        Self::validate_quantity(request.quantity)?;

        let key = idempotency_key.map(str::trim).filter(|k| !k.is_empty());
        if let Some(key) = key {
            if self.store().find_idempotency(key).is_some() {
                let record =
                    self.store()
                        .get(&request.product_id)
                        .ok_or_else(|| CoreError::NotFound {
                            product_id: request.product_id.clone(),
                        })?;
                info!(
                    product_id = %request.product_id,
                    order_id = %request.order_id,
                    idempotency_key = key,
                    "allocate replay short-circuited"
                );
                return Ok(ReservationOutcome::from_record(
                    ReservationStatus::Allocated,
                    &record,
                ));
            }
        }

        let clock = Arc::clone(self.mutator.clock());
        let record = self.mutator.mutate(&request.product_id, |current| {
            let available = current.available();
            if available < request.quantity {
                return Err(CoreError::InsufficientStock {
                    product_id: current.product_id.clone(),
                    requested: request.quantity,
                    available,
                });
            }
            let mut plan = MutationPlan::from_record(current);
            plan.allocated += request.quantity;
            if let Some(key) = key {
                plan = plan.with_idempotency(IdempotencyRecord::new(
                    key,
                    request.request_hash(),
                    clock.now_ms(),
                ));
            }
            Ok(plan)
        })?;

        info!(
            product_id = %request.product_id,
            order_id = %request.order_id,
            quantity = request.quantity,
            allocated = record.allocated,
            "stock allocated"
        );
        Ok(ReservationOutcome::from_record(
            ReservationStatus::Allocated,
            &record,
        ))
    }

    /// Converts a reservation into a shipment:
    /// `on_hand -= quantity; allocated -= quantity` in a single mutation.
    pub fn commit(&self, request: &ReservationRequest) -> CoreResult<ReservationOutcome> {
        Self::validate_quantity(request.quantity)?;

        let record = self.mutator.mutate(&request.product_id, |current| {
            if current.allocated < request.quantity {
                return Err(CoreError::InsufficientReservation {
                    product_id: current.product_id.clone(),
                    requested: request.quantity,
                    allocated: current.allocated,
                });
            }
            let mut plan = MutationPlan::from_record(current);
            plan.on_hand -= request.quantity;
            plan.allocated -= request.quantity;
            Ok(plan)
        })?;

        info!(
            product_id = %request.product_id,
            order_id = %request.order_id,
            quantity = request.quantity,
            on_hand = record.on_hand,
            "reservation committed"
        );
        Ok(ReservationOutcome::from_record(
            ReservationStatus::Committed,
            &record,
        ))
    }

    /// Returns a reservation to available stock: `allocated -= quantity`.
    pub fn release(&self, request: &ReservationRequest) -> CoreResult<ReservationOutcome> {
        Self::validate_quantity(request.quantity)?;

        let record = self.mutator.mutate(&request.product_id, |current| {
            if current.allocated < request.quantity {
                return Err(CoreError::InsufficientReservation {
                    product_id: current.product_id.clone(),
                    requested: request.quantity,
                    allocated: current.allocated,
                });
            }
            let mut plan = MutationPlan::from_record(current);
            plan.allocated -= request.quantity;
            Ok(plan)
        })?;

        info!(
            product_id = %request.product_id,
            order_id = %request.order_id,
            quantity = request.quantity,
            allocated = record.allocated,
            "reservation released"
        );
        Ok(ReservationOutcome::from_record(
            ReservationStatus::Released,
            &record,
        ))
    }

    fn validate_quantity(quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn ledger() -> ReservationLedger {
        let store = Arc::new(StockStore::new());
        store.provision("SKU-1", 10, 1_000);
        ReservationLedger::new(store, Arc::new(ManualClock::new(2_000)))
    }

    fn request(quantity: i64) -> ReservationRequest {
        ReservationRequest::new("ORD-1", "SKU-1", quantity)
    }

    #[test]
    fn allocate_reserves_stock() {
        let ledger = ledger();
        let outcome = ledger.allocate(&request(4), None).unwrap();

        assert_eq!(outcome.status, ReservationStatus::Allocated);
        assert_eq!(outcome.on_hand, 10);
        assert_eq!(outcome.allocated, 4);
        assert_eq!(ledger.store().change_log_len(), 1);
    }

    #[test]
    fn allocate_beyond_available_fails() {
        let ledger = ledger();
        ledger.allocate(&request(8), None).unwrap();

        let err = ledger.allocate(&request(3), None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(ledger.store().get("SKU-1").unwrap().allocated, 8);
    }

    #[test]
    fn commit_consumes_on_hand_and_reservation() {
        let ledger = ledger();
        ledger.allocate(&request(4), None).unwrap();

        let outcome = ledger.commit(&request(4)).unwrap();
        assert_eq!(outcome.status, ReservationStatus::Committed);
        assert_eq!(outcome.on_hand, 6);
        assert_eq!(outcome.allocated, 0);
    }

    #[test]
    fn release_returns_stock_to_available() {
        let ledger = ledger();
        ledger.allocate(&request(4), None).unwrap();

        let outcome = ledger.release(&request(4)).unwrap();
        assert_eq!(outcome.status, ReservationStatus::Released);
        assert_eq!(outcome.on_hand, 10);
        assert_eq!(outcome.allocated, 0);
    }

    #[test]
    fn commit_and_release_require_matching_reservation() {
        let ledger = ledger();
        ledger.allocate(&request(2), None).unwrap();

        assert!(matches!(
            ledger.commit(&request(3)).unwrap_err(),
            CoreError::InsufficientReservation { .. }
        ));
        assert!(matches!(
            ledger.release(&request(3)).unwrap_err(),
            CoreError::InsufficientReservation { .. }
        ));
    }

    #[test]
    fn reservation_conservation() {
        let ledger = ledger();
        let initial = ledger.store().get("SKU-1").unwrap();

        ledger.allocate(&request(5), None).unwrap();
        ledger.commit(&request(5)).unwrap();
        let after_commit = ledger.store().get("SKU-1").unwrap();
        assert_eq!(after_commit.on_hand, initial.on_hand - 5);
        assert_eq!(after_commit.allocated, initial.allocated);

        ledger.allocate(&request(3), None).unwrap();
        ledger.release(&request(3)).unwrap();
        let after_release = ledger.store().get("SKU-1").unwrap();
        assert_eq!(after_release.on_hand, after_commit.on_hand);
        assert_eq!(after_release.allocated, initial.allocated);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let ledger = ledger();
        for quantity in [0, -4] {
            assert!(matches!(
                ledger.allocate(&request(quantity), None).unwrap_err(),
                CoreError::InvalidQuantity { .. }
            ));
            assert!(matches!(
                ledger.commit(&request(quantity)).unwrap_err(),
                CoreError::InvalidQuantity { .. }
            ));
            assert!(matches!(
                ledger.release(&request(quantity)).unwrap_err(),
                CoreError::InvalidQuantity { .. }
            ));
        }
    }

    #[test]
    fn keyed_allocate_executes_once() {
        let ledger = ledger();

        let first = ledger.allocate(&request(4), Some("key-1")).unwrap();
        assert_eq!(first.allocated, 4);

        let replay = ledger.allocate(&request(4), Some("key-1")).unwrap();
        assert_eq!(replay.status, ReservationStatus::Allocated);
        assert_eq!(replay.allocated, 4);

        // Only the first call executed and logged a change.
        assert_eq!(ledger.store().get("SKU-1").unwrap().allocated, 4);
        assert_eq!(ledger.store().change_log_len(), 1);
        let idem = ledger.store().find_idempotency("key-1").unwrap();
        assert_eq!(idem.request_hash, "ORD-1:SKU-1:4");
    }

    #[test]
    fn replay_returns_current_state_not_recorded_response() {
        let ledger = ledger();
        ledger.allocate(&request(4), Some("key-1")).unwrap();

        // Another operation moves the product between the original call
        // and the replay.
        ledger.commit(&request(4)).unwrap();

        let replay = ledger.allocate(&request(4), Some("key-1")).unwrap();
        assert_eq!(replay.on_hand, 6);
        assert_eq!(replay.allocated, 0);
    }

    #[test]
    fn blank_key_is_ignored() {
        let ledger = ledger();
        ledger.allocate(&request(2), Some("  ")).unwrap();
        ledger.allocate(&request(2), Some("")).unwrap();

        // Both executed: no idempotency record was stored.
        assert_eq!(ledger.store().get("SKU-1").unwrap().allocated, 4);
    }

    #[test]
    fn distinct_keys_execute_independently() {
        let ledger = ledger();
        ledger.allocate(&request(2), Some("key-1")).unwrap();
        ledger.allocate(&request(2), Some("key-2")).unwrap();
        assert_eq!(ledger.store().get("SKU-1").unwrap().allocated, 4);
    }
}
