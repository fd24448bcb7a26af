//! Outbox-driven push to the central node.
//!
//! The pusher reduces the change log to one current-state snapshot per
//! distinct changed product, sends the batch, and clears the log on
//! success. This is reconciliation, not event replay: intermediate values
//! between pushes are never transmitted.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use std::sync::Arc;
use std::time::Instant;
use stockmesh_core::StockStore;
use stockmesh_sync_protocol::{BatchItem, SyncBatch, SyncReport};
use tracing::{error, info, warn};

/// Builds and sends snapshot batches from the store-node outbox.
pub struct SyncPusher<T: SyncTransport> {
    store: Arc<StockStore>,
    transport: Arc<T>,
    config: SyncConfig,
}

impl<T: SyncTransport> SyncPusher<T> {
    /// Creates a pusher draining `store` through `transport`.
    pub fn new(store: Arc<StockStore>, transport: Arc<T>, config: SyncConfig) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// The pusher's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The store this pusher drains.
    pub fn store(&self) -> &Arc<StockStore> {
        &self.store
    }

    /// Builds a batch from the current outbox: one item per distinct
    /// changed product, each carrying the record as it reads right now.
    pub fn build_batch(&self) -> SyncBatch {
        let items = self
            .store
            .distinct_changed_products()
            .into_iter()
            .filter_map(|product_id| self.store.get(&product_id))
            .map(|record| BatchItem::new(record.product_id, record.on_hand, record.updated_at))
            .collect();
        SyncBatch::new(items)
    }

    /// Pushes the current outbox contents to central.
    ///
    /// An empty outbox returns a zero report without touching the
    /// network. Otherwise the batch is sent, retrying network failures up
    /// to `max_retries` with linear backoff. On success the entire outbox
    /// is cleared, unscoped to the entries the batch was built from; on
    /// final failure it is left intact for the next attempt.
    pub fn push_now(&self) -> SyncResult<SyncReport> {
        let start = Instant::now();
        let batch = self.build_batch();

        if batch.is_empty() {
            info!("push skipped, no pending changes");
            return Ok(SyncReport::empty());
        }
        info!(items = batch.len(), "push started");

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.push_batch(&batch) {
                Ok(report) => {
                    self.store.clear_change_log();
                    info!(
                        received = report.received,
                        applied = report.applied,
                        skipped = report.skipped,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "push succeeded"
                    );
                    return Ok(report);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        "push failed, backing off: {err}"
                    );
                    std::thread::sleep(delay);
                }
                Err(err) => {
                    error!(
                        attempts = attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "push gave up: {err}"
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::Duration;
    use stockmesh_core::{ManualClock, StockLedger};

    fn pusher_with_ledger() -> (SyncPusher<MockTransport>, StockLedger, Arc<MockTransport>) {
        let store = Arc::new(StockStore::new());
        store.provision("SKU-1", 10, 1_000);
        store.provision("SKU-2", 20, 1_000);
        let ledger = StockLedger::new(Arc::clone(&store), Arc::new(ManualClock::new(2_000)));

        let transport = Arc::new(MockTransport::new());
        let config = SyncConfig::default().with_initial_backoff(Duration::ZERO);
        let pusher = SyncPusher::new(store, Arc::clone(&transport), config);
        (pusher, ledger, transport)
    }

    #[test]
    fn empty_outbox_pushes_nothing() {
        let (pusher, _ledger, transport) = pusher_with_ledger();

        let report = pusher.push_now().unwrap();
        assert_eq!(report, SyncReport::empty());
        assert_eq!(transport.push_count(), 0);
    }

    #[test]
    fn batch_carries_one_item_per_distinct_product() {
        let (pusher, ledger, _transport) = pusher_with_ledger();
        ledger.adjust("SKU-1", 1).unwrap();
        ledger.adjust("SKU-1", 1).unwrap();
        ledger.adjust("SKU-2", -5).unwrap();

        let batch = pusher.build_batch();
        assert_eq!(batch.len(), 2);
        // Last-value capture: the item reflects the current record, not
        // the intermediate mutations.
        let item = batch.items.iter().find(|i| i.product_id == "SKU-1").unwrap();
        assert_eq!(item.quantity, 12);
    }

    #[test]
    fn successful_push_clears_the_outbox() {
        let (pusher, ledger, transport) = pusher_with_ledger();
        transport.set_response(SyncReport::new(1, 1, 0));
        ledger.adjust("SKU-1", 3).unwrap();

        let report = pusher.push_now().unwrap();
        assert_eq!(report, SyncReport::new(1, 1, 0));
        assert_eq!(pusher.store().change_log_len(), 0);
        assert_eq!(transport.push_count(), 1);
    }

    #[test]
    fn network_failures_retry_then_surface() {
        let (pusher, ledger, transport) = pusher_with_ledger();
        transport.set_response(SyncReport::new(1, 1, 0));
        transport.fail_next(3);
        ledger.adjust("SKU-1", 3).unwrap();

        let err = pusher.push_now().unwrap_err();
        assert!(err.is_retryable());
        // All attempts consumed, outbox untouched for the next push.
        assert_eq!(transport.push_count(), 3);
        assert_eq!(pusher.store().change_log_len(), 1);

        // The next push drains it.
        let report = pusher.push_now().unwrap();
        assert_eq!(report, SyncReport::new(1, 1, 0));
        assert_eq!(pusher.store().change_log_len(), 0);
    }

    #[test]
    fn transient_failure_recovers_within_one_push() {
        let (pusher, ledger, transport) = pusher_with_ledger();
        transport.set_response(SyncReport::new(1, 1, 0));
        transport.fail_next(2);
        ledger.adjust("SKU-1", 3).unwrap();

        let report = pusher.push_now().unwrap();
        assert_eq!(report, SyncReport::new(1, 1, 0));
        assert_eq!(transport.push_count(), 3);
        assert_eq!(pusher.store().change_log_len(), 0);
    }

    #[test]
    fn protocol_errors_are_not_retried() {
        let (pusher, ledger, transport) = pusher_with_ledger();
        // No response scripted: the mock fails with a protocol error.
        ledger.adjust("SKU-1", 3).unwrap();

        let err = pusher.push_now().unwrap_err();
        assert!(matches!(err, SyncError::Protocol(_)));
        assert_eq!(transport.push_count(), 1);
        assert_eq!(pusher.store().change_log_len(), 1);
    }

    #[test]
    fn clear_is_unscoped_to_the_batch_read() {
        let (pusher, ledger, transport) = pusher_with_ledger();
        transport.set_response(SyncReport::new(1, 1, 0));
        ledger.adjust("SKU-1", 3).unwrap();

        let batch = pusher.build_batch();
        // A mutation lands between batch build and push.
        ledger.adjust("SKU-2", 1).unwrap();
        assert_eq!(batch.len(), 1);

        pusher.push_now().unwrap();
        // The late entry's marker is gone with the rest of the log.
        assert_eq!(pusher.store().change_log_len(), 0);
    }

    #[test]
    fn vanished_products_are_skipped_when_building() {
        let store = Arc::new(StockStore::new());
        store.provision("SKU-1", 10, 1_000);
        let ledger = StockLedger::new(Arc::clone(&store), Arc::new(ManualClock::new(2_000)));
        ledger.adjust("SKU-1", 1).unwrap();

        let pusher = SyncPusher::new(
            Arc::clone(&store),
            Arc::new(MockTransport::new()),
            SyncConfig::default(),
        );
        // The change log references the product; the batch resolves it.
        assert_eq!(pusher.build_batch().len(), 1);
    }

    #[test]
    fn batches_carry_mutation_timestamps() {
        let (pusher, ledger, _transport) = pusher_with_ledger();
        ledger.adjust("SKU-1", 1).unwrap();

        let batch = pusher.build_batch();
        assert_eq!(batch.items[0].updated_at, Some(2_000));
    }
}
