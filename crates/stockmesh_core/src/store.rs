//! In-memory keyed store for stock records, the change outbox and the
//! idempotency guard.
//!
//! All three tables live behind one lock so a conditional stock write, its
//! change-log append and an optional idempotency insert commit as a single
//! unit: either everything lands or nothing does.

use crate::types::{ProductId, StockRecord, TimestampMs};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// A dirty marker recorded on every successful store-side mutation.
///
/// Entries are not deduplicated at write time; the pusher reduces them to
/// the distinct product set when building a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogEntry {
    /// Unique entry id.
    pub id: Uuid,
    /// Product that changed.
    pub product_id: ProductId,
    /// Timestamp of the mutation that produced the entry.
    pub updated_at: TimestampMs,
}

impl ChangeLogEntry {
    /// Creates an entry for a mutation of `product_id` at `updated_at`.
    pub fn new(product_id: impl Into<ProductId>, updated_at: TimestampMs) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            updated_at,
        }
    }
}

/// Dedup record for reservation requests carrying an idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    /// Unique record id.
    pub id: Uuid,
    /// Client-supplied token. Unique across the table.
    pub idempotency_key: String,
    /// Hash of the request payload: `order_id:product_id:quantity`.
    pub request_hash: String,
    /// Timestamp of the first execution.
    pub created_at: TimestampMs,
}

impl IdempotencyRecord {
    /// Creates a record for a first-time execution of a keyed request.
    pub fn new(
        idempotency_key: impl Into<String>,
        request_hash: impl Into<String>,
        created_at: TimestampMs,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            idempotency_key: idempotency_key.into(),
            request_hash: request_hash.into(),
            created_at,
        }
    }
}

/// Outcome of a conditional write.
///
/// Conflicts are modeled as a tagged value rather than an error so the
/// mutator branches on them explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The version matched; the record as stored, with its bumped version.
    Committed(StockRecord),
    /// Another writer bumped the version between the read and the write.
    VersionConflict,
}

#[derive(Debug, Default)]
struct StoreInner {
    stocks: HashMap<ProductId, StockRecord>,
    change_log: Vec<ChangeLogEntry>,
    idempotency: HashMap<String, IdempotencyRecord>,
}

/// Shared mutable stock state for one store node.
///
/// Stands in for the durable keyed store: a stock table keyed by product,
/// an append-only change log and an idempotency table keyed by token.
#[derive(Debug, Default)]
pub struct StockStore {
    inner: RwLock<StoreInner>,
}

impl StockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a product with an initial on-hand quantity.
    ///
    /// Provisioning is idempotent: an existing record is left untouched
    /// and returned as-is.
    pub fn provision(
        &self,
        product_id: impl Into<ProductId>,
        on_hand: i64,
        updated_at: TimestampMs,
    ) -> StockRecord {
        let product_id = product_id.into();
        let mut inner = self.inner.write();
        inner
            .stocks
            .entry(product_id.clone())
            .or_insert_with(|| StockRecord {
                product_id,
                on_hand,
                allocated: 0,
                updated_at,
                version: 1,
            })
            .clone()
    }

    /// Returns a copy of the current record for `product_id`.
    pub fn get(&self, product_id: &str) -> Option<StockRecord> {
        self.inner.read().stocks.get(product_id).cloned()
    }

    /// Number of provisioned products.
    pub fn len(&self) -> usize {
        self.inner.read().stocks.len()
    }

    /// Returns true if no product has been provisioned.
    pub fn is_empty(&self) -> bool {
        self.inner.read().stocks.is_empty()
    }

    /// Conditionally writes `record`, appending `entry` and optionally an
    /// idempotency record in the same unit.
    ///
    /// The write succeeds only if the stored version still equals
    /// `expected_version`; on success the stored version is bumped. On a
    /// conflict nothing is written, the change log included.
    pub fn try_commit(
        &self,
        expected_version: u64,
        record: StockRecord,
        entry: ChangeLogEntry,
        idempotency: Option<IdempotencyRecord>,
    ) -> CommitOutcome {
        let mut inner = self.inner.write();
        let stored = match inner.stocks.get_mut(&record.product_id) {
            Some(stored) => stored,
            None => return CommitOutcome::VersionConflict,
        };
        if stored.version != expected_version {
            return CommitOutcome::VersionConflict;
        }

        stored.on_hand = record.on_hand;
        stored.allocated = record.allocated;
        stored.updated_at = record.updated_at;
        stored.version = expected_version + 1;
        let committed = stored.clone();

        inner.change_log.push(entry);
        if let Some(idem) = idempotency {
            // Unique constraint on the key: first writer wins.
            inner
                .idempotency
                .entry(idem.idempotency_key.clone())
                .or_insert(idem);
        }

        CommitOutcome::Committed(committed)
    }

    /// Looks up the idempotency record for a client token.
    pub fn find_idempotency(&self, key: &str) -> Option<IdempotencyRecord> {
        self.inner.read().idempotency.get(key).cloned()
    }

    /// Number of change-log entries waiting for a push.
    pub fn change_log_len(&self) -> usize {
        self.inner.read().change_log.len()
    }

    /// Copies out the pending change-log entries.
    pub fn change_log_entries(&self) -> Vec<ChangeLogEntry> {
        self.inner.read().change_log.clone()
    }

    /// Reduces the change log to the distinct set of changed products.
    pub fn distinct_changed_products(&self) -> Vec<ProductId> {
        let inner = self.inner.read();
        let distinct: BTreeSet<&ProductId> =
            inner.change_log.iter().map(|e| &e.product_id).collect();
        distinct.into_iter().cloned().collect()
    }

    /// Bulk-deletes the entire change log.
    ///
    /// Unscoped: entries appended after the caller read the log are
    /// deleted too.
    pub fn clear_change_log(&self) {
        self.inner.write().change_log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioned() -> StockStore {
        let store = StockStore::new();
        store.provision("SKU-1", 10, 1_000);
        store
    }

    #[test]
    fn provision_and_get() {
        let store = provisioned();
        let record = store.get("SKU-1").unwrap();
        assert_eq!(record.on_hand, 10);
        assert_eq!(record.allocated, 0);
        assert_eq!(record.version, 1);
        assert!(store.get("SKU-404").is_none());
    }

    #[test]
    fn provision_is_idempotent() {
        let store = provisioned();
        let again = store.provision("SKU-1", 99, 2_000);
        assert_eq!(again.on_hand, 10);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn commit_bumps_version_and_appends_log() {
        let store = provisioned();
        let mut record = store.get("SKU-1").unwrap();
        record.on_hand = 15;
        record.updated_at = 2_000;

        let outcome = store.try_commit(1, record, ChangeLogEntry::new("SKU-1", 2_000), None);
        match outcome {
            CommitOutcome::Committed(committed) => {
                assert_eq!(committed.on_hand, 15);
                assert_eq!(committed.version, 2);
            }
            CommitOutcome::VersionConflict => panic!("expected commit"),
        }
        assert_eq!(store.change_log_len(), 1);
        assert_eq!(store.get("SKU-1").unwrap().version, 2);

        let entries = store.change_log_entries();
        assert_eq!(entries[0].product_id, "SKU-1");
        assert_eq!(entries[0].updated_at, 2_000);
    }

    #[test]
    fn stale_version_conflicts_without_side_effects() {
        let store = provisioned();
        let mut record = store.get("SKU-1").unwrap();
        record.on_hand = 15;

        let outcome = store.try_commit(7, record, ChangeLogEntry::new("SKU-1", 2_000), None);
        assert_eq!(outcome, CommitOutcome::VersionConflict);
        assert_eq!(store.change_log_len(), 0);
        assert_eq!(store.get("SKU-1").unwrap().on_hand, 10);
    }

    #[test]
    fn unknown_product_conflicts() {
        let store = StockStore::new();
        let record = StockRecord {
            product_id: "SKU-404".into(),
            on_hand: 1,
            allocated: 0,
            updated_at: 0,
            version: 1,
        };
        let outcome = store.try_commit(1, record, ChangeLogEntry::new("SKU-404", 0), None);
        assert_eq!(outcome, CommitOutcome::VersionConflict);
    }

    #[test]
    fn idempotency_written_with_commit() {
        let store = provisioned();
        let mut record = store.get("SKU-1").unwrap();
        record.allocated = 3;

        let idem = IdempotencyRecord::new("key-1", "ord:SKU-1:3", 2_000);
        store.try_commit(1, record, ChangeLogEntry::new("SKU-1", 2_000), Some(idem));

        let found = store.find_idempotency("key-1").unwrap();
        assert_eq!(found.request_hash, "ord:SKU-1:3");
        assert!(store.find_idempotency("key-2").is_none());
    }

    #[test]
    fn idempotency_key_is_unique() {
        let store = provisioned();
        for attempt in 0..2 {
            let mut record = store.get("SKU-1").unwrap();
            let expected = record.version;
            record.allocated += 1;
            let idem = IdempotencyRecord::new("key-1", format!("hash-{attempt}"), 2_000);
            store.try_commit(
                expected,
                record,
                ChangeLogEntry::new("SKU-1", 2_000),
                Some(idem),
            );
        }
        assert_eq!(store.find_idempotency("key-1").unwrap().request_hash, "hash-0");
    }

    #[test]
    fn distinct_products_deduplicates_log() {
        let store = StockStore::new();
        store.provision("SKU-1", 10, 0);
        store.provision("SKU-2", 10, 0);

        for product in ["SKU-1", "SKU-2", "SKU-1"] {
            let record = store.get(product).unwrap();
            let version = record.version;
            store.try_commit(version, record, ChangeLogEntry::new(product, 1_000), None);
        }

        assert_eq!(store.change_log_len(), 3);
        assert_eq!(store.distinct_changed_products(), vec!["SKU-1", "SKU-2"]);
    }

    #[test]
    fn clear_change_log_is_unconditional() {
        let store = provisioned();
        let record = store.get("SKU-1").unwrap();
        store.try_commit(1, record, ChangeLogEntry::new("SKU-1", 2_000), None);

        store.clear_change_log();
        assert_eq!(store.change_log_len(), 0);
        assert!(store.distinct_changed_products().is_empty());
    }
}
