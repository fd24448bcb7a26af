//! Optimistic-concurrency wrapper around stock mutations.
//!
//! Every stock mutation goes through [`OptimisticMutator::mutate`]: read
//! the current record fresh, compute the new state through a pure plan
//! function, then attempt a conditional write against the version that was
//! read. A losing writer retries from the read with a short linear backoff.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::store::{ChangeLogEntry, CommitOutcome, IdempotencyRecord, StockStore};
use crate::types::StockRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for version conflicts.
///
/// The delay grows linearly with the attempt number; there is no jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,
    /// Base delay; attempt `n` sleeps `base_delay * n` before retrying.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(50),
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay to sleep after a failed attempt (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// The new state a plan function wants to commit.
///
/// `updated_at` and the version bump are supplied by the mutator; the plan
/// only decides quantities and an optional idempotency record.
#[derive(Debug, Clone)]
pub struct MutationPlan {
    /// New on-hand quantity.
    pub on_hand: i64,
    /// New allocated quantity.
    pub allocated: i64,
    /// Idempotency record to store in the same commit, if any.
    pub idempotency: Option<IdempotencyRecord>,
}

impl MutationPlan {
    /// Starts a plan from the quantities of the record that was read.
    pub fn from_record(record: &StockRecord) -> Self {
        Self {
            on_hand: record.on_hand,
            allocated: record.allocated,
            idempotency: None,
        }
    }

    /// Attaches an idempotency record to the commit.
    pub fn with_idempotency(mut self, record: IdempotencyRecord) -> Self {
        self.idempotency = Some(record);
        self
    }
}

/// Runs stock mutations under optimistic concurrency control.
pub struct OptimisticMutator {
    store: Arc<StockStore>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
}

impl OptimisticMutator {
    /// Creates a mutator over `store` with the default retry policy.
    pub fn new(store: Arc<StockStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The store this mutator writes to.
    pub fn store(&self) -> &Arc<StockStore> {
        &self.store
    }

    /// The clock used to stamp mutations.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Applies `plan` to the current record of `product_id` under a
    /// conditional write, retrying on version conflicts.
    ///
    /// The plan function may run once per attempt against a fresh
    /// snapshot, so it must not depend on side effects of earlier
    /// invocations. Plan errors abort immediately with state untouched.
    pub fn mutate<F>(&self, product_id: &str, mut plan: F) -> CoreResult<StockRecord>
    where
        F: FnMut(&StockRecord) -> CoreResult<MutationPlan>,
    {
        for attempt in 1..=self.policy.max_attempts {
            let current = self.store.get(product_id).ok_or_else(|| CoreError::NotFound {
                product_id: product_id.to_string(),
            })?;
            let planned = plan(&current)?;
            debug_assert!(planned.allocated >= 0 && planned.allocated <= planned.on_hand);

            let now = self.clock.now_ms();
            let next = StockRecord {
                product_id: current.product_id.clone(),
                on_hand: planned.on_hand,
                allocated: planned.allocated,
                updated_at: now,
                version: current.version,
            };
            let entry = ChangeLogEntry::new(product_id, now);

            match self
                .store
                .try_commit(current.version, next, entry, planned.idempotency)
            {
                CommitOutcome::Committed(record) => return Ok(record),
                CommitOutcome::VersionConflict => {
                    if attempt < self.policy.max_attempts {
                        let delay = self.policy.delay_for_attempt(attempt);
                        debug!(
                            product_id,
                            attempt,
                            backoff_ms = delay.as_millis() as u64,
                            "version conflict, retrying with fresh read"
                        );
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        warn!(
            product_id,
            attempts = self.policy.max_attempts,
            "optimistic retries exhausted"
        );
        Err(CoreError::ConcurrencyExhausted {
            product_id: product_id.to_string(),
            attempts: self.policy.max_attempts,
        })
    }
}
