//! # Stockmesh Core
//!
//! Store-node stock state for stockmesh: per-product records under
//! optimistic concurrency control, the reservation state machine, the
//! change outbox consumed by the sync pusher, and the idempotency guard
//! for keyed reservation requests.
//!
//! ## Architecture
//!
//! Every mutation follows the same path: read the current record fresh,
//! compute the new state through a pure plan function, then attempt a
//! conditional write that succeeds only if the stored version is still the
//! one that was read. Losers retry with a fresh read, so concurrent
//! writers on the same product never lose updates; writers on different
//! products never contend beyond the shared map lock.
//!
//! ## Key Invariants
//!
//! - `0 <= allocated <= on_hand` after every successful mutation
//! - A stock write and its change-log append commit as one unit
//! - Versions only move forward, one step per successful write
//! - Failed mutations leave state byte-for-byte unchanged

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod error;
mod ledger;
mod mutator;
mod reservation;
mod store;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use ledger::StockLedger;
pub use mutator::{MutationPlan, OptimisticMutator, RetryPolicy};
pub use reservation::{ReservationLedger, ReservationRequest};
pub use store::{ChangeLogEntry, CommitOutcome, IdempotencyRecord, StockStore};
pub use types::{
    ProductId, ReservationOutcome, ReservationStatus, StockRecord, StockSnapshot, TimestampMs,
};
