//! # Stockmesh Sync Protocol
//!
//! Wire types and JSON codecs for the store-to-central sync protocol.
//!
//! This crate provides:
//! - [`SyncBatch`] / [`BatchItem`] for current-state snapshot batches
//! - [`SyncReport`] for merge outcomes
//! - Store-node request and response bodies ([`AdjustRequest`],
//!   [`ReservationRequest`], [`StockResponse`], [`ReservationResponse`])
//! - JSON encoding/decoding helpers
//!
//! This is a pure protocol crate with no I/O operations. The protocol is
//! current-state reconciliation: a batch carries the latest snapshot per
//! changed product, never a replay of individual mutation events.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod codec;
mod messages;
mod report;

pub use batch::{BatchItem, SyncBatch};
pub use codec::{from_json, to_json, CodecError, CodecResult};
pub use messages::{AdjustRequest, ReservationRequest, ReservationResponse, StockResponse};
pub use report::SyncReport;

/// Wall-clock timestamp in milliseconds since the Unix epoch, as carried
/// on the wire.
pub type TimestampMs = i64;

/// The earliest representable timestamp, substituted for missing values.
pub const EPOCH_MS: TimestampMs = 0;
