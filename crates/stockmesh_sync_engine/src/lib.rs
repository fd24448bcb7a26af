//! # Stockmesh Sync Engine
//!
//! Store-side synchronization for stockmesh.
//!
//! This crate provides:
//! - [`SyncPusher`] building snapshot batches from the change outbox
//! - Retry with linear backoff on network failures
//! - [`SyncTransport`] / [`HttpClient`] transport abstractions
//! - [`PushScheduler`], a cancellable periodic push timer
//! - [`StoreApi`], the routing-free request surface of a store node
//!
//! ## Architecture
//!
//! The engine implements **current-state reconciliation**: the outbox is
//! a set of dirty markers, and each push carries one fresh snapshot per
//! distinct changed product. Conflicts are resolved on the central side
//! by last-write-wins; the store never waits for acknowledgement of
//! individual mutations.
//!
//! ## Key Invariants
//!
//! - An empty outbox produces no network traffic
//! - The outbox is cleared only after a successful push
//! - A failed push leaves the outbox intact for the next attempt
//! - The scheduled loop survives any push failure

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod config;
mod error;
mod http;
mod pusher;
mod scheduler;
mod transport;

pub use api::{ApiError, ApiResult, StoreApi};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpTransport, LoopbackClient, LoopbackServer};
pub use pusher::SyncPusher;
pub use scheduler::PushScheduler;
pub use transport::{MockTransport, SyncTransport};
