//! # Stockmesh Sync Server
//!
//! Central node for stockmesh: the last-write-wins merge endpoint and the
//! reconciled stock view behind it.
//!
//! This crate provides:
//! - [`LwwMerger`] applying snapshot batches with LWW semantics
//! - [`RequestHandler`] validating and serving pull and lookup requests
//! - [`CentralServer`], a routing-free facade the HTTP layer wraps
//!
//! ## Key Invariants
//!
//! - Strictly newer timestamps win; ties keep the existing record
//! - A missing incoming timestamp is treated as the earliest value
//! - A batch merges atomically: readers see none or all of its effects
//! - `received == applied + skipped` for every merge

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handler;
mod merge;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use merge::{CentralStockRecord, LwwMerger};
pub use server::CentralServer;
