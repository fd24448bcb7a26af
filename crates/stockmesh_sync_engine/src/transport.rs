//! Transport abstraction for pushing batches to central.

use crate::error::{SyncError, SyncResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use stockmesh_sync_protocol::{SyncBatch, SyncReport};

/// A sync transport delivers a snapshot batch to the central merge
/// endpoint and returns its report.
///
/// This trait abstracts the network layer, allowing different
/// implementations (HTTP, in-process loopback, mock for testing).
pub trait SyncTransport: Send + Sync {
    /// Sends a batch to central and returns the merge report.
    fn push_batch(&self, batch: &SyncBatch) -> SyncResult<SyncReport>;
}

/// A mock transport for testing.
///
/// Records every batch it receives; can be scripted to fail a number of
/// calls before succeeding.
#[derive(Debug, Default)]
pub struct MockTransport {
    response: Mutex<Option<SyncReport>>,
    pushed: Mutex<Vec<SyncBatch>>,
    fail_remaining: AtomicU32,
}

impl MockTransport {
    /// Creates a mock with no scripted response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the report returned by successful pushes.
    pub fn set_response(&self, report: SyncReport) {
        *self.response.lock() = Some(report);
    }

    /// Makes the next `count` pushes fail with a network error.
    pub fn fail_next(&self, count: u32) {
        self.fail_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of pushes attempted against this transport.
    pub fn push_count(&self) -> usize {
        self.pushed.lock().len()
    }

    /// Copies out the batches received so far, failed attempts included.
    pub fn pushed_batches(&self) -> Vec<SyncBatch> {
        self.pushed.lock().clone()
    }
}

impl SyncTransport for MockTransport {
    fn push_batch(&self, batch: &SyncBatch) -> SyncResult<SyncReport> {
        self.pushed.lock().push(batch.clone());

        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SyncError::network("mock transport failure"));
        }

        self.response
            .lock()
            .clone()
            .ok_or_else(|| SyncError::Protocol("no mock response set".into()))
    }
}
