//! Periodic push scheduling.
//!
//! The scheduler is an explicit, cancellable timer owned by the process:
//! started at startup, stopped at shutdown. Failures on the scheduled
//! path are logged and swallowed so a flaky central node never terminates
//! the loop; on-demand pushes propagate their errors to the caller
//! instead.

use crate::pusher::SyncPusher;
use crate::transport::SyncTransport;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Drives [`SyncPusher::push_now`] on a fixed interval.
pub struct PushScheduler {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl PushScheduler {
    /// Spawns the scheduler thread for `pusher`.
    ///
    /// The interval and enabled flag come from the pusher's
    /// configuration. A disabled scheduler keeps ticking but never
    /// pushes, matching a sync-disabled store node.
    pub fn start<T: SyncTransport + 'static>(pusher: Arc<SyncPusher<T>>) -> Self {
        let interval = pusher.config().push_interval;
        let enabled = pusher.config().enabled;
        let (shutdown, ticks) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            info!(interval_ms = interval.as_millis() as u64, enabled, "push scheduler started");
            loop {
                match ticks.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        if !enabled {
                            debug!("scheduled push skipped, sync disabled");
                            continue;
                        }
                        if let Err(err) = pusher.push_now() {
                            warn!("scheduled push failed: {err}");
                        }
                    }
                }
            }
            info!("push scheduler stopped");
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops the scheduler and waits for the thread to exit.
    pub fn stop(mut self) {
        self.signal_and_join();
    }

    fn signal_and_join(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PushScheduler {
    fn drop(&mut self) {
        self.signal_and_join();
    }
}
