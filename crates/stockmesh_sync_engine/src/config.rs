//! Configuration for the sync pusher and scheduler.

use std::time::Duration;

/// Configuration for store-to-central synchronization.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the central node.
    pub central_url: String,
    /// Maximum number of send attempts per push.
    pub max_retries: u32,
    /// Base backoff; attempt `n` sleeps `initial_backoff * n` before the
    /// next attempt. No jitter.
    pub initial_backoff: Duration,
    /// Interval between scheduled pushes.
    pub push_interval: Duration,
    /// Whether scheduled pushes run at all. On-demand pushes ignore this.
    pub enabled: bool,
}

impl SyncConfig {
    /// Creates a configuration pointed at `central_url`.
    pub fn new(central_url: impl Into<String>) -> Self {
        Self {
            central_url: central_url.into(),
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            push_interval: Duration::from_secs(15 * 60),
            enabled: true,
        }
    }

    /// Sets the maximum number of send attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base backoff delay.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Sets the scheduled push interval.
    pub fn with_push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval;
        self
    }

    /// Enables or disables scheduled pushes.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Delay to sleep after a failed attempt (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.initial_backoff * attempt
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://localhost:8081")
    }
}
