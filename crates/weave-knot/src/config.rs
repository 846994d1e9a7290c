//! Configuration for operations that wait on the ledger.

use std::time::Duration;

/// Polling parameters for [`crate::wait_for_loom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationConfig {
    /// Delay between two queries.
    pub poll_interval: Duration,
    /// Total time allowed before giving up.
    pub timeout: Duration,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ConfirmationConfig {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }
}
