//! Bounded wait for a loom deployment to become visible.

use async_trait::async_trait;
use tokio::time::{sleep, timeout_at, Instant};

use weave_core::LoomId;

use crate::config::ConfirmationConfig;
use crate::error::{KnotError, Result};

/// Source of truth for loom deployment status, usually a node client.
#[async_trait]
pub trait LoomQuery: Send + Sync {
    /// Whether the loom is deployed. Errors are reported as text and retried.
    async fn is_loom_deployed(&self, loom_id: &LoomId) -> std::result::Result<bool, String>;
}

/// Poll `query` until the loom is deployed or the configured timeout passes.
///
/// Returns the number of queries made. Query errors and queries that outlive
/// the deadline count as "not yet" and never extend the wait.
pub async fn wait_for_loom<Q: LoomQuery + ?Sized>(
    query: &Q,
    loom_id: &LoomId,
    config: &ConfirmationConfig,
) -> Result<u32> {
    let start = Instant::now();
    let deadline = start + config.timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match timeout_at(deadline, query.is_loom_deployed(loom_id)).await {
            Ok(Ok(true)) => {
                tracing::debug!(loom = %loom_id, attempts, "loom deployed");
                return Ok(attempts);
            }
            Ok(Ok(false)) => {
                tracing::debug!(loom = %loom_id, attempt = attempts, "loom not yet deployed");
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    loom = %loom_id,
                    attempt = attempts,
                    error = %e,
                    "loom query failed"
                );
            }
            Err(_) => {
                tracing::debug!(loom = %loom_id, attempt = attempts, "loom query hit deadline");
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(KnotError::ConfirmationTimeout {
                loom_id: loom_id.to_hex(),
                attempts,
                waited_ms: u64::try_from(now.duration_since(start).as_millis())
                    .unwrap_or(u64::MAX),
            });
        }
        sleep(config.poll_interval.min(deadline - now)).await;
    }
}
