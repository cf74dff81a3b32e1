//! Crash-only supervision of the long-polling loop.
//!
//! A transport error — including the 409 conflict raised when a second
//! instance polls the same token — is logged and the loop restarts after a
//! fixed backoff. No exponential backoff, no error budget; a clean return
//! means the loop was deliberately stopped and ends supervision, and only
//! process termination stops it otherwise. `max_attempts` exists so tests
//! can run a bounded variant.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use teloxide::{ApiError, RequestError};
use tracing::{error, info, warn};

/// Fixed-backoff retry policy for the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay between restarts.
    pub backoff: Duration,
    /// Restart budget; `None` means retry forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(10),
            max_attempts: None,
        }
    }
}

/// Run `op` under the given policy, restarting it every time it fails.
///
/// Returns when `op` completes cleanly (deliberate shutdown) or when
/// `max_attempts` is exhausted.
pub async fn supervise<F, Fut>(policy: RetryPolicy, mut op: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut attempts: u32 = 0;
    loop {
        match op().await {
            Ok(()) => {
                info!("polling loop stopped cleanly, shutting down");
                return;
            }
            Err(e) if is_conflict(&e) => {
                warn!("another instance is polling this bot, retrying after backoff");
            }
            Err(e) => error!("polling loop failed: {e:#}, retrying after backoff"),
        }

        attempts = attempts.saturating_add(1);
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return;
        }
        tokio::time::sleep(policy.backoff).await;
    }
}

/// Telegram answers 409 when another process long-polls the same token; it
/// surfaces as `TerminatedByOtherGetUpdates`. The open question of giving
/// conflicts their own backoff is resolved as "no": conflicts only get a
/// distinct log line, the policy is unified.
fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<RequestError>(),
        Some(RequestError::Api(ApiError::TerminatedByOtherGetUpdates))
    )
}
