use std::time::Duration;

use log::{debug, warn};
use trawl_runtime::{READY_ATTEMPTS, READY_DELAY};

use crate::{error::StoreError, store::IndexStore};

/// Bounded, fixed-delay polling of `IndexStore::ping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for ReadyPolicy {
    fn default() -> Self {
        Self {
            attempts: READY_ATTEMPTS,
            delay: READY_DELAY,
        }
    }
}

/// Wait for `store` to answer a ping.
///
/// Returns `false` when every attempt failed. That is not an error: the
/// caller proceeds anyway and individual operations fail on their own if
/// the store really is unavailable.
pub async fn await_ready<S: IndexStore + ?Sized>(store: &S, policy: ReadyPolicy) -> bool {
    for attempt in 1..=policy.attempts {
        match store.ping().await {
            Ok(()) => {
                debug!("store ready after {attempt} attempt(s)");
                return true;
            }
            Err(StoreError::NotReady) => {
                debug!("store not ready (attempt {attempt}/{})", policy.attempts);
            }
            Err(e) => {
                warn!("store ping failed (attempt {attempt}/{}): {e}", policy.attempts);
            }
        }

        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    warn!(
        "store still not ready after {} attempts; continuing anyway",
        policy.attempts
    );
    false
}

#[cfg(test)]
#[path = "ready_tests.rs"]
mod tests;
