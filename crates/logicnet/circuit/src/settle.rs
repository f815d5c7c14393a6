//! Waiting for derived states to catch up with writes.

use std::time::Duration;
use tokio::time::sleep;

/// How long to wait for the service to re-evaluate, and how often to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Pause between setting inputs and the first read.
    pub settle_delay: Duration,
    /// Reads attempted before giving up, the first one included.
    pub max_attempts: u32,
    /// Pause between reads.
    pub backoff: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            max_attempts: 10,
            backoff: Duration::from_secs(1),
        }
    }
}

impl SettlePolicy {
    /// No waiting at all, for services that evaluate synchronously.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Use `delay` for both the settle delay and the backoff.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            settle_delay: delay,
            backoff: delay,
            ..Self::default()
        }
    }

    pub async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
    }

    pub async fn back_off(&self) {
        if !self.backoff.is_zero() {
            sleep(self.backoff).await;
        }
    }
}
