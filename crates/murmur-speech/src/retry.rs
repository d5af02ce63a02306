//! Network-error retry policy.
//!
//! Transient network failures get a bounded number of fixed-delay restarts.
//! The counter is shared by consecutive sessions of one recording attempt and
//! resets on a final transcript, on exhaustion, and on explicit stop.

use std::time::Duration;

use murmur_core::config::SpeechConfig;

use crate::session::SessionId;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How many consecutive network errors are tolerated and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            max_attempts: config.max_network_retries.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Whether the attempt number (1-based, already counted) may still restart.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Consecutive network-error counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryCounter {
    count: u32,
}

impl RetryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more failure and return the new count.
    pub fn increment(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn get(&self) -> u32 {
        self.count
    }
}

/// A restart scheduled after a network error.
///
/// The ticket only takes effect if, when it fires, its session is still the
/// active one and no newer ticket or engine start has replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRetry {
    pub session: SessionId,
    pub attempt: u32,
    pub delay: Duration,
    pub(crate) generation: u64,
}
