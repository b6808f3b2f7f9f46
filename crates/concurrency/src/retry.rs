//! Retry policy for conflicted conditional commits
//!
//! Both the write path and the destroy path run a bounded loop. Backoff is
//! off by default (`base_delay_ms = 0`): a conflicted attempt is retried
//! immediately. Deployments with hot sessions can enable exponential backoff
//! with optional full jitter.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default attempt bound for writes and destroys
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Bounded retry with optional exponential backoff
///
/// # Example
///
/// ```
/// use occ_session_concurrency::RetryConfig;
///
/// let config = RetryConfig::new()
///     .with_max_attempts(5)
///     .with_base_delay_ms(2)
///     .with_max_delay_ms(50);
/// assert_eq!(config.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay after the first conflict in milliseconds, doubled per attempt (0 = no sleep)
    pub base_delay_ms: u64,
    /// Upper bound for the delay in milliseconds
    pub max_delay_ms: u64,
    /// Sleep a uniformly random duration up to the computed delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a RetryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt bound
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set base delay for exponential backoff
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set maximum delay between attempts
    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Enable or disable full jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before the attempt following the `conflicts`-th conflict (1-based)
    pub(crate) fn calculate_delay(&self, conflicts: u32) -> Duration {
        if self.base_delay_ms == 0 || conflicts == 0 {
            return Duration::ZERO;
        }
        let shift = (conflicts - 1).min(63);
        let multiplier = 1u64 << shift;
        let cap = self.max_delay_ms.max(self.base_delay_ms);
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(cap);
        Duration::from_millis(delay_ms)
    }

    /// Sleep according to the policy
    pub(crate) fn backoff(&self, conflicts: u32) {
        let delay = self.calculate_delay(conflicts);
        if delay.is_zero() {
            return;
        }
        let delay = if self.jitter {
            let max = delay.as_micros() as u64;
            Duration::from_micros(rand::thread_rng().gen_range(0..=max))
        } else {
            delay
        };
        std::thread::sleep(delay);
    }
}
