//! Poll policy: decides backoff delays between correlation queries.

use std::time::Duration;

/// How long a reader waits for the stages of a trace to land in the store.
///
/// Delays grow exponentially up to `max_delay`; after `max_attempts` queries
/// the reader gives up and returns what it has seen.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay after the first unsatisfied query.
    pub base_delay: Duration,

    /// Backoff multiplier for exponential backoff.
    pub multiplier: f64,

    /// Upper bound for a single delay.
    pub max_delay: Duration,

    /// Number of queries issued before giving up (at least one query is always issued).
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(base_delay: Duration, multiplier: f64, max_attempts: u32) -> Self {
        Self {
            base_delay,
            multiplier,
            max_delay: Duration::from_secs(5),
            max_attempts,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before query number `attempts + 1`.
    ///
    /// delay = base_delay * multiplier^(attempts - 1), capped at max_delay
    ///
    /// Example with base_delay=100ms, multiplier=2.0:
    /// - attempt 1: 100ms
    /// - attempt 2: 200ms
    /// - attempt 3: 400ms
    ///
    /// A multiplier below zero is treated as zero.
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let exponent = attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_secs = base_secs * self.multiplier.max(0.0).powi(exponent);
        if !delay_secs.is_finite() || delay_secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        if delay_secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(delay_secs)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), 2.0, 8)
    }
}
