//! # Backoff between failed source reads.
//!
//! [`BackoffPolicy`] turns "how many reads in a row have failed" into a delay
//! before the next read. The n-th consecutive failure (1-based) waits
//! `first × factor^(n-1)`, clamped to `max`, then jittered.
//!
//! The base never depends on a previously jittered value, so delays cannot
//! drift downwards over a long failure streak.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use roundrelay::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(10),
//!     max: Duration::from_millis(500),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.delay_for(1, None), Duration::from_millis(10));
//! assert_eq!(backoff.delay_for(3, None), Duration::from_millis(40));
//! assert_eq!(backoff.delay_for(20, None), Duration::from_millis(500));
//! ```

use std::time::Duration;

use super::jitter::JitterPolicy;

/// Delay schedule for consecutive source failures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failure of a streak.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth per additional failure (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 10ms`, `factor = 2.0`, `max = 1s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(10),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Immediate retry, matching a source that is expected to recover at once.
    pub const fn immediate() -> Self {
        Self {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay before the next read after `failures` consecutive failures.
    ///
    /// `prev` is the delay used for the previous failure of the streak
    /// (consulted by decorrelated jitter only). `failures == 0` yields zero.
    pub fn delay_for(&self, failures: u32, prev: Option<Duration>) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exp = (failures - 1).min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base, prev, self.first, self.max)
    }
}
