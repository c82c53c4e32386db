//! # Failure policy for the reader loop.
//!
//! [`FailurePolicy`] combines a [`BackoffPolicy`] with an optional breaker
//! threshold. [`FailureTracker`] applies it to a live failure streak.
//!
//! ```text
//! read() ─ Ok ────────────► success()            streak = 0
//!        └ Err(Transient) ─► failure()
//!              ├─ streak < trip_after ─► Retry { delay, attempt }
//!              └─ streak = trip_after ─► Trip  { failures }
//! ```

use std::time::Duration;

use super::backoff::BackoffPolicy;

/// How the reader reacts to transient source failures.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FailurePolicy {
    /// Delay schedule between failed reads.
    pub backoff: BackoffPolicy,
    /// Stop the relay after this many consecutive failures (`None` = never).
    pub trip_after: Option<u32>,
}

/// Decision for the reader after a failed read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Sleep `delay`, then read again. `attempt` is the streak length.
    Retry { delay: Duration, attempt: u32 },
    /// Give up; the source failed `failures` times in a row.
    Trip { failures: u32 },
}

/// Consecutive-failure state of one reader.
#[derive(Debug)]
pub struct FailureTracker {
    policy: FailurePolicy,
    streak: u32,
    prev_delay: Option<Duration>,
}

impl FailureTracker {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            streak: 0,
            prev_delay: None,
        }
    }

    /// Resets the streak after a successful read.
    pub fn success(&mut self) {
        self.streak = 0;
        self.prev_delay = None;
    }

    /// Records one more failure and decides what to do next.
    pub fn failure(&mut self) -> Verdict {
        self.streak = self.streak.saturating_add(1);

        if let Some(limit) = self.policy.trip_after {
            if self.streak >= limit.max(1) {
                return Verdict::Trip {
                    failures: self.streak,
                };
            }
        }

        let delay = self.policy.backoff.delay_for(self.streak, self.prev_delay);
        self.prev_delay = Some(delay);
        Verdict::Retry {
            delay,
            attempt: self.streak,
        }
    }

    #[inline]
    pub fn streak(&self) -> u32 {
        self.streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::JitterPolicy;

    fn policy(trip_after: Option<u32>) -> FailurePolicy {
        FailurePolicy {
            backoff: BackoffPolicy {
                first: Duration::from_millis(5),
                max: Duration::from_millis(20),
                factor: 2.0,
                jitter: JitterPolicy::None,
            },
            trip_after,
        }
    }

    #[test]
    fn test_retries_with_growing_delay() {
        let mut t = FailureTracker::new(policy(None));
        let delays: Vec<Verdict> = (0..4).map(|_| t.failure()).collect();
        assert_eq!(
            delays,
            vec![
                Verdict::Retry { delay: Duration::from_millis(5), attempt: 1 },
                Verdict::Retry { delay: Duration::from_millis(10), attempt: 2 },
                Verdict::Retry { delay: Duration::from_millis(20), attempt: 3 },
                Verdict::Retry { delay: Duration::from_millis(20), attempt: 4 },
            ]
        );
    }

    #[test]
    fn test_success_resets_streak() {
        let mut t = FailureTracker::new(policy(Some(3)));
        t.failure();
        t.failure();
        t.success();
        assert_eq!(t.streak(), 0);
        assert!(matches!(t.failure(), Verdict::Retry { attempt: 1, .. }));
    }

    #[test]
    fn test_trips_at_threshold() {
        let mut t = FailureTracker::new(policy(Some(3)));
        assert!(matches!(t.failure(), Verdict::Retry { .. }));
        assert!(matches!(t.failure(), Verdict::Retry { .. }));
        assert_eq!(t.failure(), Verdict::Trip { failures: 3 });
    }

    #[test]
    fn test_zero_threshold_trips_on_first_failure() {
        let mut t = FailureTracker::new(policy(Some(0)));
        assert_eq!(t.failure(), Verdict::Trip { failures: 1 });
    }
}
