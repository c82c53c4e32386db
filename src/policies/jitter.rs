//! # Jitter for source retry delays.
//!
//! [`JitterPolicy`] randomizes backoff delays so several relays reading from
//! one flapping upstream do not retry in lockstep.
//!
//! - [`JitterPolicy::None`] exact delay
//! - [`JitterPolicy::Full`] random in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`] random in `[floor, prev * 3]`, capped at `max`

use std::time::Duration;

use rand::Rng;

/// Randomization applied on top of a computed backoff delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// Use the computed delay as-is.
    #[default]
    None,
    /// Anywhere between zero and the computed delay.
    Full,
    /// At least half of the computed delay.
    Equal,
    /// Grows from the previous delay instead of the computed one.
    Decorrelated,
}

impl JitterPolicy {
    /// Jitters `delay`.
    ///
    /// `prev` is the delay used for the previous failure (`None` on the first
    /// one); only `Decorrelated` looks at it, together with `floor` and `max`.
    pub fn apply(
        self,
        delay: Duration,
        prev: Option<Duration>,
        floor: Duration,
        max: Duration,
    ) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => random_ms(0, millis(delay)),
            JitterPolicy::Equal => {
                let half = millis(delay) / 2;
                random_ms(half, half * 2)
            }
            JitterPolicy::Decorrelated => {
                let floor_ms = millis(floor.min(max));
                let prev_ms = prev.map_or(floor_ms, millis);
                let upper = prev_ms.saturating_mul(3).min(millis(max)).max(floor_ms);
                random_ms(floor_ms, upper)
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

fn random_ms(lo: u64, hi: u64) -> Duration {
    if lo >= hi {
        return Duration::from_millis(lo);
    }
    Duration::from_millis(rand::rng().random_range(lo..=hi))
}
