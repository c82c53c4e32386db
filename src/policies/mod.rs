//! Source retry policies.
//!
//! This module groups the knobs that control **how long** the reader waits
//! after a failed read and **when** it gives up.
//!
//! ## Contents
//! - [`BackoffPolicy`] delay per consecutive failure (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization to avoid synchronized retries
//! - [`FailurePolicy`] backoff plus optional breaker threshold
//! - [`FailureTracker`] streak state used by the reader loop
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=10ms, factor=2.0, max=1s, jitter=None.
//! - `FailurePolicy::default()` → default backoff, breaker disabled.

mod backoff;
mod breaker;
mod jitter;

pub use backoff::BackoffPolicy;
pub use breaker::{FailurePolicy, FailureTracker, Verdict};
pub use jitter::JitterPolicy;
