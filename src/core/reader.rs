//! # Reader loop: source → store.
//!
//! ```text
//! loop {
//!   ├─► stop requested?                     → exit (Stopped)
//!   ├─► source.read(child token)
//!   │     ├─ Ok(ev)            → store.insert(ev), wake dispatcher, reset streak
//!   │     ├─ Err(Canceled)     → re-check stop (counts as a failure if not stopping)
//!   │     ├─ Err(!retryable)   → publish SourceExhausted, exit (Exhausted)
//!   │     └─ Err(retryable)    → FailureTracker::failure()
//!   │            ├─ Retry      → publish BackoffScheduled, sleep (cancellable)
//!   │            └─ Trip       → publish BreakerTripped, exit (Tripped)
//! }
//! ```
//!
//! ## Rules
//! - Never pre-empts an in-flight read; stop latency is bounded by the source.
//! - Errors never escape the loop except as a [`ReaderExit`] reason.

use std::sync::Arc;

use tokio::{select, time};

use crate::error::SourceError;
use crate::notices::{Notice, NoticeKind};
use crate::policies::{FailurePolicy, FailureTracker, Verdict};
use crate::source::SourceRef;

use super::pump::Pump;

/// Why the reader loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReaderExit {
    /// Observed a stop request.
    Stopped,
    /// The source reported that no more data will arrive.
    Exhausted,
    /// The failure breaker tripped.
    Tripped { failures: u32, last: String },
}

pub(crate) async fn read_loop(pump: Arc<Pump>, source: SourceRef, policy: FailurePolicy) -> ReaderExit {
    let mut tracker = FailureTracker::new(policy);

    loop {
        if pump.token.is_cancelled() {
            return ReaderExit::Stopped;
        }

        let err = match source.read(pump.token.child_token()).await {
            Ok(event) => {
                tracker.success();
                pump.accept(event);
                continue;
            }
            Err(SourceError::Canceled) if pump.token.is_cancelled() => continue,
            Err(err) => err,
        };

        if !err.is_retryable() {
            tracing::info!(source = source.name(), error = %err, "source exhausted");
            pump.bus
                .publish(Notice::new(NoticeKind::SourceExhausted).with_reason(err.to_string()));
            pump.source_done.cancel();
            return ReaderExit::Exhausted;
        }

        pump.stats.record_source_failure();
        tracing::warn!(source = source.name(), error = %err, "source read failed");

        match tracker.failure() {
            Verdict::Retry { delay, attempt } => {
                pump.bus.publish(
                    Notice::new(NoticeKind::SourceFailed)
                        .with_reason(err.to_string())
                        .with_attempt(attempt),
                );
                if delay.is_zero() {
                    // A source that fails without awaiting must not starve the dispatcher.
                    tokio::task::yield_now().await;
                    continue;
                }
                pump.bus.publish(
                    Notice::new(NoticeKind::BackoffScheduled)
                        .with_delay(delay)
                        .with_attempt(attempt),
                );

                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = pump.token.cancelled() => return ReaderExit::Stopped,
                }
            }
            Verdict::Trip { failures } => {
                let last = err.to_string();
                tracing::error!(source = source.name(), failures, error = %last, "failure breaker tripped");
                pump.bus.publish(
                    Notice::new(NoticeKind::BreakerTripped)
                        .with_reason(last.clone())
                        .with_attempt(failures),
                );
                return ReaderExit::Tripped { failures, last };
            }
        }
    }
}
