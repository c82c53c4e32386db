//! # Diagnostic notices emitted by a running relay.
//!
//! The [`NoticeKind`] enum classifies what happened inside the pump:
//! - **Lifecycle**: started, stop requested, stopped
//! - **Store**: an event was evicted or rejected
//! - **Delivery**: a subscriber could not take an event
//! - **Source**: read failures, scheduled retries, exhaustion, breaker trips
//!
//! The [`Notice`] struct carries optional metadata (class, subscriber, reason,
//! delay, attempt) depending on the kind.
//!
//! ## Ordering guarantees
//! Each notice has a globally unique, monotonically increasing `seq`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use roundrelay::{EventClass, Notice, NoticeKind};
//!
//! let n = Notice::new(NoticeKind::DeliveryDropped)
//!     .with_class(EventClass::ROUND_START)
//!     .with_subscriber("ui")
//!     .with_reason("full");
//!
//! assert_eq!(n.kind, NoticeKind::DeliveryDropped);
//! assert_eq!(n.subscriber.as_deref(), Some("ui"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::events::EventClass;

/// Global sequence counter for notice ordering.
static NOTICE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of relay notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    // === Lifecycle ===
    /// Both loops were spawned.
    Started,

    /// `stop` was called (or the pump decided to stop on its own).
    ///
    /// Sets:
    /// - `reason`: what triggered the stop
    StopRequested,

    /// Both loops exited.
    Stopped,

    // === Store ===
    /// An older event was discarded to make room in its bin.
    ///
    /// Sets:
    /// - `class`: class of the evicted event
    Evicted,

    /// An event was refused because its class has no bin.
    ///
    /// Sets:
    /// - `class`: the unknown class
    Rejected,

    // === Delivery ===
    /// A subscriber's output was not ready; the event was skipped for it.
    ///
    /// Sets:
    /// - `class`: event class
    /// - `subscriber`: subscription name
    /// - `reason`: `"full"` or `"closed"`
    DeliveryDropped,

    // === Source ===
    /// A read failed with a retryable error.
    ///
    /// Sets:
    /// - `reason`: error message
    /// - `attempt`: consecutive failure count
    SourceFailed,

    /// The next read is delayed after a failure.
    ///
    /// Sets:
    /// - `delay_ms`: delay before the next read
    /// - `attempt`: consecutive failure count
    BackoffScheduled,

    /// The source reported that no more data will arrive.
    ///
    /// Sets:
    /// - `reason`: error message
    SourceExhausted,

    /// Consecutive failures reached the breaker threshold; the relay stops.
    ///
    /// Sets:
    /// - `reason`: last error message
    /// - `attempt`: consecutive failure count
    BreakerTripped,
}

/// Relay notice with optional metadata.
#[derive(Clone, Debug)]
pub struct Notice {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Notice classification.
    pub kind: NoticeKind,

    /// Event class, if applicable.
    pub class: Option<EventClass>,
    /// Subscription name, if applicable.
    pub subscriber: Option<Arc<str>>,
    /// Human-readable reason (errors, drop cause, etc.).
    pub reason: Option<Arc<str>>,
    /// Backoff delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Consecutive failure count.
    pub attempt: Option<u32>,
}

impl Notice {
    /// Creates a notice of the given kind with current timestamp and next sequence number.
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            seq: NOTICE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            class: None,
            subscriber: None,
            reason: None,
            delay_ms: None,
            attempt: None,
        }
    }

    #[inline]
    pub fn with_class(mut self, class: EventClass) -> Self {
        self.class = Some(class);
        self
    }

    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Creates a delivery-dropped notice.
    #[inline]
    pub fn delivery_dropped(subscriber: &Arc<str>, class: EventClass, reason: &'static str) -> Self {
        Notice::new(NoticeKind::DeliveryDropped)
            .with_subscriber(Arc::clone(subscriber))
            .with_class(class)
            .with_reason(reason)
    }

    #[inline]
    pub fn is_delivery_dropped(&self) -> bool {
        matches!(self.kind, NoticeKind::DeliveryDropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Notice::new(NoticeKind::Started);
        let b = Notice::new(NoticeKind::Stopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates() {
        let n = Notice::new(NoticeKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(n.delay_ms, Some(u32::MAX));
    }
}
