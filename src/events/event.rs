//! # Relayed event: a class tag plus an opaque payload.
//!
//! Events are immutable once built. The payload sits behind an `Arc` so the
//! dispatcher can hand the same event to many subscribers without copying bytes.
//!
//! ## Example
//! ```rust
//! use roundrelay::{Event, EventClass};
//!
//! let ev = Event::new(EventClass::ROUND_START, "round-7");
//! assert_eq!(ev.class(), EventClass::ROUND_START);
//! assert_eq!(ev.payload(), b"round-7");
//! assert_eq!(ev, Event::round_start("round-7"));
//! ```

use std::fmt;
use std::sync::Arc;

use super::class::EventClass;

/// Event moved from the source through the store to subscribers.
///
/// Equality is structural: class and payload bytes must both match.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Event {
    class: EventClass,
    payload: Arc<[u8]>,
}

impl Event {
    /// Builds an event from any byte-like payload.
    pub fn new(class: EventClass, payload: impl AsRef<[u8]>) -> Self {
        Self {
            class,
            payload: Arc::from(payload.as_ref()),
        }
    }

    /// Shorthand for a [`EventClass::ROUND_START`] event.
    pub fn round_start(payload: impl AsRef<[u8]>) -> Self {
        Self::new(EventClass::ROUND_START, payload)
    }

    /// Shorthand for a [`EventClass::ANSWER_RECEIVED`] event.
    pub fn answer_received(payload: impl AsRef<[u8]>) -> Self {
        Self::new(EventClass::ANSWER_RECEIVED, payload)
    }

    #[inline]
    pub fn class(&self) -> EventClass {
        self.class
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload rendered lossily as UTF-8 (for logs).
    pub fn payload_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("class", &self.class)
            .field("payload", &self.payload_lossy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Event::round_start("1"), Event::new(EventClass::ROUND_START, b"1"));
        assert_ne!(Event::round_start("1"), Event::answer_received("1"));
        assert_ne!(Event::round_start("1"), Event::round_start("2"));
    }

    #[test]
    fn test_clone_shares_payload() {
        let ev = Event::answer_received(vec![0u8; 64]);
        let copy = ev.clone();
        assert!(std::ptr::eq(ev.payload(), copy.payload()));
    }
}
