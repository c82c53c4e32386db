//! # Event classes as bit flags.
//!
//! [`EventClass`] is a small closed set of categories encoded as distinct
//! powers of two. The zero value is reserved: it never names a class, it only
//! appears as a subscription filter meaning "every class".
//!
//! ```text
//! bit:     ...  3   2   1   0
//! value:        8   4   2   1
//!                       │   └─► ROUND_START
//!                       └─────► ANSWER_RECEIVED
//!               next classes take the next unused bit
//! ```
//!
//! ## Example
//! ```rust
//! use roundrelay::EventClass;
//!
//! assert!(EventClass::ANY.accepts(EventClass::ROUND_START));
//! assert!(EventClass::ROUND_START.accepts(EventClass::ROUND_START));
//! assert!(!EventClass::ROUND_START.accepts(EventClass::ANSWER_RECEIVED));
//!
//! let custom = EventClass::from_bits(1 << 2);
//! assert!(custom.is_single());
//! ```

use std::fmt;

/// Category of a relayed event (bit-flag encoded).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EventClass(u32);

impl EventClass {
    /// Filter value matching every class. Never a class of its own.
    pub const ANY: EventClass = EventClass(0);
    /// A new coordination round has started.
    pub const ROUND_START: EventClass = EventClass(1);
    /// An answer for the current round arrived.
    pub const ANSWER_RECEIVED: EventClass = EventClass(1 << 1);

    /// Wraps raw bits without validation.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit value.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True for the "any class" filter value.
    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == 0
    }

    /// True if exactly one flag bit is set (a usable class, not a filter or a mask).
    #[inline]
    pub const fn is_single(self) -> bool {
        self.0.is_power_of_two()
    }

    /// Filter matching: `ANY` accepts everything, otherwise the classes must be equal.
    #[inline]
    pub const fn accepts(self, class: EventClass) -> bool {
        self.0 == 0 || self.0 == class.0
    }

    /// Returns a short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            EventClass::ANY => "any",
            EventClass::ROUND_START => "round_start",
            EventClass::ANSWER_RECEIVED => "answer_received",
            _ => "custom",
        }
    }
}

impl fmt::Debug for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_label() {
            "custom" => write!(f, "EventClass({:#x})", self.0),
            label => f.write_str(label),
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EventClass {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}
