//! # Subscription: a class filter paired with an output conduit.
//!
//! The output is a bounded [`tokio::sync::mpsc::Sender`]. The subscriber owns
//! the receiving half and does whatever it wants with delivered events; the
//! relay only ever calls `try_send` on it.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::events::{Event, EventClass};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Registered interest in a set of classes.
#[derive(Clone)]
pub struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) name: Arc<str>,
    pub(crate) filter: EventClass,
    pub(crate) output: mpsc::Sender<Event>,
}

impl Subscription {
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Name used in logs and notices (defaults to the id).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn filter(&self) -> EventClass {
        self.filter
    }

    /// True if this subscription wants events of `class`.
    #[inline]
    pub fn matches(&self, class: EventClass) -> bool {
        self.filter.accepts(class)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("closed", &self.output.is_closed())
            .finish()
    }
}
