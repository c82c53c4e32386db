//! # Subscription registry.
//!
//! Insertion-ordered set of [`Subscription`]s served by one relay.
//!
//! ## Rules
//! - `add` appends; `match_all` returns matches in registration order.
//! - Registration and removal are allowed at any time, including while the
//!   pump runs: the list sits behind an `RwLock` and `match_all` clones the
//!   matching entries, so delivery never holds the lock.
//! - A filter of `ANY` (0) matches every class; otherwise the class must be equal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;

use crate::events::{Event, EventClass};

use super::subscription::{Subscription, SubscriptionId};

/// Registry of subscriptions, safe for concurrent append and iteration.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subs: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers only push/retain, so a poisoned list is still well-formed.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Subscription>> {
        self.subs.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Subscription>> {
        self.subs.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends a subscription; `name` defaults to the generated id.
    pub fn add(
        &self,
        filter: EventClass,
        output: mpsc::Sender<Event>,
        name: Option<&str>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let name: Arc<str> = match name {
            Some(n) => Arc::from(n),
            None => Arc::from(id.to_string()),
        };
        self.write().push(Subscription {
            id,
            name,
            filter,
            output,
        });
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut subs = self.write();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Every subscription interested in `event`, in registration order.
    pub fn match_all(&self, event: &Event) -> Vec<Subscription> {
        let class = event.class();
        self.read()
            .iter()
            .filter(|s| s.matches(class))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(subs: &[Subscription]) -> Vec<SubscriptionId> {
        subs.iter().map(Subscription::id).collect()
    }

    #[test]
    fn test_match_all_honours_filters_in_order() {
        let reg = SubscriptionRegistry::new();
        let (tx, _rx) = mpsc::channel(1);

        let all = reg.add(EventClass::ANY, tx.clone(), Some("all"));
        let rounds = reg.add(EventClass::ROUND_START, tx.clone(), None);
        let answers = reg.add(EventClass::ANSWER_RECEIVED, tx.clone(), None);
        let all_again = reg.add(EventClass::ANY, tx, None);

        assert_eq!(
            ids(&reg.match_all(&Event::round_start("1"))),
            vec![all, rounds, all_again]
        );
        assert_eq!(
            ids(&reg.match_all(&Event::answer_received("1"))),
            vec![all, answers, all_again]
        );
        assert_eq!(
            ids(&reg.match_all(&Event::new(EventClass::from_bits(4), "x"))),
            vec![all, all_again]
        );
    }

    #[test]
    fn test_default_name_is_id() {
        let reg = SubscriptionRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        let id = reg.add(EventClass::ANY, tx, None);

        let subs = reg.match_all(&Event::round_start("1"));
        assert_eq!(subs[0].name(), id.to_string());
    }

    #[test]
    fn test_remove() {
        let reg = SubscriptionRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        let a = reg.add(EventClass::ANY, tx.clone(), None);
        let b = reg.add(EventClass::ANY, tx, None);

        assert!(reg.remove(a));
        assert!(!reg.remove(a));
        assert_eq!(reg.len(), 1);
        assert_eq!(ids(&reg.match_all(&Event::round_start("1"))), vec![b]);
    }
}
