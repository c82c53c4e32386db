//! State shared by the reader and dispatcher loops.
//!
//! The store is the only structure both loops mutate; it carries its own
//! mutex. Everything else is either immutable, atomic or internally synchronized.

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::events::Event;
use crate::notices::{Bus, Notice, NoticeKind};
use crate::store::EventStore;
use crate::subscribers::{SubscriptionRegistry, multicast};

use super::stats::RelayStats;

pub(crate) struct Pump {
    pub(crate) store: EventStore,
    pub(crate) registry: SubscriptionRegistry,
    pub(crate) bus: Bus,
    pub(crate) stats: RelayStats,
    /// Single-permit wake-up from reader to dispatcher.
    pub(crate) wake: Notify,
    /// Cancelled by `stop` (or a tripped breaker).
    pub(crate) token: CancellationToken,
    /// Cancelled when the source is exhausted; the dispatcher drains and exits.
    pub(crate) source_done: CancellationToken,
}

impl Pump {
    /// Stores a freshly read event and wakes the dispatcher.
    pub(crate) fn accept(&self, event: Event) {
        self.stats.record_received();
        let class = event.class();
        tracing::debug!(class = ?class, payload = %event.payload_lossy(), "queued");

        match self.store.insert(event) {
            Ok(evicted) => {
                if let Some(old) = evicted {
                    tracing::trace!(class = ?class, payload = %old.payload_lossy(), "evicted");
                    self.bus.publish(Notice::new(NoticeKind::Evicted).with_class(class));
                }
                self.wake.notify_one();
            }
            Err(err) => {
                tracing::warn!(class = ?class, error = %err, "event rejected");
                self.bus.publish(
                    Notice::new(NoticeKind::Rejected)
                        .with_class(class)
                        .with_reason(err.as_label()),
                );
            }
        }
    }

    /// Removes and multicasts pending events until the store is empty.
    ///
    /// Checks the stop token before each removal, so a stop observed here
    /// ends the drain right after the in-flight multicast. Returns `false` if
    /// it stopped early.
    pub(crate) fn drain(&self) -> bool {
        loop {
            if self.token.is_cancelled() {
                return false;
            }
            let Some(event) = self.store.remove() else {
                return true;
            };
            self.dispatch(&event);
        }
    }

    fn dispatch(&self, event: &Event) {
        tracing::debug!(
            class = ?event.class(),
            payload = %event.payload_lossy(),
            "broadcasting"
        );
        let targets = self.registry.match_all(event);
        let delivery = multicast(event, &targets, &self.bus);
        self.stats.record_delivery(&delivery);
    }
}
