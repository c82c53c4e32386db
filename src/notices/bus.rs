//! # Notice bus for broadcasting relay diagnostics.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] used by the
//! reader and dispatcher loops to report evictions, drops and source trouble.
//!
//! ## Architecture
//! ```text
//! Publishers:                          Receivers (any number):
//!   reader loop ──────┐
//!                     ├──► Bus ──────► Relay::notices() ──► tests, metrics, logs
//!   dispatcher loop ──┘  (broadcast)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest notices.
//! - **No persistence**: notices published with no receiver are lost.

use tokio::sync::broadcast;

use super::notice::Notice;

/// Broadcast channel for relay notices.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Notice>,
}

impl Bus {
    /// Creates a new bus with the given ring capacity (min 1; clamped).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Notice>(capacity.max(1));
        Self { tx }
    }

    /// Publishes a notice to all active receivers; dropped if there are none.
    pub fn publish(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    /// Creates an independent receiver for notices sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// True if at least one receiver is subscribed.
    #[inline]
    pub fn has_receivers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notices::NoticeKind;

    #[tokio::test]
    async fn test_receiver_sees_later_notices_only() {
        let bus = Bus::new(4);
        bus.publish(Notice::new(NoticeKind::Started));
        assert!(!bus.has_receivers());

        let mut rx = bus.subscribe();
        bus.publish(Notice::new(NoticeKind::Stopped));
        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, NoticeKind::Stopped);
    }

    #[tokio::test]
    async fn test_lagging_receiver_skips() {
        let bus = Bus::new(1);
        let mut rx = bus.subscribe();
        bus.publish(Notice::new(NoticeKind::Started));
        bus.publish(Notice::new(NoticeKind::Stopped));

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().kind, NoticeKind::Stopped);
    }
}
