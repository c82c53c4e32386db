//! # Non-blocking multicast of one event to matching subscriptions.
//!
//! ## Diagram
//! ```text
//!    multicast(&Event)
//!        │                          (Event clone = Arc bump)
//!        ├── try_send ──► [output S1]   Ok      → delivered
//!        ├── try_send ──► [output S2]   Full    → skipped, DeliveryDropped{full}
//!        └── try_send ──► [output SN]   Closed  → skipped, DeliveryDropped{closed}
//! ```
//!
//! ## Rules
//! - **Non-blocking**: only `try_send`; a busy subscriber is skipped.
//! - **No retries**: a skipped event is never re-queued for that subscriber.
//! - **Isolation**: one subscriber's backpressure never affects another.
//! - Attempts follow registration order; no ordering across outputs is promised.

use tokio::sync::mpsc::error::TrySendError;

use crate::events::Event;
use crate::notices::{Bus, Notice};

use super::subscription::Subscription;

/// Outcome of one multicast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Outputs that accepted the event.
    pub delivered: u64,
    /// Outputs skipped because their buffer was full.
    pub dropped_full: u64,
    /// Outputs skipped because the receiver is gone.
    pub dropped_closed: u64,
}

impl Delivery {
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped_full + self.dropped_closed
    }
}

/// Offers `event` to every subscription in `targets` without waiting.
pub fn multicast(event: &Event, targets: &[Subscription], bus: &Bus) -> Delivery {
    let mut out = Delivery::default();

    for sub in targets {
        let reason = match sub.output.try_send(event.clone()) {
            Ok(()) => {
                out.delivered += 1;
                continue;
            }
            Err(TrySendError::Full(_)) => {
                out.dropped_full += 1;
                "full"
            }
            Err(TrySendError::Closed(_)) => {
                out.dropped_closed += 1;
                "closed"
            }
        };

        tracing::debug!(
            subscriber = %sub.name,
            class = ?event.class(),
            payload = %event.payload_lossy(),
            reason,
            "subscriber busy, skipping event"
        );
        if bus.has_receivers() {
            bus.publish(Notice::delivery_dropped(&sub.name, event.class(), reason));
        }
    }
    out
}
