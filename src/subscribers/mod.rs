//! # Subscriptions and best-effort fan-out.
//!
//! Subscribers are plain typed conduits: a bounded `tokio::sync::mpsc::Sender<Event>`
//! plus a class filter. What happens on the receiving side is up to the caller.
//!
//! ## Architecture
//! ```text
//! dispatcher ── remove() ──► Event
//!                              │
//!                              ▼
//!          SubscriptionRegistry::match_all(&Event)   (filter == 0 || filter == class)
//!                              │
//!                              ▼
//!                    multicast(&Event, targets)
//!                 ┌────────────┼────────────┐
//!                 ▼            ▼            ▼
//!             output S1    output S2    output SN     (try_send, drop if busy)
//! ```
//!
//! ## Example
//! ```rust
//! use roundrelay::{Event, EventClass, SubscriptionRegistry};
//! use tokio::sync::mpsc;
//!
//! let reg = SubscriptionRegistry::new();
//! let (tx, _rx) = mpsc::channel(16);
//! reg.add(EventClass::ROUND_START, tx, Some("rounds"));
//!
//! assert_eq!(reg.match_all(&Event::round_start("1")).len(), 1);
//! assert!(reg.match_all(&Event::answer_received("1")).is_empty());
//! ```

mod fanout;
mod registry;
mod subscription;

pub use fanout::{Delivery, multicast};
pub use registry::SubscriptionRegistry;
pub use subscription::{Subscription, SubscriptionId};
