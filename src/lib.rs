//! # roundrelay
//!
//! **roundrelay** relays time-sensitive events from one ordered source to many
//! independent subscribers, favouring the *freshest* state over a complete
//! backlog. It targets settings such as coordination rounds, where a stale
//! "round started" delivered late is worse than one never delivered.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                  ┌──────────────┐
//!                  │    Source    │  read(ctx) -> Event | SourceError
//!                  └──────┬───────┘
//!                         ▼
//!  ┌──────────────────────────────────────────────────────────────────┐
//!  │  Relay                                                           │
//!  │                                                                  │
//!  │  reader loop ──► EventStore (bins per class, bounded)            │
//!  │      │             prio 0: ROUND_START     cap 2                 │
//!  │      │             prio 1: ANSWER_RECEIVED cap 1                 │
//!  │      └─ wake (Notify, single permit) ──► dispatcher loop         │
//!  │                                            │ remove(): newest of │
//!  │                                            │ top-priority bin    │
//!  │                                            ▼                     │
//!  │                          SubscriptionRegistry::match_all         │
//!  └────────────────────────────────────────────┬─────────────────────┘
//!                                    try_send   │  (skip if busy)
//!                          ┌────────────────────┼─────────────────┐
//!                          ▼                    ▼                 ▼
//!                    mpsc output S1      mpsc output S2    mpsc output SN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Created ──run()──► Running ──stop()──► Stopping ──both loops exited──► Stopped
//!
//! reader loop {
//!   ├─► stop requested? → exit
//!   ├─► read(ctx)
//!   │     ├─ Ok        ─► store.insert (evict oldest of bin if full) ─► wake
//!   │     ├─ Transient ─► backoff sleep (cancellable) or trip breaker
//!   │     └─ Terminal  ─► dispatcher drains what is left, relay stops
//! }
//! dispatcher loop {
//!   ├─► stop requested ─► exit
//!   └─► wake ─► drain: remove ─► match_all ─► try_send each (drop if busy)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                  |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Events**        | Bit-flag classes and immutable payloads.                     | [`EventClass`], [`Event`]                  |
//! | **Store**         | Per-class bounded bins, priority order, LIFO within a bin.   | [`EventStore`], [`StoreConfig`]            |
//! | **Subscriptions** | Class filters over bounded mpsc outputs, drop-on-backpressure.| [`SubscriptionRegistry`], [`multicast`]   |
//! | **Relay**         | Reader + dispatcher loops, lifecycle, control surface.       | [`Relay`], [`RelayBuilder`]                |
//! | **Policies**      | Backoff, jitter and breaker for failing sources.             | [`BackoffPolicy`], [`FailurePolicy`]       |
//! | **Diagnostics**   | Counters and broadcast notices for silent losses.            | [`StatsSnapshot`], [`Notice`]              |
//! | **Errors**        | Typed errors with stable labels.                             | [`RelayError`], [`SourceError`]            |
//!
//! ## Example
//! ```rust
//! use roundrelay::{ChannelSource, Event, EventClass, Relay, RelayConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (tx, source) = ChannelSource::channel(64);
//!     let relay = Relay::builder(RelayConfig::default())
//!         .with_source_ref(source)
//!         .build()?;
//!
//!     let (out, mut all) = mpsc::channel(8);
//!     relay.subscribe(EventClass::ANY, out)?;
//!
//!     let runner = {
//!         let relay = relay.clone();
//!         tokio::spawn(async move { relay.run().await })
//!     };
//!
//!     tx.send(Event::round_start("round-1")).await?;
//!     assert_eq!(all.recv().await, Some(Event::round_start("round-1")));
//!
//!     relay.stop()?;
//!     runner.await??;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod notices;
mod policies;
mod source;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Relay, RelayBuilder, RelayConfig, RelayState, StatsSnapshot};
pub use error::{RelayError, SourceError, StoreError};
pub use events::{Event, EventClass};
pub use notices::{Bus, Notice, NoticeKind};
pub use policies::{BackoffPolicy, FailurePolicy, FailureTracker, JitterPolicy, Verdict};
pub use source::{ChannelSource, Source, SourceRef};
pub use store::{BinSpec, EventStore, StoreConfig, StoreStats, UnknownClassPolicy};
pub use subscribers::{Delivery, Subscription, SubscriptionId, SubscriptionRegistry, multicast};
