//! Relay core: configuration, lifecycle and the two pump loops.
//!
//! The public API from this module is [`Relay`] (with [`RelayBuilder`]),
//! its [`RelayConfig`], the observable [`RelayState`] and [`StatsSnapshot`].
//!
//! Internal modules:
//! - [`pump`]: state shared by both loops (store, registry, wake signal, tokens);
//! - [`reader`]: source → store, with backoff and failure breaker;
//! - [`dispatcher`]: store → subscribers, non-blocking multicast;
//! - [`state`]: `Created → Running → Stopping → Stopped`;
//! - [`stats`]: counters for evictions, drops and failures.

mod builder;
mod config;
mod dispatcher;
mod pump;
mod reader;
mod relay;
mod state;
mod stats;

pub use builder::RelayBuilder;
pub use config::RelayConfig;
pub use relay::Relay;
pub use state::RelayState;
pub use stats::StatsSnapshot;
