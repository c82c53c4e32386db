//! Bounded, class-aware event store.
//!
//! ## Contents
//! - [`StoreConfig`], [`BinSpec`], [`UnknownClassPolicy`] bin layout and priority
//! - [`EventStore`] the mutex-guarded bins (`insert` / `remove`)
//! - [`StoreStats`] insert/evict/reject counters
//!
//! ## Quick wiring
//! ```text
//! reader loop ──► EventStore::insert ──► (evicted? → notice + counter)
//! dispatcher  ──► EventStore::remove ──► multicast
//! ```

mod policy;
mod queue;

pub use policy::{BinSpec, StoreConfig, UnknownClassPolicy};
pub use queue::{EventStore, StoreStats};
