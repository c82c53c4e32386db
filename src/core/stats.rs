//! Relay counters.
//!
//! Silent data loss (eviction, skipped delivery, rejected classes) is never an
//! error, so it is counted here to keep a quiet subscriber diagnosable.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::StoreStats;
use crate::subscribers::Delivery;

/// Live counters updated by the reader and dispatcher loops.
#[derive(Debug, Default)]
pub(crate) struct RelayStats {
    received: AtomicU64,
    source_failures: AtomicU64,
    dispatched: AtomicU64,
    delivered: AtomicU64,
    dropped_full: AtomicU64,
    dropped_closed: AtomicU64,
}

impl RelayStats {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_source_failure(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self, d: &Delivery) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(d.delivered, Ordering::Relaxed);
        self.dropped_full.fetch_add(d.dropped_full, Ordering::Relaxed);
        self.dropped_closed.fetch_add(d.dropped_closed, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, store: StoreStats) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            source_failures: self.source_failures.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            evicted: store.evicted,
            rejected: store.rejected,
        }
    }
}

/// Point-in-time copy of a relay's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events successfully read from the source.
    pub received: u64,
    /// Failed reads (transient).
    pub source_failures: u64,
    /// Events removed from the store and multicast.
    pub dispatched: u64,
    /// Successful per-subscriber deliveries.
    pub delivered: u64,
    /// Per-subscriber skips because the output was full.
    pub dropped_full: u64,
    /// Per-subscriber skips because the output was closed.
    pub dropped_closed: u64,
    /// Events evicted from a full bin.
    pub evicted: u64,
    /// Events refused for an unknown class.
    pub rejected: u64,
}
