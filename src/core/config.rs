//! # Relay configuration.
//!
//! Provides [`RelayConfig`], the per-instance settings of a relay. Nothing is
//! hard-wired: bin capacities, priority and retry behaviour all come from here,
//! so a store with tiny capacities is as easy to build as the reference one.
//!
//! ## Sentinel values
//! - `failure.trip_after = None` → retry transient failures forever (with backoff)
//! - `notice_capacity = 0` → clamped to 1

use crate::policies::FailurePolicy;
use crate::store::StoreConfig;

/// Settings for one relay instance.
///
/// ## Field semantics
/// - `store`: bins in priority order, their capacities, unknown-class handling
/// - `failure`: backoff between failed reads and optional breaker threshold
/// - `notice_capacity`: ring size of the diagnostic notice bus
#[derive(Clone, Debug, PartialEq)]
pub struct RelayConfig {
    /// Bounded store layout.
    pub store: StoreConfig,

    /// Reaction to transient source failures.
    pub failure: FailurePolicy,

    /// Capacity of the notice broadcast ring buffer.
    ///
    /// Receivers lagging more than this many notices skip the oldest ones.
    pub notice_capacity: usize,
}

impl RelayConfig {
    /// Notice capacity clamped to a minimum of 1.
    #[inline]
    pub fn notice_capacity_clamped(&self) -> usize {
        self.notice_capacity.max(1)
    }
}

impl Default for RelayConfig {
    /// Default configuration:
    ///
    /// - `store = StoreConfig::default()` (round-start ×2, then answer-received ×1)
    /// - `failure = FailurePolicy::default()` (10ms..1s exponential, no breaker)
    /// - `notice_capacity = 256`
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            failure: FailurePolicy::default(),
            notice_capacity: 256,
        }
    }
}
