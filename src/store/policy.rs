//! # Store policy: bins, capacities, priority and unknown classes.
//!
//! [`StoreConfig`] describes which classes the store keeps, how many events of
//! each it buffers, and in which order classes are serviced on removal.
//!
//! ## Rules
//! - `bins` order **is** the priority ranking: index 0 is serviced first.
//! - Capacities are clamped to a minimum of 1.
//! - A bin class must be a single flag (never `ANY`, never a mask) and appear once.
//! - Classes without a bin follow [`UnknownClassPolicy`].
//!
//! ## Reference policy
//! ```text
//! priority 0: ROUND_START      capacity 2
//! priority 1: ANSWER_RECEIVED  capacity 1
//! unknown:    Reject
//! ```

use crate::error::RelayError;
use crate::events::EventClass;

/// Capacity of one class bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinSpec {
    /// Class stored in this bin.
    pub class: EventClass,
    /// Maximum number of buffered events (min 1; clamped).
    pub capacity: usize,
}

impl BinSpec {
    pub const fn new(class: EventClass, capacity: usize) -> Self {
        Self { class, capacity }
    }
}

/// What the store does with an event whose class has no configured bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnknownClassPolicy {
    /// Refuse the insert with [`StoreError::UnknownClass`](crate::StoreError::UnknownClass).
    #[default]
    Reject,
    /// Store the event in the bin of this (configured) class.
    ///
    /// The event keeps its own class; it only shares the target bin's
    /// capacity and priority.
    Route(EventClass),
    /// Create a bin on first sight, serviced after every configured bin.
    Dynamic {
        /// Capacity of each dynamically created bin (min 1; clamped).
        capacity: usize,
    },
}

/// Bin layout of a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bins in priority order (first = serviced first).
    pub bins: Vec<BinSpec>,
    /// Handling of classes absent from `bins`.
    pub unknown: UnknownClassPolicy,
}

impl Default for StoreConfig {
    /// Reference policy: round-start (2) before answer-received (1), unknown rejected.
    fn default() -> Self {
        Self {
            bins: vec![
                BinSpec::new(EventClass::ROUND_START, 2),
                BinSpec::new(EventClass::ANSWER_RECEIVED, 1),
            ],
            unknown: UnknownClassPolicy::Reject,
        }
    }
}

impl StoreConfig {
    /// Creates a config from bins in priority order, rejecting unknown classes.
    pub fn new(bins: impl IntoIterator<Item = BinSpec>) -> Self {
        Self {
            bins: bins.into_iter().collect(),
            unknown: UnknownClassPolicy::Reject,
        }
    }

    /// Replaces the unknown-class policy.
    pub fn with_unknown(mut self, unknown: UnknownClassPolicy) -> Self {
        self.unknown = unknown;
        self
    }

    /// Returns the configured capacity for `class`, if it has a bin.
    pub fn capacity_of(&self, class: EventClass) -> Option<usize> {
        self.bins
            .iter()
            .find(|b| b.class == class)
            .map(|b| b.capacity.max(1))
    }

    /// Checks the layout rules listed in the module docs.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.bins.is_empty() {
            return Err(RelayError::invalid("store needs at least one bin"));
        }
        for (i, bin) in self.bins.iter().enumerate() {
            if !bin.class.is_single() {
                return Err(RelayError::invalid(format!(
                    "bin class {:?} is not a single flag",
                    bin.class
                )));
            }
            if self.bins[..i].iter().any(|b| b.class == bin.class) {
                return Err(RelayError::invalid(format!(
                    "bin class {:?} configured twice",
                    bin.class
                )));
            }
        }
        if let UnknownClassPolicy::Route(target) = self.unknown {
            if self.capacity_of(target).is_none() {
                return Err(RelayError::invalid(format!(
                    "unknown classes routed to unconfigured class {target:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_policy() {
        let cfg = StoreConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.capacity_of(EventClass::ROUND_START), Some(2));
        assert_eq!(cfg.capacity_of(EventClass::ANSWER_RECEIVED), Some(1));
        assert_eq!(cfg.unknown, UnknownClassPolicy::Reject);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = StoreConfig::new([BinSpec::new(EventClass::ROUND_START, 0)]);
        assert_eq!(cfg.capacity_of(EventClass::ROUND_START), Some(1));
    }

    #[test]
    fn test_rejects_bad_layouts() {
        let empty = StoreConfig::new([]);
        assert!(empty.validate().is_err());

        let any = StoreConfig::new([BinSpec::new(EventClass::ANY, 1)]);
        assert!(any.validate().is_err());

        let mask = StoreConfig::new([BinSpec::new(EventClass::from_bits(3), 1)]);
        assert!(mask.validate().is_err());

        let dup = StoreConfig::new([
            BinSpec::new(EventClass::ROUND_START, 1),
            BinSpec::new(EventClass::ROUND_START, 2),
        ]);
        assert!(dup.validate().is_err());

        let route = StoreConfig::default()
            .with_unknown(UnknownClassPolicy::Route(EventClass::from_bits(8)));
        assert!(matches!(
            route.validate(),
            Err(RelayError::InvalidConfig { .. })
        ));
    }
}
