//! # Bounded, class-aware event store.
//!
//! [`EventStore`] keeps one bounded bin per class and always knows which
//! pending event is most relevant.
//!
//! ## Architecture
//! ```text
//! insert(ev) ──► bin[ev.class]                       remove()
//!                  │ full? drop oldest (front)          │
//!                  ▼                                    ▼
//!   prio 0: [ S4 | S5 ]  ◄── pop newest (back) ◄── first non-empty bin
//!   prio 1: [ A2 ]
//! ```
//!
//! ## Rules
//! - `len(bin[c]) <= capacity(c)` after every insert (FIFO eviction inside a bin).
//! - `remove` services bins in priority order and returns the **newest** event
//!   of the chosen bin (LIFO inside a bin), so consumers see fresh state first.
//! - Both operations hold one mutex for a bounded amount of work; neither waits
//!   for data.
//! - Eviction is not an error; it is counted in [`StoreStats::evicted`].
//! - Only single-flag classes are stored; `ANY` and masks are rejected.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::events::{Event, EventClass};

use super::policy::{StoreConfig, UnknownClassPolicy};

/// One class bin; oldest at the front, newest at the back.
#[derive(Debug)]
struct Bin {
    class: EventClass,
    capacity: usize,
    items: VecDeque<Event>,
}

impl Bin {
    fn new(class: EventClass, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            class,
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }
}

/// Counters maintained by the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Events accepted by `insert`.
    pub inserted: u64,
    /// Events discarded to make room for a newer one of the same bin.
    pub evicted: u64,
    /// Events refused because their class has no bin or is not a single flag.
    pub rejected: u64,
}

#[derive(Debug)]
struct Inner {
    bins: Vec<Bin>,
    stats: StoreStats,
}

impl Inner {
    fn bin_index(&mut self, class: EventClass, unknown: UnknownClassPolicy) -> Option<usize> {
        if let Some(i) = self.bins.iter().position(|b| b.class == class) {
            return Some(i);
        }
        match unknown {
            UnknownClassPolicy::Reject => None,
            UnknownClassPolicy::Route(target) => self.bins.iter().position(|b| b.class == target),
            UnknownClassPolicy::Dynamic { capacity } if class.is_single() => {
                self.bins.push(Bin::new(class, capacity));
                Some(self.bins.len() - 1)
            }
            UnknownClassPolicy::Dynamic { .. } => None,
        }
    }
}

/// Concurrency-safe store holding at most `capacity(c)` events per class `c`.
#[derive(Debug)]
pub struct EventStore {
    inner: Mutex<Inner>,
    unknown: UnknownClassPolicy,
}

impl EventStore {
    /// Creates a store from a config.
    ///
    /// The config is expected to be valid (see [`StoreConfig::validate`]);
    /// a `Route` target without a bin degrades to rejection.
    pub fn new(cfg: &StoreConfig) -> Self {
        let bins = cfg
            .bins
            .iter()
            .map(|spec| Bin::new(spec.class, spec.capacity))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                bins,
                stats: StoreStats::default(),
            }),
            unknown: cfg.unknown,
        }
    }

    /// Guard over the bins.
    ///
    /// Every critical section leaves the bins consistent, so a poisoned lock
    /// is safe to recover.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores `event` in its class bin.
    ///
    /// Returns the evicted event when the bin was already full. Events tagged
    /// `ANY` or with a multi-bit mask are refused with [`StoreError::InvalidClass`]
    /// whatever the unknown-class policy, so dynamic bins never exceed 32.
    pub fn insert(&self, event: Event) -> Result<Option<Event>, StoreError> {
        let mut inner = self.lock();
        let class = event.class();

        if !class.is_single() {
            inner.stats.rejected += 1;
            return Err(StoreError::InvalidClass { class });
        }
        let Some(idx) = inner.bin_index(class, self.unknown) else {
            inner.stats.rejected += 1;
            return Err(StoreError::UnknownClass { class });
        };

        let bin = &mut inner.bins[idx];
        let evicted = if bin.items.len() >= bin.capacity {
            bin.items.pop_front()
        } else {
            None
        };
        bin.items.push_back(event);

        inner.stats.inserted += 1;
        if evicted.is_some() {
            inner.stats.evicted += 1;
        }
        Ok(evicted)
    }

    /// Removes and returns the most relevant pending event.
    ///
    /// Picks the first non-empty bin in priority order and returns its newest
    /// entry. Returns `None` when every bin is empty.
    pub fn remove(&self) -> Option<Event> {
        self.lock()
            .bins
            .iter_mut()
            .find_map(|bin| bin.items.pop_back())
    }

    /// Removes every pending event in the order `remove` would yield them.
    pub fn drain(&self) -> Vec<Event> {
        let mut inner = self.lock();
        let mut out = Vec::new();
        for bin in inner.bins.iter_mut() {
            out.extend(bin.items.drain(..).rev());
        }
        out
    }

    /// Total number of pending events.
    pub fn len(&self) -> usize {
        self.lock().bins.iter().map(|b| b.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().bins.iter().all(|b| b.items.is_empty())
    }

    /// Number of pending events in the bin of `class` (0 if there is none).
    pub fn len_of(&self, class: EventClass) -> usize {
        self.lock()
            .bins
            .iter()
            .find(|b| b.class == class)
            .map_or(0, |b| b.items.len())
    }

    /// Classes in service order, including dynamically created bins.
    pub fn priority(&self) -> Vec<EventClass> {
        self.lock().bins.iter().map(|b| b.class).collect()
    }

    pub fn stats(&self) -> StoreStats {
        self.lock().stats
    }
}
