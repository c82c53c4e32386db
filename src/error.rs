//! Error types used by the relay, its store and its source.
//!
//! This module defines three enums:
//!
//! - [`RelayError`]: misuse of the relay API, or the tripped failure breaker
//!   that ends a run.
//! - [`StoreError`]: an insert the store refused.
//! - [`SourceError`]: a failed read (transient, terminal or cancelled).
//!
//! All types provide `as_label` for logs/metrics.

use thiserror::Error;

use crate::events::EventClass;

/// # Errors reported through the relay's public contract.
///
/// Faults inside the reader and dispatcher loops are absorbed (retry, eviction,
/// drop). Only programmer errors and a tripped breaker reach the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// `run` was called while the pump is already running.
    #[error("relay is already running")]
    AlreadyStarted,

    /// The relay has been stopped and cannot be started or modified again.
    #[error("relay has been stopped")]
    Stopped,

    /// `stop` was called before `run`.
    #[error("relay was never started")]
    NotStarted,

    /// The builder got a configuration it cannot honour.
    #[error("invalid relay configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// The source kept failing until the failure breaker tripped.
    #[error("source failed {failures} times in a row; last error: {last}")]
    SourceFailing {
        /// Consecutive failures observed.
        failures: u32,
        /// Message of the last failure.
        last: String,
    },
}

impl RelayError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use roundrelay::RelayError;
    ///
    /// assert_eq!(RelayError::AlreadyStarted.as_label(), "relay_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RelayError::AlreadyStarted => "relay_already_started",
            RelayError::Stopped => "relay_stopped",
            RelayError::NotStarted => "relay_not_started",
            RelayError::InvalidConfig { .. } => "relay_invalid_config",
            RelayError::SourceFailing { .. } => "relay_source_failing",
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RelayError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// # Errors produced by the bounded event store.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No bin is configured for the class and the unknown-class policy rejects it.
    #[error("no bin configured for event class {class:?}")]
    UnknownClass {
        /// The rejected class.
        class: EventClass,
    },

    /// The event carries `ANY` or a multi-bit mask instead of a single class.
    #[error("event class {class:?} is not a single flag")]
    InvalidClass {
        /// The rejected class.
        class: EventClass,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::UnknownClass { .. } => "store_unknown_class",
            StoreError::InvalidClass { .. } => "store_invalid_class",
        }
    }
}

/// # Errors produced by an event source read.
///
/// The reader loop treats them differently:
/// - `Transient` is retried after a backoff delay;
/// - `Terminal` ends the reader (no more data will ever arrive);
/// - `Canceled` means the source observed the stop request.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Read failed but may succeed if retried.
    #[error("transient source error: {error}")]
    Transient {
        /// The underlying error message.
        error: String,
    },

    /// The source is exhausted or broken for good.
    #[error("source ended: {error}")]
    Terminal {
        /// The underlying error message.
        error: String,
    },

    /// The read was abandoned because the relay is stopping.
    #[error("read cancelled")]
    Canceled,
}

impl SourceError {
    /// Shorthand for [`SourceError::Transient`].
    pub fn transient(error: impl Into<String>) -> Self {
        SourceError::Transient {
            error: error.into(),
        }
    }

    /// Shorthand for [`SourceError::Terminal`].
    pub fn terminal(error: impl Into<String>) -> Self {
        SourceError::Terminal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use roundrelay::SourceError;
    ///
    /// assert_eq!(SourceError::transient("eof").as_label(), "source_transient");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Transient { .. } => "source_transient",
            SourceError::Terminal { .. } => "source_terminal",
            SourceError::Canceled => "source_canceled",
        }
    }

    /// Indicates whether the reader should try again.
    ///
    /// Returns `false` only for [`SourceError::Terminal`]. A cancelled read is
    /// retried unless the relay is stopping.
    ///
    /// # Example
    /// ```
    /// use roundrelay::SourceError;
    ///
    /// assert!(SourceError::transient("reset").is_retryable());
    /// assert!(SourceError::Canceled.is_retryable());
    /// assert!(!SourceError::terminal("no more data").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourceError::Terminal { .. })
    }
}
