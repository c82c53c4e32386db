//! Relay diagnostics: notice types and broadcast bus.
//!
//! Eviction, delivery skips and source failures are not errors, but they must
//! stay diagnosable. Each one is logged via `tracing`, counted in
//! [`StatsSnapshot`](crate::StatsSnapshot), and published here as a [`Notice`].
//!
//! ## Contents
//! - [`NoticeKind`], [`Notice`] classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod notice;

pub use bus::Bus;
pub use notice::{Notice, NoticeKind};
