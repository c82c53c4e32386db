//! # Event source abstraction.
//!
//! This module defines the [`Source`] trait (async, cancel-aware) consumed by
//! the relay's reader loop, and [`ChannelSource`], a source fed by an mpsc channel.
//! The common handle type is [`SourceRef`], an `Arc<dyn Source>`.
//!
//! A read receives a [`CancellationToken`] that fires when the relay stops.
//! The reader never aborts a read itself: shutdown waits for the read to
//! return, so a source that ignores the token bounds shutdown latency by its
//! own read latency.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::events::Event;

/// Shared handle to a source.
pub type SourceRef = Arc<dyn Source>;

/// # Single ordered producer of events.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use roundrelay::{Event, Source, SourceError};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Source for Ticker {
///     async fn read(&self, ctx: CancellationToken) -> Result<Event, SourceError> {
///         tokio::select! {
///             _ = ctx.cancelled() => Err(SourceError::Canceled),
///             _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {
///                 Ok(Event::round_start("tick"))
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Waits for the next event.
    ///
    /// Return [`SourceError::Transient`] for failures worth retrying,
    /// [`SourceError::Terminal`] once no more data can arrive, and
    /// [`SourceError::Canceled`] if `ctx` fired before an event was read.
    async fn read(&self, ctx: CancellationToken) -> Result<Event, SourceError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Source backed by an mpsc receiver.
///
/// Ends with [`SourceError::Terminal`] once every sender is dropped and the
/// buffer is empty.
pub struct ChannelSource {
    rx: Mutex<mpsc::Receiver<Event>>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Event>) -> Self {
        Self { rx: Mutex::new(rx) }
    }

    /// Creates a bounded channel and returns its sender with the source as a [`SourceRef`].
    pub fn channel(capacity: usize) -> (mpsc::Sender<Event>, SourceRef) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Arc::new(Self::new(rx)))
    }
}

#[async_trait]
impl Source for ChannelSource {
    async fn read(&self, ctx: CancellationToken) -> Result<Event, SourceError> {
        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(SourceError::Canceled),
            msg = rx.recv() => msg.ok_or_else(|| SourceError::terminal("no more data")),
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_reads_then_ends() {
        let (tx, src) = ChannelSource::channel(4);
        tx.send(Event::round_start("1")).await.unwrap();
        drop(tx);

        let ctx = CancellationToken::new();
        assert_eq!(src.read(ctx.clone()).await, Ok(Event::round_start("1")));
        assert_eq!(src.read(ctx).await, Err(SourceError::terminal("no more data")));
    }

    #[tokio::test]
    async fn test_channel_source_honours_cancel() {
        let (_tx, src) = ChannelSource::channel(1);
        let ctx = CancellationToken::new();
        ctx.cancel();
        assert_eq!(src.read(ctx).await, Err(SourceError::Canceled));
    }
}
