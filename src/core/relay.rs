//! # Relay: owns the store, the registry and the two pump loops.
//!
//! ## Key responsibilities
//! - accept subscriptions (before or during a run)
//! - run the reader and dispatcher loops until stopped
//! - enforce the lifecycle state machine (no double start, no use after stop)
//! - expose counters and diagnostic notices
//!
//! ## High-level architecture
//! ```text
//!                     ┌──────────────────────── Relay::run() ───────────────────────┐
//!                     │                                                             │
//!  Source::read ──► reader loop ──► EventStore::insert ──► Notify ──► dispatcher loop
//!                     │                  (per-class bins)                  │        │
//!                     │                                    EventStore::remove       │
//!                     │                                                    ▼        │
//!                     │                          SubscriptionRegistry::match_all    │
//!                     │                                                    ▼        │
//!                     │                                  multicast (try_send each)  │
//!                     └─────────────────────────────────────────────────────────────┘
//!
//! Shutdown path:
//!   stop() ─► state Running → Stopping ─► token.cancel()
//!               ├─ dispatcher: exits at its next select / between two events
//!               └─ reader: exits after the in-flight read returns
//!   both joined ─► state Stopped ─► publish Stopped ─► run() returns
//! ```
//!
//! ## Example
//! ```rust
//! use roundrelay::{ChannelSource, Event, EventClass, Relay, RelayConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (tx, source) = ChannelSource::channel(16);
//!     let relay = Relay::builder(RelayConfig::default())
//!         .with_source_ref(source)
//!         .build()?;
//!
//!     let (out, mut rounds) = mpsc::channel(8);
//!     relay.subscribe(EventClass::ROUND_START, out)?;
//!
//!     tx.send(Event::round_start("round-1")).await?;
//!     drop(tx); // source ends once drained
//!
//!     relay.run().await?;
//!     assert_eq!(rounds.recv().await, Some(Event::round_start("round-1")));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{Notify, broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::RelayError;
use crate::events::{Event, EventClass};
use crate::notices::{Bus, Notice, NoticeKind};
use crate::source::SourceRef;
use crate::store::EventStore;
use crate::subscribers::{SubscriptionId, SubscriptionRegistry};

use super::builder::RelayBuilder;
use super::config::RelayConfig;
use super::dispatcher::dispatch_loop;
use super::pump::Pump;
use super::reader::{ReaderExit, read_loop};
use super::state::{RelayState, StateCell};
use super::stats::{RelayStats, StatsSnapshot};

enum LoopExit {
    Reader(ReaderExit),
    Dispatcher,
}

/// Moves the relay to `Stopped` when `run` returns or its future is dropped.
struct FinishOnDrop<'a>(&'a Relay);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Freshness-first relay from one source to many subscribers.
pub struct Relay {
    cfg: RelayConfig,
    pump: Arc<Pump>,
    source: SourceRef,
    state: StateCell,
    finished: CancellationToken,
}

impl Relay {
    /// Starts building a relay with the given configuration.
    pub fn builder(cfg: RelayConfig) -> RelayBuilder {
        RelayBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: RelayConfig, source: SourceRef) -> Self {
        let pump = Arc::new(Pump {
            store: EventStore::new(&cfg.store),
            registry: SubscriptionRegistry::new(),
            bus: Bus::new(cfg.notice_capacity_clamped()),
            stats: RelayStats::default(),
            wake: Notify::new(),
            token: CancellationToken::new(),
            source_done: CancellationToken::new(),
        });
        Self {
            cfg,
            pump,
            source,
            state: StateCell::new(),
            finished: CancellationToken::new(),
        }
    }

    /// Registers interest in `filter` (`EventClass::ANY` = every class).
    ///
    /// Allowed before and during a run; fails once the relay is stopping.
    /// A filter must be `ANY` or a single class, otherwise
    /// [`RelayError::InvalidConfig`] is returned.
    pub fn subscribe(
        &self,
        filter: EventClass,
        output: mpsc::Sender<Event>,
    ) -> Result<SubscriptionId, RelayError> {
        self.subscribe_inner(filter, output, None)
    }

    /// Same as [`subscribe`](Self::subscribe), with a name for logs and notices.
    pub fn subscribe_named(
        &self,
        filter: EventClass,
        name: &str,
        output: mpsc::Sender<Event>,
    ) -> Result<SubscriptionId, RelayError> {
        self.subscribe_inner(filter, output, Some(name))
    }

    fn subscribe_inner(
        &self,
        filter: EventClass,
        output: mpsc::Sender<Event>,
        name: Option<&str>,
    ) -> Result<SubscriptionId, RelayError> {
        if self.state.get().is_stopping_or_stopped() {
            return Err(RelayError::Stopped);
        }
        if !filter.is_any() && !filter.is_single() {
            return Err(RelayError::invalid(format!(
                "subscription filter {filter:?} is neither ANY nor a single class"
            )));
        }
        let id = self.pump.registry.add(filter, output, name);
        tracing::debug!(%id, filter = ?filter, "subscribed");
        Ok(id)
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.pump.registry.remove(id)
    }

    /// Runs both loops until the relay stops.
    ///
    /// Returns when:
    /// - [`stop`](Self::stop) was called and both loops observed it → `Ok(())`;
    /// - the source reported [`SourceError::Terminal`](crate::SourceError::Terminal)
    ///   and pending events were dispatched → `Ok(())`;
    /// - the failure breaker tripped → [`RelayError::SourceFailing`].
    ///
    /// Calling it twice reports [`RelayError::AlreadyStarted`] (while running)
    /// or [`RelayError::Stopped`] (afterwards). Dropping the returned future
    /// aborts both loops and leaves the relay `Stopped`.
    pub async fn run(&self) -> Result<(), RelayError> {
        self.state.start()?;
        // Declared before the join set so it drops after it: a dropped `run`
        // aborts both loops first, then still reaches `Stopped`.
        let _finish = FinishOnDrop(self);
        tracing::info!(source = self.source.name(), "relay started");
        self.pump.bus.publish(Notice::new(NoticeKind::Started));

        let mut set = JoinSet::new();
        {
            let pump = Arc::clone(&self.pump);
            let source = Arc::clone(&self.source);
            let policy = self.cfg.failure;
            set.spawn(async move { LoopExit::Reader(read_loop(pump, source, policy).await) });
        }
        {
            let pump = Arc::clone(&self.pump);
            set.spawn(async move {
                dispatch_loop(pump).await;
                LoopExit::Dispatcher
            });
        }

        let mut result = Ok(());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(LoopExit::Reader(ReaderExit::Tripped { failures, last })) => {
                    self.halt("failure breaker tripped");
                    result = Err(RelayError::SourceFailing { failures, last });
                }
                Ok(LoopExit::Reader(ReaderExit::Exhausted)) => {
                    self.mark_stopping("source exhausted");
                }
                Ok(LoopExit::Reader(ReaderExit::Stopped) | LoopExit::Dispatcher) => {}
                Err(err) => {
                    tracing::error!(error = %err, "relay loop aborted");
                    self.halt("relay loop aborted");
                }
            }
        }

        result
    }

    /// Terminal bookkeeping, run exactly once per `run` (see [`FinishOnDrop`]).
    fn finish(&self) {
        self.pump.token.cancel();
        self.state.finish();
        tracing::info!(pending = self.pump.store.len(), "relay stopped");
        self.pump.bus.publish(Notice::new(NoticeKind::Stopped));
        self.finished.cancel();
    }

    /// Requests cooperative termination of both loops. Does not wait.
    ///
    /// The dispatcher exits at its next check; the reader exits once its
    /// in-flight read returns (sources may shorten this by honouring the read token).
    /// Calling it again is a no-op; calling it before [`run`](Self::run) reports
    /// [`RelayError::NotStarted`].
    pub fn stop(&self) -> Result<(), RelayError> {
        if self.state.request_stop()? {
            tracing::info!("relay stop requested");
            self.pump
                .bus
                .publish(Notice::new(NoticeKind::StopRequested).with_reason("stop called"));
        }
        self.pump.token.cancel();
        Ok(())
    }

    /// Resolves once the relay reached [`RelayState::Stopped`].
    pub async fn stopped(&self) {
        self.finished.cancelled().await;
    }

    fn mark_stopping(&self, reason: &'static str) {
        if let Ok(true) = self.state.request_stop() {
            tracing::info!(reason, "relay stopping");
            self.pump
                .bus
                .publish(Notice::new(NoticeKind::StopRequested).with_reason(reason));
        }
    }

    fn halt(&self, reason: &'static str) {
        self.mark_stopping(reason);
        self.pump.token.cancel();
    }

    #[inline]
    pub fn state(&self) -> RelayState {
        self.state.get()
    }

    /// New receiver of diagnostic notices published from now on.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.pump.bus.subscribe()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.pump.stats.snapshot(self.pump.store.stats())
    }

    /// Events currently buffered in the store.
    pub fn pending(&self) -> usize {
        self.pump.store.len()
    }

    pub fn subscriptions(&self) -> usize {
        self.pump.registry.len()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::SourceError;
    use crate::policies::{BackoffPolicy, FailurePolicy};
    use crate::source::{ChannelSource, Source};

    /// Replays a fixed script, then reports the source as exhausted.
    struct Scripted {
        steps: Mutex<VecDeque<Result<Event, SourceError>>>,
    }

    impl Scripted {
        fn new(steps: impl IntoIterator<Item = Result<Event, SourceError>>) -> Self {
            Self {
                steps: Mutex::new(steps.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl Source for Scripted {
        async fn read(&self, _ctx: CancellationToken) -> Result<Event, SourceError> {
            self.steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::terminal("no more data")))
        }
    }

    /// Ignores the read token and answers after a fixed delay.
    struct Slow {
        delay: Duration,
        reading: Arc<Notify>,
    }

    #[async_trait]
    impl Source for Slow {
        async fn read(&self, _ctx: CancellationToken) -> Result<Event, SourceError> {
            self.reading.notify_one();
            tokio::time::sleep(self.delay).await;
            Ok(Event::round_start("late"))
        }
    }

    fn s(p: &str) -> Event {
        Event::round_start(p)
    }

    fn a(p: &str) -> Event {
        Event::answer_received(p)
    }

    fn received(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn spawn_run(relay: &Arc<Relay>) -> tokio::task::JoinHandle<Result<(), RelayError>> {
        let relay = Arc::clone(relay);
        tokio::spawn(async move { relay.run().await })
    }

    async fn wait_for(notices: &mut broadcast::Receiver<Notice>, kind: NoticeKind) {
        loop {
            if notices.recv().await.unwrap().kind == kind {
                return;
            }
        }
    }

    fn channel_relay() -> (mpsc::Sender<Event>, Arc<Relay>) {
        let (tx, source) = ChannelSource::channel(8);
        let relay = Relay::builder(RelayConfig::default())
            .with_source_ref(source)
            .build()
            .unwrap();
        (tx, relay)
    }

    #[tokio::test]
    async fn test_catch_all_receives_each_round() {
        let (tx, relay) = channel_relay();
        let (out, mut rx) = mpsc::channel(4);
        relay.subscribe(EventClass::ANY, out).unwrap();
        let runner = spawn_run(&relay);

        tx.send(s("1")).await.unwrap();
        assert_eq!(rx.recv().await, Some(s("1")));
        tx.send(s("2")).await.unwrap();
        assert_eq!(rx.recv().await, Some(s("2")));

        relay.stop().unwrap();
        assert_eq!(runner.await.unwrap(), Ok(()));
        assert_eq!(relay.state(), RelayState::Stopped);
        assert_eq!(relay.stats().delivered, 2);
    }

    #[tokio::test]
    async fn test_filters_route_classes() {
        let (tx, relay) = channel_relay();
        let (round_out, mut rounds) = mpsc::channel(8);
        let (answer_out, mut answers) = mpsc::channel(8);
        let (all_out, mut all) = mpsc::channel(8);
        relay.subscribe(EventClass::ROUND_START, round_out).unwrap();
        relay.subscribe(EventClass::ANSWER_RECEIVED, answer_out).unwrap();
        // Registered last: once it sees an event, the others were offered it too.
        relay.subscribe(EventClass::ANY, all_out).unwrap();
        let runner = spawn_run(&relay);

        for ev in [s("1"), a("1"), s("2"), a("2")] {
            tx.send(ev.clone()).await.unwrap();
            assert_eq!(all.recv().await, Some(ev));
        }
        drop(tx);

        assert_eq!(runner.await.unwrap(), Ok(()));
        assert_eq!(received(&mut rounds), vec![s("1"), s("2")]);
        assert_eq!(received(&mut answers), vec![a("1"), a("2")]);
    }

    #[tokio::test]
    async fn test_saturated_subscriber_does_not_block_others() {
        let (tx, relay) = channel_relay();
        let (slow_out, mut slow) = mpsc::channel(1);
        let (fast_out, mut fast) = mpsc::channel(8);
        relay.subscribe_named(EventClass::ANY, "slow", slow_out).unwrap();
        relay.subscribe_named(EventClass::ANY, "fast", fast_out).unwrap();
        let mut notices = relay.notices();
        let runner = spawn_run(&relay);

        for ev in [s("1"), a("1"), s("2")] {
            tx.send(ev.clone()).await.unwrap();
            assert_eq!(fast.recv().await, Some(ev));
        }
        relay.stop().unwrap();
        runner.await.unwrap().unwrap();

        assert_eq!(received(&mut slow), vec![s("1")]);
        let stats = relay.stats();
        assert_eq!(stats.delivered, 4);
        assert_eq!(stats.dropped_full, 2);

        wait_for(&mut notices, NoticeKind::DeliveryDropped).await;
    }

    #[tokio::test]
    async fn test_drains_freshest_state_when_source_ends() {
        let script = [s("1"), s("2"), a("1"), s("4"), s("5"), a("2")].map(Ok);
        let relay = Relay::builder(RelayConfig::default())
            .with_source(Scripted::new(script))
            .build()
            .unwrap();
        let (out, mut rx) = mpsc::channel(8);
        relay.subscribe(EventClass::ANY, out).unwrap();

        // The scripted source never yields, so the reader fills the store
        // before the dispatcher runs on this single-threaded runtime.
        relay.run().await.unwrap();

        assert_eq!(received(&mut rx), vec![s("5"), s("4"), a("2")]);
        let stats = relay.stats();
        assert_eq!(stats.received, 6);
        assert_eq!(stats.evicted, 3);
        assert_eq!(stats.dispatched, 3);
        assert_eq!(relay.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_waits_for_in_flight_read() {
        let reading = Arc::new(Notify::new());
        let relay = Relay::builder(RelayConfig::default())
            .with_source(Slow {
                delay: Duration::from_millis(200),
                reading: Arc::clone(&reading),
            })
            .build()
            .unwrap();
        let (out, mut rx) = mpsc::channel(4);
        relay.subscribe(EventClass::ANY, out).unwrap();
        let runner = spawn_run(&relay);
        reading.notified().await;

        let asked = tokio::time::Instant::now();
        relay.stop().unwrap();
        assert_eq!(relay.state(), RelayState::Stopping);

        relay.stopped().await;
        assert!(asked.elapsed() >= Duration::from_millis(150));
        assert_eq!(runner.await.unwrap(), Ok(()));

        assert!(received(&mut rx).is_empty(), "nothing is delivered after stop");
        assert_eq!(relay.stats().dispatched, 0);
    }

    #[tokio::test]
    async fn test_lifecycle_misuse_fails_fast() {
        let (_tx, relay) = channel_relay();
        assert_eq!(relay.stop(), Err(RelayError::NotStarted));
        assert_eq!(relay.state(), RelayState::Created);

        let mut notices = relay.notices();
        let runner = spawn_run(&relay);
        wait_for(&mut notices, NoticeKind::Started).await;

        assert_eq!(relay.run().await, Err(RelayError::AlreadyStarted));

        relay.stop().unwrap();
        relay.stop().unwrap();
        assert_eq!(runner.await.unwrap(), Ok(()));

        assert_eq!(relay.run().await, Err(RelayError::Stopped));
        let (out, _rx) = mpsc::channel(1);
        assert_eq!(relay.subscribe(EventClass::ANY, out), Err(RelayError::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_run_still_reaches_stopped() {
        let (_tx, relay) = channel_relay();
        let mut notices = relay.notices();

        let res = tokio::time::timeout(Duration::from_millis(20), relay.run()).await;
        assert!(res.is_err(), "run should still be pending on an idle source");

        assert_eq!(relay.state(), RelayState::Stopped);
        tokio::time::timeout(Duration::from_secs(1), relay.stopped())
            .await
            .expect("stopped() must resolve after run is dropped");
        assert_eq!(relay.run().await, Err(RelayError::Stopped));
        assert_eq!(relay.stop(), Ok(()));
        wait_for(&mut notices, NoticeKind::Stopped).await;
    }

    #[tokio::test]
    async fn test_subscribe_rejects_mask_filter() {
        let (_tx, relay) = channel_relay();
        let (out, _rx) = mpsc::channel(1);

        let err = relay.subscribe(EventClass::from_bits(3), out.clone());
        assert!(matches!(err, Err(RelayError::InvalidConfig { .. })));
        assert_eq!(relay.subscriptions(), 0);

        relay.subscribe(EventClass::ANSWER_RECEIVED, out).unwrap();
        assert_eq!(relay.subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_while_running() {
        let (tx, relay) = channel_relay();
        let mut notices = relay.notices();
        let runner = spawn_run(&relay);
        wait_for(&mut notices, NoticeKind::Started).await;

        let (out, mut rx) = mpsc::channel(4);
        let id = relay.subscribe(EventClass::ROUND_START, out).unwrap();
        tx.send(s("1")).await.unwrap();
        assert_eq!(rx.recv().await, Some(s("1")));

        assert!(relay.unsubscribe(id));
        assert_eq!(relay.subscriptions(), 0);

        relay.stop().unwrap();
        runner.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_back_off_then_recover() {
        let relay = Relay::builder(RelayConfig::default())
            .with_source(Scripted::new([
                Err(SourceError::transient("reset")),
                Err(SourceError::transient("reset")),
                Ok(s("1")),
            ]))
            .build()
            .unwrap();
        let (out, mut rx) = mpsc::channel(4);
        relay.subscribe(EventClass::ANY, out).unwrap();
        let mut notices = relay.notices();

        relay.run().await.unwrap();

        assert_eq!(received(&mut rx), vec![s("1")]);
        assert_eq!(relay.stats().source_failures, 2);

        let backoffs: Vec<Option<u32>> = std::iter::from_fn(|| notices.try_recv().ok())
            .filter(|n| n.kind == NoticeKind::BackoffScheduled)
            .map(|n| n.delay_ms)
            .collect();
        assert_eq!(backoffs, vec![Some(10), Some(20)]);
    }

    #[tokio::test]
    async fn test_breaker_stops_relay() {
        let mut cfg = RelayConfig::default();
        cfg.failure = FailurePolicy {
            backoff: BackoffPolicy::immediate(),
            trip_after: Some(3),
        };
        let relay = Relay::builder(cfg)
            .with_source(Scripted::new(
                (0..5).map(|_| Err(SourceError::transient("boom"))),
            ))
            .build()
            .unwrap();

        let res = relay.run().await;
        assert_eq!(
            res,
            Err(RelayError::SourceFailing {
                failures: 3,
                last: "transient source error: boom".into()
            })
        );
        assert_eq!(relay.state(), RelayState::Stopped);
        assert_eq!(relay.stats().source_failures, 3);
    }

    #[tokio::test]
    async fn test_unknown_class_is_rejected_not_delivered() {
        let relay = Relay::builder(RelayConfig::default())
            .with_source(Scripted::new([
                Ok(Event::new(EventClass::from_bits(4), "x")),
                Ok(s("1")),
            ]))
            .build()
            .unwrap();
        let (out, mut rx) = mpsc::channel(4);
        relay.subscribe(EventClass::ANY, out).unwrap();

        relay.run().await.unwrap();

        assert_eq!(received(&mut rx), vec![s("1")]);
        assert_eq!(relay.stats().rejected, 1);
    }
}
