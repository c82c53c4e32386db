//! # Example: relay
//!
//! A bursty producer feeding a relay with two subscribers of different speed.
//!
//! Demonstrates how to:
//! - Feed a [`Relay`] through a [`ChannelSource`].
//! - Subscribe with a class filter and with the catch-all filter.
//! - Watch evictions and skipped deliveries on the notice bus.
//! - Stop on Ctrl-C (or after a few seconds) and read the counters.
//!
//! ## Flow
//! ```text
//! producer ──► ChannelSource ──► Relay ──► "ui"     (ANY, fast, buffer 16)
//!                                    └───► "scorer" (ROUND_START, slow, buffer 1)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=roundrelay=debug cargo run --example relay
//! ```

use std::time::Duration;

use roundrelay::{ChannelSource, Event, EventClass, NoticeKind, Relay, RelayConfig};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Source + relay with the reference store layout
    let (tx, source) = ChannelSource::channel(32);
    let relay = Relay::builder(RelayConfig::default())
        .with_source_ref(source)
        .build()?;

    // 2. Subscribers
    let (ui_tx, mut ui_rx) = mpsc::channel(16);
    relay.subscribe_named(EventClass::ANY, "ui", ui_tx)?;

    let (scorer_tx, mut scorer_rx) = mpsc::channel(1);
    relay.subscribe_named(EventClass::ROUND_START, "scorer", scorer_tx)?;

    tokio::spawn(async move {
        while let Some(ev) = ui_rx.recv().await {
            println!("[ui]     {:?} {}", ev.class(), ev.payload_lossy());
        }
    });
    tokio::spawn(async move {
        while let Some(ev) = scorer_rx.recv().await {
            println!("[scorer] {}", ev.payload_lossy());
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
    });

    // 3. Notices worth seeing
    let mut notices = relay.notices();
    tokio::spawn(async move {
        while let Ok(n) = notices.recv().await {
            match n.kind {
                NoticeKind::Evicted | NoticeKind::DeliveryDropped | NoticeKind::Stopped => {
                    println!("[notice] {:?} class={:?} sub={:?}", n.kind, n.class, n.subscriber);
                }
                _ => {}
            }
        }
    });

    // 4. Producer: rounds with a burst of answers each
    tokio::spawn(async move {
        for round in 1..=10u32 {
            if tx.send(Event::round_start(format!("round-{round}"))).await.is_err() {
                return;
            }
            for answer in 1..=3u32 {
                let ev = Event::answer_received(format!("round-{round}/answer-{answer}"));
                if tx.send(ev).await.is_err() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    // 5. Run until Ctrl-C or timeout
    let runner = {
        let relay = relay.clone();
        tokio::spawn(async move { relay.run().await })
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => println!("ctrl-c received"),
        _ = tokio::time::sleep(Duration::from_secs(3)) => println!("timeout"),
        _ = relay.stopped() => println!("source finished"),
    }
    relay.stop()?;
    runner.await??;

    println!("{:#?}", relay.stats());
    Ok(())
}
