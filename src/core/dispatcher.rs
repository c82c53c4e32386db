//! # Dispatcher loop: store → subscribers.
//!
//! ```text
//! loop {
//!   select (biased) {
//!     stop requested   → exit
//!     wake signal      → drain store (remove newest of top-priority bin, multicast, repeat)
//!     source exhausted → final drain, exit
//!   }
//! }
//! ```
//!
//! Wake-ups coalesce into a single permit, so every wake drains the store
//! instead of removing just one event; nothing is left behind when several
//! inserts share one wake-up.

use std::sync::Arc;

use tokio::select;

use super::pump::Pump;

pub(crate) async fn dispatch_loop(pump: Arc<Pump>) {
    loop {
        select! {
            biased;
            _ = pump.token.cancelled() => break,
            _ = pump.wake.notified() => {
                if !pump.drain() {
                    break;
                }
            }
            _ = pump.source_done.cancelled() => {
                pump.drain();
                break;
            }
        }
    }
    tracing::debug!(pending = pump.store.len(), "dispatcher exited");
}
