//! Tick sources — injected scheduling for the poll loop.
//!
//! Production drives the loop from the wall clock with
//! `IntervalTicks`; tests drive `ManualTicks` explicitly so nothing
//! ever waits on a real timer.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Yields poll ticks until the source is exhausted or cancelled.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick. `false` means the source is done and
    /// the loop should stop.
    async fn next_tick(&mut self) -> bool;
}

/// Fixed-interval wall-clock ticks.
///
/// The first tick fires immediately so a watcher starts with its
/// bootstrap poll instead of sleeping through the first interval.
/// Cancel by aborting the task that drives the loop.
pub struct IntervalTicks {
    interval: tokio::time::Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Manually driven ticks, for tests and embedders.
///
/// Queued ticks drain in order; once every `TickHandle` is dropped the
/// source ends and the loop stops.
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sends ticks into a `ManualTicks` source.
#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicks {
    pub fn channel() -> (TickHandle, ManualTicks) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TickHandle { tx }, ManualTicks { rx })
    }
}

impl TickHandle {
    /// Queue one tick. Returns `false` if the receiving loop is gone.
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
