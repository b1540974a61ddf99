//! A tick source whose period can be changed while it runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, interval_at};

/// Emits a tick every `period`, where `period` can be swapped out mid-flight
/// via [`VariableTicker::reset`]. The internal tick channel is never closed
/// by a reset — only [`VariableTicker::stop`] halts emission.
pub struct VariableTicker {
    period: Mutex<Duration>,
    stopped: AtomicBool,
    /// Pokes the running clock loop out of its current wait whenever `reset`
    /// or `stop` changes state, so a reset reschedules the pending tick
    /// instead of waiting out the period in effect when the wait began.
    woken: Notify,
    tick_tx: mpsc::Sender<()>,
    tick_rx: Mutex<Option<mpsc::Receiver<()>>>,
}

impl VariableTicker {
    pub fn new(period: Duration) -> Self {
        let (tick_tx, tick_rx) = mpsc::channel(1);
        Self {
            period: Mutex::new(period),
            stopped: AtomicBool::new(false),
            woken: Notify::new(),
            tick_tx,
            tick_rx: Mutex::new(Some(tick_rx)),
        }
    }

    /// Returns the period in effect at the call site. Never blocks a tick.
    pub fn period(&self) -> Duration {
        *self.period.lock().expect("ticker period mutex poisoned")
    }

    /// Takes the tick receiver and runs the internal clock loop until the
    /// sender is dropped (i.e. [`VariableTicker::stop`] is called) or the
    /// channel's last receiver goes away. Must be driven by exactly one
    /// caller, typically spawned alongside the ticker controller.
    pub async fn run(&self) {
        loop {
            if self.stopped.load(Ordering::Acquire) {
                return;
            }
            let period = self.period();
            let mut ticker = interval_at(Instant::now() + period, period);
            tokio::select! {
                _ = ticker.tick() => {
                    if self.stopped.load(Ordering::Acquire) {
                        return;
                    }
                    if self.tick_tx.send(()).await.is_err() {
                        return;
                    }
                }
                _ = self.woken.notified() => {
                    // `reset` or `stop` changed state underneath us; loop
                    // back around to rebuild the timer from the current
                    // period (or return, if we were stopped) instead of
                    // waiting out the one already in flight.
                }
            }
        }
    }

    /// Takes ownership of the receive half so the ticker controller can
    /// `select!` over it. May only be called once.
    pub fn take_receiver(&self) -> mpsc::Receiver<()> {
        self.tick_rx
            .lock()
            .expect("ticker receiver mutex poisoned")
            .take()
            .expect("VariableTicker::take_receiver called more than once")
    }

    /// Changes the period. Safe to call concurrently with tick consumption;
    /// the next tick occurs no sooner than `new_period` from now — the
    /// pending wait is interrupted and restarted from the new period rather
    /// than left to fire on the old one.
    pub fn reset(&self, new_period: Duration) {
        *self.period.lock().expect("ticker period mutex poisoned") = new_period;
        self.woken.notify_one();
    }

    /// Halts tick emission. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.woken.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn reset_changes_period_returned_by_period() {
        let ticker = VariableTicker::new(Duration::from_secs(60));
        assert_eq!(ticker.period(), Duration::from_secs(60));
        ticker.reset(Duration::from_secs(5));
        assert_eq!(ticker.period(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn ticks_arrive_on_the_receiver() {
        let ticker = Arc::new(VariableTicker::new(Duration::from_millis(10)));
        let mut rx = ticker.take_receiver();
        let run_ticker = Arc::clone(&ticker);
        tokio::spawn(async move { run_ticker.run().await });

        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("tick should arrive")
            .expect("channel should stay open");
    }

    /// §8's timing invariant: shrinking the period must reschedule the
    /// pending wait, not wait out the period that was in effect when the
    /// wait began.
    #[tokio::test]
    async fn reset_reschedules_the_pending_tick_instead_of_waiting_it_out() {
        let ticker = Arc::new(VariableTicker::new(Duration::from_secs(10)));
        let mut rx = ticker.take_receiver();
        let run_ticker = Arc::clone(&ticker);
        tokio::spawn(async move { run_ticker.run().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        ticker.reset(Duration::from_millis(50));

        tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("reset should reschedule the pending tick instead of waiting out the old 10s period")
            .expect("channel should stay open");
    }
}
