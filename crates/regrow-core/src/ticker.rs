//! Cancelable periodic tick driver.
//!
//! Engine calls never block, so the ticker only has to wake up, run the tick
//! body and go back to sleep. Missed ticks (e.g. after the process was
//! suspended) are skipped rather than replayed in a burst; the next tick
//! resamples the clock and the guard sees one large interval.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle to a running tick loop.
#[derive(Debug)]
pub struct Ticker {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<u64>,
}

impl Ticker {
    /// Spawn a loop calling `on_tick` every `period`, first call immediately.
    ///
    /// The loop ends when `on_tick` returns `ControlFlow::Break` or the
    /// ticker is cancelled. Must be called inside a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => {
                        debug!(ticks, "ticker cancelled");
                        break;
                    }
                    _ = timer.tick() => {
                        ticks += 1;
                        if on_tick().is_break() {
                            debug!(ticks, "ticker stopped by tick body");
                            break;
                        }
                    }
                }
            }
            ticks
        });

        Self {
            cancel: Some(cancel_tx),
            handle,
        }
    }

    /// Stop the loop and wait for it. Returns how many ticks ran, or 0 if
    /// the tick body panicked.
    pub async fn cancel(mut self) -> u64 {
        if let Some(cancel) = self.cancel.take() {
            // Already finished if the receiver is gone.
            let _ = cancel.send(());
        }
        finish(self.handle).await
    }

    /// Wait for the tick body to stop the loop on its own.
    pub async fn join(self) -> u64 {
        // Keep the sender alive so the loop is not cancelled by drop.
        let _cancel = self.cancel;
        finish(self.handle).await
    }
}

async fn finish(handle: JoinHandle<u64>) -> u64 {
    match handle.await {
        Ok(ticks) => ticks,
        Err(e) => {
            warn!(error = %e, "tick loop ended abnormally");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_loop() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);
        let ticker = Ticker::spawn(Duration::from_secs(1), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let ticks = ticker.cancel().await;
        assert_eq!(ticks, 4); // t = 0, 1, 2, 3
        assert_eq!(count.load(Ordering::SeqCst), 4);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_body_can_stop_the_loop() {
        let mut remaining = 3;
        let ticker = Ticker::spawn(Duration::from_millis(100), move || {
            remaining -= 1;
            if remaining == 0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(ticker.join().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_tick_body_ends_the_loop() {
        let ticker = Ticker::spawn(Duration::from_secs(1), || panic!("tick body failed"));
        assert_eq!(ticker.join().await, 0);
    }
}
