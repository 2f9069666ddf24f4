//! Tokio-driven periodic timer
//!
//! `IntervalTimer` spawns one task on a tokio runtime per start. The task
//! ticks with `tokio::time::interval_at`, so the first notification arrives one
//! full period after `start`, and notifies the current handler on every tick.
//!
//! # Threading
//!
//! Handlers run on the runtime's worker threads, concurrently with callers
//! of the coordinator. Missed ticks (a handler slower than the period) are
//! delayed rather than burst.

use super::HandlerSlot;
use crate::core::{ElapsedHandler, Subscription, TimerService};
use crate::types::ParkingError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{trace, warn};

/// Periodic timer backed by a tokio task
pub struct IntervalTimer {
    runtime: Handle,
    interval: Mutex<Duration>,
    slot: Arc<HandlerSlot>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalTimer {
    /// Create a stopped timer whose ticks run on `runtime`
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between two notifications
    /// * `runtime` - Handle of the runtime that drives the ticking task
    pub fn new(interval: Duration, runtime: Handle) -> Self {
        IntervalTimer {
            runtime,
            interval: Mutex::new(interval),
            slot: Arc::new(HandlerSlot::default()),
            task: Mutex::new(None),
        }
    }

    /// Create a stopped timer on the runtime of the calling context
    ///
    /// # Errors
    ///
    /// Returns `RuntimeUnavailable` when called outside of a tokio runtime
    pub fn from_current(interval: Duration) -> Result<Self, ParkingError> {
        let runtime = Handle::try_current().map_err(|_| ParkingError::RuntimeUnavailable)?;
        Ok(Self::new(interval, runtime))
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let slot = Arc::clone(&self.slot);

        self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !slot.notify() {
                    trace!("timer elapsed without subscriber");
                }
            }
        })
    }
}

impl TimerService for IntervalTimer {
    fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    fn set_interval(&self, interval: Duration) {
        *self.interval.lock() = interval;

        if self.is_running() {
            self.stop();
            self.start();
        }
    }

    fn subscribe(&self, handler: ElapsedHandler) -> Subscription {
        self.slot.subscribe(handler)
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.slot.unsubscribe(subscription)
    }

    fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let period = self.interval();
        if period.is_zero() {
            warn!("refusing to start timer with a zero interval");
            return;
        }

        *task = Some(self.spawn_ticker(period));
    }

    fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    fn dispose(&self) {
        self.stop();
        self.slot.clear();
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_timer(period: Duration) -> (IntervalTimer, Arc<AtomicUsize>) {
        let timer = IntervalTimer::from_current(period).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler_counter = Arc::clone(&counter);
        timer.subscribe(Arc::new(move || {
            handler_counter.fetch_add(1, Ordering::SeqCst);
        }));
        (timer, counter)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (timer, counter) = counting_timer(Duration::from_secs(1));
        timer.start();

        time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_notifications() {
        let (timer, counter) = counting_timer(Duration::from_secs(1));
        timer.start();
        time::sleep(Duration::from_millis(1500)).await;

        timer.stop();
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_single_ticker() {
        let (timer, counter) = counting_timer(Duration::from_secs(1));
        timer.start();
        timer.start();

        time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_restarts_running_timer() {
        let (timer, counter) = counting_timer(Duration::from_secs(10));
        timer.start();

        timer.set_interval(Duration::from_secs(1));
        time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(timer.interval(), Duration::from_secs(1));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_does_not_start() {
        let (timer, counter) = counting_timer(Duration::ZERO);
        timer.start();

        time::sleep(Duration::from_secs(1)).await;

        assert!(!timer.is_running());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_and_unsubscribes() {
        let (timer, counter) = counting_timer(Duration::from_secs(1));
        timer.start();

        timer.dispose();
        timer.start();
        time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_current_requires_runtime() {
        let result = IntervalTimer::from_current(Duration::from_secs(1));
        assert!(matches!(result, Err(ParkingError::RuntimeUnavailable)));
    }
}
