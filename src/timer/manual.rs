//! Manually fired timer
//!
//! `ManualTimer` satisfies the timer contract without a clock: a caller raises
//! each elapsed notification with [`ManualTimer::fire`], and the handler runs
//! synchronously on the caller's thread. This makes the sweep and flush
//! behaviour of the coordinator deterministic in tests.

use super::HandlerSlot;
use crate::core::{ElapsedHandler, Subscription, TimerService};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Timer whose ticks are raised by hand
#[derive(Default)]
pub struct ManualTimer {
    interval: Mutex<Duration>,
    slot: HandlerSlot,
    running: AtomicBool,
    fired: AtomicUsize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise one elapsed notification now
    ///
    /// Nothing happens unless the timer is started and has a subscriber.
    pub fn fire(&self) {
        if !self.is_running() {
            return;
        }
        if self.slot.notify() {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.is_subscribed()
    }

    /// Number of notifications delivered so far
    pub fn fire_count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }
}

impl TimerService for ManualTimer {
    fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    fn set_interval(&self, interval: Duration) {
        *self.interval.lock() = interval;
    }

    fn subscribe(&self, handler: ElapsedHandler) -> Subscription {
        self.slot.subscribe(handler)
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.slot.unsubscribe(subscription)
    }

    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn dispose(&self) {
        self.stop();
        self.slot.clear();
    }
}
