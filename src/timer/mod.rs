//! Timer sources for the parking coordinator
//!
//! This module provides the two [`TimerService`](crate::core::TimerService)
//! implementations:
//!
//! - [`IntervalTimer`] - Real periodic clock driven by a tokio task
//! - [`ManualTimer`] - Test double raising a notification on demand
//!
//! Both keep their handler in a [`HandlerSlot`], which holds at most one
//! subscriber at a time.

pub mod interval;
pub mod manual;

pub use interval::IntervalTimer;
pub use manual::ManualTimer;

use crate::core::{ElapsedHandler, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Single-subscriber handler registry shared by the timer implementations
#[derive(Default)]
pub struct HandlerSlot {
    current: Mutex<Option<(Subscription, ElapsedHandler)>>,
    next_id: AtomicU64,
}

impl HandlerSlot {
    /// Install `handler`, replacing the previous subscriber
    pub fn subscribe(&self, handler: ElapsedHandler) -> Subscription {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        *self.current.lock() = Some((subscription, handler));
        subscription
    }

    /// Remove the handler if `subscription` is still the current one
    ///
    /// # Returns
    ///
    /// `true` if the handler was removed
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut current = self.current.lock();
        let is_current = current
            .as_ref()
            .is_some_and(|(active, _)| *active == subscription);
        if is_current {
            *current = None;
        }
        is_current
    }

    /// Remove whatever handler is installed
    pub fn clear(&self) {
        *self.current.lock() = None;
    }

    pub fn is_subscribed(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Invoke the current handler, if any
    ///
    /// The slot lock is released before the handler runs, so a handler may
    /// subscribe or unsubscribe without deadlocking.
    ///
    /// # Returns
    ///
    /// `true` if a handler was notified
    pub fn notify(&self) -> bool {
        let handler = self
            .current
            .lock()
            .as_ref()
            .map(|(_, handler)| Arc::clone(handler));

        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}
