//! Collaborator contracts of the parking coordinator
//!
//! This module defines the trait abstractions for the two collaborators the
//! coordinator is wired to: the periodic timer sources and the transaction log
//! sink. Production and test implementations can be used interchangeably.

use crate::types::ParkingError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked on every elapsed notification
pub type ElapsedHandler = Arc<dyn Fn() + Send + Sync>;

/// Token returned by [`TimerService::subscribe`]
///
/// Unsubscribing with a stale token (one whose handler was already replaced)
/// leaves the current handler untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

/// Source of recurring elapsed notifications
///
/// A timer holds at most one handler: subscribing replaces the previous one.
/// Once started it notifies the current handler once per interval until it is
/// stopped or disposed.
pub trait TimerService: Send + Sync {
    /// Configured notification interval
    fn interval(&self) -> Duration;

    /// Change the notification interval
    ///
    /// A running timer picks up the new interval immediately.
    fn set_interval(&self, interval: Duration);

    /// Register the handler notified on every tick, replacing any previous one
    fn subscribe(&self, handler: ElapsedHandler) -> Subscription;

    /// Remove the handler registered under `subscription`, if it is still current
    ///
    /// # Returns
    ///
    /// `true` if the handler was removed, `false` for a stale token
    fn unsubscribe(&self, subscription: Subscription) -> bool;

    /// Start raising notifications
    fn start(&self);

    /// Stop raising notifications; the timer can be started again
    fn stop(&self);

    /// Stop the timer and drop its handler for good
    fn dispose(&self);
}

/// Append-only text sink for the transaction history
pub trait LogService: Send + Sync {
    /// Storage location of the log
    fn log_path(&self) -> &Path;

    /// Append one entry followed by a newline
    fn write(&self, log_info: &str) -> Result<(), ParkingError>;

    /// Read back everything written so far
    fn read(&self) -> Result<String, ParkingError>;

    /// Release the sink; later writes fail
    fn dispose(&self);
}
