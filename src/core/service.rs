//! Parking coordinator
//!
//! This module provides the `ParkingService`, which binds a shared [`Parking`]
//! lot to two timer sources and a log sink:
//!
//! - every withdrawal tick collects one round of fees from the parked vehicles
//! - every log tick moves the buffered transactions to the log sink
//!
//! Callers operate on the same lot through the synchronous methods below.
//!
//! # Locking
//!
//! All access to vehicles, lot balance and transactions goes through the lot's
//! single state lock, held for exactly one operation. A flush takes the
//! buffered transactions under the lock and writes them to the log after
//! releasing it, so slow log I/O never blocks vehicle operations.
//!
//! A separate lifecycle lock is held for reading by every timer callback and
//! for writing by disposal, so disposal waits for an in-flight sweep or flush
//! and callbacks arriving afterwards do nothing.

use crate::core::parking::Parking;
use crate::core::traits::{LogService, Subscription, TimerService};
use crate::types::{ParkingError, TransactionInfo, Vehicle};
use chrono::Local;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Disposed,
}

/// State reachable from the timer callbacks
struct Shared {
    parking: Parking,
    log: Arc<dyn LogService>,
    lifecycle: RwLock<Lifecycle>,
}

impl Shared {
    fn collect_fees(&self) {
        let lifecycle = self.lifecycle.read();
        if *lifecycle == Lifecycle::Disposed {
            return;
        }

        let mut state = self.parking.lock();
        let collected = state.collect_fees(Local::now());
        debug!(
            collected = %collected,
            balance = %state.balance(),
            vehicles = state.vehicles().len(),
            "fees collected"
        );
    }

    fn flush_transactions(&self) {
        let lifecycle = self.lifecycle.read();
        if *lifecycle == Lifecycle::Disposed {
            return;
        }

        let transactions = self.parking.lock().take_transactions();
        let entry = transactions
            .iter()
            .map(TransactionInfo::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        match self.log.write(&entry) {
            Ok(()) => debug!(
                transactions = transactions.len(),
                path = %self.log.log_path().display(),
                "transactions flushed to log"
            ),
            Err(e) => error!(
                transactions = transactions.len(),
                reason = %e,
                "failed to flush transactions to log"
            ),
        }
    }
}

/// Coordinator of one parking lot
///
/// Construction subscribes to and starts both timers. Several coordinators can
/// be bound to the same [`Parking`]; they all observe the same vehicles and
/// balances. Dropping the coordinator (or calling [`ParkingService::dispose`])
/// stops the timers it still owns and disposes the log sink.
pub struct ParkingService {
    shared: Arc<Shared>,
    withdraw_timer: Arc<dyn TimerService>,
    log_timer: Arc<dyn TimerService>,
    withdraw_subscription: Subscription,
    log_subscription: Subscription,
}

impl ParkingService {
    /// Bind a coordinator to a parking lot and start its timers
    ///
    /// Both timer intervals are taken from the lot settings. A timer already
    /// used by another coordinator is re-subscribed to this one.
    ///
    /// # Arguments
    ///
    /// * `parking` - Handle of the lot to coordinate
    /// * `withdraw_timer` - Timer driving fee collection
    /// * `log_timer` - Timer driving log flushes
    /// * `log` - Sink receiving flushed transactions
    pub fn new(
        parking: Parking,
        withdraw_timer: Arc<dyn TimerService>,
        log_timer: Arc<dyn TimerService>,
        log: Arc<dyn LogService>,
    ) -> Self {
        let settings = parking.settings().clone();
        let shared = Arc::new(Shared {
            parking,
            log,
            lifecycle: RwLock::new(Lifecycle::Active),
        });

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        withdraw_timer.set_interval(settings.withdraw_period);
        let withdraw_subscription = withdraw_timer.subscribe(Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.collect_fees();
            }
        }));
        withdraw_timer.start();

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        log_timer.set_interval(settings.log_period);
        let log_subscription = log_timer.subscribe(Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.flush_transactions();
            }
        }));
        log_timer.start();

        info!(
            capacity = settings.capacity,
            withdraw_period = ?settings.withdraw_period,
            log_period = ?settings.log_period,
            "parking service started"
        );

        ParkingService {
            shared,
            withdraw_timer,
            log_timer,
            withdraw_subscription,
            log_subscription,
        }
    }

    /// Handle of the coordinated lot
    pub fn parking(&self) -> &Parking {
        &self.shared.parking
    }

    /// Money collected by the lot so far
    pub fn get_balance(&self) -> Decimal {
        self.shared.parking.lock().balance()
    }

    /// Total number of parking places
    pub fn get_capacity(&self) -> usize {
        self.shared.parking.lock().capacity()
    }

    /// Number of unoccupied places
    pub fn get_free_places(&self) -> usize {
        self.shared.parking.lock().free_places()
    }

    /// Snapshot of the parked vehicles in arrival order
    ///
    /// The returned handles are the parked vehicles themselves, not copies:
    /// their balances keep tracking later sweeps and top-ups.
    pub fn get_vehicles(&self) -> Vec<Vehicle> {
        self.shared.parking.lock().vehicles().to_vec()
    }

    /// Park a vehicle
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A vehicle with the same id is already parked
    /// - The lot is full
    pub fn add_vehicle(&self, vehicle: Vehicle) -> Result<(), ParkingError> {
        let id = vehicle.id().clone();
        let result = self.shared.parking.lock().add_vehicle(vehicle);
        Self::log_result("add", id.as_str(), &result);
        result
    }

    /// Remove a parked vehicle
    ///
    /// Transactions of this vehicle not yet flushed are discarded; the ones
    /// already in the log stay there.
    ///
    /// # Errors
    ///
    /// Returns an error if no vehicle with this id is parked
    pub fn remove_vehicle(&self, vehicle_id: &str) -> Result<(), ParkingError> {
        let result = self
            .shared
            .parking
            .lock()
            .remove_vehicle(vehicle_id)
            .map(|_| ());
        Self::log_result("remove", vehicle_id, &result);
        result
    }

    /// Put `sum` on a parked vehicle's wallet
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `sum` is not positive
    /// - No vehicle with this id is parked
    pub fn top_up_vehicle(&self, vehicle_id: &str, sum: Decimal) -> Result<(), ParkingError> {
        let result = self
            .shared
            .parking
            .lock()
            .top_up_vehicle(vehicle_id, sum)
            .map(|_| ());
        Self::log_result("top_up", vehicle_id, &result);
        result
    }

    /// Transactions collected since the last log flush
    pub fn get_last_parking_transactions(&self) -> Vec<TransactionInfo> {
        self.shared.parking.lock().transactions().cloned().collect()
    }

    /// Full content of the transaction log
    ///
    /// # Errors
    ///
    /// Returns an error if the log sink cannot be read (e.g. nothing was
    /// flushed to a file log yet)
    pub fn read_from_log(&self) -> Result<String, ParkingError> {
        self.shared.log.read()
    }

    /// Stop both timers and dispose the log sink
    ///
    /// Waits for a sweep or flush that is running right now. The lot state
    /// itself survives and stays reachable through other handles.
    ///
    /// A timer that a later coordinator has subscribed to is left running for
    /// that coordinator. The same goes for the log sink when the log timer was
    /// taken over, since the successor keeps flushing into it.
    pub fn dispose(self) {
        drop(self);
    }

    fn shutdown(&mut self) {
        let mut lifecycle = self.shared.lifecycle.write();
        if *lifecycle == Lifecycle::Disposed {
            return;
        }

        // a timer re-subscribed by a later coordinator belongs to that one now
        let owns_withdraw_timer = self.withdraw_timer.unsubscribe(self.withdraw_subscription);
        if owns_withdraw_timer {
            self.withdraw_timer.stop();
            self.withdraw_timer.dispose();
        }

        let owns_log_timer = self.log_timer.unsubscribe(self.log_subscription);
        if owns_log_timer {
            self.log_timer.stop();
            self.log_timer.dispose();
            self.shared.log.dispose();
        }
        *lifecycle = Lifecycle::Disposed;

        info!(owns_withdraw_timer, owns_log_timer, "parking service disposed");
    }

    /// Small helper to log operation results
    fn log_result(operation: &str, vehicle: &str, result: &Result<(), ParkingError>) {
        match result {
            Ok(()) => info!(vehicle = %vehicle, "{operation} applied"),
            Err(e) => info!(vehicle = %vehicle, reason = %e, "{operation} rejected"),
        }
    }
}

impl Drop for ParkingService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
