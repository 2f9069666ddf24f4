//! Shared parking lot state
//!
//! This module provides the `Parking` handle, which owns the state every
//! coordinator bound to the same lot operates on, and `ParkingState`, the
//! operations on that state once its lock is held.
//!
//! The state is responsible for:
//! - Tracking parked vehicles in insertion order
//! - Enforcing id uniqueness and the lot capacity
//! - Collecting per-tick fees into the lot balance
//! - Buffering the transactions produced since the last log flush
//!
//! # Construct or attach
//!
//! `Parking::new` allocates a fresh lot. `Parking::attach_or_init` is the
//! guarded one-time initializer for process-wide state: the first call
//! allocates it, every later call binds to the same allocation. Either way the
//! handle is passed explicitly to each coordinator; clones share the state.

use crate::core::settings::{ParkingSettings, Tariffs};
use crate::types::{ParkingError, TransactionInfo, Vehicle};
use chrono::{DateTime, Local};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

static PROCESS_PARKING: OnceLock<Parking> = OnceLock::new();

/// Handle to the state of one parking lot
///
/// Cloning the handle never copies the state: every clone locks the same
/// vehicles, balance and transaction buffer.
#[derive(Debug, Clone)]
pub struct Parking {
    state: Arc<Mutex<ParkingState>>,
    settings: Arc<ParkingSettings>,
}

impl Parking {
    /// Allocate a new, empty parking lot
    pub fn new(settings: ParkingSettings) -> Self {
        Parking {
            state: Arc::new(Mutex::new(ParkingState::new(&settings))),
            settings: Arc::new(settings),
        }
    }

    /// Attach to the process-wide parking lot, creating it on first use
    ///
    /// Only the first call's settings are used. Later calls with different
    /// settings still attach to the existing lot.
    ///
    /// # Arguments
    ///
    /// * `settings` - Configuration used if the lot does not exist yet
    ///
    /// # Returns
    ///
    /// A handle sharing state with every other handle returned by this function
    pub fn attach_or_init(settings: ParkingSettings) -> Self {
        let parking = PROCESS_PARKING.get_or_init(|| Parking::new(settings.clone()));

        if *parking.settings != settings {
            debug!("attached to existing parking lot, ignoring differing settings");
        }

        parking.clone()
    }

    pub fn settings(&self) -> &ParkingSettings {
        &self.settings
    }

    /// Whether both handles share the same state
    pub fn ptr_eq(&self, other: &Parking) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Lock the state for the duration of one operation
    pub fn lock(&self) -> MutexGuard<'_, ParkingState> {
        self.state.lock()
    }
}

/// Vehicles, lot balance and recent transactions of a parking lot
#[derive(Debug)]
pub struct ParkingState {
    vehicles: Vec<Vehicle>,
    balance: Decimal,
    transactions: VecDeque<TransactionInfo>,
    capacity: usize,
    history_limit: usize,
    tariffs: Tariffs,
}

impl ParkingState {
    fn new(settings: &ParkingSettings) -> Self {
        ParkingState {
            vehicles: Vec::with_capacity(settings.capacity),
            balance: settings.initial_balance,
            transactions: VecDeque::new(),
            capacity: settings.capacity,
            history_limit: settings.transaction_history_limit(),
            tariffs: settings.tariffs,
        }
    }

    /// Money collected by the lot so far
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unoccupied places, never negative
    pub fn free_places(&self) -> usize {
        self.capacity.saturating_sub(self.vehicles.len())
    }

    /// Parked vehicles in the order they arrived
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Transactions collected since the last flush, oldest first
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionInfo> + '_ {
        self.transactions.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.vehicles
            .iter()
            .position(|vehicle| vehicle.id().as_str() == id)
    }

    /// Park a vehicle
    ///
    /// The handle is stored as is, so the caller's clone keeps observing
    /// the balance of the parked vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A vehicle with the same id is already parked
    /// - Every place is occupied
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<(), ParkingError> {
        if self.position(vehicle.id().as_str()).is_some() {
            return Err(ParkingError::duplicate_vehicle(vehicle.id().as_str()));
        }

        if self.free_places() == 0 {
            return Err(ParkingError::ParkingFull {
                capacity: self.capacity,
            });
        }

        self.vehicles.push(vehicle);
        Ok(())
    }

    /// Remove a vehicle and discard its transactions that were not flushed yet
    ///
    /// # Errors
    ///
    /// Returns an error if no vehicle with this id is parked
    pub fn remove_vehicle(&mut self, id: &str) -> Result<Vehicle, ParkingError> {
        let index = self
            .position(id)
            .ok_or_else(|| ParkingError::vehicle_not_found(id, "remove"))?;

        let vehicle = self.vehicles.remove(index);
        self.transactions
            .retain(|transaction| transaction.vehicle_id != *vehicle.id());

        Ok(vehicle)
    }

    /// Increase a parked vehicle's balance by `sum`
    ///
    /// # Returns
    ///
    /// The vehicle's balance after the top-up
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `sum` is zero or negative
    /// - No vehicle with this id is parked
    /// - The new balance would overflow
    pub fn top_up_vehicle(&mut self, id: &str, sum: Decimal) -> Result<Decimal, ParkingError> {
        if sum <= Decimal::ZERO {
            return Err(ParkingError::invalid_top_up(id, sum));
        }

        let index = self
            .position(id)
            .ok_or_else(|| ParkingError::vehicle_not_found(id, "top_up"))?;

        self.vehicles[index].credit(sum)
    }

    /// Run one withdrawal sweep over every parked vehicle
    ///
    /// Each vehicle with a positive balance pays its tariff, or whatever it has
    /// left if that is less. The withdrawn amount moves to the lot balance and
    /// is recorded as a transaction stamped `now`. Vehicles with an empty
    /// wallet produce no transaction.
    ///
    /// # Returns
    ///
    /// The total collected in this sweep
    pub fn collect_fees(&mut self, now: DateTime<Local>) -> Decimal {
        let mut collected = Decimal::ZERO;

        for vehicle in &self.vehicles {
            let fee = self.tariffs.rate(vehicle.vehicle_type());
            if self.balance.checked_add(fee).is_none() {
                error!(
                    vehicle = %vehicle.id(),
                    balance = %self.balance,
                    "lot balance would overflow, fee not collected"
                );
                continue;
            }

            let sum = vehicle.debit_up_to(fee);
            if sum.is_zero() {
                continue;
            }

            self.balance += sum;
            collected += sum;
            self.transactions
                .push_back(TransactionInfo::new(vehicle.id().clone(), sum, now));
        }

        let overflow = self.transactions.len().saturating_sub(self.history_limit);
        if overflow > 0 {
            self.transactions.drain(..overflow);
            warn!(
                evicted = overflow,
                limit = self.history_limit,
                "transaction buffer full, oldest transactions evicted before flush"
            );
        }

        collected
    }

    /// Take every buffered transaction, leaving the buffer empty
    pub fn take_transactions(&mut self) -> Vec<TransactionInfo> {
        self.transactions.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VehicleType;
    use rstest::rstest;

    fn vehicle(id: &str, vehicle_type: VehicleType, balance: i64) -> Vehicle {
        Vehicle::new(id, vehicle_type, Decimal::new(balance, 0)).unwrap()
    }

    fn small_lot(capacity: usize) -> Parking {
        Parking::new(ParkingSettings {
            capacity,
            ..ParkingSettings::default()
        })
    }

    #[test]
    fn test_new_parking_is_empty() {
        let parking = Parking::new(ParkingSettings::default());
        let state = parking.lock();

        assert_eq!(state.capacity(), 10);
        assert_eq!(state.free_places(), 10);
        assert_eq!(state.balance(), Decimal::ZERO);
        assert!(state.vehicles().is_empty());
        assert_eq!(state.transactions().count(), 0);
    }

    #[test]
    fn test_initial_balance_is_applied() {
        let parking = Parking::new(ParkingSettings {
            initial_balance: Decimal::new(250, 0),
            ..ParkingSettings::default()
        });

        assert_eq!(parking.lock().balance(), Decimal::new(250, 0));
    }

    #[test]
    fn test_clones_share_state() {
        let parking = Parking::new(ParkingSettings::default());
        let other = parking.clone();

        parking
            .lock()
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();

        assert!(parking.ptr_eq(&other));
        assert_eq!(other.lock().vehicles().len(), 1);
    }

    #[test]
    fn test_separate_parkings_do_not_share_state() {
        let a = Parking::new(ParkingSettings::default());
        let b = Parking::new(ParkingSettings::default());

        a.lock()
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();

        assert!(!a.ptr_eq(&b));
        assert!(b.lock().vehicles().is_empty());
    }

    #[test]
    fn test_attach_or_init_binds_to_one_allocation() {
        let first = Parking::attach_or_init(ParkingSettings::default());
        let second = Parking::attach_or_init(ParkingSettings {
            capacity: 3,
            ..ParkingSettings::default()
        });

        assert!(first.ptr_eq(&second));
        assert_eq!(second.settings(), first.settings());
    }

    #[test]
    fn test_add_vehicle_keeps_insertion_order() {
        let parking = small_lot(10);
        let mut state = parking.lock();

        for id in ["CC-0003-CC", "AA-0001-AA", "BB-0002-BB"] {
            state
                .add_vehicle(vehicle(id, VehicleType::PassengerCar, 10))
                .unwrap();
        }

        let ids: Vec<&str> = state.vehicles().iter().map(|v| v.id().as_str()).collect();
        assert_eq!(ids, ["CC-0003-CC", "AA-0001-AA", "BB-0002-BB"]);
        assert_eq!(state.free_places(), 7);
    }

    #[test]
    fn test_add_duplicate_vehicle_fails() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();

        let result = state.add_vehicle(vehicle("AA-0001-AA", VehicleType::Motorcycle, 200));

        assert_eq!(result, Err(ParkingError::duplicate_vehicle("AA-0001-AA")));
        assert_eq!(state.vehicles().len(), 1);
        assert_eq!(state.vehicles()[0].vehicle_type(), VehicleType::Bus);
    }

    #[test]
    fn test_add_vehicle_to_full_parking_fails() {
        let parking = small_lot(2);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();
        state
            .add_vehicle(vehicle("AA-0002-AA", VehicleType::Bus, 100))
            .unwrap();

        let result = state.add_vehicle(vehicle("AA-0003-AA", VehicleType::Bus, 100));

        assert_eq!(result, Err(ParkingError::ParkingFull { capacity: 2 }));
        assert_eq!(state.free_places(), 0);
    }

    #[test]
    fn test_removed_id_can_be_reused() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();

        state.remove_vehicle("AA-0001-AA").unwrap();
        let result = state.add_vehicle(vehicle("AA-0001-AA", VehicleType::Truck, 10));

        assert!(result.is_ok());
    }

    #[test]
    fn test_remove_unknown_vehicle_fails() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();

        let result = state.remove_vehicle("AA-0002-AA");

        assert_eq!(
            result.unwrap_err(),
            ParkingError::vehicle_not_found("AA-0002-AA", "remove")
        );
        assert_eq!(state.vehicles().len(), 1);
    }

    #[test]
    fn test_remove_discards_pending_transactions_of_that_vehicle() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Truck, 100))
            .unwrap();
        state
            .add_vehicle(vehicle("AA-0002-AA", VehicleType::Bus, 100))
            .unwrap();
        state.collect_fees(Local::now());

        state.remove_vehicle("AA-0001-AA").unwrap();

        let remaining: Vec<&str> = state
            .transactions()
            .map(|t| t.vehicle_id.as_str())
            .collect();
        assert_eq!(remaining, ["AA-0002-AA"]);
        // collected money stays with the lot
        assert_eq!(state.balance(), Decimal::new(85, 1));
    }

    #[test]
    fn test_top_up_increases_only_that_vehicle() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        let first = vehicle("AA-0001-AA", VehicleType::PassengerCar, 100);
        let second = vehicle("AA-0002-AA", VehicleType::PassengerCar, 100);
        state.add_vehicle(first.clone()).unwrap();
        state.add_vehicle(second.clone()).unwrap();

        let balance = state
            .top_up_vehicle("AA-0001-AA", Decimal::new(100, 0))
            .unwrap();

        assert_eq!(balance, Decimal::new(200, 0));
        assert_eq!(first.balance(), Decimal::new(200, 0));
        assert_eq!(second.balance(), Decimal::new(100, 0));
    }

    #[rstest]
    #[case::negative(Decimal::new(-100, 0))]
    #[case::zero(Decimal::ZERO)]
    fn test_top_up_with_non_positive_sum_fails(#[case] sum: Decimal) {
        let parking = small_lot(10);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::PassengerCar, 100))
            .unwrap();

        let result = state.top_up_vehicle("AA-0001-AA", sum);

        assert_eq!(result, Err(ParkingError::invalid_top_up("AA-0001-AA", sum)));
        assert_eq!(state.vehicles()[0].balance(), Decimal::new(100, 0));
    }

    #[test]
    fn test_top_up_unknown_vehicle_fails() {
        let parking = small_lot(10);
        let mut state = parking.lock();

        let result = state.top_up_vehicle("AA-0002-AA", Decimal::new(100, 0));

        assert_eq!(
            result,
            Err(ParkingError::vehicle_not_found("AA-0002-AA", "top_up"))
        );
    }

    #[test]
    fn test_collect_fees_moves_tariff_to_lot_balance() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        let truck = vehicle("AA-0001-AA", VehicleType::Truck, 100);
        state.add_vehicle(truck.clone()).unwrap();

        state.collect_fees(Local::now());
        let collected = state.collect_fees(Local::now());

        assert_eq!(collected, Decimal::new(5, 0));
        assert_eq!(truck.balance(), Decimal::new(90, 0));
        assert_eq!(state.balance(), Decimal::new(10, 0));
        assert_eq!(state.transactions().count(), 2);
    }

    #[test]
    fn test_collect_fees_takes_at_most_the_remaining_balance() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        let car = Vehicle::new("AA-0001-AA", VehicleType::PassengerCar, Decimal::new(3, 0)).unwrap();
        state.add_vehicle(car.clone()).unwrap();

        let amounts: Vec<Decimal> = (0..3).map(|_| state.collect_fees(Local::now())).collect();

        assert_eq!(
            amounts,
            [Decimal::new(2, 0), Decimal::ONE, Decimal::ZERO]
        );
        assert_eq!(car.balance(), Decimal::ZERO);
        assert_eq!(state.balance(), Decimal::new(3, 0));
        // the empty wallet produced no third transaction
        let sums: Vec<Decimal> = state.transactions().map(|t| t.sum).collect();
        assert_eq!(sums, [Decimal::new(2, 0), Decimal::ONE]);
    }

    #[test]
    fn test_collect_fees_uses_configured_tariffs() {
        let parking = Parking::new(ParkingSettings::default().with_tariffs(Tariffs {
            passenger_car: Decimal::ONE,
            truck: Decimal::new(10, 0),
            bus: Decimal::new(7, 0),
            motorcycle: Decimal::ONE,
        }));
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Truck, 100))
            .unwrap();
        state
            .add_vehicle(vehicle("AA-0002-AA", VehicleType::Bus, 100))
            .unwrap();

        state.collect_fees(Local::now());
        state.collect_fees(Local::now());

        let total: Decimal = state.transactions().map(|t| t.sum).sum();
        assert_eq!(total, Decimal::new(34, 0));
    }

    #[test]
    fn test_transaction_buffer_is_bounded() {
        // capacity 1, one tick per flush: the buffer keeps two transactions
        let parking = Parking::new(ParkingSettings::new(
            1,
            Decimal::ZERO,
            std::time::Duration::from_secs(5),
            std::time::Duration::from_secs(5),
        ));
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Motorcycle, 100))
            .unwrap();

        for _ in 0..5 {
            state.collect_fees(Local::now());
        }

        assert_eq!(state.transactions().count(), 2);
        assert_eq!(state.balance(), Decimal::new(5, 0));
    }

    #[test]
    fn test_take_transactions_empties_buffer() {
        let parking = small_lot(10);
        let mut state = parking.lock();
        state
            .add_vehicle(vehicle("AA-0001-AA", VehicleType::Bus, 100))
            .unwrap();
        state.collect_fees(Local::now());

        let taken = state.take_transactions();

        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].sum, Decimal::new(35, 1));
        assert_eq!(state.transactions().count(), 0);
    }
}
