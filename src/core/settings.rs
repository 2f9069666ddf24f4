//! Parking lot configuration
//!
//! Every constant the coordinator depends on is enumerated here once, at
//! startup: the number of places, the initial lot balance, both timer periods
//! and the per-category tariff table.

use crate::types::VehicleType;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

/// Per-tick fee charged to each vehicle category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariffs {
    pub passenger_car: Decimal,
    pub truck: Decimal,
    pub bus: Decimal,
    pub motorcycle: Decimal,
}

impl Tariffs {
    /// Fee charged to `vehicle_type` on every withdrawal tick
    pub fn rate(&self, vehicle_type: VehicleType) -> Decimal {
        match vehicle_type {
            VehicleType::PassengerCar => self.passenger_car,
            VehicleType::Truck => self.truck,
            VehicleType::Bus => self.bus,
            VehicleType::Motorcycle => self.motorcycle,
        }
    }
}

impl Default for Tariffs {
    fn default() -> Self {
        Self {
            passenger_car: Decimal::new(2, 0),
            truck: Decimal::new(5, 0),
            bus: Decimal::new(35, 1),
            motorcycle: Decimal::ONE,
        }
    }
}

/// Configuration for a parking lot
///
/// # Defaults
///
/// - `capacity`: 10 places
/// - `initial_balance`: 0
/// - `withdraw_period`: 5 seconds
/// - `log_period`: 60 seconds
/// - `tariffs`: passenger car 2, truck 5, bus 3.5, motorcycle 1
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSettings {
    /// Maximum number of vehicles parked at the same time
    pub capacity: usize,
    /// Lot balance before any fee has been collected
    pub initial_balance: Decimal,
    /// Interval between two fee withdrawal sweeps
    pub withdraw_period: Duration,
    /// Interval between two transaction log flushes
    pub log_period: Duration,
    /// Fee table applied on every sweep
    pub tariffs: Tariffs,
}

impl Default for ParkingSettings {
    fn default() -> Self {
        Self {
            capacity: 10,
            initial_balance: Decimal::ZERO,
            withdraw_period: Duration::from_secs(5),
            log_period: Duration::from_secs(60),
            tariffs: Tariffs::default(),
        }
    }
}

impl ParkingSettings {
    /// Create settings with custom values and default tariffs
    ///
    /// Invalid values fall back to their defaults with a warning:
    /// - a capacity of zero
    /// - a negative initial balance
    /// - a zero withdraw or log period
    pub fn new(
        capacity: usize,
        initial_balance: Decimal,
        withdraw_period: Duration,
        log_period: Duration,
    ) -> Self {
        let default = Self::default();

        let capacity = if capacity == 0 {
            warn!(
                capacity,
                default = default.capacity,
                "invalid capacity, using default"
            );
            default.capacity
        } else {
            capacity
        };

        let initial_balance = if initial_balance < Decimal::ZERO {
            warn!(
                initial_balance = %initial_balance,
                default = %default.initial_balance,
                "invalid initial balance, using default"
            );
            default.initial_balance
        } else {
            initial_balance
        };

        let withdraw_period = if withdraw_period.is_zero() {
            warn!(
                default = ?default.withdraw_period,
                "invalid withdraw period, using default"
            );
            default.withdraw_period
        } else {
            withdraw_period
        };

        let log_period = if log_period.is_zero() {
            warn!(
                default = ?default.log_period,
                "invalid log period, using default"
            );
            default.log_period
        } else {
            log_period
        };

        Self {
            capacity,
            initial_balance,
            withdraw_period,
            log_period,
            tariffs: default.tariffs,
        }
    }

    /// Replace the tariff table
    pub fn with_tariffs(mut self, tariffs: Tariffs) -> Self {
        self.tariffs = tariffs;
        self
    }

    /// Bound of the in-memory recent transactions buffer
    ///
    /// Large enough to hold two flush cycles of a full lot:
    /// `capacity * ceil(log_period / withdraw_period) * 2`.
    pub fn transaction_history_limit(&self) -> usize {
        let withdraw_millis = self.withdraw_period.as_millis().max(1);
        let ticks_per_flush = self.log_period.as_millis().div_ceil(withdraw_millis).max(1);
        let ticks_per_flush = usize::try_from(ticks_per_flush).unwrap_or(usize::MAX);

        self.capacity.saturating_mul(ticks_per_flush).saturating_mul(2)
    }
}
