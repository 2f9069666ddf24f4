//! Parking actions replayed by the simulation runner
//!
//! Actions are the structural result of parsing one script row. Vehicle ids
//! are kept raw so that plate validation happens at vehicle construction and
//! surfaces as the same error a direct caller would get.

use super::vehicle::VehicleType;
use rust_decimal::Decimal;
use std::time::Duration;

/// One step of a simulation script
#[derive(Debug, Clone, PartialEq)]
pub enum ParkingAction {
    /// Park a new vehicle; `id` of `None` asks for a random plate
    Add {
        id: Option<String>,
        vehicle_type: VehicleType,
        balance: Decimal,
    },

    /// Drive a vehicle out of the lot
    Remove { id: String },

    /// Put money on a parked vehicle's wallet
    TopUp { id: String, sum: Decimal },

    /// Let the timers run for the given time
    Wait { duration: Duration },
}
