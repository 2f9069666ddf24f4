//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `vehicle`: Vehicle identity, category and balance handle
//! - `transaction`: Fee collection records
//! - `action`: Parking actions replayed from a simulation script
//! - `error`: Error types for the parking coordinator

pub mod action;
pub mod error;
pub mod transaction;
pub mod vehicle;

pub use action::ParkingAction;
pub use error::{ErrorKind, ParkingError};
pub use transaction::TransactionInfo;
pub use vehicle::{Vehicle, VehicleId, VehicleType};
