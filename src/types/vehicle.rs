//! Vehicle-related types for the Cool Parking coordinator
//!
//! This module defines the plate identifier, the vehicle categories and the
//! `Vehicle` handle whose balance is shared between every clone.

use super::error::ParkingError;
use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Registration plate in the `LL-DDDD-LL` format
///
/// Two uppercase ASCII letters, a hyphen, four digits, a hyphen and two
/// uppercase ASCII letters, e.g. `AA-0001-AA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(String);

impl VehicleId {
    const LEN: usize = 10;

    /// Generate a random, well-formed plate
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let mut letters = || -> String {
            (0..2)
                .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
                .collect()
        };
        let prefix = letters();
        let suffix = letters();
        let digits: u16 = rng.gen_range(0..10_000);
        VehicleId(format!("{prefix}-{digits:04}-{suffix}"))
    }

    /// Borrow the plate as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(value: &str) -> bool {
        let bytes = value.as_bytes();
        bytes.len() == Self::LEN
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2] == b'-'
            && bytes[3..7].iter().all(u8::is_ascii_digit)
            && bytes[7] == b'-'
            && bytes[8..].iter().all(u8::is_ascii_uppercase)
    }
}

impl FromStr for VehicleId {
    type Err = ParkingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(value) {
            Ok(VehicleId(value.to_string()))
        } else {
            Err(ParkingError::invalid_vehicle_id(value))
        }
    }
}

impl TryFrom<&str> for VehicleId {
    type Error = ParkingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle categories
///
/// Each category is charged its own per-tick rate, looked up in the
/// configured tariff table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleType {
    PassengerCar,
    Truck,
    Bus,
    Motorcycle,
}

impl VehicleType {
    /// Canonical lowercase name, as used in scripts and CSV output
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::PassengerCar => "passenger_car",
            VehicleType::Truck => "truck",
            VehicleType::Bus => "bus",
            VehicleType::Motorcycle => "motorcycle",
        }
    }
}

impl FromStr for VehicleType {
    type Err = ParkingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "passenger_car" | "passengercar" | "car" => Ok(VehicleType::PassengerCar),
            "truck" => Ok(VehicleType::Truck),
            "bus" => Ok(VehicleType::Bus),
            "motorcycle" => Ok(VehicleType::Motorcycle),
            _ => Err(ParkingError::InvalidVehicleType {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vehicle with its wallet
///
/// `Vehicle` is a handle: cloning it shares the balance cell, so the handle
/// a caller keeps after parking the vehicle observes every fee withdrawal and
/// top-up applied to the parked one. The id and category never change.
#[derive(Clone)]
pub struct Vehicle {
    id: VehicleId,
    vehicle_type: VehicleType,
    balance: Arc<Mutex<Decimal>>,
}

impl Vehicle {
    /// Create a vehicle from a raw plate string
    ///
    /// A zero balance is accepted: the vehicle may park with an empty wallet
    /// and is not charged until it is topped up. Only negative balances are
    /// rejected.
    ///
    /// # Arguments
    ///
    /// * `id` - Plate in the `LL-DDDD-LL` format
    /// * `vehicle_type` - Category used to look up the fee rate
    /// * `balance` - Initial wallet balance (must not be negative)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The id does not match the plate format
    /// - The balance is negative
    pub fn new(
        id: &str,
        vehicle_type: VehicleType,
        balance: Decimal,
    ) -> Result<Self, ParkingError> {
        Self::with_id(id.parse()?, vehicle_type, balance)
    }

    /// Create a vehicle from an already validated plate
    pub fn with_id(
        id: VehicleId,
        vehicle_type: VehicleType,
        balance: Decimal,
    ) -> Result<Self, ParkingError> {
        if balance < Decimal::ZERO {
            return Err(ParkingError::NegativeBalance { balance });
        }

        Ok(Vehicle {
            id,
            vehicle_type,
            balance: Arc::new(Mutex::new(balance)),
        })
    }

    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }

    /// Current wallet balance
    pub fn balance(&self) -> Decimal {
        *self.balance.lock()
    }

    /// Whether both handles point at the same vehicle instance
    pub fn same_vehicle(&self, other: &Vehicle) -> bool {
        Arc::ptr_eq(&self.balance, &other.balance)
    }

    /// Add `sum` to the balance, refusing to overflow
    pub(crate) fn credit(&self, sum: Decimal) -> Result<Decimal, ParkingError> {
        let mut balance = self.balance.lock();
        *balance = balance
            .checked_add(sum)
            .ok_or_else(|| ParkingError::arithmetic_overflow("top_up", self.id.as_str()))?;
        Ok(*balance)
    }

    /// Withdraw at most `fee`, never taking the balance below zero
    ///
    /// Returns the amount actually withdrawn, which is zero when the wallet
    /// is already empty.
    pub(crate) fn debit_up_to(&self, fee: Decimal) -> Decimal {
        let mut balance = self.balance.lock();
        if *balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let withdrawn = (*balance).min(fee);
        *balance -= withdrawn;
        withdrawn
    }
}

impl fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("id", &self.id)
            .field("vehicle_type", &self.vehicle_type)
            .field("balance", &self.balance())
            .finish()
    }
}
