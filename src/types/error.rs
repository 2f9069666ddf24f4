//! Error types for the Cool Parking coordinator
//!
//! This module defines all error types that can occur while operating the parking lot.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Malformed vehicle ids, negative balances, non-positive top-ups,
//!   malformed script rows
//! - **Not Found Errors**: Unknown vehicle ids, missing log file
//! - **Conflict Errors**: Duplicate vehicle ids, full parking lot, balance overflow
//! - **I/O Errors**: Log sink failures, missing async runtime

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the parking coordinator
///
/// Every variant is a caller-recoverable condition. Errors raised by a
/// coordinator operation are returned to the invoking call; errors raised
/// inside a periodic sweep or flush are logged and the timer keeps ticking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParkingError {
    /// Vehicle id does not match the `LL-DDDD-LL` plate format
    #[error("Invalid vehicle id '{id}': expected format XX-YYYY-XX")]
    InvalidVehicleId {
        /// The rejected id
        id: String,
    },

    /// Vehicle was constructed with a negative balance
    #[error("Vehicle balance must not be negative, got {balance}")]
    NegativeBalance {
        /// The rejected balance
        balance: Decimal,
    },

    /// Top-up sum is zero or negative
    #[error("Top-up sum for vehicle {vehicle} must be positive, got {sum}")]
    InvalidTopUp {
        /// Vehicle the top-up was addressed to
        vehicle: String,
        /// The rejected sum
        sum: Decimal,
    },

    /// Unknown vehicle category
    #[error("Invalid vehicle type '{value}'")]
    InvalidVehicleType {
        /// The unrecognized category string
        value: String,
    },

    /// Unknown script action
    #[error("Invalid action '{value}'")]
    InvalidAction {
        /// The unrecognized action string
        value: String,
    },

    /// Malformed amount in a script row
    #[error("Invalid amount '{amount}' for {action}")]
    InvalidAmount {
        /// The malformed amount string
        amount: String,
        /// Action the amount belongs to
        action: String,
    },

    /// A required script column is empty
    #[error("{action} action requires {field}")]
    MissingField {
        /// Action that requires the field
        action: String,
        /// Name of the missing column
        field: String,
    },

    /// Script row could not be read
    #[error("Script parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A vehicle with the same id is already parked
    #[error("Vehicle {id} is already parked")]
    DuplicateVehicle {
        /// The duplicated id
        id: String,
    },

    /// Every parking place is occupied
    #[error("Parking is full: all {capacity} places are occupied")]
    ParkingFull {
        /// Configured number of places
        capacity: usize,
    },

    /// No vehicle with the given id is parked
    #[error("Vehicle {id} not found for {operation}")]
    VehicleNotFound {
        /// The unknown id
        id: String,
        /// Operation that failed
        operation: String,
    },

    /// A balance update would overflow
    #[error("Arithmetic overflow in {operation} for vehicle {vehicle}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Vehicle id
        vehicle: String,
    },

    /// The log file has not been created yet
    #[error("Log file not found: {path}")]
    LogNotFound {
        /// Path of the missing log file
        path: String,
    },

    /// The log sink was disposed and no longer accepts writes
    #[error("Log service at {path} has been disposed")]
    LogDisposed {
        /// Path of the disposed log
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// A tokio-driven timer was created outside of a runtime
    #[error("No tokio runtime available to drive the timer")]
    RuntimeUnavailable,
}

/// Coarse classification of [`ParkingError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input rejected at a construction or operation boundary
    Validation,
    /// Operation on an unknown vehicle or missing log
    NotFound,
    /// Operation clashes with the current lot state
    Conflict,
    /// Failure in a collaborator (file system, runtime)
    Io,
}

// Conversion from io::Error to ParkingError
impl From<std::io::Error> for ParkingError {
    fn from(error: std::io::Error) -> Self {
        ParkingError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to ParkingError
impl From<csv::Error> for ParkingError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ParkingError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl ParkingError {
    /// Classify the error into the validation / not found / conflict / I/O taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParkingError::InvalidVehicleId { .. }
            | ParkingError::NegativeBalance { .. }
            | ParkingError::InvalidTopUp { .. }
            | ParkingError::InvalidVehicleType { .. }
            | ParkingError::InvalidAction { .. }
            | ParkingError::InvalidAmount { .. }
            | ParkingError::MissingField { .. }
            | ParkingError::ParseError { .. } => ErrorKind::Validation,
            ParkingError::VehicleNotFound { .. } | ParkingError::LogNotFound { .. } => {
                ErrorKind::NotFound
            }
            ParkingError::DuplicateVehicle { .. }
            | ParkingError::ParkingFull { .. }
            | ParkingError::ArithmeticOverflow { .. } => ErrorKind::Conflict,
            ParkingError::LogDisposed { .. }
            | ParkingError::IoError { .. }
            | ParkingError::RuntimeUnavailable => ErrorKind::Io,
        }
    }

    /// Create an InvalidVehicleId error
    pub fn invalid_vehicle_id(id: &str) -> Self {
        ParkingError::InvalidVehicleId { id: id.to_string() }
    }

    /// Create an InvalidTopUp error
    pub fn invalid_top_up(vehicle: &str, sum: Decimal) -> Self {
        ParkingError::InvalidTopUp {
            vehicle: vehicle.to_string(),
            sum,
        }
    }

    /// Create a DuplicateVehicle error
    pub fn duplicate_vehicle(id: &str) -> Self {
        ParkingError::DuplicateVehicle { id: id.to_string() }
    }

    /// Create a VehicleNotFound error
    pub fn vehicle_not_found(id: &str, operation: &str) -> Self {
        ParkingError::VehicleNotFound {
            id: id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, vehicle: &str) -> Self {
        ParkingError::ArithmeticOverflow {
            operation: operation.to_string(),
            vehicle: vehicle.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, action: &str) -> Self {
        ParkingError::InvalidAmount {
            amount: amount.to_string(),
            action: action.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(action: &str, field: &str) -> Self {
        ParkingError::MissingField {
            action: action.to_string(),
            field: field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_vehicle_id(
        ParkingError::InvalidVehicleId { id: "AA 0001".to_string() },
        "Invalid vehicle id 'AA 0001': expected format XX-YYYY-XX"
    )]
    #[case::negative_balance(
        ParkingError::NegativeBalance { balance: Decimal::new(-100, 0) },
        "Vehicle balance must not be negative, got -100"
    )]
    #[case::invalid_top_up(
        ParkingError::InvalidTopUp { vehicle: "AA-0001-AA".to_string(), sum: Decimal::ZERO },
        "Top-up sum for vehicle AA-0001-AA must be positive, got 0"
    )]
    #[case::parse_error_with_line(
        ParkingError::ParseError { line: Some(3), message: "bad row".to_string() },
        "Script parse error at line 3: bad row"
    )]
    #[case::parse_error_without_line(
        ParkingError::ParseError { line: None, message: "bad row".to_string() },
        "Script parse error: bad row"
    )]
    #[case::duplicate_vehicle(
        ParkingError::DuplicateVehicle { id: "AA-0001-AA".to_string() },
        "Vehicle AA-0001-AA is already parked"
    )]
    #[case::parking_full(
        ParkingError::ParkingFull { capacity: 10 },
        "Parking is full: all 10 places are occupied"
    )]
    #[case::vehicle_not_found(
        ParkingError::VehicleNotFound { id: "AA-0002-AA".to_string(), operation: "remove".to_string() },
        "Vehicle AA-0002-AA not found for remove"
    )]
    #[case::missing_field(
        ParkingError::MissingField { action: "topup".to_string(), field: "amount".to_string() },
        "topup action requires amount"
    )]
    fn test_error_display(#[case] error: ParkingError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_id(ParkingError::invalid_vehicle_id("x"), ErrorKind::Validation)]
    #[case::negative_balance(
        ParkingError::NegativeBalance { balance: Decimal::NEGATIVE_ONE },
        ErrorKind::Validation
    )]
    #[case::invalid_top_up(ParkingError::invalid_top_up("AA-0001-AA", Decimal::ZERO), ErrorKind::Validation)]
    #[case::not_found(ParkingError::vehicle_not_found("AA-0001-AA", "top_up"), ErrorKind::NotFound)]
    #[case::duplicate(ParkingError::duplicate_vehicle("AA-0001-AA"), ErrorKind::Conflict)]
    #[case::full(ParkingError::ParkingFull { capacity: 1 }, ErrorKind::Conflict)]
    #[case::io(ParkingError::IoError { message: "disk full".to_string() }, ErrorKind::Io)]
    fn test_error_kind(#[case] error: ParkingError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: ParkingError = io_error.into();
        assert!(matches!(error, ParkingError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
