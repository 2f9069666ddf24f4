//! CSV format handling for simulation scripts and vehicle output
//!
//! This module centralizes all CSV format concerns, providing:
//! - ScriptRecord structure for deserialization
//! - Conversion from script rows to parking actions
//! - Vehicle output serialization
//!
//! All functions are pure (no file access) for easy testing.

use crate::types::{ParkingAction, ParkingError, Vehicle, VehicleType};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

/// CSV record structure for deserialization
///
/// Matches the script format with columns: action, vehicle, type, amount.
/// Every column but `action` is optional, since `wait` rows carry no vehicle
/// and `remove` rows carry no amount.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScriptRecord {
    pub action: String,
    pub vehicle: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub amount: Option<String>,
}

/// Non-blank, trimmed content of an optional column
fn field(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required<'a>(
    value: &'a Option<String>,
    action: &str,
    name: &str,
) -> Result<&'a str, ParkingError> {
    field(value).ok_or_else(|| ParkingError::missing_field(action, name))
}

fn parse_amount(amount: &str, action: &str) -> Result<Decimal, ParkingError> {
    Decimal::from_str(amount).map_err(|_| ParkingError::invalid_amount(amount, action))
}

/// Convert a ScriptRecord to a ParkingAction
///
/// This function:
/// - Parses the action name case-insensitively
/// - Checks that the columns the action needs are present
/// - Parses amounts as decimals and wait durations as (fractional) seconds
///
/// Vehicle ids and balances are not validated here; the vehicle constructor
/// and the coordinator reject them with their usual errors.
///
/// # Arguments
///
/// * `record` - The deserialized script row
///
/// # Returns
///
/// Result containing either:
/// - Ok(ParkingAction) - Successfully converted row
/// - Err(ParkingError) - Validation error describing the conversion failure
pub fn convert_script_record(record: ScriptRecord) -> Result<ParkingAction, ParkingError> {
    let action = record.action.trim().to_lowercase();

    match action.as_str() {
        "add" => {
            let vehicle_type =
                VehicleType::from_str(required(&record.vehicle_type, &action, "type")?)?;
            let balance = parse_amount(required(&record.amount, &action, "amount")?, &action)?;

            Ok(ParkingAction::Add {
                id: field(&record.vehicle).map(str::to_string),
                vehicle_type,
                balance,
            })
        }
        "remove" => Ok(ParkingAction::Remove {
            id: required(&record.vehicle, &action, "vehicle")?.to_string(),
        }),
        "topup" | "top_up" => {
            let id = required(&record.vehicle, &action, "vehicle")?.to_string();
            let sum = parse_amount(required(&record.amount, &action, "amount")?, &action)?;

            Ok(ParkingAction::TopUp { id, sum })
        }
        "wait" => {
            let amount = required(&record.amount, &action, "amount")?;
            let seconds = parse_amount(amount, &action)?;
            if seconds < Decimal::ZERO {
                return Err(ParkingError::invalid_amount(amount, &action));
            }

            let millis = seconds
                .checked_mul(Decimal::ONE_THOUSAND)
                .and_then(|millis| millis.round().to_u64())
                .ok_or_else(|| ParkingError::invalid_amount(amount, &action))?;

            Ok(ParkingAction::Wait {
                duration: Duration::from_millis(millis),
            })
        }
        _ => Err(ParkingError::InvalidAction {
            value: record.action,
        }),
    }
}

/// Write vehicle states to CSV format
///
/// Writes vehicles in CSV format with columns: vehicle, type, balance.
/// Vehicles keep the order they are given in, which for coordinator
/// snapshots is the arrival order.
///
/// # Arguments
///
/// * `vehicles` - Slice of vehicles to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Errors
///
/// Returns an I/O error if writing to `output` fails
pub fn write_vehicles_csv(
    vehicles: &[Vehicle],
    output: &mut dyn Write,
) -> Result<(), ParkingError> {
    let write_error = |e: csv::Error| ParkingError::IoError {
        message: format!("Failed to write vehicle record: {}", e),
    };
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["vehicle", "type", "balance"])
        .map_err(write_error)?;

    for vehicle in vehicles {
        writer
            .write_record(&[
                vehicle.id().to_string(),
                vehicle.vehicle_type().to_string(),
                format!("{:.2}", vehicle.balance()),
            ])
            .map_err(write_error)?;
    }

    writer.flush()?;

    Ok(())
}
