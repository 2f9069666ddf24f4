//! Fee collection records
//!
//! A `TransactionInfo` is produced once per vehicle per withdrawal sweep in
//! which money was actually taken, and is rendered as one log line on flush.

use super::vehicle::VehicleId;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::fmt;

/// Record of one fee withdrawal
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInfo {
    /// Vehicle the fee was withdrawn from
    pub vehicle_id: VehicleId,

    /// Amount withdrawn in this sweep
    pub sum: Decimal,

    /// Moment the sweep ran
    pub timestamp: DateTime<Local>,
}

impl TransactionInfo {
    pub fn new(vehicle_id: VehicleId, sum: Decimal, timestamp: DateTime<Local>) -> Self {
        TransactionInfo {
            vehicle_id,
            sum,
            timestamp,
        }
    }
}

impl fmt::Display for TransactionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} money withdrawn from vehicle with Id='{}'.",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.sum,
            self.vehicle_id
        )
    }
}
