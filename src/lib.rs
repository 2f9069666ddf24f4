//! Cool Parking Library
//! # Overview
//!
//! This library provides a parking lot coordinator that periodically charges
//! parked vehicles a tariff and keeps an append-only log of the collected fees.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Vehicle, VehicleId, TransactionInfo, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::parking`] - Shared lot state: vehicles, balance, recent transactions
//!   - [`core::service`] - Coordinator wiring the lot to its timers and log
//!   - [`core::settings`] - Capacity, periods and tariffs
//! - [`timer`] - Timer sources (tokio interval and manual test timer)
//! - [`io`] - Transaction log sinks, script parsing and CSV output
//! - [`simulation`] - Script replay against a running coordinator
//!
//! # Fees
//!
//! Every withdrawal tick charges each parked vehicle its tariff:
//!
//! - **Passenger car**: 2
//! - **Truck**: 5
//! - **Bus**: 3.5
//! - **Motorcycle**: 1
//!
//! A vehicle that cannot cover its tariff pays what it has left; a vehicle
//! with nothing left pays nothing. Every non-zero charge is credited to the lot
//! balance and recorded as a transaction until the next log flush.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod simulation;
pub mod timer;
pub mod types;

pub use core::{LogService, Parking, ParkingService, ParkingSettings, Tariffs, TimerService};
pub use io::{FileLogService, MemoryLogService};
pub use timer::{IntervalTimer, ManualTimer};
pub use types::{ErrorKind, ParkingError, TransactionInfo, Vehicle, VehicleId, VehicleType};
