//! Core business logic module
//!
//! This module contains the parking coordination components:
//! - `traits` - Contracts of the timer sources and the log sink
//! - `settings` - Lot configuration and tariff table
//! - `parking` - Shared lot state and its operations
//! - `service` - Coordinator wiring the lot to its timers and log

pub mod parking;
pub mod service;
pub mod settings;
pub mod traits;

pub use parking::{Parking, ParkingState};
pub use service::ParkingService;
pub use settings::{ParkingSettings, Tariffs};
pub use traits::{ElapsedHandler, LogService, Subscription, TimerService};
