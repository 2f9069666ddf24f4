use crate::core::ParkingSettings;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

/// Simulate a parking lot collecting fees from parked vehicles
#[derive(Parser, Debug)]
#[command(name = "cool-parking")]
#[command(about = "Simulate a parking lot collecting fees from parked vehicles", long_about = None)]
pub struct CliArgs {
    /// Simulation script with columns action, vehicle, type, amount
    #[arg(value_name = "SCRIPT", help = "Path to the simulation script CSV file")]
    pub script_file: PathBuf,

    /// Transaction log file
    #[arg(
        long = "log-file",
        value_name = "PATH",
        default_value = "Transactions.log",
        help = "File the transaction log is appended to"
    )]
    pub log_file: PathBuf,

    /// Number of parking places
    #[arg(
        long = "capacity",
        value_name = "PLACES",
        help = "Number of parking places (default: 10)"
    )]
    pub capacity: Option<usize>,

    /// Starting lot balance
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        help = "Lot balance before any fee is collected (default: 0)"
    )]
    pub initial_balance: Option<Decimal>,

    /// Seconds between fee withdrawals
    #[arg(
        long = "withdraw-period",
        value_name = "SECONDS",
        help = "Seconds between two fee withdrawals (default: 5)"
    )]
    pub withdraw_period: Option<u64>,

    /// Seconds between log flushes
    #[arg(
        long = "log-period",
        value_name = "SECONDS",
        help = "Seconds between two transaction log flushes (default: 60)"
    )]
    pub log_period: Option<u64>,
}

impl CliArgs {
    /// Create ParkingSettings from CLI arguments
    ///
    /// Values not given on the command line take their defaults. Invalid
    /// values (zero capacity or period, negative balance) fall back to their
    /// defaults with a warning.
    ///
    /// # Returns
    ///
    /// `ParkingSettings` with values from CLI arguments or defaults.
    pub fn to_settings(&self) -> ParkingSettings {
        let default = ParkingSettings::default();

        if self.capacity.is_none()
            && self.initial_balance.is_none()
            && self.withdraw_period.is_none()
            && self.log_period.is_none()
        {
            return default;
        }

        ParkingSettings::new(
            self.capacity.unwrap_or(default.capacity),
            self.initial_balance.unwrap_or(default.initial_balance),
            self.withdraw_period
                .map(Duration::from_secs)
                .unwrap_or(default.withdraw_period),
            self.log_period
                .map(Duration::from_secs)
                .unwrap_or(default.log_period),
        )
    }
}
