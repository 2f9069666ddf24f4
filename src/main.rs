//! Cool Parking CLI
//!
//! Replays a simulation script against a parking lot whose timers run in real
//! time.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- script.csv > vehicles.csv
//! cargo run -- --withdraw-period 1 --log-period 10 script.csv > vehicles.csv
//! RUST_LOG=debug cargo run -- --log-file parking.log script.csv
//! ```
//!
//! The program applies the script rows in order, writes the vehicles left in
//! the lot to stdout and appends collected fees to the transaction log.
//! Diagnostics go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, script not found, output not writable, etc.)

use cool_parking::{
    cli, simulation, FileLogService, IntervalTimer, Parking, ParkingError, ParkingService,
};
use std::process;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(args).await {
        error!(error = %e, "simulation failed");
        process::exit(1);
    }
}

async fn run(args: cli::CliArgs) -> Result<(), ParkingError> {
    let parking = Parking::attach_or_init(args.to_settings());
    let settings = parking.settings().clone();

    let service = ParkingService::new(
        parking,
        Arc::new(IntervalTimer::new(settings.withdraw_period, Handle::current())),
        Arc::new(IntervalTimer::new(settings.log_period, Handle::current())),
        Arc::new(FileLogService::new(&args.log_file)),
    );

    let mut output = std::io::stdout();
    let result = simulation::run_script(&service, &args.script_file, &mut output).await;

    info!(
        balance = %service.get_balance(),
        free_places = service.get_free_places(),
        capacity = service.get_capacity(),
        "simulation finished"
    );
    service.dispose();

    result
}
