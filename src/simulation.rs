//! Script-driven parking simulation
//!
//! Replays the actions of a CSV script against a running coordinator. `wait`
//! rows suspend the replay so the coordinator's timers can collect fees and
//! flush the log in the meantime.

use crate::core::ParkingService;
use crate::io::{write_vehicles_csv, ScriptReader};
use crate::types::{ParkingAction, ParkingError, Vehicle, VehicleId};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Replay a script against `service` and write the final vehicles to `output`
///
/// Rows are applied in order. A row that cannot be parsed or that the
/// coordinator rejects is logged and skipped; the replay goes on with the next
/// one.
///
/// # Arguments
///
/// * `service` - Coordinator the actions are applied to
/// * `path` - Path to the CSV script
/// * `output` - Writer receiving the `vehicle,type,balance` CSV
///
/// # Errors
///
/// Returns an error if the script cannot be opened or the output cannot be
/// written
pub async fn run_script(
    service: &ParkingService,
    path: &Path,
    output: &mut dyn Write,
) -> Result<(), ParkingError> {
    let reader = ScriptReader::new(path)?;

    for (index, action) in reader.enumerate() {
        let row = index + 1;
        let result = match action {
            Ok(action) => apply(service, action).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            warn!(row, error = %e, "skipping script row");
        }
    }

    write_vehicles_csv(&service.get_vehicles(), output)
}

async fn apply(service: &ParkingService, action: ParkingAction) -> Result<(), ParkingError> {
    match action {
        ParkingAction::Add {
            id,
            vehicle_type,
            balance,
        } => {
            let vehicle = match id {
                Some(id) => Vehicle::new(&id, vehicle_type, balance)?,
                None => Vehicle::with_id(VehicleId::random(), vehicle_type, balance)?,
            };
            service.add_vehicle(vehicle)
        }
        ParkingAction::Remove { id } => service.remove_vehicle(&id),
        ParkingAction::TopUp { id, sum } => service.top_up_vehicle(&id, sum),
        ParkingAction::Wait { duration } => {
            debug!(?duration, "waiting");
            tokio::time::sleep(duration).await;
            Ok(())
        }
    }
}
