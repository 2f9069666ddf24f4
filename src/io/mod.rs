//! I/O module
//!
//! Handles the transaction log, simulation scripts and CSV output.
//!
//! # Components
//!
//! - `log` - Transaction log sinks (file and in-memory)
//! - `csv_format` - CSV format handling (script row conversion, vehicle output)
//! - `script_reader` - Streaming reader over simulation script actions

pub mod csv_format;
pub mod log;
pub mod script_reader;

pub use csv_format::{convert_script_record, write_vehicles_csv, ScriptRecord};
pub use log::{FileLogService, MemoryLogService};
pub use script_reader::ScriptReader;
