//! Simulation script reader with iterator interface
//!
//! Provides a streaming iterator over the actions of a CSV script. Format
//! concerns are delegated to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, unreadable file) are returned from `new()`
//! - Individual row errors are yielded as `Err` variants by the iterator
//! - Errors carry the line number of the offending row
//!
//! ```no_run
//! use cool_parking::io::ScriptReader;
//! use std::path::Path;
//!
//! let reader = ScriptReader::new(Path::new("script.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(action) => println!("Replaying: {:?}", action),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use crate::io::csv_format::{convert_script_record, ScriptRecord};
use crate::types::{ParkingAction, ParkingError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Streaming reader over the actions of a simulation script
#[derive(Debug)]
pub struct ScriptReader<R = File> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
}

impl ScriptReader<File> {
    /// Open a script file
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be left out)
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV script
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, or a parse error if
    /// its header row cannot be read
    pub fn new(path: &Path) -> Result<Self, ParkingError> {
        let file = File::open(path).map_err(|e| ParkingError::IoError {
            message: format!("Failed to open script '{}': {}", path.display(), e),
        })?;

        Self::from_reader(file)
    }
}

impl<R: Read> ScriptReader<R> {
    /// Read a script from any byte source
    ///
    /// # Errors
    ///
    /// Returns a parse error if the header row cannot be read
    pub fn from_reader(source: R) -> Result<Self, ParkingError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
        })
    }
}

impl<R: Read> Iterator for ScriptReader<R> {
    type Item = Result<ParkingAction, ParkingError>;

    /// Read and convert the next script row
    ///
    /// # Returns
    ///
    /// * `Some(Ok(ParkingAction))` - Successfully parsed row
    /// * `Some(Err(ParkingError))` - Parse or conversion error
    /// * `None` - End of script reached
    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|pos| pos.line());
                let parsed = self
                    .record
                    .deserialize::<ScriptRecord>(Some(&self.headers))
                    .map_err(|e| ParkingError::ParseError {
                        line,
                        message: e.to_string(),
                    })
                    .and_then(convert_script_record);
                Some(parsed)
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}
