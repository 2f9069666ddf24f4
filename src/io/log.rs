//! Transaction log sinks
//!
//! Two [`LogService`] implementations:
//!
//! - [`FileLogService`] - Appends entries to a text file, creating it on demand
//! - [`MemoryLogService`] - Keeps entries in memory and counts write calls
//!
//! Both are safe to share between the coordinator's flush callback and
//! callers reading the log back.

use crate::core::LogService;
use crate::types::ParkingError;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Log sink appending to a file
///
/// Each `write` opens the file in append mode, writes the entry followed by a
/// newline and closes it again, so the file can be inspected between flushes.
#[derive(Debug)]
pub struct FileLogService {
    path: PathBuf,
    /// `true` once disposed; also serializes writers within the process
    disposed: Mutex<bool>,
}

impl FileLogService {
    /// Create a sink writing to `path`
    ///
    /// The file is not touched until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLogService {
            path: path.into(),
            disposed: Mutex::new(false),
        }
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }
}

impl LogService for FileLogService {
    fn log_path(&self) -> &Path {
        &self.path
    }

    fn write(&self, log_info: &str) -> Result<(), ParkingError> {
        let disposed = self.disposed.lock();
        if *disposed {
            return Err(ParkingError::LogDisposed {
                path: self.path_string(),
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", log_info)?;

        debug!(path = %self.path.display(), bytes = log_info.len(), "log entry appended");
        Ok(())
    }

    fn read(&self) -> Result<String, ParkingError> {
        fs::read_to_string(&self.path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => ParkingError::LogNotFound {
                path: self.path_string(),
            },
            _ => error.into(),
        })
    }

    fn dispose(&self) {
        *self.disposed.lock() = true;
    }
}

/// In-memory log sink
///
/// Used where a file is unwanted, e.g. in tests and benchmarks. `read`
/// renders the entries exactly like the file sink would.
#[derive(Debug, Default)]
pub struct MemoryLogService {
    entries: Mutex<Vec<String>>,
    disposed: Mutex<bool>,
}

impl MemoryLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `write` calls
    pub fn write_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Entries in the order they were written
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn is_disposed(&self) -> bool {
        *self.disposed.lock()
    }
}

impl LogService for MemoryLogService {
    fn log_path(&self) -> &Path {
        Path::new(":memory:")
    }

    fn write(&self, log_info: &str) -> Result<(), ParkingError> {
        if self.is_disposed() {
            return Err(ParkingError::LogDisposed {
                path: self.log_path().display().to_string(),
            });
        }
        self.entries.lock().push(log_info.to_string());
        Ok(())
    }

    fn read(&self) -> Result<String, ParkingError> {
        Ok(self
            .entries
            .lock()
            .iter()
            .map(|entry| format!("{}\n", entry))
            .collect())
    }

    fn dispose(&self) {
        *self.disposed.lock() = true;
    }
}
