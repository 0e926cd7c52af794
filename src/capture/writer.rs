//! Append-only record writer
//!
//! Each record goes out in a single `write_all` on an append-mode handle, so
//! concurrent writers from other processes interleave whole lines. There is
//! no locking across processes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::CaptureError;

/// Append `record` to `path`, creating the file if absent
///
/// The parent directory is never created.
pub fn append_record(path: &Path, record: &str) -> Result<(), CaptureError> {
    let to_err = |source| CaptureError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_err)?;

    file.write_all(record.as_bytes()).map_err(to_err)?;
    file.flush().map_err(to_err)
}

/// Append and swallow any failure
pub fn append_best_effort(path: &Path, record: &str) {
    if let Err(e) = append_record(path, record) {
        tracing::debug!("Dropped error record: {}", e);
    }
}
