//! Internal error types
//!
//! Nothing in here crosses the public capture boundary: the handler and the
//! sweeper log these at debug level and carry on.

use std::io;
use std::path::PathBuf;

/// Failure of a single filesystem operation performed while capturing or sweeping
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to append to {path}: {}", categorize_io_error(.source).describe())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete {path}: {}", categorize_io_error(.source).describe())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Categories of disk errors, used to keep debug output readable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or parent directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    /// Short description for diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "disk full",
            DiskErrorKind::PermissionDenied => "permission denied",
            DiskErrorKind::NotFound => "not found",
            DiskErrorKind::Other => "io error",
        }
    }
}

/// Categorize an IO error
pub fn categorize_io_error(e: &io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28, EDQUOT = 122 on Linux / 69 on macOS
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}
