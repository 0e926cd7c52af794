//! Error events as delivered by the host runtime

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Integer classification of a runtime error
///
/// Zero is reserved for "missing"; events carrying it are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeverityCode(pub u32);

impl SeverityCode {
    /// Unrecoverable failure (panics)
    pub const ERROR: SeverityCode = SeverityCode(1);
    pub const WARNING: SeverityCode = SeverityCode(2);
    pub const NOTICE: SeverityCode = SeverityCode(8);
    /// Application-raised error (tracing ERROR)
    pub const USER_ERROR: SeverityCode = SeverityCode(256);
    /// Application-raised warning (tracing WARN)
    pub const USER_WARNING: SeverityCode = SeverityCode(512);
    /// Application-raised notice (tracing INFO and below)
    pub const USER_NOTICE: SeverityCode = SeverityCode(1024);

    pub fn is_missing(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SeverityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SeverityCode {
    fn from(code: u32) -> Self {
        SeverityCode(code)
    }
}

impl From<tracing::Level> for SeverityCode {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => SeverityCode::USER_ERROR,
            tracing::Level::WARN => SeverityCode::USER_WARNING,
            _ => SeverityCode::USER_NOTICE,
        }
    }
}

/// A single intercepted error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub severity: SeverityCode,
    pub message: String,
    pub source_file: PathBuf,
    pub source_line: u32,
    /// When the event was raised
    pub timestamp: DateTime<Local>,
}

impl ErrorEvent {
    /// Create an event stamped with the current local time
    pub fn new(
        severity: SeverityCode,
        message: impl Into<String>,
        source_file: impl Into<PathBuf>,
        source_line: u32,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            source_file: source_file.into(),
            source_line,
            timestamp: Local::now(),
        }
    }

    /// True if severity, message, source file and line are all present
    pub fn is_complete(&self) -> bool {
        !self.message.is_empty() && self.has_location()
    }

    /// True if severity, source file and line are present (message may be empty)
    pub fn has_location(&self) -> bool {
        !self.severity.is_missing()
            && !self.source_file.as_os_str().is_empty()
            && self.source_line != 0
    }

    /// Base name of the source file, as shown in records
    pub fn source_name(&self) -> String {
        file_name_lossy(&self.source_file)
    }
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
