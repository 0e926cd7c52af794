//! Textual projection of an error event

use super::event::ErrorEvent;

/// Timestamp layout used at the start of every record
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which hook produced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Regular error raised while the process runs
    Error,
    /// Fatal condition picked up at process termination
    Shutdown,
}

impl RecordKind {
    /// Line prefix naming the severity field
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Error => "Error type",
            RecordKind::Shutdown => "Shutdown error type",
        }
    }
}

/// Format an event as a single newline-terminated log line
///
/// `[2026-01-21 14:30:45] Error type: 2 | File: index.php | Line: 10 | Message: undefined variable`
///
/// Line breaks inside the message are flattened to spaces.
pub fn format_record(kind: RecordKind, event: &ErrorEvent) -> String {
    format!(
        "[{}] {}: {} | File: {} | Line: {} | Message: {}\n",
        event.timestamp.format(TIMESTAMP_FORMAT),
        kind.label(),
        event.severity,
        event.source_name(),
        event.source_line,
        single_line(&event.message)
    )
}

fn single_line(message: &str) -> String {
    message.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
