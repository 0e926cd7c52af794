//! Error capture
//!
//! Turns intercepted errors into one-line records appended to a log file
//! chosen by the configured routing mode.

mod event;
mod handler;
mod record;
mod target;
mod writer;

pub use event::{ErrorEvent, SeverityCode};
pub use handler::{ErrorCaptureHandler, ErrorSink, HandlerState};
pub use record::{format_record, RecordKind, TIMESTAMP_FORMAT};
pub use target::{is_per_source_log_name, per_source_log_path, TargetResolver, PER_SOURCE_SUFFIX};
pub use writer::{append_best_effort, append_record};
