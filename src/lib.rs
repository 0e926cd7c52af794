//! errlog - best-effort error capture for a single process
//!
//! Intercepted errors are appended as one-line records to either a single log
//! file or a `<stem>_error.log` next to the source that raised them, and logs
//! older than the retention window are swept at start-up.

pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
