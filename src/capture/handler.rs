//! Error capture handler
//!
//! The single point every intercepted error flows through. Events are
//! validated, formatted and appended to the target chosen by the routing mode.
//! Nothing here ever returns an error to the caller: malformed events are
//! reported as "not handled" and write failures are dropped.

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Config;

use super::event::{ErrorEvent, SeverityCode};
use super::record::{format_record, RecordKind};
use super::target::TargetResolver;
use super::writer::append_best_effort;

/// Receiver of error events from a host integration
pub trait ErrorSink: Send + Sync {
    /// Submit an event; returns false if it was not handled
    fn submit(&self, event: ErrorEvent) -> bool;
}

/// Lifecycle of a handler within one process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Built but not yet installed as the process interceptor
    Unregistered,
    /// Intercepting errors
    Active,
    /// Running the termination hook
    Finalizing,
    /// Termination hook done; further events are rejected
    Terminated,
}

/// Formats and persists intercepted errors
#[derive(Debug)]
pub struct ErrorCaptureHandler {
    resolver: TargetResolver,
    state: Mutex<HandlerState>,
    /// Last fatal condition seen by the process, consumed at termination
    last_fatal: Mutex<Option<ErrorEvent>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ErrorCaptureHandler {
    pub fn new(resolver: TargetResolver) -> Self {
        Self {
            resolver,
            state: Mutex::new(HandlerState::Unregistered),
            last_fatal: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TargetResolver::from_config(config))
    }

    /// Current lifecycle state
    pub fn state(&self) -> HandlerState {
        *lock(&self.state)
    }

    /// Move from Unregistered to Active
    ///
    /// Returns false if the handler was already activated or has terminated.
    pub fn activate(&self) -> bool {
        let mut state = lock(&self.state);
        if *state == HandlerState::Unregistered {
            *state = HandlerState::Active;
            true
        } else {
            false
        }
    }

    /// Log file an error raised in `source_file` would be appended to
    pub fn target_for(&self, source_file: &Path) -> PathBuf {
        self.resolver.resolve(source_file)
    }

    /// Handle a runtime error
    ///
    /// Returns false without writing anything if any field is empty or zero.
    /// Otherwise appends one record and returns true, whether or not the
    /// append reached the disk.
    pub fn handle_error(
        &self,
        severity: u32,
        message: &str,
        source_file: impl AsRef<Path>,
        source_line: u32,
    ) -> bool {
        self.submit(ErrorEvent::new(
            SeverityCode(severity),
            message,
            source_file.as_ref(),
            source_line,
        ))
    }

    /// Handle an error located at the caller
    #[track_caller]
    pub fn report(&self, severity: SeverityCode, message: impl Into<String>) -> bool {
        let location = Location::caller();
        self.submit(ErrorEvent::new(
            severity,
            message,
            location.file(),
            location.line(),
        ))
    }

    /// Remember `event` as the fatal condition to log at termination
    ///
    /// A later call replaces an earlier one.
    pub fn record_fatal(&self, event: ErrorEvent) {
        *lock(&self.last_fatal) = Some(event);
    }

    /// Fatal condition currently pending, if any
    pub fn last_fatal(&self) -> Option<ErrorEvent> {
        lock(&self.last_fatal).clone()
    }

    /// Termination hook: log the pending fatal condition once
    ///
    /// Only the first call does anything. The record is written if the fatal
    /// condition has a severity, file and line; its message may be empty.
    pub fn handle_process_termination(&self) {
        {
            let mut state = lock(&self.state);
            match *state {
                HandlerState::Finalizing | HandlerState::Terminated => return,
                _ => *state = HandlerState::Finalizing,
            }
        }

        // Release the slot before writing; a panic during the write re-enters record_fatal
        let fatal = lock(&self.last_fatal).take();
        if let Some(event) = fatal {
            if event.has_location() {
                self.write(RecordKind::Shutdown, &event);
            } else {
                tracing::debug!("Discarding incomplete fatal condition at shutdown");
            }
        }

        *lock(&self.state) = HandlerState::Terminated;
    }

    fn write(&self, kind: RecordKind, event: &ErrorEvent) {
        let target = self.resolver.resolve(&event.source_file);
        append_best_effort(&target, &format_record(kind, event));
    }
}

impl ErrorSink for ErrorCaptureHandler {
    fn submit(&self, event: ErrorEvent) -> bool {
        if self.state() == HandlerState::Terminated {
            return false;
        }
        if !event.is_complete() {
            tracing::debug!("Dropping incomplete error event from {:?}", event.source_file);
            return false;
        }
        self.write(RecordKind::Error, &event);
        true
    }
}
