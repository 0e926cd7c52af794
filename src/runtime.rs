//! Process integration
//!
//! Installs an [`ErrorCaptureHandler`] as the process interceptor: panics are
//! recorded as the fatal condition, and the returned [`CaptureGuard`] runs the
//! termination hook when `main` returns or unwinds.
//!
//! The termination hook does not run if the process aborts (`panic = "abort"`)
//! or calls [`std::process::exit`]; call [`CaptureGuard::finish`] first in
//! that case.

use std::any::Any;
use std::panic::{self, Location};
use std::sync::Arc;

use crate::capture::{ErrorCaptureHandler, ErrorEvent, SeverityCode};

/// Keeps the handler installed; runs the termination hook on drop
#[must_use = "dropping the guard runs the termination hook immediately"]
pub struct CaptureGuard {
    handler: Arc<ErrorCaptureHandler>,
}

impl CaptureGuard {
    pub fn handler(&self) -> &Arc<ErrorCaptureHandler> {
        &self.handler
    }

    /// Run the termination hook now
    pub fn finish(self) {
        drop(self);
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.handler.handle_process_termination();
    }
}

/// Activate `handler` and hook it into panic reporting
///
/// A handler that was already activated keeps whatever hooks it had.
pub fn install(handler: Arc<ErrorCaptureHandler>) -> CaptureGuard {
    if handler.activate() {
        install_panic_hook(Arc::clone(&handler));
    }
    CaptureGuard { handler }
}

/// Record every panic as the fatal condition, then defer to the previous hook
pub fn install_panic_hook(handler: Arc<ErrorCaptureHandler>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        handler.record_fatal(fatal_event(info.location(), info.payload()));
        previous(info);
    }));
}

/// Build the fatal event for a panic
///
/// A panic without a location yields an event with no file or line, which
/// the termination hook skips.
fn fatal_event(location: Option<&Location<'_>>, payload: &(dyn Any + Send)) -> ErrorEvent {
    let message = panic_message(payload);
    match location {
        Some(loc) => ErrorEvent::new(SeverityCode::ERROR, message, loc.file(), loc.line()),
        None => ErrorEvent::new(SeverityCode::ERROR, message, "", 0),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
