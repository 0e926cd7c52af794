//! Tracing integration
//!
//! Forwards application `tracing` events into an [`ErrorSink`], so warnings
//! and errors logged anywhere in the process land in the error logs.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::capture::{ErrorEvent, ErrorSink, SeverityCode};

/// Events from this crate are never forwarded
const OWN_TARGET: &str = "errlog";

/// Layer that submits qualifying events to a sink
pub struct CaptureLayer {
    sink: Arc<dyn ErrorSink>,
    min_level: Level,
}

impl CaptureLayer {
    /// Forward events at `min_level` or more severe
    pub fn new(sink: Arc<dyn ErrorSink>, min_level: Level) -> Self {
        Self { sink, min_level }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();

        // Level ordering: ERROR is the smallest
        if *meta.level() > self.min_level {
            return;
        }
        if meta.target() == OWN_TARGET || meta.target().starts_with("errlog::") {
            return;
        }
        let (Some(file), Some(line)) = (meta.file(), meta.line()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.sink.submit(ErrorEvent::new(
            SeverityCode::from(*meta.level()),
            visitor.finish(),
            file,
            line,
        ));
    }
}

/// Collects the `message` field plus any other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            let _ = write!(self.fields, "{}={:?}", field.name(), value);
        }
    }
}
