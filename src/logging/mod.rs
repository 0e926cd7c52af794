//! Logging system for errlog
//!
//! Sets up the process's own diagnostics, bridges `tracing` events into the
//! capture handler, and prunes expired error logs.

mod layer;
mod retention;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::capture::ErrorSink;
use crate::config::Config;

pub use layer::CaptureLayer;
pub use retention::{sweep, sweep_at, RetentionPolicy};

/// Initialize diagnostics and route qualifying `tracing` events into `sink`
///
/// Human-readable output goes to stderr, filtered by `RUST_LOG`
/// (default `errlog=info`). Events at or above the configured capture level
/// are also submitted to the sink.
pub fn init_logging(config: &Config, sink: Arc<dyn ErrorSink>) -> Result<()> {
    let capture_level = config.capture_level()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "errlog=info".into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(CaptureLayer::new(sink, capture_level))
        .try_init()
        .context("Failed to initialize logging")
}
