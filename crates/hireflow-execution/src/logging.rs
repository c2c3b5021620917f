//! Tracing subscriber setup.

use hireflow_core::error::{HireError, Result};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::tracing_layer::{TraceEvent, TraceEventLayer};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber with `RUST_LOG` filtering (default `info`).
///
/// Events are formatted to stderr, unless `forward` is given: then hireflow
/// events go to the channel and the host renders them.
pub fn init_tracing(forward: Option<mpsc::UnboundedSender<TraceEvent>>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr = forward
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(forward.map(TraceEventLayer::new))
        .try_init()
        .map_err(|e| HireError::internal(format!("Failed to install tracing subscriber: {}", e)))
}
