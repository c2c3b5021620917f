//! Timing telemetry and live progress reconstruction.
//!
//! Telemetry is only known in full once a debate call has completed, so the
//! live view is recomputed on every tick from whatever telemetry has arrived
//! and the current clock.
//!
//! # Module Structure
//!
//! - `model`: `TimingTelemetry` and `StepRecord` as delivered by the backend
//! - `timeline`: clock alignment and the per-tick `ProgressView` computation
//! - `board`: per-candidate telemetry store with an explicit selection

mod board;
mod model;
mod timeline;

// Re-export public API
pub use board::TelemetryBoard;
pub use model::{StepRecord, TimingTelemetry};
pub use timeline::{
    DEFAULT_IDLE_PROGRESS_FLOOR, ProgressView, SECONDS_SCALE_THRESHOLD_MS, TimelineInput,
    normalize_timestamp_ms, reconstruct, telemetry_start_ms,
};
