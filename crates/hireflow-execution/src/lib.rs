//! Run execution: lane combinator, evaluation orchestrator, live progress
//! and the tracing setup shared by hosts.
//!
//! # Module Structure
//!
//! - `lane`: lane policies, the standard lane plan and `run_lane`
//! - `orchestrator`: `EvaluationOrchestrator`, `RunPlan`, `RunReport`
//! - `progress_ticker`: periodic `ProgressView` recomputation over a watch channel
//! - `events`: `RunEvent`s published while a run is in progress
//! - `logging` / `tracing_layer`: subscriber setup and log forwarding

pub mod events;
pub mod lane;
pub mod logging;
pub mod orchestrator;
pub mod progress_ticker;
pub mod tracing_layer;

pub use events::RunEvent;
pub use lane::{CallPayload, Lane, LanePlan, LanePolicy, TaskOutcome, run_lane};
pub use logging::init_tracing;
pub use orchestrator::{EvaluationOrchestrator, RunPlan, RunReport};
pub use progress_ticker::{ProgressSnapshot, ProgressSource, ProgressTicker};
pub use tracing_layer::{TraceEvent, TraceEventLayer};
