//! Reasoning-step log shown alongside a running evaluation.

mod log;
mod model;

pub use log::ReasoningLog;
pub use model::{ReasoningStep, StepKey, StepPhase, StepStatus};
