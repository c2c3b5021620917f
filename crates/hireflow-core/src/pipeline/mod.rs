//! Hiring pipeline stages.

mod stage;

pub use stage::PipelineStage;
