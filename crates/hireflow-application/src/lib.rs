//! Application layer for Hireflow.
//!
//! Stateful services that sit between the domain types and the backend
//! adapters: conversation insight caching, prompt enrichment and the hiring
//! pipeline board.

pub mod insight_prefetcher;
pub mod pipeline_board;
pub mod prompt_enricher;

pub use insight_prefetcher::InsightPrefetcher;
pub use pipeline_board::{PipelineBoard, TransitionOutcome};
pub use prompt_enricher::PromptEnricher;
