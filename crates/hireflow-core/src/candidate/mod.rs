//! Candidate and persona domain module.
//!
//! # Module Structure
//!
//! - `model`: `Candidate` (externally owned, partially annotated here) and `Persona`
//! - `repository`: Repository trait for candidate reads and stage writes

mod model;
mod repository;

// Re-export public API
pub use model::{ActivityCounts, Candidate, Persona};
pub use repository::CandidateRepository;
