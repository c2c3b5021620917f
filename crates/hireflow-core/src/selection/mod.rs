//! Selection domain module.
//!
//! Holds what the recruiter picked before launching a run (job, candidates,
//! personas, actions) and the readiness summary derived from it.
//!
//! # Module Structure
//!
//! - `model`: `Action` and the toggle-driven `Selection` state
//! - `validation`: blocking issues and non-blocking warnings

mod model;
mod validation;

// Re-export public API
pub use model::{Action, DEFAULT_MAX_COMPARE_CANDIDATES, MIN_COMPARE_CANDIDATES, Selection};
pub use validation::{ValidationIssue, ValidationSummary, ValidationWarning};
