//! Domain layer for Hireflow.
//!
//! Holds the types shared by every other crate together with the pure parts
//! of the system: selection validation, pipeline stage derivation and the
//! progress timeline computation. Backend collaborators are described here as
//! traits and implemented elsewhere.

pub mod candidate;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod insight;
pub mod pipeline;
pub mod reasoning;
pub mod selection;
pub mod telemetry;

// Re-export common error type
pub use error::{HireError, Result};
