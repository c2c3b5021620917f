//! Evaluation backend contract.
//!
//! # Module Structure
//!
//! - `request`: per-call request and company-note selection
//! - `response`: what a call returns (result id, telemetry, transcript)
//! - `backend`: trait implemented by the HTTP client and test doubles

mod backend;
mod request;
mod response;

// Re-export public API
pub use backend::{EvaluationBackend, ResultQuery, ResultSummary, pick_result};
pub use request::{CompanyNote, CompanyNoteSource, EvaluationRequest, PersonaPrompt, UploadedNote};
pub use response::{CallResponse, Transcript, TranscriptTurn};
