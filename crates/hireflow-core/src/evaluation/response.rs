//! Evaluation call responses.

use serde::{Deserialize, Serialize};

use crate::telemetry::TimingTelemetry;

/// One turn of a debate transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: String,
    pub content: String,
}

/// Debate transcript, delivered either as plain text or as turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transcript {
    Text(String),
    Turns(Vec<TranscriptTurn>),
}

impl Transcript {
    pub fn turn_count(&self) -> usize {
        match self {
            Transcript::Text(text) if text.trim().is_empty() => 0,
            Transcript::Text(_) => 1,
            Transcript::Turns(turns) => turns.len(),
        }
    }
}

/// A successful backend answer. Non-success answers surface as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    /// Persisted result id, when the backend returned it directly
    pub result_id: Option<String>,
    /// Correlation id echoed from the request
    pub correlation_id: Option<String>,
    /// Debate only
    pub timing: Option<TimingTelemetry>,
    /// Debate only
    pub transcript: Option<Transcript>,
}
