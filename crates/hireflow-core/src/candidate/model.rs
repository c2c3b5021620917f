//! Candidate and persona models.

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineStage;

/// Activity counters used to derive a pipeline stage when none is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounts {
    #[serde(default)]
    pub evaluation_count: u32,
    #[serde(default)]
    pub debate_count: u32,
    #[serde(default)]
    pub conversation_count: u32,
}

/// A candidate as seen by the evaluation and pipeline features.
///
/// The record is owned by the candidate service; only `pipeline_stage` is
/// written from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Explicit stage chosen by a recruiter; wins over the derived stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_stage: Option<PipelineStage>,
    /// Free-form status from the candidate service (e.g. "accepted")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_status: Option<String>,
    #[serde(flatten)]
    pub activity: ActivityCounts,
    /// Candidate-specific company note, used when the run asks for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_note: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pipeline_stage: None,
            pipeline_status: None,
            activity: ActivityCounts::default(),
            company_note: None,
        }
    }

    /// The stage shown on the board: explicit value, else derived from activity.
    pub fn resolved_stage(&self) -> PipelineStage {
        PipelineStage::resolve(
            self.pipeline_stage,
            self.activity,
            self.pipeline_status.as_deref(),
        )
    }
}

/// An AI interviewer persona whose prompt is enriched per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    /// Technical name; also the request field prefix (`<name>_prompt`)
    pub name: String,
    /// Human-facing name, also used as a guidance lookup key
    pub display_name: String,
    pub system_prompt: String,
}
