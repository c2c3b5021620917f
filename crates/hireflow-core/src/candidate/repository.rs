//! Candidate repository trait.

use super::model::Candidate;
use crate::error::Result;
use crate::pipeline::PipelineStage;

/// Access to candidate records held by the candidate service.
///
/// Implementations do not lock; concurrent sessions are last-writer-wins and
/// reconcile through `list_for_job` reloads.
#[async_trait::async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Lists the candidates attached to a job.
    async fn list_for_job(&self, job_id: &str) -> Result<Vec<Candidate>>;

    /// Writes the explicit `pipeline_stage` field of one candidate.
    async fn update_pipeline_stage(&self, candidate_id: &str, stage: PipelineStage) -> Result<()>;
}
