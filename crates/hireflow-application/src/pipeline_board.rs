//! Hiring pipeline board.
//!
//! Candidates are grouped into columns by their resolved stage. Moving a
//! candidate updates the local record immediately and rolls it back if the
//! backend rejects the change. There is no locking across sessions; periodic
//! reloads are the only reconciliation.

use hireflow_core::candidate::{Candidate, CandidateRepository};
use hireflow_core::error::{HireError, Result};
use hireflow_core::pipeline::PipelineStage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Result of a drop onto a stage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The candidate already resolved to the target stage
    Unchanged,
    Moved {
        from: PipelineStage,
        to: PipelineStage,
    },
}

/// Local candidate records for one job, grouped by stage.
#[derive(Clone)]
pub struct PipelineBoard {
    repository: Arc<dyn CandidateRepository>,
    candidates: Arc<RwLock<Vec<Candidate>>>,
}

impl PipelineBoard {
    pub fn new(repository: Arc<dyn CandidateRepository>) -> Self {
        Self {
            repository,
            candidates: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_candidates(repository: Arc<dyn CandidateRepository>, candidates: Vec<Candidate>) -> Self {
        Self {
            repository,
            candidates: Arc::new(RwLock::new(candidates)),
        }
    }

    pub async fn candidates(&self) -> Vec<Candidate> {
        self.candidates.read().await.clone()
    }

    pub async fn candidate(&self, candidate_id: &str) -> Option<Candidate> {
        self.candidates
            .read()
            .await
            .iter()
            .find(|candidate| candidate.id == candidate_id)
            .cloned()
    }

    pub async fn stage_of(&self, candidate_id: &str) -> Option<PipelineStage> {
        self.candidate(candidate_id)
            .await
            .map(|candidate| candidate.resolved_stage())
    }

    /// Every stage column in board order, each with its candidates.
    pub async fn buckets(&self) -> Vec<(PipelineStage, Vec<Candidate>)> {
        let candidates = self.candidates.read().await;
        PipelineStage::all()
            .into_iter()
            .map(|stage| {
                let members = candidates
                    .iter()
                    .filter(|candidate| candidate.resolved_stage() == stage)
                    .cloned()
                    .collect();
                (stage, members)
            })
            .collect()
    }

    /// Moves a candidate to `target`.
    ///
    /// The local record shows the new stage while the update is in flight. On
    /// failure it is restored and the backend error returned.
    pub async fn move_candidate(&self, candidate_id: &str, target: PipelineStage) -> Result<TransitionOutcome> {
        let (from, previous_explicit) = {
            let mut candidates = self.candidates.write().await;
            let candidate = candidates
                .iter_mut()
                .find(|candidate| candidate.id == candidate_id)
                .ok_or_else(|| HireError::not_found("Candidate", candidate_id))?;

            let from = candidate.resolved_stage();
            if from == target {
                tracing::debug!(
                    "[PipelineBoard] {} already in {}; nothing to do",
                    candidate_id,
                    target
                );
                return Ok(TransitionOutcome::Unchanged);
            }

            let previous_explicit = candidate.pipeline_stage;
            candidate.pipeline_stage = Some(target);
            (from, previous_explicit)
        };

        match self.repository.update_pipeline_stage(candidate_id, target).await {
            Ok(()) => {
                tracing::info!(
                    "[PipelineBoard] Moved {} from {} to {}",
                    candidate_id,
                    from,
                    target
                );
                Ok(TransitionOutcome::Moved { from, to: target })
            }
            Err(e) => {
                tracing::warn!(
                    "[PipelineBoard] Stage update for {} rejected, rolling back to {}: {}",
                    candidate_id,
                    from,
                    e
                );
                let mut candidates = self.candidates.write().await;
                if let Some(candidate) = candidates
                    .iter_mut()
                    .find(|candidate| candidate.id == candidate_id)
                    && candidate.pipeline_stage == Some(target)
                {
                    candidate.pipeline_stage = previous_explicit;
                }
                Err(e)
            }
        }
    }

    /// Replaces local records with the backend's view of the job.
    pub async fn reload(&self, job_id: &str) -> Result<usize> {
        let fresh = self.repository.list_for_job(job_id).await?;
        let count = fresh.len();
        *self.candidates.write().await = fresh;
        tracing::debug!("[PipelineBoard] Reloaded {} candidates for job {}", count, job_id);
        Ok(count)
    }

    /// Reloads the board every `interval` until `cancel` fires.
    ///
    /// Reload failures are logged and retried on the next tick.
    pub fn spawn_auto_refresh(
        &self,
        job_id: impl Into<String>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let board = self.clone();
        let job_id = job_id.into();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; the caller already has fresh data.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("[PipelineBoard] Auto-refresh for {} stopped", job_id);
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = board.reload(&job_id).await {
                            tracing::warn!("[PipelineBoard] Auto-refresh for {} failed: {}", job_id, e);
                        }
                    }
                }
            }
        })
    }
}
