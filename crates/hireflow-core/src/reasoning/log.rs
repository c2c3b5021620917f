//! Append-only reasoning log shared by concurrent calls.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::model::{ReasoningStep, StepKey, StepStatus};

/// Reasoning steps of the current run.
///
/// Cloning shares the underlying log. Steps are only appended or updated in
/// place by key, so concurrent writers never lose each other's entries.
#[derive(Debug, Clone, Default)]
pub struct ReasoningLog {
    steps: Arc<RwLock<Vec<ReasoningStep>>>,
}

impl ReasoningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reset(&self) {
        self.steps.write().await.clear();
    }

    /// Appends a step and returns its 1-based number.
    pub async fn append(
        &self,
        key: StepKey,
        title: impl Into<String>,
        content: impl Into<String>,
        status: StepStatus,
    ) -> u32 {
        let mut steps = self.steps.write().await;
        let step = steps.len() as u32 + 1;
        steps.push(ReasoningStep {
            key,
            step,
            title: title.into(),
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            status,
        });
        step
    }

    /// Updates the latest step with `key`. Returns `false` when no step has it.
    pub async fn update(&self, key: &StepKey, status: StepStatus, content: impl Into<String>) -> bool {
        let mut steps = self.steps.write().await;
        match steps.iter_mut().rev().find(|step| &step.key == key) {
            Some(step) => {
                step.status = status;
                step.content = content.into();
                step.timestamp = chrono::Utc::now().to_rfc3339();
                true
            }
            None => false,
        }
    }

    /// Updates the step with `key`, appending it with `title` if it does not exist yet.
    pub async fn upsert(
        &self,
        key: StepKey,
        title: impl Into<String>,
        status: StepStatus,
        content: impl Into<String>,
    ) {
        let content = content.into();
        if !self.update(&key, status, content.clone()).await {
            self.append(key, title, content, status).await;
        }
    }

    /// Marks every step with one of `keys` that is still `Processing` as
    /// `Error`. Returns how many steps were closed.
    pub async fn fail_processing(&self, keys: &[StepKey], content: &str) -> usize {
        let mut steps = self.steps.write().await;
        let mut closed = 0;
        for step in steps
            .iter_mut()
            .filter(|step| step.status == StepStatus::Processing && keys.contains(&step.key))
        {
            step.status = StepStatus::Error;
            step.content = content.to_string();
            step.timestamp = chrono::Utc::now().to_rfc3339();
            closed += 1;
        }
        closed
    }

    pub async fn snapshot(&self) -> Vec<ReasoningStep> {
        self.steps.read().await.clone()
    }

    pub async fn errors(&self) -> Vec<ReasoningStep> {
        self.steps
            .read()
            .await
            .iter()
            .filter(|step| step.status == StepStatus::Error)
            .cloned()
            .collect()
    }
}
