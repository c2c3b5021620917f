//! Reasoning step models.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

use crate::selection::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// The phase of an operation a step describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepPhase {
    Validation,
    Insights,
    Lane,
    Request,
    ResultLookup,
    Summary,
}

/// Stable identity of a step: (operation, candidate, phase).
///
/// Updates are targeted at the key, so two steps with similar titles never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey {
    /// `None` for run-level steps
    pub action: Option<Action>,
    pub candidate_id: Option<String>,
    pub phase: StepPhase,
}

impl StepKey {
    pub fn run(phase: StepPhase) -> Self {
        Self {
            action: None,
            candidate_id: None,
            phase,
        }
    }

    pub fn lane(action: Action) -> Self {
        Self {
            action: Some(action),
            candidate_id: None,
            phase: StepPhase::Lane,
        }
    }

    pub fn call(action: Action, candidate_id: impl Into<String>, phase: StepPhase) -> Self {
        Self {
            action: Some(action),
            candidate_id: Some(candidate_id.into()),
            phase,
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = self
            .action
            .map(|action| action.to_string())
            .unwrap_or_else(|| "run".to_string());
        match &self.candidate_id {
            Some(candidate_id) => write!(f, "{action}/{candidate_id}/{}", self.phase),
            None => write!(f, "{action}/{}", self.phase),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub key: StepKey,
    /// 1-based position in the log
    pub step: u32,
    pub title: String,
    pub content: String,
    /// RFC 3339
    pub timestamp: String,
    pub status: StepStatus,
}
