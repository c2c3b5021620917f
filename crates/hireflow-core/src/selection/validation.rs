//! Readiness summary derived from a `Selection`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::{Action, Selection};

/// A problem that blocks the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingJob,
    MissingPersona,
    MissingCandidate,
    MissingAction,
    /// Only `compare` is selected; it is a mode and issues no calls
    NoRunnableAction,
    CompareNeedsMoreCandidates { selected: usize },
    TooManyCandidates { selected: usize, limit: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingJob => write!(f, "select a job"),
            ValidationIssue::MissingPersona => write!(f, "select at least one persona"),
            ValidationIssue::MissingCandidate => write!(f, "select a candidate"),
            ValidationIssue::MissingAction => write!(f, "select at least one action"),
            ValidationIssue::NoRunnableAction => {
                write!(f, "compare needs evaluate or debate to run")
            }
            ValidationIssue::CompareNeedsMoreCandidates { selected } => write!(
                f,
                "compare needs at least 2 candidates ({selected} selected)"
            ),
            ValidationIssue::TooManyCandidates { selected, limit } => {
                write!(f, "at most {limit} candidates allowed ({selected} selected)")
            }
        }
    }
}

/// Something worth showing that does not block the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Several candidates are selected but no action compares them
    MultipleCandidatesWithoutCompare { selected: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MultipleCandidatesWithoutCompare { selected } => write!(
                f,
                "{selected} candidates selected without compare; each is run separately"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub issues: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationSummary {
    pub fn evaluate(selection: &Selection) -> Self {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();
        let candidates = selection.candidate_ids().len();

        if selection.job_id().is_none() {
            issues.push(ValidationIssue::MissingJob);
        }
        if selection.persona_ids().is_empty() {
            issues.push(ValidationIssue::MissingPersona);
        }
        if candidates == 0 {
            issues.push(ValidationIssue::MissingCandidate);
        }
        if selection.actions().is_empty() {
            issues.push(ValidationIssue::MissingAction);
        } else if selection.runnable_actions().is_empty() {
            issues.push(ValidationIssue::NoRunnableAction);
        }

        if selection.has_action(Action::Compare) {
            if candidates == 1 {
                issues.push(ValidationIssue::CompareNeedsMoreCandidates { selected: candidates });
            }
            if candidates > selection.max_compare_candidates() {
                issues.push(ValidationIssue::TooManyCandidates {
                    selected: candidates,
                    limit: selection.max_compare_candidates(),
                });
            }
        } else if candidates > 1 {
            warnings.push(ValidationWarning::MultipleCandidatesWithoutCompare {
                selected: candidates,
            });
        }

        Self { issues, warnings }
    }

    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }

    /// Converts blocking issues into an error, for callers that gate on readiness.
    pub fn into_result(self) -> crate::error::Result<Vec<ValidationWarning>> {
        if self.issues.is_empty() {
            Ok(self.warnings)
        } else {
            Err(crate::error::HireError::Validation(self.issues))
        }
    }
}
