//! Pipeline stage enum and stage derivation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::candidate::ActivityCounts;

/// The named phase of a candidate's progress through the hiring workflow.
///
/// Any stage may move to any other; the board imposes no transition rules.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    Introduced,
    Review,
    FirstInterview,
    SecondInterview,
    Offer,
    Complete,
}

impl PipelineStage {
    /// All stages in board order.
    pub fn all() -> Vec<PipelineStage> {
        PipelineStage::iter().collect()
    }

    /// Resolves the displayed stage.
    ///
    /// An explicit stage is returned as-is. Otherwise the stage is derived
    /// from activity: evaluations/debates plus the number of recorded
    /// conversations move a candidate forward, and a terminal status
    /// (`accepted`/`rejected`) marks it complete.
    pub fn resolve(
        explicit: Option<PipelineStage>,
        activity: ActivityCounts,
        status: Option<&str>,
    ) -> PipelineStage {
        if let Some(stage) = explicit {
            return stage;
        }

        let assessed = activity.evaluation_count > 0 || activity.debate_count > 0;
        match (assessed, activity.conversation_count) {
            (false, 0) => PipelineStage::Introduced,
            (true, 0) => PipelineStage::FirstInterview,
            (true, 1) => PipelineStage::SecondInterview,
            (true, _) => PipelineStage::Offer,
            (false, _) => match status.map(str::to_ascii_lowercase).as_deref() {
                Some("accepted") | Some("rejected") => PipelineStage::Complete,
                _ => PipelineStage::Review,
            },
        }
    }

    /// Human-facing label for board columns.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Introduced => "Introduced",
            PipelineStage::Review => "Review",
            PipelineStage::FirstInterview => "First Interview",
            PipelineStage::SecondInterview => "Second Interview",
            PipelineStage::Offer => "Offer",
            PipelineStage::Complete => "Complete",
        }
    }
}
