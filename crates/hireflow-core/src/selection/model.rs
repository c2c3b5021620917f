//! Selection state and toggle semantics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter, EnumString};

use super::validation::ValidationSummary;

/// Upper bound on candidates selectable while `compare` is active.
pub const DEFAULT_MAX_COMPARE_CANDIDATES: usize = 5;

/// Fewest candidates a comparison needs.
pub const MIN_COMPARE_CANDIDATES: usize = 2;

/// An operation the recruiter can launch against the selected candidates.
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
pub enum Action {
    /// Single-pass evaluation; foreground work the recruiter waits on
    Evaluate,
    /// Multi-persona debate; long running, reports timing telemetry
    Debate,
    /// Side-by-side comparison mode; unlocks multi-candidate selection
    Compare,
}

/// What the recruiter has picked for the next run.
///
/// Invariant: without `compare` at most one candidate is selected; with
/// `compare` at most `max_compare_candidates` are. Candidate and persona ids
/// keep their selection order because request fields and result ids follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    job_id: Option<String>,
    candidate_ids: Vec<String>,
    persona_ids: Vec<String>,
    actions: BTreeSet<Action>,
    max_compare_candidates: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::with_compare_limit(DEFAULT_MAX_COMPARE_CANDIDATES)
    }

    /// Creates an empty selection with a custom compare limit, clamped to
    /// `MIN_COMPARE_CANDIDATES..=DEFAULT_MAX_COMPARE_CANDIDATES`.
    pub fn with_compare_limit(max_compare_candidates: usize) -> Self {
        Self {
            job_id: None,
            candidate_ids: Vec::new(),
            persona_ids: Vec::new(),
            actions: BTreeSet::new(),
            max_compare_candidates: max_compare_candidates
                .clamp(MIN_COMPARE_CANDIDATES, DEFAULT_MAX_COMPARE_CANDIDATES),
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn candidate_ids(&self) -> &[String] {
        &self.candidate_ids
    }

    pub fn persona_ids(&self) -> &[String] {
        &self.persona_ids
    }

    pub fn actions(&self) -> &BTreeSet<Action> {
        &self.actions
    }

    pub fn max_compare_candidates(&self) -> usize {
        self.max_compare_candidates
    }

    pub fn has_action(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn is_comparing(&self) -> bool {
        self.has_action(Action::Compare)
    }

    /// Picks a job. Everything chosen for the previous job is discarded.
    pub fn set_job(&mut self, job_id: impl Into<String>) {
        self.job_id = Some(job_id.into());
        self.candidate_ids.clear();
        self.persona_ids.clear();
        self.actions.clear();
    }

    /// Toggles a candidate.
    ///
    /// In compare mode ids are added or removed freely up to the compare
    /// limit. Otherwise selection behaves like a radio group: a new id replaces
    /// the current one and the current id clears it.
    ///
    /// Returns `false` when the toggle was refused (compare limit reached).
    pub fn toggle_candidate(&mut self, candidate_id: &str) -> bool {
        let position = self.candidate_ids.iter().position(|id| id == candidate_id);

        if self.is_comparing() {
            match position {
                Some(index) => {
                    self.candidate_ids.remove(index);
                }
                None if self.candidate_ids.len() >= self.max_compare_candidates => return false,
                None => self.candidate_ids.push(candidate_id.to_string()),
            }
            return true;
        }

        match position {
            Some(_) => self.candidate_ids.clear(),
            None => {
                self.candidate_ids.clear();
                self.candidate_ids.push(candidate_id.to_string());
            }
        }
        true
    }

    pub fn toggle_persona(&mut self, persona_id: &str) {
        match self.persona_ids.iter().position(|id| id == persona_id) {
            Some(index) => {
                self.persona_ids.remove(index);
            }
            None => self.persona_ids.push(persona_id.to_string()),
        }
    }

    /// Toggles an action. Leaving compare mode keeps only the earliest
    /// selected candidate.
    pub fn toggle_action(&mut self, action: Action) {
        if !self.actions.remove(&action) {
            self.actions.insert(action);
        }

        if !self.is_comparing() {
            self.candidate_ids.truncate(1);
        }
    }

    /// Actions that issue backend calls, in lane order.
    pub fn runnable_actions(&self) -> Vec<Action> {
        self.actions
            .iter()
            .copied()
            .filter(|action| *action != Action::Compare)
            .collect()
    }

    /// Recomputes the readiness summary for the current state.
    pub fn validation(&self) -> ValidationSummary {
        ValidationSummary::evaluate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection_for_job() -> Selection {
        let mut selection = Selection::new();
        selection.set_job("job-1");
        selection
    }

    #[test]
    fn test_radio_semantics_without_compare() {
        let mut selection = selection_for_job();

        selection.toggle_candidate("c1");
        selection.toggle_candidate("c2");
        assert_eq!(selection.candidate_ids(), ["c2".to_string()]);

        selection.toggle_candidate("c2");
        assert!(selection.candidate_ids().is_empty());
    }

    #[test]
    fn test_compare_allows_up_to_limit() {
        let mut selection = selection_for_job();
        selection.toggle_action(Action::Compare);

        for id in ["c1", "c2", "c3", "c4", "c5"] {
            assert!(selection.toggle_candidate(id));
        }
        assert!(!selection.toggle_candidate("c6"));
        assert_eq!(selection.candidate_ids().len(), 5);

        assert!(selection.toggle_candidate("c3"));
        assert_eq!(selection.candidate_ids().len(), 4);
        assert!(!selection.candidate_ids().contains(&"c3".to_string()));
    }

    #[test]
    fn test_leaving_compare_keeps_first_candidate() {
        let mut selection = selection_for_job();
        selection.toggle_action(Action::Compare);
        selection.toggle_candidate("c1");
        selection.toggle_candidate("c2");
        selection.toggle_candidate("c3");

        selection.toggle_action(Action::Compare);

        assert!(!selection.is_comparing());
        assert_eq!(selection.candidate_ids(), ["c1".to_string()]);
    }

    #[test]
    fn test_set_job_resets_everything() {
        let mut selection = selection_for_job();
        selection.toggle_candidate("c1");
        selection.toggle_persona("p1");
        selection.toggle_action(Action::Evaluate);

        selection.set_job("job-2");

        assert_eq!(selection.job_id(), Some("job-2"));
        assert!(selection.candidate_ids().is_empty());
        assert!(selection.persona_ids().is_empty());
        assert!(selection.actions().is_empty());
    }

    #[test]
    fn test_persona_and_action_are_plain_toggles() {
        let mut selection = selection_for_job();
        selection.toggle_persona("p1");
        selection.toggle_persona("p2");
        selection.toggle_persona("p1");
        assert_eq!(selection.persona_ids(), ["p2".to_string()]);

        selection.toggle_action(Action::Debate);
        assert!(selection.has_action(Action::Debate));
        selection.toggle_action(Action::Debate);
        assert!(!selection.has_action(Action::Debate));
    }

    #[test]
    fn test_compare_limit_is_clamped() {
        assert_eq!(Selection::with_compare_limit(8).max_compare_candidates(), 5);
        assert_eq!(Selection::with_compare_limit(0).max_compare_candidates(), 2);
        assert_eq!(Selection::with_compare_limit(3).max_compare_candidates(), 3);

        let mut selection = Selection::with_compare_limit(8);
        selection.set_job("job-1");
        selection.toggle_action(Action::Compare);
        for candidate in ["c1", "c2", "c3", "c4", "c5"] {
            assert!(selection.toggle_candidate(candidate));
        }
        assert!(!selection.toggle_candidate("c6"));
        assert_eq!(selection.candidate_ids().len(), 5);
    }

    #[test]
    fn test_runnable_actions_skip_compare_and_keep_lane_order() {
        let mut selection = selection_for_job();
        selection.toggle_action(Action::Compare);
        selection.toggle_action(Action::Debate);
        selection.toggle_action(Action::Evaluate);

        assert_eq!(
            selection.runnable_actions(),
            vec![Action::Evaluate, Action::Debate]
        );
    }

    #[test]
    fn test_single_candidate_invariant_holds_for_toggle_sequences() {
        // Deterministic pseudo-random walk over toggles.
        let candidates = ["c1", "c2", "c3", "c4", "c5", "c6", "c7"];
        let actions = [Action::Evaluate, Action::Debate, Action::Compare];
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;

        for _ in 0..50 {
            let mut selection = selection_for_job();
            for _ in 0..40 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                if state % 3 == 0 {
                    selection.toggle_action(actions[(state / 3 % 3) as usize]);
                } else {
                    selection.toggle_candidate(candidates[(state / 3 % 7) as usize]);
                }

                if selection.is_comparing() {
                    assert!(selection.candidate_ids().len() <= 5);
                } else {
                    assert!(selection.candidate_ids().len() <= 1);
                }
            }
        }
    }
}
