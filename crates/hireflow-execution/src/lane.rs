//! Lane combinator.
//!
//! A lane is the group of calls one action issues, one per candidate. Every
//! lane goes through [`run_lane`]; the join policy is data carried by the
//! [`LanePlan`], not a property of the call site.

use futures::future::{join_all, try_join_all};
use hireflow_core::error::{HireError, Result};
use hireflow_core::evaluation::Transcript;
use hireflow_core::selection::Action;
use serde::{Deserialize, Serialize};
use std::future::Future;
use strum::Display;

/// How a lane reacts to a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LanePolicy {
    /// The first failure aborts the lane and the run
    FailFast,
    /// Every call runs to completion; failures are recorded per call
    SettleAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub action: Action,
    pub policy: LanePolicy,
}

/// Ordered lanes of a run. Lanes execute one after another in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanePlan {
    lanes: Vec<Lane>,
}

impl LanePlan {
    pub fn new(lanes: Vec<Lane>) -> Self {
        Self { lanes }
    }

    /// Evaluate first and fail-fast (the recruiter waits on it), then debate
    /// with settle-all (long running, per-candidate failures tolerated).
    pub fn standard() -> Self {
        Self::new(vec![
            Lane {
                action: Action::Evaluate,
                policy: LanePolicy::FailFast,
            },
            Lane {
                action: Action::Debate,
                policy: LanePolicy::SettleAll,
            },
        ])
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Lanes for the selected actions, in plan order. Actions without a lane are skipped.
    pub fn for_actions(&self, actions: &[Action]) -> Vec<Lane> {
        self.lanes
            .iter()
            .filter(|lane| actions.contains(&lane.action))
            .copied()
            .collect()
    }
}

impl Default for LanePlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// What a successful call produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallPayload {
    /// `None` when neither the response nor the fallback lookup yielded an id
    pub result_id: Option<String>,
    pub transcript: Option<Transcript>,
}

/// Tagged result of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub candidate_id: String,
    pub action: Action,
    pub result: std::result::Result<CallPayload, String>,
}

impl TaskOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn result_id(&self) -> Option<&str> {
        self.result
            .as_ref()
            .ok()
            .and_then(|payload| payload.result_id.as_deref())
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

/// Runs one call per candidate concurrently and joins them under `policy`.
///
/// Outcomes keep the order of `tasks`. Under `FailFast` the first error
/// resolves the lane with `HireError::LaneAborted`; calls still pending are
/// dropped.
pub async fn run_lane<F>(
    action: Action,
    policy: LanePolicy,
    tasks: Vec<(String, F)>,
) -> Result<Vec<TaskOutcome>>
where
    F: Future<Output = Result<CallPayload>>,
{
    match policy {
        LanePolicy::FailFast => {
            let calls = tasks.into_iter().map(|(candidate_id, call)| async move {
                match call.await {
                    Ok(payload) => Ok(TaskOutcome {
                        candidate_id,
                        action,
                        result: Ok(payload),
                    }),
                    Err(e) => Err(HireError::LaneAborted {
                        action: action.to_string(),
                        candidate_id,
                        message: e.alert_message(),
                    }),
                }
            });
            try_join_all(calls).await
        }
        LanePolicy::SettleAll => {
            let calls = tasks.into_iter().map(|(candidate_id, call)| async move {
                let result = call.await.map_err(|e| e.alert_message());
                TaskOutcome {
                    candidate_id,
                    action,
                    result,
                }
            });
            Ok(join_all(calls).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::time::Duration;

    fn ok(id: &str) -> BoxFuture<'static, Result<CallPayload>> {
        let id = id.to_string();
        Box::pin(async move {
            Ok(CallPayload {
                result_id: Some(id),
                transcript: None,
            })
        })
    }

    fn fail(message: &str, delay_ms: u64) -> BoxFuture<'static, Result<CallPayload>> {
        let message = message.to_string();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Err(HireError::request(500, message))
        })
    }

    #[test]
    fn test_standard_plan_orders_evaluate_first() {
        let lanes = LanePlan::standard().for_actions(&[Action::Debate, Action::Evaluate]);
        assert_eq!(
            lanes,
            vec![
                Lane {
                    action: Action::Evaluate,
                    policy: LanePolicy::FailFast
                },
                Lane {
                    action: Action::Debate,
                    policy: LanePolicy::SettleAll
                },
            ]
        );
        assert!(LanePlan::standard().for_actions(&[Action::Compare]).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_all_keeps_every_outcome_in_task_order() {
        let outcomes = run_lane(
            Action::Debate,
            LanePolicy::SettleAll,
            vec![
                ("c1".to_string(), fail("boom", 50)),
                ("c2".to_string(), ok("r2")),
            ],
        )
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].candidate_id, "c1");
        assert_eq!(outcomes[0].error(), Some("boom"));
        assert_eq!(outcomes[1].result_id(), Some("r2"));
        assert!(outcomes.iter().all(|o| o.action == Action::Debate));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_aborts_with_candidate_context() {
        let err = run_lane(
            Action::Evaluate,
            LanePolicy::FailFast,
            vec![
                ("c1".to_string(), ok("r1")),
                ("c2".to_string(), fail("no resume", 10)),
            ],
        )
        .await
        .unwrap_err();

        match err {
            HireError::LaneAborted {
                action,
                candidate_id,
                message,
            } => {
                assert_eq!(action, "evaluate");
                assert_eq!(candidate_id, "c2");
                assert_eq!(message, "no resume");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_lane_is_ok() {
        let tasks: Vec<(String, BoxFuture<'static, Result<CallPayload>>)> = Vec::new();
        let outcomes = run_lane(Action::Evaluate, LanePolicy::FailFast, tasks)
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
