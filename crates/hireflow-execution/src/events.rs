//! Events the orchestrator publishes to the hosting view.

use hireflow_core::selection::Action;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::lane::LanePolicy;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        actions: Vec<Action>,
        candidate_ids: Vec<String>,
    },
    InsightsRefreshed {
        requested: usize,
        with_insight: usize,
    },
    LaneStarted {
        action: Action,
        policy: LanePolicy,
        calls: usize,
    },
    CallSucceeded {
        action: Action,
        candidate_id: String,
        result_id: Option<String>,
    },
    CallFailed {
        action: Action,
        candidate_id: String,
        message: String,
    },
    /// A debate call delivered timing telemetry for this candidate
    TelemetryUpdated {
        candidate_id: String,
        total_steps: usize,
    },
    /// A fail-fast lane stopped the run; the live view should close
    RunAborted {
        action: Action,
        candidate_id: String,
        message: String,
    },
    RunFinished {
        result_ids: Vec<String>,
        succeeded: bool,
    },
}

/// Optional sender; publishing never fails the run.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    sender: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub(crate) fn new(sender: Option<mpsc::UnboundedSender<RunEvent>>) -> Self {
        Self { sender }
    }

    pub(crate) fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.sender {
            // A dropped receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }
}
