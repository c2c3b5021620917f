//! Telemetry models.

use serde::{Deserialize, Serialize};

/// One step of a completed debate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step identifier, e.g. `moderator_opening`
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<String>>,
    /// Seconds, never negative
    #[serde(default)]
    pub duration: f64,
    /// Epoch seconds or milliseconds; see `normalize_timestamp_ms`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
}

impl StepRecord {
    pub fn new(step: impl Into<String>, duration: f64) -> Self {
        Self {
            step: step.into(),
            duration,
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Agents named by this step: the `agents` list when non-empty, else `agent`.
    pub fn agent_list(&self) -> Vec<String> {
        match &self.agents {
            Some(agents) if !agents.is_empty() => agents.clone(),
            _ => self.agent.iter().cloned().collect(),
        }
    }

    /// A step is parallel when it names several agents or says so explicitly.
    pub fn is_parallel(&self) -> bool {
        self.parallel.unwrap_or(false) || self.agents.as_ref().is_some_and(|a| a.len() > 1)
    }
}

/// Timing data returned by a completed debate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingTelemetry {
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    /// Total seconds
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}
