//! Evaluation task orchestrator.
//!
//! Runs every (action, candidate) pair of a selection against the evaluation
//! backend and returns the persisted result ids.
//!
//! # Run phases
//!
//! 1. Validate the selection; nothing touches the network on failure.
//! 2. Force-refresh conversation insight for every candidate and enrich the
//!    persona prompts with it. This completes before any call is issued.
//! 3. Execute the lanes of the [`LanePlan`] one after another. The standard
//!    plan runs evaluate (fail-fast) and then debate (settle-all).
//! 4. Aggregate result ids in lane order, candidate order within a lane.
//!
//! The reasoning log, the telemetry board and the processing flag are shared
//! with the hosting view while the run is in progress.

use chrono::Utc;
use hireflow_application::{InsightPrefetcher, PromptEnricher};
use hireflow_core::candidate::{Candidate, Persona};
use hireflow_core::config::OrchestratorConfig;
use hireflow_core::error::{HireError, Result};
use hireflow_core::evaluation::{
    CompanyNoteSource, EvaluationBackend, EvaluationRequest, ResultQuery, pick_result,
};
use hireflow_core::insight::ConversationInsight;
use hireflow_core::reasoning::{ReasoningLog, StepKey, StepPhase, StepStatus};
use hireflow_core::selection::{Action, Selection, ValidationWarning};
use hireflow_core::telemetry::TelemetryBoard;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::{EventSink, RunEvent};
use crate::lane::{CallPayload, LanePlan, TaskOutcome, run_lane};
use crate::progress_ticker::ProgressSource;

/// Everything a run needs besides the orchestrator's own collaborators.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub selection: Selection,
    /// Candidate records for the selected ids (company notes come from here)
    pub candidates: Vec<Candidate>,
    /// Persona definitions; every selected persona id must be present
    pub personas: Vec<Persona>,
    pub notes: CompanyNoteSource,
}

/// What a finished run reports upward.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: String,
    /// Evaluate-lane ids first, then debate-lane ids, candidate order within each
    pub result_ids: Vec<String>,
    pub outcomes: Vec<TaskOutcome>,
    /// `false` when no result id was obtained, even if nothing failed
    pub succeeded: bool,
    pub warnings: Vec<ValidationWarning>,
}

impl RunReport {
    /// The result the view navigates to.
    pub fn primary_result_id(&self) -> Option<&str> {
        self.result_ids.first().map(String::as_str)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok())
    }
}

pub struct EvaluationOrchestrator {
    backend: Arc<dyn EvaluationBackend>,
    prefetcher: Arc<InsightPrefetcher>,
    enricher: PromptEnricher,
    plan: LanePlan,
    config: OrchestratorConfig,
    reasoning: ReasoningLog,
    telemetry: TelemetryBoard,
    events: EventSink,
    processing: Arc<AtomicBool>,
    run_started_ms: Arc<AtomicI64>,
}

impl EvaluationOrchestrator {
    pub fn new(backend: Arc<dyn EvaluationBackend>, prefetcher: Arc<InsightPrefetcher>) -> Result<Self> {
        Ok(Self {
            backend,
            prefetcher,
            enricher: PromptEnricher::new()?,
            plan: LanePlan::standard(),
            config: OrchestratorConfig::default(),
            reasoning: ReasoningLog::new(),
            telemetry: TelemetryBoard::new(),
            events: EventSink::default(),
            processing: Arc::new(AtomicBool::new(false)),
            run_started_ms: Arc::new(AtomicI64::new(Utc::now().timestamp_millis())),
        })
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_plan(mut self, plan: LanePlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_events(mut self, sender: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = EventSink::new(Some(sender));
        self
    }

    pub fn reasoning(&self) -> &ReasoningLog {
        &self.reasoning
    }

    pub fn telemetry(&self) -> &TelemetryBoard {
        &self.telemetry
    }

    /// True from the first network call until the run finishes or aborts.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// A live view source sharing this orchestrator's telemetry and processing flag.
    pub fn progress_source(&self, default_agents: Vec<String>, idle_floor_percent: f64) -> ProgressSource {
        ProgressSource::new(
            self.telemetry.clone(),
            self.processing.clone(),
            self.run_started_ms.clone(),
            default_agents,
            idle_floor_percent,
        )
    }

    /// Executes a run.
    ///
    /// Returns `HireError::Validation` before any network call when the
    /// selection is not ready, and `HireError::LaneAborted` when a fail-fast
    /// lane hits an error; ids collected up to that point are not reported.
    pub async fn run(&self, plan: &RunPlan) -> Result<RunReport> {
        self.reasoning.reset().await;
        self.telemetry.clear().await;

        let warnings = self.validate(&plan.selection).await?;
        let personas = resolve_personas(plan)?;
        let job_id = plan
            .selection
            .job_id()
            .ok_or_else(|| HireError::internal("validated selection has no job"))?;

        self.run_started_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
        self.processing.store(true, Ordering::SeqCst);
        let result = self.execute(plan, job_id, &personas, warnings).await;
        self.processing.store(false, Ordering::SeqCst);
        result
    }

    async fn validate(&self, selection: &Selection) -> Result<Vec<ValidationWarning>> {
        let key = StepKey::run(StepPhase::Validation);
        match selection.validation().into_result() {
            Ok(warnings) => {
                for warning in &warnings {
                    tracing::warn!("[Orchestrator] {}", warning);
                }
                let content = if warnings.is_empty() {
                    "Selection is ready".to_string()
                } else {
                    join_display(&warnings)
                };
                self.reasoning
                    .append(key, "Validating selection", content, StepStatus::Completed)
                    .await;
                Ok(warnings)
            }
            Err(e) => {
                tracing::warn!("[Orchestrator] Run blocked: {}", e);
                self.reasoning
                    .append(key, "Validating selection", e.to_string(), StepStatus::Error)
                    .await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        plan: &RunPlan,
        job_id: &str,
        personas: &[&Persona],
        warnings: Vec<ValidationWarning>,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let candidate_ids = plan.selection.candidate_ids().to_vec();
        let actions = plan.selection.runnable_actions();

        tracing::info!(
            "[Orchestrator] Run {} started: {:?} for {} candidate(s)",
            run_id,
            actions,
            candidate_ids.len()
        );
        self.events.emit(RunEvent::RunStarted {
            run_id: run_id.clone(),
            actions: actions.clone(),
            candidate_ids: candidate_ids.clone(),
        });

        let insights = self.refresh_insights(&candidate_ids).await;
        let prompts = self.enrich_prompts(&candidate_ids, personas, &insights)?;

        let mut result_ids = Vec::new();
        let mut outcomes = Vec::new();

        for lane in self.plan.for_actions(&actions) {
            let tasks = candidate_ids
                .iter()
                .map(|candidate_id| {
                    let request = build_request(plan, job_id, candidate_id, &prompts);
                    (candidate_id.clone(), self.call(lane.action, request))
                })
                .collect::<Vec<_>>();

            let lane_key = StepKey::lane(lane.action);
            self.reasoning
                .append(
                    lane_key.clone(),
                    format!("{} lane", action_title(lane.action)),
                    format!("{} call(s), {}", tasks.len(), lane.policy),
                    StepStatus::Processing,
                )
                .await;
            self.events.emit(RunEvent::LaneStarted {
                action: lane.action,
                policy: lane.policy,
                calls: tasks.len(),
            });
            tracing::info!(
                "[Orchestrator] {} lane: {} call(s), {}",
                lane.action,
                tasks.len(),
                lane.policy
            );

            match run_lane(lane.action, lane.policy, tasks).await {
                Ok(lane_outcomes) => {
                    let failed = lane_outcomes.iter().filter(|o| !o.is_ok()).count();
                    self.reasoning
                        .update(
                            &lane_key,
                            StepStatus::Completed,
                            format!(
                                "{} succeeded, {} failed",
                                lane_outcomes.len() - failed,
                                failed
                            ),
                        )
                        .await;
                    result_ids.extend(
                        lane_outcomes
                            .iter()
                            .filter_map(|outcome| outcome.result_id().map(str::to_string)),
                    );
                    outcomes.extend(lane_outcomes);
                }
                Err(e) => {
                    // The live view closes with the aborted run.
                    self.processing.store(false, Ordering::SeqCst);
                    self.reasoning
                        .update(&lane_key, StepStatus::Error, e.alert_message())
                        .await;
                    let dropped = candidate_ids
                        .iter()
                        .flat_map(|candidate_id| {
                            [StepPhase::Request, StepPhase::ResultLookup].map(|phase| {
                                StepKey::call(lane.action, candidate_id.as_str(), phase)
                            })
                        })
                        .collect::<Vec<_>>();
                    self.reasoning
                        .fail_processing(&dropped, "Cancelled: lane aborted")
                        .await;
                    if let HireError::LaneAborted {
                        candidate_id,
                        message,
                        ..
                    } = &e
                    {
                        self.events.emit(RunEvent::RunAborted {
                            action: lane.action,
                            candidate_id: candidate_id.clone(),
                            message: message.clone(),
                        });
                    }
                    tracing::error!("[Orchestrator] Run {} aborted: {}", run_id, e);
                    return Err(e);
                }
            }
        }

        let succeeded = !result_ids.is_empty();
        let (status, content) = if succeeded {
            (
                StepStatus::Completed,
                format!("{} result(s) ready", result_ids.len()),
            )
        } else {
            (StepStatus::Error, "No results were produced".to_string())
        };
        self.reasoning
            .append(StepKey::run(StepPhase::Summary), "Summary", content, status)
            .await;

        tracing::info!(
            "[Orchestrator] Run {} finished with {} result(s)",
            run_id,
            result_ids.len()
        );
        self.events.emit(RunEvent::RunFinished {
            result_ids: result_ids.clone(),
            succeeded,
        });

        Ok(RunReport {
            run_id,
            result_ids,
            outcomes,
            succeeded,
            warnings,
        })
    }

    async fn refresh_insights(&self, candidate_ids: &[String]) -> HashMap<String, ConversationInsight> {
        let key = StepKey::run(StepPhase::Insights);
        self.reasoning
            .append(
                key.clone(),
                "Refreshing conversation insight",
                format!("{} candidate(s)", candidate_ids.len()),
                StepStatus::Processing,
            )
            .await;

        let insights = self.prefetcher.refresh_all(candidate_ids).await;
        let with_insight = insights.values().filter(|insight| !insight.is_empty()).count();

        self.reasoning
            .update(
                &key,
                StepStatus::Completed,
                format!(
                    "Insight found for {} of {} candidate(s)",
                    with_insight,
                    candidate_ids.len()
                ),
            )
            .await;
        self.events.emit(RunEvent::InsightsRefreshed {
            requested: candidate_ids.len(),
            with_insight,
        });
        insights
    }

    /// Enriched `(persona key, prompt)` pairs per candidate, in persona order.
    fn enrich_prompts(
        &self,
        candidate_ids: &[String],
        personas: &[&Persona],
        insights: &HashMap<String, ConversationInsight>,
    ) -> Result<HashMap<String, Vec<(String, String)>>> {
        let mut prompts = HashMap::with_capacity(candidate_ids.len());
        for candidate_id in candidate_ids {
            let insight = insights.get(candidate_id);
            let enriched = personas
                .iter()
                .map(|persona| {
                    let prompt = self.enricher.enrich(persona, insight)?;
                    Ok((persona.name.clone(), prompt))
                })
                .collect::<Result<Vec<_>>>()?;
            prompts.insert(candidate_id.clone(), enriched);
        }
        Ok(prompts)
    }

    async fn call(&self, action: Action, request: EvaluationRequest) -> Result<CallPayload> {
        let candidate_id = request.candidate_id.clone();
        let key = StepKey::call(action, candidate_id.as_str(), StepPhase::Request);
        self.reasoning
            .append(
                key.clone(),
                format!("{}: {}", action_title(action), candidate_id),
                "Request sent",
                StepStatus::Processing,
            )
            .await;
        tracing::debug!(
            "[Orchestrator] {} call for {} (correlation {})",
            action,
            candidate_id,
            request.correlation_id
        );

        let response = match self.backend.submit(action, &request).await {
            Ok(response) => response,
            Err(e) => {
                let message = e.alert_message();
                tracing::warn!(
                    "[Orchestrator] {} call for {} failed: {}",
                    action,
                    candidate_id,
                    message
                );
                self.reasoning
                    .update(&key, StepStatus::Error, message.clone())
                    .await;
                self.events.emit(RunEvent::CallFailed {
                    action,
                    candidate_id,
                    message,
                });
                return Err(e);
            }
        };

        if let Some(timing) = response.timing {
            let total_steps = timing.steps.len();
            self.telemetry.insert(&candidate_id, timing).await;
            self.events.emit(RunEvent::TelemetryUpdated {
                candidate_id: candidate_id.clone(),
                total_steps,
            });
        }

        let result_id = match response.result_id {
            Some(result_id) => Some(result_id),
            None => self.lookup_result(action, &request).await,
        };

        let content = match &result_id {
            Some(result_id) => format!("Result {}", result_id),
            None => "Completed without a retrievable result".to_string(),
        };
        self.reasoning
            .update(&key, StepStatus::Completed, content)
            .await;
        self.events.emit(RunEvent::CallSucceeded {
            action,
            candidate_id,
            result_id: result_id.clone(),
        });

        Ok(CallPayload {
            result_id,
            transcript: response.transcript,
        })
    }

    /// One delayed lookup for a result the response did not name. Misses and
    /// lookup errors yield `None`.
    async fn lookup_result(&self, action: Action, request: &EvaluationRequest) -> Option<String> {
        let key = StepKey::call(action, request.candidate_id.as_str(), StepPhase::ResultLookup);
        self.reasoning
            .append(
                key.clone(),
                format!("Looking up {} result", action),
                "Waiting for the result to be listed",
                StepStatus::Processing,
            )
            .await;

        tokio::time::sleep(self.config.fallback_lookup_delay()).await;

        let query = ResultQuery {
            candidate_id: request.candidate_id.clone(),
            result_type: action,
            job_id: request.job_id.clone(),
        };
        let (picked, content) = match self.backend.list_results(&query).await {
            Ok(results) => {
                let picked = pick_result(&results, &request.correlation_id);
                let content = match &picked {
                    Some(result_id) => format!("Found result {}", result_id),
                    None => "No result listed".to_string(),
                };
                (picked, content)
            }
            Err(e) => {
                tracing::warn!(
                    "[Orchestrator] Result lookup for {} failed: {}",
                    request.candidate_id,
                    e
                );
                (None, format!("Lookup failed: {}", e.alert_message()))
            }
        };

        self.reasoning
            .update(&key, StepStatus::Completed, content)
            .await;
        picked
    }
}

fn resolve_personas(plan: &RunPlan) -> Result<Vec<&Persona>> {
    plan.selection
        .persona_ids()
        .iter()
        .map(|persona_id| {
            plan.personas
                .iter()
                .find(|persona| &persona.id == persona_id)
                .ok_or_else(|| HireError::not_found("Persona", persona_id.as_str()))
        })
        .collect()
}

/// A fresh request (and correlation id) for one call.
fn build_request(
    plan: &RunPlan,
    job_id: &str,
    candidate_id: &str,
    prompts: &HashMap<String, Vec<(String, String)>>,
) -> EvaluationRequest {
    let note = match plan.candidates.iter().find(|c| c.id == candidate_id) {
        Some(candidate) => plan.notes.choose(candidate),
        None => plan.notes.choose(&Candidate::new(candidate_id, "")),
    };

    prompts
        .get(candidate_id)
        .into_iter()
        .flatten()
        .fold(
            EvaluationRequest::new(candidate_id, job_id),
            |request, (persona_key, prompt)| request.with_prompt(persona_key.as_str(), prompt.as_str()),
        )
        .with_company_note(note)
}

fn action_title(action: Action) -> &'static str {
    match action {
        Action::Evaluate => "Evaluation",
        Action::Debate => "Debate",
        Action::Compare => "Comparison",
    }
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
