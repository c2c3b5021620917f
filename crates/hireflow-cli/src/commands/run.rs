use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use hireflow_application::InsightPrefetcher;
use hireflow_core::candidate::{Candidate, CandidateRepository, Persona};
use hireflow_core::error::HireError;
use hireflow_core::evaluation::{CompanyNoteSource, UploadedNote};
use hireflow_core::selection::{Action, Selection};
use hireflow_execution::{
    EvaluationOrchestrator, ProgressTicker, RunEvent, RunPlan, RunReport, TraceEvent,
};
use hireflow_infrastructure::ConfigService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::utils::{backend, progress_line};

#[derive(Args)]
pub struct RunArgs {
    /// Job the candidates are evaluated against
    #[arg(long)]
    job: String,

    /// Candidate id (repeat for several; more than one enables compare)
    #[arg(long = "candidate", required = true)]
    candidates: Vec<String>,

    /// JSON file with an array of persona definitions
    #[arg(long)]
    personas: PathBuf,

    /// Persona id to use (repeatable; defaults to every persona in the file)
    #[arg(long = "persona")]
    persona_ids: Vec<String>,

    /// evaluate, debate or compare (repeatable)
    #[arg(long = "action", required = true)]
    actions: Vec<Action>,

    /// Company note text sent with every call
    #[arg(long)]
    note: Option<String>,

    /// Company note file sent when no text note applies
    #[arg(long)]
    note_file: Option<PathBuf>,

    /// Prefer each candidate's own company note
    #[arg(long)]
    use_candidate_note: bool,
}

pub async fn execute(args: RunArgs, config_service: &ConfigService) -> Result<()> {
    let (trace_tx, mut trace_rx) = mpsc::unbounded_channel();
    hireflow_execution::init_tracing(Some(trace_tx))?;

    let config = config_service.get_config();
    let backend = backend(config_service)?;
    let personas = load_personas(&args.personas)?;
    let selection = build_selection(&args, &personas, config.orchestrator.max_compare_candidates);
    let plan = RunPlan {
        candidates: load_candidates(&*backend, &args.job, selection.candidate_ids()).await,
        personas,
        notes: note_source(&args)?,
        selection,
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let prefetcher = Arc::new(InsightPrefetcher::new(backend.clone()));
    let orchestrator = EvaluationOrchestrator::new(backend.clone(), prefetcher)?
        .with_config(config.orchestrator.clone())
        .with_events(event_tx);

    let agent_names = plan
        .personas
        .iter()
        .filter(|persona| plan.selection.persona_ids().contains(&persona.id))
        .map(|persona| persona.display_name.clone())
        .collect();
    let source = orchestrator.progress_source(agent_names, config.progress.idle_progress_floor_percent);
    let cancel = CancellationToken::new();
    let (mut progress_rx, ticker) =
        ProgressTicker::spawn(source, config.progress.tick_interval(), cancel.clone());
    let show_progress = plan.selection.has_action(Action::Debate);

    println!(
        "🚀 Running {} for {} candidate(s) on job {}",
        plan.selection
            .runnable_actions()
            .iter()
            .map(|action| action.to_string())
            .collect::<Vec<_>>()
            .join(" + "),
        plan.selection.candidate_ids().len(),
        args.job
    );

    let run = orchestrator.run(&plan);
    tokio::pin!(run);
    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            Some(event) = event_rx.recv() => print_event(&event),
            Some(trace) = trace_rx.recv() => print_trace(&trace),
            Ok(()) = progress_rx.changed(), if show_progress => {
                let snapshot = progress_rx.borrow_and_update().clone();
                if orchestrator.is_processing() {
                    let label = snapshot.candidate_id.as_deref().unwrap_or("-");
                    println!("   {} {}", label.dimmed(), progress_line(&snapshot.view));
                }
            }
        }
    };

    cancel.cancel();
    let _ = ticker.await;
    while let Ok(event) = event_rx.try_recv() {
        print_event(&event);
    }

    match result {
        Ok(report) => print_report(&report),
        Err(e) => {
            print_error(&e);
            bail!("run failed: {}", e.alert_message())
        }
    }
}

fn build_selection(args: &RunArgs, personas: &[Persona], compare_limit: usize) -> Selection {
    let mut selection = Selection::with_compare_limit(compare_limit);
    selection.set_job(args.job.as_str());

    if args.persona_ids.is_empty() {
        for persona in personas {
            selection.toggle_persona(&persona.id);
        }
    } else {
        for persona_id in &args.persona_ids {
            selection.toggle_persona(persona_id);
        }
    }

    if args.candidates.len() > 1 || args.actions.contains(&Action::Compare) {
        selection.toggle_action(Action::Compare);
    }
    for action in &args.actions {
        if *action != Action::Compare && !selection.has_action(*action) {
            selection.toggle_action(*action);
        }
    }
    for candidate_id in &args.candidates {
        if !selection.toggle_candidate(candidate_id) {
            println!(
                "{} candidate {} skipped: at most {} can be compared",
                "⚠".yellow(),
                candidate_id,
                compare_limit
            );
        }
    }
    selection
}

fn load_personas(path: &Path) -> Result<Vec<Persona>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read personas from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse personas in {}", path.display()))
}

/// Candidate records for the selected ids. The lookup is best effort; company
/// notes are the only thing taken from it.
async fn load_candidates(
    repository: &dyn CandidateRepository,
    job_id: &str,
    candidate_ids: &[String],
) -> Vec<Candidate> {
    let listed = match repository.list_for_job(job_id).await {
        Ok(listed) => listed,
        Err(e) => {
            tracing::warn!("[Run] Could not load candidates for {}: {}", job_id, e);
            Vec::new()
        }
    };

    candidate_ids
        .iter()
        .map(|candidate_id| {
            listed
                .iter()
                .find(|candidate| &candidate.id == candidate_id)
                .cloned()
                .unwrap_or_else(|| Candidate::new(candidate_id.as_str(), candidate_id.as_str()))
        })
        .collect()
}

fn note_source(args: &RunArgs) -> Result<CompanyNoteSource> {
    let uploaded = match &args.note_file {
        Some(path) => Some(UploadedNote {
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "company_note".to_string()),
            content: std::fs::read(path)
                .with_context(|| format!("Failed to read note file {}", path.display()))?,
        }),
        None => None,
    };

    Ok(CompanyNoteSource {
        use_candidate_note: args.use_candidate_note,
        manual_text: args.note.clone(),
        uploaded,
    })
}

fn print_event(event: &RunEvent) {
    match event {
        RunEvent::RunStarted { run_id, .. } => println!("   {} {}", "run".dimmed(), run_id.dimmed()),
        RunEvent::InsightsRefreshed {
            requested,
            with_insight,
        } => println!("💬 Conversation insight for {}/{} candidate(s)", with_insight, requested),
        RunEvent::LaneStarted {
            action,
            policy,
            calls,
        } => println!("▶ {} lane: {} call(s) ({})", action.to_string().bold(), calls, policy),
        RunEvent::CallSucceeded {
            action,
            candidate_id,
            result_id,
        } => match result_id {
            Some(result_id) => println!("  {} {} {} → {}", "✓".green(), action, candidate_id, result_id),
            None => println!("  {} {} {} (no result id)", "✓".green(), action, candidate_id),
        },
        RunEvent::CallFailed {
            action,
            candidate_id,
            message,
        } => println!("  {} {} {}: {}", "✗".red(), action, candidate_id, message),
        RunEvent::TelemetryUpdated {
            candidate_id,
            total_steps,
        } => println!("  📈 telemetry for {} ({} steps)", candidate_id, total_steps),
        RunEvent::RunAborted {
            action,
            candidate_id,
            ..
        } => println!("{} {} lane aborted on {}", "■".red(), action, candidate_id),
        RunEvent::RunFinished { .. } => {}
    }
}

fn print_trace(trace: &TraceEvent) {
    match trace.level.as_str() {
        "ERROR" => println!("   {}", trace.message.red()),
        "WARN" => println!("   {}", trace.message.yellow()),
        "INFO" => println!("   {}", trace.message.dimmed()),
        _ => {}
    }
}

fn print_report(report: &RunReport) -> Result<()> {
    for warning in &report.warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }
    for failure in report.failures() {
        println!(
            "{} {} for {} failed: {}",
            "✗".red(),
            failure.action,
            failure.candidate_id,
            failure.error().unwrap_or_default()
        );
    }

    if !report.succeeded {
        println!("{}", "No results were produced.".red());
        bail!("run {} produced no results", report.run_id);
    }

    println!("✅ {} result(s):", report.result_ids.len());
    for result_id in &report.result_ids {
        println!("   {}", result_id);
    }
    if let Some(primary) = report.primary_result_id() {
        println!("Primary result: {}", primary.bold());
    }
    Ok(())
}

fn print_error(error: &HireError) {
    match error {
        HireError::Validation(issues) => {
            println!("{}", "Selection is not ready:".red());
            for issue in issues {
                println!("  - {}", issue);
            }
        }
        other => println!("{} {}", "✗".red(), other.alert_message().red()),
    }
}
