use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use hireflow_core::telemetry::{TimelineInput, TimingTelemetry, reconstruct, telemetry_start_ms};
use std::path::PathBuf;

use super::utils::progress_line;

#[derive(Args)]
pub struct TimelineArgs {
    /// JSON file holding the `timing_data` of a debate response
    file: PathBuf,

    /// Seconds elapsed since the telemetry start time
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Treat the run as still in flight
    #[arg(long)]
    processing: bool,

    /// Placeholder agents shown before telemetry names any
    #[arg(long = "agent")]
    agents: Vec<String>,

    /// Progress shown while no telemetry is available
    #[arg(long, default_value_t = 5.0)]
    idle_floor: f64,
}

pub fn execute(args: TimelineArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read telemetry from {}", args.file.display()))?;
    let telemetry: TimingTelemetry = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse telemetry in {}", args.file.display()))?;

    let start_ms = origin_ms(&telemetry);
    let now_ms = start_ms + (args.at * 1000.0).round() as i64;

    let view = reconstruct(&TimelineInput {
        telemetry: Some(&telemetry),
        processing: args.processing,
        now_ms,
        run_started_ms: start_ms,
        default_agents: &args.agents,
        idle_floor_percent: args.idle_floor,
    });

    println!("{}", progress_line(&view));
    if !view.parallel_steps.is_empty() {
        println!("{}", "parallel".bold());
        for step in &view.parallel_steps {
            println!("  {} ({})", step.step, step.agent_list().join(", "));
        }
    }
    if !view.sequential_steps.is_empty() {
        println!("{}", "sequential".bold());
        for step in &view.sequential_steps {
            println!("  {} ({})", step.step, step.agent_list().join(", "));
        }
    }
    if view.is_complete {
        println!("{}", "complete".green());
    }
    Ok(())
}

/// The instant `--at` is measured from; the same start the timeline uses.
fn origin_ms(telemetry: &TimingTelemetry) -> i64 {
    telemetry_start_ms(telemetry).unwrap_or(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_core::telemetry::StepRecord;

    #[test]
    fn test_origin_uses_earliest_step_when_start_is_missing() {
        let telemetry = TimingTelemetry {
            steps: vec![
                StepRecord::new("round_1", 5.0).at(1_700_000_004.0),
                StepRecord::new("moderator_opening", 4.0).at(1_700_000_000.0),
            ],
            total: 9.0,
            start_time: None,
            end_time: None,
        };

        let start_ms = origin_ms(&telemetry);
        assert_eq!(start_ms, 1_700_000_000_000);

        let view = reconstruct(&TimelineInput {
            telemetry: Some(&telemetry),
            processing: true,
            now_ms: start_ms + 2_000,
            run_started_ms: start_ms,
            default_agents: &[],
            idle_floor_percent: 5.0,
        });
        assert_eq!(view.elapsed_secs, 2.0);
        assert_eq!(view.current_step.as_deref(), Some("moderator_opening"));
    }
}
