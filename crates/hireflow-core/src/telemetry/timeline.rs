//! Progress timeline reconstruction.
//!
//! `reconstruct` is a pure function of the telemetry, the caller's
//! processing flag, the clock and the placeholder agent list. Callers
//! recompute it on every tick instead of caching the result.

use serde::{Deserialize, Serialize};

use super::model::{StepRecord, TimingTelemetry};

/// Epoch milliseconds of 2000-01-01T00:00:00Z. Smaller timestamps are seconds.
pub const SECONDS_SCALE_THRESHOLD_MS: f64 = 946_684_800_000.0;

/// Progress shown while no telemetry has arrived, so the run does not look stalled.
pub const DEFAULT_IDLE_PROGRESS_FLOOR: f64 = 5.0;

/// Aligns a telemetry timestamp to epoch milliseconds.
///
/// Values below the year-2000 millisecond threshold are taken as seconds.
/// Already-aligned values are returned unchanged.
pub fn normalize_timestamp_ms(value: f64) -> f64 {
    if value < SECONDS_SCALE_THRESHOLD_MS {
        value * 1000.0
    } else {
        value
    }
}

/// Everything one tick needs.
#[derive(Debug, Clone, Copy)]
pub struct TimelineInput<'a> {
    pub telemetry: Option<&'a TimingTelemetry>,
    /// Whether the caller still has calls outstanding
    pub processing: bool,
    pub now_ms: i64,
    /// When the local run started; drives the elapsed counter before telemetry arrives
    pub run_started_ms: i64,
    /// Shown as active agents until telemetry names real ones
    pub default_agents: &'a [String],
    pub idle_floor_percent: f64,
}

/// Live progress for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    pub has_telemetry: bool,
    pub elapsed_secs: f64,
    pub progress_percent: f64,
    /// Index into the time-ordered merged step list
    pub current_step_index: Option<usize>,
    pub current_step: Option<String>,
    pub total_steps: usize,
    pub active_agents: Vec<String>,
    /// Steps with several agents or an explicit parallel flag, in original order
    pub parallel_steps: Vec<StepRecord>,
    pub sequential_steps: Vec<StepRecord>,
    /// Elapsed time has passed the end of every step
    pub timeline_finished: bool,
    /// `timeline_finished` and the caller is no longer processing
    pub is_complete: bool,
    pub is_debate_starting: bool,
}

#[derive(Debug, Clone, Copy)]
struct StepInterval {
    original_index: usize,
    start: f64,
    end: f64,
}

pub fn reconstruct(input: &TimelineInput<'_>) -> ProgressView {
    let Some((telemetry, start_ms)) = input
        .telemetry
        .and_then(|telemetry| telemetry_start_ms(telemetry).map(|start| (telemetry, start)))
    else {
        return idle_view(input);
    };

    let elapsed = ((input.now_ms as f64 - start_ms) / 1000.0).max(0.0);
    let (parallel_steps, sequential_steps): (Vec<_>, Vec<_>) = telemetry
        .steps
        .iter()
        .cloned()
        .partition(StepRecord::is_parallel);

    let mut view = ProgressView {
        has_telemetry: true,
        elapsed_secs: elapsed,
        total_steps: telemetry.steps.len(),
        parallel_steps,
        sequential_steps,
        ..ProgressView::default()
    };

    if telemetry.steps.is_empty() {
        let finished = elapsed >= telemetry.total;
        view.progress_percent = if telemetry.total > 0.0 {
            (elapsed / telemetry.total).min(1.0) * 100.0
        } else {
            100.0
        };
        view.timeline_finished = finished;
        view.is_complete = finished && !input.processing;
        return view;
    }

    let intervals = merged_intervals(telemetry, start_ms);
    let total = intervals.len() as f64;

    let position = intervals
        .iter()
        .position(|interval| interval.start <= elapsed && elapsed < interval.end)
        .map(|index| {
            let interval = intervals[index];
            let fraction = (elapsed - interval.start) / (interval.end - interval.start);
            (index, fraction)
        })
        .or_else(|| {
            // Between steps: the next step to start is current, not yet begun.
            intervals
                .iter()
                .position(|interval| interval.start > elapsed)
                .map(|index| (index, 0.0))
        });

    match position {
        Some((index, fraction)) => {
            let step = &telemetry.steps[intervals[index].original_index];
            view.current_step_index = Some(index);
            view.current_step = Some(step.step.clone());
            view.active_agents = step.agent_list();
            view.progress_percent = ((index as f64 + fraction) / total * 100.0).clamp(0.0, 100.0);
            view.is_debate_starting = is_moderator_opening(&step.step);
        }
        None => {
            view.progress_percent = 100.0;
            view.timeline_finished = true;
            view.is_complete = !input.processing;
        }
    }

    view
}

fn idle_view(input: &TimelineInput<'_>) -> ProgressView {
    ProgressView {
        elapsed_secs: ((input.now_ms - input.run_started_ms).max(0) as f64) / 1000.0,
        progress_percent: input.idle_floor_percent.clamp(0.0, 100.0),
        active_agents: input.default_agents.to_vec(),
        ..ProgressView::default()
    }
}

/// Start of the debate in epoch ms: `start_time`, else the earliest step timestamp.
pub fn telemetry_start_ms(telemetry: &TimingTelemetry) -> Option<f64> {
    telemetry.start_time.map(normalize_timestamp_ms).or_else(|| {
        telemetry
            .steps
            .iter()
            .filter_map(|step| step.timestamp)
            .map(normalize_timestamp_ms)
            .min_by(f64::total_cmp)
    })
}

/// Resolves each step to a `[start, end)` interval in seconds since the debate
/// start and orders them by start. A step without a timestamp starts where the
/// previous one ended.
fn merged_intervals(telemetry: &TimingTelemetry, start_ms: f64) -> Vec<StepInterval> {
    let mut previous_end = 0.0;
    let mut intervals: Vec<StepInterval> = telemetry
        .steps
        .iter()
        .enumerate()
        .map(|(original_index, step)| {
            let start = step
                .timestamp
                .map(|ts| (normalize_timestamp_ms(ts) - start_ms) / 1000.0)
                .unwrap_or(previous_end);
            let end = start + step.duration.max(0.0);
            previous_end = end;
            StepInterval {
                original_index,
                start,
                end,
            }
        })
        .collect();

    intervals.sort_by(|a, b| a.start.total_cmp(&b.start));
    intervals
}

fn is_moderator_opening(step: &str) -> bool {
    let lower = step.to_lowercase();
    lower.contains("moderator") && lower.contains("opening")
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0_SECS: f64 = 1_700_000_000.0;
    const T0_MS: i64 = 1_700_000_000_000;

    #[test]
    fn test_start_falls_back_to_earliest_step_timestamp() {
        let telemetry = TimingTelemetry {
            steps: vec![
                StepRecord::new("round_1", 5.0).at(T0_SECS + 4.0),
                StepRecord::new("moderator_opening", 4.0).at(T0_SECS),
            ],
            total: 9.0,
            start_time: None,
            end_time: None,
        };
        assert_eq!(telemetry_start_ms(&telemetry), Some(T0_MS as f64));

        let explicit = TimingTelemetry {
            start_time: Some(T0_SECS - 1.0),
            ..telemetry
        };
        assert_eq!(telemetry_start_ms(&explicit), Some((T0_MS - 1_000) as f64));
    }

    fn input<'a>(
        telemetry: Option<&'a TimingTelemetry>,
        now_ms: i64,
        processing: bool,
        default_agents: &'a [String],
    ) -> TimelineInput<'a> {
        TimelineInput {
            telemetry,
            processing,
            now_ms,
            run_started_ms: T0_MS,
            default_agents,
            idle_floor_percent: DEFAULT_IDLE_PROGRESS_FLOOR,
        }
    }

    fn debate_telemetry() -> TimingTelemetry {
        TimingTelemetry {
            steps: vec![
                StepRecord::new("moderator_opening", 4.0)
                    .with_agent("moderator")
                    .at(T0_SECS),
                StepRecord::new("persona_round", 10.0)
                    .with_agents(["tech_lead", "hr"])
                    .at(T0_SECS + 4.0),
                StepRecord::new("rebuttal", 3.0).with_agent("tech_lead"),
                StepRecord::new("moderator_summary", 2.0)
                    .with_agent("moderator")
                    .at(T0_SECS + 20.0),
            ],
            total: 22.0,
            start_time: Some(T0_SECS),
            end_time: Some(T0_SECS + 22.0),
        }
    }

    #[test]
    fn test_normalize_seconds_and_milliseconds() {
        assert_eq!(normalize_timestamp_ms(T0_SECS), T0_MS as f64);
        assert_eq!(normalize_timestamp_ms(T0_MS as f64), T0_MS as f64);
        assert_eq!(
            normalize_timestamp_ms(normalize_timestamp_ms(T0_SECS)),
            normalize_timestamp_ms(T0_SECS)
        );
    }

    #[test]
    fn test_normalized_seconds_are_past_threshold() {
        for secs in [946_684_800.0, 1_000_000_000.0, 1_700_000_000.5, 2_000_000_000.0] {
            assert!(normalize_timestamp_ms(secs) >= SECONDS_SCALE_THRESHOLD_MS);
        }
    }

    #[test]
    fn test_single_opening_step_halfway() {
        let telemetry = TimingTelemetry {
            steps: vec![StepRecord::new("moderator_opening", 5.0).at(T0_SECS)],
            total: 5.0,
            start_time: Some(T0_SECS),
            end_time: None,
        };

        let view = reconstruct(&input(Some(&telemetry), T0_MS + 2_500, true, &[]));

        assert!((view.progress_percent - 50.0).abs() < 1e-9);
        assert_eq!(view.current_step_index, Some(0));
        assert!(view.is_debate_starting);
        assert!(!view.timeline_finished);
    }

    #[test]
    fn test_millisecond_start_time_is_accepted() {
        let telemetry = TimingTelemetry {
            steps: vec![StepRecord::new("moderator_opening", 5.0).at(T0_MS as f64)],
            total: 5.0,
            start_time: Some(T0_MS as f64),
            end_time: None,
        };

        let view = reconstruct(&input(Some(&telemetry), T0_MS + 1_000, true, &[]));
        assert!((view.progress_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_view_uses_floor_and_default_agents() {
        let defaults = vec!["tech_lead".to_string(), "hr".to_string()];
        let view = reconstruct(&input(None, T0_MS + 3_000, true, &defaults));

        assert!(!view.has_telemetry);
        assert_eq!(view.progress_percent, DEFAULT_IDLE_PROGRESS_FLOOR);
        assert_eq!(view.elapsed_secs, 3.0);
        assert_eq!(view.active_agents, defaults);
        assert!(!view.is_complete);
    }

    #[test]
    fn test_parallel_classification_keeps_order() {
        let mut telemetry = debate_telemetry();
        telemetry.steps.push(
            StepRecord {
                parallel: Some(true),
                ..StepRecord::new("closing_votes", 1.0)
            }
            .with_agent("moderator"),
        );

        let view = reconstruct(&input(Some(&telemetry), T0_MS, true, &[]));

        let parallel: Vec<_> = view.parallel_steps.iter().map(|s| s.step.as_str()).collect();
        let sequential: Vec<_> = view.sequential_steps.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(parallel, vec!["persona_round", "closing_votes"]);
        assert_eq!(
            sequential,
            vec!["moderator_opening", "rebuttal", "moderator_summary"]
        );
    }

    #[test]
    fn test_active_agents_follow_current_step() {
        let telemetry = debate_telemetry();
        let view = reconstruct(&input(Some(&telemetry), T0_MS + 6_000, true, &[]));

        assert_eq!(view.current_step.as_deref(), Some("persona_round"));
        assert_eq!(view.active_agents, vec!["tech_lead", "hr"]);
        assert!(!view.is_debate_starting);
    }

    #[test]
    fn test_untimed_step_starts_after_previous() {
        let telemetry = debate_telemetry();
        // rebuttal: no timestamp, starts at 14s (end of persona_round)
        let view = reconstruct(&input(Some(&telemetry), T0_MS + 15_000, true, &[]));
        assert_eq!(view.current_step.as_deref(), Some("rebuttal"));
    }

    #[test]
    fn test_gap_reports_next_step() {
        let telemetry = debate_telemetry();
        // rebuttal ends at 17s, summary starts at 20s
        let view = reconstruct(&input(Some(&telemetry), T0_MS + 18_000, true, &[]));
        assert_eq!(view.current_step.as_deref(), Some("moderator_summary"));
        assert!((view.progress_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_completion_requires_processing_to_stop() {
        let telemetry = debate_telemetry();

        let still_running = reconstruct(&input(Some(&telemetry), T0_MS + 30_000, true, &[]));
        assert!(still_running.timeline_finished);
        assert!(!still_running.is_complete);
        assert_eq!(still_running.progress_percent, 100.0);

        let done = reconstruct(&input(Some(&telemetry), T0_MS + 30_000, false, &[]));
        assert!(done.is_complete);
        assert_eq!(done.current_step_index, None);
    }

    #[test]
    fn test_progress_is_monotonic_and_bounded() {
        let mut telemetry = debate_telemetry();
        // Overlapping parallel step and a zero-length step.
        telemetry.steps.insert(
            2,
            StepRecord::new("side_channel", 8.0)
                .with_agents(["a", "b"])
                .at(T0_SECS + 5.0),
        );
        telemetry.steps.push(StepRecord::new("wrap", 0.0));

        let mut last = 0.0;
        for tenth in 0..400 {
            let now = T0_MS - 2_000 + tenth * 100;
            let view = reconstruct(&input(Some(&telemetry), now, true, &[]));
            assert!(view.progress_percent <= 100.0);
            assert!(
                view.progress_percent + 1e-9 >= last,
                "progress went back at {now}: {} < {last}",
                view.progress_percent
            );
            last = view.progress_percent;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_stepless_telemetry_uses_total() {
        let telemetry = TimingTelemetry {
            steps: Vec::new(),
            total: 10.0,
            start_time: Some(T0_SECS),
            end_time: None,
        };

        let view = reconstruct(&input(Some(&telemetry), T0_MS + 4_000, true, &[]));
        assert!((view.progress_percent - 40.0).abs() < 1e-9);
        assert!(!view.timeline_finished);
    }

    #[test]
    fn test_missing_start_time_uses_earliest_step() {
        let mut telemetry = debate_telemetry();
        telemetry.start_time = None;

        let view = reconstruct(&input(Some(&telemetry), T0_MS + 2_000, true, &[]));
        assert_eq!(view.current_step_index, Some(0));
        assert!((view.progress_percent - 12.5).abs() < 1e-9);
    }
}
