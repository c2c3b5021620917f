use anyhow::{Context, Result};
use hireflow_core::telemetry::ProgressView;
use hireflow_infrastructure::ConfigService;
use hireflow_interaction::HttpBackend;
use std::sync::Arc;

const BAR_WIDTH: usize = 30;

/// Builds the HTTP backend from the effective configuration.
pub fn backend(config_service: &ConfigService) -> Result<Arc<HttpBackend>> {
    let config = config_service.get_config();
    let backend = HttpBackend::from_config(&config.backend)
        .with_context(|| format!("Failed to set up backend client for {}", config.backend.base_url))?;
    Ok(Arc::new(backend))
}

/// One-line rendering of a progress view.
pub fn progress_line(view: &ProgressView) -> String {
    let filled = ((view.progress_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

    let step = match (&view.current_step, view.current_step_index) {
        (Some(step), Some(index)) => format!("step {}/{} {}", index + 1, view.total_steps, step),
        _ if view.timeline_finished => "all steps finished".to_string(),
        _ => "waiting for telemetry".to_string(),
    };

    let mut line = format!(
        "[{}] {:>5.1}% {:>6.1}s  {}",
        bar, view.progress_percent, view.elapsed_secs, step
    );
    if !view.active_agents.is_empty() {
        line.push_str(&format!("  ({})", view.active_agents.join(", ")));
    }
    if view.is_debate_starting {
        line.push_str("  debate starting");
    }
    line
}
