//! Configuration model.
//!
//! Every field has a default so a missing or partial `config.toml` still
//! yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::selection::DEFAULT_MAX_COMPARE_CANDIDATES;
use crate::telemetry::DEFAULT_IDLE_PROGRESS_FLOOR;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    pub backend: BackendConfig,
    pub orchestrator: OrchestratorConfig,
    pub progress: ProgressConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// No client-side timeout when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            api_token: None,
            request_timeout_secs: None,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Wait before looking up a result the backend did not return directly
    pub fallback_lookup_delay_ms: u64,
    /// Clamped to 2..=5 when a selection is built
    pub max_compare_candidates: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fallback_lookup_delay_ms: 1500,
            max_compare_candidates: DEFAULT_MAX_COMPARE_CANDIDATES,
        }
    }
}

impl OrchestratorConfig {
    pub fn fallback_lookup_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_lookup_delay_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    pub tick_interval_ms: u64,
    pub idle_progress_floor_percent: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            idle_progress_floor_percent: DEFAULT_IDLE_PROGRESS_FLOOR,
        }
    }
}

impl ProgressConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Board reload period; 0 disables auto-refresh
    pub auto_refresh_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_refresh_secs: 30,
        }
    }
}

impl PipelineConfig {
    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [backend]
            base_url = "https://eval.example.com"

            [progress]
            tick_interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://eval.example.com");
        assert_eq!(config.backend.api_token, None);
        assert_eq!(config.progress.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.progress.idle_progress_floor_percent, 5.0);
        assert_eq!(config.orchestrator.fallback_lookup_delay_ms, 1500);
        assert_eq!(config.orchestrator.max_compare_candidates, 5);
    }

    #[test]
    fn test_auto_refresh_can_be_disabled() {
        let config = PipelineConfig {
            auto_refresh_secs: 0,
        };
        assert_eq!(config.auto_refresh_interval(), None);
        assert_eq!(
            PipelineConfig::default().auto_refresh_interval(),
            Some(Duration::from_secs(30))
        );
    }
}
