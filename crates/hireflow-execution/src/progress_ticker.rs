//! Periodic progress recomputation.
//!
//! The backend never pushes progress. The ticker rebuilds the view from the
//! telemetry board and the clock on every tick and publishes it on a watch
//! channel.

use chrono::Utc;
use hireflow_core::telemetry::{ProgressView, TelemetryBoard, TimelineInput, reconstruct};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The rendered progress plus the candidate whose telemetry drives it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub candidate_id: Option<String>,
    pub view: ProgressView,
}

/// Inputs of the live view, shared with a running orchestrator.
#[derive(Debug, Clone)]
pub struct ProgressSource {
    telemetry: TelemetryBoard,
    processing: Arc<AtomicBool>,
    run_started_ms: Arc<AtomicI64>,
    default_agents: Vec<String>,
    idle_floor_percent: f64,
}

impl ProgressSource {
    pub fn new(
        telemetry: TelemetryBoard,
        processing: Arc<AtomicBool>,
        run_started_ms: Arc<AtomicI64>,
        default_agents: Vec<String>,
        idle_floor_percent: f64,
    ) -> Self {
        Self {
            telemetry,
            processing,
            run_started_ms,
            default_agents,
            idle_floor_percent,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub async fn snapshot_at(&self, now_ms: i64) -> ProgressSnapshot {
        let current = self.telemetry.current().await;
        let view = reconstruct(&TimelineInput {
            telemetry: current.as_ref().map(|(_, telemetry)| telemetry),
            processing: self.is_processing(),
            now_ms,
            run_started_ms: self.run_started_ms.load(Ordering::SeqCst),
            default_agents: &self.default_agents,
            idle_floor_percent: self.idle_floor_percent,
        });
        ProgressSnapshot {
            candidate_id: current.map(|(candidate_id, _)| candidate_id),
            view,
        }
    }

    pub async fn snapshot_now(&self) -> ProgressSnapshot {
        self.snapshot_at(Utc::now().timestamp_millis()).await
    }
}

pub struct ProgressTicker;

impl ProgressTicker {
    /// Publishes a fresh snapshot every `interval` until `cancel` fires or
    /// every receiver is gone.
    pub fn spawn(
        source: ProgressSource,
        interval: Duration,
        cancel: CancellationToken,
    ) -> (watch::Receiver<ProgressSnapshot>, JoinHandle<()>) {
        let (sender, receiver) = watch::channel(ProgressSnapshot::default());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("[ProgressTicker] Cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let snapshot = source.snapshot_now().await;
                        if sender.send(snapshot).is_err() {
                            tracing::debug!("[ProgressTicker] No receivers left");
                            break;
                        }
                    }
                }
            }
        });

        (receiver, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_core::telemetry::{StepRecord, TimingTelemetry};

    const T0_MS: i64 = 1_700_000_000_000;

    fn source(board: &TelemetryBoard, processing: bool) -> ProgressSource {
        ProgressSource::new(
            board.clone(),
            Arc::new(AtomicBool::new(processing)),
            Arc::new(AtomicI64::new(T0_MS)),
            vec!["tech_lead".to_string(), "hr".to_string()],
            5.0,
        )
    }

    #[tokio::test]
    async fn test_idle_snapshot_uses_floor_and_placeholder_agents() {
        let board = TelemetryBoard::new();
        let snapshot = source(&board, true).snapshot_at(T0_MS + 3_000).await;

        assert!(snapshot.candidate_id.is_none());
        assert!(!snapshot.view.has_telemetry);
        assert_eq!(snapshot.view.progress_percent, 5.0);
        assert_eq!(snapshot.view.elapsed_secs, 3.0);
        assert_eq!(snapshot.view.active_agents, vec!["tech_lead", "hr"]);
    }

    #[tokio::test]
    async fn test_snapshot_follows_selected_candidate() {
        let board = TelemetryBoard::new();
        let telemetry = |secs: f64| TimingTelemetry {
            steps: vec![StepRecord::new("moderator_opening", 10.0).at(1_700_000_000.0)],
            total: secs,
            start_time: Some(1_700_000_000.0),
            end_time: None,
        };
        board.insert("c1", telemetry(10.0)).await;
        board.insert("c2", telemetry(10.0)).await;
        board.select(Some("c1".to_string())).await;

        let snapshot = source(&board, false).snapshot_at(T0_MS + 5_000).await;

        assert_eq!(snapshot.candidate_id.as_deref(), Some("c1"));
        assert!((snapshot.view.progress_percent - 50.0).abs() < 1e-9);
        assert!(snapshot.view.is_debate_starting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_until_cancelled() {
        let board = TelemetryBoard::new();
        let cancel = CancellationToken::new();
        let (mut receiver, handle) =
            ProgressTicker::spawn(source(&board, true), Duration::from_secs(1), cancel.clone());

        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().view.progress_percent, 5.0);

        cancel.cancel();
        handle.await.unwrap();
        assert!(receiver.has_changed().is_err());
    }
}
