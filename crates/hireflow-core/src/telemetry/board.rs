//! Per-candidate telemetry store.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::model::TimingTelemetry;

#[derive(Debug, Default)]
struct BoardState {
    records: HashMap<String, TimingTelemetry>,
    /// Candidate ids, oldest arrival first
    arrivals: Vec<String>,
    selected: Option<String>,
}

/// Independent telemetry records keyed by candidate id.
///
/// Concurrent debate calls each write their own entry. The view picks which
/// candidate to render with `select`; without a selection the most recent
/// arrival is shown.
#[derive(Debug, Clone, Default)]
pub struct TelemetryBoard {
    state: Arc<RwLock<BoardState>>,
}

impl TelemetryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores telemetry for a candidate, replacing any earlier record.
    pub async fn insert(&self, candidate_id: &str, telemetry: TimingTelemetry) {
        let mut state = self.state.write().await;
        state.arrivals.retain(|id| id != candidate_id);
        state.arrivals.push(candidate_id.to_string());
        state.records.insert(candidate_id.to_string(), telemetry);
    }

    pub async fn get(&self, candidate_id: &str) -> Option<TimingTelemetry> {
        self.state.read().await.records.get(candidate_id).cloned()
    }

    /// Chooses which candidate's timeline to render; `None` follows the latest arrival.
    pub async fn select(&self, candidate_id: Option<String>) {
        self.state.write().await.selected = candidate_id;
    }

    pub async fn selected(&self) -> Option<String> {
        self.state.read().await.selected.clone()
    }

    pub async fn latest_candidate(&self) -> Option<String> {
        self.state.read().await.arrivals.last().cloned()
    }

    /// Telemetry to render: the selected candidate's, else the latest arrival's.
    pub async fn current(&self) -> Option<(String, TimingTelemetry)> {
        let state = self.state.read().await;
        let candidate_id = state
            .selected
            .as_ref()
            .or_else(|| state.arrivals.last())?;
        state
            .records
            .get(candidate_id)
            .map(|telemetry| (candidate_id.clone(), telemetry.clone()))
    }

    /// Candidate ids with telemetry, in arrival order.
    pub async fn candidates(&self) -> Vec<String> {
        self.state.read().await.arrivals.clone()
    }

    /// Drops every record and the selection; called at run start.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.records.clear();
        state.arrivals.clear();
        state.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry(total: f64) -> TimingTelemetry {
        TimingTelemetry {
            total,
            ..TimingTelemetry::default()
        }
    }

    #[tokio::test]
    async fn test_latest_arrival_is_current_by_default() {
        let board = TelemetryBoard::new();
        board.insert("c1", telemetry(1.0)).await;
        board.insert("c2", telemetry(2.0)).await;

        let (candidate, current) = board.current().await.unwrap();
        assert_eq!(candidate, "c2");
        assert_eq!(current.total, 2.0);
        assert_eq!(board.candidates().await, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_selection_pins_candidate() {
        let board = TelemetryBoard::new();
        board.insert("c1", telemetry(1.0)).await;
        board.select(Some("c1".to_string())).await;
        board.insert("c2", telemetry(2.0)).await;

        let (candidate, _) = board.current().await.unwrap();
        assert_eq!(candidate, "c1");
        assert_eq!(board.get("c2").await.unwrap().total, 2.0);
    }

    #[tokio::test]
    async fn test_reinsert_moves_to_latest_and_clear_resets() {
        let board = TelemetryBoard::new();
        board.insert("c1", telemetry(1.0)).await;
        board.insert("c2", telemetry(2.0)).await;
        board.insert("c1", telemetry(3.0)).await;

        assert_eq!(board.latest_candidate().await.as_deref(), Some("c1"));
        assert_eq!(board.candidates().await, vec!["c2", "c1"]);

        board.clear().await;
        assert!(board.current().await.is_none());
        assert!(board.selected().await.is_none());
    }
}
