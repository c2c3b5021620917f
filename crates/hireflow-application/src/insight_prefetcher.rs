//! Conversation insight prefetching.
//!
//! Insight is fetched lazily, cached per candidate in memory and force
//! refreshed right before every orchestration run.

use futures::future::join_all;
use hireflow_core::insight::{ConversationInsight, ConversationSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// Cached, coalescing access to per-candidate conversation insight.
///
/// A fetch that starts while another fetch for the same candidate is still
/// pending does not hit the backend; it returns whatever is cached.
pub struct InsightPrefetcher {
    source: Arc<dyn ConversationSource>,
    cache: Arc<RwLock<HashMap<String, ConversationInsight>>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Removes the candidate from the in-flight set when the fetch ends or is dropped.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    candidate_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.candidate_id);
        }
    }
}

impl InsightPrefetcher {
    pub fn new(source: Arc<dyn ConversationSource>) -> Self {
        Self {
            source,
            cache: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns insight for a candidate, fetching it when uncached or `force`d.
    ///
    /// Fetch failures are logged and leave the previous cache entry in place.
    pub async fn fetch(&self, candidate_id: &str, force: bool) -> Option<ConversationInsight> {
        if !force && let Some(cached) = self.cached(candidate_id).await {
            return Some(cached);
        }

        let Some(_guard) = self.try_begin(candidate_id) else {
            tracing::debug!(
                "[InsightPrefetcher] fetch for {} already in flight; returning cache",
                candidate_id
            );
            return self.cached(candidate_id).await;
        };

        match self.source.conversations_for(candidate_id).await {
            Ok(records) => {
                let insight = ConversationInsight::from_conversations(records);
                tracing::debug!(
                    "[InsightPrefetcher] candidate {}: {} summaries, {} guidance buckets",
                    candidate_id,
                    insight.summaries.len(),
                    insight.persona_guidance.len()
                );
                self.cache
                    .write()
                    .await
                    .insert(candidate_id.to_string(), insight.clone());
                Some(insight)
            }
            Err(e) => {
                tracing::warn!(
                    "[InsightPrefetcher] Failed to fetch conversations for {}: {}",
                    candidate_id,
                    e
                );
                self.cached(candidate_id).await
            }
        }
    }

    /// Force-refreshes every candidate concurrently and resolves once all are done.
    pub async fn refresh_all(&self, candidate_ids: &[String]) -> HashMap<String, ConversationInsight> {
        let fetches = candidate_ids.iter().map(|candidate_id| async move {
            let insight = self.fetch(candidate_id, true).await;
            (candidate_id.clone(), insight)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(candidate_id, insight)| insight.map(|insight| (candidate_id, insight)))
            .collect()
    }

    pub async fn cached(&self, candidate_id: &str) -> Option<ConversationInsight> {
        self.cache.read().await.get(candidate_id).cloned()
    }

    pub async fn invalidate(&self, candidate_id: &str) {
        self.cache.write().await.remove(candidate_id);
    }

    fn try_begin(&self, candidate_id: &str) -> Option<InFlightGuard> {
        let mut in_flight = self.in_flight.lock().ok()?;
        if !in_flight.insert(candidate_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: self.in_flight.clone(),
            candidate_id: candidate_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireflow_core::error::{HireError, Result};
    use hireflow_core::insight::ConversationRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
        gate: Option<Arc<Notify>>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                gate: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl ConversationSource for CountingSource {
        async fn conversations_for(&self, candidate_id: &str) -> Result<Vec<ConversationRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(HireError::request(500, "down"));
            }
            Ok(vec![ConversationRecord {
                summary: Some(format!("{candidate_id} call {call}")),
                ..ConversationRecord::default()
            }])
        }
    }

    #[tokio::test]
    async fn test_cached_value_is_reused_unless_forced() {
        let source = Arc::new(CountingSource::new());
        let prefetcher = InsightPrefetcher::new(source.clone());

        let first = prefetcher.fetch("c1", false).await.unwrap();
        let second = prefetcher.fetch("c1", false).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let forced = prefetcher.fetch("c1", true).await.unwrap();
        assert_eq!(forced.summaries, vec!["c1 call 2"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_fetch_is_coalesced() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(CountingSource {
            gate: Some(gate.clone()),
            ..CountingSource::new()
        });
        let prefetcher = InsightPrefetcher::new(source.clone());

        let pending = prefetcher.fetch("c1", true);
        let duplicate = async {
            // Runs while the first fetch waits on the gate.
            let result = prefetcher.fetch("c1", true).await;
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(pending, duplicate);

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(first.is_some());
        assert!(second.is_none(), "duplicate call returns the empty cache");
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_cache() {
        let prefetcher = InsightPrefetcher::new(Arc::new(CountingSource::new()));
        prefetcher.fetch("c1", false).await.unwrap();

        let failing = InsightPrefetcher {
            source: Arc::new(CountingSource {
                fail: true,
                ..CountingSource::new()
            }),
            cache: prefetcher.cache.clone(),
            in_flight: prefetcher.in_flight.clone(),
        };

        let result = failing.fetch("c1", true).await.unwrap();
        assert_eq!(result.summaries, vec!["c1 call 1"]);
    }

    #[tokio::test]
    async fn test_refresh_all_covers_every_candidate() {
        let source = Arc::new(CountingSource::new());
        let prefetcher = InsightPrefetcher::new(source.clone());
        let ids = vec!["c1".to_string(), "c2".to_string()];

        let insights = prefetcher.refresh_all(&ids).await;

        assert_eq!(insights.len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(prefetcher.cached("c2").await.is_some());
    }
}
