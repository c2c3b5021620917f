//! Evaluation backend trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::EvaluationRequest;
use super::response::CallResponse;
use crate::error::Result;
use crate::selection::Action;

/// Filter for the results-listing lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultQuery {
    pub candidate_id: String,
    pub result_type: Action,
    pub job_id: String,
}

/// An entry of the results listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub id: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The AI evaluation/debate service.
///
/// `submit` returns `Err(HireError::Request)` for any non-success answer,
/// with the message already classified from the response body.
#[async_trait::async_trait]
pub trait EvaluationBackend: Send + Sync {
    async fn submit(&self, action: Action, request: &EvaluationRequest) -> Result<CallResponse>;

    async fn list_results(&self, query: &ResultQuery) -> Result<Vec<ResultSummary>>;
}

/// Picks the result a call produced from a listing.
///
/// The entry echoing `correlation_id` wins; otherwise the newest entry, and
/// for undated listings the first one.
pub fn pick_result(results: &[ResultSummary], correlation_id: &str) -> Option<String> {
    if let Some(matched) = results
        .iter()
        .find(|result| result.correlation_id.as_deref() == Some(correlation_id))
    {
        return Some(matched.id.clone());
    }

    results
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| match (&a.created_at, &b.created_at) {
            (Some(a), Some(b)) => a.cmp(b).then(ib.cmp(ia)),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => ib.cmp(ia),
        })
        .map(|(_, result)| result.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary(id: &str, correlation: Option<&str>, hour: Option<u32>) -> ResultSummary {
        ResultSummary {
            id: id.to_string(),
            correlation_id: correlation.map(str::to_string),
            created_at: hour.map(|h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_correlation_match_wins() {
        let results = vec![
            summary("newest", Some("other"), Some(12)),
            summary("mine", Some("corr-1"), Some(8)),
        ];
        assert_eq!(pick_result(&results, "corr-1"), Some("mine".to_string()));
    }

    #[test]
    fn test_newest_when_no_correlation() {
        let results = vec![
            summary("old", None, Some(8)),
            summary("new", None, Some(12)),
            summary("undated", None, None),
        ];
        assert_eq!(pick_result(&results, "corr-1"), Some("new".to_string()));
    }

    #[test]
    fn test_first_when_undated() {
        let results = vec![summary("first", None, None), summary("second", None, None)];
        assert_eq!(pick_result(&results, "corr-1"), Some("first".to_string()));
        assert_eq!(pick_result(&[], "corr-1"), None);
    }
}
