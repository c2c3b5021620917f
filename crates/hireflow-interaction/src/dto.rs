//! Wire formats of the backend HTTP API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hireflow_core::candidate::Candidate;
use hireflow_core::evaluation::{
    CallResponse, CompanyNote, EvaluationRequest, ResultSummary, Transcript,
};
use hireflow_core::insight::ConversationRecord;
use hireflow_core::pipeline::PipelineStage;
use hireflow_core::telemetry::TimingTelemetry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Builds the JSON body of an evaluate or debate call.
///
/// Each persona prompt becomes a top-level `<persona_key>_prompt` field.
/// File notes travel base64-encoded under `company_note_file`.
pub fn request_body(request: &EvaluationRequest) -> Value {
    let mut body = Map::new();
    body.insert("candidate_id".into(), Value::String(request.candidate_id.clone()));
    body.insert("job_id".into(), Value::String(request.job_id.clone()));
    body.insert(
        "correlation_id".into(),
        Value::String(request.correlation_id.clone()),
    );

    for prompt in &request.persona_prompts {
        body.insert(prompt.field_name(), Value::String(prompt.prompt.clone()));
    }

    match &request.company_note {
        Some(CompanyNote::Text { text }) => {
            body.insert("company_note".into(), Value::String(text.clone()));
        }
        Some(CompanyNote::File { file_name, content }) => {
            body.insert(
                "company_note_file".into(),
                serde_json::json!({
                    "file_name": file_name,
                    "content_base64": STANDARD.encode(content),
                }),
            );
        }
        None => {}
    }

    Value::Object(body)
}

/// Answer of an evaluate or debate call.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitResponseDto {
    /// Absent means success
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub result_id: Option<Value>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub timing_data: Option<TimingTelemetry>,
    #[serde(default)]
    pub debate: Option<Transcript>,
    #[serde(default)]
    pub transcript: Option<Transcript>,
}

impl SubmitResponseDto {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }

    pub fn into_response(self) -> CallResponse {
        CallResponse {
            result_id: self.result_id.as_ref().and_then(id_string),
            correlation_id: self.correlation_id,
            timing: self.timing_data,
            transcript: self.debate.or(self.transcript),
        }
    }
}

/// Ids arrive as strings or numbers depending on the backend version.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ConversationsDto {
    Wrapped { conversations: Vec<ConversationRecord> },
    Bare(Vec<ConversationRecord>),
}

impl ConversationsDto {
    pub fn into_records(self) -> Vec<ConversationRecord> {
        match self {
            Self::Wrapped { conversations } => conversations,
            Self::Bare(conversations) => conversations,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultEntryDto {
    pub id: Value,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResultsDto {
    Wrapped { results: Vec<ResultEntryDto> },
    Bare(Vec<ResultEntryDto>),
}

impl ResultsDto {
    /// Entries without a usable id are dropped.
    pub fn into_summaries(self) -> Vec<ResultSummary> {
        let entries = match self {
            Self::Wrapped { results } => results,
            Self::Bare(results) => results,
        };
        entries
            .into_iter()
            .filter_map(|entry| {
                Some(ResultSummary {
                    id: id_string(&entry.id)?,
                    correlation_id: entry.correlation_id,
                    created_at: entry.created_at,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CandidatesDto {
    Wrapped { candidates: Vec<Candidate> },
    Bare(Vec<Candidate>),
}

impl CandidatesDto {
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::Wrapped { candidates } => candidates,
            Self::Bare(candidates) => candidates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StageUpdateDto {
    pub pipeline_stage: PipelineStage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_flattens_prompts_and_encodes_file() {
        let request = EvaluationRequest::new("c1", "job-1")
            .with_prompt("tech_lead", "Assess depth")
            .with_company_note(Some(CompanyNote::File {
                file_name: "notes.txt".to_string(),
                content: b"hello".to_vec(),
            }));

        let body = request_body(&request);

        assert_eq!(body["candidate_id"], "c1");
        assert_eq!(body["tech_lead_prompt"], "Assess depth");
        assert_eq!(body["correlation_id"], request.correlation_id.as_str());
        assert_eq!(body["company_note_file"]["content_base64"], "aGVsbG8=");
        assert!(body.get("company_note").is_none());
    }

    #[test]
    fn test_debate_response_maps_transcript_and_numeric_id() {
        let dto: SubmitResponseDto = serde_json::from_value(json!({
            "success": true,
            "result_id": 42,
            "timing_data": {"steps": [{"step": "moderator_opening", "duration": 2.0}], "total": 2.0},
            "debate": [{"role": "moderator", "content": "Welcome"}]
        }))
        .unwrap();

        assert!(dto.is_success());
        let response = dto.into_response();
        assert_eq!(response.result_id.as_deref(), Some("42"));
        assert_eq!(response.timing.unwrap().steps.len(), 1);
        assert_eq!(response.transcript.unwrap().turn_count(), 1);
    }

    #[test]
    fn test_results_accept_wrapped_and_bare_lists() {
        let wrapped: ResultsDto =
            serde_json::from_value(json!({"results": [{"id": "r1"}, {"id": null}]})).unwrap();
        assert_eq!(wrapped.into_summaries().len(), 1);

        let bare: ResultsDto =
            serde_json::from_value(json!([{"id": 7, "correlation_id": "corr"}])).unwrap();
        let summaries = bare.into_summaries();
        assert_eq!(summaries[0].id, "7");
        assert_eq!(summaries[0].correlation_id.as_deref(), Some("corr"));
    }
}
