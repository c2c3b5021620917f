//! HttpBackend - REST client for the hiring backend.
//!
//! One client serves three roles: the evaluation service (evaluate, debate,
//! results listing), the conversation lookup used for prompt insight, and the
//! candidate service used by the pipeline board.

use crate::dto::{
    CandidatesDto, ConversationsDto, ResultsDto, StageUpdateDto, SubmitResponseDto, request_body,
};
use async_trait::async_trait;
use hireflow_core::candidate::{Candidate, CandidateRepository};
use hireflow_core::config::BackendConfig;
use hireflow_core::error::{HireError, Result, classify_error_body};
use hireflow_core::evaluation::{
    CallResponse, EvaluationBackend, EvaluationRequest, ResultQuery, ResultSummary,
};
use hireflow_core::insight::{ConversationRecord, ConversationSource};
use hireflow_core::pipeline::PipelineStage;
use hireflow_core::selection::Action;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpBackend {
    /// Creates a client without a request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    /// Builds a client from the `[backend]` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HireError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Sends the request and returns the body of a 2xx response.
    ///
    /// Non-success statuses become `HireError::Request` with a message
    /// classified from the body.
    async fn send(&self, request: RequestBuilder) -> Result<(u16, String)> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| HireError::transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HireError::transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(HireError::request(
                status.as_u16(),
                classify_error_body(status.as_u16(), &body),
            ));
        }
        Ok((status.as_u16(), body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<(u16, T)> {
        let (status, body) = self.send(request).await?;
        let parsed = serde_json::from_str(&body)?;
        Ok((status, parsed))
    }
}

#[async_trait]
impl EvaluationBackend for HttpBackend {
    async fn submit(&self, action: Action, request: &EvaluationRequest) -> Result<CallResponse> {
        let url = self.url(&format!("/api/evaluations/{}", action));
        tracing::debug!(
            "[HttpBackend] POST {} candidate={} correlation={}",
            url,
            request.candidate_id,
            request.correlation_id
        );

        let (status, dto): (u16, SubmitResponseDto) = self
            .send_json(self.client.post(&url).json(&request_body(request)))
            .await?;

        if !dto.is_success() {
            let message = match &dto.error {
                Some(error) => {
                    classify_error_body(status, &serde_json::json!({ "error": error }).to_string())
                }
                None => format!("{} call reported failure", action),
            };
            tracing::warn!("[HttpBackend] {} for {} failed: {}", action, request.candidate_id, message);
            return Err(HireError::request(status, message));
        }

        Ok(dto.into_response())
    }

    async fn list_results(&self, query: &ResultQuery) -> Result<Vec<ResultSummary>> {
        let result_type = query.result_type.to_string();
        let request = self.client.get(self.url("/api/results")).query(&[
            ("candidate_id", query.candidate_id.as_str()),
            ("result_type", result_type.as_str()),
            ("job_id", query.job_id.as_str()),
        ]);

        let (_, dto): (u16, ResultsDto) = self.send_json(request).await?;
        Ok(dto.into_summaries())
    }
}

#[async_trait]
impl ConversationSource for HttpBackend {
    async fn conversations_for(&self, candidate_id: &str) -> Result<Vec<ConversationRecord>> {
        let url = self.url(&format!("/api/candidates/{}/conversations", candidate_id));
        let (_, dto): (u16, ConversationsDto) = self.send_json(self.client.get(&url)).await?;
        Ok(dto.into_records())
    }
}

#[async_trait]
impl CandidateRepository for HttpBackend {
    async fn list_for_job(&self, job_id: &str) -> Result<Vec<Candidate>> {
        let url = self.url(&format!("/api/jobs/{}/candidates", job_id));
        let (_, dto): (u16, CandidatesDto) = self.send_json(self.client.get(&url)).await?;
        Ok(dto.into_candidates())
    }

    async fn update_pipeline_stage(&self, candidate_id: &str, stage: PipelineStage) -> Result<()> {
        let url = self.url(&format!("/api/candidates/{}", candidate_id));
        self.send(
            self.client
                .patch(&url)
                .json(&StageUpdateDto { pipeline_stage: stage }),
        )
        .await?;
        Ok(())
    }
}
