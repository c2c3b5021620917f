//! Evaluation request models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidate::Candidate;

/// One enriched prompt, sent as the `<persona_key>_prompt` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaPrompt {
    pub persona_key: String,
    pub prompt: String,
}

impl PersonaPrompt {
    pub fn field_name(&self) -> String {
        format!("{}_prompt", self.persona_key)
    }
}

/// Company context attached to a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompanyNote {
    Text { text: String },
    File { file_name: String, content: Vec<u8> },
}

/// A note file the recruiter uploaded for this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedNote {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Where the company note for each call comes from.
///
/// Priority: the candidate's own note when `use_candidate_note` is set, then
/// manually entered text, then the uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyNoteSource {
    #[serde(default)]
    pub use_candidate_note: bool,
    #[serde(default)]
    pub manual_text: Option<String>,
    #[serde(default)]
    pub uploaded: Option<UploadedNote>,
}

impl CompanyNoteSource {
    pub fn choose(&self, candidate: &Candidate) -> Option<CompanyNote> {
        let non_empty = |text: &Option<String>| {
            text.as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        if self.use_candidate_note
            && let Some(text) = non_empty(&candidate.company_note)
        {
            return Some(CompanyNote::Text { text });
        }

        if let Some(text) = non_empty(&self.manual_text) {
            return Some(CompanyNote::Text { text });
        }

        self.uploaded.as_ref().map(|file| CompanyNote::File {
            file_name: file.file_name.clone(),
            content: file.content.clone(),
        })
    }
}

/// A single evaluate or debate call for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub candidate_id: String,
    pub job_id: String,
    /// Client-generated id echoed back by the backend to correlate results
    pub correlation_id: String,
    pub persona_prompts: Vec<PersonaPrompt>,
    pub company_note: Option<CompanyNote>,
}

impl EvaluationRequest {
    pub fn new(candidate_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            job_id: job_id.into(),
            correlation_id: Uuid::new_v4().to_string(),
            persona_prompts: Vec::new(),
            company_note: None,
        }
    }

    pub fn with_prompt(mut self, persona_key: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.persona_prompts.push(PersonaPrompt {
            persona_key: persona_key.into(),
            prompt: prompt.into(),
        });
        self
    }

    pub fn with_company_note(mut self, note: Option<CompanyNote>) -> Self {
        self.company_note = note;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_note(note: Option<&str>) -> Candidate {
        let mut candidate = Candidate::new("c1", "Ada");
        candidate.company_note = note.map(str::to_string);
        candidate
    }

    fn uploaded() -> UploadedNote {
        UploadedNote {
            file_name: "notes.txt".to_string(),
            content: b"uploaded".to_vec(),
        }
    }

    #[test]
    fn test_candidate_note_wins_when_flagged() {
        let source = CompanyNoteSource {
            use_candidate_note: true,
            manual_text: Some("manual".to_string()),
            uploaded: Some(uploaded()),
        };
        assert_eq!(
            source.choose(&candidate_with_note(Some("candidate specific"))),
            Some(CompanyNote::Text {
                text: "candidate specific".to_string()
            })
        );
    }

    #[test]
    fn test_manual_text_beats_file() {
        let source = CompanyNoteSource {
            use_candidate_note: false,
            manual_text: Some("manual".to_string()),
            uploaded: Some(uploaded()),
        };
        assert_eq!(
            source.choose(&candidate_with_note(Some("ignored"))),
            Some(CompanyNote::Text {
                text: "manual".to_string()
            })
        );
    }

    #[test]
    fn test_file_is_last_resort() {
        let source = CompanyNoteSource {
            use_candidate_note: true,
            manual_text: Some("   ".to_string()),
            uploaded: Some(uploaded()),
        };
        assert_eq!(
            source.choose(&candidate_with_note(None)),
            Some(CompanyNote::File {
                file_name: "notes.txt".to_string(),
                content: b"uploaded".to_vec(),
            })
        );
        assert_eq!(CompanyNoteSource::default().choose(&candidate_with_note(None)), None);
    }

    #[test]
    fn test_request_builder() {
        let request = EvaluationRequest::new("c1", "job-1")
            .with_prompt("tech_lead", "Assess systems depth")
            .with_prompt("hr", "Assess culture");

        assert_eq!(request.persona_prompts.len(), 2);
        assert_eq!(request.persona_prompts[0].field_name(), "tech_lead_prompt");
        assert!(Uuid::parse_str(&request.correlation_id).is_ok());
        assert_ne!(
            request.correlation_id,
            EvaluationRequest::new("c1", "job-1").correlation_id
        );
    }
}
