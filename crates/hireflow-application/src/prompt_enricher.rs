//! Persona prompt enrichment with conversation insight.

use hireflow_core::candidate::Persona;
use hireflow_core::error::{HireError, Result};
use hireflow_core::insight::ConversationInsight;
use minijinja::{Environment, context};

const ENRICHMENT_TEMPLATE_NAME: &str = "persona_enrichment";

const ENRICHMENT_TEMPLATE: &str = r#"{{ base_prompt }}

Context from previous conversations with this candidate:
{%- if summaries %}
Recent summaries:
{%- for summary in summaries %}
- {{ summary }}
{%- endfor %}
{%- endif %}
{%- if guidance %}
Interviewer guidance:
{%- for note in guidance %}
- {{ note }}
{%- endfor %}
{%- endif %}
"#;

/// Builds the effective system prompt for a persona.
pub struct PromptEnricher {
    env: Environment<'static>,
}

impl PromptEnricher {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(ENRICHMENT_TEMPLATE_NAME, ENRICHMENT_TEMPLATE)
            .map_err(|e| HireError::internal(format!("invalid enrichment template: {e}")))?;
        Ok(Self { env })
    }

    /// Base prompt, plus a block of recent summaries and matched guidance
    /// (one bullet per line) when the candidate has any insight for this persona.
    pub fn enrich(&self, persona: &Persona, insight: Option<&ConversationInsight>) -> Result<String> {
        let Some(insight) = insight.filter(|insight| insight.has_content_for(persona)) else {
            return Ok(persona.system_prompt.clone());
        };

        let template = self
            .env
            .get_template(ENRICHMENT_TEMPLATE_NAME)
            .map_err(|e| HireError::internal(e.to_string()))?;

        let rendered = template
            .render(context! {
                base_prompt => persona.system_prompt.trim_end(),
                summaries => &insight.summaries,
                guidance => insight.guidance_for(persona),
            })
            .map_err(|e| HireError::internal(format!("failed to render prompt: {e}")))?;

        Ok(rendered.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn persona() -> Persona {
        Persona {
            id: "p1".to_string(),
            name: "tech_lead".to_string(),
            display_name: "Tech Lead".to_string(),
            system_prompt: "You are a tech lead.".to_string(),
        }
    }

    #[test]
    fn test_without_insight_returns_base_prompt() {
        let enricher = PromptEnricher::new().unwrap();
        assert_eq!(enricher.enrich(&persona(), None).unwrap(), "You are a tech lead.");
        assert_eq!(
            enricher
                .enrich(&persona(), Some(&ConversationInsight::default()))
                .unwrap(),
            "You are a tech lead."
        );
    }

    #[test]
    fn test_appends_summaries_and_guidance_as_bullets() {
        let enricher = PromptEnricher::new().unwrap();
        let mut guidance = BTreeMap::new();
        guidance.insert("tech_lead".to_string(), vec!["Probe async Rust".to_string()]);
        guidance.insert("all".to_string(), vec!["Confirm notice period".to_string()]);
        guidance.insert("hr".to_string(), vec!["not for this persona".to_string()]);
        let insight = ConversationInsight {
            summaries: vec!["Strong on storage engines".to_string(), "Wants remote".to_string()],
            persona_guidance: guidance,
        };

        let prompt = enricher.enrich(&persona(), Some(&insight)).unwrap();
        let lines: Vec<&str> = prompt.lines().collect();

        assert_eq!(
            lines,
            vec![
                "You are a tech lead.",
                "",
                "Context from previous conversations with this candidate:",
                "Recent summaries:",
                "- Strong on storage engines",
                "- Wants remote",
                "Interviewer guidance:",
                "- Probe async Rust",
                "- Confirm notice period",
            ]
        );
    }

    #[test]
    fn test_guidance_only_skips_summary_header() {
        let enricher = PromptEnricher::new().unwrap();
        let mut guidance = BTreeMap::new();
        guidance.insert("all".to_string(), vec!["Ask about leadership".to_string()]);
        let insight = ConversationInsight {
            summaries: Vec::new(),
            persona_guidance: guidance,
        };

        let prompt = enricher.enrich(&persona(), Some(&insight)).unwrap();
        assert!(!prompt.contains("Recent summaries:"));
        assert!(prompt.ends_with("Interviewer guidance:\n- Ask about leadership"));
    }
}
