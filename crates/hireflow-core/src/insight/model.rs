//! Conversation records and their normalized insight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::candidate::Persona;

/// Number of summaries kept per candidate.
pub const MAX_RECENT_SUMMARIES: usize = 3;

/// Guidance bucket that applies to every persona.
pub const ALL_PERSONAS_KEY: &str = "all";

/// A conversation as returned by the conversations-by-candidate lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(default)]
    pub summary: Option<String>,
    /// Either a JSON map (persona key -> note or notes) or a string holding one
    #[serde(default)]
    pub persona_guidance: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Recent summaries and per-persona guidance for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationInsight {
    /// At most three non-empty summaries, most recent first
    pub summaries: Vec<String>,
    pub persona_guidance: BTreeMap<String, Vec<String>>,
}

impl ConversationInsight {
    /// Normalizes raw conversations.
    ///
    /// Conversations are ordered newest first (undated ones keep their
    /// relative order after the dated ones).
    pub fn from_conversations(mut records: Vec<ConversationRecord>) -> Self {
        records.sort_by(|a, b| match (&a.created_at, &b.created_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let summaries = records
            .iter()
            .filter_map(|record| record.summary.as_deref())
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
            .take(MAX_RECENT_SUMMARIES)
            .map(str::to_string)
            .collect();

        let mut persona_guidance: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for value in records.iter().filter_map(|record| record.persona_guidance.as_ref()) {
            for (key, notes) in parse_persona_guidance(value) {
                let bucket = persona_guidance.entry(key).or_default();
                for note in notes {
                    if !bucket.contains(&note) {
                        bucket.push(note);
                    }
                }
            }
        }

        Self {
            summaries,
            persona_guidance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty() && self.persona_guidance.values().all(Vec::is_empty)
    }

    /// Guidance that applies to `persona`.
    ///
    /// Buckets are read under the technical name, the display name, the
    /// lower-cased display name and the `all` wildcard, in that order, and
    /// concatenated. A key that repeats an earlier one is read once.
    pub fn guidance_for(&self, persona: &Persona) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(4);
        for key in [
            persona.name.clone(),
            persona.display_name.clone(),
            persona.display_name.to_lowercase(),
            ALL_PERSONAS_KEY.to_string(),
        ] {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }

        keys.iter()
            .filter_map(|key| self.persona_guidance.get(key))
            .flat_map(|notes| notes.iter().cloned())
            .collect()
    }

    /// Whether there is anything to inject into this persona's prompt.
    pub fn has_content_for(&self, persona: &Persona) -> bool {
        !self.summaries.is_empty() || !self.guidance_for(persona).is_empty()
    }
}

/// Parses one stored persona-guidance payload into keyed note lists.
///
/// Maps are read directly; strings are parsed as JSON first. Anything that
/// does not yield a map becomes a single bucket under `all`.
pub fn parse_persona_guidance(value: &Value) -> BTreeMap<String, Vec<String>> {
    match value {
        Value::Null => BTreeMap::new(),
        Value::Object(map) => map
            .iter()
            .map(|(key, notes)| (key.clone(), collect_notes(notes)))
            .filter(|(_, notes)| !notes.is_empty())
            .collect(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Object(_)) => parse_persona_guidance(&parsed),
            _ => wildcard_bucket(collect_notes(value)),
        },
        other => wildcard_bucket(collect_notes(other)),
    }
}

fn wildcard_bucket(notes: Vec<String>) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    if !notes.is_empty() {
        map.insert(ALL_PERSONAS_KEY.to_string(), notes);
    }
    map
}

fn collect_notes(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
        Value::Array(items) => items.iter().flat_map(collect_notes).collect(),
        other => vec![other.to_string()],
    }
}
