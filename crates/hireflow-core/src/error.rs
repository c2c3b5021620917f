//! Error types for the Hireflow application.

use crate::selection::ValidationIssue;
use thiserror::Error;

/// A shared error type for the entire Hireflow application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum HireError {
    /// The selection is incomplete or inconsistent; raised before any network call
    #[error("Selection is not ready: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// The backend answered with a non-success response
    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// The request never produced a response (connect, timeout, decode)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A fail-fast lane stopped the whole run
    #[error("{action} lane aborted on candidate '{candidate_id}': {message}")]
    LaneAborted {
        action: String,
        candidate_id: String,
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl HireError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Request error
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message suitable for a blocking alert in the hosting view.
    pub fn alert_message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            Self::LaneAborted { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HireError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HireError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HireError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HireError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (for adapters built on anyhow)
impl From<anyhow::Error> for HireError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, HireError>`.
pub type Result<T> = std::result::Result<T, HireError>;

/// Extracts a human-readable message from a non-success response body.
///
/// Structured bodies win: the first of `error`, `detail`, `message` that holds
/// a string (or an object with a string `message`) is used. Anything else falls
/// back to the trimmed raw text, and an empty body to `HTTP <status>`.
pub fn classify_error_body(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            match map.get(key) {
                Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
                    return text.trim().to_string();
                }
                Some(serde_json::Value::Object(inner)) => {
                    if let Some(serde_json::Value::String(text)) = inner.get("message") {
                        return text.trim().to_string();
                    }
                }
                _ => {}
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefers_structured_error_field() {
        let body = r#"{"error": "candidate has no resume", "detail": "ignored"}"#;
        assert_eq!(classify_error_body(422, body), "candidate has no resume");
    }

    #[test]
    fn test_classify_reads_nested_message() {
        let body = r#"{"detail": {"message": "job closed"}}"#;
        assert_eq!(classify_error_body(400, body), "job closed");
    }

    #[test]
    fn test_classify_falls_back_to_raw_text() {
        assert_eq!(
            classify_error_body(502, "  upstream timed out \n"),
            "upstream timed out"
        );
        assert_eq!(
            classify_error_body(500, r#"{"unexpected": true}"#),
            r#"{"unexpected": true}"#
        );
    }

    #[test]
    fn test_classify_empty_body_uses_status() {
        assert_eq!(classify_error_body(503, ""), "HTTP 503");
    }

    #[test]
    fn test_alert_message_strips_request_prefix() {
        let err = HireError::request(500, "boom");
        assert_eq!(err.alert_message(), "boom");
        assert!(err.is_request());
    }
}
