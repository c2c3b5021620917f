//! Conversation insight domain module.
//!
//! Insight is the distilled guidance from a candidate's recorded
//! conversations: the latest summaries plus per-persona guidance notes that
//! get injected into persona prompts.
//!
//! # Module Structure
//!
//! - `model`: raw `ConversationRecord` and the normalized `ConversationInsight`
//! - `repository`: trait for fetching a candidate's conversations

mod model;
mod repository;

// Re-export public API
pub use model::{
    ALL_PERSONAS_KEY, ConversationInsight, ConversationRecord, MAX_RECENT_SUMMARIES,
    parse_persona_guidance,
};
pub use repository::ConversationSource;
