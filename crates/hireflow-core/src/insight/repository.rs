//! Conversation source trait.

use super::model::ConversationRecord;
use crate::error::Result;

/// Lookup of a candidate's recorded conversations.
#[async_trait::async_trait]
pub trait ConversationSource: Send + Sync {
    async fn conversations_for(&self, candidate_id: &str) -> Result<Vec<ConversationRecord>>;
}
