//! Persistence contract for chat conversations.
//!
//! History is best-effort: appends are not wrapped in a transaction with the
//! read that precedes them.

use gestdoc_core::{Conversation, ConversationTurn, TurnMetadata, TurnRole};

use crate::StoreError;

pub trait ConversationStore {
    fn create_conversation(&self, user_id: i64, title: &str) -> Result<Conversation, StoreError>;

    /// An active conversation owned by `user_id`. Other users' conversations
    /// are indistinguishable from missing ones.
    fn conversation(&self, id: i64, user_id: i64) -> Result<Option<Conversation>, StoreError>;

    /// Active conversations, most recently updated first.
    fn list_conversations(&self, user_id: i64) -> Result<Vec<Conversation>, StoreError>;

    fn append_turn(
        &self,
        conversation_id: i64,
        role: TurnRole,
        content: &str,
        metadata: &TurnMetadata,
    ) -> Result<ConversationTurn, StoreError>;

    /// The last `limit` turns, oldest first.
    fn list_recent_turns(
        &self,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError>;

    /// Full transcript, oldest first.
    fn list_turns(&self, conversation_id: i64) -> Result<Vec<ConversationTurn>, StoreError>;

    /// Bump the conversation's last-updated timestamp.
    fn touch_conversation(&self, id: i64) -> Result<(), StoreError>;

    /// Soft-delete. Returns `false` when nothing owned by `user_id` matched.
    fn deactivate_conversation(&self, id: i64, user_id: i64) -> Result<bool, StoreError>;
}
