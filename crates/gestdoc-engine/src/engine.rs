//! The chat entry point: one question in, one persisted answer out.

use std::time::Instant;

use gestdoc_ai::{GenerationFailure, GenerationGateway, analyze};
use gestdoc_core::{
    Conversation, ConversationTurn, IntentCategory, TurnMetadata, TurnRole, UserRef,
    derive_title,
};
use gestdoc_store::{ConversationStore, DomainSource};
use tracing::{debug, info};

use crate::context::{Assembly, assemble};
use crate::error::EngineError;
use crate::router::RetrievalRouter;
use crate::settings::EngineSettings;

/// Result of [`ChatEngine::submit_query`].
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub conversation_id: i64,
    pub answer: String,
    pub consulted_document_ids: Vec<i64>,
    pub extracted_entities: Vec<String>,
    pub category: IntentCategory,
    /// Answered from structured data without a generation call.
    pub direct: bool,
    pub failure: Option<GenerationFailure>,
    pub tokens_used: Option<u32>,
    pub latency_seconds: f64,
}

/// Request-scoped orchestration over borrowed collaborators. Holds no
/// mutable state, so one engine can serve any number of questions.
pub struct ChatEngine<'a> {
    source: &'a dyn DomainSource,
    conversations: &'a dyn ConversationStore,
    gateway: &'a GenerationGateway,
    settings: EngineSettings,
}

impl<'a> ChatEngine<'a> {
    pub fn new(
        source: &'a dyn DomainSource,
        conversations: &'a dyn ConversationStore,
        gateway: &'a GenerationGateway,
        settings: EngineSettings,
    ) -> Self {
        Self {
            source,
            conversations,
            gateway,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Answer a question and persist both turns.
    ///
    /// Without `conversation_id` a new conversation is opened, titled from
    /// the question. Generation failures become the answer text; only blank
    /// input, an unknown conversation, or a conversation-store failure error.
    pub async fn submit_query(
        &self,
        text: &str,
        conversation_id: Option<i64>,
        user: &UserRef,
    ) -> Result<Answer, EngineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let conversation = match conversation_id {
            Some(id) => self.owned_conversation(id, user)?,
            None => {
                let title = derive_title(text, self.settings.title_max_chars);
                self.conversations.create_conversation(user.id, &title)?
            }
        };

        let start = Instant::now();
        let query = analyze(text);

        // Read before appending so the window holds whole exchanges.
        let history = self
            .conversations
            .list_recent_turns(conversation.id, self.settings.history_window)?;
        let user_meta = TurnMetadata {
            extracted_entities: query.entities.clone(),
            ..Default::default()
        };
        self.conversations
            .append_turn(conversation.id, TurnRole::User, text, &user_meta)?;

        let bundle = RetrievalRouter::new(self.source, &self.settings).retrieve(&query, user);

        let (answer, tokens_used, failure, direct) =
            match assemble(&bundle, &history, self.settings.history_window) {
                Assembly::Direct(answer) => (answer, None, None, true),
                Assembly::Generate(prompt) => {
                    let generation = self
                        .gateway
                        .generate(
                            &prompt.system_prompt,
                            &prompt.context_block,
                            &prompt.history,
                            text,
                        )
                        .await;
                    (
                        generation.text,
                        generation.tokens_used,
                        generation.failure,
                        false,
                    )
                }
            };
        let latency_seconds = start.elapsed().as_secs_f64();

        let consulted_document_ids = bundle.document_ids();
        let assistant_meta = TurnMetadata {
            tokens_used,
            latency_seconds: Some(latency_seconds),
            consulted_ids: consulted_document_ids.clone(),
            extracted_entities: query.entities.clone(),
        };
        self.conversations.append_turn(
            conversation.id,
            TurnRole::Assistant,
            &answer,
            &assistant_meta,
        )?;
        self.conversations.touch_conversation(conversation.id)?;

        info!(
            conversation_id = conversation.id,
            category = query.category.as_str(),
            direct,
            documents = consulted_document_ids.len(),
            latency_seconds,
            "query answered"
        );

        Ok(Answer {
            conversation_id: conversation.id,
            answer,
            consulted_document_ids,
            extracted_entities: query.entities,
            category: query.category,
            direct,
            failure,
            tokens_used,
            latency_seconds,
        })
    }

    // ── Conversation management ──

    fn owned_conversation(&self, id: i64, user: &UserRef) -> Result<Conversation, EngineError> {
        self.conversations
            .conversation(id, user.id)?
            .ok_or(EngineError::NotFound {
                what: "conversation",
                id,
            })
    }

    pub fn conversations(&self, user: &UserRef) -> Result<Vec<Conversation>, EngineError> {
        Ok(self.conversations.list_conversations(user.id)?)
    }

    /// Full transcript of one of the user's conversations.
    pub fn transcript(
        &self,
        id: i64,
        user: &UserRef,
    ) -> Result<(Conversation, Vec<ConversationTurn>), EngineError> {
        let conversation = self.owned_conversation(id, user)?;
        let turns = self.conversations.list_turns(conversation.id)?;
        Ok((conversation, turns))
    }

    pub fn forget(&self, id: i64, user: &UserRef) -> Result<(), EngineError> {
        if self.conversations.deactivate_conversation(id, user.id)? {
            debug!(conversation_id = id, "conversation deactivated");
            Ok(())
        } else {
            Err(EngineError::NotFound {
                what: "conversation",
                id,
            })
        }
    }
}
