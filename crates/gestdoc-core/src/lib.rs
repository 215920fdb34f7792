//! Core domain types for GestDoc: case/document/actor entities, retrieval results, conversations.

pub mod conversation;
pub mod model;
pub mod retrieval;

pub use conversation::{Conversation, ConversationTurn, TurnMetadata, TurnRole, derive_title};
pub use model::{
    Actor, ActorProfile, ActorRole, Case, CaseStatus, ClientKind, Document, User, UserRef,
};
pub use retrieval::{
    ActorStatistics, ActorSummary, Breakdown, CaseStatistics, CaseSummary, DocumentStatistics,
    DocumentSummary, IntentCategory, Query, RetrievalBundle, RetrievalResult, StatisticsBundle,
    UserStatistics,
};
