//! Read contracts the query engine depends on.
//!
//! The engine never writes to the domain tables. Every method is a single
//! read; callers decide how to treat a failure (the retrieval router turns
//! each one into an empty result).

use gestdoc_core::{
    Actor, ActorRole, ActorStatistics, Case, CaseStatistics, CaseStatus, Document,
    DocumentStatistics, User, UserStatistics,
};

use crate::StoreError;

/// A case row together with the number of documents filed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseHit {
    pub case: Case,
    /// Counted through expediente → carpeta → documento.
    pub document_count: u64,
}

/// A document row with the display fields resolved through its joins.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHit {
    pub document: Document,
    pub type_name: String,
    pub case_number: Option<String>,
}

/// Queryable view over cases, documents, actors, and users.
pub trait DomainSource {
    // ── Identity ──

    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// The actor linked one-to-one with a user account, if any.
    fn linked_actor(&self, user_id: i64) -> Result<Option<Actor>, StoreError>;

    // ── Cases ──

    /// Cases whose number contains `fragment` (case-insensitive).
    fn cases_by_number(&self, fragment: &str, limit: usize) -> Result<Vec<CaseHit>, StoreError>;

    fn cases_by_status(&self, status: &CaseStatus, limit: usize)
    -> Result<Vec<CaseHit>, StoreError>;

    /// Cases whose type contains `type_name` (case-insensitive).
    fn cases_by_type(&self, type_name: &str, limit: usize) -> Result<Vec<CaseHit>, StoreError>;

    /// Most recently started cases first.
    fn recent_cases(&self, limit: usize) -> Result<Vec<CaseHit>, StoreError>;

    /// Cases the actor works on (team) or is a party to (clients).
    fn cases_for_actor(&self, actor_id: i64, limit: usize) -> Result<Vec<CaseHit>, StoreError>;

    // ── Documents ──

    /// Documents whose name or keyword field contains `text` (case-insensitive).
    fn documents_matching(&self, text: &str, limit: usize)
    -> Result<Vec<DocumentHit>, StoreError>;

    /// Documents whose type name appears inside `text`.
    fn documents_by_type_mention(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError>;

    /// Most recently dated documents first.
    fn recent_documents(&self, limit: usize) -> Result<Vec<DocumentHit>, StoreError>;

    /// Documents filed under cases the actor participates in.
    fn documents_for_actor(
        &self,
        actor_id: i64,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError>;

    // ── Actors ──

    /// Actors whose name parts or national id contain `text` (case-insensitive).
    fn actors_matching(&self, text: &str, limit: usize) -> Result<Vec<Actor>, StoreError>;

    fn actors_by_role(&self, role: ActorRole, limit: usize) -> Result<Vec<Actor>, StoreError>;

    // ── Aggregates ──

    fn case_statistics(&self) -> Result<CaseStatistics, StoreError>;

    fn document_statistics(&self) -> Result<DocumentStatistics, StoreError>;

    fn actor_statistics(&self) -> Result<ActorStatistics, StoreError>;

    fn user_statistics(&self) -> Result<UserStatistics, StoreError>;
}
