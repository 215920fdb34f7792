//! Test doubles shared by the engine's unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use gestdoc_ai::{Completion, CompletionProvider, CompletionRequest, ProviderError};
use gestdoc_core::{
    Actor, ActorRole, ActorStatistics, CaseStatistics, CaseStatus, DocumentStatistics, User,
    UserRef, UserStatistics,
};
use gestdoc_store::{CaseHit, DocumentHit, DomainSource, DuckStore, StoreError, seed_demo};

pub fn seeded_store() -> DuckStore {
    let store = DuckStore::open().unwrap();
    store.init_schema().unwrap();
    seed_demo(&store).unwrap();
    store
}

pub fn user(store: &DuckStore, username: &str) -> UserRef {
    let user = store.user_by_username(username).unwrap().unwrap();
    UserRef::from(&user)
}

/// Wraps the demo store, fails the named lookups, and records every call.
pub struct FlakySource {
    pub inner: DuckStore,
    pub failing: Vec<&'static str>,
    calls: Mutex<Vec<&'static str>>,
}

impl FlakySource {
    pub fn new(failing: &[&'static str]) -> Self {
        Self {
            inner: seeded_store(),
            failing: failing.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Over the demo store, nothing fails.
    pub fn healthy() -> Self {
        Self::new(&[])
    }

    /// Lookup names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Every lookup fails.
    pub fn broken() -> Self {
        Self::new(&["*"])
    }

    fn check(&self, lookup: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(lookup);
        if self.failing.iter().any(|f| *f == "*" || *f == lookup) {
            Err(StoreError::Other(format!("{lookup} unavailable")))
        } else {
            Ok(())
        }
    }
}

impl DomainSource for FlakySource {
    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check("user_by_username")?;
        self.inner.user_by_username(username)
    }

    fn linked_actor(&self, user_id: i64) -> Result<Option<Actor>, StoreError> {
        self.check("linked_actor")?;
        self.inner.linked_actor(user_id)
    }

    fn cases_by_number(&self, fragment: &str, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.check("cases_by_number")?;
        self.inner.cases_by_number(fragment, limit)
    }

    fn cases_by_status(
        &self,
        status: &CaseStatus,
        limit: usize,
    ) -> Result<Vec<CaseHit>, StoreError> {
        self.check("cases_by_status")?;
        self.inner.cases_by_status(status, limit)
    }

    fn cases_by_type(&self, type_name: &str, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.check("cases_by_type")?;
        self.inner.cases_by_type(type_name, limit)
    }

    fn recent_cases(&self, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.check("recent_cases")?;
        self.inner.recent_cases(limit)
    }

    fn cases_for_actor(&self, actor_id: i64, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.check("cases_for_actor")?;
        self.inner.cases_for_actor(actor_id, limit)
    }

    fn documents_matching(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        self.check("documents_matching")?;
        self.inner.documents_matching(text, limit)
    }

    fn documents_by_type_mention(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        self.check("documents_by_type_mention")?;
        self.inner.documents_by_type_mention(text, limit)
    }

    fn recent_documents(&self, limit: usize) -> Result<Vec<DocumentHit>, StoreError> {
        self.check("recent_documents")?;
        self.inner.recent_documents(limit)
    }

    fn documents_for_actor(
        &self,
        actor_id: i64,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        self.check("documents_for_actor")?;
        self.inner.documents_for_actor(actor_id, limit)
    }

    fn actors_matching(&self, text: &str, limit: usize) -> Result<Vec<Actor>, StoreError> {
        self.check("actors_matching")?;
        self.inner.actors_matching(text, limit)
    }

    fn actors_by_role(&self, role: ActorRole, limit: usize) -> Result<Vec<Actor>, StoreError> {
        self.check("actors_by_role")?;
        self.inner.actors_by_role(role, limit)
    }

    fn case_statistics(&self) -> Result<CaseStatistics, StoreError> {
        self.check("case_statistics")?;
        self.inner.case_statistics()
    }

    fn document_statistics(&self) -> Result<DocumentStatistics, StoreError> {
        self.check("document_statistics")?;
        self.inner.document_statistics()
    }

    fn actor_statistics(&self) -> Result<ActorStatistics, StoreError> {
        self.check("actor_statistics")?;
        self.inner.actor_statistics()
    }

    fn user_statistics(&self) -> Result<UserStatistics, StoreError> {
        self.check("user_statistics")?;
        self.inner.user_statistics()
    }
}

/// Completion provider with a canned reply that records every request.
pub struct ScriptedProvider {
    reply: Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(body: &str) -> Self {
        Self {
            reply: Err(body.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                tokens_used: Some(128),
            }),
            Err(body) => Err(ProviderError::Server {
                status: 429,
                body: body.clone(),
            }),
        }
    }
}

/// Shares one scripted provider between the gateway and the test body.
pub struct SharedProvider(pub std::sync::Arc<ScriptedProvider>);

#[async_trait]
impl CompletionProvider for SharedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.0.complete(request).await
    }
}
