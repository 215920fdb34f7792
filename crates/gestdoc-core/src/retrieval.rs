//! Query and retrieval types shared by the classifier, router, and formatter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Actor, ActorProfile, Case};

/// Intent category of a free-text question.
///
/// Declaration order is precedence order: the classifier returns the first
/// category whose markers appear in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentCategory {
    Personal,
    Statistical,
    Specific,
    General,
}

impl IntentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Statistical => "statistical",
            Self::Specific => "specific",
            Self::General => "general",
        }
    }
}

/// A classified user question. Lives for one request only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    /// Lower-cased copy used for all keyword matching.
    pub normalized: String,
    pub category: IntentCategory,
    pub entities: Vec<String>,
    pub received_at: DateTime<Utc>,
}

// ── Summaries ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: i64,
    pub number: String,
    pub case_type: String,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub description: String,
    pub document_count: u64,
    pub relevance: f32,
}

impl CaseSummary {
    pub fn from_case(case: &Case, document_count: u64, relevance: f32) -> Self {
        Self {
            id: case.id,
            number: case.number.clone(),
            case_type: case.case_type.clone(),
            status: case.status.as_str().to_string(),
            start_date: case.start_date,
            description: case.description.clone(),
            document_count,
            relevance: relevance.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub name: String,
    pub type_name: String,
    pub date: Option<NaiveDate>,
    /// Number of the owning case, when the folder chain resolves.
    pub case_number: Option<String>,
    pub keywords: String,
    pub relevance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub id: i64,
    pub full_name: String,
    pub role_label: String,
    pub national_id: String,
    pub phone: String,
    pub profile: Option<ActorProfile>,
    pub relevance: f32,
}

impl ActorSummary {
    pub fn from_actor(actor: &Actor, relevance: f32) -> Self {
        Self {
            id: actor.id,
            full_name: actor.full_name(),
            role_label: actor.role.label().to_string(),
            national_id: actor.national_id.clone(),
            phone: actor.phone.clone(),
            profile: actor.profile.clone(),
            relevance: relevance.clamp(0.0, 1.0),
        }
    }
}

// ── Statistics ──

/// A `(label, count)` group-by row, ordered by count descending.
pub type Breakdown = Vec<(String, u64)>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseStatistics {
    pub total: u64,
    pub open: u64,
    pub closed: u64,
    pub by_type: Breakdown,
    pub by_status: Breakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub total: u64,
    pub with_keywords: u64,
    pub without_keywords: u64,
    pub by_type: Breakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorStatistics {
    pub total: u64,
    pub lawyers: u64,
    pub clients: u64,
    pub assistants: u64,
    pub by_speciality: Breakdown,
    pub by_client_kind: Breakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub by_role: Breakdown,
}

/// Aggregates for whichever entity groups the question mentioned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub cases: Option<CaseStatistics>,
    pub documents: Option<DocumentStatistics>,
    pub actors: Option<ActorStatistics>,
    pub users: Option<UserStatistics>,
}

impl StatisticsBundle {
    pub fn is_empty(&self) -> bool {
        self.cases.is_none()
            && self.documents.is_none()
            && self.actors.is_none()
            && self.users.is_none()
    }
}

/// One retrieved item, traceable to exactly one entity row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetrievalResult {
    Case(CaseSummary),
    Document(DocumentSummary),
    Actor(ActorSummary),
    Statistics(StatisticsBundle),
}

/// Everything the router gathered for one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalBundle {
    pub cases: Vec<CaseSummary>,
    pub documents: Vec<DocumentSummary>,
    pub actors: Vec<ActorSummary>,
    pub statistics: StatisticsBundle,
    /// Structured answer that bypasses text generation.
    pub direct_answer: Option<String>,
    /// Set when a personal query had no linked actor and fell back to
    /// system-wide recent records.
    pub personal_fallback: bool,
}

impl RetrievalBundle {
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
            && self.documents.is_empty()
            && self.actors.is_empty()
            && self.statistics.is_empty()
    }

    /// Ids of every document that contributed to the answer, in order.
    pub fn document_ids(&self) -> Vec<i64> {
        self.documents.iter().map(|d| d.id).collect()
    }

    /// Flatten into tagged results (cases, documents, actors, statistics).
    pub fn results(&self) -> Vec<RetrievalResult> {
        let mut out: Vec<RetrievalResult> = Vec::new();
        out.extend(self.cases.iter().cloned().map(RetrievalResult::Case));
        out.extend(self.documents.iter().cloned().map(RetrievalResult::Document));
        out.extend(self.actors.iter().cloned().map(RetrievalResult::Actor));
        if !self.statistics.is_empty() {
            out.push(RetrievalResult::Statistics(self.statistics.clone()));
        }
        out
    }
}
