//! Retrieval router: picks lookups by intent category and runs them.
//!
//! Every sub-lookup is independent. A failing one is logged and contributes
//! nothing; the others still run.

use gestdoc_ai::intent::case_number;
use gestdoc_ai::keywords::{self, contains_any};
use gestdoc_core::{
    ActorRole, ActorSummary, CaseStatus, CaseSummary, DocumentSummary, IntentCategory, Query,
    RetrievalBundle, StatisticsBundle, UserRef,
};
use gestdoc_store::{CaseHit, DocumentHit, DomainSource, StoreError};
use tracing::{debug, info, warn};

use crate::format;
use crate::settings::EngineSettings;

// ── Relevance scores ──

const BY_NUMBER: f32 = 1.0;
const BY_FILTER: f32 = 0.8;
const BY_NAME: f32 = 0.9;
const BY_TYPE_MENTION: f32 = 0.7;
const RECENT: f32 = 0.5;
const PERSONAL: f32 = 0.9;
const OWN_PROFILE: f32 = 1.0;

/// What a personal question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalFocus {
    Documents,
    Cases,
    Profile,
    Overview,
}

impl PersonalFocus {
    pub fn of(normalized: &str) -> Self {
        if contains_any(normalized, keywords::PERSONAL_DOCUMENTS) {
            Self::Documents
        } else if contains_any(normalized, keywords::PERSONAL_CASES) {
            Self::Cases
        } else if contains_any(normalized, keywords::PERSONAL_PROFILE) {
            Self::Profile
        } else {
            Self::Overview
        }
    }
}

/// Swallow a lookup failure into its empty value.
fn soft<T: Default>(lookup: &'static str, result: Result<T, StoreError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(lookup, error = %e, "lookup failed, treating as no results");
        T::default()
    })
}

fn case_summaries(hits: Vec<CaseHit>, relevance: f32) -> Vec<CaseSummary> {
    hits.iter()
        .map(|h| CaseSummary::from_case(&h.case, h.document_count, relevance))
        .collect()
}

fn document_summaries(hits: Vec<DocumentHit>, relevance: f32) -> Vec<DocumentSummary> {
    hits.into_iter()
        .map(|h| DocumentSummary {
            id: h.document.id,
            name: h.document.name,
            type_name: h.type_name,
            date: h.document.date,
            case_number: h.case_number,
            keywords: h.document.keywords,
            relevance: relevance.clamp(0.0, 1.0),
        })
        .collect()
}

pub struct RetrievalRouter<'a> {
    source: &'a dyn DomainSource,
    settings: &'a EngineSettings,
}

impl<'a> RetrievalRouter<'a> {
    pub fn new(source: &'a dyn DomainSource, settings: &'a EngineSettings) -> Self {
        Self { source, settings }
    }

    /// Gather the data slice for a classified question. Never fails.
    pub fn retrieve(&self, query: &Query, user: &UserRef) -> RetrievalBundle {
        let text = query.normalized.as_str();
        let bundle = match query.category {
            IntentCategory::Personal => self.personal(text, user),
            IntentCategory::Statistical => self.statistical(text),
            IntentCategory::Specific => self.specific(text),
            IntentCategory::General => self.general(text),
        };
        debug!(
            category = query.category.as_str(),
            cases = bundle.cases.len(),
            documents = bundle.documents.len(),
            actors = bundle.actors.len(),
            direct = bundle.direct_answer.is_some(),
            "retrieval complete"
        );
        bundle
    }

    // ── Personal ──

    fn personal(&self, text: &str, user: &UserRef) -> RetrievalBundle {
        let focus = PersonalFocus::of(text);
        let actor = soft("linked_actor", self.source.linked_actor(user.id));
        let mut bundle = RetrievalBundle::default();

        match actor {
            Some(actor) => {
                let limit = self.settings.personal_limit;
                let own = ActorSummary::from_actor(&actor, OWN_PROFILE);
                if matches!(focus, PersonalFocus::Documents | PersonalFocus::Overview) {
                    bundle.documents = document_summaries(
                        soft(
                            "documents_for_actor",
                            self.source.documents_for_actor(actor.id, limit),
                        ),
                        PERSONAL,
                    );
                }
                if matches!(focus, PersonalFocus::Cases | PersonalFocus::Overview) {
                    bundle.cases = case_summaries(
                        soft(
                            "cases_for_actor",
                            self.source.cases_for_actor(actor.id, limit),
                        ),
                        PERSONAL,
                    );
                }
                if matches!(focus, PersonalFocus::Profile | PersonalFocus::Overview) {
                    bundle.actors = vec![own];
                }
            }
            None => {
                let limit = self.settings.fallback_limit;
                if matches!(focus, PersonalFocus::Documents | PersonalFocus::Overview) {
                    bundle.documents = document_summaries(
                        soft("recent_documents", self.source.recent_documents(limit)),
                        RECENT,
                    );
                }
                if matches!(focus, PersonalFocus::Cases | PersonalFocus::Overview) {
                    bundle.cases = case_summaries(
                        soft("recent_cases", self.source.recent_cases(limit)),
                        RECENT,
                    );
                }
                if focus != PersonalFocus::Profile {
                    bundle.personal_fallback = true;
                    info!(
                        user = %user.username,
                        fallback = true,
                        "no linked actor, answering personal question with recent records"
                    );
                }
            }
        }

        let username = user.username.as_str();
        let answer = match focus {
            PersonalFocus::Documents => format::personal_documents(&bundle.documents, username),
            PersonalFocus::Cases => format::personal_cases(&bundle.cases, username),
            PersonalFocus::Profile => format::personal_profile(bundle.actors.first(), username),
            PersonalFocus::Overview => format::personal_summary(
                &bundle.documents,
                &bundle.cases,
                bundle.actors.first(),
                username,
            ),
        };
        bundle.direct_answer = Some(answer);
        bundle
    }

    // ── Statistical ──

    fn statistical(&self, text: &str) -> RetrievalBundle {
        let source = self.source;
        let mut statistics = StatisticsBundle::default();
        if contains_any(text, keywords::CASE_GROUP) {
            statistics.cases = soft("case_statistics", source.case_statistics().map(Some));
        }
        if contains_any(text, keywords::DOCUMENT_GROUP) {
            statistics.documents =
                soft("document_statistics", source.document_statistics().map(Some));
        }
        if contains_any(text, keywords::ACTOR_GROUP) {
            statistics.actors = soft("actor_statistics", source.actor_statistics().map(Some));
        }
        if contains_any(text, keywords::USER_GROUP) {
            statistics.users = soft("user_statistics", source.user_statistics().map(Some));
        }
        let answer = format::format_statistics(&statistics);
        RetrievalBundle {
            statistics,
            direct_answer: Some(answer),
            ..Default::default()
        }
    }

    // ── Specific / general ──

    fn specific(&self, text: &str) -> RetrievalBundle {
        let mut bundle = RetrievalBundle::default();
        if contains_any(text, keywords::CASE_GROUP) || case_number(text).is_some() {
            bundle.cases = self.case_lookup(text);
        }
        if contains_any(text, keywords::DOCUMENT_GROUP) {
            bundle.documents = self.document_lookup(text);
        }
        if contains_any(text, keywords::ACTOR_GROUP) {
            bundle.actors = self.actor_lookup(text);
        }
        bundle
    }

    fn general(&self, text: &str) -> RetrievalBundle {
        RetrievalBundle {
            cases: self.case_lookup(text),
            documents: self.document_lookup(text),
            actors: self.actor_lookup(text),
            ..Default::default()
        }
    }

    /// Number, then status, then case type, then most recent.
    fn case_lookup(&self, text: &str) -> Vec<CaseSummary> {
        let limit = self.settings.case_limit;
        let source = self.source;
        if let Some(number) = case_number(text) {
            return case_summaries(
                soft("cases_by_number", source.cases_by_number(number, limit)),
                BY_NUMBER,
            );
        }
        let status = if contains_any(text, keywords::OPEN_STATUS) {
            Some(CaseStatus::Open)
        } else if contains_any(text, keywords::CLOSED_STATUS) {
            Some(CaseStatus::Closed)
        } else {
            None
        };
        if let Some(status) = status {
            return case_summaries(
                soft("cases_by_status", source.cases_by_status(&status, limit)),
                BY_FILTER,
            );
        }
        if let Some(case_type) = keywords::case_type_for(text) {
            return case_summaries(
                soft("cases_by_type", source.cases_by_type(case_type, limit)),
                BY_FILTER,
            );
        }
        case_summaries(soft("recent_cases", source.recent_cases(limit)), RECENT)
    }

    /// Whole question against name/keywords, then document types it mentions.
    fn document_lookup(&self, text: &str) -> Vec<DocumentSummary> {
        let limit = self.settings.document_limit;
        let matched = document_summaries(
            soft("documents_matching", self.source.documents_matching(text, limit)),
            BY_NAME,
        );
        if !matched.is_empty() {
            return matched;
        }
        document_summaries(
            soft(
                "documents_by_type_mention",
                self.source.documents_by_type_mention(text, limit),
            ),
            BY_TYPE_MENTION,
        )
    }

    /// Whole question against names/national id, then by mentioned role.
    fn actor_lookup(&self, text: &str) -> Vec<ActorSummary> {
        let limit = self.settings.actor_limit;
        let matched = soft("actors_matching", self.source.actors_matching(text, limit));
        if !matched.is_empty() {
            return matched
                .iter()
                .map(|a| ActorSummary::from_actor(a, BY_NAME))
                .collect();
        }
        let role = if contains_any(text, keywords::LAWYER_ROLE) {
            ActorRole::Lawyer
        } else if contains_any(text, keywords::CLIENT_ROLE) {
            ActorRole::Client
        } else if contains_any(text, keywords::ASSISTANT_ROLE) {
            ActorRole::Assistant
        } else {
            return Vec::new();
        };
        soft("actors_by_role", self.source.actors_by_role(role, limit))
            .iter()
            .map(|a| ActorSummary::from_actor(a, BY_FILTER))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use gestdoc_ai::analyze;

    use super::*;
    use crate::testing::{FlakySource, seeded_store, user};

    fn run(source: &dyn DomainSource, text: &str, user: &UserRef) -> RetrievalBundle {
        let settings = EngineSettings::default();
        RetrievalRouter::new(source, &settings).retrieve(&analyze(text), user)
    }

    fn admin() -> UserRef {
        UserRef {
            id: 1,
            username: "admin".into(),
        }
    }

    #[test]
    fn case_number_returns_exactly_that_case() {
        let store = seeded_store();
        let bundle = run(&store, "CIV-2024-001", &admin());
        assert_eq!(bundle.cases.len(), 1);
        assert_eq!(bundle.cases[0].number, "CIV-2024-001");
        assert_eq!(bundle.cases[0].document_count, 3);
        assert_eq!(bundle.cases[0].relevance, 1.0);
        assert!(bundle.direct_answer.is_none());
    }

    #[test]
    fn case_number_fragment_filters_by_substring() {
        let store = seeded_store();
        let bundle = run(&store, "ver caso civ-2024-00", &admin());
        assert_eq!(bundle.cases.len(), 2);
        assert!(
            bundle
                .cases
                .iter()
                .all(|c| c.number.to_lowercase().contains("civ-2024-00"))
        );
    }

    #[test]
    fn case_number_beats_status_keyword() {
        let store = seeded_store();
        let bundle = run(&store, "¿El caso civ-2024-005 está abierto?", &admin());
        let found: Vec<(&str, &str)> = bundle
            .cases
            .iter()
            .map(|c| (c.number.as_str(), c.status.as_str()))
            .collect();
        assert_eq!(found, [("CIV-2024-005", "CERRADO")]);
        assert_eq!(bundle.cases[0].relevance, 1.0);
    }

    #[test]
    fn status_beats_case_type() {
        let store = seeded_store();
        let bundle = run(&store, "¿Qué casos de divorcio están cerrados?", &admin());
        assert_eq!(bundle.cases.len(), 2);
        assert!(bundle.cases.iter().all(|c| c.status == "CERRADO"));
    }

    #[test]
    fn case_type_mapping() {
        let store = seeded_store();
        let bundle = run(&store, "¿Qué casos de despido hay?", &admin());
        assert_eq!(bundle.cases.len(), 1);
        assert_eq!(bundle.cases[0].case_type, "Despido Injustificado");
    }

    #[test]
    fn unfiltered_case_question_gets_recent_cases() {
        let store = seeded_store();
        let bundle = run(&store, "¿Qué caso es el más nuevo?", &admin());
        assert_eq!(bundle.cases.len(), 7);
        assert_eq!(bundle.cases[0].number, "FAM-2024-006");
        assert_eq!(bundle.cases[0].relevance, 0.5);
    }

    #[test]
    fn document_type_mention_fallback() {
        let store = seeded_store();
        let bundle = run(&store, "¿qué documento de contrato existe?", &admin());
        let names: Vec<&str> = bundle.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Contrato de Construcción"]);
        assert_eq!(bundle.documents[0].relevance, 0.7);
    }

    #[test]
    fn statistics_are_a_direct_answer() {
        let store = seeded_store();
        let bundle = run(&store, "¿Cuántos casos hay?", &admin());
        let answer = bundle.direct_answer.unwrap();
        assert!(answer.contains("• Total de casos: **7**"));
        assert!(bundle.statistics.cases.is_some());
        assert!(bundle.statistics.documents.is_none());
    }

    #[test]
    fn statistics_combine_groups() {
        let store = seeded_store();
        let bundle = run(&store, "Total de documentos y usuarios", &admin());
        assert!(bundle.statistics.documents.is_some());
        assert!(bundle.statistics.users.is_some());
        assert!(bundle.statistics.cases.is_none());
    }

    #[test]
    fn unlinked_user_falls_back_to_recent_documents() {
        let store = seeded_store();
        let guest = user(&store, "invitado");
        let bundle = run(&store, "mis documentos", &guest);
        assert!(bundle.personal_fallback);
        assert_eq!(bundle.documents.len(), 5);
        assert_eq!(bundle.documents[0].name, "Resolución - Pensión");
        assert!(
            bundle
                .direct_answer
                .unwrap()
                .starts_with("📄 **Documentos relacionados con invitado:**")
        );
    }

    #[test]
    fn linked_lawyer_sees_only_own_cases() {
        let store = seeded_store();
        let lawyer = user(&store, "cmendoza");
        let bundle = run(&store, "mis casos", &lawyer);
        assert!(!bundle.personal_fallback);
        let mut numbers: Vec<&str> = bundle.cases.iter().map(|c| c.number.as_str()).collect();
        numbers.sort();
        assert_eq!(
            numbers,
            ["CIV-2024-001", "CIV-2024-005", "FAM-2024-006", "PEN-2024-002"]
        );
        let answer = bundle.direct_answer.unwrap();
        assert!(answer.contains("CIV-2024-001"));
        assert!(!answer.contains("LAB-2024-003"));
    }

    #[test]
    fn linked_lawyer_sees_documents_of_own_cases() {
        let store = seeded_store();
        let lawyer = user(&store, "cmendoza");
        let bundle = run(&store, "mis documentos", &lawyer);
        assert!(!bundle.personal_fallback);
        assert_eq!(bundle.documents.len(), 6);
        let own = ["CIV-2024-001", "CIV-2024-005", "FAM-2024-006", "PEN-2024-002"];
        for doc in &bundle.documents {
            let number = doc.case_number.as_deref().unwrap();
            assert!(own.contains(&number), "{number}");
        }
        assert!(
            bundle
                .direct_answer
                .unwrap()
                .starts_with("📄 **Documentos relacionados con cmendoza:**")
        );
    }

    #[test]
    fn linked_client_profile() {
        let store = seeded_store();
        let client = user(&store, "lquispe");
        let bundle = run(&store, "mi perfil", &client);
        let answer = bundle.direct_answer.unwrap();
        assert!(answer.starts_with("👤 **Información de lquispe:**"));
        assert!(answer.contains("• **Nombre:** Luis Quispe Mamani"));
        assert!(answer.contains("  - Tipo cliente: NATURAL"));
    }

    #[test]
    fn personal_overview_counts_groups() {
        let store = seeded_store();
        let lawyer = user(&store, "cmendoza");
        let bundle = run(&store, "¿Qué tengo pendiente?", &lawyer);
        let answer = bundle.direct_answer.unwrap();
        assert!(answer.contains("📁 **Casos de cmendoza:** 4 encontrados"));
        assert!(answer.contains("👤 **Información del actor:** Carlos Mendoza Rojas"));
    }

    #[test]
    fn failing_source_yields_empty_results() {
        let source = FlakySource::broken();
        let bundle = run(&source, "hola", &admin());
        assert!(bundle.is_empty());

        let stats = run(&source, "¿Cuántos casos hay?", &admin());
        assert_eq!(
            stats.direct_answer.as_deref(),
            Some("No se encontraron estadísticas relevantes.")
        );
    }

    #[test]
    fn one_failing_lookup_does_not_abort_the_rest() {
        let source = FlakySource::new(&["cases_by_status"]);
        let bundle = run(&source, "¿qué casos cerrados tiene algún abogado?", &admin());
        assert!(bundle.cases.is_empty());
        assert_eq!(bundle.actors.len(), 3);
        assert!(bundle.actors.iter().all(|a| a.role_label == "Abogado"));
    }

    #[test]
    fn general_question_looks_up_every_group() {
        let source = FlakySource::healthy();
        let bundle = run(&source, "Mendoza", &admin());
        assert_eq!(bundle.cases.len(), 7);
        assert!(bundle.cases.iter().all(|c| c.relevance == 0.5));
        let names: Vec<&str> = bundle.actors.iter().map(|a| a.full_name.as_str()).collect();
        assert_eq!(names, ["Carlos Mendoza Rojas"]);
        assert!(bundle.direct_answer.is_none());
        let calls = source.calls();
        for lookup in [
            "recent_cases",
            "documents_matching",
            "documents_by_type_mention",
            "actors_matching",
        ] {
            assert!(calls.contains(&lookup), "{lookup} not called");
        }
    }

    #[test]
    fn personal_focus_order() {
        assert_eq!(PersonalFocus::of("mis documentos de casos"), PersonalFocus::Documents);
        assert_eq!(PersonalFocus::of("casos asignados"), PersonalFocus::Cases);
        assert_eq!(PersonalFocus::of("mis datos"), PersonalFocus::Profile);
        assert_eq!(PersonalFocus::of("mis pendientes"), PersonalFocus::Overview);
    }
}
