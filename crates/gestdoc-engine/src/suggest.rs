//! Example questions built from live data.

use gestdoc_core::{ActorProfile, ActorRole, UserRef};
use gestdoc_store::{DomainSource, StoreError};
use tracing::warn;

pub const SMART_LIMIT: usize = 8;
pub const CONTEXTUAL_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub category: &'static str,
    pub icon: &'static str,
}

impl Suggestion {
    fn new(text: impl Into<String>, category: &'static str, icon: &'static str) -> Self {
        Self {
            text: text.into(),
            category,
            icon,
        }
    }
}

fn ok_or_skip<T>(lookup: &'static str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(lookup, error = %e, "suggestion data unavailable");
            None
        }
    }
}

fn case_suggestions(source: &dyn DomainSource, out: &mut Vec<Suggestion>) {
    let Some(stats) = ok_or_skip("case_statistics", source.case_statistics()) else {
        return;
    };
    if stats.total == 0 {
        return;
    }
    out.push(Suggestion::new(
        format!("¿Cuántos casos hay en total? (Actualmente hay {})", stats.total),
        "casos",
        "📊",
    ));
    if stats.open > 0 {
        out.push(Suggestion::new(
            format!("¿Cuántos casos están abiertos? (Actualmente {})", stats.open),
            "casos",
            "⚖️",
        ));
    }
    if let Some((case_type, _)) = stats.by_type.first() {
        out.push(Suggestion::new(
            format!("¿Cuántos casos de '{case_type}' hay?"),
            "casos",
            "🔍",
        ));
    }
    if let Some(recent) = ok_or_skip("recent_cases", source.recent_cases(1))
        .and_then(|hits| hits.into_iter().next())
    {
        out.push(Suggestion::new(
            format!("¿Qué documentos tiene el caso {}?", recent.case.number),
            "casos",
            "📁",
        ));
    }
}

fn document_suggestions(source: &dyn DomainSource, out: &mut Vec<Suggestion>) {
    let Some(stats) = ok_or_skip("document_statistics", source.document_statistics()) else {
        return;
    };
    if stats.total == 0 {
        return;
    }
    out.push(Suggestion::new(
        format!("¿Cuántos documentos hay en total? (Actualmente {})", stats.total),
        "documentos",
        "📄",
    ));
    if let Some((type_name, _)) = stats.by_type.first() {
        out.push(Suggestion::new(
            format!("¿Cuántos documentos de tipo '{type_name}' hay?"),
            "documentos",
            "🔍",
        ));
    }
    if let Some(recent) = ok_or_skip("recent_documents", source.recent_documents(1))
        .and_then(|hits| hits.into_iter().next())
    {
        out.push(Suggestion::new(
            format!("¿En qué caso está el documento '{}'?", recent.document.name),
            "documentos",
            "🔗",
        ));
    }
}

fn actor_suggestions(source: &dyn DomainSource, out: &mut Vec<Suggestion>) {
    let Some(stats) = ok_or_skip("actor_statistics", source.actor_statistics()) else {
        return;
    };
    if stats.total == 0 {
        return;
    }
    out.push(Suggestion::new(
        format!("¿Cuántos actores hay en total? (Actualmente {})", stats.total),
        "actores",
        "👥",
    ));
    let lawyer = ok_or_skip("actors_by_role", source.actors_by_role(ActorRole::Lawyer, 10))
        .and_then(|actors| {
            actors
                .into_iter()
                .find(|a| matches!(a.profile, Some(ActorProfile::Lawyer { .. })))
        });
    if let Some(lawyer) = lawyer {
        out.push(Suggestion::new(
            format!(
                "¿Cuál es la especialidad del abogado {} {}?",
                lawyer.given_names, lawyer.paternal_surname
            ),
            "actores",
            "⚖️",
        ));
    }
    if let Some((speciality, _)) = stats.by_speciality.first() {
        out.push(Suggestion::new(
            format!("¿Qué abogados tienen especialidad en '{speciality}'?"),
            "actores",
            "🔍",
        ));
    }
    let client = ok_or_skip("actors_by_role", source.actors_by_role(ActorRole::Client, 1))
        .and_then(|actors| actors.into_iter().next());
    if let Some(client) = client {
        out.push(Suggestion::new(
            format!(
                "¿Qué tipo de cliente es {} {}?",
                client.given_names, client.paternal_surname
            ),
            "actores",
            "👤",
        ));
    }
}

fn general_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("¿Cuál es el caso con más documentos?", "analisis", "📈"),
        Suggestion::new("¿Qué abogados están activos en el sistema?", "actores", "✅"),
        Suggestion::new("¿Cuántos expedientes hay abiertos?", "casos", "📂"),
        Suggestion::new("¿Qué tipos de documentos existen en el sistema?", "documentos", "📋"),
    ]
}

/// Data-driven suggestions followed by fixed ones, capped at `limit`.
pub fn smart_suggestions(source: &dyn DomainSource, limit: usize) -> Vec<Suggestion> {
    let mut out = Vec::new();
    case_suggestions(source, &mut out);
    document_suggestions(source, &mut out);
    actor_suggestions(source, &mut out);
    out.extend(general_suggestions());
    out.truncate(limit);
    out
}

/// Personal suggestions for lawyers and clients, then the smart ones.
pub fn contextual_suggestions(
    source: &dyn DomainSource,
    user: &UserRef,
    limit: usize,
) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let actor = ok_or_skip("linked_actor", source.linked_actor(user.id)).flatten();
    match actor.map(|a| a.role) {
        Some(ActorRole::Lawyer) => {
            out.push(Suggestion::new("¿Cuáles son mis casos asignados?", "personal", "👨‍💼"));
            out.push(Suggestion::new(
                "¿Qué documentos he creado recientemente?",
                "personal",
                "📝",
            ));
        }
        Some(ActorRole::Client) => {
            out.push(Suggestion::new("¿Cuáles son mis casos?", "personal", "👤"));
            out.push(Suggestion::new(
                "¿Qué documentos están relacionados conmigo?",
                "personal",
                "📄",
            ));
        }
        Some(ActorRole::Assistant) | None => {}
    }
    out.extend(smart_suggestions(source, SMART_LIMIT));
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakySource, seeded_store, user};

    #[test]
    fn smart_suggestions_use_live_counts() {
        let store = seeded_store();
        let suggestions = smart_suggestions(&store, SMART_LIMIT);
        assert_eq!(suggestions.len(), 8);
        assert_eq!(
            suggestions[0].text,
            "¿Cuántos casos hay en total? (Actualmente hay 7)"
        );
        assert!(
            suggestions
                .iter()
                .any(|s| s.text == "¿Qué documentos tiene el caso FAM-2024-006?")
        );
    }

    #[test]
    fn suggestions_are_deterministic() {
        let store = seeded_store();
        assert_eq!(
            smart_suggestions(&store, SMART_LIMIT),
            smart_suggestions(&store, SMART_LIMIT)
        );
    }

    #[test]
    fn lawyer_gets_personal_suggestions_first() {
        let store = seeded_store();
        let lawyer = user(&store, "cmendoza");
        let suggestions = contextual_suggestions(&store, &lawyer, CONTEXTUAL_LIMIT);
        assert_eq!(suggestions.len(), 6);
        assert_eq!(suggestions[0].category, "personal");
        assert_eq!(suggestions[1].category, "personal");
    }

    #[test]
    fn unlinked_user_gets_only_general() {
        let store = seeded_store();
        let guest = user(&store, "invitado");
        let suggestions = contextual_suggestions(&store, &guest, CONTEXTUAL_LIMIT);
        assert!(suggestions.iter().all(|s| s.category != "personal"));
    }

    #[test]
    fn broken_source_still_suggests_fixed_questions() {
        let source = FlakySource::broken();
        let suggestions = smart_suggestions(&source, SMART_LIMIT);
        assert_eq!(suggestions, general_suggestions());
    }
}
