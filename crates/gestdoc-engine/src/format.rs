//! Deterministic text rendering of retrieved data.
//!
//! The same text serves as a direct answer and as generation context, so
//! every function here is pure: same input, byte-identical output.

use chrono::NaiveDate;
use gestdoc_core::{
    ActorStatistics, ActorSummary, Breakdown, CaseStatistics, CaseSummary, DocumentStatistics,
    DocumentSummary, RetrievalBundle, StatisticsBundle, UserStatistics,
};

/// Characters kept from free-text fields before the ellipsis.
pub const SNIPPET_CHARS: usize = 100;

/// Breakdown rows shown per statistic.
pub const TOP_ENTRIES: usize = 3;

/// Case lists at least this long get a counted header.
const COUNTED_HEADER_FROM: usize = 5;

pub const NO_CASES: &str = "No se encontraron casos que coincidan con tu búsqueda.";
pub const NO_DOCUMENTS: &str = "No se encontraron documentos que coincidan con tu búsqueda.";
pub const NO_ACTORS: &str = "No se encontraron actores que coincidan con tu búsqueda.";
pub const NO_STATISTICS: &str = "No se encontraron estadísticas relevantes.";

// ── Primitives ──

/// Cut `text` to `max_chars` characters, appending "..." only if it was longer.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// `dd/mm/yyyy`, or `N/A` when absent.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn push_top(lines: &mut Vec<String>, heading: &str, breakdown: &Breakdown) {
    if breakdown.is_empty() {
        return;
    }
    lines.push(format!("• **{heading}:**"));
    for (label, count) in breakdown.iter().take(TOP_ENTRIES) {
        lines.push(format!("  - {label}: {count}"));
    }
}

fn finish(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

// ── Entity blocks ──

fn case_item(lines: &mut Vec<String>, case: &CaseSummary, indent: &str) {
    lines.push(format!("{indent}- Estado: {}", case.status));
    lines.push(format!("{indent}- Fecha: {}", format_date(case.start_date)));
    lines.push(format!("{indent}- Documentos: {}", case.document_count));
    if !case.description.is_empty() {
        lines.push(format!(
            "{indent}- Descripción: {}",
            truncate(&case.description, SNIPPET_CHARS)
        ));
    }
}

fn document_item(lines: &mut Vec<String>, doc: &DocumentSummary) {
    lines.push(format!("• **{}**", doc.name));
    lines.push(format!("  - Tipo: {}", doc.type_name));
    lines.push(format!("  - Fecha: {}", format_date(doc.date)));
    if let Some(number) = &doc.case_number {
        lines.push(format!("  - Caso: {number}"));
    }
    if !doc.keywords.is_empty() {
        lines.push(format!(
            "  - Palabras clave: {}",
            truncate(&doc.keywords, SNIPPET_CHARS)
        ));
    }
    lines.push(String::new());
}

pub fn format_cases(cases: &[CaseSummary]) -> String {
    if cases.is_empty() {
        return NO_CASES.to_string();
    }
    let mut lines = vec![if cases.len() >= COUNTED_HEADER_FROM {
        format!("📁 **Se encontraron {} casos:**\n", cases.len())
    } else {
        "📁 **Casos encontrados:**\n".to_string()
    }];
    for (i, case) in cases.iter().enumerate() {
        lines.push(format!("{}. **{}** - {}", i + 1, case.number, case.case_type));
        case_item(&mut lines, case, "   ");
        lines.push(String::new());
    }
    finish(lines)
}

pub fn format_documents(documents: &[DocumentSummary]) -> String {
    if documents.is_empty() {
        return NO_DOCUMENTS.to_string();
    }
    let mut lines = vec!["📄 **Documentos encontrados:**\n".to_string()];
    for doc in documents {
        document_item(&mut lines, doc);
    }
    finish(lines)
}

pub fn format_actors(actors: &[ActorSummary]) -> String {
    if actors.is_empty() {
        return NO_ACTORS.to_string();
    }
    let mut lines = vec!["👥 **Actores encontrados:**\n".to_string()];
    for actor in actors {
        lines.push(format!("• **{}**", actor.full_name));
        lines.push(format!("  - Tipo: {}", actor.role_label));
        lines.push(format!("  - CI: {}", actor.national_id));
        if let Some(profile) = &actor.profile {
            for (label, value) in profile.attributes() {
                if !value.is_empty() {
                    lines.push(format!("  - {label}: {value}"));
                }
            }
        }
        lines.push(String::new());
    }
    finish(lines)
}

// ── Statistics ──

fn case_statistics(lines: &mut Vec<String>, stats: &CaseStatistics) {
    lines.push("📊 **Estadísticas de Casos:**".to_string());
    lines.push(format!("• Total de casos: **{}**", stats.total));
    lines.push(format!("• Casos abiertos: **{}**", stats.open));
    lines.push(format!("• Casos cerrados: **{}**", stats.closed));
    push_top(lines, "Por tipo", &stats.by_type);
    push_top(lines, "Por estado", &stats.by_status);
}

fn document_statistics(lines: &mut Vec<String>, stats: &DocumentStatistics) {
    lines.push("\n📄 **Estadísticas de Documentos:**".to_string());
    lines.push(format!("• Total de documentos: **{}**", stats.total));
    lines.push(format!("• Con palabras clave: **{}**", stats.with_keywords));
    lines.push(format!("• Sin palabras clave: **{}**", stats.without_keywords));
    push_top(lines, "Por tipo", &stats.by_type);
}

fn actor_statistics(lines: &mut Vec<String>, stats: &ActorStatistics) {
    lines.push("\n👥 **Estadísticas de Actores:**".to_string());
    lines.push(format!("• Total de actores: **{}**", stats.total));
    lines.push(format!("• Abogados: **{}**", stats.lawyers));
    lines.push(format!("• Clientes: **{}**", stats.clients));
    lines.push(format!("• Asistentes: **{}**", stats.assistants));
    push_top(lines, "Especialidades de abogados", &stats.by_speciality);
    push_top(lines, "Tipos de cliente", &stats.by_client_kind);
}

fn user_statistics(lines: &mut Vec<String>, stats: &UserStatistics) {
    lines.push("\n👤 **Estadísticas de Usuarios:**".to_string());
    lines.push(format!("• Total de usuarios: **{}**", stats.total));
    lines.push(format!("• Activos: **{}**", stats.active));
    lines.push(format!("• Inactivos: **{}**", stats.inactive));
    push_top(lines, "Por rol", &stats.by_role);
}

/// Statistics answer for whichever groups were gathered.
pub fn format_statistics(stats: &StatisticsBundle) -> String {
    let mut lines = Vec::new();
    if let Some(cases) = &stats.cases {
        case_statistics(&mut lines, cases);
    }
    if let Some(documents) = &stats.documents {
        document_statistics(&mut lines, documents);
    }
    if let Some(actors) = &stats.actors {
        actor_statistics(&mut lines, actors);
    }
    if let Some(users) = &stats.users {
        user_statistics(&mut lines, users);
    }
    if lines.is_empty() {
        return NO_STATISTICS.to_string();
    }
    // The first block never starts with a blank line.
    if let Some(first) = lines.first_mut()
        && first.starts_with('\n')
    {
        first.remove(0);
    }
    lines.join("\n")
}

/// Render every group, in fixed order, with a "no results" sentence for
/// each empty one.
pub fn format(bundle: &RetrievalBundle) -> String {
    [
        format_cases(&bundle.cases),
        format_documents(&bundle.documents),
        format_actors(&bundle.actors),
        format_statistics(&bundle.statistics),
    ]
    .join("\n\n")
}

// ── Personal answers ──

pub fn personal_documents(documents: &[DocumentSummary], username: &str) -> String {
    if documents.is_empty() {
        return format!("📄 No se encontraron documentos creados por {username}.");
    }
    let mut lines = vec![format!("📄 **Documentos relacionados con {username}:**\n")];
    for doc in documents {
        document_item(&mut lines, doc);
    }
    finish(lines)
}

pub fn personal_cases(cases: &[CaseSummary], username: &str) -> String {
    if cases.is_empty() {
        return format!("📁 No se encontraron casos asignados a {username}.");
    }
    let mut lines = vec![format!("📁 **Casos relacionados con {username}:**\n")];
    for case in cases {
        lines.push(format!("• **{}** - {}", case.number, case.case_type));
        case_item(&mut lines, case, "  ");
        lines.push(String::new());
    }
    finish(lines)
}

pub fn personal_profile(actor: Option<&ActorSummary>, username: &str) -> String {
    let Some(actor) = actor else {
        return format!("👤 No se encontró información del actor asociado a {username}.");
    };
    let mut lines = vec![
        format!("👤 **Información de {username}:**\n"),
        format!("• **Nombre:** {}", actor.full_name),
        format!("• **CI:** {}", actor.national_id),
        format!("• **Tipo:** {}", actor.role_label),
    ];
    if !actor.phone.is_empty() {
        lines.push(format!("• **Teléfono:** {}", actor.phone));
    }
    if let Some(profile) = &actor.profile {
        lines.push("• **Información adicional:**".to_string());
        for (label, value) in profile.attributes() {
            if !value.is_empty() {
                lines.push(format!("  - {label}: {value}"));
            }
        }
    }
    lines.join("\n")
}

/// One-line-per-group overview for personal questions with no clear subject.
pub fn personal_summary(
    documents: &[DocumentSummary],
    cases: &[CaseSummary],
    actor: Option<&ActorSummary>,
    username: &str,
) -> String {
    let mut lines = Vec::new();
    if !documents.is_empty() {
        lines.push(format!(
            "📄 **Documentos de {username}:** {} encontrados",
            documents.len()
        ));
    }
    if !cases.is_empty() {
        lines.push(format!(
            "📁 **Casos de {username}:** {} encontrados",
            cases.len()
        ));
    }
    if let Some(actor) = actor {
        lines.push(format!("👤 **Información del actor:** {}", actor.full_name));
    }
    if lines.is_empty() {
        return format!("🔍 No se encontró información personal para {username}.");
    }
    lines.join("\n")
}
