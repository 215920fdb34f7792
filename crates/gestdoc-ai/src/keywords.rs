//! Keyword lists driving intent classification and retrieval routing.
//!
//! The lists are data, not logic: they are matched as lower-case substrings
//! of the lower-cased question and must stay byte-for-byte stable so that
//! questions keep routing the same way across releases. Bump
//! [`KEYWORDS_VERSION`] whenever an entry changes.

/// Revision of every list in this module.
pub const KEYWORDS_VERSION: u32 = 1;

// ── Intent markers ──

/// First-person markers. Any hit makes the question personal.
pub const PERSONAL: &[&str] = &[
    "mis",
    "mi",
    "he creado",
    "he hecho",
    "he enviado",
    "he recibido",
    "me han asignado",
    "me han dado",
    "tengo",
    "soy",
    "estoy",
    "mi caso",
    "mis casos",
    "mi documento",
    "mis documentos",
    "mi cliente",
    "mis clientes",
    "mi abogado",
    "mis abogados",
    "asignado a mí",
    "relacionado conmigo",
    "que me pertenece",
];

/// Quantity and listing markers.
pub const STATISTICAL: &[&str] = &[
    "cuántos",
    "cuanto",
    "cantidad",
    "total",
    "número",
    "numero",
    "cuántas",
    "cuanta",
    "estadística",
    "estadistica",
    "resumen",
    "listar",
    "mostrar todos",
    "todos los",
    "todos las",
];

/// Interrogatives and attribute names.
pub const SPECIFIC: &[&str] = &[
    "cuál",
    "cual",
    "qué",
    "que",
    "dónde",
    "donde",
    "cuando",
    "especialidad",
    "tipo",
    "estado",
    "fecha",
    "nombre",
];

// ── Entity-group triggers ──

pub const CASE_GROUP: &[&str] = &["caso", "casos"];
pub const DOCUMENT_GROUP: &[&str] = &["documento", "documentos"];
pub const ACTOR_GROUP: &[&str] = &["actor", "actores", "abogado", "cliente", "asistente"];
pub const USER_GROUP: &[&str] = &["usuario", "usuarios", "rol", "roles"];

// ── Personal sub-branches ──

pub const PERSONAL_DOCUMENTS: &[&str] = &["documento", "documentos", "creado", "creados"];
pub const PERSONAL_CASES: &[&str] = &["caso", "casos", "asignado", "asignados"];
pub const PERSONAL_PROFILE: &[&str] = &["actor", "perfil", "información", "datos"];

// ── Case filters ──

/// Trigger word → canonical case type. First match in this order wins.
pub const CASE_TYPES: &[(&str, &str)] = &[
    ("divorcio", "Divorcio"),
    ("robo", "Robo"),
    ("despido", "Despido Injustificado"),
    ("sociedad", "Sociedad Comercial"),
    ("incumplimiento", "Incumplimiento Contractual"),
    ("pensión", "Pensión Alimenticia"),
    ("horas", "Horas Extras"),
    ("sucesión", "Sucesión"),
    ("daños", "Daños y Perjuicios"),
    ("amparo", "Recurso de Amparo"),
];

pub const OPEN_STATUS: &[&str] = &["abiertos", "abierto"];
pub const CLOSED_STATUS: &[&str] = &["cerrados", "cerrado"];

// ── Actor roles ──

pub const LAWYER_ROLE: &[&str] = &["abogado", "abogados"];
pub const CLIENT_ROLE: &[&str] = &["cliente", "clientes"];
pub const ASSISTANT_ROLE: &[&str] = &["asistente", "asistentes"];

// ── Entity extraction ──

/// Tags reported back with every answer when they occur in the question.
pub const ENTITY_TAGS: &[&str] = &["contrato", "factura", "abogado", "cliente"];

/// True when any keyword occurs in the already lower-cased `normalized` text.
pub fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| normalized.contains(kw))
}

/// Canonical case type for the first trigger word present, if any.
pub fn case_type_for(normalized: &str) -> Option<&'static str> {
    CASE_TYPES
        .iter()
        .find(|(trigger, _)| normalized.contains(trigger))
        .map(|(_, canonical)| *canonical)
}
