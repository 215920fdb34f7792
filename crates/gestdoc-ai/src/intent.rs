//! Keyword-based intent classification and entity extraction.
//!
//! Classification is an ordered membership test over the lists in
//! [`crate::keywords`]: personal markers first, then statistical, then
//! specific (interrogatives, attribute names, or a case number), else general.

use std::sync::OnceLock;

use chrono::Utc;
use gestdoc_core::{IntentCategory, Query};
use regex::Regex;
use tracing::info;

use crate::keywords::{self, contains_any};

fn re_case_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z]+-\d{4}-\d+").unwrap())
}

/// Lower-case form every matcher works on.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// First case number (e.g. `civ-2024-001`) in already-normalized text.
pub fn case_number(normalized: &str) -> Option<&str> {
    re_case_number().find(normalized).map(|m| m.as_str())
}

/// Classify already-normalized text. Always returns exactly one category.
pub fn classify_normalized(normalized: &str) -> IntentCategory {
    if contains_any(normalized, keywords::PERSONAL) {
        IntentCategory::Personal
    } else if contains_any(normalized, keywords::STATISTICAL) {
        IntentCategory::Statistical
    } else if contains_any(normalized, keywords::SPECIFIC) || case_number(normalized).is_some() {
        IntentCategory::Specific
    } else {
        IntentCategory::General
    }
}

/// Classify raw question text.
pub fn classify(text: &str) -> IntentCategory {
    classify_normalized(&normalize(text))
}

/// Recognised entity tags in fixed order, then any case number (upper-cased).
pub fn extract_entities(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut entities: Vec<String> = keywords::ENTITY_TAGS
        .iter()
        .filter(|tag| normalized.contains(*tag))
        .map(|tag| tag.to_string())
        .collect();
    for m in re_case_number().find_iter(&normalized) {
        let number = m.as_str().to_uppercase();
        if !entities.contains(&number) {
            entities.push(number);
        }
    }
    entities
}

/// Build the per-request [`Query`] for a question.
pub fn analyze(text: &str) -> Query {
    let normalized = normalize(text);
    let category = classify_normalized(&normalized);
    let entities = extract_entities(text);
    info!(
        category = category.as_str(),
        entities = entities.len(),
        "query classified"
    );
    Query {
        text: text.to_string(),
        normalized,
        category,
        entities,
        received_at: Utc::now(),
    }
}
