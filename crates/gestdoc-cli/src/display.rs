//! Terminal rendering for answers, transcripts, and listings.
//!
//! Answers go to stdout verbatim (they are already Markdown-ish text); the
//! bookkeeping line after each answer goes to stderr so piping stays clean.

use gestdoc_core::{Conversation, ConversationTurn, Query, TurnRole};
use gestdoc_engine::{Answer, Suggestion};
use gestdoc_store::SeedSummary;

const LABEL_WIDTH: usize = 14;

// ── Answers ──

pub fn print_answer(answer: &Answer) {
    println!("{}", answer.answer);
    println!();

    let mut notes = vec![
        format!("conversation {}", answer.conversation_id),
        answer.category.as_str().to_string(),
    ];
    if answer.direct {
        notes.push("direct".into());
    }
    if let Some(tokens) = answer.tokens_used {
        notes.push(format!("{tokens} tokens"));
    }
    if let Some(failure) = &answer.failure {
        notes.push(format!("failure: {}", failure.kind()));
    }
    notes.push(format!("{:.2}s", answer.latency_seconds));
    if !answer.consulted_document_ids.is_empty() {
        let ids: Vec<String> = answer
            .consulted_document_ids
            .iter()
            .map(i64::to_string)
            .collect();
        notes.push(format!("documents [{}]", ids.join(", ")));
    }
    eprintln!("  ({})", notes.join(" · "));
}

pub fn print_classification(query: &Query) {
    println!("  {:<LABEL_WIDTH$} {}", "category", query.category.as_str());
    println!("  {:<LABEL_WIDTH$} {}", "normalized", query.normalized);
    let entities = if query.entities.is_empty() {
        "-".to_string()
    } else {
        query.entities.join(", ")
    };
    println!("  {:<LABEL_WIDTH$} {}", "entities", entities);
}

// ── Conversations ──

pub fn print_conversations(conversations: &[Conversation]) {
    if conversations.is_empty() {
        println!("No conversations");
        return;
    }
    println!("{:>6}  {:<20}  {}", "id", "updated", "title");
    for c in conversations {
        println!("{:>6}  {:<20}  {}", c.id, short_timestamp(&c.updated_at), c.title);
    }
}

pub fn print_transcript(conversation: &Conversation, turns: &[ConversationTurn]) {
    println!("=== {} ===", conversation.title);
    println!(
        "  {:<LABEL_WIDTH$} {}",
        "started",
        short_timestamp(&conversation.created_at)
    );
    println!();

    for turn in turns {
        let speaker = match turn.role {
            TurnRole::User => "Usuario",
            TurnRole::Assistant => "Asistente",
            TurnRole::System => "Sistema",
        };
        println!("[{}] {speaker}", short_timestamp(&turn.sent_at));
        println!("{}", turn.content);
        if let Some(latency) = turn.metadata.latency_seconds {
            let tokens = turn
                .metadata
                .tokens_used
                .map(|t| format!(", {t} tokens"))
                .unwrap_or_default();
            println!("  ({latency:.2}s{tokens})");
        }
        println!();
    }
}

/// `2024-03-20T10:15:00.123+00:00` → `2024-03-20 10:15:00`.
fn short_timestamp(raw: &str) -> String {
    raw.chars()
        .take(19)
        .map(|c| if c == 'T' { ' ' } else { c })
        .collect()
}

// ── Misc ──

pub fn print_suggestions(suggestions: &[Suggestion]) {
    for s in suggestions {
        println!("{} {}  ({})", s.icon, s.text, s.category);
    }
}

pub fn print_seed_summary(summary: &SeedSummary) {
    if summary.skipped {
        println!("Database already has users, demo data not loaded");
    }
    println!("  {:<LABEL_WIDTH$} {}", "users", summary.users);
    println!("  {:<LABEL_WIDTH$} {}", "cases", summary.cases);
    println!("  {:<LABEL_WIDTH$} {}", "documents", summary.documents);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_shortened() {
        assert_eq!(
            short_timestamp("2024-03-20T10:15:00.123+00:00"),
            "2024-03-20 10:15:00"
        );
        assert_eq!(short_timestamp("2024-03-20"), "2024-03-20");
    }
}
