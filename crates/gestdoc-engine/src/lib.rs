//! Conversational query engine: intent-driven retrieval, result formatting,
//! context assembly, and the chat turn loop over a conversation store.

pub mod context;
pub mod engine;
pub mod error;
pub mod format;
pub mod router;
pub mod settings;
pub mod suggest;

#[cfg(test)]
mod testing;

pub use context::{Assembly, Prompt, SYSTEM_PROMPT, assemble, history_window};
pub use engine::{Answer, ChatEngine};
pub use error::{EngineError, SettingsError};
pub use router::RetrievalRouter;
pub use settings::EngineSettings;
pub use suggest::{
    CONTEXTUAL_LIMIT, SMART_LIMIT, Suggestion, contextual_suggestions, smart_suggestions,
};
