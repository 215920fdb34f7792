//! Question understanding and text generation: keyword intent classifier,
//! entity extraction, and the gateway to an OpenAI-compatible chat endpoint.

pub mod config;
pub mod gateway;
pub mod intent;
pub mod keywords;
pub mod provider;

pub use config::{ConfigError, GenerationConfig};
pub use gateway::{Generation, GenerationFailure, GenerationGateway};
pub use intent::{analyze, classify, extract_entities};
pub use provider::{ChatMessage, Completion, CompletionProvider, CompletionRequest, ProviderError};

#[cfg(feature = "openai")]
pub use provider::OpenAiProvider;
