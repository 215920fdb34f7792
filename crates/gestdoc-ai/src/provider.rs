//! Chat-completion providers behind a single async trait.

use async_trait::async_trait;
use gestdoc_core::TurnRole;
#[cfg(any(feature = "openai", test))]
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[cfg(feature = "openai")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Other(String),
}

/// One role/content entry of the message list sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: TurnRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: Option<u32>,
}

/// Prompt in, completion out. Fallible and possibly slow.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

// ── OpenAI-compatible wire format ──

#[cfg(any(feature = "openai", test))]
#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[cfg(any(feature = "openai", test))]
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[cfg(any(feature = "openai", test))]
impl<'a> WireRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.wire_name(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[cfg(any(feature = "openai", test))]
#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[cfg(any(feature = "openai", test))]
#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[cfg(any(feature = "openai", test))]
#[derive(Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}

#[cfg(any(feature = "openai", test))]
#[derive(Deserialize)]
struct WireUsage {
    total_tokens: u32,
}

#[cfg(any(feature = "openai", test))]
impl WireResponse {
    fn into_completion(self) -> Result<Completion, ProviderError> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Malformed("no choices in response".into()))?;
        Ok(Completion {
            text: text.trim().to_string(),
            tokens_used: self.usage.map(|u| u.total_tokens),
        })
    }
}

#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;

#[cfg(feature = "openai")]
mod openai {
    use async_trait::async_trait;
    use tracing::debug;

    use super::{Completion, CompletionProvider, CompletionRequest, ProviderError, WireRequest, WireResponse};

    /// Client for `POST {base_url}/chat/completions` with bearer auth.
    pub struct OpenAiProvider {
        client: reqwest::Client,
        base_url: String,
        api_key: String,
    }

    impl OpenAiProvider {
        /// `base_url` should be like `https://api.openai.com/v1` (no trailing slash).
        pub fn new(base_url: &str, api_key: &str) -> Self {
            Self {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key: api_key.to_string(),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for OpenAiProvider {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<Completion, ProviderError> {
            let url = format!("{}/chat/completions", self.base_url);
            debug!(url = %url, model = %request.model, messages = request.messages.len(), "requesting completion");
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&WireRequest::from_request(request))
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ProviderError::Server {
                    status: status.as_u16(),
                    body,
                });
            }
            let wire: WireResponse = resp.json().await?;
            wire.into_completion()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_request_uses_provider_role_names() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 1000,
            messages: vec![
                ChatMessage::system("reglas"),
                ChatMessage::user("hola"),
                ChatMessage::assistant("buenas"),
            ],
        };
        let json = serde_json::to_value(WireRequest::from_request(&request)).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][2]["role"], "assistant");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn response_parsing_takes_first_choice() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "  Hay 7 casos.  "}}],
            "usage": {"prompt_tokens": 90, "completion_tokens": 10, "total_tokens": 100}
        }"#;
        let wire: WireResponse = serde_json::from_str(body).unwrap();
        let completion = wire.into_completion().unwrap();
        assert_eq!(completion.text, "Hay 7 casos.");
        assert_eq!(completion.tokens_used, Some(100));
    }

    #[test]
    fn empty_choices_is_malformed() {
        let wire: WireResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            wire.into_completion(),
            Err(ProviderError::Malformed(_))
        ));
    }
}
