//! Generation gateway: one provider call per question, failures turned into
//! user-facing text.
//!
//! The gateway never returns an error. A failed call yields a [`Generation`]
//! whose text is the Spanish message for the classified failure, so the
//! caller can always persist an assistant turn.

use std::fmt;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::{ConfigError, GenerationConfig};
use crate::provider::{ChatMessage, CompletionProvider, CompletionRequest};

/// Heading that introduces the retrieved data inside the final user message.
pub const CONTEXT_HEADING: &str = "Información encontrada en la base de datos:";

/// Provider failure classes, each with a fixed remediation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Credentials missing or rejected.
    Configuration,
    /// Billing or quota exhausted.
    Quota,
    /// Throttled by the provider.
    RateLimit,
    /// Anything else; carries the raw error text.
    Unclassified(String),
}

impl GenerationFailure {
    /// Classify a provider error by its message (case-insensitive).
    pub fn classify(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("api key") || lower.contains("authentication") {
            Self::Configuration
        } else if lower.contains("quota") || lower.contains("billing") {
            Self::Quota
        } else if lower.contains("rate limit") {
            Self::RateLimit
        } else {
            Self::Unclassified(raw.to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Quota => "quota",
            Self::RateLimit => "rate_limit",
            Self::Unclassified(_) => "unclassified",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration => "⚠️ Error de configuración: No se ha configurado la API key de OpenAI. \
                 Por favor, revisa el archivo .env y agrega OPENAI_API_KEY=tu-api-key-aqui"
                .to_string(),
            Self::Quota => "⚠️ Error de crédito: Tu cuenta de OpenAI no tiene crédito suficiente. \
                 Ve a https://platform.openai.com/account/billing para agregar crédito."
                .to_string(),
            Self::RateLimit => "⚠️ Límite de velocidad: Has excedido el límite de solicitudes. \
                 Espera unos momentos antes de intentar nuevamente."
                .to_string(),
            Self::Unclassified(raw) => format!("⚠️ Error al procesar tu consulta: {raw}"),
        }
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Outcome of one generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Completion text, or the failure message.
    pub text: String,
    pub tokens_used: Option<u32>,
    pub latency_seconds: f64,
    pub failure: Option<GenerationFailure>,
}

enum Backend {
    Enabled(Box<dyn CompletionProvider>),
    Disabled(ConfigError),
}

pub struct GenerationGateway {
    config: GenerationConfig,
    backend: Backend,
}

impl GenerationGateway {
    /// Validate `config` and wrap `provider`. An invalid configuration yields
    /// a disabled gateway instead of an error.
    pub fn new(config: GenerationConfig, provider: Box<dyn CompletionProvider>) -> Self {
        match config.validate() {
            Ok(()) => Self {
                config,
                backend: Backend::Enabled(provider),
            },
            Err(reason) => Self::disabled(config, reason),
        }
    }

    /// A gateway that answers every generation with the configuration message.
    pub fn disabled(config: GenerationConfig, reason: ConfigError) -> Self {
        warn!(reason = %reason, "text generation disabled");
        Self {
            config,
            backend: Backend::Disabled(reason),
        }
    }

    /// Gateway backed by the OpenAI-compatible HTTP provider.
    #[cfg(feature = "openai")]
    pub fn openai(config: GenerationConfig) -> Self {
        match config.validate() {
            Ok(()) => {
                let key = config.api_key.clone().unwrap_or_default();
                let provider = crate::provider::OpenAiProvider::new(&config.base_url, &key);
                Self {
                    config,
                    backend: Backend::Enabled(Box::new(provider)),
                }
            }
            Err(reason) => Self::disabled(config, reason),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.backend, Backend::Enabled(_))
    }

    /// Why the gateway is disabled, if it is.
    pub fn disabled_reason(&self) -> Option<&ConfigError> {
        match &self.backend {
            Backend::Enabled(_) => None,
            Backend::Disabled(reason) => Some(reason),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Message list sent to the provider: system instructions, prior turns,
    /// then the question followed by the retrieved context.
    pub fn build_messages(
        system_prompt: &str,
        context: &str,
        history: &[ChatMessage],
        query: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(format!(
            "{query}\n\n{CONTEXT_HEADING}\n{context}"
        )));
        messages
    }

    /// Single provider call. No retry.
    pub async fn generate(
        &self,
        system_prompt: &str,
        context: &str,
        history: &[ChatMessage],
        query: &str,
    ) -> Generation {
        let provider = match &self.backend {
            Backend::Enabled(provider) => provider,
            Backend::Disabled(_) => return Self::failed(GenerationFailure::Configuration, 0.0),
        };

        let request = CompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: Self::build_messages(system_prompt, context, history, query),
        };

        let start = Instant::now();
        let result = provider.complete(&request).await;
        let latency_seconds = start.elapsed().as_secs_f64();

        match result {
            Ok(completion) => {
                info!(
                    model = %self.config.model,
                    latency_seconds,
                    tokens = completion.tokens_used.unwrap_or(0),
                    "generation complete"
                );
                Generation {
                    text: completion.text,
                    tokens_used: completion.tokens_used,
                    latency_seconds,
                    failure: None,
                }
            }
            Err(e) => {
                let failure = GenerationFailure::classify(&e.to_string());
                warn!(kind = failure.kind(), error = %e, latency_seconds, "generation failed");
                Self::failed(failure, latency_seconds)
            }
        }
    }

    fn failed(failure: GenerationFailure, latency_seconds: f64) -> Generation {
        Generation {
            text: failure.user_message(),
            tokens_used: None,
            latency_seconds,
            failure: Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::provider::{Completion, ProviderError};

    struct Scripted {
        reply: Result<&'static str, &'static str>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionProvider for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
            self.seen.lock().unwrap().push(request.clone());
            match self.reply {
                Ok(text) => Ok(Completion {
                    text: text.to_string(),
                    tokens_used: Some(42),
                }),
                Err(body) => Err(ProviderError::Server {
                    status: 429,
                    body: body.to_string(),
                }),
            }
        }
    }

    fn config() -> GenerationConfig {
        GenerationConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            GenerationFailure::classify("Incorrect API key provided"),
            GenerationFailure::Configuration
        );
        assert_eq!(
            GenerationFailure::classify("You exceeded your current QUOTA"),
            GenerationFailure::Quota
        );
        assert_eq!(
            GenerationFailure::classify("Rate limit reached for requests"),
            GenerationFailure::RateLimit
        );
        assert_eq!(
            GenerationFailure::classify("connection reset"),
            GenerationFailure::Unclassified("connection reset".into())
        );
    }

    #[test]
    fn unclassified_echoes_raw_text() {
        let failure = GenerationFailure::Unclassified("timeout after 30s".into());
        assert_eq!(
            failure.user_message(),
            "⚠️ Error al procesar tu consulta: timeout after 30s"
        );
    }

    #[test]
    fn final_message_carries_query_then_context() {
        let messages =
            GenerationGateway::build_messages("sys", "CASOS: ninguno", &[ChatMessage::user("a")], "¿qué hay?");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, gestdoc_core::TurnRole::System);
        assert_eq!(
            messages[2].content,
            "¿qué hay?\n\nInformación encontrada en la base de datos:\nCASOS: ninguno"
        );
    }

    #[tokio::test]
    async fn successful_generation_reports_tokens() {
        let gateway = GenerationGateway::new(
            config(),
            Box::new(Scripted {
                reply: Ok("Hay 7 casos."),
                seen: Mutex::new(Vec::new()),
            }),
        );
        assert!(gateway.is_enabled());
        let generation = gateway.generate("sys", "ctx", &[], "q").await;
        assert_eq!(generation.text, "Hay 7 casos.");
        assert_eq!(generation.tokens_used, Some(42));
        assert!(generation.failure.is_none());
    }

    #[tokio::test]
    async fn quota_failure_becomes_billing_message() {
        let gateway = GenerationGateway::new(
            config(),
            Box::new(Scripted {
                reply: Err("insufficient_quota: check your billing details"),
                seen: Mutex::new(Vec::new()),
            }),
        );
        let generation = gateway.generate("sys", "ctx", &[], "q").await;
        assert_eq!(generation.failure, Some(GenerationFailure::Quota));
        assert!(generation.text.starts_with("⚠️ Error de crédito"));
    }

    #[tokio::test]
    async fn invalid_config_disables_gateway() {
        let gateway = GenerationGateway::new(
            GenerationConfig::default(),
            Box::new(Scripted {
                reply: Ok("nunca"),
                seen: Mutex::new(Vec::new()),
            }),
        );
        assert!(!gateway.is_enabled());
        assert_eq!(gateway.disabled_reason(), Some(&ConfigError::MissingApiKey));
        let generation = gateway.generate("sys", "ctx", &[], "q").await;
        assert_eq!(generation.failure, Some(GenerationFailure::Configuration));
    }
}
