//! Process-wide text-generation settings, validated once at startup.

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("API key is missing")]
    MissingApiKey,
    #[error("temperature {0} is outside 0.0..=2.0")]
    Temperature(f32),
    #[error("max tokens must be between 1 and 32768, got {0}")]
    MaxTokens(u32),
}

/// Provider settings. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl GenerationConfig {
    /// Check the settings before the first call is ever made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => return Err(ConfigError::MissingApiKey),
            Some(_) => {}
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        if !(1..=32_768).contains(&self.max_tokens) {
            return Err(ConfigError::MaxTokens(self.max_tokens));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GenerationConfig {
        GenerationConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1000);
    }

    #[test]
    fn missing_or_blank_key_rejected() {
        assert_eq!(
            GenerationConfig::default().validate(),
            Err(ConfigError::MissingApiKey)
        );
        let blank = GenerationConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.validate(), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn bounds_checked() {
        assert!(valid().validate().is_ok());
        let hot = GenerationConfig {
            temperature: 2.5,
            ..valid()
        };
        assert_eq!(hot.validate(), Err(ConfigError::Temperature(2.5)));
        let empty = GenerationConfig {
            max_tokens: 0,
            ..valid()
        };
        assert_eq!(empty.validate(), Err(ConfigError::MaxTokens(0)));
    }
}
