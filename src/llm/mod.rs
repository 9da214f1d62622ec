//! LLM integration for the car insurance bot.
//!
//! The conversation only needs one call shape: a system instruction plus a
//! user instruction in, a reply out. [`OpenAiProvider`] speaks the
//! OpenAI-compatible `/chat/completions` API behind the [`LlmProvider`] trait.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::LlmProvider;

use std::sync::Arc;

use crate::error::LlmError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let base = config.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(LlmError::ClientBuild {
            provider: "openai".to_string(),
            reason: format!("base URL must be http(s), got {base:?}"),
        });
    }

    tracing::info!("Using OpenAI-compatible endpoint {} (model: {})", base, config.model);
    Ok(Arc::new(OpenAiProvider::new(
        base,
        config.api_key.clone(),
        config.model.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> LlmConfig {
        LlmConfig {
            api_key: secrecy::SecretString::from("sk-test"),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn create_provider_uses_configured_model() {
        let provider = create_provider(&config(DEFAULT_BASE_URL)).unwrap();
        assert_eq!(provider.model_name(), "gpt-3.5-turbo");
    }

    #[test]
    fn create_provider_rejects_non_http_base() {
        let err = create_provider(&config("ftp://example.com")).err().unwrap();
        assert!(matches!(err, LlmError::ClientBuild { .. }));
    }
}
