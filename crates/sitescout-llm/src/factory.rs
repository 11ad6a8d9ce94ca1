//! Backend construction from configuration.

use std::sync::Arc;

use secrecy::SecretString;
use sitescout_common::scout_config::{LlmProvider, LlmSettings};

use crate::backend::{AnthropicBackend, LlmBackend, LlmError, OllamaBackend, OpenAiCompatibleBackend};

/// Build the configured backend. `api_key` has already been resolved from
/// config or environment by the caller.
pub fn build_backend(
    settings: &LlmSettings,
    api_key: Option<SecretString>,
) -> Result<Arc<dyn LlmBackend>, LlmError> {
    match settings.provider {
        LlmProvider::Anthropic => {
            let key = api_key.ok_or_else(|| {
                LlmError::Unavailable("Anthropic selected but no API key configured".to_string())
            })?;
            let mut backend = AnthropicBackend::new(key, settings.model.clone());
            if let Some(ref url) = settings.base_url {
                backend = backend.with_endpoint(url.clone());
            }
            Ok(Arc::new(backend))
        }
        LlmProvider::OpenaiCompatible => {
            let url = settings.base_url.clone().ok_or_else(|| {
                LlmError::Unavailable("openai_compatible requires llm.base_url".to_string())
            })?;
            Ok(Arc::new(OpenAiCompatibleBackend::new(url, settings.model.clone(), api_key)))
        }
        LlmProvider::Ollama => {
            let url = settings
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string());
            Ok(Arc::new(OllamaBackend::new(url, settings.model.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_requires_key() {
        let settings = LlmSettings::default();
        assert!(matches!(build_backend(&settings, None), Err(LlmError::Unavailable(_))));

        let backend = build_backend(&settings, Some(SecretString::from("sk-ant-test"))).unwrap();
        assert_eq!(backend.backend_name(), "anthropic");
        assert_eq!(backend.model_id(), "claude-3-haiku-20240307");
    }

    #[test]
    fn test_compatible_requires_base_url() {
        let settings = LlmSettings { provider: LlmProvider::OpenaiCompatible, ..Default::default() };
        assert!(build_backend(&settings, None).is_err());
    }

    #[test]
    fn test_ollama_defaults_to_localhost() {
        let settings = LlmSettings {
            provider: LlmProvider::Ollama,
            model: "llama3:8b".into(),
            ..Default::default()
        };
        let backend = build_backend(&settings, None).unwrap();
        assert!(backend.is_local());
    }
}
