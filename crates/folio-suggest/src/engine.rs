//! Provider access for project-copy suggestions.
//!
//! A suggestion is a single chat exchange: the section-specific system prompt
//! plus one user message carrying the project name and the visitor-facing
//! text. Failures come back as [`SuggestError::Upstream`] and are never
//! retried; the caller decides whether to surface them.

use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use folio_core::AiSettings;

use crate::SuggestError;

/// Provider names accepted in the AI settings file, matched case-insensitively.
pub const PROVIDERS: [&str; 7] = [
    "openai",
    "anthropic",
    "google",
    "ollama",
    "groq",
    "mistral",
    "deepseek",
];

fn backend_for(provider: &str) -> Result<LLMBackend, SuggestError> {
    match provider.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        _ => Err(SuggestError::InvalidRequest(format!(
            "unknown AI provider {provider:?}; expected one of {}",
            PROVIDERS.join(", ")
        ))),
    }
}

/// Ask the configured provider for replacement copy and return its reply,
/// trimmed. An empty reply counts as an upstream failure.
pub async fn complete(settings: &AiSettings, system: &str, user_msg: &str) -> Result<String, SuggestError> {
    let mut builder = LLMBuilder::new()
        .backend(backend_for(&settings.provider)?)
        .model(&settings.model)
        .system(system);
    // ollama runs keyless
    if !settings.api_key.is_empty() {
        builder = builder.api_key(&settings.api_key);
    }
    let llm = builder
        .build()
        .map_err(|e| SuggestError::Upstream(format!("{} client: {e}", settings.provider)))?;
    let messages = vec![ChatMessage::user().content(user_msg).build()];
    let response = llm
        .chat(&messages)
        .await
        .map_err(|e| SuggestError::Upstream(format!("{} request failed: {e}", settings.provider)))?;

    response
        .text()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| SuggestError::Upstream(format!("{} returned no suggestion", settings.provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_are_case_insensitive() {
        for provider in PROVIDERS {
            assert!(backend_for(provider).is_ok(), "{provider}");
        }
        assert!(backend_for(" OpenAI ").is_ok());
    }

    #[test]
    fn unknown_provider_lists_the_accepted_ones() {
        let Err(SuggestError::InvalidRequest(msg)) = backend_for("acme") else {
            panic!("acme must be rejected");
        };
        assert!(msg.contains("acme"));
        assert!(msg.contains("deepseek"));
    }

    #[tokio::test]
    async fn unknown_provider_fails_before_any_request() {
        let settings = AiSettings {
            provider: "acme".into(),
            model: "m".into(),
            api_key: "k".into(),
        };
        let err = complete(&settings, "sys", "user").await.unwrap_err();
        assert!(matches!(err, SuggestError::InvalidRequest(_)));
    }
}
