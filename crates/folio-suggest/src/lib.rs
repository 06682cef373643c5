pub mod engine;
mod parse;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use folio_core::AiSettings;

/// Minimum length of the current content before a polish request is accepted.
pub const MIN_POLISH_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionMode {
    Draft,
    Polish,
    ListGenerate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Overview,
    Contributions,
    Future,
    Skills,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Project title or short topic the text is about.
    pub subject: String,
    #[serde(default)]
    pub current_content: Option<String>,
    pub mode: SuggestionMode,
    #[serde(default)]
    pub section_kind: Option<SectionKind>,
}

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("AI provider is not configured")]
    NotConfigured,
    #[error("text is too short to polish (at least {min} characters)")]
    TooShort { min: usize },
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("{0}")]
    InvalidRequest(String),
}

impl SuggestError {
    pub fn code(&self) -> &'static str {
        match self {
            SuggestError::NotConfigured => "not-configured",
            SuggestError::TooShort { .. } => "input-too-short",
            SuggestError::Upstream(_) => "upstream",
            SuggestError::InvalidRequest(_) => "malformed-input",
        }
    }
}

/// Narrow boundary to whatever produces suggestion text.
#[async_trait]
pub trait TextSuggestionService: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String, SuggestError>;
}

/// Checks that do not need a provider: subject present, polish input long
/// enough, list generation tied to a section.
pub fn validate_request(request: &SuggestionRequest) -> Result<(), SuggestError> {
    if request.subject.trim().is_empty() {
        return Err(SuggestError::InvalidRequest("subject is required".to_string()));
    }
    match request.mode {
        SuggestionMode::Polish => {
            let len = request
                .current_content
                .as_deref()
                .map(|c| c.trim().chars().count())
                .unwrap_or(0);
            if len < MIN_POLISH_CHARS {
                return Err(SuggestError::TooShort { min: MIN_POLISH_CHARS });
            }
        }
        SuggestionMode::ListGenerate if request.section_kind.is_none() => {
            return Err(SuggestError::InvalidRequest(
                "listGenerate requires a sectionKind".to_string(),
            ));
        }
        _ => {}
    }
    Ok(())
}

/// Suggestion service backed by the configured LLM provider.
///
/// Settings are shared so that saving new settings takes effect on the next request.
pub struct LlmSuggestionService {
    settings: Arc<RwLock<AiSettings>>,
}

impl LlmSuggestionService {
    pub fn new(settings: Arc<RwLock<AiSettings>>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> Arc<RwLock<AiSettings>> {
        Arc::clone(&self.settings)
    }
}

#[async_trait]
impl TextSuggestionService for LlmSuggestionService {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String, SuggestError> {
        validate_request(request)?;
        let settings = self.settings.read().await.clone();
        if !folio_core::ai_configured(&settings) {
            return Err(SuggestError::NotConfigured);
        }

        let system = prompt::system_prompt(request);
        let user_msg = prompt::user_message(request);

        tracing::info!(
            provider = %settings.provider,
            model = %settings.model,
            mode = ?request.mode,
            section = ?request.section_kind,
            "requesting suggestion"
        );

        let raw = engine::complete(&settings, &system, &user_msg)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "suggestion failed"))?;
        tracing::debug!(raw = %raw, "raw LLM output");

        parse::clean_output(&raw, request.mode, request.section_kind)
            .ok_or_else(|| SuggestError::Upstream("LLM returned no usable text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: SuggestionMode, current: Option<&str>, section: Option<SectionKind>) -> SuggestionRequest {
        SuggestionRequest {
            subject: "Weather Station".into(),
            current_content: current.map(String::from),
            mode,
            section_kind: section,
        }
    }

    fn service(settings: AiSettings) -> LlmSuggestionService {
        LlmSuggestionService::new(Arc::new(RwLock::new(settings)))
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let r: SuggestionRequest = serde_json::from_value(serde_json::json!({
            "subject": "X",
            "currentContent": "abc",
            "mode": "listGenerate",
            "sectionKind": "future"
        }))
        .unwrap();
        assert_eq!(r.mode, SuggestionMode::ListGenerate);
        assert_eq!(r.section_kind, Some(SectionKind::Future));
        assert_eq!(r.current_content.as_deref(), Some("abc"));
    }

    #[test]
    fn polish_needs_enough_text() {
        let short = request(SuggestionMode::Polish, Some("   too short    "), None);
        assert!(matches!(validate_request(&short), Err(SuggestError::TooShort { min: 20 })));
        let missing = request(SuggestionMode::Polish, None, None);
        assert!(matches!(validate_request(&missing), Err(SuggestError::TooShort { .. })));
        let ok = request(SuggestionMode::Polish, Some("A sensor network that reports hourly."), None);
        assert!(validate_request(&ok).is_ok());
    }

    #[test]
    fn list_generation_needs_section_and_subject() {
        let r = request(SuggestionMode::ListGenerate, None, None);
        assert!(matches!(validate_request(&r), Err(SuggestError::InvalidRequest(_))));
        let mut r = request(SuggestionMode::Draft, None, None);
        r.subject = "  ".into();
        assert!(matches!(validate_request(&r), Err(SuggestError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn unconfigured_service_refuses_without_calling_out() {
        let svc = service(AiSettings::default());
        let err = svc
            .suggest(&request(SuggestionMode::Draft, None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::NotConfigured));
        assert_eq!(err.code(), "not-configured");

        let svc = service(AiSettings {
            provider: "openai".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
        });
        let err = svc
            .suggest(&request(SuggestionMode::Draft, None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::NotConfigured));
    }

    #[tokio::test]
    async fn validation_runs_before_configuration_check() {
        let svc = service(AiSettings::default());
        let err = svc
            .suggest(&request(SuggestionMode::Polish, Some("short"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestError::TooShort { .. }));
    }

    #[tokio::test]
    async fn settings_updates_are_seen_by_the_service() {
        let svc = service(AiSettings::default());
        let shared = svc.settings();
        shared.write().await.provider = "ollama".into();
        assert_eq!(svc.settings.read().await.provider, "ollama");
    }
}
