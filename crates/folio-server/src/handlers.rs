use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use folio_core::catalog::{NewProject, ProjectPatch};
use folio_core::content::{
    contributions_from_text, future_from_text, overview_from_text, overview_to_text, skills_from_text,
};
use folio_core::{AiSettings, ProjectDetail};
use folio_suggest::SuggestionRequest;

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Run blocking core work off the async executor.
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> folio_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub(crate) async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub(crate) async fn list_projects(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let site = state.site.clone();
    let projects = blocking(move || site.list_projects()).await?;
    Ok(Json(projects))
}

pub(crate) async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let input = body(payload)?;
    let site = state.site.clone();
    let project = blocking(move || site.create_project(input)).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub(crate) async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProjectPatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let patch = body(payload)?;
    let site = state.site.clone();
    let project = blocking(move || site.update_project(id, patch)).await?;
    Ok(Json(project))
}

pub(crate) async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let site = state.site.clone();
    let deleted = blocking(move || site.delete_project(id)).await?;
    Ok(Json(deleted))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReorderRequest {
    order: Vec<i64>,
}

pub(crate) async fn reorder_projects(
    State(state): State<AppState>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = body(payload)?;
    let site = state.site.clone();
    let projects = blocking(move || site.reorder_projects(&request.order)).await?;
    Ok(Json(projects))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailView {
    #[serde(flatten)]
    detail: ProjectDetail,
    /// Overview in the editor's plain-text form.
    overview_text: String,
}

pub(crate) async fn get_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let site = state.site.clone();
    let detail = blocking(move || site.detail(id)).await?;
    let overview_text = overview_to_text(&detail.overview);
    Ok(Json(DetailView {
        detail,
        overview_text,
    }))
}

pub(crate) async fn save_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let detail = detail_from_body(id, body(payload)?)?;
    let site = state.site.clone();
    let saved = blocking(move || site.save_detail(detail)).await?;
    Ok(Json(saved))
}

/// Build a detail record from an editor payload. The `*Text` fields are the
/// plain-text forms of their structured counterparts and replace them when present.
fn detail_from_body(id: i64, mut payload: Value) -> ApiResult<ProjectDetail> {
    let Value::Object(map) = &mut payload else {
        return Err(ApiError::BadRequest("detail body must be a JSON object".to_string()));
    };
    if let Some(Value::String(text)) = map.remove("overviewText") {
        map.insert("overview".to_string(), json!(overview_from_text(&text)));
    }
    let list_fields: [(&str, &str, fn(&str) -> Vec<String>); 3] = [
        ("keyContributionsText", "keyContributions", contributions_from_text),
        ("futureDevelopmentText", "futureDevelopment", future_from_text),
        ("skillsText", "skills", skills_from_text),
    ];
    for (text_key, key, parse) in list_fields {
        if let Some(Value::String(text)) = map.remove(text_key) {
            map.insert(key.to_string(), json!(parse(&text)));
        }
    }
    map.insert("projectId".to_string(), json!(id));
    ProjectDetail::from_json_value(payload).map_err(|e| ApiError::BadRequest(format!("invalid detail: {e}")))
}

pub(crate) async fn regenerate(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let site = state.site.clone();
    let report = blocking(move || site.regenerate()).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadRequest {
    mime_type: String,
    /// Base64 image bytes, optionally as a `data:` URL.
    data: String,
}

pub(crate) async fn upload_image(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let limit = state.max_upload_bytes;
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge { limit })
        }
        Err(e) => return Err(ApiError::BadRequest(e.body_text())),
    };
    if !request.mime_type.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "unsupported upload type: {}",
            request.mime_type
        )));
    }
    let encoded = request
        .data
        .split_once(";base64,")
        .map(|(_, data)| data)
        .unwrap_or(&request.data);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ApiError::BadRequest(format!("invalid base64 image data: {e}")))?;
    if bytes.len() > limit {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let site = state.site.clone();
    let mime_type = request.mime_type;
    let path = blocking(move || site.root().store_upload(&mime_type, &bytes)).await?;
    Ok((StatusCode::CREATED, Json(json!({ "path": path }))))
}

pub(crate) async fn suggest(
    State(state): State<AppState>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = body(payload)?;
    let content = state.suggest.suggest(&request).await?;
    Ok(Json(json!({ "content": content })))
}

/// Settings as shown to the editor. The API key never leaves the server.
fn masked_settings(settings: &AiSettings) -> Value {
    json!({
        "provider": settings.provider,
        "model": settings.model,
        "hasKey": !settings.api_key.is_empty(),
        "configured": folio_core::ai_configured(settings),
    })
}

pub(crate) async fn get_ai_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings.read().await;
    Json(masked_settings(&settings))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveAiSettings {
    provider: String,
    model: String,
    /// Empty means "keep the stored key".
    #[serde(default)]
    api_key: String,
}

pub(crate) async fn save_ai_settings(
    State(state): State<AppState>,
    payload: Result<Json<SaveAiSettings>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = body(payload)?;
    let updated = {
        let mut settings = state.settings.write().await;
        settings.provider = request.provider.trim().to_string();
        settings.model = request.model.trim().to_string();
        if !request.api_key.is_empty() {
            settings.api_key = request.api_key;
        }
        settings.clone()
    };
    let path = state.settings_path.clone();
    let to_write = updated.clone();
    blocking(move || folio_core::write_settings_to(&path, &to_write)).await?;
    tracing::info!(provider = %updated.provider, model = %updated.model, "saved AI settings");
    Ok(Json(masked_settings(&updated)))
}

pub(crate) async fn detail_schema() -> impl IntoResponse {
    Json(schemars::schema_for!(ProjectDetail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ContentItem;

    #[test]
    fn text_forms_replace_structured_fields() {
        let detail = detail_from_body(
            9,
            json!({
                "projectId": 1,
                "overview": [{"type": "paragraph", "content": "old"}],
                "overviewText": "Intro line\n\nNOTE: careful",
                "keyContributionsText": "<ul><li>- Built it</li></ul>",
                "skillsText": "Rust, Axum\nSQL",
                "links": null
            }),
        )
        .unwrap();
        assert_eq!(detail.project_id, 9);
        assert_eq!(
            detail.overview,
            vec![
                ContentItem::Paragraph { content: "Intro line".into() },
                ContentItem::Note { content: "careful".into() },
            ]
        );
        assert_eq!(detail.key_contributions, vec!["Built it".to_string()]);
        assert_eq!(detail.skills, vec!["Rust", "Axum", "SQL"]);
        assert!(detail.links.is_empty());
    }

    #[test]
    fn non_object_detail_body_is_rejected() {
        assert!(matches!(
            detail_from_body(1, json!([1, 2])),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn masked_settings_hide_the_key() {
        let view = masked_settings(&AiSettings {
            provider: "openai".into(),
            api_key: "sk-secret".into(),
            model: "gpt-4o".into(),
        });
        assert_eq!(view["hasKey"], json!(true));
        assert_eq!(view["configured"], json!(true));
        assert!(!view.to_string().contains("sk-secret"));
    }
}
