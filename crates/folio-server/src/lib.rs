pub mod config;
pub mod error;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::sync::RwLock;

use folio_core::site::Site;
use folio_core::AiSettings;
use folio_suggest::TextSuggestionService;

pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub suggest: Arc<dyn TextSuggestionService>,
    /// Shared with the suggestion service so saved settings apply immediately.
    pub settings: Arc<RwLock<AiSettings>>,
    pub settings_path: PathBuf,
    pub max_upload_bytes: usize,
}

pub fn build_router(state: AppState) -> Router {
    // base64 inflates uploads by 4/3; leave room for the JSON envelope
    let body_limit = state.max_upload_bytes / 3 * 4 + 64 * 1024;
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route("/api/projects/reorder", post(handlers::reorder_projects))
        .route(
            "/api/projects/:id",
            put(handlers::update_project).delete(handlers::delete_project),
        )
        .route(
            "/api/projects/:id/detail",
            get(handlers::get_detail).put(handlers::save_detail),
        )
        .route("/api/regenerate", post(handlers::regenerate))
        .route("/api/uploads", post(handlers::upload_image))
        .route("/api/suggest", post(handlers::suggest))
        .route(
            "/api/settings/ai",
            get(handlers::get_ai_settings).put(handlers::save_ai_settings),
        )
        .route("/api/schema/detail", get(handlers::detail_schema))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
