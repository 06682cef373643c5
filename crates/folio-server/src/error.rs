use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use folio_suggest::SuggestError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] folio_core::Error),
    #[error(transparent)]
    Suggest(#[from] SuggestError),
    #[error("{0}")]
    BadRequest(String),
    #[error("upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                folio_core::Error::NotFound { .. } => StatusCode::NOT_FOUND,
                folio_core::Error::Invalid(_) => StatusCode::BAD_REQUEST,
                folio_core::Error::UnsafePath(_) => StatusCode::FORBIDDEN,
                folio_core::Error::Listing { .. } => StatusCode::CONFLICT,
                folio_core::Error::Io { .. } | folio_core::Error::Json { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Suggest(e) => match e {
                SuggestError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                SuggestError::Upstream(_) => StatusCode::BAD_GATEWAY,
                SuggestError::TooShort { .. } | SuggestError::InvalidRequest(_) => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Core(e) => e.code(),
            ApiError::Suggest(e) => e.code(),
            ApiError::BadRequest(_) => "malformed-input",
            ApiError::PayloadTooLarge { .. } => "payload-too-large",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
