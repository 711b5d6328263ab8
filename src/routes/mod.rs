// Route exports
pub mod recommendations;
pub mod reference;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::core::{RecommendError, Recommender};
use crate::models::ErrorResponse;
use crate::services::{LocationIndex, ReferenceStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub reference: Arc<dyn ReferenceStore>,
    pub index: Arc<dyn LocationIndex>,
}

impl AppState {
    pub fn new(
        recommender: Recommender,
        reference: Arc<dyn ReferenceStore>,
        index: Arc<dyn LocationIndex>,
    ) -> Self {
        Self {
            recommender,
            reference,
            index,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recommendations::configure)
            .configure(reference::configure),
    );
}

/// Map an engine error onto a stable HTTP response
///
/// Client-facing kinds carry their message; everything else is logged in
/// full and answered with a generic body.
pub fn error_response(err: &RecommendError) -> HttpResponse {
    let (status, message) = match err {
        RecommendError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        RecommendError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        RecommendError::Unavailable(_) => {
            tracing::warn!("Upstream unavailable: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "A backing store is unavailable".to_string())
        }
        RecommendError::DeadlineExceeded(_) => {
            tracing::warn!("Request deadline exceeded: {}", err);
            (StatusCode::GATEWAY_TIMEOUT, "The request took too long".to_string())
        }
        RecommendError::DataIntegrity(_) | RecommendError::Internal(_) => {
            tracing::error!("Internal error ({}): {}", err.kind(), err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    };

    HttpResponse::build(status).json(ErrorResponse {
        error: err.kind().to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Fallback for a known path hit with the wrong method
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse {
        error: "method_not_allowed".to_string(),
        message: "Method not allowed".to_string(),
        status_code: 405,
    })
}

/// JSON error for malformed payloads
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}
