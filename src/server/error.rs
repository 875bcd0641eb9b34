use crate::orchestrator::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::warn;
use serde::Serialize;

/// Error body returned to HTTP callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!("Request failed ({}): {}", status, self.0);

        let body = serde_json::json!({
            "error": ErrorBody {
                code: self.0.code().to_string(),
                message: self.0.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}
