use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Analysis(err) => match err {
                AnalysisError::Unavailable => {
                    tracing::warn!("Analysis rejected: model bundle not loaded");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "MODELS_UNAVAILABLE",
                        err.to_string(),
                        None,
                    )
                }
                AnalysisError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.to_string(), None)
                }
                AnalysisError::UnknownRole(_) => {
                    (StatusCode::BAD_REQUEST, "UNKNOWN_ROLE", err.to_string(), None)
                }
                // Already logged with full detail at the orchestrator boundary.
                AnalysisError::Internal {
                    incident_id,
                    summary,
                } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                    Some(format!("{summary} (incident {incident_id})")),
                ),
            },
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}
