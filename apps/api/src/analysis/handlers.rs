//! Axum route handlers for the Analysis API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::AnalysisError;
use crate::errors::AppError;
use crate::models::analysis::{AnalysisRequest, AnalysisResult};
use crate::state::AppState;

/// POST /analyze
///
/// Scores a resume against a catalog role. Model availability is checked before the body is
/// even looked at; the CPU-bound pipeline runs on the blocking pool.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    if !state.analysis.models_loaded() {
        return Err(AnalysisError::Unavailable.into());
    }

    let Json(request) = payload.map_err(|rejection| {
        AnalysisError::InvalidRequest(format!("Malformed JSON payload: {}", rejection.body_text()))
    })?;

    let role_id = request.role_id.clone();
    let analysis = state.analysis.clone();
    let result = tokio::task::spawn_blocking(move || analysis.analyze(&request))
        .await
        .map_err(|join_err| AnalysisError::internal(join_err.into()))??;

    info!(
        role_id = %role_id,
        match_percentage = result.match_percentage,
        ats_score = result.ats_score,
        matched = result.matched_skills.len(),
        missing = result.missing_skills.len(),
        "Resume analysis complete"
    );

    Ok(Json(result))
}

/// GET /roles
///
/// Full role → required-skills mapping, as loaded.
pub async fn handle_roles(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "roles": state.analysis.catalog() }))
}
