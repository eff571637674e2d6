use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus whether the model bundle loaded; the service stays up without it.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let bundle = state.analysis.bundle();
    Json(json!({
        "status": "healthy",
        "models_loaded": bundle.is_some(),
        "version": env!("CARGO_PKG_VERSION"),
        "bundle_version": bundle.map(|b| b.version()),
    }))
}
