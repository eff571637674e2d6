use std::sync::Arc;

use crate::analysis::AnalysisContext;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Role catalog + model bundle. Immutable after startup, so handlers share it without locks.
    pub analysis: Arc<AnalysisContext>,
}
