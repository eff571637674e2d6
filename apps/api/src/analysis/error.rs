use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Every way an analysis can fail. Callers branch on the variant; nothing else escapes the
/// orchestrator.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The model bundle did not load at startup. Persists until restart.
    #[error("Models not loaded. Restart the service with a valid model bundle")]
    Unavailable,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid role ID: {0}")]
    UnknownRole(String),

    /// Unexpected pipeline failure. `summary` is safe to show callers; the full cause chain
    /// is only logged, under `incident_id`.
    #[error("Internal server error during analysis")]
    Internal { incident_id: Uuid, summary: String },
}

impl AnalysisError {
    /// Logs `err` with its full cause chain and converts it to `Internal`.
    pub fn internal(err: anyhow::Error) -> Self {
        let incident_id = Uuid::new_v4();
        error!(%incident_id, error = ?err, "Analysis failed: {err:#}");
        AnalysisError::Internal {
            incident_id,
            summary: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_internal_summary_is_outermost_context() {
        let err = Err::<(), _>(anyhow::anyhow!("Role 'mobile' is not in the fitted role encoding"))
            .context("Feature extraction failed")
            .unwrap_err();
        match AnalysisError::internal(err) {
            AnalysisError::Internal { summary, .. } => {
                assert_eq!(summary, "Feature extraction failed")
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn test_incident_ids_are_unique() {
        let ids: Vec<Uuid> = (0..2)
            .map(|_| match AnalysisError::internal(anyhow::anyhow!("boom")) {
                AnalysisError::Internal { incident_id, .. } => incident_id,
                _ => unreachable!(),
            })
            .collect();
        assert_ne!(ids[0], ids[1]);
    }
}
