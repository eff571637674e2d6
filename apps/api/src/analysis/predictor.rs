use crate::analysis::features::FeatureVector;
use crate::bundle::{InferenceError, Regressor, TrainedModelBundle};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Both scores clamped to [0, 100] and rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePair {
    pub match_percentage: f64,
    pub ats_score: f64,
}

pub fn predict_scores(
    bundle: &TrainedModelBundle,
    features: &FeatureVector,
) -> Result<ScorePair, InferenceError> {
    Ok(ScorePair {
        match_percentage: predict_one("match_model", bundle.match_model(), features)?,
        ats_score: predict_one("ats_model", bundle.ats_model(), features)?,
    })
}

fn predict_one(
    model_name: &'static str,
    model: &dyn Regressor,
    features: &FeatureVector,
) -> Result<f64, InferenceError> {
    if features.len() != model.n_features() {
        return Err(InferenceError::WidthMismatch {
            model: model_name,
            expected: model.n_features(),
            found: features.len(),
        });
    }

    let raw = model.predict(features.as_slice());
    if !raw.is_finite() {
        return Err(InferenceError::NonFinite { model: model_name });
    }

    Ok(round_one_decimal(raw.clamp(MIN_SCORE, MAX_SCORE)))
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
