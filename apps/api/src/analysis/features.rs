//! Feature assembly. Column order is fixed by the offline training run:
//! `[tf-idf block, role code, n_matching_skills, n_total_skills, skill_match_ratio]`.

use crate::analysis::skill_matcher::SkillMatchResult;
use crate::bundle::{InferenceError, TrainedModelBundle, TRAILING_FEATURES};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(columns: Vec<f64>) -> Self {
        Self(columns)
    }
}

pub fn build_features(
    bundle: &TrainedModelBundle,
    resume_text: &str,
    role_id: &str,
    skills: &SkillMatchResult,
) -> Result<FeatureVector, InferenceError> {
    let role_code = bundle.role_encoder().encode(role_id)?;

    let mut columns = bundle.embedding().transform(resume_text);
    columns.reserve_exact(TRAILING_FEATURES);
    columns.push(role_code);
    columns.push(skills.n_matching_skills as f64);
    columns.push(skills.n_total_skills as f64);
    columns.push(skills.skill_match_ratio);

    Ok(FeatureVector(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures::{ratio_bundle, FEATURE_WIDTH};

    fn skills(matched: usize, total: usize, ratio: f64) -> SkillMatchResult {
        SkillMatchResult {
            matched_skills: vec![],
            missing_skills: vec![],
            n_matching_skills: matched,
            n_total_skills: total,
            skill_match_ratio: ratio,
        }
    }

    #[test]
    fn test_column_order() {
        let bundle = ratio_bundle();
        let features =
            build_features(&bundle, "React experience", "frontend", &skills(3, 7, 0.6)).unwrap();

        assert_eq!(features.len(), FEATURE_WIDTH);
        let tail = &features.as_slice()[FEATURE_WIDTH - 4..];
        assert_eq!(tail, [1.0, 3.0, 7.0, 0.6]);
    }

    #[test]
    fn test_embedding_block_comes_first() {
        let bundle = ratio_bundle();
        let features = build_features(&bundle, "react", "backend", &skills(0, 0, 0.0)).unwrap();
        // "react" is vocabulary column 0; one term → unit weight after L2 normalisation.
        assert_eq!(features.as_slice()[0], 1.0);
        assert!(features.as_slice()[1..8].iter().all(|&v| v == 0.0));
        assert_eq!(features.as_slice()[8], 0.0);
    }

    #[test]
    fn test_unseen_role_is_hard_error() {
        let bundle = ratio_bundle();
        let err = build_features(&bundle, "Swift", "mobile", &skills(1, 1, 0.5)).unwrap_err();
        assert!(matches!(err, InferenceError::UnseenRole(role) if role == "mobile"));
    }

    #[test]
    fn test_deterministic() {
        let bundle = ratio_bundle();
        let s = skills(2, 4, 0.4);
        let text = "TypeScript and CSS experience, more CSS";
        assert_eq!(
            build_features(&bundle, text, "frontend", &s).unwrap(),
            build_features(&bundle, text, "frontend", &s).unwrap()
        );
    }
}
