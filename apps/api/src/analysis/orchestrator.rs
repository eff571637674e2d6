//! Analysis orchestration: entry checks, then match → features → scores → feedback.

use std::collections::HashMap;

use anyhow::Context;
use tracing::debug;

use crate::analysis::error::AnalysisError;
use crate::analysis::features::build_features;
use crate::analysis::feedback::synthesize;
use crate::analysis::predictor::predict_scores;
use crate::analysis::skill_matcher::SkillMatcher;
use crate::bundle::TrainedModelBundle;
use crate::catalog::RoleCatalog;
use crate::models::analysis::{AnalysisRequest, AnalysisResult};

/// Reported as `modelType` on every result.
pub const MODEL_TYPE: &str = "xgboost";

/// Process-wide, read-only analysis state: the role catalog, a compiled skill matcher per
/// role, and the model bundle (absent when it failed to load).
#[derive(Debug)]
pub struct AnalysisContext {
    catalog: RoleCatalog,
    matchers: HashMap<String, SkillMatcher>,
    bundle: Option<TrainedModelBundle>,
}

impl AnalysisContext {
    pub fn new(
        catalog: RoleCatalog,
        bundle: Option<TrainedModelBundle>,
    ) -> Result<Self, regex::Error> {
        let matchers = catalog
            .role_ids()
            .map(|role| {
                let skills = catalog.skills(role).unwrap_or_default();
                Ok::<_, regex::Error>((role.to_string(), SkillMatcher::new(skills)?))
            })
            .collect::<Result<HashMap<_, _>, regex::Error>>()?;

        Ok(Self {
            catalog,
            matchers,
            bundle,
        })
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn bundle(&self) -> Option<&TrainedModelBundle> {
        self.bundle.as_ref()
    }

    pub fn models_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    /// Runs one analysis. Entry checks short-circuit in order: bundle, required fields,
    /// known role. Only then does any text processing happen.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let bundle = self.bundle.as_ref().ok_or(AnalysisError::Unavailable)?;

        if request.resume_text.trim().is_empty() || request.role_id.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest(
                "Missing required fields: resumeText and roleId".to_string(),
            ));
        }

        let matcher = self
            .matchers
            .get(&request.role_id)
            .ok_or_else(|| AnalysisError::UnknownRole(request.role_id.clone()))?;

        run_pipeline(bundle, matcher, request).map_err(AnalysisError::internal)
    }
}

fn run_pipeline(
    bundle: &TrainedModelBundle,
    matcher: &SkillMatcher,
    request: &AnalysisRequest,
) -> anyhow::Result<AnalysisResult> {
    let skills = matcher.match_text(&request.resume_text);
    debug!(
        role_id = %request.role_id,
        matched = skills.n_matching_skills,
        total = skills.n_total_skills,
        ratio = skills.skill_match_ratio,
        "Skills matched"
    );

    let features = build_features(bundle, &request.resume_text, &request.role_id, &skills)
        .with_context(|| format!("Feature extraction failed for role '{}'", request.role_id))?;

    let scores = predict_scores(bundle, &features).context("Score prediction failed")?;

    let feedback = synthesize(
        &skills.matched_skills,
        &skills.missing_skills,
        &scores,
        &request.role_name,
    );

    Ok(AnalysisResult {
        match_percentage: scores.match_percentage,
        ats_score: scores.ats_score,
        matched_skills: skills.matched_skills,
        missing_skills: skills.missing_skills,
        suggestions: feedback.suggestions,
        detailed_feedback: feedback.detailed_feedback,
        model_type: MODEL_TYPE,
        is_ai_powered: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures::{bundle_with, catalog, ratio_bundle, CountingRegressor};

    fn request(text: &str, role_id: &str, role_name: &str) -> AnalysisRequest {
        AnalysisRequest {
            resume_text: text.to_string(),
            role_id: role_id.to_string(),
            role_name: role_name.to_string(),
        }
    }

    fn counting_context() -> (AnalysisContext, CountingRegressor, CountingRegressor) {
        let match_model = CountingRegressor::new(85.0);
        let ats_model = CountingRegressor::new(65.0);
        let bundle = bundle_with(Box::new(match_model.clone()), Box::new(ats_model.clone()));
        let context = AnalysisContext::new(catalog(), Some(bundle)).unwrap();
        (context, match_model, ats_model)
    }

    #[test]
    fn test_frontend_scenario() {
        let context = AnalysisContext::new(catalog(), Some(ratio_bundle())).unwrap();
        let result = context
            .analyze(&request(
                "Frontend engineer. Skills: React, JavaScript, TypeScript. Redux experience.",
                "frontend",
                "Frontend Developer",
            ))
            .unwrap();

        assert_eq!(result.matched_skills, ["React", "JavaScript", "TypeScript"]);
        assert_eq!(result.missing_skills, ["HTML", "CSS"]);
        // ratio 0.6 → match 60, ATS 70
        assert_eq!(result.match_percentage, 60.0);
        assert_eq!(result.ats_score, 70.0);
        assert_eq!(result.model_type, "xgboost");
        assert!(result.is_ai_powered);
        assert_eq!(
            result.suggestions[0],
            "Add experience with key technologies: HTML, CSS."
        );
        assert!(result
            .detailed_feedback
            .starts_with("Your resume shows good potential for the Frontend Developer position"));
    }

    #[test]
    fn test_full_match_omits_improvement_sentence() {
        let context = AnalysisContext::new(catalog(), Some(ratio_bundle())).unwrap();
        let result = context
            .analyze(&request(
                "React JavaScript TypeScript HTML CSS",
                "frontend",
                "Frontend Developer",
            ))
            .unwrap();

        assert!(result.missing_skills.is_empty());
        assert!(!result
            .detailed_feedback
            .contains("consider gaining experience in"));
        // ATS raw 110 is clamped
        assert_eq!(result.ats_score, 100.0);
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn test_unavailable_short_circuits_everything() {
        let context = AnalysisContext::new(catalog(), None).unwrap();
        let err = context.analyze(&request("", "", "")).unwrap_err();
        assert!(matches!(err, AnalysisError::Unavailable));
        assert!(!context.models_loaded());
    }

    #[test]
    fn test_missing_fields_are_invalid_request() {
        let (context, match_model, _) = counting_context();
        for req in [
            request("", "frontend", "Frontend"),
            request("   \n", "frontend", "Frontend"),
            request("React", "", "Frontend"),
        ] {
            let err = context.analyze(&req).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidRequest(_)), "{err:?}");
        }
        assert_eq!(match_model.calls(), 0);
    }

    #[test]
    fn test_unknown_role_rejected_before_feature_computation() {
        let (context, match_model, ats_model) = counting_context();
        let err = context
            .analyze(&request("Rust and Go", "astronaut", "Astronaut"))
            .unwrap_err();

        assert!(matches!(err, AnalysisError::UnknownRole(role) if role == "astronaut"));
        assert_eq!(match_model.calls(), 0);
        assert_eq!(ats_model.calls(), 0);
    }

    #[test]
    fn test_catalog_model_mismatch_is_internal_failure() {
        let (context, match_model, _) = counting_context();
        // "mobile" is in the catalog but the role encoding was never fitted on it.
        let err = context
            .analyze(&request("Swift and Kotlin apps", "mobile", "Mobile Developer"))
            .unwrap_err();

        match err {
            AnalysisError::Internal { summary, .. } => {
                assert_eq!(summary, "Feature extraction failed for role 'mobile'")
            }
            other => panic!("expected Internal, got {other:?}"),
        }
        assert_eq!(match_model.calls(), 0);
    }

    #[test]
    fn test_each_model_called_once_per_request() {
        let (context, match_model, ats_model) = counting_context();
        let result = context
            .analyze(&request("Python, SQL and Docker", "backend", "Backend Engineer"))
            .unwrap();

        assert_eq!(match_model.calls(), 1);
        assert_eq!(ats_model.calls(), 1);
        assert_eq!(result.match_percentage, 85.0);
        assert_eq!(result.ats_score, 65.0);
        assert_eq!(result.matched_skills, ["Python", "SQL", "Docker"]);
        assert_eq!(result.missing_skills, ["Java"]);
        assert!(result
            .detailed_feedback
            .ends_with("Consider adding more industry keywords to improve ATS compatibility."));
    }

    #[test]
    fn test_identical_requests_give_identical_results() {
        let context = AnalysisContext::new(catalog(), Some(ratio_bundle())).unwrap();
        let req = request(
            "Senior engineer: TypeScript, CSS, Webpack, Jest. Some HTML.",
            "frontend",
            "Frontend Developer",
        );
        assert_eq!(context.analyze(&req).unwrap(), context.analyze(&req).unwrap());
    }

    #[test]
    fn test_partition_holds_for_every_catalog_role() {
        let context = AnalysisContext::new(catalog(), Some(ratio_bundle())).unwrap();
        let text = "React, Python, Swift, SQL and some CSS";
        for role in ["frontend", "backend"] {
            let result = context.analyze(&request(text, role, role)).unwrap();
            let required = context.catalog().skills(role).unwrap();
            assert_eq!(
                result.matched_skills.len() + result.missing_skills.len(),
                required.len()
            );
            assert!(required.iter().all(|s| {
                result.matched_skills.contains(s) != result.missing_skills.contains(s)
            }));
        }
    }
}
