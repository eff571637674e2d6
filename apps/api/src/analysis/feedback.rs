//! Feedback synthesis: ranked suggestions and a narrative built from the match and scores.
//!
//! Thresholds and list limits are fixed so the same inputs always read the same way.

use crate::analysis::predictor::ScorePair;

pub const MAX_SUGGESTIONS: usize = 5;
pub const SUGGESTED_MISSING_SKILLS: usize = 3;
pub const LISTED_STRENGTHS: usize = 5;
pub const LISTED_GAPS: usize = 5;

pub const STRONG_MATCH_THRESHOLD: f64 = 80.0;
pub const GOOD_MATCH_THRESHOLD: f64 = 60.0;
pub const ATS_OPTIMIZED_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub suggestions: Vec<String>,
    pub detailed_feedback: String,
}

pub fn synthesize(
    matched_skills: &[String],
    missing_skills: &[String],
    scores: &ScorePair,
    role_name: &str,
) -> Feedback {
    Feedback {
        suggestions: generate_suggestions(matched_skills, missing_skills, role_name),
        detailed_feedback: build_detailed_feedback(
            scores,
            matched_skills,
            missing_skills,
            role_name,
        ),
    }
}

/// Actionable suggestions, most specific first, capped at `MAX_SUGGESTIONS`.
pub fn generate_suggestions(
    matched_skills: &[String],
    missing_skills: &[String],
    role_name: &str,
) -> Vec<String> {
    let mut suggestions = Vec::with_capacity(MAX_SUGGESTIONS);

    if !missing_skills.is_empty() {
        suggestions.push(format!(
            "Add experience with key technologies: {}.",
            join_first(missing_skills, SUGGESTED_MISSING_SKILLS)
        ));
    }

    if matched_skills.len() < missing_skills.len() {
        suggestions.push(format!(
            "Strengthen your {role_name} skills portfolio by learning more required technologies"
        ));
    }

    suggestions.push(
        "Include specific project examples demonstrating your technical skills".to_string(),
    );
    suggestions.push(
        "Add metrics and quantifiable achievements to your experience section".to_string(),
    );
    suggestions.push(
        "Ensure your resume uses industry-standard keywords for better ATS compatibility"
            .to_string(),
    );

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Narrative assessment: overall tier, strengths, gaps, ATS tier.
pub fn build_detailed_feedback(
    scores: &ScorePair,
    matched_skills: &[String],
    missing_skills: &[String],
    role_name: &str,
) -> String {
    let mut sentences = Vec::with_capacity(4);

    sentences.push(if scores.match_percentage >= STRONG_MATCH_THRESHOLD {
        format!(
            "Your resume shows strong alignment with the {role_name} position. \
             You demonstrate proficiency in most required skills."
        )
    } else if scores.match_percentage >= GOOD_MATCH_THRESHOLD {
        format!(
            "Your resume shows good potential for the {role_name} position, \
             with room for improvement in certain areas."
        )
    } else {
        format!(
            "Your resume currently shows a moderate match for the {role_name} position. \
             Consider strengthening your technical skill set."
        )
    });

    if !matched_skills.is_empty() {
        sentences.push(format!(
            "Your strengths include: {}.",
            join_first(matched_skills, LISTED_STRENGTHS)
        ));
    }

    if !missing_skills.is_empty() {
        sentences.push(format!(
            "To improve your candidacy, consider gaining experience in: {}.",
            join_first(missing_skills, LISTED_GAPS)
        ));
    }

    sentences.push(if scores.ats_score >= ATS_OPTIMIZED_THRESHOLD {
        "Your resume is well-optimized for Applicant Tracking Systems.".to_string()
    } else {
        "Consider adding more industry keywords to improve ATS compatibility.".to_string()
    });

    sentences.join(" ")
}

fn join_first(items: &[String], limit: usize) -> String {
    items
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
