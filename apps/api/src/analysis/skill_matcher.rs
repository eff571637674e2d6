//! Skill matching: which of a role's required skills a resume mentions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Regex, RegexSet};

/// Capitalized words, optionally with a dotted suffix ("Python", "Node.js").
static CAPITALIZED_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\.[a-z]+)?").expect("capitalized term pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatchResult {
    /// Required skills found in the text, in catalog order.
    pub matched_skills: Vec<String>,
    /// Required skills not found, in catalog order.
    pub missing_skills: Vec<String>,
    pub n_matching_skills: usize,
    /// Rough count of distinct skills mentioned. Never below `n_matching_skills`.
    pub n_total_skills: usize,
    /// `n_matching_skills / |required|`, 0.0 for an empty requirement list.
    pub skill_match_ratio: f64,
}

/// Whole-word, case-insensitive matcher for one role's required skills.
///
/// A skill matches only when bounded by non-word characters or the ends of the text, so
/// "Java" never matches inside "JavaScript" while "CI/CD" and "Node.js" still match as written.
#[derive(Debug, Clone)]
pub struct SkillMatcher {
    skills: Vec<String>,
    patterns: RegexSet,
}

impl SkillMatcher {
    pub fn new(skills: &[String]) -> Result<Self, regex::Error> {
        let patterns = RegexSet::new(skills.iter().map(|skill| {
            format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(skill.trim()))
        }))?;
        Ok(Self {
            skills: skills.to_vec(),
            patterns,
        })
    }

    pub fn match_text(&self, text: &str) -> SkillMatchResult {
        let hits = self.patterns.matches(text);

        let mut matched_skills = Vec::new();
        let mut missing_skills = Vec::new();
        for (index, skill) in self.skills.iter().enumerate() {
            if hits.matched(index) {
                matched_skills.push(skill.clone());
            } else {
                missing_skills.push(skill.clone());
            }
        }

        let n_matching_skills = matched_skills.len();
        let skill_match_ratio = if self.skills.is_empty() {
            0.0
        } else {
            n_matching_skills as f64 / self.skills.len() as f64
        };

        SkillMatchResult {
            n_total_skills: count_capitalized_terms(text).max(n_matching_skills),
            matched_skills,
            missing_skills,
            n_matching_skills,
            skill_match_ratio,
        }
    }
}

/// Number of distinct capitalized terms in `text`. An approximate proxy for how many skills
/// the resume mentions overall.
pub fn count_capitalized_terms(text: &str) -> usize {
    CAPITALIZED_TERM
        .find_iter(text)
        .map(|m| m.as_str())
        .collect::<HashSet<_>>()
        .len()
}
