//! TF-IDF text embedding with a vocabulary fitted offline.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::bundle::BundleError;

/// Tokens of two or more word characters, as the fitted vectorizer saw them.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L2,
}

/// On-disk form of `vectorizer.json`.
#[derive(Debug, Deserialize)]
pub struct VectorizerArtifact {
    pub bundle_version: String,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Fitted TF-IDF transform. Width is fixed by the fitted vocabulary; terms outside it
/// contribute nothing.
#[derive(Debug, Clone)]
pub struct TfidfTransform {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TfidfTransform {
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, BundleError> {
        let width = artifact.idf.len();
        if width == 0 {
            return Err(BundleError::Invalid {
                artifact: "vectorizer",
                reason: "empty vocabulary".to_string(),
            });
        }
        if artifact.vocabulary.len() != width {
            return Err(BundleError::Invalid {
                artifact: "vectorizer",
                reason: format!(
                    "vocabulary has {} terms but idf has {} weights",
                    artifact.vocabulary.len(),
                    width
                ),
            });
        }

        let mut seen = vec![false; width];
        for (term, &column) in &artifact.vocabulary {
            if column >= width || std::mem::replace(&mut seen[column], true) {
                return Err(BundleError::Invalid {
                    artifact: "vectorizer",
                    reason: format!("term '{term}' has invalid or duplicate column {column}"),
                });
            }
        }
        if let Some(bad) = artifact.idf.iter().find(|w| !w.is_finite()) {
            return Err(BundleError::Invalid {
                artifact: "vectorizer",
                reason: format!("non-finite idf weight {bad}"),
            });
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    pub fn width(&self) -> usize {
        self.idf.len()
    }

    /// Dense TF-IDF row for `text`.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let lowered = text.to_lowercase();
        let mut row = vec![0.0_f64; self.width()];

        for token in TOKEN_PATTERN.find_iter(&lowered) {
            if let Some(&column) = self.vocabulary.get(token.as_str()) {
                row[column] += 1.0;
            }
        }

        for (column, value) in row.iter_mut().enumerate() {
            if *value == 0.0 {
                continue;
            }
            let tf = if self.sublinear_tf {
                1.0 + value.ln()
            } else {
                *value
            };
            *value = tf * self.idf[column];
        }

        if self.norm == Some(Norm::L2) {
            let length = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if length > 0.0 {
                row.iter_mut().for_each(|v| *v /= length);
            }
        }

        row
    }
}
