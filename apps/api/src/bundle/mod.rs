//! Trained model bundle: TF-IDF transform, role encoding, match and ATS regressors.
//!
//! All four artifacts are produced together by the offline training run and carry the same
//! `bundle_version`. Loading refuses mixed versions and regressors whose fitted width does not
//! equal the width of the feature vector this service builds.

pub mod encoder;
pub mod regressor;
pub mod vectorizer;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::catalog::RoleCatalog;

pub use encoder::{EncoderArtifact, RoleEncoder};
pub use regressor::{Regressor, RegressorArtifact};
pub use vectorizer::{TfidfTransform, VectorizerArtifact};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const MATCH_MODEL_FILE: &str = "match_model.json";
pub const ATS_MODEL_FILE: &str = "ats_model.json";

/// Columns appended after the embedding block: role code, n_matching, n_total, ratio.
pub const TRAILING_FEATURES: usize = 4;

/// Errors raised while loading the bundle. Any of these leaves the service degraded.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },

    #[error("{artifact} has bundle_version '{found}', expected '{expected}'")]
    VersionMismatch {
        artifact: &'static str,
        expected: String,
        found: String,
    },

    #[error("{artifact} was fitted on {found} features but the pipeline builds {expected}")]
    WidthMismatch {
        artifact: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Failures while running the fitted transforms on a request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Role '{0}' is not in the fitted role encoding")]
    UnseenRole(String),

    #[error("Feature vector has {found} columns but {model} expects {expected}")]
    WidthMismatch {
        model: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{model} produced a non-finite prediction")]
    NonFinite { model: &'static str },
}

/// Read-only artifacts shared by every request.
#[derive(Debug)]
pub struct TrainedModelBundle {
    version: String,
    embedding: TfidfTransform,
    role_encoder: RoleEncoder,
    match_model: Box<dyn Regressor>,
    ats_model: Box<dyn Regressor>,
}

impl TrainedModelBundle {
    /// Assembles a bundle, checking both regressors against the feature width.
    pub fn from_parts(
        version: impl Into<String>,
        embedding: TfidfTransform,
        role_encoder: RoleEncoder,
        match_model: Box<dyn Regressor>,
        ats_model: Box<dyn Regressor>,
    ) -> Result<Self, BundleError> {
        let expected = embedding.width() + TRAILING_FEATURES;
        for (artifact, model) in [("match_model", &match_model), ("ats_model", &ats_model)] {
            if model.n_features() != expected {
                return Err(BundleError::WidthMismatch {
                    artifact,
                    expected,
                    found: model.n_features(),
                });
            }
        }

        Ok(Self {
            version: version.into(),
            embedding,
            role_encoder,
            match_model,
            ats_model,
        })
    }

    /// Loads all four artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, BundleError> {
        let vectorizer: VectorizerArtifact = read_artifact(dir, VECTORIZER_FILE)?;
        let version = vectorizer.bundle_version.clone();

        let encoder: EncoderArtifact = read_artifact(dir, LABEL_ENCODER_FILE)?;
        check_version("label_encoder", &version, &encoder.bundle_version)?;

        let match_model: RegressorArtifact = read_artifact(dir, MATCH_MODEL_FILE)?;
        check_version("match_model", &version, match_model.bundle_version())?;

        let ats_model: RegressorArtifact = read_artifact(dir, ATS_MODEL_FILE)?;
        check_version("ats_model", &version, ats_model.bundle_version())?;

        let bundle = Self::from_parts(
            version,
            TfidfTransform::from_artifact(vectorizer)?,
            RoleEncoder::from_artifact(encoder)?,
            match_model.into_regressor("match_model")?,
            ats_model.into_regressor("ats_model")?,
        )?;

        info!(
            bundle_version = %bundle.version,
            embedding_width = bundle.embedding.width(),
            feature_width = bundle.feature_width(),
            "Model bundle loaded from {}",
            dir.display()
        );

        Ok(bundle)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn embedding(&self) -> &TfidfTransform {
        &self.embedding
    }

    pub fn role_encoder(&self) -> &RoleEncoder {
        &self.role_encoder
    }

    pub fn match_model(&self) -> &dyn Regressor {
        self.match_model.as_ref()
    }

    pub fn ats_model(&self) -> &dyn Regressor {
        self.ats_model.as_ref()
    }

    pub fn feature_width(&self) -> usize {
        self.embedding.width() + TRAILING_FEATURES
    }

    /// Catalog roles the role encoding was not fitted on. Requests for these fail internally.
    pub fn unencoded_roles<'a>(&self, catalog: &'a RoleCatalog) -> Vec<&'a str> {
        catalog
            .role_ids()
            .filter(|role| !self.role_encoder.knows(role))
            .collect()
    }
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, BundleError> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path).map_err(|source| BundleError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| BundleError::Parse { path, source })
}

fn check_version(artifact: &'static str, expected: &str, found: &str) -> Result<(), BundleError> {
    if expected != found {
        return Err(BundleError::VersionMismatch {
            artifact,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}
