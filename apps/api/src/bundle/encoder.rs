use serde::Deserialize;

use crate::bundle::{BundleError, InferenceError};

/// On-disk form of `label_encoder.json`.
#[derive(Debug, Deserialize)]
pub struct EncoderArtifact {
    pub bundle_version: String,
    pub classes: Vec<String>,
}

/// Fitted role → numeric code table. Classes are sorted; the code is the class index.
#[derive(Debug, Clone)]
pub struct RoleEncoder {
    classes: Vec<String>,
}

impl RoleEncoder {
    pub fn from_artifact(artifact: EncoderArtifact) -> Result<Self, BundleError> {
        if artifact.classes.is_empty() {
            return Err(BundleError::Invalid {
                artifact: "label_encoder",
                reason: "no classes".to_string(),
            });
        }
        if artifact.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(BundleError::Invalid {
                artifact: "label_encoder",
                reason: "classes must be sorted and unique".to_string(),
            });
        }
        Ok(Self {
            classes: artifact.classes,
        })
    }

    pub fn encode(&self, role_id: &str) -> Result<f64, InferenceError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(role_id))
            .map(|index| index as f64)
            .map_err(|_| InferenceError::UnseenRole(role_id.to_string()))
    }

    pub fn knows(&self, role_id: &str) -> bool {
        self.encode(role_id).is_ok()
    }
}
