//! Role catalog: role id → ordered list of required skills, loaded once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read role catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Role catalog {path} is not a valid role-to-skills mapping: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Role catalog contains an empty role id")]
    EmptyRoleId,

    #[error("Role '{0}' lists an empty skill name")]
    EmptySkill(String),
}

/// Immutable role → required-skills mapping. Skill order is the catalog order and is
/// preserved in every matched/missing list derived from it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RoleCatalog {
    roles: BTreeMap<String, Vec<String>>,
}

impl RoleCatalog {
    pub fn new(roles: BTreeMap<String, Vec<String>>) -> Result<Self, CatalogError> {
        for (role_id, skills) in &roles {
            if role_id.trim().is_empty() {
                return Err(CatalogError::EmptyRoleId);
            }
            if skills.iter().any(|skill| skill.trim().is_empty()) {
                return Err(CatalogError::EmptySkill(role_id.clone()));
            }
        }
        Ok(Self { roles })
    }

    /// Reads a `job_skills.json` style file: `{"frontend": ["React", ...], ...}`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roles: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(roles)
    }

    pub fn skills(&self, role_id: &str) -> Option<&[String]> {
        self.roles.get(role_id).map(Vec::as_slice)
    }

    pub fn role_ids(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
