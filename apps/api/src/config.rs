use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub models_dir: PathBuf,
    pub role_catalog_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let models_dir = PathBuf::from(env_or("MODELS_DIR", "models"));
        let role_catalog_path = std::env::var("ROLE_CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| models_dir.join("job_skills.json"));

        Ok(Config {
            port: env_or("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            models_dir,
            role_catalog_path,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
