//! Configuration loading and representation.
//!
//! Settings come from a JSON file when one is given, otherwise from the
//! `BASAR_*` environment variables, with defaults for everything missing.

use std::fs;
use std::path::Path;

use thiserror::Error;

use basar_core::{DomainError, Settings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(#[from] DomainError),
}

/// Parse and validate a JSON settings document. Missing keys take defaults.
pub fn from_json(json: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(json)?;
    settings.validate()?;
    Ok(settings)
}

pub fn from_file(path: &Path) -> Result<Settings, ConfigError> {
    let settings = from_json(&fs::read_to_string(path)?)?;
    tracing::info!(path = %path.display(), "settings loaded from file");
    Ok(settings)
}

pub fn from_env() -> Result<Settings, ConfigError> {
    let settings = Settings::from_lookup(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

/// File settings when `path` is given, environment settings otherwise.
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match path {
        Some(path) => from_file(path)?,
        None => from_env()?,
    };
    tracing::debug!(
        deduction = %settings.deduction_percentage,
        sellers = ?settings.seller_range,
        articles = ?settings.article_range,
        cash_point = %settings.cash_point,
        "settings"
    );
    Ok(settings)
}
