//! Site configuration
//!
//! Configuration is stored in `.folio/site.toml`. Every field has a
//! default, so a missing or partial file is fine.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Listing direction by creation time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Site-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title
    pub title: String,

    /// Entries per listing page
    pub per_page: usize,

    /// Default listing direction
    pub order: SortOrder,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Untitled site".to_string(),
            per_page: 10,
            order: SortOrder::Desc,
        }
    }
}

impl SiteConfig {
    /// Loads the configuration for a site, falling back to defaults when
    /// no file exists
    pub fn load(site_root: &Path) -> Result<Self> {
        let config_path = site_root.join(".folio").join("site.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read site config: {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse site config")?;

        config.validate()?;

        Ok(config)
    }

    /// Checks field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 {
            return Err(ConfigError::Invalid(
                "per_page must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
