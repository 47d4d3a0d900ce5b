//! Site management
//!
//! Handles site initialization and provides access to the entry store
//! and the query index.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use super::{EntryStore, Index, SiteConfig};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("No site found at {0} (missing .folio directory)")]
    NotASite(PathBuf),
    #[error("No site found in {0} or any parent directory")]
    NotInSite(PathBuf),
}

/// A folio site
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
}

impl Site {
    /// Opens an existing site at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let folio_dir = root.join(".folio");

        if !folio_dir.is_dir() {
            return Err(SiteError::NotASite(root).into());
        }

        let config = SiteConfig::load(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the site containing the given path, walking up parent
    /// directories until a `.folio` directory is found
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        let mut current = start.to_path_buf();

        loop {
            if current.join(".folio").is_dir() {
                return Self::open(current);
            }

            if !current.pop() {
                return Err(SiteError::NotInSite(start.to_path_buf()).into());
            }
        }
    }

    /// Initializes a new site at the given path
    ///
    /// Safe to call on an existing site; present files are left alone.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let folio_dir = root.join(".folio");

        fs::create_dir_all(&folio_dir).with_context(|| {
            format!("Failed to create .folio directory: {}", folio_dir.display())
        })?;

        let cache_dir = folio_dir.join(".cache");
        fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        // Create default config
        let config_path = folio_dir.join("site.toml");
        if !config_path.exists() {
            let default_config = r#"# Folio site configuration

# Site title
title = "Untitled site"

# Entries per listing page
per_page = 10

# Default listing direction by creation time ("asc" or "desc")
order = "desc"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        // Create .gitignore for .folio
        let gitignore_path = folio_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Ignore SQLite index (regenerated from entries.jsonl)
.cache/
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        debug!("initialized site at {}", root.display());

        Self::open(root)
    }

    /// Returns the site root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .folio directory path
    pub fn folio_dir(&self) -> PathBuf {
        self.root.join(".folio")
    }

    /// Returns the configuration
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Returns the entry store
    pub fn entries(&self) -> EntryStore {
        EntryStore::for_site(&self.root)
    }

    /// Opens the query index for this site
    pub fn index(&self) -> Result<Index> {
        Index::open(&self.root)
    }

    /// Rebuilds the query index from the entry store
    pub fn rebuild_index(&self) -> Result<()> {
        let mut index = self.index()?;
        let entries = self.entries().read_all()?;
        index.rebuild(&entries)?;
        Ok(())
    }

    /// Opens the index, rebuilding it first if the store has changed
    pub fn fresh_index(&self) -> Result<Index> {
        let mut index = self.index()?;

        if index.is_stale()? {
            debug!("index is stale, rebuilding from entry store");
            let entries = self.entries().read_all()?;
            index.rebuild(&entries)?;
        }

        Ok(index)
    }
}
