//! # Content Host
//!
//! The reference host the collections run against: a local-first content
//! store with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Entries | JSONL (one JSON per line) | `.folio/entries.jsonl` |
//! | Config | TOML | `.folio/site.toml` |
//! | Index | SQLite (auto-regenerated) | `.folio/.cache/index.db` |
//!
//! ## Concurrency Safety
//!
//! - [`EntryStore`] uses file locking (`fs2`) for concurrent access
//! - [`Index`] uses mtime-based invalidation against the store file
//! - All store writes are atomic (temp file + rename)
//!
//! ## Site Structure
//!
//! ```text
//! .folio/
//! ├── entries.jsonl         # All entries, source of truth
//! ├── site.toml             # Site configuration
//! ├── .cache/
//! │   └── index.db          # Query index (auto-generated)
//! └── .gitignore            # Ignores the cache
//! ```
//!
//! ## Key Types
//!
//! - [`Site`] - Entry point for accessing a folio site
//! - [`EntryStore`] - Read/write entries as JSONL
//! - [`Index`] - Resolve filter maps to identifier lists
//! - [`SiteConfig`] - Site configuration with defaults

mod config;
mod entry;
mod index;
mod site;
mod store;

pub use config::{ConfigError, SiteConfig, SortOrder};
pub use entry::{slugify, Entry, EntryKind, EntryMeta, EntryStatus};
pub use index::Index;
pub use site::{Site, SiteError};
pub use store::EntryStore;
