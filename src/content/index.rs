//! SQLite index for entry queries
//!
//! The index sits in `.folio/.cache/index.db` and mirrors queryable
//! fields from the source-of-truth file (entries.jsonl). Invalidation is
//! based on the store file's modification time, so the index can always
//! be deleted and rebuilt.
//!
//! [`Index::select`] is the query surface: it turns a filter map into an
//! ordered identifier list. Unrecognized filters are ignored rather than
//! rejected, so callers can pass merged argument maps through untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::collection::{Id, QueryMap};
use crate::content::Entry;

/// SQLite index over the entry store
pub struct Index {
    /// Path to the SQLite database
    db_path: PathBuf,

    /// Path to the entries.jsonl file (for mtime comparison)
    entries_path: PathBuf,

    /// Database connection
    conn: Connection,
}

impl Index {
    /// Schema version - bump when schema changes to force rebuild
    const SCHEMA_VERSION: i32 = 2;

    /// Creates or opens the index for a site
    pub fn open(site_root: &Path) -> Result<Self> {
        let folio_dir = site_root.join(".folio");
        let cache_dir = folio_dir.join(".cache");
        let db_path = cache_dir.join("index.db");
        let entries_path = folio_dir.join("entries.jsonl");

        // Ensure cache directory exists
        fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open index database: {}", db_path.display()))?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let mut index = Self {
            db_path,
            entries_path,
            conn,
        };

        index.ensure_schema()?;

        Ok(index)
    }

    /// Ensures the schema is up to date
    fn ensure_schema(&mut self) -> Result<()> {
        let current_version: i32 =
            self.conn
                .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if current_version != Self::SCHEMA_VERSION {
            self.create_schema()?;
        }

        Ok(())
    }

    /// Creates the schema from scratch
    fn create_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            DROP TABLE IF EXISTS entry_tags;
            DROP TABLE IF EXISTS entries;
            DROP TABLE IF EXISTS index_meta;

            CREATE TABLE entries (
                id INTEGER PRIMARY KEY,
                slug TEXT NOT NULL,
                title TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                author TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE entry_tags (
                entry_id INTEGER NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY (entry_id, tag)
            );

            CREATE TABLE index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX idx_entries_status ON entries(status);
            CREATE INDEX idx_entries_kind ON entries(kind);
            CREATE INDEX idx_entries_author ON entries(author);
            CREATE INDEX idx_entries_created ON entries(created_at);
            CREATE INDEX idx_tags_tag ON entry_tags(tag);
            ",
        )?;

        // Set schema version
        self.conn.execute(
            &format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION),
            [],
        )?;

        Ok(())
    }

    /// Checks if the index needs to be rebuilt
    ///
    /// Stale means the store file has a newer modification time than the
    /// one recorded at the last rebuild. A missing store file is never
    /// stale.
    pub fn is_stale(&self) -> Result<bool> {
        if !self.entries_path.exists() {
            return Ok(false);
        }

        let store_mtime = fs::metadata(&self.entries_path)?.modified()?;

        Ok(store_mtime > self.indexed_mtime()?)
    }

    /// Gets the store mtime recorded at the last rebuild
    fn indexed_mtime(&self) -> Result<SystemTime> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'store_mtime'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let nanos: u128 = stored.and_then(|s| s.parse().ok()).unwrap_or(0);
        let duration = Duration::new(
            (nanos / 1_000_000_000) as u64,
            (nanos % 1_000_000_000) as u32,
        );

        Ok(SystemTime::UNIX_EPOCH + duration)
    }

    /// Records the store file's current mtime in the meta table
    fn record_store_mtime(&self) -> Result<()> {
        let nanos = match fs::metadata(&self.entries_path) {
            Ok(meta) => meta
                .modified()?
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            Err(_) => 0,
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('store_mtime', ?1)",
            params![nanos.to_string()],
        )?;

        Ok(())
    }

    /// Rebuilds the index from the entry store's contents
    pub fn rebuild(&mut self, entries: &BTreeMap<Id, Entry>) -> Result<()> {
        let tx = self.conn.transaction()?;

        // Clear existing data
        tx.execute("DELETE FROM entry_tags", [])?;
        tx.execute("DELETE FROM entries", [])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO entries (id, slug, title, kind, status, author, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for entry in entries.values() {
                stmt.execute(params![
                    entry.id.get(),
                    entry.slug,
                    entry.title,
                    entry.kind.as_str(),
                    entry.status.as_str(),
                    entry.author,
                    entry.created_at.timestamp_millis(),
                    entry.updated_at.timestamp_millis(),
                ])?;
            }
        }

        {
            let mut stmt =
                tx.prepare("INSERT INTO entry_tags (entry_id, tag) VALUES (?1, ?2)")?;

            for entry in entries.values() {
                for tag in &entry.tags {
                    stmt.execute(params![entry.id.get(), tag])?;
                }
            }
        }

        tx.commit()?;

        self.record_store_mtime()?;

        debug!("index rebuilt with {} entries", entries.len());

        Ok(())
    }

    /// Runs a filter map against the index, returning matching
    /// identifiers in order
    ///
    /// Supported filters: `status`, `kind`, `author` (exact match),
    /// `tag` (entry carries the tag), `order` (`asc` or `desc` by
    /// creation time, descending by default), and `limit` (positive
    /// count, accepted as a number or numeric string). Anything else is
    /// ignored.
    pub fn select(&self, args: &QueryMap) -> Result<Vec<Id>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();
        let mut descending = true;
        let mut limit: Option<u64> = None;

        for (key, value) in args {
            match key.as_str() {
                "status" | "kind" | "author" => match filter_text(value) {
                    Some(text) => {
                        clauses.push(format!("{} = ?", key));
                        params.push(text);
                    }
                    None => debug!("ignoring non-text value for filter {}", key),
                },
                "tag" => match filter_text(value) {
                    Some(text) => {
                        clauses.push(
                            "EXISTS (SELECT 1 FROM entry_tags \
                             WHERE entry_tags.entry_id = entries.id AND entry_tags.tag = ?)"
                                .to_string(),
                        );
                        params.push(text);
                    }
                    None => debug!("ignoring non-text value for filter tag"),
                },
                "order" => match filter_text(value).as_deref() {
                    Some("asc") => descending = false,
                    Some("desc") => descending = true,
                    other => debug!("ignoring unsupported order {:?}", other),
                },
                "limit" => match filter_count(value) {
                    Some(n) => limit = Some(n),
                    None => debug!("ignoring non-positive limit"),
                },
                _ => debug!("ignoring unsupported filter {}", key),
            }
        }

        let mut sql = String::from("SELECT id FROM entries");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let direction = if descending { "DESC" } else { "ASC" };
        sql.push_str(&format!(
            " ORDER BY created_at {direction}, id {direction}"
        ));

        // Limit was validated as an integer above, safe to inline
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let raw: Vec<i64> = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let ids = raw
            .into_iter()
            .filter_map(|v| u64::try_from(v).ok().and_then(Id::new))
            .collect();

        Ok(ids)
    }

    /// Returns the path to the index database
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

/// Extracts a filter value as text, stringifying scalars
fn filter_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extracts a positive count from a number or numeric string
fn filter_count(value: &serde_json::Value) -> Option<u64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_u64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    (n > 0).then_some(n)
}
