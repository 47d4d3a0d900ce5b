//! JSONL storage for entries
//!
//! Entries are stored in `.folio/entries.jsonl` with one JSON object per
//! line. Uses file locking for concurrent access safety; later lines win
//! when an identifier repeats, so appends act as updates until the next
//! compacting rewrite.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::debug;

use crate::collection::Id;
use crate::content::Entry;

/// Store for entry data in JSONL format
pub struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    /// Creates a new entry store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a site
    pub fn for_site(site_root: &Path) -> Self {
        Self::new(site_root.join(".folio").join("entries.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all entries from the store, keyed and ordered by identifier
    pub fn read_all(&self) -> Result<BTreeMap<Id, Entry>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open entry store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on entry store")?;

        let reader = BufReader::new(&file);
        let mut entries = BTreeMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: Entry = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse entry at line {}", line_num + 1))?;

            entries.insert(entry.id, entry);
        }

        // Lock is released when file is dropped
        Ok(entries)
    }

    /// Loads a single entry by identifier
    ///
    /// Returns `Ok(None)` when the store has no entry under that
    /// identifier; only I/O and parse problems are errors.
    pub fn load(&self, id: Id) -> Result<Option<Entry>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open entry store: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on entry store")?;

        let reader = BufReader::new(&file);
        let mut found = None;

        // Scan the whole file: a later line for the same id supersedes
        // an earlier one.
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: Entry = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse entry at line {}", line_num + 1))?;

            if entry.id == id {
                found = Some(entry);
            }
        }

        Ok(found)
    }

    /// Writes all entries to the store (full rewrite)
    pub fn write_all(&self, entries: &BTreeMap<Id, Entry>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on entry store")?;

            let mut writer = BufWriter::new(&file);

            // BTreeMap iteration is already identifier-ordered
            for entry in entries.values() {
                let line = serde_json::to_string(entry).context("Failed to serialize entry")?;
                writeln!(writer, "{}", line).context("Failed to write entry")?;
            }

            writer.flush().context("Failed to flush entry store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!("wrote {} entries to {}", entries.len(), self.path.display());

        Ok(())
    }

    /// Appends a single entry (used for quick saves without full rewrite)
    pub fn append(&self, entry: &Entry) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open entry store: {}", self.path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .context("Failed to acquire write lock on entry store")?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(entry).context("Failed to serialize entry")?;
        writeln!(writer, "{}", line).context("Failed to write entry")?;

        writer.flush().context("Failed to flush entry store")?;

        Ok(())
    }

    /// Saves a single entry (reads all, replaces, writes all)
    pub fn save(&self, entry: &Entry) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(entry.id, entry.clone());
        self.write_all(&entries)
    }

    /// Removes an entry by identifier
    pub fn remove(&self, id: Id) -> Result<bool> {
        let mut entries = self.read_all()?;
        let removed = entries.remove(&id).is_some();
        if removed {
            self.write_all(&entries)?;
        }
        Ok(removed)
    }

    /// Compacts the store (removes superseded lines, rewrites clean)
    pub fn compact(&self) -> Result<usize> {
        let entries = self.read_all()?;
        let count = entries.len();
        self.write_all(&entries)?;
        Ok(count)
    }

    /// Allocates the next free identifier
    pub fn next_id(&self) -> Result<Id> {
        let entries = self.read_all()?;
        let next = match entries.keys().next_back() {
            Some(last) => last.get().checked_add(1),
            None => Some(1),
        };

        next.and_then(Id::new)
            .context("Entry identifier space exhausted")
    }

    /// Creates a new draft entry with a fresh identifier and appends it
    pub fn create(&self, title: impl Into<String>, author: impl Into<String>) -> Result<Entry> {
        let mut entry = Entry::new(self.next_id()?, title);
        entry.set_author(author);
        self.append(&entry)?;
        Ok(entry)
    }
}
