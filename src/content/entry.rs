//! Entry domain model
//!
//! Entries are the content units of a site: posts and pages with a
//! lifecycle status, an author, free-form tags, and extensible metadata.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Id;

/// What kind of content an entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Post,
    Page,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Post => "post",
            EntryKind::Page => "page",
        }
    }
}

/// Lifecycle status of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl EntryStatus {
    /// Returns true if the entry is publicly visible
    pub fn is_published(&self) -> bool {
        matches!(self, EntryStatus::Published)
    }

    /// Returns true if the entry is still being written
    pub fn is_draft(&self) -> bool {
        matches!(self, EntryStatus::Draft)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Published => "published",
            EntryStatus::Archived => "archived",
        }
    }
}

/// Metadata for an entry - extensible key-value pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta(HashMap<String, serde_json::Value>);

impl EntryMeta {
    /// Creates empty metadata
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Gets a value by key
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Sets a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.0.remove(key)
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all key-value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// A content entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, allocated by the store
    pub id: Id,

    /// Human-readable title
    pub title: String,

    /// URL-safe slug derived from the title at creation
    pub slug: String,

    /// Post or page
    #[serde(default)]
    pub kind: EntryKind,

    /// Current lifecycle status
    #[serde(default)]
    pub status: EntryStatus,

    /// Optional author handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated
    pub updated_at: DateTime<Utc>,

    /// Entry body (markdown)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    /// Extensible metadata
    #[serde(default, skip_serializing_if = "EntryMeta::is_empty")]
    pub meta: EntryMeta,
}

impl Entry {
    /// Creates a new draft post with the given ID and title
    pub fn new(id: Id, title: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        Self {
            id,
            slug: slugify(&title),
            title,
            kind: EntryKind::Post,
            status: EntryStatus::Draft,
            author: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            body: String::new(),
            meta: EntryMeta::new(),
        }
    }

    /// Creates a new draft page
    pub fn new_page(id: Id, title: impl Into<String>) -> Self {
        let mut entry = Self::new(id, title);
        entry.kind = EntryKind::Page;
        entry
    }

    /// Transitions to published status
    pub fn publish(&mut self) {
        if !self.status.is_published() {
            self.status = EntryStatus::Published;
            self.updated_at = Utc::now();
        }
    }

    /// Transitions to archived status
    pub fn archive(&mut self) {
        if self.status != EntryStatus::Archived {
            self.status = EntryStatus::Archived;
            self.updated_at = Utc::now();
        }
    }

    /// Transitions back to draft status
    pub fn unpublish(&mut self) {
        if self.status != EntryStatus::Draft {
            self.status = EntryStatus::Draft;
            self.updated_at = Utc::now();
        }
    }

    /// Sets the title, leaving the slug untouched
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    /// Sets the author handle
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = Some(author.into());
        self.updated_at = Utc::now();
    }

    /// Sets the body
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.updated_at = Utc::now();
    }

    /// Adds a tag if not already present
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.updated_at = Utc::now();
        }
    }

    /// Removes a tag
    pub fn remove_tag(&mut self, tag: &str) {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        if self.tags.len() != before {
            self.updated_at = Utc::now();
        }
    }

    /// Returns true if the entry carries the tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Sets a metadata value
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.meta.set(key, value);
        self.updated_at = Utc::now();
    }

    /// Gets a metadata value
    pub fn get_meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta.get(key)
    }
}

/// Derives a URL-safe slug from a title
///
/// Lowercases, maps runs of non-alphanumeric characters to a single
/// hyphen, and trims hyphens from both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("untitled");
    }

    slug
}
