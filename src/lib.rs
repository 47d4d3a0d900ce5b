//! Folio - lazy, query-backed identifier collections for local-first
//! content stores
//!
//! Folio models listings the way content systems do: a query produces an
//! ordered list of entry identifiers, and the entries themselves are
//! only loaded while iterating. The [`collection`] module is the
//! host-agnostic core ([`Collection`], [`IdList`], argument handling);
//! [`content`] is a small file-backed host (JSONL entries, SQLite query
//! index); [`archive`] wires the two together into ready-made listings.

pub mod archive;
pub mod collection;
pub mod content;

pub use archive::{EntryArchive, TagArchive};
pub use collection::{Collection, Id, IdList, IdValue, Objects, QueryArgs, QueryMap};
pub use content::{Entry, EntryStatus, EntryStore, Index, Site, SiteConfig};
