//! Concrete archives over the content host
//!
//! Ready-made [`Collection`](crate::collection::Collection)
//! implementations: the site-wide entry listing and the per-tag listing.
//! Both resolve their queries through the site's SQLite index and their
//! objects through the entry store.

mod entries;
mod tags;

pub use entries::EntryArchive;
pub use tags::TagArchive;
