//! Lazy identifier collections
//!
//! The host-agnostic core: ordered identifier sequences that populate
//! themselves on first demand and resolve into domain objects during
//! iteration.
//!
//! - [`Id`] is a validated positive identifier, with [`IdValue`] for
//!   sanitizing loose input
//! - [`QueryArgs`] carries caller arguments in string or map form,
//!   resolved against per-collection defaults
//! - [`IdList`] is the populated-flag-carrying sequence itself
//! - [`Collection`] is the contract tying them together; [`Objects`] is
//!   its object iterator

mod args;
mod id;
mod lazy;
mod list;

pub use args::{parse_query_string, QueryArgs, QueryMap};
pub use id::{Id, IdError, IdValue};
pub use lazy::{Collection, Objects};
pub use list::IdList;
