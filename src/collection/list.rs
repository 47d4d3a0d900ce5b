//! Ordered identifier list with a population flag
//!
//! [`IdList`] is the piece of state every collection owns: the ordered
//! identifier sequence plus a flag recording whether anything has
//! established that sequence yet. The flag is monotonic: nothing ever
//! resets it within an instance's lifetime.

use std::slice;

use super::id::{Id, IdValue};

/// Ordered identifiers plus the populated flag.
///
/// Insertion order is significant (it reflects query result order) and
/// duplicates are kept; deduplication is a per-collection policy, not a
/// container concern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdList {
    ids: Vec<Id>,
    populated: bool,
}

impl IdList {
    /// Creates an empty, unpopulated list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the list from loose values, sanitizing as it goes.
    ///
    /// Each value is coerced best-effort to a positive integer (see
    /// [`IdValue::coerce`]); values that collapse to zero are dropped.
    /// Relative order of the survivors is preserved. The list is marked
    /// populated even when nothing survives; an empty result is still a
    /// result.
    ///
    /// Calling this again replaces the previous sequence.
    pub fn populate<I>(&mut self, raw: I)
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        self.ids = raw
            .into_iter()
            .filter_map(|value| value.into().to_id())
            .collect();
        self.populated = true;
    }

    /// Installs already-validated identifiers, marking the list populated.
    ///
    /// This is the path fetch implementations use once the host query has
    /// produced its sequence.
    pub fn assign(&mut self, ids: Vec<Id>) {
        self.ids = ids;
        self.populated = true;
    }

    /// Returns true once any population event has happened.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// The current identifier sequence.
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    /// Number of identifiers held.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no identifiers are held.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns true if the given identifier is present.
    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    /// Iterates over the identifiers by value.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.ids.iter().copied()
    }
}

impl<'a> IntoIterator for &'a IdList {
    type Item = Id;
    type IntoIter = std::iter::Copied<slice::Iter<'a, Id>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}
