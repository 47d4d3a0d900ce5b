//! Lazy collection contract
//!
//! [`Collection`] is the contract for every identifier collection:
//! implementors supply the query (`fetch`) and the per-identifier lookup
//! (`transform`), and the trait supplies everything else: lazy population,
//! counting, seeding, and iteration over transformed objects.
//!
//! Population happens at most once per instance. The first accessor that
//! needs data runs `fetch` with no arguments; after that the cached
//! identifier sequence is reused. Population-forcing accessors take
//! `&mut self`, so two simultaneous fetches for one instance cannot be
//! expressed.

use anyhow::Result;
use tracing::trace;

use super::args::{QueryArgs, QueryMap};
use super::id::{Id, IdValue};
use super::list::IdList;

/// A lazily-populated collection of identifiers, iterable as objects.
///
/// An implementation owns an [`IdList`] and exposes it through
/// [`id_list`]/[`id_list_mut`]; the provided methods manage the
/// populated-flag discipline on top of it. `fetch` must resolve its
/// arguments to an ordered identifier sequence and [`assign`] it, also
/// when called with [`QueryArgs::None`], which is what lazy population
/// passes. `transform` must be a read-only lookup: it is
/// called once per identifier on every traversal, and nothing caches its
/// results.
///
/// Errors from `fetch` and `transform` pass through untouched; the trait
/// adds no failure modes of its own. A failed fetch leaves the collection
/// unpopulated, so the next access tries again.
///
/// [`id_list`]: Collection::id_list
/// [`id_list_mut`]: Collection::id_list_mut
/// [`assign`]: IdList::assign
pub trait Collection {
    /// The domain object a single identifier resolves to.
    type Object;

    /// Borrows the identifier state.
    fn id_list(&self) -> &IdList;

    /// Mutably borrows the identifier state.
    fn id_list_mut(&mut self) -> &mut IdList;

    /// Resolves query arguments into identifiers and installs them.
    ///
    /// Implementations are expected to run the merged arguments (see
    /// [`merged_args`](Collection::merged_args)) against the host's query
    /// facility and [`IdList::assign`] the result.
    fn fetch(&mut self, args: QueryArgs) -> Result<()>;

    /// Resolves one identifier into its domain object.
    ///
    /// Must not mutate collection state. A missing object is the
    /// implementation's business; `Object` can be an `Option` when the
    /// host distinguishes "absent" from "failed".
    fn transform(&self, id: Id) -> Result<Self::Object>;

    /// Filters merged into the arguments of every fetch unless the caller
    /// overrides them.
    fn default_args(&self) -> QueryMap {
        QueryMap::new()
    }

    /// Filters merged into the arguments of every fetch, overriding the
    /// caller.
    fn required_args(&self) -> QueryMap {
        QueryMap::new()
    }

    /// Resolves caller arguments against this collection's defaults and
    /// requirements.
    fn merged_args(&self, args: QueryArgs) -> QueryMap {
        args.resolve(self.default_args(), self.required_args())
    }

    /// Fetches once, lazily: a no-op after any population event.
    fn ensure_populated(&mut self) -> Result<()> {
        if !self.id_list().is_populated() {
            trace!("collection unpopulated, fetching with default arguments");
            self.fetch(QueryArgs::None)?;
        }
        Ok(())
    }

    /// The identifier sequence, populating it first if needed.
    fn collection(&mut self) -> Result<&IdList> {
        self.ensure_populated()?;
        Ok(self.id_list())
    }

    /// Number of identifiers, populating first if needed.
    fn count(&mut self) -> Result<usize> {
        self.ensure_populated()?;
        Ok(self.id_list().len())
    }

    /// The identifiers currently held, **without** forcing population.
    ///
    /// This is the one read accessor that never fetches: on an instance
    /// that has not populated yet it returns an empty slice rather than
    /// running the query. Use [`collection`](Collection::collection) when
    /// the data must be there.
    fn ids(&self) -> &[Id] {
        self.id_list().ids()
    }

    /// Seeds the collection from loose values instead of fetching.
    ///
    /// Useful when a parent query already produced the identifiers. Input
    /// is sanitized as described on [`IdList::populate`]; after this, no
    /// fetch will run.
    fn populate<I>(&mut self, raw: I)
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
        Self: Sized,
    {
        self.id_list_mut().populate(raw);
    }

    /// Iterates over transformed objects, populating first if needed.
    ///
    /// Every call builds a fresh traversal over the live identifier
    /// sequence; transformed objects are recomputed each time, never
    /// cached.
    fn iter(&mut self) -> Result<Objects<'_, Self>>
    where
        Self: Sized,
    {
        self.ensure_populated()?;
        Ok(Objects {
            collection: self,
            pos: 0,
        })
    }

    /// All transformed objects, in identifier order.
    ///
    /// The default collects [`iter`](Collection::iter); implementations
    /// with a better bulk strategy can override.
    fn objects(&mut self) -> Result<Vec<Self::Object>>
    where
        Self: Sized,
    {
        self.iter()?.collect()
    }
}

/// Iterator over a collection's transformed objects.
///
/// Yields `transform(id)` for each identifier in sequence order. Holding
/// it borrows the collection shared, so the underlying sequence cannot
/// change mid-traversal.
pub struct Objects<'a, C: Collection> {
    collection: &'a C,
    pos: usize,
}

impl<C: Collection> Iterator for Objects<'_, C> {
    type Item = Result<C::Object>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.collection.id_list().ids().get(self.pos)?;
        self.pos += 1;
        Some(self.collection.transform(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.collection.id_list().len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl<C: Collection> ExactSizeIterator for Objects<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;

    /// Transforms each identifier into its double, serving a canned
    /// identifier sequence and counting fetches.
    struct Doubles {
        list: IdList,
        source: Vec<u64>,
        fetches: usize,
        last_args: Option<QueryMap>,
    }

    impl Doubles {
        fn serving(source: &[u64]) -> Self {
            Self {
                list: IdList::new(),
                source: source.to_vec(),
                fetches: 0,
                last_args: None,
            }
        }
    }

    impl Collection for Doubles {
        type Object = u64;

        fn id_list(&self) -> &IdList {
            &self.list
        }

        fn id_list_mut(&mut self) -> &mut IdList {
            &mut self.list
        }

        fn fetch(&mut self, args: QueryArgs) -> Result<()> {
            self.fetches += 1;
            self.last_args = Some(self.merged_args(args));
            let ids = self
                .source
                .iter()
                .filter_map(|&v| Id::new(v))
                .collect();
            self.list.assign(ids);
            Ok(())
        }

        fn transform(&self, id: Id) -> Result<u64> {
            Ok(id.get() * 2)
        }

        fn default_args(&self) -> QueryMap {
            let mut map = QueryMap::new();
            map.insert("order".into(), json!("desc"));
            map
        }

        fn required_args(&self) -> QueryMap {
            let mut map = QueryMap::new();
            map.insert("realm".into(), json!("doubles"));
            map
        }
    }

    /// A collection whose fetch always fails.
    struct Broken {
        list: IdList,
        attempts: usize,
    }

    impl Collection for Broken {
        type Object = u64;

        fn id_list(&self) -> &IdList {
            &self.list
        }

        fn id_list_mut(&mut self) -> &mut IdList {
            &mut self.list
        }

        fn fetch(&mut self, _args: QueryArgs) -> Result<()> {
            self.attempts += 1;
            bail!("query backend unavailable")
        }

        fn transform(&self, id: Id) -> Result<u64> {
            Ok(id.get())
        }
    }

    #[test]
    fn stays_lazy_until_first_demand() {
        let coll = Doubles::serving(&[1, 2, 3]);

        assert!(coll.ids().is_empty());
        assert!(!coll.id_list().is_populated());
        assert_eq!(coll.fetches, 0);
    }

    #[test]
    fn ids_never_forces_population() {
        let coll = Doubles::serving(&[1, 2, 3]);

        // Repeated raw access stays empty and never fetches.
        assert!(coll.ids().is_empty());
        assert!(coll.ids().is_empty());
        assert_eq!(coll.fetches, 0);
    }

    #[test]
    fn collection_fetches_exactly_once() {
        let mut coll = Doubles::serving(&[4, 5]);

        let first: Vec<u64> = coll.collection().unwrap().iter().map(|id| id.get()).collect();
        let second: Vec<u64> = coll.collection().unwrap().iter().map(|id| id.get()).collect();

        assert_eq!(first, vec![4, 5]);
        assert_eq!(first, second);
        assert_eq!(coll.fetches, 1);
    }

    #[test]
    fn count_forces_population() {
        let mut coll = Doubles::serving(&[7, 8, 9]);

        assert_eq!(coll.count().unwrap(), 3);
        assert_eq!(coll.fetches, 1);
        assert_eq!(coll.ids().len(), 3);
    }

    #[test]
    fn empty_result_still_counts_as_populated() {
        let mut coll = Doubles::serving(&[]);

        assert_eq!(coll.count().unwrap(), 0);
        assert_eq!(coll.count().unwrap(), 0);

        // An empty answer is an answer; no refetch.
        assert_eq!(coll.fetches, 1);
        assert!(coll.id_list().is_populated());
    }

    #[test]
    fn populate_preempts_fetching() {
        let mut coll = Doubles::serving(&[1, 2, 3]);
        coll.populate(vec![json!(10), json!("20"), json!(0)]);

        let held: Vec<u64> = coll.collection().unwrap().iter().map(|id| id.get()).collect();
        assert_eq!(held, vec![10, 20]);
        assert_eq!(coll.fetches, 0);
    }

    #[test]
    fn iter_transforms_in_sequence_order() {
        let mut coll = Doubles::serving(&[3, 1, 2]);

        let objects: Vec<u64> = coll.iter().unwrap().map(Result::unwrap).collect();
        assert_eq!(objects, vec![6, 2, 4]);
    }

    #[test]
    fn iteration_is_restartable_and_stable() {
        let mut coll = Doubles::serving(&[2, 4]);

        let first: Vec<u64> = coll.iter().unwrap().map(Result::unwrap).collect();
        let second: Vec<u64> = coll.iter().unwrap().map(Result::unwrap).collect();

        assert_eq!(first, second);
        assert_eq!(coll.fetches, 1);
    }

    #[test]
    fn iter_reports_exact_length() {
        let mut coll = Doubles::serving(&[1, 2, 3]);

        let mut iter = coll.iter().unwrap();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn objects_collects_the_iteration() {
        let mut coll = Doubles::serving(&[5, 6]);

        let objects = coll.objects().unwrap();
        assert_eq!(objects, vec![10, 12]);
    }

    #[test]
    fn lazy_fetch_merges_defaults_and_required() {
        let mut coll = Doubles::serving(&[1]);
        coll.ensure_populated().unwrap();

        let args = coll.last_args.clone().unwrap();
        assert_eq!(args.get("order"), Some(&json!("desc")));
        assert_eq!(args.get("realm"), Some(&json!("doubles")));
    }

    #[test]
    fn caller_overrides_defaults_but_not_required() {
        let mut coll = Doubles::serving(&[1]);
        coll.fetch(QueryArgs::from("order=asc&realm=other")).unwrap();

        let args = coll.last_args.clone().unwrap();
        assert_eq!(args.get("order"), Some(&json!("asc")));
        assert_eq!(args.get("realm"), Some(&json!("doubles")));
    }

    #[test]
    fn failed_fetch_leaves_collection_unpopulated() {
        let mut coll = Broken {
            list: IdList::new(),
            attempts: 0,
        };

        assert!(coll.collection().is_err());
        assert!(!coll.id_list().is_populated());

        // The next demand tries again rather than caching the failure.
        assert!(coll.count().is_err());
        assert_eq!(coll.attempts, 2);
    }

    #[test]
    fn transform_errors_surface_per_item() {
        /// Fails to transform one designated identifier.
        struct Tripwire {
            list: IdList,
            bad: Id,
        }

        impl Collection for Tripwire {
            type Object = u64;

            fn id_list(&self) -> &IdList {
                &self.list
            }

            fn id_list_mut(&mut self) -> &mut IdList {
                &mut self.list
            }

            fn fetch(&mut self, _args: QueryArgs) -> Result<()> {
                Ok(())
            }

            fn transform(&self, id: Id) -> Result<u64> {
                if id == self.bad {
                    bail!("object {id} is unreadable");
                }
                Ok(id.get())
            }
        }

        let mut list = IdList::new();
        list.populate(vec![1u64, 2, 3]);
        let mut coll = Tripwire {
            list,
            bad: Id::new(2).unwrap(),
        };

        let results: Vec<Result<u64>> = coll.iter().unwrap().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
