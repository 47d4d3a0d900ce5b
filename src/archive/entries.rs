//! Site-wide entry archive

use anyhow::Result;
use serde_json::json;

use crate::collection::{Collection, Id, IdList, QueryArgs, QueryMap};
use crate::content::{Entry, Site};

/// The site's published entries, newest first, one page at a time.
///
/// Defaults come from the site configuration (`per_page`, `order`) plus
/// a `status = published` filter; callers can override any of them,
/// including asking for drafts. Identifiers resolve through the entry
/// store, so an entry deleted after population comes back as `None`.
pub struct EntryArchive<'a> {
    site: &'a Site,
    list: IdList,
}

impl<'a> EntryArchive<'a> {
    /// Creates an unpopulated archive; the first demand runs the default
    /// query
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            list: IdList::new(),
        }
    }

    /// Creates an archive and populates it immediately with the given
    /// arguments
    pub fn query(site: &'a Site, args: impl Into<QueryArgs>) -> Result<Self> {
        let mut archive = Self::new(site);
        archive.fetch(args.into())?;
        Ok(archive)
    }
}

impl Collection for EntryArchive<'_> {
    type Object = Option<Entry>;

    fn id_list(&self) -> &IdList {
        &self.list
    }

    fn id_list_mut(&mut self) -> &mut IdList {
        &mut self.list
    }

    fn fetch(&mut self, args: QueryArgs) -> Result<()> {
        let merged = self.merged_args(args);
        let index = self.site.fresh_index()?;
        let ids = index.select(&merged)?;
        self.list.assign(ids);
        Ok(())
    }

    fn transform(&self, id: Id) -> Result<Option<Entry>> {
        self.site.entries().load(id)
    }

    fn default_args(&self) -> QueryMap {
        let config = self.site.config();
        let mut args = QueryMap::new();
        args.insert("status".into(), json!("published"));
        args.insert("order".into(), json!(config.order.as_str()));
        args.insert("limit".into(), json!(config.per_page));
        args
    }
}
