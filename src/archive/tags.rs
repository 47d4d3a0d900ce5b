//! Per-tag entry archive

use anyhow::Result;
use serde_json::json;

use crate::collection::{Collection, Id, IdList, QueryArgs, QueryMap};
use crate::content::{Entry, Site};

/// Published entries carrying one tag.
///
/// The tag and the `status = published` filter are required arguments:
/// merged in after the caller's, so a tag page can never be steered onto
/// another tag or into drafts. Page size and direction still come from
/// the site configuration and stay overridable.
pub struct TagArchive<'a> {
    site: &'a Site,
    tag: String,
    list: IdList,
}

impl<'a> TagArchive<'a> {
    /// Creates an unpopulated archive for one tag
    pub fn new(site: &'a Site, tag: impl Into<String>) -> Self {
        Self {
            site,
            tag: tag.into(),
            list: IdList::new(),
        }
    }

    /// Creates an archive and populates it immediately with the given
    /// arguments
    pub fn query(
        site: &'a Site,
        tag: impl Into<String>,
        args: impl Into<QueryArgs>,
    ) -> Result<Self> {
        let mut archive = Self::new(site, tag);
        archive.fetch(args.into())?;
        Ok(archive)
    }

    /// The tag this archive covers
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Collection for TagArchive<'_> {
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
        args.insert("order".into(), json!(config.order.as_str()));
        args.insert("limit".into(), json!(config.per_page));
        args
    }

    fn required_args(&self) -> QueryMap {
        let mut args = QueryMap::new();
        args.insert("tag".into(), json!(self.tag));
        args.insert("status".into(), json!("published"));
        args
    }
}
