//! Query arguments for collection fetches
//!
//! A fetch accepts arguments in three forms: nothing at all, a raw
//! query string (`"status=published&order=asc"`), or a structured map.
//! [`QueryArgs::pairs`] normalizes all three to a [`QueryMap`] so fetch
//! implementations only ever deal with one form.
//!
//! Concrete collections layer their own filters on top of caller input
//! with [`QueryArgs::resolve`]: defaults fill gaps, required arguments
//! win over everything.

use serde_json::Value;

/// String-keyed argument map with loose JSON values.
pub type QueryMap = serde_json::Map<String, Value>;

/// Arguments for a collection fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryArgs {
    /// No arguments; the fetch runs with the collection's own defaults.
    #[default]
    None,

    /// Query-string form, parsed leniently on use.
    Raw(String),

    /// Structured form.
    Map(QueryMap),
}

impl QueryArgs {
    /// No arguments.
    pub fn none() -> Self {
        QueryArgs::None
    }

    /// Returns true if no arguments were supplied.
    pub fn is_none(&self) -> bool {
        matches!(self, QueryArgs::None)
    }

    /// Normalizes to a key/value map.
    ///
    /// The raw form is parsed with [`parse_query_string`]; `None`
    /// produces an empty map.
    pub fn pairs(&self) -> QueryMap {
        match self {
            QueryArgs::None => QueryMap::new(),
            QueryArgs::Raw(s) => parse_query_string(s),
            QueryArgs::Map(map) => map.clone(),
        }
    }

    /// Merges these arguments between a collection's defaults and its
    /// required filters.
    ///
    /// Precedence, lowest to highest: `defaults`, the caller's arguments,
    /// `required`. A required key can therefore never be overridden from
    /// the outside.
    pub fn resolve(&self, defaults: QueryMap, required: QueryMap) -> QueryMap {
        let mut merged = defaults;
        for (key, value) in self.pairs() {
            merged.insert(key, value);
        }
        for (key, value) in required {
            merged.insert(key, value);
        }
        merged
    }
}

impl From<&str> for QueryArgs {
    fn from(value: &str) -> Self {
        QueryArgs::Raw(value.to_string())
    }
}

impl From<String> for QueryArgs {
    fn from(value: String) -> Self {
        QueryArgs::Raw(value)
    }
}

impl From<QueryMap> for QueryArgs {
    fn from(value: QueryMap) -> Self {
        QueryArgs::Map(value)
    }
}

/// Parses a `k=v&k2=v2` query string into a map.
///
/// Parsing never fails: empty segments are skipped, a segment without `=`
/// becomes a key with an empty value, and the last occurrence of a
/// duplicated key wins. All values come out as strings; consumers that
/// expect numbers coerce on their side.
pub fn parse_query_string(s: &str) -> QueryMap {
    let mut map = QueryMap::new();
    for segment in s.split('&') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((k, v)) => (k, v),
            None => (segment, ""),
        };
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, Value)]) -> QueryMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn parse_basic_pairs() {
        let parsed = parse_query_string("status=published&order=asc");
        assert_eq!(parsed.get("status"), Some(&json!("published")));
        assert_eq!(parsed.get("order"), Some(&json!("asc")));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn parse_bare_key_is_empty_string() {
        let parsed = parse_query_string("sticky");
        assert_eq!(parsed.get("sticky"), Some(&json!("")));
    }

    #[test]
    fn parse_skips_empty_segments() {
        let parsed = parse_query_string("&&status=draft&&");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("status"), Some(&json!("draft")));
    }

    #[test]
    fn parse_last_duplicate_wins() {
        let parsed = parse_query_string("tag=a&tag=b");
        assert_eq!(parsed.get("tag"), Some(&json!("b")));
    }

    #[test]
    fn none_pairs_is_empty() {
        assert!(QueryArgs::none().pairs().is_empty());
        assert!(QueryArgs::default().is_none());
    }

    #[test]
    fn map_pairs_roundtrip() {
        let args = QueryArgs::from(map(&[("kind", json!("page"))]));
        assert_eq!(args.pairs().get("kind"), Some(&json!("page")));
    }

    #[test]
    fn resolve_defaults_fill_gaps() {
        let args = QueryArgs::from("status=draft");
        let merged = args.resolve(
            map(&[("status", json!("published")), ("limit", json!(20))]),
            QueryMap::new(),
        );

        // Caller overrides the default status, inherits the limit.
        assert_eq!(merged.get("status"), Some(&json!("draft")));
        assert_eq!(merged.get("limit"), Some(&json!(20)));
    }

    #[test]
    fn resolve_required_wins() {
        let args = QueryArgs::from("status=draft&tag=evil");
        let merged = args.resolve(
            QueryMap::new(),
            map(&[("status", json!("published")), ("tag", json!("rust"))]),
        );

        assert_eq!(merged.get("status"), Some(&json!("published")));
        assert_eq!(merged.get("tag"), Some(&json!("rust")));
    }

    #[test]
    fn resolve_none_is_defaults_plus_required() {
        let merged = QueryArgs::none().resolve(
            map(&[("order", json!("desc"))]),
            map(&[("status", json!("published"))]),
        );

        assert_eq!(merged.get("order"), Some(&json!("desc")));
        assert_eq!(merged.get("status"), Some(&json!("published")));
    }
}
