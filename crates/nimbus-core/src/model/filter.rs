// ── List filters and scopes ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Active list filter for one store.
///
/// `name` is the key field: changing it (or adding/removing the filter
/// entirely) sends the store back to the first page. Any other criteria
/// (`network_role`, `organization`, `node`, ...) are carried in `fields`
/// and forwarded verbatim as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub fields: IndexMap<String, String>,
}

impl Filter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if key == "name" {
            self.name = Some(value.into());
        } else {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// Parse `key=value` pairs (as given on a command line).
    ///
    /// A bare word without `=` is treated as a name filter.
    pub fn parse_pairs<I, S>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter: Option<Self> = None;
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').unwrap_or(("name", pair));
            filter = Some(filter.unwrap_or_default().with(key.trim(), value.trim()));
        }
        filter
    }

    /// Whether moving from `previous` to `next` must reset the page.
    pub fn resets_page(previous: Option<&Self>, next: Option<&Self>) -> bool {
        match (previous, next) {
            (None, None) => false,
            (Some(prev), Some(next)) => prev.name != next.name,
            _ => true,
        }
    }

    /// Query-string pairs, `name` first.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(self.fields.len() + 1);
        if let Some(name) = &self.name {
            query.push(("name".to_owned(), name.clone()));
        }
        query.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        query
    }
}

/// Narrowed listing of a collection (all zones of one datacenter, all
/// names of the organization, ...). Scoped results live beside the paged
/// collection and never disturb it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub key: String,
    pub value: String,
}

impl Scope {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The `names=true` lightweight listing used to populate pickers.
    pub fn names() -> Self {
        Self::new("names", "true")
    }

    pub(crate) fn to_query(&self) -> [(String, String); 1] {
        [(self.key.clone(), self.value.clone())]
    }
}
