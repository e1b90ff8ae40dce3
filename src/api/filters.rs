//! Collection filters and their deterministic serialization.

use std::collections::BTreeMap;
use std::fmt;

use crate::api::resources::ResourceKind;
use crate::error::AppError;

/// Serializes `name -> value` pairs as `k=v` joined by commas, keys sorted
/// ascending. The same set always yields the same string regardless of input
/// order.
///
/// # Example
/// ```
/// use yahoo_fantasy::api::serialize_filters;
///
/// let s = serialize_filters([("b", 2), ("a", 1)]);
/// assert_eq!(s, "a=1,b=2");
/// ```
pub fn serialize_filters<K, V, I>(filters: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    let sorted: BTreeMap<String, String> = filters
        .into_iter()
        .map(|(k, v)| (k.into(), v.to_string()))
        .collect();
    join_sorted(&sorted)
}

fn join_sorted(filters: &BTreeMap<String, String>) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filters for one collection, checked against that collection's whitelist
/// when built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    resource: ResourceKind,
    filters: BTreeMap<String, String>,
}

impl FilterSet {
    /// An empty filter set for `resource`.
    pub fn empty(resource: ResourceKind) -> Self {
        Self {
            resource,
            filters: BTreeMap::new(),
        }
    }

    /// Builds a filter set, rejecting the first key `resource` does not accept.
    pub fn new<K, V, I>(resource: ResourceKind, filters: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let mut set = Self::empty(resource);
        for (key, value) in filters {
            set.insert(key, value)?;
        }
        Ok(set)
    }

    /// Adds or replaces one filter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> Result<(), AppError> {
        let key = key.into();
        self.resource.spec().validate_filters([key.as_str()])?;
        self.filters.insert(key, value.to_string());
        Ok(())
    }

    /// Chaining form of [`FilterSet::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Result<Self, AppError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Filter names in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_sorted(&self.filters))
    }
}
