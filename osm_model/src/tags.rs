use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Convenience functions around a string->string map. Iteration order is the BTreeMap key order,
/// which keeps everything downstream (filtered comparisons, emitted areas) deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new(map: BTreeMap<String, String>) -> Tags {
        Tags(map)
    }

    pub fn empty() -> Tags {
        Tags(BTreeMap::new())
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    pub fn is(&self, k: &str, v: &str) -> bool {
        self.get(k) == Some(&v.to_string())
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) {
        self.0.insert(k.into(), v.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn inner(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// A lazy view of the (key, value) pairs whose key passes the filter.
    pub fn iter_filtered<'a, F: Fn(&str) -> bool + 'a>(
        &'a self,
        keep: F,
    ) -> impl Iterator<Item = (&'a String, &'a String)> {
        self.0.iter().filter(move |(k, _)| keep(k))
    }

    /// Pairwise in-order equality of the two filtered views, including their lengths.
    pub fn same_filtered<F: Fn(&str) -> bool + Copy>(&self, other: &Tags, keep: F) -> bool {
        self.iter_filtered(keep).eq(other.iter_filtered(keep))
    }
}
