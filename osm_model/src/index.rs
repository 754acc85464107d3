//! A flat multimap for id -> value lookups over millions of entries: append everything, sort once,
//! then answer queries by binary search. Removal doesn't shift the vector; it overwrites the value
//! with a caller-chosen empty sentinel, so the sentinel must be a value that can never legitimately
//! appear.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::osm::NodeID;
use crate::{Location, Way};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VecMultiMap<K, V> {
    entries: Vec<(K, V)>,
    empty_value: V,
    sorted: bool,
}

impl<K: Ord + Copy, V: PartialEq + Copy> VecMultiMap<K, V> {
    pub fn new(empty_value: V) -> VecMultiMap<K, V> {
        VecMultiMap {
            entries: Vec::new(),
            empty_value,
            sorted: true,
        }
    }

    pub fn set(&mut self, key: K, value: V) {
        self.entries.push((key, value));
        self.sorted = false;
    }

    /// Call after the last `set` and before the first lookup.
    pub fn sort(&mut self) {
        self.entries.sort_by_key(|(k, _)| *k);
        self.sorted = true;
    }

    /// All live values for this key, in insertion-then-sort order. Panics if `sort` hasn't been
    /// called since the last `set`.
    pub fn values(&self, key: K) -> impl Iterator<Item = V> + '_ {
        assert!(self.sorted, "VecMultiMap queried before sort()");
        let start = self.entries.partition_point(|(k, _)| *k < key);
        self.entries[start..]
            .iter()
            .take_while(move |(k, _)| *k == key)
            .map(|(_, v)| *v)
            .filter(move |v| *v != self.empty_value)
    }

    pub fn get_first(&self, key: K) -> Option<V> {
        self.values(key).next()
    }

    /// Marks the entry with the empty sentinel instead of shifting the whole vector.
    pub fn remove(&mut self, key: K, value: V) {
        for entry in &mut self.entries {
            if entry.0 == key && entry.1 == value {
                entry.1 = self.empty_value;
                return;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Node id -> location, for materializing way geometry before assembly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocationIndex {
    map: VecMultiMap<NodeID, Location>,
}

impl Default for LocationIndex {
    fn default() -> LocationIndex {
        LocationIndex::new()
    }
}

impl LocationIndex {
    pub fn new() -> LocationIndex {
        LocationIndex {
            map: VecMultiMap::new(Location::undefined()),
        }
    }

    pub fn set(&mut self, id: NodeID, location: Location) {
        self.map.set(id, location);
    }

    pub fn sort(&mut self) {
        self.map.sort();
    }

    pub fn get(&self, id: NodeID) -> Option<Location> {
        self.map.get_first(id)
    }

    /// Fills in every node ref on the way that doesn't have a location yet. Resolves as much as it
    /// can before failing on missing nodes.
    pub fn resolve_way(&self, way: &mut Way) -> Result<()> {
        let mut missing = None;
        for node in &mut way.nodes {
            if !node.location.is_defined() {
                match self.get(node.id) {
                    Some(loc) => {
                        node.location = loc;
                    }
                    None => {
                        missing = missing.or(Some(node.id));
                    }
                }
            }
        }
        if let Some(id) = missing {
            bail!("{} isn't in the location index", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multimap_basics() {
        let mut map = VecMultiMap::new(0);
        map.set("a", 1);
        map.set("b", 2);
        map.set("a", 3);
        map.sort();
        assert_eq!(map.values("a").collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(map.get_first("b"), Some(2));
        assert_eq!(map.get_first("c"), None);
    }

    #[test]
    fn remove_uses_the_sentinel() {
        let mut map = VecMultiMap::new(i64::MIN);
        map.set(1, 10);
        map.set(1, 20);
        map.sort();
        map.remove(1, 10);
        assert_eq!(map.values(1).collect::<Vec<_>>(), vec![20]);
        // The slot is still there, just dead
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn resolve_way_fills_gaps() {
        use crate::osm::WayID;
        use crate::{NodeRef, ObjectMeta, Tags};

        let mut index = LocationIndex::new();
        index.set(NodeID(1), Location::new(0, 0));
        index.set(NodeID(2), Location::new(5, 5));
        index.sort();

        let mut way = Way {
            id: WayID(1),
            meta: ObjectMeta::default(),
            tags: Tags::empty(),
            nodes: vec![
                NodeRef::new(NodeID(1), Location::undefined()),
                NodeRef::new(NodeID(2), Location::undefined()),
                NodeRef::new(NodeID(3), Location::undefined()),
            ],
        };
        assert!(index.resolve_way(&mut way).is_err());
        assert_eq!(way.nodes[0].location, Location::new(0, 0));
        assert_eq!(way.nodes[1].location, Location::new(5, 5));
        assert!(!way.nodes[2].location.is_defined());

        index.set(NodeID(3), Location::new(9, 9));
        index.sort();
        assert!(index.resolve_way(&mut way).is_ok());
        assert_eq!(way.nodes[2].location, Location::new(9, 9));
    }
}
