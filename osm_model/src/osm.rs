//! Strongly-typed ids for OSM objects, and a few common tag keys.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct NodeID(pub i64);
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct WayID(pub i64);
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RelationID(pub i64);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/node/{}", self.0)
    }
}
impl fmt::Display for WayID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/way/{}", self.0)
    }
}
impl fmt::Display for RelationID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/relation/{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum OsmID {
    Node(NodeID),
    Way(WayID),
    Relation(RelationID),
}

impl OsmID {
    pub fn inner(self) -> i64 {
        match self {
            OsmID::Node(n) => n.0,
            OsmID::Way(w) => w.0,
            OsmID::Relation(r) => r.0,
        }
    }
}

impl fmt::Display for OsmID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OsmID::Node(n) => write!(f, "{}", n),
            OsmID::Way(w) => write!(f, "{}", w),
            OsmID::Relation(r) => write!(f, "{}", r),
        }
    }
}

/// The id of an assembled area. The last bit encodes provenance: areas built from a closed way get
/// an even id, areas built from a multipolygon relation get an odd one, so the original object id
/// can always be recovered.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct AreaID(pub i64);

impl AreaID {
    pub fn from_way(id: WayID) -> AreaID {
        AreaID(id.0 * 2)
    }

    pub fn from_relation(id: RelationID) -> AreaID {
        AreaID(id.0 * 2 + 1)
    }

    pub fn source(self) -> OsmID {
        if self.0.rem_euclid(2) == 0 {
            OsmID::Way(WayID(self.0.div_euclid(2)))
        } else {
            OsmID::Relation(RelationID(self.0.div_euclid(2)))
        }
    }
}

impl fmt::Display for AreaID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Area #{} (from {})", self.0, self.source())
    }
}

// Common OSM keys. Keys used in just one or two places don't really need to be defined here.
pub const TYPE: &str = "type";
pub const MULTIPOLYGON: &str = "multipolygon";

// Member roles in multipolygon relations.
pub const OUTER: &str = "outer";
pub const INNER: &str = "inner";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_id_parity() {
        assert_eq!(AreaID::from_way(WayID(7)), AreaID(14));
        assert_eq!(AreaID::from_relation(RelationID(7)), AreaID(15));
        assert_eq!(AreaID(14).source(), OsmID::Way(WayID(7)));
        assert_eq!(AreaID(15).source(), OsmID::Relation(RelationID(7)));
        // Synthetic negative ids survive the round-trip too
        assert_eq!(
            AreaID::from_relation(RelationID(-1)).source(),
            OsmID::Relation(RelationID(-1))
        );
    }
}
