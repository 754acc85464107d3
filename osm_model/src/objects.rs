use serde::{Deserialize, Serialize};

use crate::osm::{OsmID, RelationID, WayID};
use crate::{NodeRef, Tags};

/// The version/changeset/authorship block every OSM object carries. Assembled areas copy it from
/// their source object verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub version: u32,
    pub changeset: i64,
    /// Seconds since the epoch
    pub timestamp: i64,
    pub visible: bool,
    pub uid: i64,
    pub user: String,
}

impl Default for ObjectMeta {
    fn default() -> ObjectMeta {
        ObjectMeta {
            version: 0,
            changeset: 0,
            timestamp: 0,
            visible: true,
            uid: 0,
            user: String::new(),
        }
    }
}

/// A way with its node locations already resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Way {
    pub id: WayID,
    pub meta: ObjectMeta,
    pub tags: Tags,
    pub nodes: Vec<NodeRef>,
}

impl Way {
    pub fn ends_have_same_id(&self) -> bool {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(front), Some(back)) => front.id == back.id,
            _ => false,
        }
    }

    pub fn ends_have_same_location(&self) -> bool {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(front), Some(back)) => front.location == back.location,
            _ => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ends_have_same_id()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationMember {
    pub role: String,
    pub member: OsmID,
}

/// A relation, usually type=multipolygon. Members are kept in document order; the assembler gets
/// told separately where each member way lives in the caller's buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationID,
    pub meta: ObjectMeta,
    pub tags: Tags,
    pub members: Vec<RelationMember>,
}
