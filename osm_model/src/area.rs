use serde::{Deserialize, Serialize};

use crate::osm::AreaID;
use crate::{NodeRef, ObjectMeta, Tags};

/// One outer ring and the holes cut out of it. The outer ring is wound clockwise, the inner rings
/// counter-clockwise; every ring repeats its first node at the end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaPolygon {
    pub outer: Vec<NodeRef>,
    pub inners: Vec<Vec<NodeRef>>,
}

/// An assembled area: a simple polygon or multipolygon, possibly with holes. The id encodes
/// whether it came from a closed way or a relation (see [AreaID]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaID,
    pub meta: ObjectMeta,
    pub tags: Tags,
    pub polygons: Vec<AreaPolygon>,
}

/// The caller-owned buffer areas get appended to. An area is pushed whole or not at all; an
/// aborted assembly leaves the buffer untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaBuffer {
    areas: Vec<Area>,
}

impl AreaBuffer {
    pub fn new() -> AreaBuffer {
        AreaBuffer::default()
    }

    pub fn push(&mut self, area: Area) {
        self.areas.push(area);
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
