use std::fmt;

use serde::{Deserialize, Serialize};

use crate::osm::NodeID;
use crate::Location;

/// A reference to a node: its id plus its resolved location. Ways store these instead of bare ids
/// so that geometry never has to chase an external index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeID,
    pub location: Location,
}

impl NodeRef {
    pub fn new(id: NodeID, location: Location) -> NodeRef {
        NodeRef { id, location }
    }

    /// Same position on the ground, regardless of id. Two distinct nodes at one location are
    /// usually a mapping mistake, but stitching treats them as the same vertex anyway.
    pub fn co_located_with(self, other: NodeRef) -> bool {
        self.location == other.location
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "node {} at {}", self.id.0, self.location)
    }
}
