//! The entity model for OpenStreetMap primitives: fixed-point locations, node references, tags,
//! ways, multipolygon relations, and the areas assembled from them. Everything here is plain data;
//! the algorithms that turn ways and relations into areas live in the `area_assembler` crate.

mod area;
mod index;
mod location;
mod node_ref;
mod objects;
pub mod osm;
mod tags;

pub use crate::area::{Area, AreaBuffer, AreaPolygon};
pub use crate::index::{LocationIndex, VecMultiMap};
pub use crate::location::Location;
pub use crate::node_ref::NodeRef;
pub use crate::objects::{ObjectMeta, Relation, RelationMember, Way};
pub use crate::tags::Tags;
