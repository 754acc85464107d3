//! Assembles polygonal areas from OSM primitives: closed ways, and multipolygon relations whose
//! member ways reference shared nodes. The input is way geometry with node locations already
//! resolved; the output is [osm_model::Area] entities with outer rings wound clockwise and their
//! holes counter-clockwise.
//!
//! The pipeline: chop every way into directed segments, sort and dedupe them, abort on any proper
//! self-intersection, stitch the segments into closed rings, classify each ring as outer or inner
//! by ray casting, nest holes inside the tightest containing outer, pick a tag set, and emit.
//! Structural problems (duplicate nodes, unclosed rings, role mismatches...) are reported through
//! a [ProblemReporter] without stopping assembly unless the geometry is unusable.

#[macro_use]
extern crate log;

mod assembler;
mod problems;
mod ring;
mod segment;
mod segment_list;

pub use crate::assembler::{Assembler, AssemblerConfig};
pub use crate::problems::{CollectingReporter, LogReporter, Problem, ProblemReporter};
pub use crate::ring::{ProtoRing, RingId};
pub use crate::segment::{intersect, NodeRefSegment, Role, SegmentIntersection};
pub use crate::segment_list::SegmentList;
