use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use osm_model::osm::WayID;
use osm_model::NodeRef;

use crate::segment::{orient, NodeRefSegment};

/// Stable handle for a ring slot in the assembler's arena. Outer rings refer to their holes by
/// these ids, never by reference, so merging and splitting rings can't invalidate anything.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RingId(pub usize);

/// An ordered chain of segments, growing at both ends until it bites its own tail. Consecutive
/// segments share a location: `segments[i].second()` sits on `segments[i+1].first()`. Rings start
/// as outer and are demoted to inner by the classification pass.
#[derive(Clone, Debug)]
pub struct ProtoRing {
    segments: Vec<NodeRefSegment>,
    outer: bool,
    inner_rings: Vec<RingId>,
}

impl ProtoRing {
    pub fn new(segment: NodeRefSegment) -> ProtoRing {
        ProtoRing {
            segments: vec![segment],
            outer: true,
            inner_rings: Vec::new(),
        }
    }

    pub fn from_segments(segments: Vec<NodeRefSegment>) -> ProtoRing {
        assert!(!segments.is_empty());
        ProtoRing {
            segments,
            outer: true,
            inner_rings: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[NodeRefSegment] {
        &self.segments
    }

    pub fn first_segment(&self) -> &NodeRefSegment {
        &self.segments[0]
    }

    pub fn last_segment(&self) -> &NodeRefSegment {
        self.segments.last().unwrap()
    }

    pub fn closed(&self) -> bool {
        self.first_segment().first().location == self.last_segment().second().location
    }

    pub fn add_segment_front(&mut self, segment: NodeRefSegment) {
        self.segments.insert(0, segment);
    }

    pub fn add_segment_back(&mut self, segment: NodeRefSegment) {
        self.segments.push(segment);
    }

    /// Turns the chain around: reverses the segment order and the direction of every segment.
    pub fn reverse(&mut self) {
        for segment in &mut self.segments {
            segment.swap_locations();
        }
        self.segments.reverse();
    }

    /// Appends the other ring's chain after this one.
    pub fn merge_ring(&mut self, other: ProtoRing) {
        self.segments.extend(other.segments);
    }

    /// Appends the other ring's chain after this one, walking it backwards.
    pub fn merge_ring_reverse(&mut self, mut other: ProtoRing) {
        other.reverse();
        self.segments.extend(other.segments);
    }

    /// Exchanges the segment storage of the two rings; inner-ring bookkeeping stays put.
    pub fn swap_segments(&mut self, other: &mut ProtoRing) {
        std::mem::swap(&mut self.segments, &mut other.segments);
    }

    /// Splices out a contiguous run of segments, returning it in order.
    pub fn remove_segments(&mut self, range: Range<usize>) -> Vec<NodeRefSegment> {
        self.segments.drain(range).collect()
    }

    /// Twice the signed shoelace area over the node polyline. Positive when the ring runs
    /// clockwise. Exact: sums of i64 products accumulated in i128.
    pub fn area(&self) -> i128 {
        let mut sum: i128 = 0;
        for segment in &self.segments {
            let a = segment.first().location;
            let b = segment.second().location;
            sum += i128::from(i64::from(b.x()) - i64::from(a.x()))
                * i128::from(i64::from(b.y()) + i64::from(a.y()));
        }
        sum
    }

    pub fn is_cw(&self) -> bool {
        self.area() > 0
    }

    /// Whether a segment with these endpoints is part of this ring, in either direction.
    pub fn contains_segment(&self, segment: &NodeRefSegment) -> bool {
        self.segments.iter().any(|s| {
            (s.first().location == segment.first().location
                && s.second().location == segment.second().location)
                || (s.first().location == segment.second().location
                    && s.second().location == segment.first().location)
        })
    }

    pub fn collect_way_ids(&self, ways: &mut BTreeSet<WayID>) {
        for segment in &self.segments {
            ways.insert(segment.way());
        }
    }

    /// The endpoint with the lexicographically smallest location. For a closed ring this is a
    /// corner vertex, which makes it a safe anchor for ray casting: no segment of the same ring
    /// can extend past it to the left.
    pub fn min_node(&self) -> NodeRef {
        let mut min = self.segments[0].first();
        for segment in &self.segments {
            for nr in [segment.first(), segment.second()] {
                if nr.location < min.location {
                    min = nr;
                }
            }
        }
        min
    }

    /// Even-odd test of this ring's `min_node` against the other ring, casting a ray to the right.
    pub fn is_in(&self, outer: &ProtoRing) -> bool {
        let p = self.min_node().location;
        let mut inside = false;
        for segment in &outer.segments {
            let a = segment.first().location;
            let b = segment.second().location;
            if (a.y() > p.y()) != (b.y() > p.y()) {
                let (lower, upper) = if a.y() < b.y() { (a, b) } else { (b, a) };
                if orient(lower, upper, p) > 0 {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn set_inner(&mut self) {
        self.outer = false;
    }

    pub fn is_outer(&self) -> bool {
        self.outer
    }

    pub fn inner_rings(&self) -> &[RingId] {
        &self.inner_rings
    }

    pub fn add_inner_ring(&mut self, id: RingId) {
        self.inner_rings.push(id);
    }

    /// The node refs tracing this ring: the chain's starting node, then the far endpoint of each
    /// segment. For a closed ring the first and last entries are co-located.
    pub fn node_sequence(&self) -> Vec<NodeRef> {
        let mut nodes = vec![self.first_segment().first()];
        for segment in &self.segments {
            nodes.push(segment.second());
        }
        nodes
    }
}

impl fmt::Display for ProtoRing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ring[")?;
        write!(f, "{}", self.first_segment().first().location)?;
        for segment in &self.segments {
            write!(f, ", {}", segment.second().location)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Role;
    use osm_model::osm::NodeID;
    use osm_model::Location;

    fn node(id: i64, x: i32, y: i32) -> NodeRef {
        NodeRef::new(NodeID(id), Location::new(x, y))
    }

    fn seg(x1: i32, y1: i32, x2: i32, y2: i32) -> NodeRefSegment {
        let mut s = NodeRefSegment::new(node(0, x1, y1), node(0, x2, y2), Role::Outer, WayID(1));
        // Chain order, not normalized order
        if s.first().location != Location::new(x1, y1) {
            s.swap_locations();
        }
        s
    }

    fn square() -> ProtoRing {
        ProtoRing::from_segments(vec![
            seg(0, 0, 10, 0),
            seg(10, 0, 10, 10),
            seg(10, 10, 0, 10),
            seg(0, 10, 0, 0),
        ])
    }

    #[test]
    fn closed_and_open() {
        let ring = square();
        assert!(ring.closed());

        let open = ProtoRing::from_segments(vec![seg(0, 0, 10, 0), seg(10, 0, 10, 10)]);
        assert!(!open.closed());
    }

    #[test]
    fn orientation_and_area() {
        // This square runs counter-clockwise (y up)
        let mut ring = square();
        assert!(!ring.is_cw());
        assert_eq!(ring.area(), -200);

        ring.reverse();
        assert!(ring.closed());
        assert!(ring.is_cw());
        assert_eq!(ring.area(), 200);
    }

    #[test]
    fn reverse_keeps_the_chain_connected() {
        let mut ring = ProtoRing::from_segments(vec![seg(0, 0, 10, 0), seg(10, 0, 10, 10)]);
        ring.reverse();
        assert_eq!(ring.first_segment().first().location, Location::new(10, 10));
        assert_eq!(
            ring.first_segment().second().location,
            ring.last_segment().first().location
        );
        assert_eq!(ring.last_segment().second().location, Location::new(0, 0));
    }

    #[test]
    fn merge_reverse_flips_the_other_chain() {
        let mut a = ProtoRing::from_segments(vec![seg(0, 0, 10, 0)]);
        // This chain ends where a ends, so it has to be walked backwards
        let b = ProtoRing::from_segments(vec![seg(10, 10, 10, 0)]);
        a.merge_ring_reverse(b);
        assert_eq!(a.segments().len(), 2);
        assert_eq!(a.last_segment().second().location, Location::new(10, 10));
    }

    #[test]
    fn min_node_is_the_smallest_endpoint() {
        let ring = square();
        assert_eq!(ring.min_node().location, Location::new(0, 0));
    }

    #[test]
    fn containment_by_min_node() {
        let outer = square();
        let hole = ProtoRing::from_segments(vec![
            seg(2, 2, 6, 2),
            seg(6, 2, 4, 6),
            seg(4, 6, 2, 2),
        ]);
        assert!(hole.is_in(&outer));
        assert!(!outer.is_in(&hole));

        let far = ProtoRing::from_segments(vec![
            seg(100, 100, 110, 100),
            seg(110, 100, 105, 110),
            seg(105, 110, 100, 100),
        ]);
        assert!(!far.is_in(&outer));
    }

    #[test]
    fn contains_segment_ignores_direction() {
        let ring = square();
        assert!(ring.contains_segment(&seg(10, 0, 0, 0)));
        assert!(!ring.contains_segment(&seg(0, 0, 5, 5)));
    }

    #[test]
    fn node_sequence_traces_the_chain() {
        let ring = square();
        let locs: Vec<Location> = ring.node_sequence().into_iter().map(|n| n.location).collect();
        assert_eq!(
            locs,
            vec![
                Location::new(0, 0),
                Location::new(10, 0),
                Location::new(10, 10),
                Location::new(0, 10),
                Location::new(0, 0),
            ]
        );
    }
}
