use std::cmp::Ordering;
use std::fmt;

use osm_model::osm::WayID;
use osm_model::{Location, NodeRef};

/// The role the originating way plays in its multipolygon relation. Stitching ignores roles
/// entirely; they only matter for the validation pass and for deciding whether tagged holes get a
/// second life as standalone areas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Outer,
    Inner,
    Unknown,
}

impl Role {
    pub fn parse(role: &str) -> Role {
        match role {
            "outer" => Role::Outer,
            "inner" => Role::Inner,
            _ => Role::Unknown,
        }
    }
}

/// A directed edge between two consecutive nodes of a way. The constructor normalizes the
/// endpoints so `first.location <= second.location`; `reversed` records whether that flipped the
/// way's own direction. Equality and ordering only look at the endpoint locations, never at the
/// originating way.
#[derive(Clone, Copy, Debug)]
pub struct NodeRefSegment {
    first: NodeRef,
    second: NodeRef,
    way: WayID,
    role: Role,
    reversed: bool,
}

impl NodeRefSegment {
    pub fn new(nr1: NodeRef, nr2: NodeRef, role: Role, way: WayID) -> NodeRefSegment {
        if nr2.location < nr1.location {
            NodeRefSegment {
                first: nr2,
                second: nr1,
                way,
                role,
                reversed: true,
            }
        } else {
            NodeRefSegment {
                first: nr1,
                second: nr2,
                way,
                role,
                reversed: false,
            }
        }
    }

    pub fn first(&self) -> NodeRef {
        self.first
    }

    pub fn second(&self) -> NodeRef {
        self.second
    }

    pub fn way(&self) -> WayID {
        self.way
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn swap_locations(&mut self) {
        std::mem::swap(&mut self.first, &mut self.second);
        self.reversed = !self.reversed;
    }

    /// Both endpoints on the same spot. These contribute nothing to a ring and confuse stitching,
    /// so they're dropped at extraction time.
    pub fn is_degenerate(&self) -> bool {
        self.first.location == self.second.location
    }

    /// True iff this segment crosses the horizontal through `p` strictly below-to-above and does
    /// so at or left of `p`. Segments ending exactly on `p` never count; the caller tallies those
    /// separately. This is one arm of the even-odd ray cast that classifies rings as inner or
    /// outer.
    pub fn to_left_of(&self, p: Location) -> bool {
        if self.first.location == p || self.second.location == p {
            return false;
        }
        let (lower, upper) = if self.first.location.y() <= self.second.location.y() {
            (self.first.location, self.second.location)
        } else {
            (self.second.location, self.first.location)
        };
        if lower.y() >= p.y() || upper.y() < p.y() {
            return false;
        }
        orient(lower, upper, p) <= 0
    }
}

impl PartialEq for NodeRefSegment {
    fn eq(&self, other: &NodeRefSegment) -> bool {
        self.first.location == other.first.location && self.second.location == other.second.location
    }
}
impl Eq for NodeRefSegment {}

impl Ord for NodeRefSegment {
    fn cmp(&self, other: &NodeRefSegment) -> Ordering {
        (self.first.location, self.second.location)
            .cmp(&(other.first.location, other.second.location))
    }
}
impl PartialOrd for NodeRefSegment {
    fn partial_cmp(&self, other: &NodeRefSegment) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeRefSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}--{})", self.first.location, self.second.location)
    }
}

/// Twice the signed area of the triangle a, b, c. Positive when c lies to the left of the line
/// from a to b. Deltas fit in i64, their products in i128, so this is exact for the entire
/// fixed-point coordinate range.
pub(crate) fn orient(a: Location, b: Location, c: Location) -> i128 {
    let abx = i64::from(b.x()) - i64::from(a.x());
    let aby = i64::from(b.y()) - i64::from(a.y());
    let acx = i64::from(c.x()) - i64::from(a.x());
    let acy = i64::from(c.y()) - i64::from(a.y());
    i128::from(abx) * i128::from(acy) - i128::from(aby) * i128::from(acx)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentIntersection {
    Disjoint,
    /// The segments share an endpoint and nothing else. This is the normal contact between
    /// consecutive segments of a ring.
    TouchingEndpoint,
    /// The interiors cross (or an endpoint of one lies in the interior of the other) at this
    /// location. The location is computed in floating point and rounded; it's for error reports,
    /// not for geometry.
    Crossing(Location),
    /// The segments run along the same line and share more than a single point.
    CollinearOverlap,
}

/// Classifies how two segments relate, using exact integer orientation tests.
pub fn intersect(s1: &NodeRefSegment, s2: &NodeRefSegment) -> SegmentIntersection {
    let a = s1.first().location;
    let b = s1.second().location;
    let c = s2.first().location;
    let d = s2.second().location;

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if o1 == 0 && o2 == 0 {
        // Collinear. Both segments are normalized, and lexicographic order agrees with position
        // along a common line, so this is a 1-D interval overlap test.
        let lo = std::cmp::max(a, c);
        let hi = std::cmp::min(b, d);
        return match lo.cmp(&hi) {
            Ordering::Less => SegmentIntersection::CollinearOverlap,
            Ordering::Equal => SegmentIntersection::TouchingEndpoint,
            Ordering::Greater => SegmentIntersection::Disjoint,
        };
    }
    if a == c || a == d || b == c || b == d {
        return SegmentIntersection::TouchingEndpoint;
    }
    if (o1 > 0) != (o2 > 0) && o1 != 0 && o2 != 0 && (o3 > 0) != (o4 > 0) && o3 != 0 && o4 != 0 {
        return SegmentIntersection::Crossing(crossing_point(a, b, c, d));
    }
    // T-junctions: an endpoint of one segment in the interior of the other.
    if o1 == 0 && strictly_between(a, b, c) {
        return SegmentIntersection::Crossing(c);
    }
    if o2 == 0 && strictly_between(a, b, d) {
        return SegmentIntersection::Crossing(d);
    }
    if o3 == 0 && strictly_between(c, d, a) {
        return SegmentIntersection::Crossing(a);
    }
    if o4 == 0 && strictly_between(c, d, b) {
        return SegmentIntersection::Crossing(b);
    }
    SegmentIntersection::Disjoint
}

// p < q from normalization; r is already known to be collinear with them.
fn strictly_between(p: Location, q: Location, r: Location) -> bool {
    p < r && r < q
}

fn crossing_point(a: Location, b: Location, c: Location, d: Location) -> Location {
    let (ax, ay) = (f64::from(a.x()), f64::from(a.y()));
    let (bx, by) = (f64::from(b.x()), f64::from(b.y()));
    let (cx, cy) = (f64::from(c.x()), f64::from(c.y()));
    let (dx, dy) = (f64::from(d.x()), f64::from(d.y()));
    let denom = (dy - cy) * (bx - ax) - (dx - cx) * (by - ay);
    let ua = ((dx - cx) * (ay - cy) - (dy - cy) * (ax - cx)) / denom;
    Location::new(
        (ax + ua * (bx - ax)).round() as i32,
        (ay + ua * (by - ay)).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm_model::osm::NodeID;

    fn node(id: i64, x: i32, y: i32) -> NodeRef {
        NodeRef::new(NodeID(id), Location::new(x, y))
    }

    fn seg(x1: i32, y1: i32, x2: i32, y2: i32) -> NodeRefSegment {
        NodeRefSegment::new(node(1, x1, y1), node(2, x2, y2), Role::Outer, WayID(1))
    }

    #[test]
    fn constructor_normalizes() {
        let s = seg(10, 0, 0, 0);
        assert_eq!(s.first().location, Location::new(0, 0));
        assert_eq!(s.second().location, Location::new(10, 0));
        assert!(s.is_reversed());

        let s = seg(0, 0, 10, 0);
        assert!(!s.is_reversed());
    }

    #[test]
    fn swap_locations_flips_direction() {
        let mut s = seg(0, 0, 10, 0);
        s.swap_locations();
        assert_eq!(s.first().location, Location::new(10, 0));
        assert!(s.is_reversed());
        s.swap_locations();
        assert!(!s.is_reversed());
    }

    #[test]
    fn equality_ignores_the_way() {
        let a = NodeRefSegment::new(node(1, 0, 0), node(2, 5, 5), Role::Outer, WayID(1));
        let b = NodeRefSegment::new(node(3, 5, 5), node(4, 0, 0), Role::Inner, WayID(2));
        assert_eq!(a, b);
    }

    #[test]
    fn crossing_segments() {
        let s1 = seg(0, 0, 10, 10);
        let s2 = seg(0, 10, 10, 0);
        match intersect(&s1, &s2) {
            SegmentIntersection::Crossing(loc) => assert_eq!(loc, Location::new(5, 5)),
            other => panic!("expected crossing, got {:?}", other),
        }
    }

    #[test]
    fn touching_at_an_endpoint_is_fine() {
        let s1 = seg(0, 0, 10, 0);
        let s2 = seg(10, 0, 10, 10);
        assert_eq!(intersect(&s1, &s2), SegmentIntersection::TouchingEndpoint);
    }

    #[test]
    fn t_junction_counts_as_crossing() {
        let s1 = seg(0, 0, 10, 0);
        let s2 = seg(5, 0, 5, 10);
        assert_eq!(
            intersect(&s1, &s2),
            SegmentIntersection::Crossing(Location::new(5, 0))
        );
    }

    #[test]
    fn collinear_cases() {
        // Overlapping
        assert_eq!(
            intersect(&seg(0, 0, 10, 0), &seg(5, 0, 15, 0)),
            SegmentIntersection::CollinearOverlap
        );
        // One contains the other
        assert_eq!(
            intersect(&seg(0, 0, 10, 0), &seg(2, 0, 8, 0)),
            SegmentIntersection::CollinearOverlap
        );
        // Sharing an endpoint along the same line
        assert_eq!(
            intersect(&seg(0, 0, 10, 0), &seg(10, 0, 20, 0)),
            SegmentIntersection::TouchingEndpoint
        );
        // Same line, no contact
        assert_eq!(
            intersect(&seg(0, 0, 10, 0), &seg(11, 0, 20, 0)),
            SegmentIntersection::Disjoint
        );
        // Sharing an endpoint but doubling back over the other segment
        assert_eq!(
            intersect(&seg(0, 0, 10, 0), &seg(0, 0, 5, 0)),
            SegmentIntersection::CollinearOverlap
        );
    }

    #[test]
    fn disjoint_segments() {
        assert_eq!(
            intersect(&seg(0, 0, 1, 1), &seg(5, 5, 6, 5)),
            SegmentIntersection::Disjoint
        );
    }

    #[test]
    fn to_left_of_basics() {
        // Vertical segment west of the point
        assert!(seg(0, 0, 0, 10).to_left_of(Location::new(5, 5)));
        // Vertical segment east of the point
        assert!(!seg(10, 0, 10, 10).to_left_of(Location::new(5, 5)));
        // Horizontal segments never straddle the ray
        assert!(!seg(0, 5, 10, 5).to_left_of(Location::new(5, 5)));
        // The point's own y at the lower endpoint is excluded...
        assert!(!seg(0, 5, 0, 10).to_left_of(Location::new(5, 5)));
        // ...but at the upper endpoint it counts
        assert!(seg(0, 0, 0, 5).to_left_of(Location::new(5, 5)));
        // Segments incident to the point itself never count
        assert!(!seg(5, 5, 0, 0).to_left_of(Location::new(5, 5)));
    }
}
