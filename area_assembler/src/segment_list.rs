use osm_model::{Relation, Way};

use crate::problems::ProblemReporter;
use crate::segment::{intersect, NodeRefSegment, Role, SegmentIntersection};

/// The flat pool of segments one assembly works from. After `sort()` the list is ordered
/// lexicographically by (first location, second location), which is what makes both the
/// intersection sweep and the ring-classification scan cheap: a segment's x-extent starts at its
/// first endpoint, so scans can stop as soon as first.x passes the x they care about.
#[derive(Clone, Debug, Default)]
pub struct SegmentList {
    segments: Vec<NodeRefSegment>,
    debug: bool,
}

impl SegmentList {
    pub fn new(debug: bool) -> SegmentList {
        SegmentList {
            segments: Vec::new(),
            debug,
        }
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[NodeRefSegment] {
        &self.segments
    }

    /// One segment per consecutive node pair. Zero-length segments are reported and dropped here,
    /// before they can confuse stitching.
    pub fn extract_segments_from_way(
        &mut self,
        reporter: Option<&dyn ProblemReporter>,
        way: &Way,
        role: Role,
    ) {
        for pair in way.nodes.windows(2) {
            let segment = NodeRefSegment::new(pair[0], pair[1], role, way.id);
            if segment.is_degenerate() {
                if let Some(r) = reporter {
                    r.report_degenerate_segment(way.id, segment.first().location);
                }
                continue;
            }
            self.segments.push(segment);
        }
    }

    /// Extracts segments from every member way of the relation. `members[i]` is the index into
    /// `ways` where the i-th member lives; the member's role string decides the role of its
    /// segments.
    pub fn extract_segments_from_ways(
        &mut self,
        reporter: Option<&dyn ProblemReporter>,
        relation: &Relation,
        members: &[usize],
        ways: &[Way],
    ) {
        for (member, offset) in relation.members.iter().zip(members) {
            let way = &ways[*offset];
            self.extract_segments_from_way(reporter, way, Role::parse(&member.role));
        }
    }

    pub fn sort(&mut self) {
        self.segments.sort();
    }

    /// Removes segments that appear twice, both copies at once. Two ways tracing the same edge
    /// (one outer, one inner, or two areas glued together) produce these; the doubled edge
    /// contributes nothing to the combined boundary.
    pub fn erase_duplicate_segments(&mut self, reporter: Option<&dyn ProblemReporter>) {
        let mut i = 0;
        while i + 1 < self.segments.len() {
            if self.segments[i] == self.segments[i + 1] {
                if self.debug {
                    debug!("  erasing duplicate segment {}", self.segments[i]);
                }
                if let Some(r) = reporter {
                    r.report_duplicate_segment(
                        self.segments[i].first().location,
                        self.segments[i].second().location,
                    );
                }
                self.segments.drain(i..i + 2);
            } else {
                i += 1;
            }
        }
    }

    /// Scans for segment pairs whose interiors cross or that overlap along a line. Every such pair
    /// is reported. Returns true if any was found, in which case the geometry is unusable and the
    /// caller must not build an area from it. The list must be sorted.
    pub fn find_intersections(&self, reporter: Option<&dyn ProblemReporter>) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        let mut found = false;
        for (i, s1) in self.segments[..self.segments.len() - 1].iter().enumerate() {
            for s2 in &self.segments[i + 1..] {
                // Sorted order: once the next segment starts right of s1's extent, nothing
                // after it can touch s1 either.
                if s2.first().location.x() > s1.second().location.x() {
                    break;
                }
                match intersect(s1, s2) {
                    SegmentIntersection::Crossing(location) => {
                        found = true;
                        if self.debug {
                            debug!("  segments {} and {} intersect at {}", s1, s2, location);
                        }
                        if let Some(r) = reporter {
                            r.report_intersection(
                                s1.way(),
                                (s1.first().location, s1.second().location),
                                s2.way(),
                                (s2.first().location, s2.second().location),
                                Some(location),
                            );
                        }
                    }
                    SegmentIntersection::CollinearOverlap => {
                        found = true;
                        if self.debug {
                            debug!("  segments {} and {} overlap", s1, s2);
                        }
                        if let Some(r) = reporter {
                            r.report_intersection(
                                s1.way(),
                                (s1.first().location, s1.second().location),
                                s2.way(),
                                (s2.first().location, s2.second().location),
                                None,
                            );
                        }
                    }
                    SegmentIntersection::Disjoint | SegmentIntersection::TouchingEndpoint => {}
                }
            }
        }
        found
    }
}
