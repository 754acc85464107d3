use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::rc::Rc;

use osm_model::osm::{self, AreaID, OsmID, WayID};
use osm_model::{Area, AreaBuffer, AreaPolygon, NodeRef, Relation, Tags, Way};

use crate::problems::ProblemReporter;
use crate::ring::{ProtoRing, RingId};
use crate::segment::{NodeRefSegment, Role};
use crate::segment_list::SegmentList;

/// Keys that never make it onto an assembled area.
fn area_tag_filter(key: &str) -> bool {
    !matches!(
        key,
        "type" | "created_by" | "source" | "note" | "test:id" | "test:section"
    )
}

/// The filter for deciding whether an inner way's tags differ from its area's. `type` stays in
/// here; it was already stripped from the area.
fn inner_tag_filter(key: &str) -> bool {
    !matches!(
        key,
        "created_by" | "source" | "note" | "test:id" | "test:section"
    )
}

#[derive(Clone, Default)]
pub struct AssemblerConfig {
    /// Where anomalies go. `None` disables reporting entirely.
    pub problem_reporter: Option<Rc<dyn ProblemReporter>>,
    /// Enables (very chatty) debug output through the `log` facade.
    pub debug: bool,
}

impl AssemblerConfig {
    pub fn new() -> AssemblerConfig {
        AssemblerConfig::default()
    }

    pub fn with_reporter(reporter: Rc<dyn ProblemReporter>) -> AssemblerConfig {
        AssemblerConfig {
            problem_reporter: Some(reporter),
            debug: false,
        }
    }

    pub fn enable_debug_output(&mut self, debug: bool) {
        self.debug = debug;
    }
}

/// Assembles areas from closed ways and from multipolygon relations. One instance processes one
/// input at a time; all state is reset at the start of each call, so an instance can be reused for
/// any number of inputs. Rings live in an arena of slots addressed by [RingId] -- rings merged
/// into another ring leave an empty slot behind, and ids stay stable for the whole assembly.
pub struct Assembler {
    config: AssemblerConfig,
    segment_list: SegmentList,
    rings: Vec<Option<ProtoRing>>,
    outer_rings: Vec<RingId>,
    inner_rings: Vec<RingId>,
    role_mismatches: usize,
}

impl Assembler {
    pub fn new(config: AssemblerConfig) -> Assembler {
        let debug = config.debug;
        Assembler {
            config,
            segment_list: SegmentList::new(debug),
            rings: Vec::new(),
            outer_rings: Vec::new(),
            inner_rings: Vec::new(),
            role_mismatches: 0,
        }
    }

    /// Assembles an area from a closed way, appending it to `out`. If the way's geometry is
    /// unusable (self-intersections, unclosed ring), nothing is appended and the problems are
    /// reported.
    pub fn assemble_way(&mut self, way: &Way, out: &mut AreaBuffer) {
        self.reset();
        let reporter = self.config.problem_reporter.clone();
        if let Some(r) = &reporter {
            r.set_object(OsmID::Way(way.id));
        }

        if !way.ends_have_same_id() {
            if let (Some(front), Some(back)) = (way.nodes.first(), way.nodes.last()) {
                if let Some(r) = &reporter {
                    r.report_duplicate_node(front.id, back.id, front.location);
                }
            }
        }

        self.segment_list
            .extract_segments_from_way(reporter.as_deref(), way, Role::Outer);

        if self.debug() {
            debug!(
                "assembling {}, {} segments",
                way.id,
                self.segment_list.len()
            );
        }

        if self.create_rings() {
            out.push(Area {
                id: AreaID::from_way(way.id),
                meta: way.meta.clone(),
                tags: way.tags.clone(),
                polygons: self.build_polygons(),
            });
        }
    }

    /// Assembles an area from a multipolygon relation and its member ways. `members[i]` is the
    /// index into `ways` where the i-th member of the relation lives. On success one area is
    /// appended for the relation itself; inner member ways carrying their own tags may then be
    /// assembled into additional standalone areas.
    pub fn assemble_relation(
        &mut self,
        relation: &Relation,
        members: &[usize],
        ways: &[Way],
        out: &mut AreaBuffer,
    ) {
        self.reset();
        let reporter = self.config.problem_reporter.clone();
        if let Some(r) = &reporter {
            r.set_object(OsmID::Relation(relation.id));
        }

        self.segment_list
            .extract_segments_from_ways(reporter.as_deref(), relation, members, ways);

        if self.debug() {
            debug!(
                "assembling {}, {} members, {} segments",
                relation.id,
                members.len(),
                self.segment_list.len()
            );
        }

        let mut area_tags = None;
        if self.create_rings() {
            let tags = self.tags_for_relation(relation, members, ways);
            area_tags = Some(tags.clone());
            out.push(Area {
                id: AreaID::from_relation(relation.id),
                meta: relation.meta.clone(),
                tags,
                polygons: self.build_polygons(),
            });
        }

        // An inner ring with significant tags of its own is a feature in its own right (a forest
        // clearing inside a forest, say), so it becomes a second area. Skipped entirely when the
        // relation's roles looked untrustworthy.
        if self.role_mismatches > 0 {
            return;
        }
        let area_tags = match area_tags {
            Some(tags) => tags,
            None => {
                return;
            }
        };
        for (member, offset) in relation.members.iter().zip(members) {
            if member.role != osm::INNER {
                continue;
            }
            let way = &ways[*offset];
            if !way.is_closed() || way.tags.is_empty() {
                continue;
            }
            if way.tags.iter_filtered(inner_tag_filter).count() == 0 {
                continue;
            }
            if !way.tags.same_filtered(&area_tags, inner_tag_filter) {
                let mut assembler = Assembler::new(self.config.clone());
                assembler.assemble_way(way, out);
            }
        }
    }

    fn debug(&self) -> bool {
        self.config.debug
    }

    fn reporter(&self) -> Option<&dyn ProblemReporter> {
        self.config.problem_reporter.as_deref()
    }

    fn reset(&mut self) {
        self.segment_list.clear();
        self.rings.clear();
        self.outer_rings.clear();
        self.inner_rings.clear();
        self.role_mismatches = 0;
    }

    fn ring(&self, id: RingId) -> &ProtoRing {
        self.rings[id.0].as_ref().unwrap()
    }

    fn ring_mut(&mut self, id: RingId) -> &mut ProtoRing {
        self.rings[id.0].as_mut().unwrap()
    }

    fn push_ring(&mut self, ring: ProtoRing) -> RingId {
        self.rings.push(Some(ring));
        RingId(self.rings.len() - 1)
    }

    fn take_ring(&mut self, id: RingId) -> ProtoRing {
        self.rings[id.0].take().unwrap()
    }

    fn live_ring_ids(&self) -> Vec<RingId> {
        self.rings
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| RingId(i))
            .collect()
    }

    /// Location equality, with the side effect of reporting when two co-located node refs carry
    /// different ids.
    fn has_same_location(&self, nr1: NodeRef, nr2: NodeRef) -> bool {
        if !nr1.co_located_with(nr2) {
            return false;
        }
        if nr1.id != nr2.id {
            if let Some(r) = self.reporter() {
                r.report_duplicate_node(nr1.id, nr2.id, nr1.location);
            }
        }
        true
    }

    /// The driver: sort, dedupe, abort on crossings, stitch rings, check closure, classify
    /// inner/outer, fix winding, assign holes, validate roles. Returns false if no valid area can
    /// come out of this geometry.
    fn create_rings(&mut self) -> bool {
        let reporter = self.config.problem_reporter.clone();
        self.segment_list.sort();
        self.segment_list
            .erase_duplicate_segments(reporter.as_deref());

        if self.segment_list.is_empty() {
            return false;
        }

        // Crossing segments can't be fixed up; the whole area is invalid.
        if self.segment_list.find_intersections(reporter.as_deref()) {
            return false;
        }

        // Tack each segment onto either end of an existing ring if possible, otherwise start a
        // new ring with it.
        for i in 0..self.segment_list.len() {
            let segment = self.segment_list.segments()[i];
            if self.debug() {
                debug!("  checking segment {}", segment);
            }
            if !self.add_to_existing_ring(segment) {
                if self.debug() {
                    debug!("    new ring for segment {}", segment);
                }
                self.push_ring(ProtoRing::new(segment));
            }
        }

        if self.check_for_open_rings() {
            if self.debug() {
                debug!("  not all rings are closed");
            }
            return false;
        }

        if self.debug() {
            debug!("  find inner/outer...");
        }

        let live = self.live_ring_ids();
        if live.len() == 1 {
            let id = live[0];
            if !self.ring(id).is_cw() {
                self.ring_mut(id).reverse();
            }
            self.outer_rings.push(id);
        } else {
            for id in live {
                self.check_inner_outer(id);
                if self.ring(id).is_outer() {
                    if !self.ring(id).is_cw() {
                        self.ring_mut(id).reverse();
                    }
                    self.outer_rings.push(id);
                } else {
                    if self.ring(id).is_cw() {
                        self.ring_mut(id).reverse();
                    }
                    self.inner_rings.push(id);
                }
            }

            if self.outer_rings.len() == 1 {
                let outer = self.outer_rings[0];
                let inners = self.inner_rings.clone();
                for inner in inners {
                    self.ring_mut(outer).add_inner_ring(inner);
                }
            } else {
                // Smallest outer first, so each hole lands in the tightest ring containing it.
                // min_node breaks area ties deterministically.
                let mut outers = std::mem::take(&mut self.outer_rings);
                outers.sort_by_key(|id| {
                    let ring = self.ring(*id);
                    (ring.area(), ring.min_node().location)
                });
                self.outer_rings = outers;

                for inner in self.inner_rings.clone() {
                    let mut placed = false;
                    for outer in self.outer_rings.clone() {
                        if self.ring(inner).is_in(self.ring(outer)) {
                            self.ring_mut(outer).add_inner_ring(inner);
                            placed = true;
                            break;
                        }
                    }
                    if !placed {
                        if let Some(r) = self.reporter() {
                            r.report_orphan_inner_ring(self.ring(inner).min_node().location);
                        }
                    }
                }
            }
        }

        self.check_inner_outer_roles();

        true
    }

    /// Tries the four possible endpoint matches against every open ring. On the first match the
    /// segment is attached (flipped if needed) and the ring gets a chance to close a subring or
    /// swallow another open ring.
    fn add_to_existing_ring(&mut self, mut segment: NodeRefSegment) -> bool {
        for id in self.live_ring_ids() {
            let ring = self.ring(id);
            if ring.closed() {
                continue;
            }
            let front = ring.first_segment().first();
            let back = ring.last_segment().second();

            if self.has_same_location(back, segment.first()) {
                self.combine_rings_back(segment, id);
                return true;
            }
            if self.has_same_location(back, segment.second()) {
                segment.swap_locations();
                self.combine_rings_back(segment, id);
                return true;
            }
            if self.has_same_location(front, segment.first()) {
                segment.swap_locations();
                self.combine_rings_front(segment, id);
                return true;
            }
            if self.has_same_location(front, segment.second()) {
                self.combine_rings_front(segment, id);
                return true;
            }
        }
        false
    }

    fn combine_rings_back(&mut self, segment: NodeRefSegment, id: RingId) {
        if self.debug() {
            debug!("    match at back of {}", self.ring(id));
        }
        let attached = segment.second();
        self.ring_mut(id).add_segment_back(segment);
        self.has_closed_subring_back(id, attached);
        if self.possibly_combine_rings_back(id) {
            self.check_for_closed_subring(id);
        }
    }

    fn combine_rings_front(&mut self, segment: NodeRefSegment, id: RingId) {
        if self.debug() {
            debug!("    match at front of {}", self.ring(id));
        }
        let attached = segment.first();
        self.ring_mut(id).add_segment_front(segment);
        self.has_closed_subring_front(id, attached);
        if self.possibly_combine_rings_front(id) {
            self.check_for_closed_subring(id);
        }
    }

    /// Looks for another open ring starting or ending where this ring now ends, and absorbs it.
    fn possibly_combine_rings_back(&mut self, id: RingId) -> bool {
        let nr = self.ring(id).last_segment().second();
        for other_id in self.live_ring_ids() {
            if other_id == id || self.ring(other_id).closed() {
                continue;
            }
            let other_front = self.ring(other_id).first_segment().first();
            let other_back = self.ring(other_id).last_segment().second();

            if self.has_same_location(nr, other_front) {
                let other = self.take_ring(other_id);
                self.ring_mut(id).merge_ring(other);
                return true;
            }
            if self.has_same_location(nr, other_back) {
                let other = self.take_ring(other_id);
                self.ring_mut(id).merge_ring_reverse(other);
                return true;
            }
        }
        false
    }

    /// Looks for another open ring starting or ending where this ring now starts, and absorbs it.
    fn possibly_combine_rings_front(&mut self, id: RingId) -> bool {
        let nr = self.ring(id).first_segment().first();
        for other_id in self.live_ring_ids() {
            if other_id == id || self.ring(other_id).closed() {
                continue;
            }
            let other_front = self.ring(other_id).first_segment().first();
            let other_back = self.ring(other_id).last_segment().second();

            if self.has_same_location(nr, other_back) {
                let mut other = self.take_ring(other_id);
                self.ring_mut(id).swap_segments(&mut other);
                self.ring_mut(id).merge_ring(other);
                return true;
            }
            if self.has_same_location(nr, other_front) {
                let other = self.take_ring(other_id);
                self.ring_mut(id).reverse();
                self.ring_mut(id).merge_ring(other);
                return true;
            }
        }
        false
    }

    /// After extending the back of a ring, the new endpoint may coincide with an interior vertex:
    /// the chain from that vertex to the back is a closed loop. Split it off as its own ring.
    fn has_closed_subring_back(&mut self, id: RingId, nr: NodeRef) -> bool {
        let len = self.ring(id).segments().len();
        if len < 3 {
            return false;
        }
        for i in 1..len - 1 {
            let vertex = self.ring(id).segments()[i].first();
            if self.has_same_location(nr, vertex) {
                self.split_off_subring(id, i..len);
                return true;
            }
        }
        false
    }

    /// Mirror image of `has_closed_subring_back` for the front.
    fn has_closed_subring_front(&mut self, id: RingId, nr: NodeRef) -> bool {
        let len = self.ring(id).segments().len();
        if len < 3 {
            return false;
        }
        for i in 1..len - 1 {
            let vertex = self.ring(id).segments()[i].second();
            if self.has_same_location(nr, vertex) {
                self.split_off_subring(id, 0..i + 1);
                return true;
            }
        }
        false
    }

    /// The thorough version, run after two rings merge: any location appearing as the start of two
    /// different segments means the chain passes through it twice, enclosing a subring somewhere
    /// in the middle. Sort a copy to find such a pair, then split between the two positions.
    fn check_for_closed_subring(&mut self, id: RingId) {
        if self.debug() {
            debug!("    check for closed subring in {}", self.ring(id));
        }
        let mut sorted: Vec<NodeRefSegment> = self.ring(id).segments().to_vec();
        sorted.sort();

        let mut pair = None;
        for w in sorted.windows(2) {
            if self.has_same_location(w[0].first(), w[1].first()) {
                pair = Some((w[0], w[1]));
                break;
            }
        }
        let (s1, s2) = match pair {
            Some(pair) => pair,
            None => {
                return;
            }
        };

        let segments = self.ring(id).segments();
        let r1 = segments.iter().position(|s| *s == s1).unwrap();
        let r2 = segments.iter().position(|s| *s == s2).unwrap();
        let (lo, hi) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
        self.split_off_subring(id, lo..hi);
    }

    fn split_off_subring(&mut self, id: RingId, range: Range<usize>) {
        let removed = self.ring_mut(id).remove_segments(range);
        let subring = ProtoRing::from_segments(removed);
        if self.debug() {
            debug!("    split off subring {}", subring);
        }
        self.push_ring(subring);
    }

    /// Reports every ring that still has loose ends. Any open ring means the area is bad.
    fn check_for_open_rings(&self) -> bool {
        let mut open = false;
        for id in self.live_ring_ids() {
            let ring = self.ring(id);
            if !ring.closed() {
                open = true;
                if let Some(r) = self.reporter() {
                    r.report_ring_not_closed(
                        ring.first_segment().first().location,
                        ring.last_segment().second().location,
                    );
                }
            }
        }
        open
    }

    /// Even-odd ray cast from the ring's min_node going left, over segments of all other rings.
    /// Segments incident to min_node itself are tallied separately: a pair of them adds nothing,
    /// an odd leftover (one going up past the point) flips the parity.
    fn check_inner_outer(&mut self, id: RingId) {
        let min_node = self.ring(id).min_node();
        if self.debug() {
            debug!("    check_inner_outer min_node={}", min_node);
        }

        let mut count = 0;
        let mut above = 0;

        for segment in self.segment_list.segments() {
            if segment.first().location.x() > min_node.location.x() {
                break;
            }
            if self.ring(id).contains_segment(segment) {
                continue;
            }
            if segment.to_left_of(min_node.location) {
                count += 1;
            }
            if segment.first().location == min_node.location
                && segment.second().location.y() > min_node.location.y()
            {
                above += 1;
            }
            if segment.second().location == min_node.location
                && segment.first().location.y() > min_node.location.y()
            {
                above += 1;
            }
        }

        count += above % 2;

        if count % 2 == 1 {
            self.ring_mut(id).set_inner();
        }
    }

    /// Every segment of an outer ring should come from a role=outer member, and symmetrically for
    /// inner rings. Mismatches don't invalidate the area, but they do suppress the
    /// inner-ways-as-areas pass, since the roles clearly can't be trusted.
    fn check_inner_outer_roles(&mut self) {
        let reporter = self.config.problem_reporter.clone();
        let mut mismatches = 0;
        for id in &self.outer_rings {
            for segment in self.ring(*id).segments() {
                if segment.role() != Role::Outer {
                    mismatches += 1;
                    if let Some(r) = &reporter {
                        r.report_role_should_be_outer(
                            segment.way(),
                            segment.first().location,
                            segment.second().location,
                        );
                    }
                }
            }
        }
        for id in &self.inner_rings {
            for segment in self.ring(*id).segments() {
                if segment.role() != Role::Inner {
                    mismatches += 1;
                    if let Some(r) = &reporter {
                        r.report_role_should_be_inner(
                            segment.way(),
                            segment.first().location,
                            segment.second().location,
                        );
                    }
                }
            }
        }
        self.role_mismatches += mismatches;
    }

    /// The tag set for a relation's area: the relation's own tags if it has any beyond the
    /// boilerplate, otherwise tags harvested from the outer ways.
    fn tags_for_relation(&self, relation: &Relation, members: &[usize], ways: &[Way]) -> Tags {
        let count = relation.tags.iter_filtered(area_tag_filter).count();
        if self.debug() {
            debug!("  found {} significant tags on the relation", count);
        }

        if count > 0 {
            let mut tags = Tags::empty();
            for (k, v) in relation.tags.iter() {
                if k != osm::TYPE {
                    tags.insert(k.clone(), v.clone());
                }
            }
            return tags;
        }

        let mut ways_by_id: BTreeMap<WayID, &Way> = BTreeMap::new();
        for offset in members {
            let way = &ways[*offset];
            ways_by_id.entry(way.id).or_insert(way);
        }

        let mut outer_way_ids = BTreeSet::new();
        for id in &self.outer_rings {
            self.ring(*id).collect_way_ids(&mut outer_way_ids);
        }

        if outer_way_ids.len() == 1 {
            if self.debug() {
                debug!("    only one outer way, copying its tags");
            }
            let id = outer_way_ids.iter().next().unwrap();
            return ways_by_id
                .get(id)
                .map(|way| way.tags.clone())
                .unwrap_or_else(Tags::empty);
        }

        // Multiple outer ways: keep the key/value pairs they all agree on.
        let mut counter: BTreeMap<(&String, &String), usize> = BTreeMap::new();
        let mut num_ways = 0;
        for id in &outer_way_ids {
            if let Some(way) = ways_by_id.get(id) {
                num_ways += 1;
                for kv in way.tags.iter() {
                    *counter.entry(kv).or_insert(0) += 1;
                }
            }
        }
        let mut tags = Tags::empty();
        for ((k, v), uses) in counter {
            if self.debug() {
                debug!("    tag {}={} is used {} times in {} ways", k, v, uses, num_ways);
            }
            if uses == num_ways {
                tags.insert(k.clone(), v.clone());
            }
        }
        tags
    }

    /// Each outer ring's node sequence, bundled with the node sequences of its holes.
    fn build_polygons(&self) -> Vec<AreaPolygon> {
        let mut polygons = Vec::new();
        for id in &self.outer_rings {
            let outer = self.ring(*id);
            if self.debug() {
                debug!("    {} is outer", outer);
            }
            let mut polygon = AreaPolygon {
                outer: outer.node_sequence(),
                inners: Vec::new(),
            };
            for inner in outer.inner_rings() {
                polygon.inners.push(self.ring(*inner).node_sequence());
            }
            polygons.push(polygon);
        }
        polygons
    }
}
