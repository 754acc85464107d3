use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use osm_model::osm::{NodeID, OsmID, WayID};
use osm_model::Location;

/// A structural anomaly found while assembling one area. Which object was being assembled is
/// tracked separately (see [ProblemReporter::set_object]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Problem {
    /// Two nodes with different ids share one location. Stitching treats them as the same vertex.
    DuplicateNode {
        id1: NodeID,
        id2: NodeID,
        location: Location,
    },
    /// Two segments properly cross, or overlap along a line. `location` is the crossing point when
    /// there is a single one. Fatal for the area being assembled.
    Intersection {
        way1: WayID,
        seg1: (Location, Location),
        way2: WayID,
        seg2: (Location, Location),
        location: Option<Location>,
    },
    /// After stitching, a ring still has two loose ends. Fatal for the area being assembled.
    RingNotClosed { front: Location, back: Location },
    /// A segment in an outer ring came from a member that wasn't tagged role=outer.
    RoleShouldBeOuter {
        way: WayID,
        seg: (Location, Location),
    },
    /// A segment in an inner ring came from a member that wasn't tagged role=inner.
    RoleShouldBeInner {
        way: WayID,
        seg: (Location, Location),
    },
    /// The same segment appeared twice, usually two ways tracing the same edge. Both copies are
    /// dropped.
    DuplicateSegment { seg: (Location, Location) },
    /// A zero-length segment (consecutive co-located nodes on a way). Dropped.
    DegenerateSegment { way: WayID, location: Location },
    /// An inner ring that fits inside none of the outer rings. It's left out of the output.
    OrphanInnerRing { location: Location },
}

/// Sink for anomalies discovered during assembly. Every call is advisory -- implementations must
/// not fail, and the assembler never changes course based on what a reporter does. Methods take
/// `&self`; implementations that accumulate state use interior mutability.
pub trait ProblemReporter {
    /// The object the following reports belong to. Called once at the start of each assembly.
    fn set_object(&self, _object: OsmID) {}

    fn report_duplicate_node(&self, _id1: NodeID, _id2: NodeID, _location: Location) {}

    fn report_intersection(
        &self,
        _way1: WayID,
        _seg1: (Location, Location),
        _way2: WayID,
        _seg2: (Location, Location),
        _location: Option<Location>,
    ) {
    }

    fn report_ring_not_closed(&self, _front: Location, _back: Location) {}

    fn report_role_should_be_outer(&self, _way: WayID, _a: Location, _b: Location) {}

    fn report_role_should_be_inner(&self, _way: WayID, _a: Location, _b: Location) {}

    fn report_duplicate_segment(&self, _a: Location, _b: Location) {}

    fn report_degenerate_segment(&self, _way: WayID, _location: Location) {}

    fn report_orphan_inner_ring(&self, _location: Location) {}
}

/// Remembers every report, tagged with the object that was being assembled. The main reporter for
/// tests and for callers that postprocess anomalies.
#[derive(Default)]
pub struct CollectingReporter {
    current: Cell<Option<OsmID>>,
    records: RefCell<Vec<(Option<OsmID>, Problem)>>,
}

impl CollectingReporter {
    pub fn new() -> CollectingReporter {
        CollectingReporter::default()
    }

    fn push(&self, problem: Problem) {
        self.records.borrow_mut().push((self.current.get(), problem));
    }

    pub fn problems(&self) -> Vec<Problem> {
        self.records.borrow().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn records(&self) -> Vec<(Option<OsmID>, Problem)> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl ProblemReporter for CollectingReporter {
    fn set_object(&self, object: OsmID) {
        self.current.set(Some(object));
    }

    fn report_duplicate_node(&self, id1: NodeID, id2: NodeID, location: Location) {
        self.push(Problem::DuplicateNode { id1, id2, location });
    }

    fn report_intersection(
        &self,
        way1: WayID,
        seg1: (Location, Location),
        way2: WayID,
        seg2: (Location, Location),
        location: Option<Location>,
    ) {
        self.push(Problem::Intersection {
            way1,
            seg1,
            way2,
            seg2,
            location,
        });
    }

    fn report_ring_not_closed(&self, front: Location, back: Location) {
        self.push(Problem::RingNotClosed { front, back });
    }

    fn report_role_should_be_outer(&self, way: WayID, a: Location, b: Location) {
        self.push(Problem::RoleShouldBeOuter { way, seg: (a, b) });
    }

    fn report_role_should_be_inner(&self, way: WayID, a: Location, b: Location) {
        self.push(Problem::RoleShouldBeInner { way, seg: (a, b) });
    }

    fn report_duplicate_segment(&self, a: Location, b: Location) {
        self.push(Problem::DuplicateSegment { seg: (a, b) });
    }

    fn report_degenerate_segment(&self, way: WayID, location: Location) {
        self.push(Problem::DegenerateSegment { way, location });
    }

    fn report_orphan_inner_ring(&self, location: Location) {
        self.push(Problem::OrphanInnerRing { location });
    }
}

/// Forwards every anomaly to the `log` facade as a warning.
#[derive(Default)]
pub struct LogReporter {
    current: Cell<Option<OsmID>>,
}

impl LogReporter {
    pub fn new() -> LogReporter {
        LogReporter::default()
    }

    fn context(&self) -> String {
        match self.current.get() {
            Some(id) => format!("{}", id),
            None => "unknown object".to_string(),
        }
    }
}

impl ProblemReporter for LogReporter {
    fn set_object(&self, object: OsmID) {
        self.current.set(Some(object));
    }

    fn report_duplicate_node(&self, id1: NodeID, id2: NodeID, location: Location) {
        warn!(
            "{}: nodes {} and {} are both at {}",
            self.context(),
            id1.0,
            id2.0,
            location
        );
    }

    fn report_intersection(
        &self,
        way1: WayID,
        _seg1: (Location, Location),
        way2: WayID,
        _seg2: (Location, Location),
        location: Option<Location>,
    ) {
        match location {
            Some(loc) => warn!(
                "{}: {} and {} intersect at {}",
                self.context(),
                way1,
                way2,
                loc
            ),
            None => warn!(
                "{}: {} and {} overlap along a shared line",
                self.context(),
                way1,
                way2
            ),
        }
    }

    fn report_ring_not_closed(&self, front: Location, back: Location) {
        warn!(
            "{}: ring not closed, loose ends at {} and {}",
            self.context(),
            front,
            back
        );
    }

    fn report_role_should_be_outer(&self, way: WayID, a: Location, b: Location) {
        warn!(
            "{}: segment ({}--{}) of {} should have role 'outer'",
            self.context(),
            a,
            b,
            way
        );
    }

    fn report_role_should_be_inner(&self, way: WayID, a: Location, b: Location) {
        warn!(
            "{}: segment ({}--{}) of {} should have role 'inner'",
            self.context(),
            a,
            b,
            way
        );
    }

    fn report_duplicate_segment(&self, a: Location, b: Location) {
        warn!("{}: duplicate segment ({}--{})", self.context(), a, b);
    }

    fn report_degenerate_segment(&self, way: WayID, location: Location) {
        warn!(
            "{}: zero-length segment on {} at {}",
            self.context(),
            way,
            location
        );
    }

    fn report_orphan_inner_ring(&self, location: Location) {
        warn!(
            "{}: inner ring at {} is in no outer ring",
            self.context(),
            location
        );
    }
}
