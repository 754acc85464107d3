use std::fmt;

use serde::{Deserialize, Serialize};

/// Multiply a coordinate in degrees by this to get the fixed-point representation.
pub const COORDINATE_PRECISION: f64 = 10_000_000.0;

const UNDEFINED: i32 = i32::MAX;

/// A position on the globe as a pair of 32-bit fixed-point coordinates: x is longitude * 1e7, y is
/// latitude * 1e7. Equality is exact and bitwise; ordering is lexicographic by (x, y). All
/// geometric predicates downstream work on these integers, so two locations either match or they
/// don't -- there are no epsilon comparisons.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Location {
        Location { x, y }
    }

    pub fn from_degrees(lon: f64, lat: f64) -> Location {
        Location {
            x: (lon * COORDINATE_PRECISION).round() as i32,
            y: (lat * COORDINATE_PRECISION).round() as i32,
        }
    }

    /// The distinguished value for node refs whose location hasn't been filled in yet.
    pub fn undefined() -> Location {
        Location {
            x: UNDEFINED,
            y: UNDEFINED,
        }
    }

    pub fn is_defined(self) -> bool {
        self.x != UNDEFINED
    }

    pub fn x(self) -> i32 {
        self.x
    }

    pub fn y(self) -> i32 {
        self.y
    }

    pub fn lon(self) -> f64 {
        f64::from(self.x) / COORDINATE_PRECISION
    }

    pub fn lat(self) -> f64 {
        f64::from(self.y) / COORDINATE_PRECISION
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_defined() {
            write!(f, "({}, {})", self.lon(), self.lat())
        } else {
            write!(f, "(undefined)")
        }
    }
}
