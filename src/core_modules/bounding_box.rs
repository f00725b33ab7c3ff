// THEORY:
// The `BoundingBox` module provides the rectangular lat/lng region used in two
// distinct roles by the engine:
// 1.  As a cluster's frozen *acceptance region*, computed once when a cluster
//     is seeded and never recomputed as membership grows.
// 2.  As the on-demand *tight bounds* of a cluster's current members.
//
// Key architectural principles:
// 1.  **Corner Representation**: The box is stored as its north-east and
//     south-west corners. The constructor trusts the caller to supply a
//     geometrically valid NE/SW pair; corners are not sorted or swapped.
// 2.  **Axis Independence**: `extend` performs four independent scalar min/max
//     updates, one per axis per corner. After any sequence of extends, NE is
//     the component-wise max and SW the component-wise min of every point ever
//     extended into the box.
// 3.  **No Wraparound**: There is no special handling for the +/-180 meridian
//     or the poles. A box never wraps; longitudes are compared as plain
//     scalars.

use crate::core_modules::geo_point::GeoPoint;
use serde::{Deserialize, Serialize};

/// A lat/lng rectangle held as its NE and SW corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    ne: GeoPoint,
    sw: GeoPoint,
}

impl BoundingBox {
    /// Builds a box from its corners. The caller must supply a valid NE/SW
    /// pair; the corners are not sorted.
    pub fn new(ne: GeoPoint, sw: GeoPoint) -> Self {
        Self { ne, sw }
    }

    /// The degenerate point-box `{point, point}`.
    pub fn around(point: GeoPoint) -> Self {
        Self::new(point, point)
    }

    pub fn north_east(&self) -> GeoPoint {
        self.ne
    }

    pub fn south_west(&self) -> GeoPoint {
        self.sw
    }

    /// Grows the box in place so it is the minimal box containing both the
    /// prior box and `point`.
    pub fn extend(&mut self, point: GeoPoint) {
        if point.lat() < self.sw.lat() {
            self.sw = GeoPoint::new(point.lat(), self.sw.lng());
        }
        if point.lng() < self.sw.lng() {
            self.sw = GeoPoint::new(self.sw.lat(), point.lng());
        }
        if point.lat() > self.ne.lat() {
            self.ne = GeoPoint::new(point.lat(), self.ne.lng());
        }
        if point.lng() > self.ne.lng() {
            self.ne = GeoPoint::new(self.ne.lat(), point.lng());
        }
    }

    /// Inclusive interval test on both axes independently.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat() <= self.ne.lat()
            && point.lat() >= self.sw.lat()
            && point.lng() <= self.ne.lng()
            && point.lng() >= self.sw.lng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_updates_each_axis_independently() {
        let mut bounds = BoundingBox::around(GeoPoint::new(1.0, 1.0));

        // North-west of the box: only lat of NE and lng of SW should move.
        bounds.extend(GeoPoint::new(2.0, 0.0));

        assert_eq!(bounds.north_east(), GeoPoint::new(2.0, 1.0));
        assert_eq!(bounds.south_west(), GeoPoint::new(1.0, 0.0));
    }

    #[test]
    fn extend_with_interior_point_is_a_noop() {
        let mut bounds = BoundingBox::new(GeoPoint::new(2.0, 2.0), GeoPoint::new(-2.0, -2.0));
        let before = bounds;

        bounds.extend(GeoPoint::new(0.5, -0.5));

        assert_eq!(bounds, before);
    }

    #[test]
    fn contains_is_inclusive_on_the_edges() {
        let bounds = BoundingBox::new(GeoPoint::new(2.0, 2.0), GeoPoint::new(-2.0, -2.0));

        assert!(bounds.contains(GeoPoint::new(0.0, 0.0)));
        assert!(bounds.contains(GeoPoint::new(2.0, 2.0)));
        assert!(bounds.contains(GeoPoint::new(-2.0, -2.0)));
        assert!(bounds.contains(GeoPoint::new(2.0, -2.0)));
        assert!(!bounds.contains(GeoPoint::new(2.0001, 0.0)));
        assert!(!bounds.contains(GeoPoint::new(0.0, -2.0001)));
    }
}
