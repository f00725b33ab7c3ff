// THEORY:
// The `GeoPoint` module is the lowest-level primitive of the whole engine: a
// plain latitude/longitude pair in decimal degrees. Everything else in the
// crate - bounding boxes, projections, distances, cluster centers - is built
// on top of it.
//
// Key architectural principles:
// 1.  **Dumb Data Container**: A `GeoPoint` carries no behavior beyond its two
//     coordinates. All geometric reasoning (projection, distance, containment)
//     lives in the modules that consume it, keeping this type trivially `Copy`.
// 2.  **No Range Enforcement**: Coordinates are carried through as-is. Values
//     outside [-90, 90] / [-180, 180] are not clamped or rejected; the
//     projection math simply produces whatever arithmetic it produces. The
//     engine is intended for regional datasets that stay away from the poles
//     and the antimeridian.
// 3.  **Immutability**: Once constructed, a point never changes. Mutation at
//     higher levels (e.g. growing a bounding box) replaces points wholesale
//     rather than editing them in place.

use serde::{Deserialize, Serialize};

/// An immutable latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}
