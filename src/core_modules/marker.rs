// THEORY:
// The `Marker` module defines the caller-facing input of the engine: a point
// of interest with a geographic position and an opaque payload.
//
// Key architectural principles:
// 1.  **Opaque Payload**: The engine never inspects the payload. It is a
//     generic parameter so callers can attach whatever they will need when
//     rendering the clustered result (an id, a title, a whole record).
// 2.  **Caller Ownership**: Markers are supplied by the caller and only ever
//     borrowed by the engine. During a run the engine tracks assignment in its
//     own side table keyed by `MarkerId`, so the same marker data can be fed
//     to any number of independent runs without being disturbed.
// 3.  **Pre-Flagging**: The `assigned` flag on the marker itself is read once,
//     at ingestion, to seed that side table. A caller can pre-flag a marker to
//     exclude it from clustering entirely.

use crate::core_modules::geo_point::GeoPoint;
use serde::{Deserialize, Serialize};

/// Stable identity of a marker within one engine: its index in the input
/// sequence, fixed at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub usize);

/// A point of interest with a position and an opaque payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker<P> {
    position: GeoPoint,
    payload: P,
    assigned: bool,
}

impl<P> Marker<P> {
    pub fn new(payload: P, position: GeoPoint) -> Self {
        Self {
            position,
            payload,
            assigned: false,
        }
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Whether this marker is flagged as already assigned. The engine reads
    /// this once, at ingestion.
    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    /// Pre-flags the marker so the next engine that ingests it skips it.
    pub fn set_assigned(&mut self, assigned: bool) {
        self.assigned = assigned;
    }
}
