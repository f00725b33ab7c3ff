// THEORY:
// The `Cluster` module represents a single group of proximate markers. A
// cluster is created by the engine the moment a marker cannot join any
// existing group, and from then on it only grows.
//
// Key architectural principles:
// 1.  **Seed-Derived Center**: The center is fixed at the position of the
//     first marker added and is never recomputed as a centroid. Every later
//     admission decision is measured against that original seed.
// 2.  **Frozen Acceptance Region**: When the center is set, the acceptance
//     region is computed exactly once - the degenerate point-box around the
//     center, grown by the engine's grid margin - and stored as an owned
//     snapshot. Growing membership never widens it, and no outside mutation
//     can reach it.
// 3.  **Identity-Based Membership**: Duplicate detection is by `MarkerId` via
//     a hash set, so a repeated add of the same marker is an O(1), silent
//     no-op.
// 4.  **Tight Bounds On Demand**: `bounds` is recomputed from the current
//     members each call. It is a distinct concept from the acceptance region
//     and is generally smaller; consumers that need the true extent of a
//     cluster use it instead.

use crate::core_modules::bounding_box::BoundingBox;
use crate::core_modules::cluster_engine::EngineConfig;
use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::marker::MarkerId;
use serde::Serialize;
use std::collections::HashSet;

/// One member of a cluster: the marker's stable id plus a copy of its
/// position taken at admission time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterMember {
    pub id: MarkerId,
    pub position: GeoPoint,
}

/// A group of markers sharing a spatial neighborhood.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    members: Vec<ClusterMember>,
    #[serde(skip)]
    member_ids: HashSet<MarkerId>,
    center: Option<GeoPoint>,
    accept_region: Option<BoundingBox>,
}

impl Cluster {
    pub(crate) fn new() -> Self {
        Self {
            members: Vec::new(),
            member_ids: HashSet::new(),
            center: None,
            accept_region: None,
        }
    }

    /// The number of markers in the cluster.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// The members in admission order.
    pub fn members(&self) -> &[ClusterMember] {
        &self.members
    }

    /// The position of the first marker admitted, or `None` while empty.
    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }

    /// The frozen acceptance region, or `None` while empty.
    pub fn accept_region(&self) -> Option<&BoundingBox> {
        self.accept_region.as_ref()
    }

    /// Adds a marker to the cluster. Returns false, with no state change, if
    /// this marker id is already a member.
    ///
    /// The first marker admitted fixes the center and freezes the acceptance
    /// region; neither is ever recomputed.
    pub fn add_marker(&mut self, id: MarkerId, position: GeoPoint, config: &EngineConfig) -> bool {
        if !self.member_ids.insert(id) {
            return false;
        }

        if self.center.is_none() {
            self.center = Some(position);

            let mut region = BoundingBox::around(position);
            config.extend_bounds_by_grid(&mut region);
            // Owned snapshot: later mutation of any other box cannot alter it.
            self.accept_region = Some(region);
        }

        self.members.push(ClusterMember { id, position });
        true
    }

    /// Tests a position against the frozen acceptance region, not against the
    /// live extent of the current members. False while the cluster is empty.
    pub fn is_marker_in_cluster_bounds(&self, position: GeoPoint) -> bool {
        self.accept_region
            .is_some_and(|region| region.contains(position))
    }

    /// The tight box covering the center seed and every current member,
    /// computed on demand. `None` while the cluster is empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let center = self.center?;

        let mut bounds = BoundingBox::around(center);
        for member in &self.members {
            bounds.extend(member.position);
        }

        Some(bounds)
    }
}
