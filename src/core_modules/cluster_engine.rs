// THEORY:
// The `ClusterEngine` is the orchestrator of the whole crate. It owns the
// growing list of clusters, drives the greedy single-pass assignment over the
// caller's marker sequence, and supplies the two geometric helpers the
// clusters themselves depend on: great-circle distance and grid-based bounds
// expansion.
//
// Key architectural principles:
// 1.  **Greedy, Order-Dependent Assignment**: Markers are visited strictly in
//     input order. Each unassigned marker is scored against every existing
//     cluster center by haversine distance; only the single nearest cluster's
//     frozen acceptance region is then consulted. A marker outside that one
//     region always opens a new cluster, even if the second-nearest cluster
//     would have accepted it. Ties go to the earliest-created cluster via a
//     strict less-than comparison.
// 2.  **Borrowed Input, Side-Table State**: The engine borrows the caller's
//     marker slice and never mutates it. Per-marker assignment lives in a side
//     table indexed by `MarkerId` (the marker's position in the input), seeded
//     from each marker's own flag at ingestion. The flag in the side table
//     flips false -> true exactly once, when a cluster first admits the
//     marker. Callers can therefore reuse the same marker data across any
//     number of independent runs.
// 3.  **Fixed Configuration**: `grid_size` and `zoom` are validated once at
//     construction and never change for the engine's lifetime, so every
//     acceptance region in one run is computed with the same grid geometry.
// 4.  **Determinism**: A run is single-threaded and synchronous, with no I/O
//     and no randomness. The resulting partition depends only on input order,
//     `grid_size`, and `zoom`. Complexity is O(n * k) for n markers and k
//     clusters formed so far.

use crate::core_modules::bounding_box::BoundingBox;
use crate::core_modules::cluster::Cluster;
use crate::core_modules::geo_point::GeoPoint;
use crate::core_modules::marker::{Marker, MarkerId};
use crate::core_modules::tile_projector::tile_projector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometers, as used by the haversine distance.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Highest zoom level the engine accepts. Tile pyramids are not defined
/// meaningfully past this depth, and `2^zoom` pixel arithmetic degrades.
pub const MAX_ZOOM: u32 = 30;

/// Rejected engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("grid size must be at least one pixel")]
    InvalidGridSize,
    #[error("zoom level {0} exceeds the maximum supported level {max}", max = MAX_ZOOM)]
    InvalidZoom(u32),
}

/// Tunables for one clustering run, fixed for the engine's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Acceptance-region margin around a cluster center, in screen pixels
    /// measured at `zoom`.
    pub grid_size: u32,
    /// Zoom level at which pixel distances are measured.
    pub zoom: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: 60,
            zoom: 9,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ClusterError> {
        if self.grid_size == 0 {
            return Err(ClusterError::InvalidGridSize);
        }
        if self.zoom > MAX_ZOOM {
            return Err(ClusterError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    /// Grows `bounds` by `grid_size` pixels of margin on every side, measured
    /// at `zoom`: both corners are projected to pixel space, pushed outward
    /// (pixel y grows downward, so the NE corner moves to a smaller y), then
    /// reprojected and extended back into the box.
    pub fn extend_bounds_by_grid(&self, bounds: &mut BoundingBox) {
        let grid = f64::from(self.grid_size);

        let mut ne_px = tile_projector::to_pixel(bounds.north_east(), self.zoom);
        ne_px.x += grid;
        ne_px.y -= grid;

        let mut sw_px = tile_projector::to_pixel(bounds.south_west(), self.zoom);
        sw_px.x -= grid;
        sw_px.y += grid;

        bounds.extend(tile_projector::to_lat_lng(ne_px, self.zoom));
        bounds.extend(tile_projector::to_lat_lng(sw_px, self.zoom));
    }
}

/// Great-circle distance between two points in kilometers, by the haversine
/// formula.
pub fn haversine_distance_km(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let d_lat = (p2.lat() - p1.lat()).to_radians();
    let d_lng = (p2.lng() - p1.lng()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + p1.lat().to_radians().cos() * p2.lat().to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Groups a borrowed sequence of markers into spatial clusters.
pub struct ClusterEngine<'m, P> {
    markers: &'m [Marker<P>],
    config: EngineConfig,
    /// Assignment side table, indexed by `MarkerId`. Seeded from each
    /// marker's own flag at ingestion, then mutated only by the engine.
    assigned: Vec<bool>,
    clusters: Vec<Cluster>,
}

impl<'m, P> ClusterEngine<'m, P> {
    /// Ingests the marker sequence and validates the configuration. Each
    /// marker receives a `MarkerId` equal to its index in `markers`.
    pub fn new(markers: &'m [Marker<P>], config: EngineConfig) -> Result<Self, ClusterError> {
        config.validate()?;

        let assigned = markers.iter().map(Marker::is_assigned).collect();

        Ok(Self {
            markers,
            config,
            assigned,
            clusters: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The clusters accumulated so far, in creation order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The ingested marker sequence.
    pub fn markers(&self) -> &'m [Marker<P>] {
        self.markers
    }

    /// Resolves a member id back to the caller's marker.
    pub fn marker(&self, id: MarkerId) -> &'m Marker<P> {
        &self.markers[id.0]
    }

    /// The side-table assignment flag for a marker.
    pub fn is_assigned(&self, id: MarkerId) -> bool {
        self.assigned[id.0]
    }

    /// Great-circle distance between two points in kilometers.
    pub fn distance(&self, p1: GeoPoint, p2: GeoPoint) -> f64 {
        haversine_distance_km(p1, p2)
    }

    /// Grows `bounds` by the engine's grid margin at the engine's zoom.
    pub fn extend_bounds_by_grid(&self, bounds: &mut BoundingBox) {
        self.config.extend_bounds_by_grid(bounds);
    }

    /// Runs the greedy single pass over the full marker sequence in input
    /// order and returns the accumulated cluster list. Markers whose flag was
    /// already set at ingestion are skipped.
    pub fn create_clusters(&mut self) -> &[Cluster] {
        let total = self.markers.len();
        let mut percent_complete = 0;

        for index in 0..total {
            if !self.assigned[index] {
                self.add_to_closest_cluster(MarkerId(index));
            }

            // Coarse decile progress events; observability only, not part of
            // the functional contract.
            let decile = index * 100 / total / 10;
            if decile > percent_complete {
                percent_complete = decile;
                tracing::info!("clustering progress: {}0%", percent_complete);
            }
        }

        &self.clusters
    }

    /// Scores every existing cluster center by haversine distance and admits
    /// the marker to the single nearest one, provided the marker lies inside
    /// that cluster's frozen acceptance region. Otherwise a new cluster is
    /// seeded with the marker and appended. The second-nearest cluster is
    /// never consulted.
    fn add_to_closest_cluster(&mut self, id: MarkerId) {
        let position = self.markers[id.0].position();

        let mut closest: Option<usize> = None;
        let mut closest_distance = f64::INFINITY;
        for (index, cluster) in self.clusters.iter().enumerate() {
            let Some(center) = cluster.center() else {
                continue;
            };

            let d = haversine_distance_km(center, position);
            // Strict comparison: the earliest-created cluster wins exact ties.
            if d < closest_distance {
                closest_distance = d;
                closest = Some(index);
            }
        }

        match closest {
            Some(index) if self.clusters[index].is_marker_in_cluster_bounds(position) => {
                if self.clusters[index].add_marker(id, position, &self.config) {
                    self.assigned[id.0] = true;
                }
            }
            _ => {
                let mut cluster = Cluster::new();
                if cluster.add_marker(id, position, &self.config) {
                    self.assigned[id.0] = true;
                }
                self.clusters.push(cluster);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(lat: f64, lng: f64) -> Marker<u32> {
        Marker::new(0, GeoPoint::new(lat, lng))
    }

    fn member_ids(cluster: &Cluster) -> Vec<usize> {
        cluster.members().iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn distance_matches_the_reference_value() {
        let engine = ClusterEngine::new(&[] as &[Marker<u32>], EngineConfig::default()).unwrap();

        let d = engine.distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));

        // One degree of longitude at the equator is about 111.19 km.
        assert!((d - 111.19).abs() < 0.1);
    }

    #[test]
    fn extend_bounds_by_grid_pushes_each_corner_by_the_grid_margin() {
        let config = EngineConfig::default();
        let point = GeoPoint::new(48.85, 2.35);
        let point_px = tile_projector::to_pixel(point, config.zoom);

        let mut bounds = BoundingBox::around(point);
        config.extend_bounds_by_grid(&mut bounds);

        let ne_px = tile_projector::to_pixel(bounds.north_east(), config.zoom);
        let sw_px = tile_projector::to_pixel(bounds.south_west(), config.zoom);

        assert!((ne_px.x - (point_px.x + 60.0)).abs() < 1e-3);
        assert!((ne_px.y - (point_px.y - 60.0)).abs() < 1e-3);
        assert!((sw_px.x - (point_px.x - 60.0)).abs() < 1e-3);
        assert!((sw_px.y - (point_px.y + 60.0)).abs() < 1e-3);
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        let config = EngineConfig {
            grid_size: 0,
            zoom: 9,
        };

        let result = ClusterEngine::new(&[] as &[Marker<u32>], config);

        assert_eq!(result.err(), Some(ClusterError::InvalidGridSize));
    }

    #[test]
    fn excessive_zoom_is_rejected() {
        let config = EngineConfig {
            grid_size: 60,
            zoom: 31,
        };

        let result = ClusterEngine::new(&[] as &[Marker<u32>], config);

        assert_eq!(result.err(), Some(ClusterError::InvalidZoom(31)));
    }

    #[test]
    fn nearby_markers_share_a_cluster_and_distant_ones_do_not() {
        let markers = vec![
            marker(0.0, 0.0),
            marker(0.0, 0.0001),
            marker(10.0, 10.0),
        ];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        let clusters = engine.create_clusters();

        assert_eq!(clusters.len(), 2);
        assert_eq!(member_ids(&clusters[0]), vec![0, 1]);
        assert_eq!(member_ids(&clusters[1]), vec![2]);
    }

    #[test]
    fn pre_flagged_markers_never_join_a_cluster() {
        let mut skipped = marker(0.0, 0.00005);
        skipped.set_assigned(true);

        let markers = vec![marker(0.0, 0.0), skipped, marker(0.0, 0.0001)];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        let clusters = engine.create_clusters();

        let placed: usize = clusters.iter().map(Cluster::size).sum();
        assert_eq!(placed, 2);
        assert!(
            clusters
                .iter()
                .all(|c| !member_ids(c).contains(&1))
        );
    }

    #[test]
    fn exact_ties_go_to_the_earliest_cluster() {
        // Two seeds equidistant from the probe at (0, 0). The second seed is
        // outside the first cluster's acceptance region, so it opens its own
        // cluster; the probe then ties between the two centers.
        let markers = vec![marker(0.0, -0.1), marker(0.0, 0.1), marker(0.0, 0.0)];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        let clusters = engine.create_clusters();

        assert_eq!(clusters.len(), 2);
        assert_eq!(member_ids(&clusters[0]), vec![0, 2]);
        assert_eq!(member_ids(&clusters[1]), vec![1]);
    }

    #[test]
    fn only_the_single_nearest_cluster_is_ever_consulted() {
        // At zoom 9 a 60px margin is roughly 0.1648 degrees at the equator.
        // The probe at (0.12, 0.12) sits inside the first cluster's region,
        // but the second cluster's center at (0.288, 0.12) is slightly nearer
        // (0.168 vs 0.170 degrees). The probe is outside that nearest
        // cluster's region, and the first cluster is never consulted as a
        // fallback, so the probe opens a third cluster.
        let markers = vec![
            marker(0.0, 0.0),
            marker(0.288, 0.12),
            marker(0.12, 0.12),
        ];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        let clusters = engine.create_clusters();

        assert!(clusters[0].is_marker_in_cluster_bounds(GeoPoint::new(0.12, 0.12)));
        assert_eq!(clusters.len(), 3);
        assert_eq!(member_ids(&clusters[2]), vec![2]);
    }

    #[test]
    fn every_unassigned_marker_lands_in_exactly_one_cluster() {
        let markers = vec![
            marker(0.0, 0.0),
            marker(0.05, 0.05),
            marker(20.0, 20.0),
            marker(20.05, 20.05),
            marker(-40.0, 100.0),
            marker(0.02, -0.02),
        ];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        let clusters = engine.create_clusters();

        let placed: usize = clusters.iter().map(Cluster::size).sum();
        assert_eq!(placed, markers.len());

        let mut all_ids: Vec<usize> = clusters.iter().flat_map(|c| member_ids(c)).collect();
        all_ids.sort_unstable();
        assert_eq!(all_ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn assignment_flag_flips_exactly_once_per_marker() {
        let markers = vec![marker(0.0, 0.0), marker(0.0, 0.0001)];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        assert!(!engine.is_assigned(MarkerId(0)));
        engine.create_clusters();
        assert!(engine.is_assigned(MarkerId(0)));
        assert!(engine.is_assigned(MarkerId(1)));

        // The caller's markers were never touched.
        assert!(!markers[0].is_assigned());
    }

    #[test]
    fn identical_runs_produce_identical_partitions() {
        let markers = vec![
            marker(51.5, -0.12),
            marker(51.52, -0.1),
            marker(48.85, 2.35),
            marker(51.51, -0.11),
        ];

        let mut first = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();
        let mut second = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();

        let a: Vec<Vec<usize>> = first.create_clusters().iter().map(member_ids).collect();
        let b: Vec<Vec<usize>> = second.create_clusters().iter().map(member_ids).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn clusters_serialize_for_shipping_to_a_client() {
        let markers = vec![marker(0.0, 0.0), marker(0.0, 0.0001)];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();
        engine.create_clusters();

        let json = serde_json::to_value(&engine.clusters()[0]).unwrap();

        assert!(json.get("center").is_some());
        assert!(json.get("accept_region").is_some());
        assert_eq!(json["members"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn payloads_resolve_through_member_ids() {
        let markers = vec![
            Marker::new("station-a", GeoPoint::new(0.0, 0.0)),
            Marker::new("station-b", GeoPoint::new(0.0, 0.0001)),
        ];
        let mut engine = ClusterEngine::new(&markers, EngineConfig::default()).unwrap();
        engine.create_clusters();

        let second_member = engine.clusters()[0].members()[1];

        assert_eq!(*engine.marker(second_member.id).payload(), "station-b");
    }
}
