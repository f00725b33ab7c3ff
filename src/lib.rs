// THEORY:
// This file is the main entry point for the `precluster` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like a tile server or batch
// export job).
//
// The primary goal is to export the `ClusterEngine` and its associated data
// structures (`EngineConfig`, `Cluster`, `Marker`, etc.) as the clean,
// high-level interface for the entire clustering engine. The geometric
// building blocks live in `core_modules` and are re-exported here so that a
// consumer never has to spell out internal module paths.

pub mod core_modules;

pub use crate::core_modules::bounding_box::BoundingBox;
pub use crate::core_modules::cluster::{Cluster, ClusterMember};
pub use crate::core_modules::cluster_engine::{
    ClusterEngine, ClusterError, EngineConfig, haversine_distance_km,
};
pub use crate::core_modules::geo_point::GeoPoint;
pub use crate::core_modules::marker::{Marker, MarkerId};
pub use crate::core_modules::tile_projector::tile_projector;
