pub mod bounding_box;
pub mod cluster;
pub mod cluster_engine;
pub mod geo_point;
pub mod marker;
pub mod tile_projector;
