// THEORY:
// The `tile_projector` module is the stateless geometric utility of the
// engine. It converts between lat/lng coordinates and continuous world pixel
// coordinates at a given zoom level using the standard Web-Mercator
// slippy-tile formulas (tile size 256, `n = 2^zoom` tiles per axis).
//
// Key architectural principles:
// 1.  **Statelessness**: Both conversions are pure functions of their inputs.
//     The projector holds no configuration; the zoom level is a parameter.
// 2.  **Continuity**: Results are continuous pixel coordinates, never snapped
//     to integer tile indices. The engine measures sub-tile pixel margins, so
//     snapping would destroy the acceptance-region geometry.
// 3.  **Known Divergence**: The forward formula diverges as latitude
//     approaches +/-90 degrees (the Mercator singularity) and produces NaN for
//     latitudes beyond the poles. This is deliberately left unguarded; the
//     engine does not clamp its inputs.

pub mod tile_projector {
    use crate::core_modules::geo_point::GeoPoint;
    use serde::{Deserialize, Serialize};
    use std::f64::consts::PI;

    /// Side length of one map tile in pixels, at every zoom level.
    pub const TILE_SIZE: f64 = 256.0;

    /// A continuous world pixel coordinate at some zoom level. The y axis
    /// grows downward (south).
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct PixelPoint {
        pub x: f64,
        pub y: f64,
    }

    /// Projects a lat/lng point to world pixel coordinates at `zoom`.
    ///
    /// Diverges near the poles and yields NaN beyond them; input is not
    /// clamped.
    pub fn to_pixel(point: GeoPoint, zoom: u32) -> PixelPoint {
        let n = (zoom as f64).exp2();
        let lat_rad = point.lat().to_radians();

        let tile_x = (point.lng() + 180.0) / 360.0 * n;
        let tile_y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) * n / 2.0;

        PixelPoint {
            x: tile_x * TILE_SIZE,
            y: tile_y * TILE_SIZE,
        }
    }

    /// Unprojects world pixel coordinates at `zoom` back to lat/lng. Inverse
    /// of `to_pixel`.
    pub fn to_lat_lng(pixel: PixelPoint, zoom: u32) -> GeoPoint {
        let n = (zoom as f64).exp2();
        let tile_x = pixel.x / TILE_SIZE;
        let tile_y = pixel.y / TILE_SIZE;

        let lng = tile_x / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * tile_y / n)).sinh().atan().to_degrees();

        GeoPoint::new(lat, lng)
    }
}
