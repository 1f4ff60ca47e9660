//! Seams between the grid computation and the map that hosts it

use crate::{
    core::{bounds::Bounds, geo::Point},
    projection::SpatialReference,
    tiles::TilingScheme,
};
use std::sync::Arc;

/// Read access to a map's view state and its coordinate transforms.
///
/// Four coordinate spaces are involved:
/// - projected: native units of the map's spatial reference
/// - pixel: projected divided by the resolution of some zoom, y pointing down
/// - container: pixels relative to the top-left of the visible area, at the
///   current zoom
/// - geographic, reached through the spatial reference
pub trait MapView {
    /// Current, possibly fractional, zoom
    fn zoom(&self) -> f64;

    /// Whether a zoom animation is running
    fn is_zooming(&self) -> bool;

    /// Zoom drawn by the previous animation frame
    fn frame_zoom(&self) -> f64;

    /// Width and height of the visible area in pixels
    fn size(&self) -> Point;

    fn spatial_reference(&self) -> &Arc<SpatialReference>;

    /// View centre in projected coordinates
    fn projected_center(&self) -> Point;

    /// Layer whose tiling scheme other layers may inherit
    fn base_layer(&self) -> Option<&dyn TileSchemeProvider> {
        None
    }

    fn resolution(&self, zoom: f64) -> f64 {
        self.spatial_reference().resolution(zoom)
    }

    fn projected_to_pixel(&self, point: &Point, zoom: f64) -> Point {
        let res = self.resolution(zoom);
        Point::new(point.x / res, -point.y / res)
    }

    fn pixel_to_projected(&self, point: &Point, zoom: f64) -> Point {
        let res = self.resolution(zoom);
        Point::new(point.x * res, -point.y * res)
    }

    /// Pixel coordinate at `zoom` to container coordinate at the current zoom
    fn pixel_to_container(&self, point: &Point, zoom: f64) -> Point {
        let current = self.zoom();
        let scale = self.resolution(zoom) / self.resolution(current);
        let center = self.projected_to_pixel(&self.projected_center(), current);
        let size = self.size();
        Point::new(
            point.x * scale - center.x + size.x / 2.0,
            point.y * scale - center.y + size.y / 2.0,
        )
    }

    /// Container coordinate at the current zoom to pixel coordinate at `zoom`
    fn container_to_pixel(&self, point: &Point, zoom: f64) -> Point {
        let current = self.zoom();
        let scale = self.resolution(zoom) / self.resolution(current);
        let center = self.projected_to_pixel(&self.projected_center(), current);
        let size = self.size();
        Point::new(
            (point.x + center.x - size.x / 2.0) / scale,
            (point.y + center.y - size.y / 2.0) / scale,
        )
    }

    fn container_to_projected(&self, point: &Point) -> Point {
        let zoom = self.zoom();
        self.pixel_to_projected(&self.container_to_pixel(point, zoom), zoom)
    }

    /// The visible area in container coordinates
    fn container_extent(&self) -> Bounds {
        let size = self.size();
        Bounds::from_coords(0.0, 0.0, size.x, size.y)
    }

    /// The visible area in pixel coordinates at the current zoom
    fn pixel_extent(&self) -> Bounds {
        let zoom = self.zoom();
        self.container_extent()
            .convert(|p| self.container_to_pixel(p, zoom))
    }
}

/// A layer able to share its resolved tiling scheme
pub trait TileSchemeProvider {
    fn provider_id(&self) -> &str;

    /// The scheme this layer tiles with under `view`, if it can be resolved
    fn tiling_scheme_for(&self, view: &dyn MapView) -> Option<TilingScheme>;
}
