use crate::core::geo::{LatLng, Point};
use crate::projection::SpatialReference;
use crate::traits::MapView;
use std::sync::Arc;

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    zooming: bool,
    /// Zoom of the previous animation frame
    frame_zoom: f64,
    spatial_reference: Arc<SpatialReference>,
}

impl Viewport {
    /// Creates a new viewport over the default web mercator reference
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::with_spatial_reference(center, zoom, size, Arc::new(SpatialReference::default()))
    }

    pub fn with_spatial_reference(
        center: LatLng,
        zoom: f64,
        size: Point,
        spatial_reference: Arc<SpatialReference>,
    ) -> Self {
        let min_zoom = spatial_reference.min_zoom();
        let max_zoom = spatial_reference.max_zoom();
        let zoom = zoom.clamp(min_zoom, max_zoom);
        Self {
            center,
            zoom,
            size,
            min_zoom,
            max_zoom,
            zooming: false,
            frame_zoom: zoom,
            spatial_reference,
        }
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if !self.zooming {
            self.frame_zoom = self.zoom;
        }
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.set_zoom(self.zoom);
    }

    /// Switches to another spatial reference, keeping the geographic center
    pub fn set_spatial_reference(&mut self, spatial_reference: Arc<SpatialReference>) {
        self.min_zoom = spatial_reference.min_zoom();
        self.max_zoom = spatial_reference.max_zoom();
        self.spatial_reference = spatial_reference;
        self.set_zoom(self.zoom);
    }

    /// Advances a zoom animation by one frame
    pub fn animate_zoom_to(&mut self, zoom: f64) {
        self.frame_zoom = self.zoom;
        self.zooming = true;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Ends a zoom animation at the zoom of the last frame
    pub fn end_zoom(&mut self) {
        self.zooming = false;
        self.frame_zoom = self.zoom;
    }

    /// Moves the view by a pixel offset at the current zoom
    pub fn pan(&mut self, delta: Point) {
        let center = self.projected_to_pixel(&self.projected_center(), self.zoom);
        let moved = self.pixel_to_projected(&center.add(&delta), self.zoom);
        self.set_center(self.spatial_reference.unproject(&moved));
    }

    /// Projected units per pixel at the current zoom
    pub fn current_resolution(&self) -> f64 {
        self.spatial_reference.resolution(self.zoom)
    }
}

impl MapView for Viewport {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn is_zooming(&self) -> bool {
        self.zooming
    }

    fn frame_zoom(&self) -> f64 {
        self.frame_zoom
    }

    fn size(&self) -> Point {
        self.size
    }

    fn spatial_reference(&self) -> &Arc<SpatialReference> {
        &self.spatial_reference
    }

    fn projected_center(&self) -> Point {
        self.spatial_reference.project(&self.center)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 1.0, Point::new(800.0, 600.0))
    }
}
