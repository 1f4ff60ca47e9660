use crate::{
    core::{geo::Point, viewport::Viewport},
    events::LayerEvent,
    layers::tile::{TileGrid, TileLayer},
    projection::{reference_for, SpatialReference, SpatialReferenceOptions},
    traits::{MapView, TileSchemeProvider},
    Error, Result,
};
use std::sync::Arc;

/// A viewport seen together with the map's base layer
struct MapFrame<'a> {
    viewport: &'a Viewport,
    base: Option<&'a TileLayer>,
}

impl MapView for MapFrame<'_> {
    fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    fn is_zooming(&self) -> bool {
        self.viewport.is_zooming()
    }

    fn frame_zoom(&self) -> f64 {
        self.viewport.frame_zoom()
    }

    fn size(&self) -> Point {
        self.viewport.size()
    }

    fn spatial_reference(&self) -> &Arc<SpatialReference> {
        self.viewport.spatial_reference()
    }

    fn projected_center(&self) -> Point {
        self.viewport.projected_center()
    }

    fn base_layer(&self) -> Option<&dyn TileSchemeProvider> {
        self.base.map(|layer| layer as &dyn TileSchemeProvider)
    }
}

/// Owns the viewport, an optional base layer and overlay tile layers
#[derive(Debug, Default)]
pub struct Map {
    viewport: Viewport,
    base_layer: Option<TileLayer>,
    layers: Vec<TileLayer>,
}

impl Map {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            base_layer: None,
            layers: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn has_layer(&self, id: &str) -> bool {
        self.base_layer.as_ref().map_or(false, |base| base.id() == id)
            || self.layers.iter().any(|layer| layer.id() == id)
    }

    /// Adds an overlay layer; ids must be unique across the map
    pub fn add_layer(&mut self, layer: TileLayer) -> Result<()> {
        if self.has_layer(layer.id()) {
            return Err(Error::Layer(format!("duplicate layer id {}", layer.id())));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, id: &str) -> Option<TileLayer> {
        let position = self.layers.iter().position(|layer| layer.id() == id)?;
        Some(self.layers.remove(position))
    }

    /// Replaces the base layer and tells every layer, returning the old one
    pub fn set_base_layer(&mut self, layer: Option<TileLayer>) -> Result<Option<TileLayer>> {
        if let Some(layer) = &layer {
            if self.layers.iter().any(|overlay| overlay.id() == layer.id()) {
                return Err(Error::Layer(format!("duplicate layer id {}", layer.id())));
            }
        }
        let previous = std::mem::replace(&mut self.base_layer, layer);
        let layer_id = self.base_layer.as_ref().map(|base| base.id().to_string());
        self.notify(&LayerEvent::BaseLayerChange { layer_id });
        Ok(previous)
    }

    pub fn base_layer(&self) -> Option<&TileLayer> {
        self.base_layer.as_ref()
    }

    pub fn layer(&self, id: &str) -> Option<&TileLayer> {
        self.base_layer
            .iter()
            .chain(self.layers.iter())
            .find(|layer| layer.id() == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut TileLayer> {
        self.base_layer
            .iter_mut()
            .chain(self.layers.iter_mut())
            .find(|layer| layer.id() == id)
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// Switches the map to another spatial reference and tells every layer
    pub fn set_spatial_reference(&mut self, options: &SpatialReferenceOptions) -> Result<()> {
        let reference = reference_for(options)?;
        self.viewport.set_spatial_reference(reference);

        #[cfg(feature = "debug")]
        log::debug!("map spatial reference set to {}", options.projection);

        self.notify(&LayerEvent::SpatialReferenceChange);
        Ok(())
    }

    fn notify(&mut self, event: &LayerEvent) {
        for layer in self.base_layer.iter_mut().chain(self.layers.iter_mut()) {
            layer.handle_event(event);
        }
    }

    /// Tile grid of one layer under the current view.
    ///
    /// `Ok(None)` when no layer with that id is on the map, or when the layer
    /// has nothing to compute.
    pub fn get_tiles(&mut self, layer_id: &str, zoom: Option<i32>) -> Result<Option<TileGrid>> {
        let Map {
            viewport,
            base_layer,
            layers,
        } = self;
        let viewport = &*viewport;

        if let Some(base) = base_layer.as_mut().filter(|base| base.id() == layer_id) {
            let frame = MapFrame {
                viewport,
                base: None,
            };
            return base.get_tiles(&frame, zoom);
        }

        let frame = MapFrame {
            viewport,
            base: base_layer.as_ref(),
        };
        match layers.iter_mut().find(|layer| layer.id() == layer_id) {
            Some(layer) => layer.get_tiles(&frame, zoom),
            None => Ok(None),
        }
    }

    /// Renders the base layer then every overlay, returning the grids drawn
    pub fn render(&mut self) -> Result<Vec<TileGrid>> {
        let Map {
            viewport,
            base_layer,
            layers,
        } = self;
        let viewport = &*viewport;

        let mut grids = Vec::new();
        if let Some(base) = base_layer.as_mut() {
            let frame = MapFrame {
                viewport,
                base: None,
            };
            grids.extend(base.render(&frame)?);
        }

        let frame = MapFrame {
            viewport,
            base: base_layer.as_ref(),
        };
        for layer in layers.iter_mut() {
            grids.extend(layer.render(&frame)?);
        }
        Ok(grids)
    }
}
