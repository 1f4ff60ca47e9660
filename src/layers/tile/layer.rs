//! Core TileLayer implementation

use super::{
    cache::{CachedScheme, SchemeCache},
    grid::{tile_zoom, TileGridBuilder},
    types::{TileGrid, TileLayerOptions},
};
use crate::{
    events::{EventManager, LayerEvent},
    projection::{reference_for, SpatialReference},
    rendering::{RendererKind, TileRenderer},
    tiles::{TileSize, TileSystem, TilingScheme, UrlResolver},
    traits::{MapView, TileSchemeProvider},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

const LAYER_TYPE: &str = "TileLayer";

#[derive(Serialize)]
struct LayerJsonRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    options: &'a TileLayerOptions,
}

#[derive(Deserialize)]
struct LayerJson {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    #[serde(default)]
    options: TileLayerOptions,
}

pub struct TileLayer {
    id: String,
    options: TileLayerOptions,
    cache: SchemeCache,
    events: EventManager,
    renderer: Option<Box<dyn TileRenderer>>,
}

impl TileLayer {
    /// Create a new tile layer, rejecting malformed options
    pub fn new(id: impl Into<String>, options: TileLayerOptions) -> Result<Self> {
        Self::validate(&options)?;
        Ok(Self::with_valid_options(id.into(), options))
    }

    /// OpenStreetMap layer with default options
    pub fn openstreetmap(id: impl Into<String>) -> Self {
        Self::with_valid_options(id.into(), TileLayerOptions::default())
    }

    fn with_valid_options(id: String, options: TileLayerOptions) -> Self {
        Self {
            id,
            options,
            cache: SchemeCache::new(),
            events: EventManager::new(),
            renderer: None,
        }
    }

    fn validate(options: &TileLayerOptions) -> Result<()> {
        options.tile_size.validate()?;
        if let Some(config) = &options.tile_system {
            TileSystem::from_config(config)?;
        }
        if let Some(reference) = &options.spatial_reference {
            reference_for(reference)?;
        }
        if !(0.0..=1.0).contains(&options.opacity) {
            return Err(Error::Layer(format!(
                "opacity must be between 0.0 and 1.0, got {}",
                options.opacity
            )));
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &TileLayerOptions {
        &self.options
    }

    /// Replaces the options and drops the cached scheme
    pub fn set_options(&mut self, options: TileLayerOptions) -> Result<()> {
        Self::validate(&options)?;
        self.options = options;
        self.cache.invalidate();
        Ok(())
    }

    pub fn tile_size(&self) -> TileSize {
        self.options.tile_size
    }

    /// URL of one tile, built from the configured template
    pub fn tile_url(&self, x: i64, y: i64, z: i32) -> Result<String> {
        self.url_resolver().resolve(x, y, z)
    }

    fn url_resolver(&self) -> UrlResolver<'_> {
        UrlResolver::new(
            &self.options.url_template,
            &self.options.subdomains,
            &self.options.url_params,
        )
    }

    /// Whether the layer draws anything at `zoom`
    pub fn is_visible(&self, zoom: f64) -> bool {
        self.options.visible
            && self.options.opacity > 0.0
            && self.options.min_zoom.map_or(true, |min| zoom >= min)
            && self.options.max_zoom.map_or(true, |max| zoom <= max)
    }

    /// Reference the layer's tiles are cut in: its own if configured, else the map's
    pub fn spatial_reference(&mut self, view: &dyn MapView) -> Result<Arc<SpatialReference>> {
        if let Some(reference) = self.cache.reference() {
            return Ok(reference.clone());
        }
        let reference = self.resolve_reference(view)?;
        if self.options.spatial_reference.is_some() {
            self.cache.store_reference(reference.clone());
        }
        Ok(reference)
    }

    fn resolve_reference(&self, view: &dyn MapView) -> Result<Arc<SpatialReference>> {
        match &self.options.spatial_reference {
            Some(options) => reference_for(options),
            None => Ok(view.spatial_reference().clone()),
        }
    }

    /// Base layer to inherit the tile system and extent from, if any
    fn inheritance_source<'v>(
        &self,
        view: &'v dyn MapView,
        reference: &Arc<SpatialReference>,
    ) -> Option<&'v dyn TileSchemeProvider> {
        if self.options.tile_system.is_some() {
            return None;
        }
        let map_reference = view.spatial_reference();
        if !Arc::ptr_eq(reference, map_reference) && !reference.same_as(map_reference) {
            return None;
        }
        view.base_layer()
            .filter(|base| base.provider_id() != self.id)
    }

    fn build_scheme(
        &self,
        view: &dyn MapView,
        reference: &Arc<SpatialReference>,
    ) -> Result<CachedScheme> {
        if let Some(base) = self.inheritance_source(view, reference) {
            if let Some(inherited) = base.tiling_scheme_for(view) {
                let scheme = TilingScheme::new(
                    *inherited.tile_system(),
                    inherited.full_extent().clone(),
                    self.options.tile_size,
                )?;
                return Ok(CachedScheme {
                    scheme,
                    map_reference: view.spatial_reference().clone(),
                    base_id: Some(base.provider_id().to_string()),
                });
            }
        }

        let tile_system = match &self.options.tile_system {
            Some(config) => TileSystem::from_config(config)?,
            None => TileSystem::default_for(reference.projection()),
        };
        let scheme = TilingScheme::new(
            tile_system,
            reference.full_extent().clone(),
            self.options.tile_size,
        )?;
        Ok(CachedScheme {
            scheme,
            map_reference: view.spatial_reference().clone(),
            base_id: None,
        })
    }

    /// Id of the base layer this layer would inherit from under `view`
    fn current_base_id<'v>(
        &self,
        view: &'v dyn MapView,
        reference: &Arc<SpatialReference>,
    ) -> Option<&'v str> {
        self.inheritance_source(view, reference)
            .map(|base| base.provider_id())
    }

    /// The active tiling scheme, built on first use and kept until invalidated
    pub fn tiling_scheme(&mut self, view: &dyn MapView) -> Result<TilingScheme> {
        let reference = self.spatial_reference(view)?;
        if let Some(entry) = self.cache.scheme() {
            let base_id = self.current_base_id(view, &reference);
            if entry.matches(view.spatial_reference(), base_id) {
                return Ok(entry.scheme.clone());
            }
        }

        let entry = self.build_scheme(view, &reference)?;

        #[cfg(feature = "debug")]
        log::debug!(
            "layer {}: tiling scheme built for {} (base {:?})",
            self.id,
            reference.projection().code(),
            entry.base_id
        );

        let scheme = entry.scheme.clone();
        self.cache.store_scheme(entry);
        Ok(scheme)
    }

    fn resolve(&mut self, view: &dyn MapView) -> Result<(TilingScheme, Arc<SpatialReference>)> {
        let scheme = self.tiling_scheme(view)?;
        Ok((scheme, self.spatial_reference(view)?))
    }

    /// Number of times the cached scheme has been invalidated
    pub fn scheme_generation(&self) -> u64 {
        self.cache.generation()
    }

    /// Tiles to draw for `view` at `zoom`, or at the zoom picked from the view.
    ///
    /// `Ok(None)` means there is nothing to compute: the layer is hidden, the
    /// view has no area, or no tiling scheme could be resolved.
    pub fn get_tiles(
        &mut self,
        view: &dyn MapView,
        zoom: Option<i32>,
    ) -> Result<Option<TileGrid>> {
        let size = view.size();
        if size.x <= 0.0 || size.y <= 0.0 || !self.is_visible(view.zoom()) {
            return Ok(None);
        }

        let (scheme, reference) = match self.resolve(view) {
            Ok(resolved) => resolved,
            Err(_err) => {
                #[cfg(feature = "debug")]
                log::debug!("layer {}: no tiling scheme: {}", self.id, _err);
                return Ok(None);
            }
        };

        let zoom = zoom.unwrap_or_else(|| tile_zoom(view));
        let grid = TileGridBuilder::new(&self.id, view, &scheme, reference, self.url_resolver())
            .repeat_world(self.options.repeat_world)
            .mask(self.options.mask.as_ref())
            .build(zoom)?;

        #[cfg(feature = "debug")]
        if self.options.debug {
            log::info!("layer {}: {} tiles at zoom {}", self.id, grid.len(), grid.zoom);
        }

        Ok(Some(grid))
    }

    /// Computes the grid for the view's zoom and hands it to the renderer
    pub fn render(&mut self, view: &dyn MapView) -> Result<Option<TileGrid>> {
        let grid = self.get_tiles(view, None)?;
        if let (Some(renderer), Some(grid)) = (self.renderer.as_mut(), grid.as_ref()) {
            renderer.render_grid(grid, view, self.options.opacity)?;
        }
        Ok(grid)
    }

    /// Drops what the renderer has drawn and tells listeners
    pub fn clear(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clear();
        }
        self.events.fire(LayerEvent::Clear {
            layer_id: self.id.clone(),
        });
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&LayerEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, callback);
    }

    /// Reacts to a map event
    pub fn handle_event(&mut self, event: &LayerEvent) {
        match event {
            LayerEvent::SpatialReferenceChange | LayerEvent::BaseLayerChange { .. } => {
                self.cache.invalidate();

                #[cfg(feature = "debug")]
                log::debug!("layer {}: tiling scheme dropped on {}", self.id, event.name());
            }
            LayerEvent::Clear { .. } => {}
        }
        self.events.fire(event.clone());
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    pub fn attach_renderer(&mut self, renderer: Box<dyn TileRenderer>) {
        self.renderer = Some(renderer);
    }

    pub fn renderer(&self) -> Option<&dyn TileRenderer> {
        self.renderer.as_deref()
    }

    /// Renderer the options ask for
    pub fn renderer_kind(&self) -> RendererKind {
        self.options.renderer
    }

    /// `{"type": "TileLayer", "id": ..., "options": ...}`
    pub fn to_json(&self) -> Result<String> {
        if !self.options.is_serializable() {
            return Err(Error::NotSerializable(format!(
                "layer {} has a function url template or parameter",
                self.id
            )));
        }
        Ok(serde_json::to_string(&LayerJsonRef {
            kind: LAYER_TYPE,
            id: &self.id,
            options: &self.options,
        })?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: LayerJson = serde_json::from_str(json)?;
        if parsed.kind != LAYER_TYPE {
            return Err(Error::Layer(format!(
                "expected a {} but got {}",
                LAYER_TYPE, parsed.kind
            )));
        }
        Self::new(parsed.id, parsed.options)
    }
}

impl TileSchemeProvider for TileLayer {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn tiling_scheme_for(&self, view: &dyn MapView) -> Option<TilingScheme> {
        let reference = match self.cache.reference() {
            Some(reference) => reference.clone(),
            None => self.resolve_reference(view).ok()?,
        };
        if let Some(entry) = self.cache.scheme() {
            if entry.matches(view.spatial_reference(), self.current_base_id(view, &reference)) {
                return Some(entry.scheme.clone());
            }
        }
        self.build_scheme(view, &reference)
            .ok()
            .map(|entry| entry.scheme)
    }
}

impl fmt::Debug for TileLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileLayer")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("cache", &self.cache)
            .field("renderer", &self.renderer.as_ref().map(|r| r.kind()))
            .finish()
    }
}
