//! Core data types for tile layer functionality

use crate::{
    core::{bounds::Bounds, geo::Point},
    prelude::HashMap,
    projection::SpatialReferenceOptions,
    rendering::RendererKind,
    tiles::{TemplateParam, TileSize, TileSystemConfig, UrlTemplate},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLayerOptions {
    pub url_template: UrlTemplate,
    pub subdomains: Vec<String>,
    /// Repeat the world horizontally and vertically past its edges
    pub repeat_world: bool,
    /// Reference the tiles are cut in; the map's when absent
    pub spatial_reference: Option<SpatialReferenceOptions>,
    pub tile_size: TileSize,
    pub tile_system: Option<TileSystemConfig>,
    /// Log every grid computed by the layer
    pub debug: bool,
    pub renderer: RendererKind,
    pub visible: bool,
    pub opacity: f32,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// Only tiles under this projected box are drawn
    pub mask: Option<Bounds>,
    pub url_params: HashMap<String, TemplateParam>,
}

impl TileLayerOptions {
    /// Whether `to_json` can represent these options
    pub fn is_serializable(&self) -> bool {
        self.url_template.is_serializable()
            && self.url_params.values().all(TemplateParam::is_serializable)
    }
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: UrlTemplate::default(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            repeat_world: true,
            spatial_reference: None,
            tile_size: TileSize::default(),
            tile_system: None,
            debug: false,
            renderer: RendererKind::Canvas,
            visible: true,
            opacity: 1.0,
            min_zoom: None,
            max_zoom: None,
            mask: None,
            url_params: HashMap::default(),
        }
    }
}

/// One tile to draw, positioned in map pixel space at the grid's zoom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub url: String,
    /// Top-left corner
    pub point: Point,
    pub id: String,
    pub zoom: i32,
    /// Column the url was built from
    pub x: i64,
    /// Row the url was built from
    pub y: i64,
    pub extent: Bounds,
    pub size: TileSize,
}

/// The tiles covering a view at one zoom, farthest from the view centre first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub zoom: i32,
    /// Union of the tile extents, `None` when there are no tiles
    pub extent: Option<Bounds>,
    pub tiles: Vec<TileDescriptor>,
}

impl TileGrid {
    pub fn empty(zoom: i32) -> Self {
        Self {
            zoom,
            extent: None,
            tiles: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// First tile with this id.
    ///
    /// World copies of a tile share its id, so with `repeat_world` this is
    /// only the copy drawn first; use [`TileGrid::copies`] for all of them.
    pub fn get(&self, id: &str) -> Option<&TileDescriptor> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    /// Every copy of a tile, in drawing order
    pub fn copies<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TileDescriptor> + 'a {
        self.tiles.iter().filter(move |tile| tile.id == id)
    }
}

/// Tile id: layer id, row, column and zoom
pub fn tile_id(layer_id: &str, x: i64, y: i64, zoom: i32) -> String {
    format!("{}__{}__{}__{}", layer_id, y, x, zoom)
}
