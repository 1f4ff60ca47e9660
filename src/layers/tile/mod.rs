//! Tile layer implementation
//!
//! This module provides the tile layer facade and the grid computation behind it:
//! - Lazily resolved, cached tiling schemes
//! - Visible tile enumeration with world wrapping and reprojection
//! - Culling and back-to-front ordering

pub mod cache;
pub mod grid;
pub mod layer;
pub mod types;

pub use cache::{CachedScheme, SchemeCache};
pub use grid::{tile_zoom, TileGridBuilder};
pub use layer::TileLayer;
pub use types::{tile_id, TileDescriptor, TileGrid, TileLayerOptions};
