//! # tilegrid
//!
//! Computes the visible tile grid of a slippy-map tile layer.
//!
//! Given a map viewport (center, size, possibly fractional zoom) and a tiling
//! scheme (tile size, origin, axis orientation, coverage extent), the crate
//! enumerates the tiles covering the viewport, resolves their URLs, places
//! them in map pixel space, reprojects them when the layer and the map use
//! different spatial references, culls the invisible ones and orders the rest
//! back to front.

pub mod core;
pub mod events;
pub mod layers;
pub mod prelude;
pub mod projection;
pub mod rendering;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    geo::{LatLng, Point},
    map::Map,
    viewport::Viewport,
};

pub use layers::tile::{TileDescriptor, TileGrid, TileGridBuilder, TileLayer, TileLayerOptions};

pub use projection::{Projection, Reprojector, SpatialReference, SpatialReferenceOptions};

pub use tiles::{
    TileIndex, TileSize, TileSystem, TileSystemConfig, TilingScheme, UrlResolver, UrlTemplate,
};

pub use traits::{MapView, TileSchemeProvider};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("No value provided for url template variable {{{placeholder}}}")]
    Template { placeholder: String },

    #[error("Invalid tile size: {width}x{height}")]
    InvalidTileSize { width: u32, height: u32 },

    #[error("Invalid resolution: {0}")]
    InvalidResolution(f64),

    #[error("Invalid tile system: {0}")]
    InvalidTileSystem(String),

    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Not serializable: {0}")]
    NotSerializable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Layer error: {0}")]
    Layer(String),
}

/// Error type alias for convenience
pub type Error = MapError;
