//! Prelude module for common tilegrid types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tilegrid::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    geo::{LatLng, Point},
    map::Map,
    viewport::Viewport,
};

pub use crate::events::{EventManager, LayerEvent};

pub use crate::layers::tile::{
    TileDescriptor, TileGrid, TileGridBuilder, TileLayer, TileLayerOptions,
};

pub use crate::projection::{
    reference_for, Projection, Reprojector, SpatialReference, SpatialReferenceOptions,
};

pub use crate::rendering::{RecordingRenderer, RendererKind, TileRenderer};

pub use crate::tiles::{
    TemplateParam, TileIndex, TileSize, TileSystem, TileSystemConfig, TilingScheme, UrlResolver,
    UrlTemplate,
};

pub use crate::traits::{MapView, TileSchemeProvider};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
