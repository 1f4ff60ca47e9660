//! Lazily built tiling scheme of a layer

use crate::{projection::SpatialReference, tiles::TilingScheme};
use std::sync::Arc;

/// A resolved scheme and what it was resolved against
#[derive(Debug, Clone)]
pub struct CachedScheme {
    pub scheme: TilingScheme,
    /// Map reference in effect when the scheme was built
    pub map_reference: Arc<SpatialReference>,
    /// Base layer the tile system and extent were inherited from
    pub base_id: Option<String>,
}

impl CachedScheme {
    /// True when the scheme was built under the same map reference and base layer
    pub fn matches(&self, map_reference: &Arc<SpatialReference>, base_id: Option<&str>) -> bool {
        let same_reference = Arc::ptr_eq(&self.map_reference, map_reference)
            || self.map_reference.same_as(map_reference);
        same_reference && self.base_id.as_deref() == base_id
    }
}

/// Holds a layer's scheme and spatial reference until something invalidates them
#[derive(Debug, Default)]
pub struct SchemeCache {
    entry: Option<CachedScheme>,
    reference: Option<Arc<SpatialReference>>,
    generation: u64,
}

impl SchemeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(&self) -> Option<&CachedScheme> {
        self.entry.as_ref()
    }

    pub fn store_scheme(&mut self, entry: CachedScheme) {
        self.entry = Some(entry);
    }

    /// The layer's own configured reference, once resolved
    pub fn reference(&self) -> Option<&Arc<SpatialReference>> {
        self.reference.as_ref()
    }

    pub fn store_reference(&mut self, reference: Arc<SpatialReference>) {
        self.reference = Some(reference);
    }

    /// Drops both entries and bumps the generation
    pub fn invalidate(&mut self) {
        self.entry = None;
        self.reference = None;
        self.generation += 1;
    }

    /// Number of invalidations so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
