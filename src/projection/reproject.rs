use super::SpatialReference;
use crate::core::geo::Point;
use std::sync::Arc;

/// Moves projected points between the map's spatial reference and a layer's.
///
/// When both sides are the same reference every call is a passthrough.
/// Otherwise points go through geographic space: unprojected by one
/// reference, projected by the other.
#[derive(Debug, Clone)]
pub struct Reprojector {
    map: Arc<SpatialReference>,
    layer: Arc<SpatialReference>,
    identity: bool,
}

impl Reprojector {
    pub fn new(map: Arc<SpatialReference>, layer: Arc<SpatialReference>) -> Self {
        let identity = Arc::ptr_eq(&map, &layer) || map.same_as(&layer);
        Self {
            map,
            layer,
            identity,
        }
    }

    /// True when no reprojection happens
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Map projected coordinate to layer projected coordinate
    pub fn to_layer(&self, point: &Point) -> Point {
        if self.identity {
            return *point;
        }
        self.layer.project(&self.map.unproject(point))
    }

    /// Layer projected coordinate to map projected coordinate
    pub fn to_map(&self, point: &Point) -> Point {
        if self.identity {
            return *point;
        }
        self.map.project(&self.layer.unproject(point))
    }

    pub fn layer_reference(&self) -> &Arc<SpatialReference> {
        &self.layer
    }

    pub fn map_reference(&self) -> &Arc<SpatialReference> {
        &self.map
    }
}
