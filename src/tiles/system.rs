//! Tile systems: where tile `(0, 0)` sits in projected space and which way
//! columns and rows grow from there.

use crate::{
    core::{constants::WEB_MERCATOR_EXTENT, geo::Point},
    projection::Projection,
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Tile system as written in configuration: a preset name or `[sx, sy, ox, oy]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileSystemConfig {
    Named(String),
    Params([f64; 4]),
}

/// Axis orientation and origin of a tile grid.
///
/// `scale_x = 1` means columns grow eastward from the origin, `-1` westward.
/// `scale_y = -1` means rows grow southward from a top origin, `1` northward
/// from a bottom origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSystem {
    pub scale_x: f64,
    pub scale_y: f64,
    pub origin: Point,
}

impl TileSystem {
    pub fn new(scale_x: f64, scale_y: f64, origin_x: f64, origin_y: f64) -> Result<Self> {
        for scale in [scale_x, scale_y] {
            if scale != 1.0 && scale != -1.0 {
                return Err(Error::InvalidTileSystem(format!(
                    "axis scale must be 1 or -1, got {}",
                    scale
                )));
            }
        }
        Ok(Self {
            scale_x,
            scale_y,
            origin: Point::new(origin_x, origin_y),
        })
    }

    /// Google/OSM layout: origin top-left of the mercator world, rows grow south
    pub fn web_mercator() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: -1.0,
            origin: Point::new(-WEB_MERCATOR_EXTENT, WEB_MERCATOR_EXTENT),
        }
    }

    /// TMS layout over the mercator world: origin bottom-left, rows grow north
    pub fn tms_global_mercator() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            origin: Point::new(-WEB_MERCATOR_EXTENT, -WEB_MERCATOR_EXTENT),
        }
    }

    /// TMS layout over longitude/latitude degrees
    pub fn tms_global_geodetic() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            origin: Point::new(-180.0, -90.0),
        }
    }

    pub fn baidu() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            origin: Point::new(0.0, 0.0),
        }
    }

    /// Looks up a preset by name, ignoring case
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "web-mercator" => Ok(Self::web_mercator()),
            "tms-global-mercator" => Ok(Self::tms_global_mercator()),
            "tms-global-geodetic" => Ok(Self::tms_global_geodetic()),
            "baidu" => Ok(Self::baidu()),
            _ => Err(Error::InvalidTileSystem(format!("unknown preset {}", name))),
        }
    }

    pub fn from_config(config: &TileSystemConfig) -> Result<Self> {
        match config {
            TileSystemConfig::Named(name) => Self::from_name(name),
            TileSystemConfig::Params([sx, sy, ox, oy]) => Self::new(*sx, *sy, *ox, *oy),
        }
    }

    /// The tile system a projection uses when none is configured
    pub fn default_for(projection: Projection) -> Self {
        match projection {
            Projection::EPSG4326 => Self::tms_global_geodetic(),
            Projection::Identity => Self {
                scale_x: 1.0,
                scale_y: -1.0,
                origin: Point::new(0.0, 0.0),
            },
            Projection::EPSG3857 => Self::web_mercator(),
        }
    }
}
