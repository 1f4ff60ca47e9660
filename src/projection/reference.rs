//! Spatial references: a projection plus the resolution table and world
//! extent that define how projected space maps to pixels at each zoom.

use crate::{
    core::{
        bounds::Bounds,
        constants::{EARTH_RADIUS, WEB_MERCATOR_CIRCUMFERENCE, WEB_MERCATOR_EXTENT},
        geo::{LatLng, Point},
    },
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Projections a spatial reference can be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Spherical web mercator, meters
    EPSG3857,
    /// Plate carrée, degrees
    EPSG4326,
    /// Planar coordinates passed through untouched
    Identity,
}

impl Projection {
    /// Parses a projection code, ignoring case
    pub fn from_code(code: &str) -> Result<Self> {
        match code.to_ascii_uppercase().as_str() {
            "EPSG:3857" | "EPSG:900913" => Ok(Projection::EPSG3857),
            "EPSG:4326" => Ok(Projection::EPSG4326),
            "IDENTITY" => Ok(Projection::Identity),
            _ => Err(Error::UnknownProjection(code.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Projection::EPSG3857 => "EPSG:3857",
            Projection::EPSG4326 => "EPSG:4326",
            Projection::Identity => "IDENTITY",
        }
    }

    /// Geographic coordinate to projected coordinate
    pub fn project(&self, lat_lng: &LatLng) -> Point {
        match self {
            Projection::EPSG3857 => {
                let lat = LatLng::clamp_lat(lat_lng.lat);
                let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
                let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;
                Point::new(x, y)
            }
            Projection::EPSG4326 | Projection::Identity => Point::new(lat_lng.lng, lat_lng.lat),
        }
    }

    /// Projected coordinate back to geographic coordinate
    pub fn unproject(&self, point: &Point) -> LatLng {
        match self {
            Projection::EPSG3857 => {
                let lng = (point.x / EARTH_RADIUS).to_degrees();
                let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
                LatLng::new(lat, lng)
            }
            Projection::EPSG4326 | Projection::Identity => LatLng::new(point.y, point.x),
        }
    }

    /// Resolution table used when none is configured
    fn default_resolutions(&self) -> Vec<f64> {
        match self {
            Projection::EPSG3857 => (0..=22)
                .map(|z| WEB_MERCATOR_CIRCUMFERENCE / 256.0 / 2_f64.powi(z))
                .collect(),
            Projection::EPSG4326 => (0..20).map(|z| 180.0 / (128.0 * 2_f64.powi(z))).collect(),
            Projection::Identity => (0..=17).map(|z| 2_f64.powi(17 - z)).collect(),
        }
    }

    /// World extent used when none is configured
    fn default_full_extent(&self) -> FullExtent {
        match self {
            Projection::EPSG3857 => FullExtent {
                top: WEB_MERCATOR_EXTENT,
                left: -WEB_MERCATOR_EXTENT,
                bottom: -WEB_MERCATOR_EXTENT,
                right: WEB_MERCATOR_EXTENT,
            },
            Projection::EPSG4326 => FullExtent {
                top: 90.0,
                left: -180.0,
                bottom: -90.0,
                right: 180.0,
            },
            Projection::Identity => FullExtent {
                top: 200_000.0,
                left: -200_000.0,
                bottom: -200_000.0,
                right: 200_000.0,
            },
        }
    }
}

/// World extent in projected coordinates, as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FullExtent {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl FullExtent {
    pub fn to_bounds(&self) -> Bounds {
        Bounds::from_corners(
            Point::new(self.left, self.top),
            Point::new(self.right, self.bottom),
        )
    }
}

/// Serializable description of a spatial reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialReferenceOptions {
    pub projection: String,
    pub resolutions: Option<Vec<f64>>,
    pub full_extent: Option<FullExtent>,
}

impl SpatialReferenceOptions {
    pub fn new(projection: &str) -> Self {
        Self {
            projection: projection.to_string(),
            ..Self::default()
        }
    }
}

impl Default for SpatialReferenceOptions {
    fn default() -> Self {
        Self {
            projection: Projection::EPSG3857.code().to_string(),
            resolutions: None,
            full_extent: None,
        }
    }
}

/// A projection with its zoom-indexed resolution table and world extent
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialReference {
    projection: Projection,
    resolutions: Vec<f64>,
    full_extent: Bounds,
}

impl SpatialReference {
    /// Builds a reference, validating the resolution table
    pub fn from_options(options: &SpatialReferenceOptions) -> Result<Self> {
        let projection = Projection::from_code(&options.projection)?;
        let resolutions = options
            .resolutions
            .clone()
            .unwrap_or_else(|| projection.default_resolutions());

        if resolutions.is_empty() {
            return Err(Error::InvalidResolution(0.0));
        }
        if let Some(bad) = resolutions.iter().find(|r| **r <= 0.0 || !r.is_finite()) {
            return Err(Error::InvalidResolution(*bad));
        }

        let full_extent = options
            .full_extent
            .unwrap_or_else(|| projection.default_full_extent())
            .to_bounds();

        Ok(Self {
            projection,
            resolutions,
            full_extent,
        })
    }

    /// The default reference for a projection
    pub fn for_projection(projection: Projection) -> Self {
        Self {
            projection,
            resolutions: projection.default_resolutions(),
            full_extent: projection.default_full_extent().to_bounds(),
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    /// World extent in projected coordinates
    pub fn full_extent(&self) -> &Bounds {
        &self.full_extent
    }

    pub fn min_zoom(&self) -> f64 {
        0.0
    }

    pub fn max_zoom(&self) -> f64 {
        (self.resolutions.len() - 1) as f64
    }

    /// Projected units per pixel at a possibly fractional zoom.
    ///
    /// Fractional zooms interpolate linearly between the two neighbouring
    /// table entries; zooms outside the table are clamped to it.
    pub fn resolution(&self, zoom: f64) -> f64 {
        let last = self.resolutions.len() - 1;
        let z = zoom.floor().clamp(0.0, last as f64) as usize;
        let res = self.resolutions[z];
        let t = zoom - z as f64;
        if t > 0.0 && z < last {
            let next = self.resolutions[z + 1];
            return res + (next - res) * t;
        }
        res
    }

    pub fn project(&self, lat_lng: &LatLng) -> Point {
        self.projection.project(lat_lng)
    }

    pub fn unproject(&self, point: &Point) -> LatLng {
        self.projection.unproject(point)
    }

    /// Two references are the same when they project identically and share
    /// the resolution table and world extent
    pub fn same_as(&self, other: &SpatialReference) -> bool {
        self == other
    }
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self::for_projection(Projection::EPSG3857)
    }
}
