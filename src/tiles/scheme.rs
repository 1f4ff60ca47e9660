//! Mapping between projected coordinates and tile indices.

use super::system::TileSystem;
use crate::{
    core::{bounds::Bounds, constants::TILE_INDEX_EPSILON, geo::Point},
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Tile size in pixels, written `[width, height]` in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidTileSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl From<[u32; 2]> for TileSize {
    fn from([width, height]: [u32; 2]) -> Self {
        Self::new(width, height)
    }
}

impl From<TileSize> for [u32; 2] {
    fn from(size: TileSize) -> Self {
        [size.width, size.height]
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::square(crate::core::constants::TILE_SIZE)
    }
}

/// A tile address.
///
/// `(x, y)` is the raw index, possibly outside the world when the viewport
/// shows repeated copies of it. `(idx, idy)` is the same tile folded back into
/// the one-world range; it names the image to fetch and cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub x: i64,
    pub y: i64,
    pub idx: i64,
    pub idy: i64,
}

impl TileIndex {
    /// An index that needs no wrapping
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y, idx: x, idy: y }
    }

    pub fn is_wrapped(&self) -> bool {
        self.x != self.idx || self.y != self.idy
    }
}

/// Half-open column/row range covering one world at some resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl IndexRange {
    pub fn columns(&self) -> i64 {
        self.x_max - self.x_min
    }

    pub fn rows(&self) -> i64 {
        self.y_max - self.y_min
    }
}

/// Tile system, coverage extent and tile size of one tile layer
#[derive(Debug, Clone, PartialEq)]
pub struct TilingScheme {
    tile_system: TileSystem,
    full_extent: Bounds,
    tile_size: TileSize,
}

impl TilingScheme {
    pub fn new(tile_system: TileSystem, full_extent: Bounds, tile_size: TileSize) -> Result<Self> {
        tile_size.validate()?;
        Ok(Self {
            tile_system,
            full_extent,
            tile_size,
        })
    }

    pub fn tile_system(&self) -> &TileSystem {
        &self.tile_system
    }

    /// Coverage extent in projected coordinates
    pub fn full_extent(&self) -> &Bounds {
        &self.full_extent
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Projected span of one tile at `resolution`
    fn span(&self, resolution: f64) -> Result<(f64, f64)> {
        if resolution <= 0.0 || !resolution.is_finite() {
            return Err(Error::InvalidResolution(resolution));
        }
        Ok((
            self.tile_size.width as f64 * resolution,
            self.tile_size.height as f64 * resolution,
        ))
    }

    /// Fractional tile position of a projected point, measured from the origin
    /// along the directions columns and rows grow
    fn grid_position(&self, point: &Point, span: (f64, f64)) -> (f64, f64) {
        let system = &self.tile_system;
        (
            (point.x - system.origin.x) * system.scale_x / span.0,
            (point.y - system.origin.y) * system.scale_y / span.1,
        )
    }

    /// Index of the tile containing a projected point
    pub fn index_of(&self, point: &Point, resolution: f64) -> Result<TileIndex> {
        let span = self.span(resolution)?;
        let (col, row) = self.grid_position(point, span);
        Ok(TileIndex::new(
            (col + TILE_INDEX_EPSILON).floor() as i64,
            (row + TILE_INDEX_EPSILON).floor() as i64,
        ))
    }

    /// Column/row range of the coverage extent at `resolution`
    pub fn full_index_range(&self, resolution: f64) -> Result<IndexRange> {
        let span = self.span(resolution)?;
        let extent = &self.full_extent;
        let (c0, r0) = self.grid_position(&Point::new(extent.min.x, extent.max.y), span);
        let (c1, r1) = self.grid_position(&Point::new(extent.max.x, extent.min.y), span);

        let bounds = |a: f64, b: f64| {
            let min = (a.min(b) + TILE_INDEX_EPSILON).floor() as i64;
            let max = (a.max(b) - TILE_INDEX_EPSILON).ceil() as i64;
            (min, max.max(min + 1))
        };
        let (x_min, x_max) = bounds(c0, c1);
        let (y_min, y_max) = bounds(r0, r1);

        Ok(IndexRange {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// The tile `d_col` columns right of and `d_row` rows below `(x, y)` on screen.
    ///
    /// With `wrap`, `(idx, idy)` of the result is folded into the one-world
    /// range while `(x, y)` keeps the raw position.
    pub fn neighbor_index(
        &self,
        x: i64,
        y: i64,
        d_col: i64,
        d_row: i64,
        resolution: f64,
        wrap: bool,
    ) -> Result<TileIndex> {
        let system = &self.tile_system;
        let nx = x + system.scale_x as i64 * d_col;
        let ny = y - system.scale_y as i64 * d_row;
        if !wrap {
            self.span(resolution)?;
            return Ok(TileIndex::new(nx, ny));
        }

        let range = self.full_index_range(resolution)?;
        Ok(TileIndex {
            x: nx,
            y: ny,
            idx: range.x_min + (nx - range.x_min).rem_euclid(range.columns()),
            idy: range.y_min + (ny - range.y_min).rem_euclid(range.rows()),
        })
    }

    /// Projected coordinates of both x edges and both y edges of a tile
    fn edges(&self, x: i64, y: i64, resolution: f64) -> Result<(f64, f64, f64, f64)> {
        let (w, h) = self.span(resolution)?;
        let system = &self.tile_system;
        let x0 = system.origin.x + system.scale_x * x as f64 * w;
        let x1 = system.origin.x + system.scale_x * (x + 1) as f64 * w;
        let y0 = system.origin.y + system.scale_y * y as f64 * h;
        let y1 = system.origin.y + system.scale_y * (y + 1) as f64 * h;
        Ok((x0, x1, y0, y1))
    }

    /// Visual top-left corner of a tile in projected coordinates
    pub fn nw_corner(&self, x: i64, y: i64, resolution: f64) -> Result<Point> {
        let (x0, x1, y0, y1) = self.edges(x, y, resolution)?;
        Ok(Point::new(x0.min(x1), y0.max(y1)))
    }

    /// Visual bottom-right corner of a tile in projected coordinates
    pub fn se_corner(&self, x: i64, y: i64, resolution: f64) -> Result<Point> {
        let (x0, x1, y0, y1) = self.edges(x, y, resolution)?;
        Ok(Point::new(x0.max(x1), y0.min(y1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::constants::WEB_MERCATOR_EXTENT,
        projection::{Projection, SpatialReference},
    };

    fn mercator_scheme() -> TilingScheme {
        let sr = SpatialReference::default();
        TilingScheme::new(
            TileSystem::web_mercator(),
            sr.full_extent().clone(),
            TileSize::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let result = TilingScheme::new(
            TileSystem::web_mercator(),
            Bounds::default(),
            TileSize::new(0, 256),
        );
        assert!(matches!(result, Err(Error::InvalidTileSize { .. })));
    }

    #[test]
    fn test_non_positive_resolution_rejected() {
        let scheme = mercator_scheme();
        assert!(matches!(
            scheme.index_of(&Point::default(), 0.0),
            Err(Error::InvalidResolution(_))
        ));
        assert!(scheme.nw_corner(0, 0, -1.0).is_err());
    }

    #[test]
    fn test_index_of_web_mercator() {
        let scheme = mercator_scheme();
        let res = SpatialReference::default().resolution(2.0);

        // north-west quadrant of the world at zoom 2 holds tiles 0..2
        let index = scheme.index_of(&Point::new(-WEB_MERCATOR_EXTENT + 1.0, WEB_MERCATOR_EXTENT - 1.0), res).unwrap();
        assert_eq!((index.x, index.y), (0, 0));

        let index = scheme.index_of(&Point::new(1.0, -1.0), res).unwrap();
        assert_eq!((index.x, index.y), (2, 2));
        assert!(!index.is_wrapped());
    }

    #[test]
    fn test_index_of_tms_counts_rows_northward() {
        let sr = SpatialReference::default();
        let scheme = TilingScheme::new(
            TileSystem::tms_global_mercator(),
            sr.full_extent().clone(),
            TileSize::default(),
        )
        .unwrap();
        let res = sr.resolution(1.0);

        let south = scheme.index_of(&Point::new(10.0, -10.0), res).unwrap();
        let north = scheme.index_of(&Point::new(10.0, 10.0), res).unwrap();
        assert_eq!(south.y, 0);
        assert_eq!(north.y, 1);
    }

    #[test]
    fn test_full_index_range() {
        let scheme = mercator_scheme();
        let sr = SpatialReference::default();
        let range = scheme.full_index_range(sr.resolution(3.0)).unwrap();
        assert_eq!(range, IndexRange { x_min: 0, x_max: 8, y_min: 0, y_max: 8 });

        // geodetic world is two tiles wide and one tall at zoom 1
        let geodetic = SpatialReference::for_projection(Projection::EPSG4326);
        let scheme = TilingScheme::new(
            TileSystem::tms_global_geodetic(),
            geodetic.full_extent().clone(),
            TileSize::default(),
        )
        .unwrap();
        let range = scheme.full_index_range(geodetic.resolution(1.0)).unwrap();
        assert_eq!((range.columns(), range.rows()), (2, 1));
    }

    #[test]
    fn test_neighbor_follows_screen_directions() {
        let scheme = mercator_scheme();
        let res = SpatialReference::default().resolution(4.0);

        // rows grow southward, so one row down the screen is y + 1
        let n = scheme.neighbor_index(5, 5, 1, 1, res, false).unwrap();
        assert_eq!(n, TileIndex::new(6, 6));

        let tms = TilingScheme::new(
            TileSystem::tms_global_mercator(),
            scheme.full_extent().clone(),
            TileSize::default(),
        )
        .unwrap();
        let n = tms.neighbor_index(5, 5, 1, 1, res, false).unwrap();
        assert_eq!(n, TileIndex::new(6, 4));
    }

    #[test]
    fn test_neighbor_wraps_into_world() {
        let scheme = mercator_scheme();
        let res = SpatialReference::default().resolution(1.0);

        let left = scheme.neighbor_index(0, 0, -1, 0, res, true).unwrap();
        assert_eq!((left.x, left.y), (-1, 0));
        assert_eq!((left.idx, left.idy), (1, 0));
        assert!(left.is_wrapped());

        let far_right = scheme.neighbor_index(0, 1, 5, 0, res, true).unwrap();
        assert_eq!((far_right.x, far_right.idx), (5, 1));

        let unwrapped = scheme.neighbor_index(0, 0, -3, 0, res, false).unwrap();
        assert_eq!((unwrapped.x, unwrapped.idx), (-3, -3));
    }

    #[test]
    fn test_corners_are_visual_nw_and_se() {
        let scheme = mercator_scheme();
        let res = SpatialReference::default().resolution(0.0);
        let nw = scheme.nw_corner(0, 0, res).unwrap();
        let se = scheme.se_corner(0, 0, res).unwrap();
        assert!((nw.x + WEB_MERCATOR_EXTENT).abs() < 1e-6);
        assert!((nw.y - WEB_MERCATOR_EXTENT).abs() < 1e-6);
        assert!(se.x > nw.x);
        assert!(se.y < nw.y);

        let tms = TilingScheme::new(
            TileSystem::tms_global_mercator(),
            scheme.full_extent().clone(),
            TileSize::default(),
        )
        .unwrap();
        let nw = tms.nw_corner(0, 0, res).unwrap();
        let se = tms.se_corner(0, 0, res).unwrap();
        assert!(se.y < nw.y);
        assert!((se.y + WEB_MERCATOR_EXTENT).abs() < 1e-6);
    }
}
