//! Visible tile grid computation

use super::types::{tile_id, TileDescriptor, TileGrid};
use crate::{
    core::{
        bounds::Bounds,
        constants::{MIN_VISIBLE_TILE_PIXELS, REPROJECTED_TILE_PADDING},
        geo::Point,
    },
    projection::{Reprojector, SpatialReference},
    tiles::{TileIndex, TileSize, TilingScheme, UrlResolver},
    traits::MapView,
    Result,
};
use std::{cmp::Ordering, sync::Arc};

/// Integral zoom to fetch tiles at for the view's current zoom.
///
/// While a zoom animation runs the level is kept on the side the animation
/// comes from, so tiles don't flip back and forth between two levels.
pub fn tile_zoom(view: &dyn MapView) -> i32 {
    let zoom = view.zoom();
    if zoom.fract() == 0.0 {
        return zoom as i32;
    }
    if !view.is_zooming() {
        return zoom.round() as i32;
    }
    if zoom > view.frame_zoom() {
        zoom.floor() as i32
    } else {
        zoom.ceil() as i32
    }
}

/// Enumerates, places, culls and orders the tiles of one layer for one view
pub struct TileGridBuilder<'a> {
    layer_id: &'a str,
    view: &'a dyn MapView,
    scheme: &'a TilingScheme,
    reprojector: Reprojector,
    resolver: UrlResolver<'a>,
    repeat_world: bool,
    mask: Option<&'a Bounds>,
}

impl<'a> TileGridBuilder<'a> {
    pub fn new(
        layer_id: &'a str,
        view: &'a dyn MapView,
        scheme: &'a TilingScheme,
        layer_reference: Arc<SpatialReference>,
        resolver: UrlResolver<'a>,
    ) -> Self {
        let reprojector = Reprojector::new(view.spatial_reference().clone(), layer_reference);
        Self {
            layer_id,
            view,
            scheme,
            reprojector,
            resolver,
            repeat_world: true,
            mask: None,
        }
    }

    pub fn repeat_world(mut self, repeat_world: bool) -> Self {
        self.repeat_world = repeat_world;
        self
    }

    /// Restricts the grid to a box in the map's projected coordinates
    pub fn mask(mut self, mask: Option<&'a Bounds>) -> Self {
        self.mask = mask;
        self
    }

    /// Visible part of the container, or `None` when the mask hides all of it
    fn viewport_extent(&self) -> Option<Bounds> {
        let view = self.view;
        let mask = match self.mask {
            Some(mask) => mask,
            None => return Some(view.container_extent()),
        };

        let zoom = view.zoom();
        let mask = mask.convert(|p| view.projected_to_pixel(p, zoom));
        let visible = mask.intersection(&view.pixel_extent())?;
        let extent = visible.convert(|p| view.pixel_to_container(p, zoom));
        if extent.area() <= 0.0 {
            return None;
        }
        Some(extent)
    }

    /// Projected point in the layer's reference for a container point
    fn layer_point(&self, container: &Point) -> Point {
        self.reprojector
            .to_layer(&self.view.container_to_projected(container))
    }

    /// Map pixel box of a tile at `tile_zoom`, shifted onto its world copy
    fn place(&self, index: &TileIndex, res: f64, tile_zoom: f64) -> Result<Placement> {
        let view = self.view;
        let scheme = self.scheme;
        let system = scheme.tile_system();

        let nw = self
            .reprojector
            .to_map(&scheme.nw_corner(index.idx, index.idy, res)?);
        let mut point = view.projected_to_pixel(&nw, tile_zoom);

        let (mut width, mut height) = if self.reprojector.is_identity() {
            let tile_size = scheme.tile_size();
            (tile_size.width as f64, tile_size.height as f64)
        } else {
            let se = self
                .reprojector
                .to_map(&scheme.se_corner(index.idx, index.idy, res)?);
            let se = view.projected_to_pixel(&se, tile_zoom);
            ((se.x - point.x).round().abs(), (se.y - point.y).round().abs())
        };

        // copies sit whole worlds of unpadded tiles apart
        if index.is_wrapped() {
            point = point.add(&Point::new(
                system.scale_x * (index.x - index.idx) as f64 * width,
                -system.scale_y * (index.y - index.idy) as f64 * height,
            ));
        }

        if !self.reprojector.is_identity() {
            // overlap between reprojected neighbours
            width += REPROJECTED_TILE_PADDING as f64;
            height += REPROJECTED_TILE_PADDING as f64;
        }

        Ok(Placement {
            point,
            width,
            height,
        })
    }

    fn on_screen(&self, placement: &Placement, tile_zoom: f64) -> Bounds {
        placement
            .extent()
            .convert(|p| self.view.pixel_to_container(p, tile_zoom))
    }

    pub fn build(&self, zoom: i32) -> Result<TileGrid> {
        let view = self.view;
        let extent = match self.viewport_extent() {
            Some(extent) => extent,
            None => return Ok(TileGrid::empty(zoom)),
        };

        let tile_zoom = zoom as f64;
        let res = self.reprojector.layer_reference().resolution(tile_zoom);
        let scheme = self.scheme;

        let center = scheme.index_of(&self.layer_point(&extent.center()), res)?;
        let top_left = scheme.index_of(&self.layer_point(&extent.min), res)?;
        let bottom_right = scheme.index_of(&self.layer_point(&extent.max), res)?;

        let top = (center.y - top_left.y).abs();
        let left = (center.x - top_left.x).abs();
        let bottom = (center.y - bottom_right.y).abs();
        let right = (center.x - bottom_right.x).abs();

        // nothing survives culling when the centre and corner tiles are all too small
        let mut largest = (0.0_f64, 0.0_f64);
        for (i, j) in [(0, 0), (-left, -top), (right, bottom)] {
            let index = scheme.neighbor_index(center.x, center.y, i, j, res, self.repeat_world)?;
            let on_screen = self.on_screen(&self.place(&index, res, tile_zoom)?, tile_zoom);
            largest = (
                largest.0.max(on_screen.width()),
                largest.1.max(on_screen.height()),
            );
        }
        if largest.0 < MIN_VISIBLE_TILE_PIXELS || largest.1 < MIN_VISIBLE_TILE_PIXELS {
            #[cfg(feature = "debug")]
            log::debug!(
                "tile grid {} z{}: tiles under {}px on screen",
                self.layer_id,
                zoom,
                MIN_VISIBLE_TILE_PIXELS
            );
            return Ok(TileGrid::empty(zoom));
        }

        let view_center = view.container_to_pixel(&extent.center(), tile_zoom);
        let mut kept: Vec<(f64, TileDescriptor)> = Vec::new();
        let mut enumerated = 0usize;

        for i in -left..=right {
            for j in -top..=bottom {
                enumerated += 1;
                let index = scheme.neighbor_index(center.x, center.y, i, j, res, self.repeat_world)?;
                let placement = self.place(&index, res, tile_zoom)?;

                let on_screen = self.on_screen(&placement, tile_zoom);
                if on_screen.width() < MIN_VISIBLE_TILE_PIXELS
                    || on_screen.height() < MIN_VISIBLE_TILE_PIXELS
                    || !on_screen.intersects(&extent)
                {
                    continue;
                }

                let point = placement.point;
                kept.push((
                    point.distance_to(&view_center),
                    TileDescriptor {
                        url: self.resolver.resolve(index.idx, index.idy, zoom)?,
                        point,
                        id: tile_id(self.layer_id, index.idx, index.idy, zoom),
                        zoom,
                        x: index.idx,
                        y: index.idy,
                        extent: placement.extent(),
                        size: TileSize::new(placement.width as u32, placement.height as u32),
                    },
                ));
            }
        }

        kept.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let grid_extent = kept
            .iter()
            .map(|(_, tile)| tile.extent.clone())
            .reduce(|acc, e| acc.union(&e));

        #[cfg(feature = "debug")]
        log::debug!(
            "tile grid {} z{}: kept {} of {} tiles",
            self.layer_id,
            zoom,
            kept.len(),
            enumerated
        );
        #[cfg(not(feature = "debug"))]
        let _ = enumerated;

        Ok(TileGrid {
            zoom,
            extent: grid_extent,
            tiles: kept.into_iter().map(|(_, tile)| tile).collect(),
        })
    }
}

/// Where a tile lands in map pixels at the tile zoom
struct Placement {
    point: Point,
    width: f64,
    height: f64,
}

impl Placement {
    fn extent(&self) -> Bounds {
        Bounds::new(self.point, self.point.add(&Point::new(self.width, self.height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{constants::WEB_MERCATOR_EXTENT, geo::LatLng, viewport::Viewport},
        prelude::HashMap,
        tiles::{TileSystem, UrlTemplate},
        Error,
    };

    fn scheme(system: TileSystem) -> TilingScheme {
        TilingScheme::new(
            system,
            SpatialReference::default().full_extent().clone(),
            TileSize::default(),
        )
        .unwrap()
    }

    fn build_at(
        viewport: &Viewport,
        scheme: &TilingScheme,
        template: &UrlTemplate,
        mask: Option<&Bounds>,
        zoom: i32,
    ) -> Result<TileGrid> {
        let params = HashMap::default();
        let subdomains = vec!["a".to_string(), "b".to_string()];
        let resolver = UrlResolver::new(template, &subdomains, &params);
        TileGridBuilder::new(
            "base",
            viewport,
            scheme,
            viewport.spatial_reference().clone(),
            resolver,
        )
        .mask(mask)
        .build(zoom)
    }

    fn build(viewport: &Viewport, template: &UrlTemplate, mask: Option<&Bounds>) -> Result<TileGrid> {
        let scheme = scheme(TileSystem::web_mercator());
        build_at(viewport, &scheme, template, mask, tile_zoom(viewport))
    }

    #[test]
    fn test_tile_zoom_policy() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(3.0);
        assert_eq!(tile_zoom(&viewport), 3);
        viewport.set_zoom(3.4);
        assert_eq!(tile_zoom(&viewport), 3);
        viewport.set_zoom(3.6);
        assert_eq!(tile_zoom(&viewport), 4);

        // zooming in from 3: stay on the lower level
        viewport.set_zoom(3.0);
        viewport.animate_zoom_to(3.4);
        assert_eq!(tile_zoom(&viewport), 3);
        viewport.end_zoom();

        // zooming out from 4: stay on the upper level
        viewport.set_zoom(4.0);
        viewport.animate_zoom_to(3.4);
        assert_eq!(tile_zoom(&viewport), 4);
    }

    #[test]
    fn test_single_world_view() {
        let viewport = Viewport::new(LatLng::default(), 1.0, Point::new(500.0, 500.0));
        let grid = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), None).unwrap();

        assert_eq!(grid.zoom, 1);
        assert_eq!(grid.len(), 4);
        let extent = grid.extent.clone().unwrap();
        assert!((extent.width() - 512.0).abs() < 1e-6);
        assert!((extent.height() - 512.0).abs() < 1e-6);

        let top_left = grid.get("base__0__0__1").unwrap();
        assert_eq!(top_left.url, "/1/0/0");
        assert!((top_left.point.x + 256.0).abs() < 1e-6);
        assert!((top_left.point.y + 256.0).abs() < 1e-6);
        assert_eq!(top_left.size, TileSize::new(256, 256));
    }

    #[test]
    fn test_wide_view_repeats_world() {
        let viewport = Viewport::new(LatLng::default(), 1.0, Point::new(2000.0, 200.0));
        let grid = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), None).unwrap();

        // eight columns, two rows
        assert_eq!(grid.len(), 16);
        assert!(grid.tiles.iter().all(|t| (0..2).contains(&t.x) && (0..2).contains(&t.y)));

        let mut copies: Vec<_> = grid.tiles.iter().filter(|t| t.id == "base__0__1__1").collect();
        assert_eq!(copies.len(), 4);
        copies.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));
        for pair in copies.windows(2) {
            assert!((pair[1].point.x - pair[0].point.x - 512.0).abs() < 1e-6);
            assert_eq!(pair[0].url, pair[1].url);
        }
    }

    #[test]
    fn test_tiles_ordered_back_to_front() {
        let viewport = Viewport::new(LatLng::new(30.0, 40.0), 4.3, Point::new(900.0, 700.0));
        let grid = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), None).unwrap();
        assert_eq!(grid.zoom, 4);

        let center = viewport.container_to_pixel(&viewport.container_extent().center(), 4.0);
        let distances: Vec<f64> = grid.tiles.iter().map(|t| t.point.distance_to(&center)).collect();
        assert!(distances.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_missing_placeholder_fails_whole_grid() {
        let viewport = Viewport::new(LatLng::default(), 2.0, Point::new(256.0, 256.0));
        let result = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}?k={key}"), None);
        assert!(matches!(result, Err(Error::Template { .. })));
    }

    #[test]
    fn test_mask_outside_view_gives_empty_grid() {
        let viewport = Viewport::new(LatLng::default(), 3.0, Point::new(256.0, 256.0));
        let mask = Bounds::from_coords(1.5e7, 1.5e7, 1.9e7, 1.9e7);
        let grid = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), Some(&mask)).unwrap();
        assert_eq!(grid, TileGrid::empty(3));
    }

    #[test]
    fn test_mask_limits_tiles() {
        let viewport = Viewport::new(LatLng::default(), 2.0, Point::new(1024.0, 1024.0));
        let full = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), None).unwrap();

        // north-east quadrant of the world only
        let mask = Bounds::from_coords(1.0, 1.0, 2.0e7, 2.0e7);
        let masked = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), Some(&mask)).unwrap();
        assert!(masked.len() < full.len());
        assert!(masked.tiles.iter().all(|t| t.x >= 2 && t.y <= 1));
    }

    #[test]
    fn test_mask_sharing_an_edge_gives_empty_grid() {
        let viewport = Viewport::new(LatLng::default(), 3.0, Point::new(256.0, 256.0));
        // starts exactly on the right edge of the view
        let edge = 128.0 * viewport.resolution(3.0);
        let mask = Bounds::from_coords(edge, -1.0e6, 2.0e7, 1.0e6);

        let on_pixels = mask.convert(|p| viewport.projected_to_pixel(p, 3.0));
        assert!(on_pixels.intersects(&viewport.pixel_extent()));

        let grid = build(&viewport, &UrlTemplate::pattern("/{z}/{x}/{y}"), Some(&mask)).unwrap();
        assert_eq!(grid, TileGrid::empty(3));
    }

    #[test]
    fn test_tiles_too_small_at_requested_zoom() {
        let viewport = Viewport::new(LatLng::default(), 2.0, Point::new(800.0, 600.0));
        let scheme = scheme(TileSystem::web_mercator());
        let template = UrlTemplate::pattern("/{z}/{x}/{y}");

        let grid = build_at(&viewport, &scheme, &template, None, 12).unwrap();
        assert_eq!(grid, TileGrid::empty(12));

        // urls are only built for tiles that are drawn
        let keyed = UrlTemplate::pattern("/{z}/{x}/{y}?k={key}");
        assert_eq!(build_at(&viewport, &scheme, &keyed, None, 12).unwrap(), TileGrid::empty(12));

        // 64px on screen
        let grid = build_at(&viewport, &scheme, &template, None, 4).unwrap();
        assert!(!grid.is_empty());
        assert!(grid.tiles.iter().all(|t| t.zoom == 4));
    }

    #[test]
    fn test_tms_copies_repeat_vertically() {
        let viewport = Viewport::new(LatLng::default(), 1.0, Point::new(200.0, 2000.0));
        let scheme = scheme(TileSystem::tms_global_mercator());
        let grid = build_at(&viewport, &scheme, &UrlTemplate::pattern("/{z}/{x}/{y}"), None, 1).unwrap();

        // two columns, eight rows of a two-row world
        assert_eq!(grid.len(), 16);
        let mut copies: Vec<_> = grid.copies("base__0__0__1").collect();
        assert_eq!(copies.len(), 4);
        copies.sort_by(|a, b| a.point.y.total_cmp(&b.point.y));
        for pair in copies.windows(2) {
            assert!((pair[1].point.y - pair[0].point.y - 512.0).abs() < 1e-6);
            assert_eq!(pair[0].point.x, pair[1].point.x);
            assert_eq!(pair[0].url, pair[1].url);
        }
    }

    #[test]
    fn test_westward_columns_repeat() {
        let system = TileSystem::new(-1.0, -1.0, WEB_MERCATOR_EXTENT, WEB_MERCATOR_EXTENT).unwrap();
        let viewport = Viewport::new(LatLng::default(), 1.0, Point::new(2000.0, 200.0));
        let grid = build_at(&viewport, &scheme(system), &UrlTemplate::pattern("/{z}/{x}/{y}"), None, 1).unwrap();

        assert_eq!(grid.len(), 16);
        let mut copies: Vec<_> = grid.copies("base__0__0__1").collect();
        assert_eq!(copies.len(), 4);
        copies.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));
        for pair in copies.windows(2) {
            assert!((pair[1].point.x - pair[0].point.x - 512.0).abs() < 1e-6);
            assert_eq!(pair[0].point.y, pair[1].point.y);
        }

        // column 0 starts at the east edge of the world
        let east = grid
            .tiles
            .iter()
            .filter(|t| t.point.x >= -1.0 && t.point.x < 256.0)
            .map(|t| t.x)
            .collect::<Vec<_>>();
        assert!(!east.is_empty());
        assert!(east.iter().all(|x| *x == 0));
    }
}
