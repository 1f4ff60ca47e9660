use anyhow::Result;
use tilegrid::{
    Bounds, LatLng, Map, MapView, Point, TileLayer, TileLayerOptions, UrlTemplate, Viewport,
};

/// Grid properties that must hold for any view
#[cfg(test)]
mod tile_grid_tests {
    use super::*;

    fn osm_layer(id: &str) -> Result<TileLayer> {
        Ok(TileLayer::new(
            id,
            TileLayerOptions {
                url_template: UrlTemplate::pattern("http://{s}.tile.osm.org/{z}/{x}/{y}.png"),
                ..TileLayerOptions::default()
            },
        )?)
    }

    fn map_with_layer(center: LatLng, zoom: f64, size: Point) -> Result<Map> {
        let mut map = Map::new(Viewport::new(center, zoom, size));
        map.add_layer(osm_layer("osm")?)?;
        Ok(map)
    }

    /// Every kept tile is at the grid zoom, big enough and on screen
    #[test]
    fn test_tiles_visible_and_at_grid_zoom() -> Result<()> {
        let mut map = map_with_layer(LatLng::new(20.0, 10.0), 3.3, Point::new(1300.0, 700.0))?;
        let grid = map.get_tiles("osm", None)?.expect("grid");
        assert_eq!(grid.zoom, 3);
        assert!(!grid.is_empty());

        let viewport = map.viewport();
        let container = viewport.container_extent();
        for tile in &grid.tiles {
            assert_eq!(tile.zoom, 3);
            let on_screen = tile
                .extent
                .convert(|p| viewport.pixel_to_container(p, grid.zoom as f64));
            assert!(on_screen.width() >= 5.0, "{} too narrow", tile.id);
            assert!(on_screen.height() >= 5.0, "{} too short", tile.id);
            assert!(on_screen.intersects(&container), "{} off screen", tile.id);
        }

        let extent = grid.extent.clone().expect("extent");
        for tile in &grid.tiles {
            assert!(extent.contains(&tile.extent.min));
            assert!(extent.contains(&tile.extent.max));
        }
        Ok(())
    }

    /// Asking twice without changing anything gives the same grid
    #[test]
    fn test_repeated_requests_identical() -> Result<()> {
        let mut map = map_with_layer(LatLng::new(-33.86, 151.2), 7.0, Point::new(1024.0, 768.0))?;
        let first = map.get_tiles("osm", None)?;
        let second = map.get_tiles("osm", None)?;
        assert_eq!(first, second);
        Ok(())
    }

    /// Tiles come farthest from the view centre first
    #[test]
    fn test_back_to_front_order() -> Result<()> {
        let mut map = map_with_layer(LatLng::new(51.5, -0.12), 9.6, Point::new(1000.0, 640.0))?;
        let grid = map.get_tiles("osm", None)?.expect("grid");
        assert_eq!(grid.zoom, 10);

        let viewport = map.viewport();
        let center = viewport.container_to_pixel(&viewport.container_extent().center(), 10.0);
        let distances: Vec<f64> = grid
            .tiles
            .iter()
            .map(|tile| tile.point.distance_to(&center))
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] >= pair[1]));
        Ok(())
    }

    /// World copies share id and url and sit whole worlds apart
    #[test]
    fn test_world_copies_share_identity() -> Result<()> {
        let mut map = map_with_layer(LatLng::default(), 1.0, Point::new(2000.0, 200.0))?;
        let grid = map.get_tiles("osm", None)?.expect("grid");
        assert_eq!(grid.len(), 16);

        let world_width = 512.0;
        for a in &grid.tiles {
            for b in grid.tiles.iter().filter(|b| b.id == a.id) {
                assert_eq!(a.url, b.url);
                assert_eq!((a.x, a.y), (b.x, b.y));
                assert!((a.point.y - b.point.y).abs() < 1e-6);
                let worlds = (a.point.x - b.point.x) / world_width;
                assert!((worlds - worlds.round()).abs() < 1e-9);
            }
        }

        let copies = grid.tiles.iter().filter(|t| t.id == "osm__0__1__1").count();
        assert_eq!(copies, 4);
        Ok(())
    }

    /// Without repeat_world the indices are left as they are
    #[test]
    fn test_no_wrap_without_repeat_world() -> Result<()> {
        let mut map = Map::new(Viewport::new(LatLng::default(), 1.0, Point::new(2000.0, 200.0)));
        map.add_layer(TileLayer::new(
            "flat",
            TileLayerOptions {
                url_template: UrlTemplate::pattern("/{z}/{x}/{y}"),
                repeat_world: false,
                ..TileLayerOptions::default()
            },
        )?)?;
        let grid = map.get_tiles("flat", None)?.expect("grid");
        assert!(grid.tiles.iter().any(|t| t.x < 0));
        assert!(grid.tiles.iter().any(|t| t.x > 1));
        assert!(grid.tiles.iter().any(|t| t.url == "/1/-3/0"));
        Ok(())
    }

    /// Subdomains rotate with x + y
    #[test]
    fn test_osm_url() -> Result<()> {
        let layer = osm_layer("osm")?;
        assert_eq!(layer.tile_url(3, 5, 4)?, "http://c.tile.osm.org/4/3/5.png");
        assert_eq!(layer.tile_url(0, 0, 0)?, "http://a.tile.osm.org/0/0/0.png");
        Ok(())
    }

    /// A mask away from the view yields an empty grid rather than none
    #[test]
    fn test_mask_outside_view() -> Result<()> {
        let mut map = Map::new(Viewport::new(LatLng::default(), 3.0, Point::new(256.0, 256.0)));
        map.add_layer(TileLayer::new(
            "masked",
            TileLayerOptions {
                mask: Some(Bounds::from_coords(1.5e7, 1.5e7, 1.9e7, 1.9e7)),
                ..TileLayerOptions::default()
            },
        )?)?;

        let grid = map.get_tiles("masked", None)?.expect("empty grid");
        assert_eq!(grid.zoom, 3);
        assert!(grid.extent.is_none());
        assert!(grid.tiles.is_empty());
        Ok(())
    }

    /// A missing template value fails the whole request
    #[test]
    fn test_template_error_propagates() -> Result<()> {
        let mut map = Map::new(Viewport::default());
        map.add_layer(TileLayer::new(
            "keyed",
            TileLayerOptions {
                url_template: UrlTemplate::pattern("/{z}/{x}/{y}.png?access_token={token}"),
                ..TileLayerOptions::default()
            },
        )?)?;

        let err = map.get_tiles("keyed", None).unwrap_err();
        assert!(err.to_string().contains("{token}"));
        Ok(())
    }

    /// During a zoom animation the level stays on the side it comes from
    #[test]
    fn test_zoom_animation_level() -> Result<()> {
        let mut map = map_with_layer(LatLng::default(), 4.0, Point::new(512.0, 512.0))?;

        map.viewport_mut().animate_zoom_to(4.7);
        assert_eq!(map.get_tiles("osm", None)?.expect("grid").zoom, 4);

        map.viewport_mut().end_zoom();
        assert_eq!(map.get_tiles("osm", None)?.expect("grid").zoom, 5);

        map.viewport_mut().set_zoom(6.0);
        map.viewport_mut().animate_zoom_to(5.2);
        assert_eq!(map.get_tiles("osm", None)?.expect("grid").zoom, 6);
        Ok(())
    }
}
