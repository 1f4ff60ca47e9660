//! Prints the tile grid an OpenStreetMap layer needs for one view.

use anyhow::{Context, Result};
use clap::Parser;
use tilegrid::{
    LatLng, Map, Point, SpatialReferenceOptions, TileLayer, TileLayerOptions, UrlTemplate,
    Viewport,
};

#[derive(Parser)]
#[command(name = "tilegrid-app")]
#[command(about = "Compute the visible tiles of a slippy map view", long_about = None)]
struct Args {
    /// Longitude of the view centre in decimal degrees
    #[arg(allow_negative_numbers = true)]
    center_lng: f64,

    /// Latitude of the view centre in decimal degrees
    #[arg(allow_negative_numbers = true)]
    center_lat: f64,

    /// Zoom, fractional values allowed
    zoom: f64,

    /// View width in pixels
    width: f64,

    /// View height in pixels
    height: f64,

    /// Tile url template
    #[arg(long, default_value = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")]
    url: String,

    /// Projection code of the map
    #[arg(long, default_value = "EPSG:3857")]
    projection: String,

    /// Log every computed grid
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let viewport = Viewport::new(
        LatLng::new(args.center_lat, args.center_lng),
        args.zoom,
        Point::new(args.width, args.height),
    );
    let mut map = Map::new(viewport);
    map.set_spatial_reference(&SpatialReferenceOptions::new(&args.projection))
        .with_context(|| format!("unsupported projection {}", args.projection))?;

    let options = TileLayerOptions {
        url_template: UrlTemplate::pattern(args.url),
        debug: args.debug,
        ..TileLayerOptions::default()
    };
    map.set_base_layer(Some(TileLayer::new("osm", options)?))?;

    match map.get_tiles("osm", None)? {
        Some(grid) => {
            log::info!("{} tiles at zoom {}", grid.len(), grid.zoom);
            println!("{}", serde_json::to_string_pretty(&grid)?);
        }
        None => log::warn!("nothing to draw for this view"),
    }

    Ok(())
}
