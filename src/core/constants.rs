//! Core constants for tile grid computation.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Tiles whose on-screen width or height falls below this many pixels are culled.
pub const MIN_VISIBLE_TILE_PIXELS: f64 = 5.0;

/// Added before flooring when resolving tile indices so that points lying
/// exactly on a tile edge land in the tile they start.
pub const TILE_INDEX_EPSILON: f64 = 1e-7;

/// Extra pixels added to each side length of a reprojected tile to hide seams.
pub const REPROJECTED_TILE_PADDING: u32 = 1;

/// Spherical mercator earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the spherical mercator projection.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Half the width of the EPSG:3857 world in meters.
pub const WEB_MERCATOR_EXTENT: f64 = 20_037_508.34;

/// Circumference used for the EPSG:3857 resolution table.
pub const WEB_MERCATOR_CIRCUMFERENCE: f64 = 40_075_016.685_578_4;

/// How many distinct spatial references are kept alive by the registry.
pub const REFERENCE_CACHE_CAPACITY: usize = 64;

/// How many fired events a layer remembers; older ones are dropped first.
pub const EVENT_HISTORY_CAPACITY: usize = 64;
