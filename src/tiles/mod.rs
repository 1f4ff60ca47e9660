pub mod scheme;
pub mod system;
pub mod url;

// Re-exports for convenience
pub use scheme::{IndexRange, TileIndex, TileSize, TilingScheme};
pub use system::{TileSystem, TileSystemConfig};
pub use url::{subdomain_index, TemplateParam, UrlData, UrlResolver, UrlTemplate};
