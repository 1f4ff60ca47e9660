pub mod renderer;

// Re-export main types
pub use renderer::{DrawCommand, RecordingRenderer, RendererKind, TileRenderer};
