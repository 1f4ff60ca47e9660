use crate::{
    core::{bounds::Bounds, geo::Point},
    layers::tile::TileGrid,
    traits::MapView,
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Rendering backend a tile layer asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Canvas,
    Gl,
}

/// Paints tile grids. Image fetching and bitmap caching live behind this trait.
pub trait TileRenderer: Send + Sync {
    fn kind(&self) -> RendererKind;

    /// Drop everything drawn so far
    fn clear(&mut self);

    /// Draw a grid computed for `view`
    fn render_grid(&mut self, grid: &TileGrid, view: &dyn MapView, opacity: f32) -> Result<()>;
}

/// Commands a recording renderer has been issued
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Tile {
        id: String,
        url: String,
        bounds: (Point, Point), // min, max container coordinates
        opacity: f32,
    },
}

/// Renderer that only records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    kind: RendererKind,
    drawing_queue: Vec<DrawCommand>,
    last_grid: Option<TileGrid>,
}

impl RecordingRenderer {
    pub fn new(kind: RendererKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Get the current drawing queue
    pub fn drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn last_grid(&self) -> Option<&TileGrid> {
        self.last_grid.as_ref()
    }

    pub fn clear_count(&self) -> usize {
        self.drawing_queue
            .iter()
            .filter(|command| matches!(command, DrawCommand::Clear))
            .count()
    }
}

impl TileRenderer for RecordingRenderer {
    fn kind(&self) -> RendererKind {
        self.kind
    }

    fn clear(&mut self) {
        self.drawing_queue.push(DrawCommand::Clear);
        self.last_grid = None;
    }

    fn render_grid(&mut self, grid: &TileGrid, view: &dyn MapView, opacity: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(Error::Layer(format!(
                "opacity must be between 0.0 and 1.0, got {}",
                opacity
            )));
        }

        let zoom = grid.zoom as f64;
        for tile in &grid.tiles {
            let bounds: Bounds = tile
                .extent
                .convert(|p| view.pixel_to_container(p, zoom));
            self.drawing_queue.push(DrawCommand::Tile {
                id: tile.id.clone(),
                url: tile.url.clone(),
                bounds: (bounds.min, bounds.max),
                opacity,
            });
        }
        self.last_grid = Some(grid.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_deserializes_lowercase() {
        let kind: RendererKind = serde_json::from_str("\"gl\"").unwrap();
        assert_eq!(kind, RendererKind::Gl);
        assert_eq!(RendererKind::default(), RendererKind::Canvas);
        assert_eq!(serde_json::to_string(&RendererKind::Canvas).unwrap(), "\"canvas\"");
    }

    #[test]
    fn test_clear_is_recorded() {
        let mut renderer = RecordingRenderer::new(RendererKind::Gl);
        renderer.clear();
        renderer.clear();
        assert_eq!(renderer.clear_count(), 2);
        assert_eq!(renderer.kind(), RendererKind::Gl);
        assert!(renderer.last_grid().is_none());
    }
}
