//! Tile rendering: from map cells to positioned draw primitives.
//!
//! [`TileRenderer`] turns one cell into primitives (sprites or
//! placeholders), [`render_map`] walks a whole map across z-levels in
//! paint order, and [`Canvas`] rasterizes primitives into an RGBA image.

mod raster;
mod scene;
mod tile;

use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;

use crate::placeholder::Placeholder;
use crate::service::ServiceError;

pub use raster::{apply_brightness, Canvas};
pub use scene::{rasterize_map, render_map, render_z_level};
pub use tile::{TileRenderer, AUTO_WALL_SYMBOL, ALIGN_WORKBENCH, TRANSPARENT_SUFFIX};

/// Wiring errors. Content problems never surface here; they degrade to
/// fallback glyphs or placeholders.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RenderError {
    #[error("Tileset service not set")]
    NoTilesetService,
    #[error("Game data not set")]
    NoGameData,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Per-level adjustments applied to every sprite of a z-level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelEffect {
    /// Vertical pixel offset, negative lifts the level up.
    pub y_offset: i32,
    pub brightness: f32,
    pub opacity: f32,
}

impl Default for LevelEffect {
    fn default() -> Self {
        Self { y_offset: 0, brightness: 1.0, opacity: 1.0 }
    }
}

impl LevelEffect {
    pub fn is_identity(&self) -> bool {
        self.brightness == 1.0 && self.opacity == 1.0
    }
}

/// Something to draw at a scene position.
#[derive(Debug, Clone)]
pub enum DrawPrimitive {
    Sprite {
        image: Arc<RgbaImage>,
        x: i32,
        y: i32,
        brightness: f32,
        opacity: f32,
    },
    Placeholder(Placeholder),
}

impl DrawPrimitive {
    /// Scene-space bounding box as `(x, y, width, height)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        match self {
            DrawPrimitive::Sprite { image, x, y, .. } => (*x, *y, image.width() as i32, image.height() as i32),
            DrawPrimitive::Placeholder(placeholder) => {
                let (x, y, w, h) = placeholder.shape.bounds();
                (x, y, w + 1, h + 1)
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, DrawPrimitive::Placeholder(_))
    }
}
