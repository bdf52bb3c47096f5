//! Grid to screen coordinate conversion for orthogonal and isometric views.

use crate::models::Tileset;

/// Converts tile coordinates to pixel positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateTransformer {
    pub tile_width: i32,
    pub tile_height: i32,
    pub is_iso: bool,
}

impl Default for CoordinateTransformer {
    fn default() -> Self {
        Self::new(32, 32, false)
    }
}

impl CoordinateTransformer {
    pub fn new(tile_width: i32, tile_height: i32, is_iso: bool) -> Self {
        Self { tile_width, tile_height, is_iso }
    }

    /// Tile size and projection of a tileset, after pixel scaling.
    pub fn from_tileset(tileset: &Tileset) -> Self {
        let (w, h) = tileset.tile_size();
        Self::new(w as i32, h as i32, tileset.is_iso)
    }

    /// Top-left pixel of a tile's cell (orthogonal) or its diamond's
    /// bounding box (isometric). Half-tile steps of odd-sized isometric
    /// tiles round down, so positions stay monotonic across the origin.
    pub fn tile_to_pixel(&self, x: i32, y: i32) -> (i32, i32) {
        if self.is_iso {
            (((x + y) * self.tile_width).div_euclid(2), ((y - x) * self.tile_height).div_euclid(2))
        } else {
            (x * self.tile_width, y * self.tile_height)
        }
    }

    /// Paint-order key for isometric rendering: sort ascending to paint
    /// back to front, then left to right within a depth band.
    pub fn iso_sort_key(x: i32, y: i32) -> (i32, i32) {
        (y - x, x + y)
    }

    /// Scene position of a sprite: tile pixel plus scene and sprite
    /// offsets. Isometric sprites are lifted half a tile so their art sits
    /// on the diamond's top vertex.
    pub fn scene_position(&self, x: i32, y: i32, scene_offset: (i32, i32), sprite_offset: (i32, i32)) -> (i32, i32) {
        let (px, py) = self.tile_to_pixel(x, y);
        let iso_adjust = if self.is_iso { self.tile_height / 2 } else { 0 };
        (px + scene_offset.0 + sprite_offset.0, py + scene_offset.1 + sprite_offset.1 - iso_adjust)
    }

    /// Tile containing a scene pixel, inverse of [`CoordinateTransformer::tile_to_pixel`].
    pub fn pixel_to_tile(&self, px: i32, py: i32) -> (i32, i32) {
        let (w, h) = (self.tile_width.max(1), self.tile_height.max(1));
        if self.is_iso {
            let a = (px as f32) / (w as f32 / 2.0);
            let b = (py as f32) / (h as f32 / 2.0);
            (((a - b) / 2.0).floor() as i32, ((a + b) / 2.0).floor() as i32)
        } else {
            (px.div_euclid(w), py.div_euclid(h))
        }
    }
}
