//! Placeholder shapes drawn when a cell has no usable sprite.
//!
//! Isometric tilesets get a rhombus, orthogonal ones an inset rectangle.
//! The stripe pattern tells terrain, furniture and everything else apart
//! at a glance.

use image::{Rgba, RgbaImage};

use crate::coords::CoordinateTransformer;

const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Striped fill for a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripePattern {
    pub color: [u8; 3],
    pub stripe_width: u32,
    pub stripe_spacing: u32,
    pub vertical: bool,
}

impl StripePattern {
    /// Pattern keyed by object id prefix.
    pub fn for_object(object_id: &str) -> Self {
        if object_id.starts_with("t_") {
            Self { color: [0, 255, 0], stripe_width: 2, stripe_spacing: 4, vertical: false }
        } else if object_id.starts_with("f_") {
            Self { color: [0, 0, 255], stripe_width: 4, stripe_spacing: 8, vertical: false }
        } else {
            Self { color: [160, 160, 164], stripe_width: 2, stripe_spacing: 4, vertical: true }
        }
    }

    /// Whether the scene pixel lies on a stripe.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        let period = (self.stripe_width + self.stripe_spacing).max(1) as i32;
        let along = if self.vertical { x } else { y };
        along.rem_euclid(period) < self.stripe_width as i32
    }
}

/// Outline of a placeholder in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderShape {
    /// Top, right, bottom, left vertices.
    Rhombus([(i32, i32); 4]),
    Rect { x: i32, y: i32, width: i32, height: i32 },
}

impl PlaceholderShape {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        match *self {
            PlaceholderShape::Rect { x, y, width, height } => px >= x && px < x + width && py >= y && py < y + height,
            PlaceholderShape::Rhombus([top, right, _, left]) => {
                let half_w = (right.0 - top.0).max(1) as f32;
                let half_h = (left.1 - top.1).max(1) as f32;
                let dx = (px as f32 + 0.5 - top.0 as f32).abs() / half_w;
                let dy = (py as f32 + 0.5 - left.1 as f32).abs() / half_h;
                dx + dy <= 1.0
            }
        }
    }

    /// Bounding box as `(x, y, width, height)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        match *self {
            PlaceholderShape::Rect { x, y, width, height } => (x, y, width, height),
            PlaceholderShape::Rhombus([top, right, bottom, left]) => (left.0, top.1, right.0 - left.0, bottom.1 - top.1),
        }
    }
}

/// A placeholder for one object in one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub object_id: String,
    pub shape: PlaceholderShape,
    pub pattern: StripePattern,
}

impl Placeholder {
    /// Placeholder for the tile at `(x, y)`, without sprite offsets.
    pub fn for_tile(
        transformer: &CoordinateTransformer,
        x: i32,
        y: i32,
        scene_offset: (i32, i32),
        object_id: &str,
    ) -> Self {
        let (sx, sy) = transformer.scene_position(x, y, scene_offset, (0, 0));
        let (w, h) = (transformer.tile_width, transformer.tile_height);
        let shape = if transformer.is_iso {
            PlaceholderShape::Rhombus([(sx + w / 2, sy), (sx + w, sy + h / 2), (sx + w / 2, sy + h), (sx, sy + h / 2)])
        } else {
            PlaceholderShape::Rect { x: sx + 2, y: sy + 2, width: w - 4, height: h - 4 }
        };
        Self { object_id: object_id.to_string(), shape, pattern: StripePattern::for_object(object_id) }
    }

    /// Rasterize onto `canvas`, whose top-left corner sits at scene
    /// position `origin`. Stripes are scaled by `opacity`.
    pub fn draw(&self, canvas: &mut RgbaImage, origin: (i32, i32), opacity: f32) {
        let (bx, by, bw, bh) = self.shape.bounds();
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let [r, g, b] = self.pattern.color;

        for py in by..=by + bh {
            for px in bx..=bx + bw {
                if !self.shape.contains(px, py) {
                    continue;
                }
                let cx = px - origin.0;
                let cy = py - origin.1;
                if cx < 0 || cy < 0 || cx >= canvas.width() as i32 || cy >= canvas.height() as i32 {
                    continue;
                }
                let edge = [(0, -1), (1, 0), (0, 1), (-1, 0)]
                    .iter()
                    .any(|(dx, dy)| !self.shape.contains(px + dx, py + dy));
                if edge {
                    canvas.put_pixel(cx as u32, cy as u32, OUTLINE);
                } else if self.pattern.covers(px, py) && alpha > 0 {
                    canvas.put_pixel(cx as u32, cy as u32, Rgba([r, g, b, alpha]));
                }
            }
        }
    }
}
