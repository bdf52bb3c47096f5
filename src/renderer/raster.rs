//! Rasterization of draw primitives into an RGBA image.

use image::{Rgba, RgbaImage};

use super::DrawPrimitive;

/// Tint a pixel toward black (`brightness < 1`) or white (`> 1`).
///
/// Strength is `1 - brightness` toward black and `min(brightness - 1, 1)`
/// toward white. Alpha is untouched.
pub fn apply_brightness(pixel: Rgba<u8>, brightness: f32) -> Rgba<u8> {
    if brightness == 1.0 {
        return pixel;
    }
    let (target, strength) = if brightness < 1.0 {
        (0.0, (1.0 - brightness).clamp(0.0, 1.0))
    } else {
        (255.0, (brightness - 1.0).min(1.0))
    };
    let mix = |c: u8| (c as f32 + (target - c as f32) * strength).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(pixel[0]), mix(pixel[1]), mix(pixel[2]), pixel[3]])
}

/// Source-over composite with the source alpha already scaled.
fn composite(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f32) -> Rgba<u8> {
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// An RGBA image whose top-left pixel sits at a scene position.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    origin: (i32, i32),
}

impl Canvas {
    pub fn new(width: u32, height: u32, origin: (i32, i32)) -> Self {
        Self { image: RgbaImage::new(width, height), origin }
    }

    /// A transparent canvas just large enough for `primitives`, plus
    /// `padding` pixels on every side.
    pub fn fit(primitives: &[DrawPrimitive], padding: u32) -> Self {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for primitive in primitives {
            let (x, y, w, h) = primitive.bounds();
            let (x1, y1) = (x + w, y + h);
            bounds = Some(match bounds {
                None => (x, y, x1, y1),
                Some((bx0, by0, bx1, by1)) => (bx0.min(x), by0.min(y), bx1.max(x1), by1.max(y1)),
            });
        }
        let (x0, y0, x1, y1) = bounds.unwrap_or((0, 0, 1, 1));
        let pad = padding as i32;
        let width = (x1 - x0 + 2 * pad).max(1) as u32;
        let height = (y1 - y0 + 2 * pad).max(1) as u32;
        Self::new(width, height, (x0 - pad, y0 - pad))
    }

    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn draw_all(&mut self, primitives: &[DrawPrimitive]) {
        for primitive in primitives {
            self.draw(primitive);
        }
    }

    pub fn draw(&mut self, primitive: &DrawPrimitive) {
        match primitive {
            DrawPrimitive::Sprite { image, x, y, brightness, opacity } => {
                self.blit(image, *x, *y, *brightness, *opacity);
            }
            DrawPrimitive::Placeholder(placeholder) => placeholder.draw(&mut self.image, self.origin, 1.0),
        }
    }

    /// Alpha-blend a sprite, clipping to the canvas.
    fn blit(&mut self, sprite: &RgbaImage, x: i32, y: i32, brightness: f32, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity == 0.0 {
            return;
        }
        let (width, height) = (self.image.width() as i32, self.image.height() as i32);
        let (left, top) = (x - self.origin.0, y - self.origin.1);

        for (sx, sy, pixel) in sprite.enumerate_pixels() {
            let dx = left + sx as i32;
            let dy = top + sy as i32;
            if dx < 0 || dy < 0 || dx >= width || dy >= height {
                continue;
            }
            if pixel[3] == 0 {
                continue;
            }
            let src_alpha = (pixel[3] as f32 / 255.0) * opacity;
            let src = apply_brightness(*pixel, brightness);
            let dst = self.image.get_pixel(dx as u32, dy as u32);
            let blended = composite(&src, dst, src_alpha);
            self.image.put_pixel(dx as u32, dy as u32, blended);
        }
    }
}
