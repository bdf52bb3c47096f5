//! Lossless sprite rotation and pixel-scale enlargement.
//!
//! Rotations are restricted to multiples of 90° and performed by pixel
//! transposition. Scaling uses nearest-neighbour sampling. Scaled images
//! are cached per source image and scale factor.

use image::{imageops, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::connectivity::SubtileKind;

/// Default bound on cached drawables.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Clockwise rotation angle for a multitile subtile.
pub fn multitile_rotation_angle(kind: SubtileKind, index: usize) -> u32 {
    kind.rotation_angle(index)
}

/// Rotate clockwise by `angle` degrees. Angles that are not a multiple of
/// 90 leave the image untouched.
pub fn rotate_sprite(image: &RgbaImage, angle_clockwise: u32) -> RgbaImage {
    match angle_clockwise % 360 {
        90 => imageops::rotate90(image),
        180 => imageops::rotate180(image),
        270 => imageops::rotate270(image),
        _ => image.clone(),
    }
}

/// Enlarge by an integer factor with nearest-neighbour sampling.
pub fn scale_sprite(image: &RgbaImage, pixelscale: u32) -> RgbaImage {
    if pixelscale <= 1 {
        return image.clone();
    }
    imageops::resize(
        image,
        image.width() * pixelscale,
        image.height() * pixelscale,
        imageops::FilterType::Nearest,
    )
}

/// Bounded cache of scaled drawables keyed by source identity and scale.
///
/// Overflow clears the whole cache. Callers must call
/// [`SpriteTransformer::clear`] when the active tileset changes.
#[derive(Debug)]
pub struct SpriteTransformer {
    // The source Arc is kept alongside the result so its address stays
    // reserved while the entry lives.
    cache: HashMap<(usize, u32), (Arc<RgbaImage>, Arc<RgbaImage>)>,
    capacity: usize,
}

impl Default for SpriteTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteTransformer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { cache: HashMap::new(), capacity: capacity.max(1) }
    }

    /// The sprite scaled by `pixelscale`, from cache when possible.
    pub fn scaled(&mut self, image: &Arc<RgbaImage>, pixelscale: u32) -> Arc<RgbaImage> {
        let key = (Arc::as_ptr(image) as usize, pixelscale);
        if let Some((_, scaled)) = self.cache.get(&key) {
            return Arc::clone(scaled);
        }

        if self.cache.len() >= self.capacity {
            debug!("Drawable cache cleared (was {} items)", self.cache.len());
            self.cache.clear();
        }

        let scaled = if pixelscale <= 1 { Arc::clone(image) } else { Arc::new(scale_sprite(image, pixelscale)) };
        self.cache.insert(key, (Arc::clone(image), Arc::clone(&scaled)));
        scaled
    }

    /// Rotate then scale. Rotated images are fresh allocations and bypass
    /// the cache.
    pub fn rotated_scaled(&mut self, image: &Arc<RgbaImage>, angle_clockwise: u32, pixelscale: u32) -> Arc<RgbaImage> {
        if angle_clockwise % 360 == 0 {
            return self.scaled(image, pixelscale);
        }
        Arc::new(scale_sprite(&rotate_sprite(image, angle_clockwise), pixelscale))
    }

    pub fn clear(&mut self) {
        let count = self.cache.len();
        self.cache.clear();
        if count > 0 {
            debug!("Drawable cache cleared ({} items)", count);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
