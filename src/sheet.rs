//! Sprite sheets: eager slicing into indexed sprites, plus the ASCII
//! fallback sheet (16 colors x 256 glyphs).

use image::{imageops, Rgba, RgbaImage};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::models::{SheetInfo, TileSource, FALLBACK_SHEET};

/// Number of glyphs per color band in the fallback sheet.
pub const GLYPH_COUNT: u32 = 256;

/// Terminal colors in fallback-sheet band order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermColor {
    Black,
    White,
    LightGray,
    DarkGray,
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Brown,
    LightRed,
    LightGreen,
    LightBlue,
    LightCyan,
    Pink,
    Yellow,
}

impl TermColor {
    pub const ORDER: [TermColor; 16] = [
        TermColor::Black,
        TermColor::White,
        TermColor::LightGray,
        TermColor::DarkGray,
        TermColor::Red,
        TermColor::Green,
        TermColor::Blue,
        TermColor::Cyan,
        TermColor::Magenta,
        TermColor::Brown,
        TermColor::LightRed,
        TermColor::LightGreen,
        TermColor::LightBlue,
        TermColor::LightCyan,
        TermColor::Pink,
        TermColor::Yellow,
    ];

    pub fn from_name(name: &str) -> Option<TermColor> {
        let color = match name {
            "black" => TermColor::Black,
            "white" => TermColor::White,
            "light_gray" => TermColor::LightGray,
            "dark_gray" => TermColor::DarkGray,
            "red" => TermColor::Red,
            "green" => TermColor::Green,
            "blue" => TermColor::Blue,
            "cyan" => TermColor::Cyan,
            "magenta" => TermColor::Magenta,
            "brown" => TermColor::Brown,
            "light_red" => TermColor::LightRed,
            "light_green" => TermColor::LightGreen,
            "light_blue" => TermColor::LightBlue,
            "light_cyan" => TermColor::LightCyan,
            "pink" => TermColor::Pink,
            "yellow" => TermColor::Yellow,
            _ => return None,
        };
        Some(color)
    }

    pub fn name(self) -> &'static str {
        match self {
            TermColor::Black => "black",
            TermColor::White => "white",
            TermColor::LightGray => "light_gray",
            TermColor::DarkGray => "dark_gray",
            TermColor::Red => "red",
            TermColor::Green => "green",
            TermColor::Blue => "blue",
            TermColor::Cyan => "cyan",
            TermColor::Magenta => "magenta",
            TermColor::Brown => "brown",
            TermColor::LightRed => "light_red",
            TermColor::LightGreen => "light_green",
            TermColor::LightBlue => "light_blue",
            TermColor::LightCyan => "light_cyan",
            TermColor::Pink => "pink",
            TermColor::Yellow => "yellow",
        }
    }

    /// Curses-style RGB value, used when synthesizing a fallback sheet.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            TermColor::Black => [0, 0, 0],
            TermColor::White => [255, 255, 255],
            TermColor::LightGray => [192, 192, 192],
            TermColor::DarkGray => [96, 96, 96],
            TermColor::Red => [255, 0, 0],
            TermColor::Green => [0, 110, 0],
            TermColor::Blue => [10, 30, 160],
            TermColor::Cyan => [0, 150, 180],
            TermColor::Magenta => [139, 58, 98],
            TermColor::Brown => [151, 98, 60],
            TermColor::LightRed => [255, 150, 150],
            TermColor::LightGreen => [0, 255, 0],
            TermColor::LightBlue => [100, 100, 255],
            TermColor::LightCyan => [0, 240, 255],
            TermColor::Pink => [255, 145, 255],
            TermColor::Yellow => [255, 255, 0],
        }
    }
}

impl fmt::Display for TermColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cut `image` into `sprite_width` x `sprite_height` cells, row-major.
/// Partial cells at the right and bottom edges are dropped.
pub fn slice_sprites(image: &RgbaImage, sprite_width: u32, sprite_height: u32) -> Vec<Arc<RgbaImage>> {
    if sprite_width == 0 || sprite_height == 0 {
        return Vec::new();
    }
    let cols = image.width() / sprite_width;
    let rows = image.height() / sprite_height;
    let mut sprites = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let sprite = imageops::crop_imm(
                image,
                col * sprite_width,
                row * sprite_height,
                sprite_width,
                sprite_height,
            )
            .to_image();
            sprites.push(Arc::new(sprite));
        }
    }
    sprites
}

/// A loaded sprite sheet.
///
/// Fallback sheets additionally carry a `(color, glyph)` index.
#[derive(Debug, Clone)]
pub struct Sheet {
    info: SheetInfo,
    sprites: Vec<Arc<RgbaImage>>,
    tiles: Vec<TileSource>,
    glyphs: Option<HashMap<(TermColor, u8), usize>>,
}

impl Sheet {
    /// Build a sheet by slicing `image` with the geometry in `info`.
    pub fn new(mut info: SheetInfo, image: &RgbaImage, tiles: Vec<TileSource>) -> Self {
        let sprites = slice_sprites(image, info.sprite_width, info.sprite_height);
        info.sprite_count = sprites.len();
        Self { info, sprites, tiles, glyphs: None }
    }

    /// Build a fallback sheet: 16 color bands in [`TermColor::ORDER`], each
    /// holding 256 glyphs laid out `image.width() / sprite_width` per row.
    pub fn fallback(mut info: SheetInfo, image: &RgbaImage) -> Self {
        info.name = FALLBACK_SHEET.to_string();
        let sprites = slice_sprites(image, info.sprite_width, info.sprite_height);
        info.sprite_count = sprites.len();

        let cols = (image.width() / info.sprite_width.max(1)).max(1);
        let rows_per_color = GLYPH_COUNT.div_ceil(cols);
        let mut glyphs = HashMap::new();
        for (band, color) in TermColor::ORDER.iter().enumerate() {
            let base_row = band as u32 * rows_per_color;
            for glyph in 0..GLYPH_COUNT {
                let index = ((base_row + glyph / cols) * cols + glyph % cols) as usize;
                if index < sprites.len() {
                    glyphs.insert((*color, glyph as u8), index);
                }
            }
        }

        Self { info, sprites, tiles: Vec::new(), glyphs: Some(glyphs) }
    }

    /// Synthesize a fallback sheet when a tileset ships none.
    ///
    /// The glyph index still covers every (color, glyph) pair of the
    /// 16 x 256 grid, but only 16 sprites back it: all glyphs of a color
    /// band share one outlined box in that color. Fallback cells show
    /// which color an object has, not its symbol.
    pub fn default_fallback(sprite_width: u32, sprite_height: u32) -> Self {
        let sprite_width = sprite_width.max(1);
        let sprite_height = sprite_height.max(1);
        let mut sprites = Vec::with_capacity(TermColor::ORDER.len());
        let mut glyphs = HashMap::new();
        for (band, color) in TermColor::ORDER.iter().enumerate() {
            sprites.push(Arc::new(glyph_box(sprite_width, sprite_height, *color)));
            for glyph in 0..GLYPH_COUNT {
                glyphs.insert((*color, glyph as u8), band);
            }
        }
        let info = SheetInfo {
            name: FALLBACK_SHEET.to_string(),
            file: FALLBACK_SHEET.to_string(),
            sprite_width,
            sprite_height,
            sprite_count: sprites.len(),
            ..SheetInfo::default()
        };
        Self { info, sprites, tiles: Vec::new(), glyphs: Some(glyphs) }
    }

    pub fn id(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &SheetInfo {
        &self.info
    }

    pub fn tiles(&self) -> &[TileSource] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.glyphs.is_some()
    }

    pub fn sprite(&self, index: usize) -> Option<&Arc<RgbaImage>> {
        self.sprites.get(index)
    }

    /// Glyph sprite for a normalized color name and symbol. Only the
    /// first character of `symbol` is used; characters outside the
    /// 8-bit range have no glyph.
    pub fn ascii_sprite(&self, color: &str, symbol: &str) -> Option<&Arc<RgbaImage>> {
        let glyphs = self.glyphs.as_ref()?;
        let color = TermColor::from_name(color)?;
        let code = u32::from(symbol.chars().next()?);
        let glyph = u8::try_from(code).ok()?;
        glyphs.get(&(color, glyph)).and_then(|&index| self.sprites.get(index))
    }
}

fn glyph_box(width: u32, height: u32, color: TermColor) -> RgbaImage {
    let [r, g, b] = color.rgb();
    let ink = Rgba([r, g, b, 255]);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let (x0, y0) = (width / 8, height / 8);
    let (x1, y1) = (width - 1 - x0, height - 1 - y0);
    for x in x0..=x1 {
        img.put_pixel(x, y0, ink);
        img.put_pixel(x, y1, ink);
    }
    for y in y0..=y1 {
        img.put_pixel(x0, y, ink);
        img.put_pixel(x1, y, ink);
    }
    img
}
