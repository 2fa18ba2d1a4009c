//! RGBA8 framebuffer with the handful of primitives the presenter needs:
//! rect fills, alpha blends, nearest-neighbor blits and bitmap text.

use std::ops::Range;

use bytemuck::{cast_slice, cast_slice_mut};

use crate::font;
use crate::layout::Placement;

pub type Rgba = [u8; 4];

pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    [r, g, b, 255]
}

/// Decoded image, tightly packed RGBA8 rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: color.repeat(width as usize * height as usize),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Loaded images with a zero dimension are treated like missing ones.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let pixels: &[Rgba] = cast_slice(self.pixels.as_slice());
        pixels.get((y * self.width + x) as usize).copied()
    }
}

#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels().get((y * self.width + x) as usize).copied()
    }

    fn texels(&self) -> &[Rgba] {
        cast_slice(self.pixels.as_slice())
    }

    fn texels_mut(&mut self) -> &mut [Rgba] {
        cast_slice_mut(self.pixels.as_mut_slice())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn fill(&mut self, color: Rgba) {
        self.texels_mut().fill(color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        for row in y..y.saturating_add(height as i32) {
            for col in x..x.saturating_add(width as i32) {
                self.blend_pixel(col, row, color);
            }
        }
    }

    /// Source-over blend of one pixel. Out-of-bounds writes are dropped.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let alpha = color[3] as u32;
        let texel = &mut self.texels_mut()[idx];
        match alpha {
            0 => {}
            255 => *texel = color,
            _ => {
                for channel in 0..3 {
                    let src = color[channel] as u32;
                    let dst = texel[channel] as u32;
                    texel[channel] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
                }
                texel[3] = 255;
            }
        }
    }

    /// Blits at native size with its top-left corner at (x, y).
    pub fn blit(&mut self, image: &Bitmap, x: i32, y: i32) {
        self.blit_scaled(
            image,
            Placement {
                x,
                y,
                width: image.width,
                height: image.height,
            },
        );
    }

    /// Nearest-neighbor blit into `dst`, clipped to the canvas.
    pub fn blit_scaled(&mut self, image: &Bitmap, dst: Placement) {
        if !image.is_drawable() || dst.width == 0 || dst.height == 0 {
            return;
        }
        // Only the part of `dst` that lands on the canvas is walked.
        let columns = visible_span(dst.x, dst.width, self.width);
        let rows = visible_span(dst.y, dst.height, self.height);
        let source: &[Rgba] = cast_slice(image.pixels.as_slice());
        for dy in rows {
            let sy = (dy * image.height as u64 / dst.height as u64) as u32;
            let y = (dst.y as i64 + dy as i64) as i32;
            for dx in columns.clone() {
                let sx = (dx * image.width as u64 / dst.width as u64) as u32;
                let color = source[(sy * image.width + sx) as usize];
                self.blend_pixel((dst.x as i64 + dx as i64) as i32, y, color);
            }
        }
    }

    /// Draws text with the built-in 5x7 font; `(x, y)` is the glyph cell's top-left.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        self.draw_text_spaced(x, y, text, color, font::ADVANCE);
    }

    pub fn draw_text_spaced(&mut self, x: i32, y: i32, text: &str, color: Rgba, advance: u32) {
        let mut cursor = x;
        for ch in text.chars() {
            if let Some(rows) = font::glyph(ch) {
                for (dy, row) in rows.iter().enumerate() {
                    for dx in 0..font::GLYPH_WIDTH {
                        if (row >> (font::GLYPH_WIDTH - 1 - dx)) & 1 != 0 {
                            self.blend_pixel(cursor + dx as i32, y + dy as i32, color);
                        }
                    }
                }
            }
            cursor += advance as i32;
        }
    }
}

/// Offsets into a `length`-long run starting at `origin` that fall inside `0..limit`.
fn visible_span(origin: i32, length: u32, limit: u32) -> Range<u64> {
    let origin = origin as i64;
    let start = (-origin).clamp(0, length as i64);
    let end = (limit as i64 - origin).clamp(start, length as i64);
    start as u64..end as u64
}
