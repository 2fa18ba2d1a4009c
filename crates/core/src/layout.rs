//! Fixed display geometry and sprite placement math.

use serde::{Deserialize, Serialize};

use crate::scene::Scene;

pub const PLAYFIELD_WIDTH: u32 = 160;
pub const PLAYFIELD_HEIGHT: u32 = 144;
pub const CAPTION_BAND_HEIGHT: u32 = 40;
/// Gap between the bottom of a default-placed sprite and the playfield edge.
pub const SPRITE_BOTTOM_MARGIN: i32 = 20;

/// Where the caption band lives. Fixed at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Band drawn over the bottom of the playfield; canvas is 160x144.
    #[default]
    Overlay,
    /// Band gets its own strip below the playfield; canvas is 160x184.
    ReservedBand,
}

impl LayoutMode {
    pub fn playfield(self) -> (u32, u32) {
        (PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    pub fn canvas_size(self) -> (u32, u32) {
        match self {
            LayoutMode::Overlay => (PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
            LayoutMode::ReservedBand => (PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT + CAPTION_BAND_HEIGHT),
        }
    }

    pub fn caption_band_top(self) -> u32 {
        match self {
            LayoutMode::Overlay => PLAYFIELD_HEIGHT - CAPTION_BAND_HEIGHT,
            LayoutMode::ReservedBand => PLAYFIELD_HEIGHT,
        }
    }
}

/// Destination rectangle of the sprite for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Centered horizontally, `SPRITE_BOTTOM_MARGIN` above the bottom edge.
pub fn default_sprite_position(playfield: (u32, u32), sprite: (u32, u32)) -> (i32, i32) {
    let (pw, ph) = (playfield.0 as i32, playfield.1 as i32);
    let (sw, sh) = (sprite.0 as i32, sprite.1 as i32);
    ((pw - sw).div_euclid(2), ph - sh - SPRITE_BOTTOM_MARGIN)
}

/// Base position before the legacy nudge: explicit override or the default.
pub fn base_position(scene: &Scene, playfield: (u32, u32), sprite: (u32, u32)) -> (i32, i32) {
    let (default_x, default_y) = default_sprite_position(playfield, sprite);
    (
        scene.sprite_x.unwrap_or(default_x),
        scene.sprite_y.unwrap_or(default_y),
    )
}

pub fn sprite_placement(scene: &Scene, playfield: (u32, u32), sprite: (u32, u32)) -> Placement {
    let (x, y) = base_position(scene, playfield, sprite);
    let scale = scene.effective_scale();
    Placement {
        x: x.saturating_add(scene.px),
        y: y.saturating_add(scene.py),
        width: scaled(sprite.0, scale),
        height: scaled(sprite.1, scale),
    }
}

fn scaled(length: u32, scale: f32) -> u32 {
    (length as f32 * scale).round().max(1.0) as u32
}

/// Largest whole-number factor at which `logical` fits in `viewport`, never below 1.
pub fn integer_scale(viewport: (u32, u32), logical: (u32, u32)) -> u32 {
    let sx = viewport.0 / logical.0.max(1);
    let sy = viewport.1 / logical.1.max(1);
    sx.min(sy).max(1)
}
