//! Frame composition for the current scene.
//!
//! Draw order matters, later layers occlude earlier ones: fallback fill,
//! background, grid, sprite, caption band, editor HUD. Every image use is
//! gated on the image being loaded and non-empty.

use crate::canvas::{rgb, Bitmap, Canvas, Rgba};
use crate::font;
use crate::layout::{self, LayoutMode, Placement, CAPTION_BAND_HEIGHT};
use crate::scene::SceneStore;
use crate::session::Session;

pub const FALLBACK_FILL: Rgba = rgb(30, 30, 30);
pub const CAPTION_BOX: Rgba = rgb(16, 36, 16);
pub const CAPTION_TEXT: Rgba = rgb(255, 255, 210);
pub const CAPTION_SHADOW: Rgba = rgb(10, 10, 10);
pub const GRID_LINE: Rgba = [255, 255, 255, 40];
pub const GRID_SPACING: u32 = 8;
pub const HUD_BACKDROP: Rgba = [0, 0, 0, 192];
pub const HUD_HEIGHT: u32 = 17;
/// Caption baseline, measured from the top of the band.
const CAPTION_BASELINE: u32 = 18;
const HUD_LEGEND: &str = "<>^V +- 0 [] G P C D E";

/// Images available for this frame; `None` while still loading.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameAssets<'a> {
    pub background: Option<&'a Bitmap>,
    pub sprite: Option<&'a Bitmap>,
}

/// Which layers a composed frame ended up with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub background: bool,
    pub grid: bool,
    pub sprite: Option<Placement>,
    pub caption: bool,
    pub hud: bool,
}

pub fn compose_frame(
    canvas: &mut Canvas,
    store: &SceneStore,
    session: &Session,
    layout: LayoutMode,
    assets: FrameAssets<'_>,
) -> FrameSummary {
    let mut summary = FrameSummary::default();
    canvas.fill(FALLBACK_FILL);

    let Some(scene) = store.get(session.index()) else {
        return summary;
    };
    let playfield = layout.playfield();
    let background = assets.background.filter(|image| image.is_drawable());
    let sprite = assets.sprite.filter(|image| image.is_drawable());

    if let Some(image) = background {
        canvas.blit(image, 0, 0);
        summary.background = true;
    }

    if session.grid_visible() {
        draw_grid(canvas, playfield);
        summary.grid = true;
    }

    if scene.show_sprite {
        if let Some(image) = sprite {
            let placement = layout::sprite_placement(scene, playfield, image.dimensions());
            canvas.blit_scaled(image, placement);
            summary.sprite = Some(placement);
        }
    }

    if scene.caption_visible() {
        draw_caption(canvas, layout, &scene.text);
        summary.caption = true;
    }

    if session.is_editing() {
        let resolved = sprite.map(|image| layout::base_position(scene, playfield, image.dimensions()));
        let status = hud_status(
            session.index(),
            store.len(),
            resolved,
            scene.effective_scale(),
            scene.show_sprite,
        );
        draw_hud(canvas, playfield.0, &status);
        summary.hud = true;
    }

    summary
}

fn draw_grid(canvas: &mut Canvas, playfield: (u32, u32)) {
    let (width, height) = playfield;
    for x in (0..width).step_by(GRID_SPACING as usize) {
        canvas.fill_rect(x as i32, 0, 1, height, GRID_LINE);
    }
    for y in (0..height).step_by(GRID_SPACING as usize) {
        canvas.fill_rect(0, y as i32, width, 1, GRID_LINE);
    }
}

fn draw_caption(canvas: &mut Canvas, layout: LayoutMode, text: &str) {
    let (width, _) = layout.playfield();
    let top = layout.caption_band_top();
    canvas.fill_rect(0, top as i32, width, CAPTION_BAND_HEIGHT, CAPTION_BOX);

    let advance = font::fitted_advance(text, width);
    let text_width = font::width_with_advance(text, advance);
    let x = (width.saturating_sub(text_width) / 2) as i32;
    let y = (top + CAPTION_BASELINE - font::GLYPH_HEIGHT) as i32;
    canvas.draw_text_spaced(x + 1, y + 1, text, CAPTION_SHADOW, advance);
    canvas.draw_text_spaced(x, y, text, CAPTION_TEXT, advance);
}

/// First HUD line: scene number, resolved base position and scale.
pub fn hud_status(
    index: usize,
    len: usize,
    position: Option<(i32, i32)>,
    scale: f32,
    shown: bool,
) -> String {
    let position = match position {
        Some((x, y)) => format!("X{x} Y{y}"),
        None => "X? Y?".to_string(),
    };
    let visibility = if shown { "" } else { " -" };
    format!(
        "#{:02}/{:02} {position} S{scale:.2}{visibility}",
        index + 1,
        len
    )
}

fn draw_hud(canvas: &mut Canvas, width: u32, status: &str) {
    canvas.fill_rect(0, 0, width, HUD_HEIGHT, HUD_BACKDROP);
    canvas.draw_text(1, 1, status, CAPTION_TEXT);
    canvas.draw_text(1, 9, HUD_LEGEND, CAPTION_TEXT);
}
