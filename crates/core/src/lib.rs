//! Scene model, editor session and frame composition for a tap-to-advance
//! pixel-art story presenter.
//!
//! Everything here is platform-free: the window, audio and image decoding
//! live in `pixel_novel_runtime` and `pixel_novel_assets`.

mod canvas;
mod clock;
mod error;
pub mod font;
mod layout;
mod persist;
mod render;
mod scene;
mod session;
mod storage;
pub mod story;

pub use canvas::{rgb, Bitmap, Canvas, Rgba};
pub use clock::{Clock, FrameGate, ManualClock, SystemClock, DRAW_RATE_HZ};
pub use error::{PnError, PnResult};
pub use layout::{
    base_position, default_sprite_position, integer_scale, sprite_placement, LayoutMode,
    Placement, CAPTION_BAND_HEIGHT, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, SPRITE_BOTTOM_MARGIN,
};
pub use persist::{
    decode_overrides, encode_overrides, LoadOutcome, OverridePersistence, OVERRIDES_KEY,
};
pub use render::{compose_frame, hud_status, FrameAssets, FrameSummary};
pub use scene::{Caption, Scene, SceneOverride, SceneStore};
pub use session::{
    EditCommand, EditEffect, Mode, Session, TapOutcome, ADVANCE_DELAY, FAST_MOVE_STEP,
    MAX_SCALE, MIN_SCALE, MOVE_STEP, POSITION_MARGIN, SCALE_STEP,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Colors used by the frame composer.
pub mod palette {
    pub use crate::render::{
        CAPTION_BOX, CAPTION_SHADOW, CAPTION_TEXT, FALLBACK_FILL, GRID_LINE, GRID_SPACING,
        HUD_BACKDROP, HUD_HEIGHT,
    };
}
