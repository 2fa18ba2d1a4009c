//! Presenter session: current scene cursor, viewer/editor mode and the
//! debounced tap-to-advance.
//!
//! All state the input handlers and the render step share lives here, in one
//! value passed by reference. Time is always supplied by the caller, so the
//! debounce is a plain deadline comparison.

use std::time::Duration;

use crate::error::PnResult;
use crate::layout;
use crate::scene::{Caption, SceneStore};

pub const ADVANCE_DELAY: Duration = Duration::from_millis(500);

pub const MOVE_STEP: i32 = 1;
pub const FAST_MOVE_STEP: i32 = 5;
/// How far past each playfield edge an edited sprite may go.
pub const POSITION_MARGIN: i32 = 64;

pub const SCALE_STEP: f32 = 0.05;
pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Viewing,
    Editing,
}

/// Editor commands. All of them target the current scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditCommand {
    Move { dx: i32, dy: i32 },
    ScaleUp,
    ScaleDown,
    ScaleReset,
    PrevScene,
    NextScene,
    ToggleGrid,
    ToggleSprite,
    ToggleCaption,
    Dump,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// Advance scheduled; the caller plays the cue now.
    Scheduled { due: Duration },
    /// An advance is already pending.
    Pending,
    /// Taps do nothing while editing.
    Editing,
}

/// What the caller has to do after an editor command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditEffect {
    None,
    /// Only view state changed (scene cursor, grid).
    View,
    /// A persisted field changed; save now.
    Persist,
    /// Export the store to the diagnostic log.
    Dump,
}

#[derive(Clone, Debug)]
pub struct Session {
    index: usize,
    mode: Mode,
    grid: bool,
    pending_advance: Option<Duration>,
    advance_delay: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            index: 0,
            mode: Mode::Viewing,
            grid: false,
            pending_advance: None,
            advance_delay: ADVANCE_DELAY,
        }
    }

    /// Viewing session parked on `index`.
    pub fn at(index: usize, store: &SceneStore) -> PnResult<Self> {
        store.scene(index)?;
        Ok(Self {
            index,
            ..Self::new()
        })
    }

    pub fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Editing
    }

    pub fn grid_visible(&self) -> bool {
        self.grid
    }

    pub fn pending_advance(&self) -> Option<Duration> {
        self.pending_advance
    }

    /// Switches between viewing and editing. The scene cursor is kept.
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Viewing => Mode::Editing,
            Mode::Editing => Mode::Viewing,
        };
        self.mode
    }

    pub fn tap(&mut self, now: Duration) -> TapOutcome {
        if self.is_editing() {
            return TapOutcome::Editing;
        }
        if self.pending_advance.is_some() {
            return TapOutcome::Pending;
        }
        let due = now + self.advance_delay;
        self.pending_advance = Some(due);
        TapOutcome::Scheduled { due }
    }

    /// Fires a due advance. Returns true when the cursor moved.
    pub fn update(&mut self, now: Duration, store: &SceneStore) -> bool {
        match self.pending_advance {
            Some(due) if now >= due => {
                self.pending_advance = None;
                self.index = store.next_index(self.index);
                true
            }
            _ => false,
        }
    }

    /// Applies an editor command. Ignored outside editing mode.
    ///
    /// `sprite` is the native size of the sprite image, `None` while it is
    /// still loading; positional moves need it to resolve the default.
    pub fn apply(
        &mut self,
        command: EditCommand,
        store: &mut SceneStore,
        playfield: (u32, u32),
        sprite: Option<(u32, u32)>,
    ) -> EditEffect {
        if !self.is_editing() {
            return EditEffect::None;
        }
        match command {
            EditCommand::PrevScene => {
                self.index = store.prev_index(self.index);
                EditEffect::View
            }
            EditCommand::NextScene => {
                self.index = store.next_index(self.index);
                EditEffect::View
            }
            EditCommand::ToggleGrid => {
                self.grid = !self.grid;
                EditEffect::View
            }
            EditCommand::Dump => EditEffect::Dump,
            EditCommand::ToggleSprite => {
                let Some(scene) = store.get_mut(self.index) else {
                    return EditEffect::None;
                };
                scene.show_sprite = !scene.show_sprite;
                EditEffect::Persist
            }
            EditCommand::ToggleCaption => {
                let Some(scene) = store.get_mut(self.index) else {
                    return EditEffect::None;
                };
                let current = scene.caption.unwrap_or(Caption::On);
                scene.caption = Some(current.toggled());
                EditEffect::Persist
            }
            EditCommand::Move { dx, dy } => self.move_sprite(store, playfield, sprite, dx, dy),
            EditCommand::ScaleUp => self.set_scale(store, |scale| step_scale(scale, SCALE_STEP)),
            EditCommand::ScaleDown => {
                self.set_scale(store, |scale| step_scale(scale, -SCALE_STEP))
            }
            EditCommand::ScaleReset => self.set_scale(store, |_| 1.0),
        }
    }

    fn move_sprite(
        &self,
        store: &mut SceneStore,
        playfield: (u32, u32),
        sprite: Option<(u32, u32)>,
        dx: i32,
        dy: i32,
    ) -> EditEffect {
        let Some(scene) = store.get_mut(self.index) else {
            return EditEffect::None;
        };
        let Some(sprite) = sprite.filter(|_| scene.show_sprite) else {
            return EditEffect::None;
        };

        // Materialize the default first so every press moves from a concrete value.
        let (base_x, base_y) = layout::base_position(scene, playfield, sprite);
        let x = base_x
            .saturating_add(dx)
            .clamp(-POSITION_MARGIN, playfield.0 as i32 + POSITION_MARGIN);
        let y = base_y
            .saturating_add(dy)
            .clamp(-POSITION_MARGIN, playfield.1 as i32 + POSITION_MARGIN);

        let before = (scene.sprite_x, scene.sprite_y);
        scene.sprite_x = Some(x);
        scene.sprite_y = Some(y);
        if before == (scene.sprite_x, scene.sprite_y) {
            EditEffect::None
        } else {
            EditEffect::Persist
        }
    }

    fn set_scale(&self, store: &mut SceneStore, next: impl FnOnce(f32) -> f32) -> EditEffect {
        let Some(scene) = store.get_mut(self.index) else {
            return EditEffect::None;
        };
        if !scene.show_sprite {
            return EditEffect::None;
        }
        let scale = next(scene.effective_scale());
        if scene.scale == Some(scale) {
            return EditEffect::None;
        }
        scene.scale = Some(scale);
        EditEffect::Persist
    }
}

/// One scale step, kept on the hundredths grid and inside the editor range.
fn step_scale(current: f32, delta: f32) -> f32 {
    let stepped = ((current + delta) * 100.0).round() / 100.0;
    stepped.clamp(MIN_SCALE, MAX_SCALE)
}
