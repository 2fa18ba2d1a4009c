//! Scene records and the ordered store that owns them.
//!
//! A [`Scene`] is one step of the story. Its sprite placement fields are
//! explicit optionals: an absent `sprite_x`/`sprite_y` means "use the computed
//! default", an absent `scale` means 1.0. Persisted overrides
//! ([`SceneOverride`]) merge shallowly, field by field.

use serde::{Deserialize, Serialize};

use crate::error::{PnError, PnResult};

/// Caption visibility for a scene. Only an explicit `Off` hides the band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Caption {
    On,
    Off,
}

impl Caption {
    pub fn toggled(self) -> Self {
        match self {
            Caption::On => Caption::Off,
            Caption::Off => Caption::On,
        }
    }
}

/// One step of the story.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub text: String,
    pub background: String,
    #[serde(rename = "showPrincess")]
    pub show_sprite: bool,
    /// Legacy nudge, always added on top of the resolved base position.
    #[serde(default)]
    pub px: i32,
    #[serde(default)]
    pub py: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
}

impl Scene {
    pub fn new(text: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            background: background.into(),
            show_sprite: false,
            px: 0,
            py: 0,
            sprite_x: None,
            sprite_y: None,
            scale: None,
            caption: None,
        }
    }

    pub fn with_sprite(mut self, shown: bool) -> Self {
        self.show_sprite = shown;
        self
    }

    pub fn nudged(mut self, px: i32, py: i32) -> Self {
        self.px = px;
        self.py = py;
        self
    }

    pub fn with_sprite_x(mut self, x: i32) -> Self {
        self.sprite_x = Some(x);
        self
    }

    pub fn with_sprite_y(mut self, y: i32) -> Self {
        self.sprite_y = Some(y);
        self
    }

    pub fn effective_scale(&self) -> f32 {
        self.scale.unwrap_or(1.0)
    }

    pub fn caption_visible(&self) -> bool {
        self.caption != Some(Caption::Off)
    }

    /// Shallow merge: every field present in the override replaces the
    /// scene's value, absent fields leave it untouched.
    pub fn apply_override(&mut self, patch: &SceneOverride) {
        if let Some(x) = patch.sprite_x {
            self.sprite_x = Some(x);
        }
        if let Some(y) = patch.sprite_y {
            self.sprite_y = Some(y);
        }
        if let Some(scale) = patch.scale {
            self.scale = Some(scale);
        }
        if let Some(shown) = patch.show_sprite {
            self.show_sprite = shown;
        }
        if let Some(caption) = patch.caption {
            self.caption = Some(caption);
        }
    }
}

/// Persisted subset of a scene. Only explicitly set keys are serialized.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(
        rename = "showPrincess",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub show_sprite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
}

impl SceneOverride {
    pub fn is_empty(&self) -> bool {
        self.sprite_x.is_none()
            && self.sprite_y.is_none()
            && self.scale.is_none()
            && self.show_sprite.is_none()
            && self.caption.is_none()
    }
}

/// Ordered, fixed-length sequence of scenes.
///
/// The store keeps a pristine copy of the literal story so it can tell which
/// sprite visibilities were changed and must be persisted.
#[derive(Clone, Debug)]
pub struct SceneStore {
    scenes: Vec<Scene>,
    seed: Vec<Scene>,
}

impl SceneStore {
    pub fn new(scenes: Vec<Scene>) -> PnResult<Self> {
        if scenes.is_empty() {
            return Err(PnError::EmptyStory);
        }
        Ok(Self {
            seed: scenes.clone(),
            scenes,
        })
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn get(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(index)
    }

    pub fn scene(&self, index: usize) -> PnResult<&Scene> {
        self.scenes.get(index).ok_or(PnError::SceneIndex {
            index,
            len: self.scenes.len(),
        })
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.scenes.len()
    }

    pub fn prev_index(&self, index: usize) -> usize {
        (index + self.scenes.len() - 1) % self.scenes.len()
    }

    /// Merges positionally aligned overrides into the scenes. Entries past the
    /// end of the store are skipped. Returns how many scenes were patched.
    pub fn apply_overrides(&mut self, overrides: &[Option<SceneOverride>]) -> usize {
        let mut patched = 0;
        for (scene, patch) in self.scenes.iter_mut().zip(overrides) {
            if let Some(patch) = patch {
                scene.apply_override(patch);
                patched += 1;
            }
        }
        patched
    }

    /// Extracts the override record of every scene, `None` where nothing is set.
    pub fn overrides(&self) -> Vec<Option<SceneOverride>> {
        self.scenes
            .iter()
            .zip(&self.seed)
            .map(|(scene, seed)| {
                let record = SceneOverride {
                    sprite_x: scene.sprite_x,
                    sprite_y: scene.sprite_y,
                    scale: scene.scale,
                    show_sprite: (scene.show_sprite != seed.show_sprite)
                        .then_some(scene.show_sprite),
                    caption: scene.caption,
                };
                (!record.is_empty()).then_some(record)
            })
            .collect()
    }

    /// Drops every in-memory edit and returns to the literal story.
    pub fn reset(&mut self) {
        self.scenes = self.seed.clone();
    }

    pub fn to_pretty_json(&self) -> PnResult<String> {
        serde_json::to_string_pretty(&self.scenes)
            .map_err(|err| PnError::Serialization(err.to_string()))
    }
}
