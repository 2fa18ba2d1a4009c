//! Override persistence: a single JSON blob under one fixed key.
//!
//! The blob is an array positionally aligned with the [`SceneStore`]; each
//! entry is either `null` or a sparse map of the override keys. Loading never
//! aborts the session and saving never propagates failures: both log and
//! carry on. The `try_*` variants expose the underlying result.

use tracing::{debug, info, warn};

use crate::error::{PnError, PnResult};
use crate::scene::{SceneOverride, SceneStore};
use crate::storage::KeyValueStore;

pub const OVERRIDES_KEY: &str = "pixel_novel.scene_overrides";

/// What a load found in storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Missing,
    Applied {
        patched: usize,
        /// Entries beyond the end of the store.
        ignored: usize,
    },
}

pub fn encode_overrides(store: &SceneStore) -> PnResult<String> {
    serde_json::to_string(&store.overrides()).map_err(|err| PnError::Serialization(err.to_string()))
}

/// Parses an override blob. A `scale` that is not a positive finite number
/// makes the whole blob malformed.
pub fn decode_overrides(raw: &str) -> PnResult<Vec<Option<SceneOverride>>> {
    let overrides: Vec<Option<SceneOverride>> =
        serde_json::from_str(raw).map_err(|err| PnError::override_format(raw, &err))?;
    for (index, patch) in overrides.iter().enumerate() {
        if let Some(scale) = patch.as_ref().and_then(|patch| patch.scale) {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(PnError::override_value(
                    raw,
                    format!("entry {index}: scale {scale} is not a positive number"),
                ));
            }
        }
    }
    Ok(overrides)
}

pub struct OverridePersistence<K> {
    storage: K,
    key: String,
}

impl<K: KeyValueStore> OverridePersistence<K> {
    pub fn new(storage: K) -> Self {
        Self::with_key(storage, OVERRIDES_KEY)
    }

    pub fn with_key(storage: K, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &K {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut K {
        &mut self.storage
    }

    /// Reads and merges the stored overrides. A malformed blob leaves the
    /// store untouched.
    pub fn try_load(&self, store: &mut SceneStore) -> PnResult<LoadOutcome> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(LoadOutcome::Missing);
        };
        let overrides = decode_overrides(&raw)?;
        let ignored = overrides.len().saturating_sub(store.len());
        let patched = store.apply_overrides(&overrides);
        Ok(LoadOutcome::Applied { patched, ignored })
    }

    /// Infallible load used at startup. Returns the number of patched scenes.
    pub fn load(&self, store: &mut SceneStore) -> usize {
        match self.try_load(store) {
            Ok(LoadOutcome::Missing) => {
                debug!(key = %self.key, "no stored overrides");
                0
            }
            Ok(LoadOutcome::Applied { patched, ignored }) => {
                if ignored > 0 {
                    warn!(
                        key = %self.key,
                        ignored,
                        "stored overrides are longer than the story; extra entries ignored"
                    );
                }
                info!(key = %self.key, patched, "applied stored overrides");
                patched
            }
            Err(err) => {
                warn!(key = %self.key, "ignoring stored overrides: {err}");
                0
            }
        }
    }

    pub fn try_save(&mut self, store: &SceneStore) -> PnResult<()> {
        let blob = encode_overrides(store)?;
        self.storage.set(&self.key, &blob)
    }

    /// Infallible save called after every persisted edit. Returns whether the
    /// write went through.
    pub fn save(&mut self, store: &SceneStore) -> bool {
        match self.try_save(store) {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %self.key, "overrides not persisted: {err}");
                false
            }
        }
    }

    pub fn reset(&mut self) -> PnResult<()> {
        self.storage.remove(&self.key)
    }
}
