use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use pixel_novel::{integer_scale, LayoutMode, ADVANCE_DELAY};
use pixel_novel_assets::SecurityMode;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

const FALLBACK_SCALE: u32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayInfo {
    pub width: u32,
    pub height: u32,
}

/// Presenter settings as written in `presenter.toml`. Every field is optional.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PresenterConfig {
    pub title: String,
    /// Window scale; picked from the monitor when unset.
    pub scale: Option<u32>,
    pub layout: LayoutMode,
    pub assets_root: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
    pub asset_cache_budget_mb: Option<u64>,
    pub security_mode: SecurityMode,
    pub manifest_path: Option<PathBuf>,
    pub require_manifest: Option<bool>,
    pub mute: bool,
    pub advance_delay_ms: Option<u64>,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            title: "Valley of Light".to_string(),
            scale: None,
            layout: LayoutMode::Overlay,
            assets_root: None,
            storage_dir: None,
            asset_cache_budget_mb: Some(16),
            security_mode: SecurityMode::Trusted,
            manifest_path: None,
            require_manifest: None,
            mute: false,
            advance_delay_ms: None,
        }
    }
}

impl PresenterConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, RuntimeError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Reads `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, RuntimeError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("presenter.toml"))
            .unwrap_or_else(|| PathBuf::from("presenter.toml"))
    }

    pub fn default_storage_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".pixel_novel"))
    }

    pub fn resolve(&self, display: Option<DisplayInfo>) -> ResolvedConfig {
        let canvas = self.layout.canvas_size();
        let scale = self
            .scale
            .or_else(|| display.map(|d| integer_scale((d.width, d.height), canvas)))
            .unwrap_or(FALLBACK_SCALE)
            .max(1);
        let asset_cache_budget_mb = self.asset_cache_budget_mb.unwrap_or(16);
        let require_manifest = self
            .require_manifest
            .unwrap_or(self.security_mode == SecurityMode::Untrusted);

        ResolvedConfig {
            title: self.title.clone(),
            layout: self.layout,
            scale,
            window_size: (canvas.0 * scale, canvas.1 * scale),
            assets_root: self
                .assets_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("assets")),
            storage_dir: self
                .storage_dir
                .clone()
                .unwrap_or_else(Self::default_storage_dir),
            asset_cache_budget_bytes: (asset_cache_budget_mb * 1024 * 1024) as usize,
            security_mode: self.security_mode,
            manifest_path: self.manifest_path.clone(),
            require_manifest,
            mute: self.mute,
            advance_delay: self
                .advance_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(ADVANCE_DELAY),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pixel_novel", "pixel_novel")
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub title: String,
    pub layout: LayoutMode,
    pub scale: u32,
    pub window_size: (u32, u32),
    pub assets_root: PathBuf,
    pub storage_dir: PathBuf,
    pub asset_cache_budget_bytes: usize,
    pub security_mode: SecurityMode,
    pub manifest_path: Option<PathBuf>,
    pub require_manifest: bool,
    pub mute: bool,
    pub advance_delay: Duration,
}
