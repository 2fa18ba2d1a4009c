use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::cache::ByteCache;
use crate::error::AssetError;
use crate::manifest::{normalize_key, sha256_hex, AssetManifest};

const DEFAULT_CACHE_BUDGET: usize = 64 * 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    #[default]
    Trusted,
    Untrusted,
}

#[derive(Clone, Debug)]
pub struct AssetLimits {
    pub max_bytes: u64,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for AssetLimits {
    fn default() -> Self {
        Self {
            max_bytes: 15 * 1024 * 1024,
            max_width: 4096,
            max_height: 4096,
        }
    }
}

/// Decoded image, tightly packed RGBA8.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug)]
pub struct InstallFailure {
    pub path: String,
    pub error: AssetError,
}

/// Result of pre-warming the cache with a list of assets.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub bytes: usize,
    pub failures: Vec<InstallFailure>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read-only view of an asset directory.
///
/// Reads are cache-first: once a blob has been loaded or installed, later
/// loads never touch the disk while it stays within the cache budget.
#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    mode: SecurityMode,
    allowed_image_extensions: HashSet<String>,
    limits: AssetLimits,
    manifest: Option<AssetManifest>,
    require_manifest: bool,
    byte_cache: Mutex<ByteCache>,
}

impl AssetStore {
    pub fn new(
        root: PathBuf,
        mode: SecurityMode,
        manifest_path: Option<PathBuf>,
        require_manifest: bool,
    ) -> Result<Self, AssetError> {
        let manifest = manifest_path
            .map(|path| AssetManifest::load(&path))
            .transpose()?;
        let mut store = Self::open(root);
        store.mode = mode;
        store.manifest = manifest;
        store.require_manifest = require_manifest;
        Ok(store)
    }

    /// Trusted store without a manifest.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: SecurityMode::Trusted,
            allowed_image_extensions: ["png", "jpg", "jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
            limits: AssetLimits::default(),
            manifest: None,
            require_manifest: false,
            byte_cache: Mutex::new(ByteCache::new(DEFAULT_CACHE_BUDGET)),
        }
    }

    pub fn with_limits(mut self, limits: AssetLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_cache_budget(mut self, budget_bytes: usize) -> Self {
        self.byte_cache = Mutex::new(ByteCache::new(budget_bytes));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> SecurityMode {
        self.mode
    }

    pub fn is_cached(&self, asset_path: &str) -> bool {
        let Ok(rel) = sanitize_rel_path(Path::new(asset_path)) else {
            return false;
        };
        self.byte_cache
            .lock()
            .map(|cache| cache.contains(&cache_key(&rel)))
            .unwrap_or(false)
    }

    pub fn load_bytes(&self, asset_path: &str) -> Result<Vec<u8>, AssetError> {
        let rel = sanitize_rel_path(Path::new(asset_path))?;
        let key = cache_key(&rel);

        if let Some(bytes) = self
            .byte_cache
            .lock()
            .map_err(|_| AssetError::CachePoisoned)?
            .get(&key)
        {
            return Ok(bytes);
        }

        let bytes = self.read_verified(&rel, &key)?;
        self.byte_cache
            .lock()
            .map_err(|_| AssetError::CachePoisoned)?
            .insert(key, bytes.clone());
        Ok(bytes)
    }

    /// Fetches every listed asset into the byte cache. Individual failures are
    /// collected, never fatal.
    pub fn install<S: AsRef<str>>(&self, paths: &[S]) -> InstallReport {
        let mut report = InstallReport::default();
        for path in paths {
            let path = path.as_ref();
            match self.load_bytes(path) {
                Ok(bytes) => {
                    report.bytes += bytes.len();
                    report.cached.push(path.to_string());
                }
                Err(error) => report.failures.push(InstallFailure {
                    path: path.to_string(),
                    error,
                }),
            }
        }
        report
    }

    pub fn load_image(&self, asset_path: &str) -> Result<LoadedImage, AssetError> {
        let rel = sanitize_rel_path(Path::new(asset_path))?;
        let extension = rel
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|value| value.to_lowercase())
            .ok_or_else(|| AssetError::UnsupportedExtension(asset_path.to_string()))?;
        if !self.allowed_image_extensions.contains(&extension) {
            return Err(AssetError::UnsupportedExtension(asset_path.to_string()));
        }

        let bytes = self.load_bytes(asset_path)?;

        let image =
            image::load_from_memory(&bytes).map_err(|err| AssetError::Decode(err.to_string()))?;
        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        if width > self.limits.max_width || height > self.limits.max_height {
            return Err(AssetError::InvalidDimensions {
                width,
                height,
                max_width: self.limits.max_width,
                max_height: self.limits.max_height,
            });
        }
        Ok(LoadedImage {
            name: asset_path.to_string(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    fn read_verified(&self, rel: &Path, key: &str) -> Result<Vec<u8>, AssetError> {
        let full_path = self.root.join(rel);
        let root = fs::canonicalize(&self.root)?;
        let resolved = fs::canonicalize(&full_path)?;
        if !resolved.starts_with(&root) {
            return Err(AssetError::Traversal);
        }

        let size = fs::metadata(&resolved)?.len();
        if size > self.limits.max_bytes {
            return Err(AssetError::TooLarge {
                size,
                max: self.limits.max_bytes,
            });
        }
        let bytes = fs::read(&resolved)?;
        self.verify_manifest(key, &bytes)?;
        Ok(bytes)
    }

    fn verify_manifest(&self, key: &str, bytes: &[u8]) -> Result<(), AssetError> {
        if self.mode == SecurityMode::Untrusted && self.require_manifest && self.manifest.is_none()
        {
            return Err(AssetError::ManifestMissing);
        }
        let Some(manifest) = &self.manifest else {
            return Ok(());
        };
        let entry = manifest
            .get(key)
            .ok_or_else(|| AssetError::ManifestEntryMissing(key.to_string()))?;
        if entry.size != bytes.len() as u64 {
            return Err(AssetError::ManifestSizeMismatch(key.to_string()));
        }
        if entry.sha256.to_lowercase() != sha256_hex(bytes) {
            return Err(AssetError::ManifestHashMismatch(key.to_string()));
        }
        Ok(())
    }
}

fn cache_key(rel: &Path) -> String {
    normalize_key(&rel.to_string_lossy())
}

pub fn sanitize_rel_path(rel: &Path) -> Result<PathBuf, AssetError> {
    use std::path::Component::*;
    let mut out = PathBuf::new();
    for component in rel.components() {
        match component {
            CurDir => {}
            Normal(part) => out.push(part),
            ParentDir | RootDir | Prefix(_) => return Err(AssetError::Traversal),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
