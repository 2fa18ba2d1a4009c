use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AssetError;

pub const MANIFEST_VERSION: u16 = 1;

/// sha256 + size for every asset, keyed by `/`-separated relative path.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AssetManifest {
    pub manifest_version: u16,
    pub assets: BTreeMap<String, AssetEntry>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AssetEntry {
    pub sha256: String,
    pub size: u64,
}

impl AssetEntry {
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self {
            sha256: sha256_hex(bytes),
            size: bytes.len() as u64,
        }
    }
}

impl AssetManifest {
    pub fn new() -> Self {
        Self {
            manifest_version: MANIFEST_VERSION,
            assets: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, rel_path: &str, bytes: &[u8]) {
        self.assets
            .insert(normalize_key(rel_path), AssetEntry::for_bytes(bytes));
    }

    pub fn get(&self, rel_path: &str) -> Option<&AssetEntry> {
        self.assets.get(&normalize_key(rel_path))
    }

    /// Parses a manifest and normalizes its keys to `/` separators.
    pub fn from_json(raw: &str) -> Result<Self, AssetError> {
        let manifest: AssetManifest =
            serde_json::from_str(raw).map_err(|err| AssetError::ManifestFormat(err.to_string()))?;
        if manifest.manifest_version != MANIFEST_VERSION {
            return Err(AssetError::ManifestVersion(manifest.manifest_version));
        }
        let assets = manifest
            .assets
            .into_iter()
            .map(|(key, entry)| (normalize_key(&key), entry))
            .collect();
        Ok(Self {
            manifest_version: manifest.manifest_version,
            assets,
        })
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String, AssetError> {
        serde_json::to_string_pretty(self).map_err(|err| AssetError::ManifestFormat(err.to_string()))
    }
}

pub(crate) fn normalize_key(rel_path: &str) -> String {
    rel_path.replace('\\', "/")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_normalized_on_parse() {
        let raw = r#"{"manifest_version":1,"assets":{"bg\\a.png":{"sha256":"00","size":1}}}"#;
        let manifest = AssetManifest::from_json(raw).expect("manifest");
        assert!(manifest.get("bg/a.png").is_some());
        assert!(manifest.get("bg\\a.png").is_some());
    }

    #[test]
    fn rejects_future_versions() {
        let raw = r#"{"manifest_version":2,"assets":{}}"#;
        assert!(matches!(
            AssetManifest::from_json(raw),
            Err(AssetError::ManifestVersion(2))
        ));
    }

    #[test]
    fn hashes_are_lowercase_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
